//! SDL rendering
//!
//! Object types first, then input types, each as a block; blocks are
//! separated by one blank line and the text ends with a single newline.

use indexmap::IndexMap;

use super::types::{FieldDef, SchemaModel, TypeRef};

/// Render the whole model
pub fn render_schema(model: &SchemaModel) -> String {
    let mut blocks = Vec::with_capacity(model.types.len() + model.inputs.len());

    for (name, fields) in &model.types {
        let body: Vec<String> = fields.values().map(render_field).collect();
        blocks.push(render_block("type", name, &body));
    }

    for (name, fields) in &model.inputs {
        let body: Vec<String> = fields
            .iter()
            .map(|(field, ty)| format!("{field}: {ty}"))
            .collect();
        blocks.push(render_block("input", name, &body));
    }

    let mut text = blocks.join("\n\n").trim().to_string();
    text.push('\n');
    text
}

/// `name(params): Type`
pub fn render_field(field: &FieldDef) -> String {
    if field.params.is_empty() {
        format!("{}: {}", field.name, field.ty)
    } else {
        format!("{}({}): {}", field.name, render_params(&field.params), field.ty)
    }
}

fn render_params(params: &IndexMap<String, TypeRef>) -> String {
    params
        .iter()
        .map(|(name, ty)| format!("{name}: {ty}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_block(keyword: &str, name: &str, body: &[String]) -> String {
    let mut block = format!("{keyword} {name} {{\n");
    for line in body {
        block.push_str("  ");
        block.push_str(line);
        block.push('\n');
    }
    block.push('}');
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{BOOLEAN, INT};

    #[test]
    fn test_render_blocks() {
        let mut model = SchemaModel::new();
        model.set_field("Foo", FieldDef::new("id", TypeRef::named(INT)));
        model.set_field(
            "Query",
            FieldDef::new("foo", TypeRef::named("Foo")).param("id", TypeRef::named(INT).non_null()),
        );
        model.set_input_field("FooInput", "flag", TypeRef::named(BOOLEAN));

        let sdl = render_schema(&model);
        assert_eq!(
            sdl,
            "type Foo {\n  id: Int\n}\n\n\
             type Query {\n  foo(id: Int!): Foo\n}\n\n\
             input FooInput {\n  flag: Boolean\n}\n"
        );
    }

    #[test]
    fn test_render_empty_model() {
        assert_eq!(render_schema(&SchemaModel::new()), "\n");
    }
}
