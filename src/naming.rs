//! # Naming Conventions
//!
//! Type and field names shared by the schema compiler and the resolver
//! synthesizer. Both halves must derive names through these functions or
//! the generated SDL and resolver map stop lining up.

use heck::{ToLowerCamelCase, ToUpperCamelCase};

/// Root query type
pub const QUERY: &str = "Query";

/// Root mutation type
pub const MUTATION: &str = "Mutation";

/// Pass-through predicate input
pub const CONDITION: &str = "Condition";

/// Object type for a table: `foo_bar` -> `FooBar`
pub fn type_name(table: &str) -> String {
    table.to_upper_camel_case()
}

/// Field prefix for root operations: `foo_bar` -> `fooBar`
pub fn field_prefix(table: &str) -> String {
    table.to_lower_camel_case()
}

pub fn page_type_name(table: &str) -> String {
    format!("{}Page", type_name(table))
}

pub fn input_type_name(table: &str) -> String {
    format!("{}Input", type_name(table))
}

pub fn get_page_field(table: &str) -> String {
    format!("{}GetPage", field_prefix(table))
}

pub fn get_first_field(table: &str) -> String {
    format!("{}GetFirst", field_prefix(table))
}

pub fn put_item_field(table: &str) -> String {
    format!("{}PutItem", field_prefix(table))
}

/// Singular relation field for a foreign-key column: `<column>_<table>`
pub fn foreign_field_name(column: &str, foreign_table: &str) -> String {
    format!("{column}_{foreign_table}")
}

/// Paginated relation field for a child table
pub fn reverse_field_name(child_table: &str) -> String {
    child_table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(type_name("foo"), "Foo");
        assert_eq!(type_name("user_account"), "UserAccount");
        assert_eq!(page_type_name("user_account"), "UserAccountPage");
        assert_eq!(input_type_name("foo"), "FooInput");
    }

    #[test]
    fn test_root_fields() {
        assert_eq!(get_page_field("user_account"), "userAccountGetPage");
        assert_eq!(get_first_field("foo"), "fooGetFirst");
        assert_eq!(put_item_field("bar"), "barPutItem");
    }

    #[test]
    fn test_relation_fields() {
        assert_eq!(foreign_field_name("foo_id", "foo"), "foo_id_foo");
        assert_eq!(reverse_field_name("bar"), "bar");
    }
}
