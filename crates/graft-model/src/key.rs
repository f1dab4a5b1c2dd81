//! Composite-key construction.
//!
//! A composite key identifies a (type, field[, value]) triple as a
//! plain string. Construction is pure and order-sensitive: type, then
//! field, then the optional value suffix, joined by [`KEY_DELIMITER`].
//! Uniqueness of keys across distinct triples holds as long as callers
//! keep the delimiter out of type names.

use crate::scalar::Scalar;

/// Fixed delimiter between key segments.
pub const KEY_DELIMITER: char = '_';

/// `Type_field`: the correlation identifier for one declared field.
pub fn compose(type_name: &str, field: &str) -> String {
    format!("{type_name}{KEY_DELIMITER}{field}")
}

/// `Type_field_value`: the value-qualified form used as an index entry,
/// so a later lookup matches on field *and* value.
pub fn qualify(key: &str, value: &Scalar) -> String {
    format!("{key}{KEY_DELIMITER}{value}")
}
