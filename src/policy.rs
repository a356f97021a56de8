//! policy.rs - Resolution of the effective option set for one field.
//!
//! Four layers merge into the options a field is cleaned under: the
//! configuration's default option set, the patch for the field's declared
//! column type, schema-derived inference from nullability, and finally the
//! per-field-name patch. Pure function of its inputs.
//!
//! License: MIT

use std::collections::BTreeMap;

use crate::config::{CleanConfig, FieldOptions};
use crate::entity::ColumnSchema;

/// Determines the effective sanitization options for `field`.
///
/// Layering, later wins: `clean_default`, then the type patch for the field's
/// declared type, then nullability inference, then the per-field patch.
///
/// Nullability inference: a non-nullable column that somehow receives empty
/// input should become `""` rather than null, so `empty_string_if_null` is
/// set to the negation of the declared nullability. Numeric columns zero out
/// instead; `zero_if_empty` outranks the empty-string signal in the runtime
/// priority order.
pub fn determine_options(
    field: &str,
    config: &CleanConfig,
    schema: &BTreeMap<String, ColumnSchema>,
) -> FieldOptions {
    let mut options = config.clean_default.clone();

    if let Some(column) = schema.get(field) {
        if let Some(type_patch) = config.types.get(&column.column_type) {
            options.apply(type_patch);
        }
        if let Some(nullable) = column.nullable {
            options.empty_string_if_null = !nullable;
            if column.column_type.is_numeric() {
                options.zero_if_empty = true;
            }
        }
    }

    if let Some(field_patch) = config.fields.get(field) {
        options.apply(field_patch);
    }

    options
}
