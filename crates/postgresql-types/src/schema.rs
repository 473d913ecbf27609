//! PostgreSQL schema column type conversion.
//!
//! This module maps PostgreSQL INFORMATION_SCHEMA column types to
//! [`ColumnType`] for the cleaning passes of the ingestor.

use sync_core::ColumnType;

/// Convert a PostgreSQL INFORMATION_SCHEMA column type to [`ColumnType`].
///
/// # Arguments
///
/// * `data_type` - `information_schema.columns.data_type` (e.g., "integer",
///   "character varying", "timestamp with time zone")
/// * `char_max_length` - `character_maximum_length`, set for bounded strings
///
/// # Example
///
/// ```
/// use postgresql_types::postgresql_column_type;
/// use sync_core::ColumnType;
///
/// assert_eq!(postgresql_column_type("integer", None), ColumnType::Int32);
/// assert_eq!(
///     postgresql_column_type("character", Some(2)),
///     ColumnType::Char { length: 2 }
/// );
/// ```
pub fn postgresql_column_type(data_type: &str, char_max_length: Option<i32>) -> ColumnType {
    let length = char_max_length.and_then(|n| u32::try_from(n).ok());

    match data_type.to_lowercase().as_str() {
        // Numeric types
        "smallint" | "int2" => ColumnType::Int16,
        "integer" | "int" | "int4" => ColumnType::Int32,
        "bigint" | "int8" => ColumnType::Int64,
        "real" | "float4" => ColumnType::Float32,
        "double precision" | "float8" => ColumnType::Float64,
        "numeric" | "decimal" => ColumnType::Numeric,

        // Boolean
        "boolean" | "bool" => ColumnType::Bool,

        // String types
        "text" => ColumnType::Text,
        "varchar" | "character varying" => ColumnType::VarChar { length },
        "char" | "character" | "bpchar" => ColumnType::Char {
            length: length.unwrap_or(1),
        },

        // Date/Time types
        "date" => ColumnType::Date,
        "timestamp" | "timestamp without time zone" => ColumnType::Timestamp,
        "timestamptz" | "timestamp with time zone" => ColumnType::TimestampTz,

        other => ColumnType::Other(other.to_string()),
    }
}
