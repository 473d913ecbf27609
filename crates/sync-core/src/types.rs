//! Column types of the local catalog.
//!
//! `ColumnType` is the engine-neutral view of a destination column that the
//! cleaning passes branch on. Database crates map their catalog names onto it
//! (see `postgresql-types`).

use std::fmt;

/// Destination column type as far as cleaning and bulk load care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    /// Boolean value
    Bool,

    /// 16-bit signed integer
    Int16,

    /// 32-bit signed integer
    Int32,

    /// 64-bit signed integer
    Int64,

    /// 32-bit IEEE 754 floating point
    Float32,

    /// 64-bit IEEE 754 floating point
    Float64,

    /// Exact decimal, kept as its textual form
    Numeric,

    /// Variable-length string, optionally bounded
    VarChar {
        /// Maximum length in characters
        length: Option<u32>,
    },

    /// Fixed-length, blank-padded string
    Char {
        /// Declared length in characters
        length: u32,
    },

    /// Unlimited text
    Text,

    /// Date only (YYYY-MM-DD)
    Date,

    /// Timestamp without time zone, stored as UTC wall time
    Timestamp,

    /// Timestamp with time zone
    TimestampTz,

    /// Anything else; passed through untouched
    Other(String),
}

impl ColumnType {
    pub fn is_integer(&self) -> bool {
        matches!(self, ColumnType::Int16 | ColumnType::Int32 | ColumnType::Int64)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, ColumnType::Float32 | ColumnType::Float64)
    }

    pub fn is_timestamp(&self) -> bool {
        matches!(self, ColumnType::Timestamp | ColumnType::TimestampTz)
    }

    pub fn is_string(&self) -> bool {
        matches!(
            self,
            ColumnType::VarChar { .. } | ColumnType::Char { .. } | ColumnType::Text
        )
    }

    /// Maximum length in characters for bounded string types.
    pub fn max_length(&self) -> Option<u32> {
        match self {
            ColumnType::VarChar { length } => *length,
            ColumnType::Char { length } => Some(*length),
            _ => None,
        }
    }

    /// Inclusive value range for sized integers.
    pub fn integer_range(&self) -> Option<(i64, i64)> {
        match self {
            ColumnType::Int16 => Some((i16::MIN as i64, i16::MAX as i64)),
            ColumnType::Int32 => Some((i32::MIN as i64, i32::MAX as i64)),
            ColumnType::Int64 => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Bool => f.write_str("BOOLEAN"),
            ColumnType::Int16 => f.write_str("SMALLINT"),
            ColumnType::Int32 => f.write_str("INTEGER"),
            ColumnType::Int64 => f.write_str("BIGINT"),
            ColumnType::Float32 => f.write_str("REAL"),
            ColumnType::Float64 => f.write_str("DOUBLE PRECISION"),
            ColumnType::Numeric => f.write_str("NUMERIC"),
            ColumnType::VarChar { length: Some(n) } => write!(f, "VARCHAR({n})"),
            ColumnType::VarChar { length: None } => f.write_str("VARCHAR"),
            ColumnType::Char { length } => write!(f, "CHAR({length})"),
            ColumnType::Text => f.write_str("TEXT"),
            ColumnType::Date => f.write_str("DATE"),
            ColumnType::Timestamp => f.write_str("TIMESTAMP"),
            ColumnType::TimestampTz => f.write_str("TIMESTAMPTZ"),
            ColumnType::Other(name) => f.write_str(name),
        }
    }
}
