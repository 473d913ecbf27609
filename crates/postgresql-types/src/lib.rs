//! PostgreSQL type conversions for sync-core types.
//!
//! This crate maps PostgreSQL catalog types onto sync-core's `ColumnType` and
//! encodes cleaned `Cell`s in the text format of `COPY ... FROM STDIN`.
//!
//! # Modules
//!
//! - [`schema`] - INFORMATION_SCHEMA type name → ColumnType
//! - [`forward`] - Cell → COPY text field
//!
//! # Example
//!
//! ```
//! use postgresql_types::{encode_cell, postgresql_column_type};
//! use sync_core::{Cell, ColumnType};
//!
//! let ty = postgresql_column_type("character varying", Some(255));
//! assert_eq!(ty, ColumnType::VarChar { length: Some(255) });
//!
//! assert_eq!(encode_cell(&Cell::text("a\tb"), &ty), "a\\tb");
//! assert_eq!(encode_cell(&Cell::Null, &ty), "\\N");
//! ```

pub mod forward;
pub mod schema;

pub use forward::{encode_batch, encode_cell, encode_row};
pub use schema::postgresql_column_type;
