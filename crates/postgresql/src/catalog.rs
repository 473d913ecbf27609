//! Table introspection from INFORMATION_SCHEMA.

use anyhow::{bail, Context, Result};
use postgresql_types::postgresql_column_type;
use std::collections::{HashMap, HashSet};
use sync_core::{ColumnSpec, TableSchema};
use tokio_postgres::Client;
use tracing::debug;

const COLUMNS_QUERY: &str = "
    SELECT column_name::TEXT,
           data_type::TEXT,
           character_maximum_length::INT,
           is_nullable::TEXT
    FROM information_schema.columns
    WHERE table_schema = 'public' AND table_name = $1
    ORDER BY ordinal_position
";

const CONSTRAINTS_QUERY: &str = "
    SELECT tc.constraint_name::TEXT,
           tc.constraint_type::TEXT,
           kcu.column_name::TEXT
    FROM information_schema.table_constraints tc
    JOIN information_schema.key_column_usage kcu
      ON tc.constraint_name = kcu.constraint_name
     AND tc.table_schema = kcu.table_schema
     AND tc.table_name = kcu.table_name
    WHERE tc.table_schema = 'public'
      AND tc.table_name = $1
      AND tc.constraint_type IN ('PRIMARY KEY', 'UNIQUE')
    ORDER BY kcu.ordinal_position
";

/// Read the columns, primary key and single-column UNIQUE constraints of
/// `public.<table_name>`.
pub async fn load_table_schema(client: &Client, table_name: &str) -> Result<TableSchema> {
    let rows = client
        .query(COLUMNS_QUERY, &[&table_name])
        .await
        .with_context(|| format!("Failed to read columns of {table_name}"))?;

    if rows.is_empty() {
        bail!("Table '{table_name}' does not exist in the local database");
    }

    let mut columns: Vec<ColumnSpec> = rows
        .iter()
        .map(|row| {
            let name: String = row.get(0);
            let data_type: String = row.get(1);
            let char_max_length: Option<i32> = row.get(2);
            let is_nullable: String = row.get(3);
            ColumnSpec {
                name,
                column_type: postgresql_column_type(&data_type, char_max_length),
                nullable: is_nullable.eq_ignore_ascii_case("YES"),
                unique: false,
            }
        })
        .collect();

    let constraint_rows = client
        .query(CONSTRAINTS_QUERY, &[&table_name])
        .await
        .with_context(|| format!("Failed to read constraints of {table_name}"))?;

    let mut constraint_columns: HashMap<String, Vec<String>> = HashMap::new();
    let mut primary_key = Vec::new();
    for row in &constraint_rows {
        let constraint_name: String = row.get(0);
        let constraint_type: String = row.get(1);
        let column_name: String = row.get(2);
        if constraint_type == "PRIMARY KEY" {
            primary_key.push(column_name.clone());
        }
        constraint_columns
            .entry(constraint_name)
            .or_default()
            .push(column_name);
    }

    let unique: HashSet<String> = constraint_columns
        .into_values()
        .filter(|cols| cols.len() == 1)
        .flatten()
        .collect();

    for column in &mut columns {
        column.unique = unique.contains(&column.name);
    }

    debug!(
        "Introspected {}: {} columns, primary key {:?}",
        table_name,
        columns.len(),
        primary_key
    );

    let schema = TableSchema::new(table_name, columns);
    Ok(if primary_key.is_empty() {
        schema
    } else {
        schema.with_primary_key(primary_key)
    })
}
