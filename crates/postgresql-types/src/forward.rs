//! Forward conversion: Cell → COPY text field
//!
//! Rows are written in PostgreSQL's text COPY format: fields separated by tab,
//! rows terminated by newline, `\N` for NULL, and backslash escapes for
//! backslash, tab, newline and carriage return inside values.

use chrono::SecondsFormat;
use std::borrow::Cow;
use sync_core::{Cell, ColumnType, LoadBatch};

/// NULL marker of the text COPY format.
pub const COPY_NULL: &str = "\\N";

const FIELD_SEPARATOR: char = '\t';
const ROW_TERMINATOR: char = '\n';

/// Encode one cell for a column of type `column_type`.
pub fn encode_cell<'a>(cell: &'a Cell, column_type: &ColumnType) -> Cow<'a, str> {
    match cell {
        Cell::Null => Cow::Borrowed(COPY_NULL),
        Cell::Bool(b) => Cow::Borrowed(if *b { "t" } else { "f" }),
        Cell::Int(v) => Cow::Owned(v.to_string()),
        Cell::Float(f) => Cow::Owned(encode_float(*f)),
        Cell::Date(d) => Cow::Owned(d.format("%Y-%m-%d").to_string()),
        Cell::Timestamp(ts) => match column_type {
            ColumnType::Timestamp => Cow::Owned(
                ts.naive_utc()
                    .format("%Y-%m-%d %H:%M:%S%.6f")
                    .to_string(),
            ),
            ColumnType::Date => Cow::Owned(ts.date_naive().format("%Y-%m-%d").to_string()),
            _ => Cow::Owned(ts.to_rfc3339_opts(SecondsFormat::Micros, true)),
        },
        Cell::Text(s) => escape(s),
    }
}

/// Encode one row, including its terminator, into `out`.
pub fn encode_row(out: &mut String, cells: &[Cell], columns: &[ColumnType]) {
    for (i, (cell, ty)) in cells.iter().zip(columns).enumerate() {
        if i > 0 {
            out.push(FIELD_SEPARATOR);
        }
        out.push_str(&encode_cell(cell, ty));
    }
    out.push(ROW_TERMINATOR);
}

/// Encode every row of a batch as one COPY text buffer.
pub fn encode_batch(batch: &LoadBatch) -> String {
    let types: Vec<ColumnType> = batch
        .columns
        .iter()
        .map(|c| c.column_type.clone())
        .collect();

    let mut out = String::with_capacity(batch.rows.len() * 64);
    for row in &batch.rows {
        encode_row(&mut out, row, &types);
    }
    out
}

fn encode_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        let s = if f > 0.0 { "Infinity" } else { "-Infinity" };
        s.to_string()
    } else {
        f.to_string()
    }
}

fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(['\\', '\t', '\n', '\r']) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use sync_core::ColumnSpec;

    #[test]
    fn test_escape_special_characters() {
        let ty = ColumnType::Text;
        assert_eq!(encode_cell(&Cell::text("plain"), &ty), "plain");
        assert_eq!(encode_cell(&Cell::text("a\\b"), &ty), "a\\\\b");
        assert_eq!(encode_cell(&Cell::text("a\tb"), &ty), "a\\tb");
        assert_eq!(encode_cell(&Cell::text("a\nb\r"), &ty), "a\\nb\\r");
        assert_eq!(encode_cell(&Cell::text("\\N"), &ty), "\\\\N");
    }

    #[test]
    fn test_scalar_encoding() {
        assert_eq!(encode_cell(&Cell::Null, &ColumnType::Int64), "\\N");
        assert_eq!(encode_cell(&Cell::Bool(true), &ColumnType::Bool), "t");
        assert_eq!(encode_cell(&Cell::Bool(false), &ColumnType::Bool), "f");
        assert_eq!(encode_cell(&Cell::Int(-7), &ColumnType::Int32), "-7");
        assert_eq!(encode_cell(&Cell::Float(1.5), &ColumnType::Float64), "1.5");
        assert_eq!(
            encode_cell(&Cell::Float(f64::NEG_INFINITY), &ColumnType::Float64),
            "-Infinity"
        );
        assert_eq!(
            encode_cell(
                &Cell::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()),
                &ColumnType::Date
            ),
            "2024-02-29"
        );
    }

    #[test]
    fn test_timestamp_encoding() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            encode_cell(&Cell::Timestamp(ts), &ColumnType::TimestampTz),
            "2024-01-02T03:04:05.000000Z"
        );
        assert_eq!(
            encode_cell(&Cell::Timestamp(ts), &ColumnType::Timestamp),
            "2024-01-02 03:04:05.000000"
        );
    }

    #[test]
    fn test_encode_batch() {
        let mut batch = LoadBatch::new(
            "party_party",
            vec![
                ColumnSpec::new("id", ColumnType::Int64),
                ColumnSpec::new("party_name", ColumnType::Text),
            ],
        );
        batch.rows.push(vec![Cell::Int(1), Cell::text("Green\tParty")]);
        batch.rows.push(vec![Cell::Int(2), Cell::Null]);

        assert_eq!(encode_batch(&batch), "1\tGreen\\tParty\n2\t\\N\n");
    }
}
