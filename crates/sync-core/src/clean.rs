//! Schema-aware cleaning of parsed chunks.
//!
//! Payload text is turned into typed [`Cell`]s that the local database will
//! accept. The passes run in this order for every row:
//!
//! 1. whitespace trim and the table's [`TableRules`] (backslash stripping,
//!    default values for blank cells)
//! 2. coercion to the destination [`ColumnType`]
//! 3. dummy-id repair: blank, `0` or NULL values in dummy-id-eligible columns
//!    are replaced by sequential integers above the highest value seen so far
//!    in the table, tracked across chunks by an [`IdHighWater`]
//!
//! Cleaning is deterministic for a given `now`, and running it again over its
//! own output changes nothing.

use crate::error::SyncError;
use crate::payload::ParsedChunk;
use crate::registry::{TableRules, DUMMY_ID_COLUMNS};
use crate::schema::{ColumnSpec, TableSchema};
use crate::types::ColumnType;
use crate::values::{Cell, LoadBatch};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::collections::BTreeMap;

const TRUE_WORDS: &[&str] = &["true", "t", "1", "yes", "y", "on"];

/// Cleans chunks of one table against its introspected schema.
#[derive(Debug, Clone)]
pub struct Cleaner<'a> {
    schema: &'a TableSchema,
    rules: TableRules,
    now: DateTime<Utc>,
}

/// Highest value seen or issued per dummy-id-eligible column, carried from
/// one chunk of a table to the next so synthesized ids never repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdHighWater {
    marks: BTreeMap<String, i64>,
}

impl IdHighWater {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest value of `column` so far, 0 when none was seen.
    pub fn get(&self, column: &str) -> i64 {
        self.marks.get(column).copied().unwrap_or(0)
    }

    fn raise(&mut self, column: &str, value: i64) {
        let mark = self.marks.entry(column.to_string()).or_insert(0);
        *mark = (*mark).max(value);
    }
}

/// Clean one parsed chunk. See [`Cleaner::clean`].
pub fn clean_chunk(
    schema: &TableSchema,
    rules: TableRules,
    parsed: ParsedChunk,
    now: DateTime<Utc>,
    ids: &mut IdHighWater,
) -> Result<LoadBatch, SyncError> {
    Cleaner::new(schema, rules, now).clean(parsed, ids)
}

impl<'a> Cleaner<'a> {
    pub fn new(schema: &'a TableSchema, rules: TableRules, now: DateTime<Utc>) -> Self {
        Self { schema, rules, now }
    }

    /// Produce a [`LoadBatch`] whose columns are the payload columns known to
    /// the schema, in payload order.
    ///
    /// Payload columns missing from the local schema are dropped with a
    /// warning. A payload with a header but no known column at all is a
    /// `SchemaMismatch`, and so is a synthesized id that no longer fits a
    /// sized integer column.
    pub fn clean(
        &self,
        parsed: ParsedChunk,
        ids: &mut IdHighWater,
    ) -> Result<LoadBatch, SyncError> {
        let mut kept: Vec<(usize, &ColumnSpec)> = Vec::new();
        for (idx, name) in parsed.columns.iter().enumerate() {
            match self.schema.column(name) {
                Some(spec) => kept.push((idx, spec)),
                None => tracing::warn!(
                    "Column {}.{} is not in the local schema, dropping it",
                    self.schema.name,
                    name
                ),
            }
        }

        if kept.is_empty() && !parsed.columns.is_empty() {
            return Err(SyncError::schema_mismatch(format!(
                "none of the payload columns {:?} exist in local table {}",
                parsed.columns, self.schema.name
            )));
        }

        let columns: Vec<ColumnSpec> = kept.iter().map(|(_, spec)| (*spec).clone()).collect();
        let mut batch = LoadBatch::new(self.schema.name.clone(), columns);
        let mut truncated: BTreeMap<&str, usize> = BTreeMap::new();

        for row in parsed.rows {
            let mut cells = Vec::with_capacity(kept.len());
            for (idx, spec) in &kept {
                let raw = row.get(*idx).cloned().unwrap_or(Cell::Null);
                let cell = self.apply_rules(spec, normalize(raw));
                let (cell, was_truncated) = self.coerce(spec, cell);
                if was_truncated {
                    *truncated.entry(spec.name.as_str()).or_default() += 1;
                }
                cells.push(cell);
            }
            batch.rows.push(cells);
        }

        for (column, count) in truncated {
            tracing::warn!(
                "Truncated {} value(s) of {}.{} to the column length",
                count,
                self.schema.name,
                column
            );
        }

        self.repair_dummy_ids(&mut batch, ids)?;

        Ok(batch)
    }

    fn apply_rules(&self, spec: &ColumnSpec, cell: Cell) -> Cell {
        let cell = match cell {
            Cell::Text(s) if self.rules.strip_backslashes.contains(&spec.name.as_str()) => {
                Cell::Text(s.replace('\\', "").trim().to_string())
            }
            other => other,
        };

        if cell.is_blank() {
            if let Some((_, value)) = self
                .rules
                .column_defaults
                .iter()
                .find(|(column, _)| *column == spec.name)
            {
                return Cell::text(*value);
            }
        }

        cell
    }

    /// Coerce to the column type. The flag reports a length truncation.
    fn coerce(&self, spec: &ColumnSpec, cell: Cell) -> (Cell, bool) {
        let ty = &spec.column_type;
        let cell = match ty {
            ColumnType::Bool => Cell::Bool(to_bool(&cell)),
            ColumnType::Int16 | ColumnType::Int32 | ColumnType::Int64 => {
                self.to_int(spec, cell)
            }
            ColumnType::Float32 | ColumnType::Float64 => self.to_float(spec, cell),
            ColumnType::Numeric => self.to_numeric(spec, cell),
            ColumnType::Date => self.to_date(spec, cell),
            ColumnType::Timestamp | ColumnType::TimestampTz => self.to_timestamp(spec, cell),
            ColumnType::VarChar { .. } | ColumnType::Char { .. } | ColumnType::Text => {
                return to_string(spec, cell);
            }
            ColumnType::Other(_) => cell,
        };
        (cell, false)
    }

    fn to_int(&self, spec: &ColumnSpec, cell: Cell) -> Cell {
        let value = match cell {
            Cell::Int(v) => Some(v),
            Cell::Bool(b) => Some(b as i64),
            Cell::Float(f) => float_to_int(f),
            Cell::Text(ref s) if s.is_empty() => return self.blank_number(spec, Cell::Int(0)),
            Cell::Text(s) => s
                .parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(float_to_int)),
            Cell::Null => return self.blank_number(spec, Cell::Int(0)),
            Cell::Date(_) | Cell::Timestamp(_) => None,
        };

        let in_range = |v: i64| {
            spec.column_type
                .integer_range()
                .map_or(true, |(min, max)| v >= min && v <= max)
        };
        Cell::Int(value.filter(|v| in_range(*v)).unwrap_or(0))
    }

    fn to_float(&self, spec: &ColumnSpec, cell: Cell) -> Cell {
        let value = match cell {
            Cell::Float(f) => Some(f),
            Cell::Int(v) => Some(v as f64),
            Cell::Text(s) => s.parse::<f64>().ok().filter(|f| !f.is_nan()),
            _ => None,
        };
        match value {
            Some(f) => Cell::Float(f),
            None => self.blank_number(spec, Cell::Float(0.0)),
        }
    }

    fn to_numeric(&self, spec: &ColumnSpec, cell: Cell) -> Cell {
        match cell {
            Cell::Int(v) => Cell::Text(v.to_string()),
            Cell::Float(f) if f.is_finite() => Cell::Text(f.to_string()),
            Cell::Text(s) if s.parse::<f64>().map_or(false, |f| f.is_finite()) => Cell::Text(s),
            _ => self.blank_number(spec, Cell::text("0")),
        }
    }

    fn blank_number(&self, spec: &ColumnSpec, zero: Cell) -> Cell {
        if spec.nullable {
            Cell::Null
        } else {
            zero
        }
    }

    fn to_date(&self, spec: &ColumnSpec, cell: Cell) -> Cell {
        match cell {
            Cell::Date(d) => Cell::Date(d),
            Cell::Timestamp(ts) => Cell::Date(ts.date_naive()),
            c if c.is_blank() && spec.nullable => Cell::Null,
            Cell::Text(s) => Cell::Date(parse_date(&s).unwrap_or_else(|| self.now.date_naive())),
            _ => Cell::Date(self.now.date_naive()),
        }
    }

    fn to_timestamp(&self, spec: &ColumnSpec, cell: Cell) -> Cell {
        match cell {
            Cell::Timestamp(ts) => Cell::Timestamp(ts),
            c if c.is_blank() && spec.nullable => Cell::Null,
            Cell::Text(s) => Cell::Timestamp(parse_timestamp(&s).unwrap_or(self.now)),
            _ => Cell::Timestamp(self.now),
        }
    }

    /// Replace blank, zero and NULL values in dummy-id-eligible columns with
    /// sequential integers above both this chunk's maximum and `ids`.
    fn repair_dummy_ids(
        &self,
        batch: &mut LoadBatch,
        ids: &mut IdHighWater,
    ) -> Result<(), SyncError> {
        let eligible: Vec<(usize, ColumnSpec)> = batch
            .columns
            .iter()
            .enumerate()
            .filter(|(_, spec)| self.is_dummy_id_column(spec))
            .map(|(idx, spec)| (idx, spec.clone()))
            .collect();

        for (idx, spec) in eligible {
            let chunk_max = batch
                .rows
                .iter()
                .filter_map(|row| id_value(&row[idx]))
                .max()
                .unwrap_or(0);
            let first = chunk_max.max(ids.get(&spec.name)).max(0).saturating_add(1);
            let ceiling = spec
                .column_type
                .integer_range()
                .map_or(i64::MAX, |(_, max)| max);

            let mut next = first;
            let mut replaced = 0usize;
            for row in batch.rows.iter_mut() {
                if !is_blank_id(&row[idx]) {
                    continue;
                }
                if next > ceiling || next == i64::MAX {
                    return Err(SyncError::schema_mismatch(format!(
                        "no dummy id left for {}.{} above {}",
                        batch.table,
                        spec.name,
                        next - 1
                    )));
                }
                row[idx] = if spec.column_type.is_integer() {
                    Cell::Int(next)
                } else {
                    Cell::Text(next.to_string())
                };
                next += 1;
                replaced += 1;
            }

            ids.raise(&spec.name, chunk_max.max(next - 1));
            if replaced > 0 {
                tracing::debug!(
                    "Synthesized {} id(s) for {}.{} starting at {}",
                    replaced,
                    batch.table,
                    spec.name,
                    first
                );
            }
        }

        Ok(())
    }

    fn is_dummy_id_column(&self, spec: &ColumnSpec) -> bool {
        if self.schema.is_primary_key(&spec.name) {
            return false;
        }
        DUMMY_ID_COLUMNS.contains(&spec.name.as_str()) || spec.unique
    }
}

fn normalize(cell: Cell) -> Cell {
    match cell {
        Cell::Text(s) => {
            let trimmed = s.trim();
            if trimmed.len() == s.len() {
                Cell::Text(s)
            } else {
                Cell::Text(trimmed.to_string())
            }
        }
        other => other,
    }
}

fn to_bool(cell: &Cell) -> bool {
    match cell {
        Cell::Bool(b) => *b,
        Cell::Int(v) => *v == 1,
        Cell::Text(s) => TRUE_WORDS.iter().any(|w| s.eq_ignore_ascii_case(w)),
        _ => false,
    }
}

fn to_string(spec: &ColumnSpec, cell: Cell) -> (Cell, bool) {
    let text = match cell {
        Cell::Null if spec.nullable => return (Cell::Null, false),
        Cell::Null => String::new(),
        Cell::Text(s) => s,
        Cell::Bool(b) => b.to_string(),
        Cell::Int(v) => v.to_string(),
        Cell::Float(f) => f.to_string(),
        Cell::Date(d) => d.to_string(),
        Cell::Timestamp(ts) => ts.to_rfc3339(),
    };

    match spec.column_type.max_length() {
        Some(max) if text.chars().count() > max as usize => {
            (Cell::Text(text.chars().take(max as usize).collect()), true)
        }
        _ => (Cell::Text(text), false),
    }
}

fn float_to_int(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn id_value(cell: &Cell) -> Option<i64> {
    match cell {
        Cell::Int(v) => Some(*v),
        Cell::Text(s) => s.parse().ok(),
        _ => None,
    }
}

fn is_blank_id(cell: &Cell) -> bool {
    match cell {
        Cell::Null => true,
        Cell::Int(v) => *v == 0,
        Cell::Text(s) => s.is_empty() || s == "0",
        _ => false,
    }
}

/// Parse the timestamp forms PostgreSQL and common exports produce. Values
/// without an offset are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(ts) = DateTime::parse_from_str(s, format) {
            return Some(ts.with_timezone(&Utc));
        }
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parse a date, accepting a full timestamp and keeping its UTC date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(s).map(|ts| ts.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::parse_payload;
    use crate::registry::rules_for;
    use crate::ErrorKind;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn politician_schema() -> TableSchema {
        TableSchema::new(
            "politician_politician",
            vec![
                ColumnSpec::new("id", ColumnType::Int64).not_null().unique(),
                ColumnSpec::new("first_name", ColumnType::VarChar { length: Some(5) }),
                ColumnSpec::new("middle_name", ColumnType::VarChar { length: Some(255) }),
                ColumnSpec::new("gender", ColumnType::VarChar { length: Some(1) }),
                ColumnSpec::new("is_battleground_race", ColumnType::Bool).not_null(),
                ColumnSpec::new("date_last_updated", ColumnType::TimestampTz).not_null(),
                ColumnSpec::new("date_of_death", ColumnType::Timestamp),
                ColumnSpec::new("birth_date", ColumnType::Date),
                ColumnSpec::new("ballotpedia_id", ColumnType::Int32).not_null(),
                ColumnSpec::new("bioguide_id", ColumnType::VarChar { length: Some(200) }),
                ColumnSpec::new("we_vote_id", ColumnType::VarChar { length: Some(255) })
                    .unique(),
                ColumnSpec::new("vote_usa_id", ColumnType::Float64),
            ],
        )
    }

    fn clean(schema: &TableSchema, payload: &str) -> LoadBatch {
        clean_chunk(
            schema,
            rules_for(&schema.name),
            parse_payload(payload),
            now(),
            &mut IdHighWater::new(),
        )
        .unwrap()
    }

    fn column(batch: &LoadBatch, name: &str) -> Vec<Cell> {
        batch
            .column_values(name)
            .unwrap()
            .into_iter()
            .cloned()
            .collect()
    }

    #[test]
    fn test_booleans() {
        let schema = politician_schema();
        let batch = clean(
            &schema,
            "id|is_battleground_race\n1|t\n2|YES\n3|On\n4|f\n5|\\N\n6|\n7|maybe\n8|1\n",
        );
        assert_eq!(
            column(&batch, "is_battleground_race"),
            vec![
                Cell::Bool(true),
                Cell::Bool(true),
                Cell::Bool(true),
                Cell::Bool(false),
                Cell::Bool(false),
                Cell::Bool(false),
                Cell::Bool(false),
                Cell::Bool(true),
            ]
        );
    }

    #[test]
    fn test_timestamps() {
        let schema = politician_schema();
        let batch = clean(
            &schema,
            "id|date_last_updated|date_of_death\n\
             1|2023-05-06 07:08:09.5+02|2020-01-01 00:00:00\n\
             2||\n\
             3|not a date|garbage\n",
        );

        let updated = column(&batch, "date_last_updated");
        assert_eq!(
            updated[0],
            Cell::Timestamp(
                Utc.with_ymd_and_hms(2023, 5, 6, 5, 8, 9).unwrap()
                    + chrono::Duration::milliseconds(500)
            )
        );
        assert_eq!(updated[1], Cell::Timestamp(now()));
        assert_eq!(updated[2], Cell::Timestamp(now()));

        let death = column(&batch, "date_of_death");
        assert_eq!(
            death[0],
            Cell::Timestamp(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(death[1], Cell::Null);
        assert_eq!(death[2], Cell::Timestamp(now()));
    }

    #[test]
    fn test_dates() {
        let schema = politician_schema();
        let batch = clean(&schema, "id|birth_date\n1|1970-02-03\n2|\\N\n3|03/02/1970\n");
        assert_eq!(
            column(&batch, "birth_date"),
            vec![
                Cell::Date(NaiveDate::from_ymd_opt(1970, 2, 3).unwrap()),
                Cell::Null,
                Cell::Date(now().date_naive()),
            ]
        );
    }

    #[test]
    fn test_integers_and_floats() {
        let schema = politician_schema();
        let batch = clean(
            &schema,
            "id|ballotpedia_id|vote_usa_id\n1|42|1.5\n2|abc|x\n3|7.0|\\N\n4|99999999999|\n",
        );
        assert_eq!(
            column(&batch, "ballotpedia_id"),
            vec![Cell::Int(42), Cell::Int(0), Cell::Int(7), Cell::Int(0)]
        );
        assert_eq!(
            column(&batch, "vote_usa_id"),
            vec![Cell::Float(1.5), Cell::Null, Cell::Null, Cell::Null]
        );
    }

    #[test]
    fn test_politician_rules() {
        let schema = politician_schema();
        let batch = clean(
            &schema,
            "id|middle_name|gender\n1|J\\\\.|\n2| Q |F\n3|\\N|\\N\n",
        );
        assert_eq!(
            column(&batch, "middle_name"),
            vec![Cell::text("J."), Cell::text("Q"), Cell::Null]
        );
        assert_eq!(
            column(&batch, "gender"),
            vec![Cell::text("U"), Cell::text("F"), Cell::text("U")]
        );
    }

    #[test]
    fn test_varchar_truncation() {
        let schema = politician_schema();
        let batch = clean(&schema, "id|first_name\n1|Alexandria\n2|Bo\n");
        assert_eq!(
            column(&batch, "first_name"),
            vec![Cell::text("Alexa"), Cell::text("Bo")]
        );
    }

    #[test]
    fn test_dummy_ids_for_configured_columns() {
        let schema = politician_schema();
        let batch = clean(
            &schema,
            "id|bioguide_id\n1|\n2|7\n3|0\n4|\\N\n5|3\n",
        );
        assert_eq!(
            column(&batch, "bioguide_id"),
            vec![
                Cell::text("8"),
                Cell::text("7"),
                Cell::text("9"),
                Cell::text("10"),
                Cell::text("3"),
            ]
        );
    }

    #[test]
    fn test_dummy_ids_for_unique_columns() {
        let schema = politician_schema();
        let batch = clean(&schema, "id|we_vote_id\n1|\n2|\n");
        assert_eq!(
            column(&batch, "we_vote_id"),
            vec![Cell::text("1"), Cell::text("2")]
        );
    }

    #[test]
    fn test_dummy_ids_continue_across_chunks() {
        let schema = politician_schema();
        let rules = rules_for(&schema.name);
        let mut ids = IdHighWater::new();

        let first = clean_chunk(
            &schema,
            rules,
            parse_payload("id|we_vote_id\n1|\n2|\n"),
            now(),
            &mut ids,
        )
        .unwrap();
        let second = clean_chunk(
            &schema,
            rules,
            parse_payload("id|we_vote_id\n3|\\N\n4|0\n"),
            now(),
            &mut ids,
        )
        .unwrap();

        assert_eq!(
            column(&first, "we_vote_id"),
            vec![Cell::text("1"), Cell::text("2")]
        );
        assert_eq!(
            column(&second, "we_vote_id"),
            vec![Cell::text("3"), Cell::text("4")]
        );
        assert_eq!(ids.get("we_vote_id"), 4);
    }

    #[test]
    fn test_dummy_ids_stay_within_the_integer_type() {
        let schema = TableSchema::new(
            "office_office",
            vec![
                ColumnSpec::new("id", ColumnType::Int64).not_null(),
                ColumnSpec::new("ballotpedia_office_id", ColumnType::Int16).unique(),
            ],
        );
        let payload = "id|ballotpedia_office_id\n1|32767\n2|\n";

        let err = clean_chunk(
            &schema,
            TableRules::default(),
            parse_payload(payload),
            now(),
            &mut IdHighWater::new(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
        assert!(err.message().contains("ballotpedia_office_id"));
    }

    #[test]
    fn test_primary_key_is_never_rewritten() {
        let schema = politician_schema();
        let batch = clean(&schema, "id|first_name\n0|a\n");
        assert_eq!(column(&batch, "id"), vec![Cell::Int(0)]);
    }

    #[test]
    fn test_unknown_columns_are_dropped() {
        let schema = politician_schema();
        let batch = clean(&schema, "id|legacy_column|first_name\n1|x|Ann\n");
        assert_eq!(batch.column_names(), vec!["id", "first_name"]);
        assert_eq!(batch.rows[0], vec![Cell::Int(1), Cell::text("Ann")]);
    }

    #[test]
    fn test_no_known_columns_is_schema_mismatch() {
        let schema = politician_schema();
        let err = clean_chunk(
            &schema,
            TableRules::default(),
            parse_payload("foo|bar\n1|2\n"),
            now(),
            &mut IdHighWater::new(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
    }

    #[test]
    fn test_empty_payload_yields_empty_batch() {
        let schema = politician_schema();
        let batch = clean(&schema, "");
        assert!(batch.is_empty());
        assert!(batch.columns.is_empty());
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let schema = politician_schema();
        let payload = "id|first_name|gender|is_battleground_race|date_last_updated|\
                       ballotpedia_id|bioguide_id|we_vote_id|vote_usa_id|birth_date\n\
                       1| Alexandria ||yes|2023-01-01 00:00:00+00|12|0||2.5|2001-01-01\n\
                       2|Bo|M|no||x|\\N|wv1|\\N|\n";
        let rules = rules_for(&schema.name);
        let first = clean_chunk(
            &schema,
            rules,
            parse_payload(payload),
            now(),
            &mut IdHighWater::new(),
        )
        .unwrap();

        let again = ParsedChunk {
            columns: first.column_names().iter().map(|s| s.to_string()).collect(),
            rows: first.rows.clone(),
            rejected: 0,
        };
        let second =
            clean_chunk(&schema, rules, again, now(), &mut IdHighWater::new()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_timestamp_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(parse_timestamp("2024-01-02T03:04:05Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02 03:04:05+00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02 05:04:05+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02 03:04:05"), Some(expected));
        assert!(parse_timestamp("yesterday").is_none());
    }
}
