//! Parsing of chunk payloads.
//!
//! A payload is UTF-8 text: a header row of column names, then one line per
//! row, fields separated by `|`, `\N` for SQL NULL. The master writes it with
//! `COPY ... (FORMAT csv)`, so fields containing the delimiter, a quote or a
//! newline arrive wrapped in double quotes with inner quotes doubled. A quote
//! anywhere else is plain text.
//!
//! Lines whose field count differs from the header are dropped and counted in
//! [`ParsedChunk::rejected`]; they still count towards the chunk's record
//! count so the ingestor's end-of-table test is not fooled by a bad line.

use crate::values::Cell;

/// Field delimiter.
pub const DELIMITER: char = '|';

/// NULL marker.
pub const NULL_MARKER: &str = "\\N";

const QUOTE: char = '"';

/// The rows of one payload, still untyped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedChunk {
    pub columns: Vec<String>,
    /// Only `Cell::Null` and `Cell::Text`.
    pub rows: Vec<Vec<Cell>>,
    /// Lines dropped for a field count mismatch.
    pub rejected: usize,
}

impl ParsedChunk {
    /// Data lines in the payload, accepted or not.
    pub fn record_count(&self) -> usize {
        self.rows.len() + self.rejected
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parse a payload. An empty payload yields an empty chunk with no columns.
pub fn parse_payload(payload: &str) -> ParsedChunk {
    let mut records = split_records(payload).into_iter();

    let columns: Vec<String> = match records.next() {
        Some(header) => header.into_iter().map(|f| f.unwrap_or_default()).collect(),
        None => return ParsedChunk::default(),
    };

    let mut chunk = ParsedChunk {
        columns,
        ..ParsedChunk::default()
    };

    for fields in records {
        if fields.len() != chunk.columns.len() {
            tracing::debug!(
                "Dropping line with {} fields, header has {}",
                fields.len(),
                chunk.columns.len()
            );
            chunk.rejected += 1;
            continue;
        }
        chunk.rows.push(
            fields
                .into_iter()
                .map(|f| f.map(Cell::Text).unwrap_or(Cell::Null))
                .collect(),
        );
    }

    chunk
}

/// Split into records of fields. A trailing `\r` is dropped from each line
/// and empty lines are skipped.
///
/// A record is normally one line. It only spans several lines when a field
/// opens with a quote and that quote closes cleanly on a later line;
/// otherwise the line is split on the delimiter alone, so a stray quote can
/// never swallow the rows after it.
fn split_records(payload: &str) -> Vec<Vec<Option<String>>> {
    let lines: Vec<&str> = payload
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    let mut records = Vec::new();
    let mut index = 0;
    while index < lines.len() {
        let line = lines[index];
        if line.is_empty() {
            index += 1;
            continue;
        }
        match split_quoted(&lines, index) {
            Some((fields, next)) => {
                records.push(fields);
                index = next;
            }
            None => {
                records.push(split_plain(line));
                index += 1;
            }
        }
    }

    records
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldState {
    Start,
    Plain,
    Quoted,
    /// A quote inside a quoted field: the field's end or the first half of
    /// a doubled quote.
    QuoteSeen,
}

/// Fields of the record starting at `lines[first]` and the index of the line
/// after it. `None` when a quoted field is malformed or never closes.
fn split_quoted(lines: &[&str], first: usize) -> Option<(Vec<Option<String>>, usize)> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut state = FieldState::Start;
    let mut index = first;

    loop {
        let line = lines.get(index)?;
        for ch in line.chars() {
            state = match state {
                FieldState::Quoted if ch == QUOTE => FieldState::QuoteSeen,
                FieldState::Quoted => {
                    current.push(ch);
                    FieldState::Quoted
                }
                FieldState::QuoteSeen if ch == QUOTE => {
                    current.push(QUOTE);
                    FieldState::Quoted
                }
                FieldState::QuoteSeen if ch == DELIMITER => {
                    fields.push(Some(std::mem::take(&mut current)));
                    FieldState::Start
                }
                FieldState::QuoteSeen => return None,
                FieldState::Start if ch == QUOTE => FieldState::Quoted,
                FieldState::Start | FieldState::Plain if ch == DELIMITER => {
                    fields.push(finish_field(std::mem::take(&mut current)));
                    FieldState::Start
                }
                FieldState::Start | FieldState::Plain => {
                    current.push(ch);
                    FieldState::Plain
                }
            };
        }
        index += 1;

        match state {
            FieldState::Quoted => current.push('\n'),
            FieldState::QuoteSeen => {
                fields.push(Some(current));
                return Some((fields, index));
            }
            FieldState::Start | FieldState::Plain => {
                fields.push(finish_field(current));
                return Some((fields, index));
            }
        }
    }
}

/// Split one line on the delimiter, quotes taken literally.
fn split_plain(line: &str) -> Vec<Option<String>> {
    line.split(DELIMITER)
        .map(|field| finish_field(field.to_string()))
        .collect()
}

/// `None` is SQL NULL. Only unquoted fields can be NULL, so a quoted `"\N"`
/// stays literal text.
fn finish_field(value: String) -> Option<String> {
    if value == NULL_MARKER {
        None
    } else {
        Some(value)
    }
}
