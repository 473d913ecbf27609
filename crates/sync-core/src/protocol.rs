//! JSON bodies and query strings of the master's HTTP surface.
//!
//! Field names are part of the wire contract shared with deployed clients, so
//! they are spelled out with serde attributes rather than derived from Rust
//! names.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Format of `started_date` in progress responses.
pub const STARTED_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `GET /sync/row-count`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowCountResponse {
    /// Decimal integer as a string.
    #[serde(rename = "rowCount")]
    pub row_count: String,
}

impl RowCountResponse {
    pub fn new(count: i64) -> Self {
        Self {
            row_count: count.to_string(),
        }
    }

    pub fn count(&self) -> Option<i64> {
        self.row_count.trim().parse().ok()
    }
}

/// `GET /sync/chunk` query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRequest {
    pub table_name: String,
    pub start: i64,
    pub end: i64,
}

/// `GET /sync/chunk` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkResponse {
    pub success: bool,
    pub status: String,
    #[serde(default)]
    pub files: BTreeMap<String, String>,
}

impl ChunkResponse {
    pub fn ok(table_name: &str, payload: String, status: impl Into<String>) -> Self {
        let mut files = BTreeMap::new();
        files.insert(table_name.to_string(), payload);
        Self {
            success: true,
            status: status.into(),
            files,
        }
    }

    pub fn failed(status: impl Into<String>) -> Self {
        Self {
            success: false,
            status: status.into(),
            files: BTreeMap::new(),
        }
    }

    pub fn payload(&self, table_name: &str) -> Option<&str> {
        self.files.get(table_name).map(String::as_str)
    }
}

/// `GET /sync/progress` query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressQuery {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub initialize: bool,
    #[serde(default)]
    pub session_token: String,
}

/// `GET /sync/progress` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub success: bool,
    pub status: String,
    #[serde(default)]
    pub is_running: bool,
    #[serde(default)]
    pub started_date: String,
    #[serde(default)]
    pub table_name: String,
    #[serde(default)]
    pub chunk: i64,
    #[serde(default)]
    pub current_record: i64,
    #[serde(default)]
    pub total_records: i64,
}

impl ProgressResponse {
    pub fn failed(status: impl Into<String>) -> Self {
        Self {
            success: false,
            status: status.into(),
            ..Self::default()
        }
    }
}

/// `GET /sync/progress/update` query. Absent, empty and zero values leave the
/// stored field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdateQuery {
    #[serde(default)]
    pub session_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_int"
    )]
    pub additional_records: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_int"
    )]
    pub chunk: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_int"
    )]
    pub total_records: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_flag"
    )]
    pub is_running: Option<bool>,
}

/// `GET /sync/progress/update` body. `row_id` is -1 on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdateResponse {
    pub success: bool,
    pub status: String,
    pub row_id: i64,
}

impl ProgressUpdateResponse {
    pub fn failed(status: impl Into<String>) -> Self {
        Self {
            success: false,
            status: status.into(),
            row_id: -1,
        }
    }
}

/// Query-string boolean: `true/t/1/yes/y/on` in any case.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "t" | "1" | "yes" | "y" | "on"
    )
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(parse_flag(&raw))
}

fn lenient_opt_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_flag(&s)))
}

fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_count_wire_name() {
        let json = serde_json::to_value(RowCountResponse::new(42)).unwrap();
        assert_eq!(json, serde_json::json!({ "rowCount": "42" }));
        let parsed: RowCountResponse = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.count(), Some(42));
    }

    #[test]
    fn test_chunk_response_payload() {
        let response = ChunkResponse::ok("party_party", "id\n1\n".into(), "done");
        assert_eq!(response.payload("party_party"), Some("id\n1\n"));
        assert_eq!(response.payload("election_election"), None);
        assert!(ChunkResponse::failed("nope").files.is_empty());
    }

    #[test]
    fn test_chunk_response_without_files() {
        let parsed: ChunkResponse =
            serde_json::from_str(r#"{"success": false, "status": "bad table"}"#).unwrap();
        assert!(!parsed.success);
        assert!(parsed.files.is_empty());
    }

    #[test]
    fn test_parse_flag() {
        for truthy in ["true", "True", "t", "1", "YES", "y", "on"] {
            assert!(parse_flag(truthy), "{truthy}");
        }
        for falsy in ["false", "0", "", "no", "off", "maybe"] {
            assert!(!parse_flag(falsy), "{falsy}");
        }
    }

    #[test]
    fn test_update_failure_row_id() {
        let response = ProgressUpdateResponse::failed("no row");
        assert_eq!(response.row_id, -1);
        assert!(!response.success);
    }
}
