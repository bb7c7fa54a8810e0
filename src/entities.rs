//! Data structures exchanged with a CouchDB server.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One row of a view or `_all_docs` result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewResultRow {
    /// Identifier of the document that emitted the row.
    ///
    /// Absent for rows produced by a reduce function.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Key emitted by the view (the document id for `_all_docs`).
    pub key: Value,

    /// Value emitted by the view (the revision descriptor for `_all_docs`).
    pub value: Value,

    /// Full document, present when `include_docs` was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Value>,
}

/// Result set of a view query or an `_all_docs` listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewResultSet {
    /// Total number of rows in the underlying index.
    ///
    /// Absent when the view was reduced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<u64>,

    /// Offset of the first returned row within the index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,

    /// The returned rows.
    pub rows: Vec<ViewResultRow>,
}

/// Error body returned by CouchDB, e.g. `{"error": "not_found", "reason": "missing"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouchErrorMessage {
    /// Error label.
    pub error: String,

    /// Human readable explanation.
    #[serde(default)]
    pub reason: String,
}

impl CouchErrorMessage {
    /// `CouchErrorMessage` factory.
    pub fn new<E: Into<String>, R: Into<String>>(error: E, reason: R) -> Self {
        Self {
            error: error.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CouchErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reason.is_empty() {
            write!(f, "{}", self.error)
        } else {
            write!(f, "{}: {}", self.error, self.reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn deserialize_map_view_result_set() {
        let json = json!({
            "total_rows": 42,
            "offset": 3,
            "rows": [
                {"id": "job-1", "key": ["running", "T1_IT_CNAF"], "value": 1},
                {"id": "job-2", "key": ["running", "T2_CH_CERN"], "value": 7},
            ]
        })
        .to_string();

        let result_set: ViewResultSet = serde_json::from_str(&json).unwrap();

        assert_eq!(Some(42), result_set.total_rows);
        assert_eq!(Some(3), result_set.offset);
        assert_eq!(2, result_set.rows.len());
        assert_eq!(Some("job-1".to_string()), result_set.rows[0].id);
        assert_eq!(json!(["running", "T1_IT_CNAF"]), result_set.rows[0].key);
        assert_eq!(None, result_set.rows[0].doc);
    }

    #[test]
    fn deserialize_reduced_view_result_set() {
        let json = json!({
            "rows": [
                {"key": null, "value": 1234}
            ]
        })
        .to_string();

        let result_set: ViewResultSet = serde_json::from_str(&json).unwrap();

        assert_eq!(None, result_set.total_rows);
        assert_eq!(None, result_set.rows[0].id);
        assert_eq!(json!(1234), result_set.rows[0].value);
    }

    #[test]
    fn display_couch_error_message() {
        assert_eq!(
            "not_found: missing",
            CouchErrorMessage::new("not_found", "missing").to_string()
        );
        assert_eq!(
            "unauthorized",
            CouchErrorMessage::new("unauthorized", "").to_string()
        );
    }
}
