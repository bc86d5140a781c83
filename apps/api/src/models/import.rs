#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Tracked state of one bulk spreadsheet upload. Created on upload, mutated
/// only by the import runner, read-only to API callers. Terminal once the
/// status reaches `completed` or `failed`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ImportRecordRow {
    pub id: i64,
    /// `jobs` or `careers`.
    pub kind: String,
    pub filename: String,
    pub file_size: i64,
    pub status: String,
    pub total_count: i32,
    pub success_count: i32,
    pub failed_count: i32,
    /// JSON array of `{row, field, reason}` objects; null while empty.
    pub error_details: Option<Value>,
    pub importer_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Import record lifecycle:
/// `pending -[start]-> processing -[all rows done]-> completed`,
/// `processing -[fatal error]-> failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ImportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ImportStatus::Pending => "pending",
            ImportStatus::Processing => "processing",
            ImportStatus::Completed => "completed",
            ImportStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ImportStatus::Pending),
            "processing" => Some(ImportStatus::Processing),
            "completed" => Some(ImportStatus::Completed),
            "failed" => Some(ImportStatus::Failed),
            _ => None,
        }
    }

    /// Terminal records are immutable; a new upload creates a new record.
    pub fn is_terminal(self) -> bool {
        matches!(self, ImportStatus::Completed | ImportStatus::Failed)
    }

    pub fn can_transition_to(self, next: ImportStatus) -> bool {
        matches!(
            (self, next),
            (ImportStatus::Pending, ImportStatus::Processing)
                | (ImportStatus::Processing, ImportStatus::Completed)
                | (ImportStatus::Processing, ImportStatus::Failed)
        )
    }
}

/// One structured import error. File-level errors use row 0 (data rows are
/// numbered from 2, after the header row); `field` is null unless the error
/// concerns a specific column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    pub row: u32,
    pub field: Option<String>,
    pub reason: String,
}

impl RowError {
    pub fn field(row: u32, field: &str, reason: impl Into<String>) -> Self {
        RowError {
            row,
            field: Some(field.to_string()),
            reason: reason.into(),
        }
    }

    pub fn file(reason: impl Into<String>) -> Self {
        RowError {
            row: 0,
            field: None,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for s in [
            ImportStatus::Pending,
            ImportStatus::Processing,
            ImportStatus::Completed,
            ImportStatus::Failed,
        ] {
            assert_eq!(ImportStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(ImportStatus::parse("partial"), None);
    }

    #[test]
    fn test_legal_transitions() {
        assert!(ImportStatus::Pending.can_transition_to(ImportStatus::Processing));
        assert!(ImportStatus::Processing.can_transition_to(ImportStatus::Completed));
        assert!(ImportStatus::Processing.can_transition_to(ImportStatus::Failed));
    }

    #[test]
    fn test_terminal_states_admit_no_transition() {
        for terminal in [ImportStatus::Completed, ImportStatus::Failed] {
            assert!(terminal.is_terminal());
            for next in [
                ImportStatus::Pending,
                ImportStatus::Processing,
                ImportStatus::Completed,
                ImportStatus::Failed,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_pending_cannot_skip_processing() {
        assert!(!ImportStatus::Pending.can_transition_to(ImportStatus::Completed));
        assert!(!ImportStatus::Pending.can_transition_to(ImportStatus::Failed));
    }

    #[test]
    fn test_row_error_serialization_shape() {
        let e = RowError::field(2, "title", "required");
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v, serde_json::json!({"row": 2, "field": "title", "reason": "required"}));

        let f = RowError::file("missing required column: title");
        let v = serde_json::to_value(&f).unwrap();
        assert_eq!(v["row"], 0);
        assert!(v["field"].is_null());
    }
}
