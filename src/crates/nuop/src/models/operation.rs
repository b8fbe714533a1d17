//! Operation record model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of an operation table, tagged with the tier it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct OperationRecord {
    /// Source tier (table name)
    pub origin: String,

    /// Message identifier
    #[sqlx(rename = "msgid")]
    pub message_id: String,

    /// Operation identifier (NUOP), trimmed
    #[sqlx(rename = "nuop")]
    pub operation_id: String,

    /// Message code, e.g. `STR0008`
    #[sqlx(rename = "codmsg")]
    pub message_code: String,

    /// Primary status
    #[sqlx(rename = "statusop")]
    pub status_op: i32,

    /// Secondary status; absent or non-positive means none
    #[sqlx(rename = "statusmsg")]
    pub status_msg: Option<i32>,

    /// Insertion time
    #[sqlx(rename = "ts_inclusao")]
    pub timestamp: NaiveDateTime,
}

impl OperationRecord {
    /// Create a record, trimming the operation identifier
    pub fn new(
        origin: impl Into<String>,
        message_id: impl Into<String>,
        operation_id: impl AsRef<str>,
        message_code: impl Into<String>,
        status_op: i32,
        status_msg: Option<i32>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            origin: origin.into(),
            message_id: message_id.into(),
            operation_id: operation_id.as_ref().trim().to_string(),
            message_code: message_code.into(),
            status_op,
            status_msg,
            timestamp,
        }
    }

    /// Human description of this record's statuses
    pub fn description(&self) -> String {
        crate::status::describe(self.status_op, self.status_msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_new_trims_operation_id() {
        let record = OperationRecord::new(
            "spb.operacao",
            "M1",
            "  20240502000123  ",
            "STR0008",
            302,
            None,
            ts(),
        );
        assert_eq!(record.operation_id, "20240502000123");
    }

    #[test]
    fn test_description() {
        let record = OperationRecord::new("spb.operacao", "M1", "N1", "STR0008", 313, Some(320), ts());
        assert_eq!(record.description(), "AGUARD_LIB_AUTORIZ (REJ_AUTORIZADOR)");
    }
}
