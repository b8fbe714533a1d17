//! Reconstructed operation timeline

use super::operation::OperationRecord;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// A record plus its decoded status description
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub record: OperationRecord,
    pub description: String,
}

impl TimelineEntry {
    fn from_record(record: OperationRecord) -> Self {
        let description = record.description();
        Self {
            record,
            description,
        }
    }
}

/// All records of one operation across tiers, ascending by timestamp.
///
/// Records sharing a timestamp keep their input order (tier order, then the
/// tier's own order), but that tie-break is an implementation detail and not
/// part of the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timeline {
    operation_id: String,
    entries: Vec<TimelineEntry>,
}

/// Table row for rendering a timeline
#[derive(Tabled)]
struct TimelineRow {
    #[tabled(rename = "origin")]
    origin: String,
    #[tabled(rename = "msgid")]
    message_id: String,
    #[tabled(rename = "nuop")]
    operation_id: String,
    #[tabled(rename = "codmsg")]
    message_code: String,
    #[tabled(rename = "statusop")]
    status_op: i32,
    #[tabled(rename = "statusmsg")]
    status_msg: String,
    #[tabled(rename = "time")]
    timestamp: String,
    #[tabled(rename = "description")]
    description: String,
}

impl Timeline {
    /// Merge records from any number of tiers into one ordered timeline
    pub fn from_records(operation_id: impl AsRef<str>, mut records: Vec<OperationRecord>) -> Self {
        records.sort_by_key(|r| r.timestamp);
        Self {
            operation_id: operation_id.as_ref().trim().to_string(),
            entries: records.into_iter().map(TimelineEntry::from_record).collect(),
        }
    }

    /// An empty timeline ("not found")
    pub fn empty(operation_id: impl AsRef<str>) -> Self {
        Self::from_records(operation_id, Vec::new())
    }

    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimelineEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct origins in first-seen order
    pub fn origins(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !seen.contains(&entry.record.origin.as_str()) {
                seen.push(&entry.record.origin);
            }
        }
        seen
    }

    /// Render the full timeline as a markdown table
    pub fn to_markdown(&self) -> String {
        let rows: Vec<TimelineRow> = self
            .entries
            .iter()
            .map(|e| TimelineRow {
                origin: e.record.origin.clone(),
                message_id: e.record.message_id.clone(),
                operation_id: e.record.operation_id.clone(),
                message_code: e.record.message_code.clone(),
                status_op: e.record.status_op,
                status_msg: e
                    .record
                    .status_msg
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
                timestamp: e.record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                description: e.description.clone(),
            })
            .collect();

        Table::new(rows).with(Style::markdown()).to_string()
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a TimelineEntry;
    type IntoIter = std::slice::Iter<'a, TimelineEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 2)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn record(origin: &str, msgid: &str, offset: i64, op: i32, msg: Option<i32>) -> OperationRecord {
        OperationRecord::new(origin, msgid, "N1", "STR0008", op, msg, base() + Duration::seconds(offset))
    }

    #[test]
    fn test_cross_tier_order() {
        let records = vec![
            record("spb.operacao", "a3", 3, 302, None),
            record("spb.operacao", "a1", 1, 100, None),
            record("consolid.operacao", "b2", 2, 106, Some(301)),
        ];

        let timeline = Timeline::from_records("N1", records);
        let ids: Vec<&str> = timeline.iter().map(|e| e.record.message_id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "b2", "a3"]);
        assert_eq!(timeline.entries()[1].record.origin, "consolid.operacao");
        assert_eq!(timeline.entries()[1].description, "ENVIO_SUCESSO (PROCESSANDO)");
    }

    #[test]
    fn test_origins_first_seen() {
        let timeline = Timeline::from_records(
            "N1",
            vec![
                record("consolid.operacao", "b", 0, 100, None),
                record("spb.operacao", "a", 5, 302, None),
                record("consolid.operacao", "c", 9, 302, None),
            ],
        );
        assert_eq!(timeline.origins(), vec!["consolid.operacao", "spb.operacao"]);
    }

    #[test]
    fn test_empty_timeline() {
        let timeline = Timeline::empty(" N1 ");
        assert!(timeline.is_empty());
        assert_eq!(timeline.operation_id(), "N1");
    }

    #[test]
    fn test_markdown_table() {
        let timeline = Timeline::from_records("N1", vec![record("spb.operacao", "M1", 0, 313, Some(320))]);
        let table = timeline.to_markdown();

        assert!(table.contains("| origin"));
        assert!(table.contains("AGUARD_LIB_AUTORIZ (REJ_AUTORIZADOR)"));
        assert!(table.contains("2024-05-02 10:00:00"));
        assert_eq!(table.lines().count(), 3);
    }
}
