//! Common test utilities and setup

#![allow(dead_code)]

use llm::CannedCompletion;
use nuop::testing::{record_at, InMemoryStore};
use nuop::{Pipeline, ReportWriter, StorageTier};
use std::sync::Arc;
use tempfile::TempDir;

pub const TODAY: &str = "spb.operacao";
pub const YESTERDAY: &str = "consolid.operacao";
pub const ARCHIVE: &str = "consolid02.operacao";

/// An operation that started in the archive, continued yesterday and
/// settled today
pub fn three_tier_store() -> InMemoryStore {
    InMemoryStore::new()
        .with_rows(TODAY, vec![record_at(TODAY, "20240502N1", 302, Some(0), 3)])
        .with_rows(YESTERDAY, vec![record_at(YESTERDAY, "20240502N1", 313, Some(320), 2)])
        .with_rows(ARCHIVE, vec![record_at(ARCHIVE, "20240502N1", 100, None, 1)])
}

/// Pipeline over the default tiers, writing reports into a fresh directory
pub fn setup_pipeline(
    llm: Arc<CannedCompletion>,
    store: Arc<InMemoryStore>,
) -> (TempDir, Pipeline) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let pipeline = Pipeline::new(
        llm,
        store,
        StorageTier::defaults(),
        ReportWriter::new(temp_dir.path()),
    );
    (temp_dir, pipeline)
}

/// Turn off terminal colors so captured output compares as plain text
pub fn disable_colors() {
    colored::control::set_override(false);
}
