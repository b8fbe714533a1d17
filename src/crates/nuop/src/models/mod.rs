//! Domain models for nuop
//!
//! Defines storage tiers, operation records, reconstructed timelines and the
//! tabular results of generated queries.

pub mod operation;
pub mod query_result;
pub mod tier;
pub mod timeline;

pub use operation::OperationRecord;
pub use query_result::QueryResult;
pub use tier::{Retention, StorageTier};
pub use timeline::{Timeline, TimelineEntry};
