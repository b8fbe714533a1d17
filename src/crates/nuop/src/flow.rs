//! Cross-tier flow reconstruction
//!
//! An operation's messages are spread over the tier tables as it ages. The
//! reconstructor queries every tier for the operation id, merges the rows and
//! re-establishes a single time order.
//!
//! Rows from different tiers with equal timestamps have no defined relative
//! order. The merge sort is stable, so tier order usually survives, but
//! nothing downstream may depend on it.

use crate::models::{OperationRecord, StorageTier, Timeline};
use crate::repositories::OperationStore;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of a reconstruction, labelling tiers that could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowOutcome {
    pub timeline: Timeline,
    /// Tables whose lookup failed and contributed nothing
    pub unavailable: Vec<String>,
}

impl FlowOutcome {
    /// Whether some tier was skipped
    pub fn is_partial(&self) -> bool {
        !self.unavailable.is_empty()
    }
}

/// Builds timelines from the configured tiers
pub struct FlowReconstructor {
    store: Arc<dyn OperationStore>,
    tiers: Vec<StorageTier>,
}

impl FlowReconstructor {
    pub fn new(store: Arc<dyn OperationStore>, tiers: Vec<StorageTier>) -> Self {
        Self { store, tiers }
    }

    pub fn tiers(&self) -> &[StorageTier] {
        &self.tiers
    }

    /// Timeline for `operation_id`; empty when no tier has it
    pub async fn reconstruct(&self, operation_id: &str) -> Timeline {
        self.reconstruct_detailed(operation_id).await.timeline
    }

    /// Timeline plus the list of tiers that failed.
    ///
    /// Tier lookups run concurrently. A failing tier is logged and skipped;
    /// the others still contribute.
    pub async fn reconstruct_detailed(&self, operation_id: &str) -> FlowOutcome {
        let target = operation_id.trim();
        // An empty pattern would match every row of every tier.
        if target.is_empty() {
            warn!("Blank operation id, skipping lookup");
            return FlowOutcome {
                timeline: Timeline::from_records(target, Vec::new()),
                unavailable: Vec::new(),
            };
        }
        info!(operation_id = %target, tiers = self.tiers.len(), "Reconstructing flow");

        let lookups = self
            .tiers
            .iter()
            .map(|tier| self.store.lookup(tier, target));
        let results = join_all(lookups).await;

        let mut records: Vec<OperationRecord> = Vec::new();
        let mut unavailable = Vec::new();
        for (tier, result) in self.tiers.iter().zip(results) {
            match result {
                Ok(rows) => records.extend(rows),
                Err(e) => {
                    warn!(tier = %tier, error = %e, "Tier lookup failed, skipping");
                    unavailable.push(tier.table.clone());
                }
            }
        }

        let timeline = Timeline::from_records(target, records);
        info!(
            operation_id = %target,
            entries = timeline.len(),
            skipped = unavailable.len(),
            "Flow reconstructed"
        );

        FlowOutcome {
            timeline,
            unavailable,
        }
    }
}
