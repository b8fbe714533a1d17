//! Narrative summary of a reconstructed flow

use crate::error::{NuopError, Result};
use crate::models::Timeline;
use llm::TextCompletion;
use std::sync::Arc;
use tracing::{debug, info};

const ANALYSIS_TEMPLATE: &str = r#"You are a level-3 support analyst for the SPB payment system.
Analyse the flow of operation {operation_id}.

DATA:
{table}

Answer with:
1. A chronological summary.
2. A verdict.
"#;

/// Asks a language model to narrate a timeline
pub struct Summarizer {
    llm: Arc<dyn TextCompletion>,
}

impl Summarizer {
    pub fn new(llm: Arc<dyn TextCompletion>) -> Self {
        Self { llm }
    }

    /// Prompt for one timeline
    pub fn render_prompt(&self, operation_id: &str, timeline: &Timeline) -> String {
        ANALYSIS_TEMPLATE
            .replace("{table}", &timeline.to_markdown())
            .replace("{operation_id}", operation_id.trim())
    }

    /// Free-text chronological summary and verdict.
    ///
    /// Model failures are returned as [`NuopError::Generation`].
    pub async fn summarize(&self, operation_id: &str, timeline: &Timeline) -> Result<String> {
        info!(operation_id = %operation_id.trim(), entries = timeline.len(), "Summarizing flow");
        let prompt = self.render_prompt(operation_id, timeline);
        let narrative = self.llm.complete(&prompt).await.map_err(NuopError::from)?;
        debug!(chars = narrative.len(), "Narrative received");
        Ok(narrative.trim().to_string())
    }
}
