//! Markdown report artifact for one operation

use crate::error::{NuopError, Result};
use crate::models::Timeline;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Writes `report_<operation>.md` files into one directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    directory: PathBuf,
}

impl ReportWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// File name for an operation. Characters outside `[A-Za-z0-9_-]` are
    /// replaced so the id can never leave the report directory.
    pub fn file_name(operation_id: &str) -> String {
        let safe: String = operation_id
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("report_{}.md", safe)
    }

    /// Full path of the report for an operation
    pub fn path_for(&self, operation_id: &str) -> PathBuf {
        self.directory.join(Self::file_name(operation_id))
    }

    /// Mermaid flow diagram, one node per entry, linked in order
    pub fn diagram(timeline: &Timeline) -> String {
        let nodes: Vec<String> = timeline
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                format!(
                    "s{}[\"{}<br>{}\"]",
                    i,
                    entry.record.timestamp.format("%H:%M:%S"),
                    entry.description.replace('"', "'")
                )
            })
            .collect();

        format!("```mermaid\ngraph TD;\n{}\n```", nodes.join(" --> "))
    }

    /// Report body
    pub fn render(operation_id: &str, timeline: &Timeline, narrative: &str) -> String {
        format!(
            "# Report {}\n\n## Flow\n{}\n\n## Analysis\n{}\n\n## Data\n{}\n",
            operation_id.trim(),
            Self::diagram(timeline),
            narrative.trim(),
            timeline.to_markdown()
        )
    }

    /// Write the report, replacing any previous one for the same operation
    pub async fn write(&self, operation_id: &str, timeline: &Timeline, narrative: &str) -> Result<PathBuf> {
        let path = self.path_for(operation_id);
        let content = Self::render(operation_id, timeline, narrative);

        if !self.directory.as_os_str().is_empty() && !self.directory.exists() {
            fs::create_dir_all(&self.directory).await.map_err(|e| {
                NuopError::Report(format!(
                    "Failed to create report directory {}: {}",
                    self.directory.display(),
                    e
                ))
            })?;
        }

        fs::write(&path, content)
            .await
            .map_err(|e| NuopError::Report(format!("Failed to write {}: {}", path.display(), e)))?;

        info!(path = %path.display(), "Report written");
        Ok(path)
    }
}
