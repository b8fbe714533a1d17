//! Question and trace pipelines
//!
//! Wires the generator, store, reconstructor, summarizer and report writer
//! together. Absorbed failures come back as data with a diagnostic; language
//! model failures are returned as errors and abort only the current request.

use crate::error::{NuopError, Result};
use crate::flow::{FlowOutcome, FlowReconstructor};
use crate::models::{QueryResult, StorageTier};
use crate::report::ReportWriter;
use crate::repositories::OperationStore;
use crate::sql::{GeneratedQuery, SqlGenerator};
use crate::summarizer::Summarizer;
use llm::TextCompletion;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Outcome of one question
#[derive(Debug, Clone)]
pub struct Answer {
    /// The statement that was executed, if one was extracted
    pub query: Option<GeneratedQuery>,
    /// Matched rows; empty when nothing matched or a failure was absorbed
    pub result: QueryResult,
    /// Why the result is empty, when a failure was absorbed
    pub diagnostic: Option<String>,
}

impl Answer {
    fn absorbed(query: Option<GeneratedQuery>, diagnostic: String) -> Self {
        Self {
            query,
            result: QueryResult::empty(),
            diagnostic: Some(diagnostic),
        }
    }
}

/// Outcome of tracing one operation
#[derive(Debug, Clone)]
pub enum TraceOutcome {
    /// No tier holds the operation. `unavailable` lists tiers that could not
    /// be read, so "not found" can be told apart from "not reachable".
    NotFound { unavailable: Vec<String> },
    /// Timeline reconstructed, narrated and written
    Traced {
        flow: FlowOutcome,
        narrative: String,
        report: PathBuf,
    },
}

/// The full question-to-report pipeline
pub struct Pipeline {
    generator: SqlGenerator,
    store: Arc<dyn OperationStore>,
    flow: FlowReconstructor,
    summarizer: Summarizer,
    reports: ReportWriter,
}

impl Pipeline {
    pub fn new(
        llm: Arc<dyn TextCompletion>,
        store: Arc<dyn OperationStore>,
        tiers: Vec<StorageTier>,
        reports: ReportWriter,
    ) -> Self {
        Self {
            generator: SqlGenerator::new(llm.clone(), tiers.clone()),
            flow: FlowReconstructor::new(store.clone(), tiers),
            summarizer: Summarizer::new(llm),
            store,
            reports,
        }
    }

    pub fn reports(&self) -> &ReportWriter {
        &self.reports
    }

    /// Translate a question to SQL and run it
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let query = match self.generator.generate_query(question).await {
            Ok(query) => query,
            Err(NuopError::NoQueryFound) => {
                warn!(question = %question.trim(), "Model output held no SELECT statement");
                return Ok(Answer::absorbed(
                    None,
                    "the model did not return a SELECT statement".to_string(),
                ));
            }
            Err(e) => return Err(e),
        };

        match self.store.execute(&query).await {
            Ok(result) => {
                info!(rows = result.len(), "Question answered");
                Ok(Answer {
                    query: Some(query),
                    result,
                    diagnostic: None,
                })
            }
            Err(e) if e.is_absorbed() => {
                error!(sql = %query, error = %e, "Generated query failed");
                let diagnostic = e.to_string();
                Ok(Answer::absorbed(Some(query), diagnostic))
            }
            Err(e) => Err(e),
        }
    }

    /// Reconstruct, narrate and report on one operation
    pub async fn trace(&self, operation_id: &str) -> Result<TraceOutcome> {
        let flow = self.flow.reconstruct_detailed(operation_id).await;
        if flow.timeline.is_empty() {
            return Ok(TraceOutcome::NotFound {
                unavailable: flow.unavailable,
            });
        }

        let narrative = self
            .summarizer
            .summarize(operation_id, &flow.timeline)
            .await?;
        let report = self
            .reports
            .write(operation_id, &flow.timeline, &narrative)
            .await?;

        Ok(TraceOutcome::Traced {
            flow,
            narrative,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{record_at, InMemoryStore};
    use llm::CannedCompletion;
    use tempfile::TempDir;

    fn pipeline(llm: Arc<CannedCompletion>, store: InMemoryStore, dir: &TempDir) -> Pipeline {
        Pipeline::new(
            llm,
            Arc::new(store),
            StorageTier::defaults(),
            ReportWriter::new(dir.path()),
        )
    }

    #[tokio::test]
    async fn test_ask_executes_sanitized_sql() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(InMemoryStore::new().with_query_result(QueryResult::new(
            vec!["nuop".into()],
            vec![vec!["N1".into()]],
        )));
        let p = Pipeline::new(
            Arc::new(CannedCompletion::new(["```sql\nSELECT nuop FROM spb.operacao;\n```"])),
            store.clone(),
            StorageTier::defaults(),
            ReportWriter::new(dir.path()),
        );

        let answer = p.ask("latest operations today").await.unwrap();
        assert_eq!(answer.result.len(), 1);
        assert!(answer.diagnostic.is_none());
        assert_eq!(store.executed(), vec!["SELECT nuop FROM spb.operacao;".to_string()]);
    }

    #[tokio::test]
    async fn test_ask_absorbs_missing_select() {
        let dir = TempDir::new().unwrap();
        let p = pipeline(
            Arc::new(CannedCompletion::new(["I cannot answer that."])),
            InMemoryStore::new(),
            &dir,
        );

        let answer = p.ask("what is this").await.unwrap();
        assert!(answer.result.is_empty());
        assert!(answer.query.is_none());
        assert!(answer.diagnostic.is_some());
    }

    #[tokio::test]
    async fn test_ask_absorbs_sql_error() {
        let dir = TempDir::new().unwrap();
        let p = pipeline(
            Arc::new(CannedCompletion::new(["SELECT nope FROM spb.operacao;"])),
            InMemoryStore::new().with_query_error("column \"nope\" does not exist"),
            &dir,
        );

        let answer = p.ask("show me nope").await.unwrap();
        assert!(answer.result.is_empty());
        assert!(answer.diagnostic.unwrap().contains("does not exist"));
    }

    #[tokio::test]
    async fn test_ask_propagates_generation_failure() {
        let dir = TempDir::new().unwrap();
        let p = pipeline(
            Arc::new(CannedCompletion::failing("connection refused")),
            InMemoryStore::new(),
            &dir,
        );

        let err = p.ask("status 313 today").await.unwrap_err();
        assert!(matches!(err, NuopError::Generation(_)));
    }

    #[tokio::test]
    async fn test_trace_writes_report() {
        let dir = TempDir::new().unwrap();
        let store = InMemoryStore::new()
            .with_rows("spb.operacao", vec![record_at("spb.operacao", "N1", 302, None, 3)])
            .with_rows("consolid.operacao", vec![record_at("consolid.operacao", "N1", 100, None, 1)]);
        let p = pipeline(Arc::new(CannedCompletion::new(["Settled."])), store, &dir);

        let TraceOutcome::Traced { flow, narrative, report } = p.trace("N1").await.unwrap() else {
            panic!("expected a traced outcome");
        };
        assert_eq!(flow.timeline.len(), 2);
        assert_eq!(narrative, "Settled.");
        assert_eq!(report, dir.path().join("report_N1.md"));
        assert!(std::fs::read_to_string(report).unwrap().contains("Settled."));
    }

    #[tokio::test]
    async fn test_trace_not_found_skips_model() {
        let dir = TempDir::new().unwrap();
        let llm = Arc::new(CannedCompletion::default());
        let p = pipeline(llm.clone(), InMemoryStore::new().with_failure("spb.operacao", "down"), &dir);

        let outcome = p.trace("N404").await.unwrap();
        let TraceOutcome::NotFound { unavailable } = outcome else {
            panic!("expected not found");
        };
        assert_eq!(unavailable, vec!["spb.operacao".to_string()]);
        assert!(llm.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_trace_blank_id_is_not_found() {
        let dir = TempDir::new().unwrap();
        let llm = Arc::new(CannedCompletion::new(["Settled."]));
        let store = InMemoryStore::new()
            .with_rows("spb.operacao", vec![record_at("spb.operacao", "N1", 302, None, 3)]);
        let p = pipeline(llm.clone(), store, &dir);

        let outcome = p.trace("   ").await.unwrap();
        assert!(matches!(outcome, TraceOutcome::NotFound { ref unavailable } if unavailable.is_empty()));
        assert!(llm.prompts().is_empty());
        assert!(!dir.path().join("report_.md").exists());
    }

    #[tokio::test]
    async fn test_trace_generation_failure_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = InMemoryStore::new()
            .with_rows("spb.operacao", vec![record_at("spb.operacao", "N1", 302, None, 3)]);
        let p = pipeline(Arc::new(CannedCompletion::failing("timeout")), store, &dir);

        assert!(matches!(p.trace("N1").await, Err(NuopError::Generation(_))));
        assert!(!dir.path().join("report_N1.md").exists());
    }
}
