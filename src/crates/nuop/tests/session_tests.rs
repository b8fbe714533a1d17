//! Interactive session tests driven through in-memory input and output

mod common;

use common::*;
use llm::CannedCompletion;
use nuop::testing::InMemoryStore;
use nuop::{QueryResult, Session};
use std::sync::Arc;

fn nuop_rows() -> QueryResult {
    QueryResult::new(
        vec!["nuop".into(), "statusop".into(), "statusmsg".into()],
        vec![vec!["20240502N1".into(), "313".into(), "320".into()]],
    )
}

async fn run_session(pipeline: &nuop::Pipeline, input: &str) -> String {
    disable_colors();
    let mut output = Vec::new();
    {
        let mut session = Session::new(pipeline, input.as_bytes(), &mut output);
        session.run().await.unwrap();
    }
    String::from_utf8(output).unwrap()
}

#[tokio::test]
async fn test_session_survives_failed_generation() {
    let llm = Arc::new(CannedCompletion::failing("ollama is not running"));
    llm.push("SELECT nuop, statusop, statusmsg FROM spb.operacao WHERE statusmsg = 313;");
    llm.push("Held for authorization, then settled.");
    let store = Arc::new(three_tier_store().with_query_result(nuop_rows()));
    let (dir, pipeline) = setup_pipeline(llm, store);

    let output = run_session(
        &pipeline,
        "status 313 today\nstatus 313 today\n20240502N1\nexit\n",
    )
    .await;

    assert!(output.contains("Generation failed"));
    assert!(output.contains("Found 1 record:"));
    assert!(output.contains("| nuop"));
    assert!(output.contains("Held for authorization, then settled."));
    assert!(output.contains("Report saved:"));
    assert!(dir.path().join("report_20240502N1.md").exists());
}

#[tokio::test]
async fn test_literal_operation_id_skips_generation() {
    let llm = Arc::new(CannedCompletion::new(["Settled."]));
    let (_dir, pipeline) = setup_pipeline(llm.clone(), Arc::new(three_tier_store()));

    let output = run_session(&pipeline, "'20240502N1'\nsair\n").await;

    assert_eq!(llm.prompts().len(), 1);
    assert!(llm.prompts()[0].contains("operation 20240502N1"));
    assert!(output.contains("3 events across consolid02.operacao, consolid.operacao, spb.operacao"));
}

#[tokio::test]
async fn test_unknown_operation_reports_not_found() {
    let llm = Arc::new(CannedCompletion::default());
    let (_dir, pipeline) = setup_pipeline(llm.clone(), Arc::new(InMemoryStore::new()));

    let output = run_session(&pipeline, "N404\n").await;

    assert!(output.contains("NUOP not found."));
    assert!(llm.prompts().is_empty());
}

#[tokio::test]
async fn test_empty_answer_and_blank_lines() {
    let llm = Arc::new(CannedCompletion::new(["No idea, sorry."]));
    let (_dir, pipeline) = setup_pipeline(llm, Arc::new(InMemoryStore::new()));

    let output = run_session(&pipeline, "\n   \nwhat happened today\nQUIT\nN1\n").await;

    assert!(output.contains("did not return a SELECT statement"));
    assert!(output.contains("Nothing found."));
    // nothing after the quit keyword is processed
    assert!(!output.contains("Tracing NUOP"));
}

#[tokio::test]
async fn test_skip_drill_down_with_enter() {
    let llm = Arc::new(CannedCompletion::new(["SELECT nuop FROM spb.operacao;"]));
    let store = Arc::new(InMemoryStore::new().with_query_result(nuop_rows()));
    let (dir, pipeline) = setup_pipeline(llm.clone(), store);

    let output = run_session(&pipeline, "latest operations now\n\nexit\n").await;

    assert!(output.contains("Paste a NUOP"));
    assert!(!output.contains("Tracing NUOP"));
    assert_eq!(llm.prompts().len(), 1);
    assert!(!dir.path().join("report_20240502N1.md").exists());
}
