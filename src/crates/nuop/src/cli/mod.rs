//! CLI command implementations
//!
//! Provides command handlers for the nuop CLI binary.

pub mod context;
pub mod health;

pub use context::AppContext;

use crate::error::Result;
use crate::health::HealthChecker;
use crate::session::{write_answer, write_trace, Session};
use crate::version::VersionInfo;
use colored::Colorize;
use std::io;

/// Output format for report-style commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{}', expected text or json", other)),
        }
    }
}

/// Interactive session on stdin/stdout
pub async fn shell(ctx: &AppContext) -> Result<()> {
    println!("{}", "NUOP Trace".bold());
    println!(
        "Model {} on {} | tiers: {}",
        ctx.config().llm.model,
        ctx.config().llm.base_url,
        ctx.config()
            .database
            .tiers
            .iter()
            .map(|t| t.table.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let stdin = io::stdin();
    let mut session = Session::new(ctx.pipeline(), stdin.lock(), io::stdout());
    session.run().await
}

/// Answer one question
pub async fn ask(ctx: &AppContext, question: &str) -> Result<()> {
    let answer = ctx.pipeline().ask(question).await?;
    write_answer(&mut io::stdout(), &answer)
}

/// Trace one operation and write its report
pub async fn trace(ctx: &AppContext, operation_id: &str) -> Result<()> {
    println!("{} {}", "Tracing NUOP".bold(), operation_id.trim());
    let outcome = ctx.pipeline().trace(operation_id).await?;
    write_trace(&mut io::stdout(), &outcome)
}

/// Check every component; returns whether the system is usable
pub async fn health(ctx: &AppContext, format: OutputFormat) -> Result<bool> {
    let report = HealthChecker::check_all(ctx.config(), ctx.store(), ctx.llm()).await;

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?
        ),
        OutputFormat::Text => println!("{}", health::render_text(&report)),
    }

    Ok(report.status != crate::health::HealthStatus::Unhealthy)
}

/// Print build metadata
pub fn version(format: OutputFormat) -> Result<()> {
    let info = VersionInfo::get();
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&info).map_err(|e| e.to_string())?
        ),
        OutputFormat::Text => println!("{}", info),
    }
    Ok(())
}
