//! # nuop - settlement-status questions and operation tracing
//!
//! Operators of the SPB payment platform ask questions such as
//! "which operations are waiting for authorization today?" in plain language.
//! nuop turns the question into SQL with a local language model, runs it
//! against the operation tables, and can then follow a single operation
//! (a NUOP) through every storage tier to explain what happened to it.
//!
//! ## Pipeline
//!
//! - [`sql::SqlGenerator`] renders the routing and filter rules into a prompt
//!   and [`sql::sanitize`] cuts the model output down to one statement
//! - [`repositories::OperationStore`] executes it and looks operations up
//!   per tier
//! - [`flow::FlowReconstructor`] merges the tiers into one [`Timeline`]
//! - [`summarizer::Summarizer`] narrates the timeline and
//!   [`report::ReportWriter`] saves it as a markdown report
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nuop::cli::AppContext;
//! use nuop::config::load_config;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let ctx = AppContext::build(load_config().await?)?;
//! let answer = ctx.pipeline().ask("operations with status 313 today").await?;
//! for id in answer.result.operation_ids() {
//!     ctx.pipeline().trace(&id).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod db;
pub mod flow;
pub mod health;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod repositories;
pub mod session;
pub mod sql;
pub mod status;
pub mod summarizer;
pub mod testing;
pub mod version;

// Error types and utilities
mod error;

pub use error::{NuopError, Result};

pub use config::{load_config, ConfigLoader, NuopConfig};
pub use db::Database;
pub use flow::{FlowOutcome, FlowReconstructor};
pub use health::{ComponentHealth, HealthChecker, HealthReport, HealthStatus};
pub use models::{OperationRecord, QueryResult, Retention, StorageTier, Timeline, TimelineEntry};
pub use pipeline::{Answer, Pipeline, TraceOutcome};
pub use report::ReportWriter;
pub use repositories::{OperationRepository, OperationStore};
pub use session::{Input, Session};
pub use sql::{sanitize, GeneratedQuery, SqlGenerator};
pub use summarizer::Summarizer;
pub use version::{full_version as version_info, VersionInfo};
