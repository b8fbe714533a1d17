//! nuop CLI - settlement-status questions and NUOP flow tracing
//!
//! Main entry point for the nuop command-line tool.

use clap::{Parser, Subcommand};
use nuop::cli::{self, AppContext, OutputFormat};
use nuop::config::{load_config, LoggingConfig, NuopConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nuop")]
#[command(about = "Ask SPB settlement-status questions and trace a NUOP across storage tiers", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Model name, overrides configuration
    #[arg(long, global = true)]
    model: Option<String>,

    /// Directory for trace reports, overrides configuration
    #[arg(long, global = true)]
    report_dir: Option<PathBuf>,

    /// Log level, overrides configuration (RUST_LOG wins over both)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session (default)
    Shell,

    /// Answer one question
    Ask {
        /// Question in plain language
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Reconstruct one operation's flow and write its report
    Trace {
        /// Operation id (NUOP)
        nuop: String,
    },

    /// Check database tiers and the language model
    Health {
        /// Output format: text (default), json
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show version information
    Version {
        /// Output format: text (default), json
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match logging.format.as_str() {
        "json" => builder.json().init(),
        "pretty" => builder.pretty().init(),
        _ => builder.compact().init(),
    }
}

fn apply_overrides(config: &mut NuopConfig, args: &Cli) {
    if let Some(model) = &args.model {
        config.llm.model = model.clone();
    }
    if let Some(dir) = &args.report_dir {
        config.report.directory = dir.clone();
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Cli::parse();

    if let Some(Commands::Version { format }) = &args.command {
        cli::version(*format)?;
        return Ok(());
    }

    let mut config = load_config().await?;
    apply_overrides(&mut config, &args);
    init_logging(&config.logging);

    let ctx = AppContext::build(config)?;

    let outcome = match &args.command {
        None | Some(Commands::Shell) => cli::shell(&ctx).await,
        Some(Commands::Ask { question }) => cli::ask(&ctx, &question.join(" ")).await,
        Some(Commands::Trace { nuop }) => cli::trace(&ctx, nuop).await,
        Some(Commands::Health { format }) => match cli::health(&ctx, *format).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                ctx.shutdown().await;
                std::process::exit(1);
            }
            Err(e) => Err(e),
        },
        Some(Commands::Version { .. }) => Ok(()),
    };

    ctx.shutdown().await;
    outcome?;
    Ok(())
}
