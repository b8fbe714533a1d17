//! Interactive operator session
//!
//! Reads one line at a time. Lines with whitespace are questions; single
//! tokens are operation ids. One failed request prints a diagnostic and the
//! loop goes on.

use crate::error::{NuopError, Result};
use crate::pipeline::{Answer, Pipeline, TraceOutcome};
use colored::Colorize;
use std::io::{BufRead, Write};
use tracing::{debug, error};

/// Keywords that end the session, compared case-insensitively
pub const QUIT_KEYWORDS: &[&str] = &["sair", "exit", "quit"];

const MAIN_PROMPT: &str = "Question or NUOP (or 'exit'): ";
const DRILL_PROMPT: &str = "Paste a NUOP to trace its flow (or Enter to skip): ";

/// A classified line of operator input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Quit,
    Empty,
    /// Free-text question
    Question(String),
    /// Literal operation id, quotes removed
    Operation(String),
}

impl Input {
    pub fn classify(line: &str) -> Self {
        let text = line.trim();
        if text.is_empty() {
            return Self::Empty;
        }
        if QUIT_KEYWORDS.iter().any(|k| text.eq_ignore_ascii_case(k)) {
            return Self::Quit;
        }
        if text.contains(char::is_whitespace) {
            return Self::Question(text.to_string());
        }
        Self::operation(text)
    }

    fn operation(text: &str) -> Self {
        let id: String = text.chars().filter(|c| *c != '\'' && *c != '"').collect();
        if id.is_empty() {
            Self::Empty
        } else {
            Self::Operation(id)
        }
    }
}

/// Line-oriented session over any reader and writer
pub struct Session<'a, R, W> {
    pipeline: &'a Pipeline,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(pipeline: &'a Pipeline, input: R, output: W) -> Self {
        Self {
            pipeline,
            input,
            output,
        }
    }

    /// Run until a quit keyword or end of input.
    ///
    /// Only failures to read or write the terminal end the loop.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let Some(line) = self.prompt(MAIN_PROMPT)? else {
                break;
            };

            match Input::classify(&line) {
                Input::Quit => break,
                Input::Empty => continue,
                Input::Question(question) => self.question(&question).await?,
                Input::Operation(id) => self.trace(&id).await?,
            }
        }
        writeln!(self.output)?;
        Ok(())
    }

    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "\n{}", text.cyan().bold())?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            debug!("End of input");
            return Ok(None);
        }
        Ok(Some(line))
    }

    async fn question(&mut self, question: &str) -> Result<()> {
        let answer = match self.pipeline.ask(question).await {
            Ok(answer) => answer,
            Err(e) => return self.failure(&e),
        };
        self.print_answer(&answer)?;

        if answer.result.is_empty() || !answer.result.has_operation_column() {
            return Ok(());
        }

        let Some(line) = self.prompt(DRILL_PROMPT)? else {
            return Ok(());
        };
        if let Input::Operation(id) = Input::operation(line.trim()) {
            self.trace(&id).await?;
        }
        Ok(())
    }

    async fn trace(&mut self, operation_id: &str) -> Result<()> {
        writeln!(self.output, "\n{} {}", "Tracing NUOP".bold(), operation_id)?;
        match self.pipeline.trace(operation_id).await {
            Ok(outcome) => self.print_trace(&outcome),
            Err(e) => self.failure(&e),
        }
    }

    fn print_answer(&mut self, answer: &Answer) -> Result<()> {
        write_answer(&mut self.output, answer)
    }

    fn print_trace(&mut self, outcome: &TraceOutcome) -> Result<()> {
        write_trace(&mut self.output, outcome)
    }

    fn failure(&mut self, err: &NuopError) -> Result<()> {
        error!(error = %err, "Request failed");
        writeln!(self.output, "{} {}", "✗".red().bold(), err.to_string().red())?;
        Ok(())
    }
}

/// Print the outcome of a question
pub fn write_answer<W: Write>(out: &mut W, answer: &Answer) -> Result<()> {
    if let Some(query) = &answer.query {
        writeln!(out, "{} {}", "SQL:".dimmed(), query.sql().dimmed())?;
    }
    if let Some(diagnostic) = &answer.diagnostic {
        writeln!(out, "{} {}", "✗".red().bold(), diagnostic.red())?;
    }

    if answer.result.is_empty() {
        writeln!(out, "{}", "⚠ Nothing found.".yellow())?;
        return Ok(());
    }

    let count = answer.result.len();
    let noun = if count == 1 { "record" } else { "records" };
    writeln!(out, "\n{}", format!("✓ Found {} {}:", count, noun).green().bold())?;
    writeln!(out, "{}", answer.result.display_view().to_markdown())?;
    Ok(())
}

/// Print the outcome of a trace
pub fn write_trace<W: Write>(out: &mut W, outcome: &TraceOutcome) -> Result<()> {
    match outcome {
        TraceOutcome::NotFound { unavailable } => {
            writeln!(out, "{}", "⚠ NUOP not found.".yellow())?;
            write_unavailable(out, unavailable)?;
        }
        TraceOutcome::Traced {
            flow,
            narrative,
            report,
        } => {
            write_unavailable(out, &flow.unavailable)?;
            writeln!(
                out,
                "{}",
                format!("✓ {} events across {}", flow.timeline.len(), flow.timeline.origins().join(", "))
                    .green()
            )?;
            writeln!(out, "\n{}\n{}", "Analysis".bold().underline(), narrative)?;
            writeln!(out, "\n{} {}", "Report saved:".green().bold(), report.display())?;
        }
    }
    Ok(())
}

fn write_unavailable<W: Write>(out: &mut W, unavailable: &[String]) -> Result<()> {
    if !unavailable.is_empty() {
        writeln!(
            out,
            "{}",
            format!("⚠ Partial data, unreadable tiers: {}", unavailable.join(", ")).yellow()
        )?;
    }
    Ok(())
}
