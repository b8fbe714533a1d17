//! Health report rendering

use crate::health::{HealthReport, HealthStatus};
use colored::{ColoredString, Colorize};
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct CheckRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Time (ms)")]
    time: u64,
    #[tabled(rename = "Message")]
    message: String,
}

fn status_icon(status: HealthStatus) -> &'static str {
    match status {
        HealthStatus::Healthy => "✓",
        HealthStatus::Degraded => "⚠",
        HealthStatus::Unhealthy => "✗",
    }
}

fn colorize(status: HealthStatus, text: &str) -> ColoredString {
    match status {
        HealthStatus::Healthy => text.green(),
        HealthStatus::Degraded => text.yellow(),
        HealthStatus::Unhealthy => text.red(),
    }
}

/// Plain-text rendering of a health report
pub fn render_text(report: &HealthReport) -> String {
    let rows: Vec<CheckRow> = report
        .checks
        .iter()
        .map(|check| CheckRow {
            name: check.name.clone(),
            status: format!("{} {}", status_icon(check.status), check.status),
            time: check.elapsed_ms,
            message: check.detail.clone().unwrap_or_else(|| "OK".to_string()),
        })
        .collect();

    let overall = format!("{} {}", status_icon(report.status), report.status);
    let mut text = format!(
        "{}\n\n{}: {}\n{}: {}ms\n\n{}",
        "System Health Check".bold().underline(),
        "Overall Status".bold(),
        colorize(report.status, &overall),
        "Total Response Time".bold(),
        report.total_elapsed_ms,
        Table::new(rows).with(Style::rounded())
    );

    let unreadable = report.unreadable_tiers();
    if !unreadable.is_empty() {
        text.push_str(&format!(
            "\n\n{}",
            format!("Traces will be partial, unreadable tiers: {}", unreadable.join(", ")).yellow()
        ));
    }
    text
}
