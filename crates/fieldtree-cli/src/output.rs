//! Output renderers and the terminal progress line.

use std::io::{self, IsTerminal, Write};
use std::path::Path;

use anyhow::anyhow;
use fieldtree_config::{OperationRecord, Preferences};
use fieldtree_events::Event;
use fieldtree_fsops::{CompressReport, TreeOutcome};
use serde::Serialize;
use serde_json::{Value, json};

use crate::cli::OutputFormat;
use crate::context::{CliError, CliResult};

const BAR_WIDTH: usize = 30;

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

/// Draws a single updating progress line on stderr.
pub(crate) struct ProgressRenderer {
    enabled: bool,
    last_percent: Option<u32>,
}

impl ProgressRenderer {
    /// Progress is drawn only for table output on an interactive terminal.
    pub(crate) fn new(format: OutputFormat) -> Self {
        Self {
            enabled: format == OutputFormat::Table && io::stderr().is_terminal(),
            last_percent: None,
        }
    }

    pub(crate) fn render(&mut self, event: &Event) {
        if !self.enabled {
            return;
        }
        if let Event::Progress { fraction, label } = event {
            let percent = percent(*fraction);
            if self.last_percent == Some(percent) {
                return;
            }
            self.last_percent = Some(percent);
            let mut stderr = io::stderr().lock();
            let _ = write!(stderr, "\r{}", progress_line(*fraction, label));
            let _ = stderr.flush();
        }
    }

    pub(crate) fn finish(&mut self) {
        if self.enabled && self.last_percent.take().is_some() {
            eprintln!();
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent(fraction: f64) -> u32 {
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// `[#####-----]  50% label`, padded so shorter labels overwrite longer ones.
pub(crate) fn progress_line(fraction: f64, label: &str) -> String {
    let percent = percent(fraction);
    let filled = BAR_WIDTH * percent as usize / 100;
    format!(
        "[{}{}] {percent:>3}% {label:<24}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled)
    )
}

pub(crate) fn render_tree_outcome(outcome: &TreeOutcome, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(outcome),
        OutputFormat::Table => {
            println!(
                "created {} ({} new, {} sub-units)",
                outcome.device_dir.display(),
                outcome.created,
                outcome.total
            );
            Ok(())
        }
    }
}

pub(crate) fn compress_report_json(container: &Path, report: &CompressReport) -> Value {
    let failed: Vec<Value> = report
        .failed
        .iter()
        .map(|failure| {
            json!({
                "device": failure.device,
                "destination": failure.destination,
                "error": failure.error.detail(),
            })
        })
        .collect();
    json!({
        "container": container,
        "archived": report.archived,
        "failed": failed,
    })
}

pub(crate) fn compress_report_lines(report: &CompressReport) -> Vec<String> {
    let mut lines = Vec::with_capacity(report.processed() + 1);
    for device in &report.archived {
        lines.push(format!(
            "archived {:<16} -> {} ({} files)",
            device.device,
            device.archive.destination.display(),
            device.archive.files
        ));
    }
    for failure in &report.failed {
        lines.push(format!(
            "failed   {:<16} {}",
            failure.device,
            failure.error.detail()
        ));
    }
    lines.push(format!(
        "{} archived, {} failed",
        report.archived.len(),
        report.failed.len()
    ));
    lines
}

pub(crate) fn render_compress_report(
    container: &Path,
    report: &CompressReport,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&compress_report_json(container, report)),
        OutputFormat::Table => {
            for line in compress_report_lines(report) {
                println!("{line}");
            }
            Ok(())
        }
    }
}

pub(crate) fn history_lines(records: &[&OperationRecord]) -> Vec<String> {
    if records.is_empty() {
        return vec!["no operations recorded".to_string()];
    }
    let mut lines = vec![format!(
        "{:<20} {:<9} {:<8} DESCRIPTION",
        "TIMESTAMP", "KIND", "OUTCOME"
    )];
    for record in records {
        let mut line = format!(
            "{:<20} {:<9} {:<8} {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            record.kind.as_str(),
            record.outcome.as_str(),
            record.description
        );
        if let Some(detail) = &record.detail {
            line.push_str(" (");
            line.push_str(detail);
            line.push(')');
        }
        lines.push(line);
    }
    lines
}

pub(crate) fn render_history(records: &[&OperationRecord], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(records),
        OutputFormat::Table => {
            for line in history_lines(records) {
                println!("{line}");
            }
            Ok(())
        }
    }
}

pub(crate) fn render_preferences(
    path: &Path,
    prefs: &Preferences,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({
            "path": path,
            "last_root": prefs.last_root,
            "archive": prefs.archive,
            "history_len": prefs.history.len(),
        })),
        OutputFormat::Table => {
            println!("preferences: {}", path.display());
            println!(
                "last root: {}",
                prefs
                    .last_root
                    .as_ref()
                    .map_or_else(|| "<unset>".to_string(), |root| root.display().to_string())
            );
            println!("archive method: {}", prefs.archive.method);
            println!(
                "archive level: {}",
                prefs
                    .archive
                    .level
                    .map_or_else(|| "default".to_string(), |level| level.to_string())
            );
            println!("history records: {}", prefs.history.len());
            Ok(())
        }
    }
}
