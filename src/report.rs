//! Aggregates verdicts into a summary and renders the reports.

use std::cmp::Ordering;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use serde_json::json;

use crate::classify::{ProbeStatus, Verdict};
use crate::error::Result;
use crate::table::{build_markdown_table, clip_status, Align};

const STATUS_CELL_WIDTH: usize = 50;

/// Aggregate over all verdicts of one run, in input order.
#[derive(Debug)]
pub struct Summary {
    verdicts: Vec<Verdict>,
    total_elapsed_secs: f64,
}

/// The three counts CI pipelines gate on.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SummaryCounts {
    pub available_count: usize,
    pub unavailable_count: usize,
    pub total_count: usize,
}

impl Summary {
    pub fn from_verdicts(verdicts: Vec<Verdict>) -> Self {
        let total_elapsed_secs = verdicts.iter().map(|verdict| verdict.elapsed_secs).sum();
        Self {
            verdicts,
            total_elapsed_secs,
        }
    }

    pub fn verdicts(&self) -> &[Verdict] {
        &self.verdicts
    }

    pub fn total(&self) -> usize {
        self.verdicts.len()
    }

    /// Sum of per-model response times. Larger than the wall-clock duration
    /// of the run because probes overlap.
    pub fn total_elapsed_secs(&self) -> f64 {
        self.total_elapsed_secs
    }

    /// Available models, in input order.
    pub fn available(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts.iter().filter(|verdict| verdict.available)
    }

    /// Unavailable models, in input order.
    pub fn unavailable(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts.iter().filter(|verdict| !verdict.available)
    }

    /// Available models sorted fastest first; ties keep input order.
    pub fn fastest_available(&self) -> Vec<&Verdict> {
        let mut fastest: Vec<&Verdict> = self.available().collect();
        fastest.sort_by(|a, b| {
            a.elapsed_secs
                .partial_cmp(&b.elapsed_secs)
                .unwrap_or(Ordering::Equal)
        });
        fastest
    }

    pub fn all_available(&self) -> bool {
        self.verdicts.iter().all(|verdict| verdict.available)
    }

    pub fn counts(&self) -> SummaryCounts {
        let available_count = self.available().count();
        SummaryCounts {
            available_count,
            unavailable_count: self.total() - available_count,
            total_count: self.total(),
        }
    }

    /// Structured form of the whole summary for machine consumption.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "counts": self.counts(),
            "total_elapsed_secs": self.total_elapsed_secs,
            "results": self.verdicts,
        })
    }
}

/// Human-readable report: result table, counts, fastest-first list of the
/// working models, and the failure details.
pub fn render_report(summary: &Summary) -> String {
    let mut out = String::new();
    let rule = "=".repeat(60);

    out.push_str(&format!("{rule}\nMODEL AVAILABILITY TEST RESULTS\n{rule}\n\n"));

    let rows: Vec<Vec<String>> = summary
        .verdicts()
        .iter()
        .map(|verdict| {
            vec![
                verdict.model.clone(),
                verdict
                    .vendor_model
                    .clone()
                    .unwrap_or_else(|| "N/A".to_owned()),
                clip_status(&status_cell(verdict), STATUS_CELL_WIDTH),
                format!("{:.2}", verdict.elapsed_secs),
                if verdict.available { "yes" } else { "no" }.to_owned(),
            ]
        })
        .collect();
    out.push_str(&build_markdown_table(
        &["Model", "Actual Model", "Status", "Time", "Working"],
        &rows,
        &[
            Align::Left,
            Align::Left,
            Align::Left,
            Align::Right,
            Align::Center,
        ],
    ));

    let counts = summary.counts();
    out.push_str(&format!(
        "\n\nTotal models tested: {}\nAvailable models: {}\nUnavailable models: {}\n",
        counts.total_count, counts.available_count, counts.unavailable_count
    ));
    out.push_str(&format!(
        "Total testing time: {:.2} sec (sum of per-model times; probes run concurrently)\n",
        summary.total_elapsed_secs()
    ));

    let fastest = summary.fastest_available();
    if !fastest.is_empty() {
        out.push_str("\nWorking models (sorted by speed):\n");
        for verdict in fastest {
            out.push_str(&format!(
                "  - {}: {:.2} sec\n",
                verdict.model, verdict.elapsed_secs
            ));
        }
    }

    if summary.unavailable().next().is_some() {
        out.push_str("\nUnavailable models:\n");
        for verdict in summary.unavailable() {
            out.push_str(&format!("  - {}: {}\n", verdict.model, status_cell(verdict)));
        }
    }

    out.push_str(&format!("\n{rule}"));
    out
}

/// Appends the CI counts as `key=value` lines, GitHub Actions output style.
pub fn append_summary_file(path: &Path, counts: &SummaryCounts) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening summary file {}", path.display()))?;
    writeln!(file, "available_count={}", counts.available_count)?;
    writeln!(file, "unavailable_count={}", counts.unavailable_count)?;
    writeln!(file, "total_count={}", counts.total_count)?;
    Ok(())
}

fn status_cell(verdict: &Verdict) -> String {
    match verdict.status {
        ProbeStatus::Available => "Available".to_owned(),
        ProbeStatus::Timeout => "Timeout".to_owned(),
        ProbeStatus::WrongModelReturned => format!(
            "Wrong model: {}",
            verdict.detail.as_deref().unwrap_or("")
        ),
        ProbeStatus::HttpError => {
            let code = verdict
                .http_status
                .map(|code| code.to_string())
                .unwrap_or_default();
            match verdict.detail.as_deref() {
                Some(message) if message != format!("HTTP error {code}") => {
                    format!("HTTP {code}: {message}")
                }
                _ => format!("HTTP {code}"),
            }
        }
        ProbeStatus::TransportError => format!(
            "Error: {}",
            verdict.detail.as_deref().unwrap_or("request failed")
        ),
    }
}
