use crate::domain::lottery::GameType;
use crate::domain::prediction::{AlgorithmStats, BacktestResult};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Outcome of a multi-algorithm backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    pub game: GameType,
    pub test_period: String,
    pub total_draws: usize,
    pub results: Vec<BacktestResult>,
    pub stats: Vec<AlgorithmStats>,
    pub duration_ms: u64,
    pub generated_at: DateTime<Utc>,
}

/// Per-algorithm line of the summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub algorithm: String,
    pub rounds: usize,
    pub exact: usize,
    pub four: usize,
    pub three: usize,
    pub skipped: usize,
    pub exact_rate: f64,
    pub four_rate: f64,
    pub three_rate: f64,
    pub average_confidence: f64,
    pub average_match: f64,
}

impl From<&BacktestResult> for ReportRow {
    fn from(result: &BacktestResult) -> Self {
        Self {
            algorithm: result.algorithm_id.clone(),
            rounds: result.total_rounds,
            exact: result.exact_matches,
            four: result.four_matches,
            three: result.three_matches,
            skipped: result.skipped_rounds,
            exact_rate: result.exact_rate(),
            four_rate: result.four_rate(),
            three_rate: result.three_rate(),
            average_confidence: result.average_confidence,
            average_match: result.average_match_count(),
        }
    }
}

impl BacktestReport {
    pub fn rows(&self) -> Vec<ReportRow> {
        self.results.iter().map(ReportRow::from).collect()
    }

    /// Algorithm with the best overall score, if any.
    pub fn best(&self) -> Option<&AlgorithmStats> {
        self.stats
            .iter()
            .max_by(|a, b| a.overall_score().total_cmp(&b.overall_score()))
    }

    /// Fixed-width summary table for terminal output.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        let line = "=".repeat(104);
        let _ = writeln!(out, "{}", line);
        let _ = writeln!(
            out,
            "BACKTEST REPORT: {} ({}, {} draws, {}ms)",
            self.game, self.test_period, self.total_draws, self.duration_ms
        );
        let _ = writeln!(out, "{}", line);
        let _ = writeln!(
            out,
            "{:<20} | {:>6} | {:>4} | {:>4} | {:>4} | {:>7} | {:>7} | {:>7} | {:>7} | {:>8}",
            "Algorithm", "Rounds", "6", "4", "3", "Skipped", "6 %", "4 %", "3 %", "Avg conf"
        );
        let _ = writeln!(out, "{}", "-".repeat(104));

        for row in self.rows() {
            let _ = writeln!(
                out,
                "{:<20} | {:>6} | {:>4} | {:>4} | {:>4} | {:>7} | {:>6.2}% | {:>6.2}% | {:>6.2}% | {:>8.3}",
                row.algorithm,
                row.rounds,
                row.exact,
                row.four,
                row.three,
                row.skipped,
                row.exact_rate * 100.0,
                row.four_rate * 100.0,
                row.three_rate * 100.0,
                row.average_confidence
            );
        }
        let _ = writeln!(out, "{}", line);

        if let Some(best) = self.best() {
            let _ = writeln!(
                out,
                "Best: {} (overall score {:.4})",
                best.algorithm_id,
                best.overall_score()
            );
        }
        out
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize backtest report")
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write report to {}", path.display()))
    }
}
