//! Collection helpers shared by the in-memory and JSON repositories.

use crate::domain::lottery::Draw;
use crate::domain::prediction::{AlgorithmStats, BacktestResult, EnsembleResult};
use chrono::{DateTime, Utc};

/// Upsert by sequence index, keeping `stored` ascending. Returns how many were new.
pub fn merge_draws(stored: &mut Vec<Draw>, incoming: &[Draw]) -> usize {
    let mut inserted = 0;
    for draw in incoming {
        match stored.binary_search_by_key(&draw.sequence_index(), |d| d.sequence_index()) {
            Ok(pos) => stored[pos] = draw.clone(),
            Err(pos) => {
                stored.insert(pos, draw.clone());
                inserted += 1;
            }
        }
    }
    inserted
}

/// Last `limit` draws, still ascending.
pub fn latest_draws(stored: &[Draw], limit: usize) -> Vec<Draw> {
    stored[stored.len().saturating_sub(limit)..].to_vec()
}

pub fn draws_between(stored: &[Draw], from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<Draw> {
    stored
        .iter()
        .filter(|d| d.observed_at() >= from && d.observed_at() <= to)
        .cloned()
        .collect()
}

/// Newest first.
pub fn latest_predictions(stored: &[EnsembleResult], limit: usize) -> Vec<EnsembleResult> {
    let mut results: Vec<EnsembleResult> = stored.to_vec();
    results.sort_by(|a, b| b.generated_at.cmp(&a.generated_at));
    results.truncate(limit);
    results
}

/// Newest first.
pub fn latest_backtests(stored: &[BacktestResult], limit: usize) -> Vec<BacktestResult> {
    let mut results: Vec<BacktestResult> = stored.to_vec();
    results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    results.truncate(limit);
    results
}

pub fn backtests_for(stored: &[BacktestResult], algorithm_id: &str) -> Vec<BacktestResult> {
    let matching: Vec<BacktestResult> = stored
        .iter()
        .filter(|r| r.algorithm_id == algorithm_id)
        .cloned()
        .collect();
    latest_backtests(&matching, matching.len())
}

/// Replace the record of the same algorithm, or append.
pub fn upsert_stats(stored: &mut Vec<AlgorithmStats>, stats: &AlgorithmStats) {
    match stored
        .iter_mut()
        .find(|s| s.algorithm_id == stats.algorithm_id)
    {
        Some(existing) => *existing = stats.clone(),
        None => stored.push(stats.clone()),
    }
}
