use super::{
    PredictionAlgorithm, PredictionContext, check_ready, checked_weight, read_settings,
    write_settings,
};
use crate::domain::errors::AlgorithmError;
use crate::domain::lottery::{Draw, GameRange, NUMBER_COUNT, NumberSet};
use crate::domain::prediction::Prediction;
use statrs::statistics::Statistics;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;
use tracing::debug;

const NAME: &str = "pattern_analysis";
const MIN_HISTORY: usize = 100;
const RICH_HISTORY: usize = 200;
const MIN_PAIR_OCCURRENCES: usize = 2;

/// Shape statistics of a draw history.
#[derive(Debug, Clone, PartialEq)]
struct PatternSignals {
    /// Values of consecutive pairs that recur often
    consecutive: BTreeSet<u8>,
    target_odd: usize,
    sum_min: u32,
    sum_max: u32,
    low_high_ratio: f64,
}

/// Pattern Analyzer
///
/// Builds a set that looks like a typical draw: recurring consecutive
/// pairs, the usual odd/even split and a sum inside one standard
/// deviation of the historical mean.
#[derive(Debug)]
pub struct PatternAnalyzer {
    weight: RwLock<f64>,
}

impl PatternAnalyzer {
    pub fn new(weight: f64) -> Self {
        Self {
            weight: RwLock::new(weight),
        }
    }

    fn analyze(history: &[Draw], range: GameRange) -> PatternSignals {
        // Pairs must recur in at least 5% of rounds
        let threshold = (history.len() / 20).max(MIN_PAIR_OCCURRENCES);
        let mut pair_counts: BTreeMap<u8, usize> = BTreeMap::new();
        for draw in history {
            for pair in draw.numbers().as_slice().windows(2) {
                if pair[1] == pair[0] + 1 {
                    *pair_counts.entry(pair[0]).or_default() += 1;
                }
            }
        }
        let consecutive: BTreeSet<u8> = pair_counts
            .iter()
            .filter(|(_, count)| **count >= threshold)
            .flat_map(|(&low, _)| [low, low + 1])
            .filter(|v| range.contains(*v))
            .collect();

        let total_odd: usize = history.iter().map(|d| d.numbers().odd_count()).sum();
        let mean_odd = total_odd as f64 / history.len().max(1) as f64;
        let target_odd = (mean_odd.round() as usize).clamp(2, 4);

        let sums: Vec<f64> = history.iter().map(|d| d.numbers().sum() as f64).collect();
        let (sum_min, sum_max) = if sums.is_empty() {
            (range.min_sum(), range.max_sum())
        } else {
            let mean = sums.iter().mean();
            let std_dev = sums.iter().population_std_dev();
            let low = (mean - std_dev).max(0.0) as u32;
            let high = (mean + std_dev).max(0.0) as u32;
            let low = low.clamp(range.min_sum(), range.max_sum());
            let high = high.clamp(low, range.max_sum());
            (low, high)
        };

        let midpoint = range.midpoint();
        let total_values: usize = history.iter().map(|d| d.numbers().len()).sum();
        let low_values = history
            .iter()
            .flat_map(|d| d.numbers().iter())
            .filter(|v| *v <= midpoint)
            .count();
        let low_high_ratio = if total_values == 0 {
            0.0
        } else {
            low_values as f64 / total_values as f64
        };

        PatternSignals {
            consecutive,
            target_odd,
            sum_min,
            sum_max,
            low_high_ratio,
        }
    }

    fn combine(signals: &PatternSignals, range: GameRange) -> Vec<u8> {
        let mut selected: BTreeSet<u8> = signals.consecutive.clone();

        let odd = selected.iter().filter(|v| *v % 2 == 1).count();
        let even = selected.len() - odd;
        let mut needed_odd = signals.target_odd.saturating_sub(odd);
        let mut needed_even = (NUMBER_COUNT - signals.target_odd).saturating_sub(even);

        for value in range.values() {
            if needed_odd == 0 {
                break;
            }
            if value % 2 == 1 && selected.insert(value) {
                needed_odd -= 1;
            }
        }
        for value in range.values() {
            if needed_even == 0 {
                break;
            }
            if value % 2 == 0 && selected.insert(value) {
                needed_even -= 1;
            }
        }

        // BTreeSet iteration is ascending: keep the lowest six, pad with the lowest unused
        let mut result: Vec<u8> = selected.into_iter().take(NUMBER_COUNT).collect();
        for value in range.values() {
            if result.len() == NUMBER_COUNT {
                break;
            }
            if !result.contains(&value) {
                result.push(value);
            }
        }
        result.sort_unstable();
        result
    }

    /// Step values by one until the sum lands inside the target range or
    /// nothing can move. `values` must be sorted ascending and distinct.
    fn adjust_sum(values: &[u8], sum_min: u32, sum_max: u32, range: GameRange) -> Vec<u8> {
        let mut result = values.to_vec();
        let last = result.len().saturating_sub(1);
        loop {
            let sum: u32 = result.iter().map(|&v| v as u32).sum();
            if sum < sum_min {
                // Raise the highest value with room above it
                let movable = (0..result.len()).rev().find(|&i| {
                    let ceiling = if i == last { range.max() } else { result[i + 1] - 1 };
                    result[i] < ceiling
                });
                match movable {
                    Some(i) => result[i] += 1,
                    None => break,
                }
            } else if sum > sum_max {
                // Lower the lowest value with room below it
                let movable = (0..result.len()).find(|&i| {
                    let floor = if i == 0 { range.min() } else { result[i - 1] + 1 };
                    result[i] > floor
                });
                match movable {
                    Some(i) => result[i] -= 1,
                    None => break,
                }
            } else {
                break;
            }
        }
        result
    }

    fn confidence(history_len: usize) -> f64 {
        if history_len >= RICH_HISTORY { 0.75 } else { 0.65 }
    }
}

impl PredictionAlgorithm for PatternAnalyzer {
    fn name(&self) -> &str {
        NAME
    }

    fn min_history(&self) -> usize {
        MIN_HISTORY
    }

    fn predict(&self, ctx: &PredictionContext<'_>) -> Result<Prediction, AlgorithmError> {
        check_ready(self, ctx)?;

        let range = ctx.range;
        let signals = Self::analyze(ctx.history, range);
        let candidate = Self::combine(&signals, range);
        let fallback = NumberSet::new(&candidate, range).map_err(|e| AlgorithmError::Prediction {
            algorithm: NAME.to_string(),
            reason: e.to_string(),
        })?;

        let numbers = if (signals.sum_min..=signals.sum_max).contains(&fallback.sum()) {
            fallback
        } else {
            let adjusted: Vec<u8> = Self::adjust_sum(&candidate, signals.sum_min, signals.sum_max, range)
                .into_iter()
                .map(|v| v.clamp(range.min(), range.max()))
                .collect();
            match NumberSet::new(&adjusted, range) {
                Ok(set) => set,
                Err(e) => {
                    debug!("PatternAnalyzer: sum adjustment rejected ({}), keeping {}", e, fallback);
                    fallback
                }
            }
        };

        let confidence = Self::confidence(ctx.history.len());
        debug!(
            "PatternAnalyzer: {} (odd target {}, sum {}-{})",
            numbers, signals.target_odd, signals.sum_min, signals.sum_max
        );

        let pairs: Vec<String> = signals.consecutive.iter().map(u8::to_string).collect();
        Ok(Prediction::new(NAME, numbers, confidence, ctx.target_index())
            .with_metadata("consecutive_pairs", pairs.join(","))
            .with_metadata("target_odd_count", signals.target_odd)
            .with_metadata("sum_range", format!("{}-{}", signals.sum_min, signals.sum_max))
            .with_metadata("low_high_ratio", format!("{:.2}", signals.low_high_ratio)))
    }

    fn weight(&self) -> f64 {
        *read_settings(&self.weight, NAME)
    }

    fn set_weight(&self, weight: f64) -> Result<(), AlgorithmError> {
        *write_settings(&self.weight, NAME) = checked_weight(weight)?;
        Ok(())
    }
}
