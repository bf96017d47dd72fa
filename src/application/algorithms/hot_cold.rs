use super::{
    PredictionAlgorithm, PredictionContext, check_ready, checked_weight, read_settings,
    write_settings,
};
use crate::domain::errors::AlgorithmError;
use crate::domain::lottery::{Draw, GameRange, NUMBER_COUNT, NumberSet};
use crate::domain::prediction::Prediction;
use std::cmp::Reverse;
use std::sync::RwLock;
use tracing::debug;

const NAME: &str = "hot_cold_analysis";
const MIN_HISTORY: usize = 50;
const LIST_SIZE: usize = 5;
const PICKS_PER_LIST: usize = 3;
const MIN_COLD_CANDIDATES: usize = 3;

#[derive(Debug, Clone)]
struct HotColdSettings {
    weight: f64,
    hot_window: usize,
    cold_window: usize,
}

/// Hot/Cold Analyzer
///
/// Mixes the values drawn most in the recent window with the ones absent
/// the longest. Three picks come from each side.
#[derive(Debug)]
pub struct HotColdAnalyzer {
    settings: RwLock<HotColdSettings>,
}

impl HotColdAnalyzer {
    pub const DEFAULT_HOT_WINDOW: usize = 20;
    pub const DEFAULT_COLD_WINDOW: usize = 15;
    pub const MIN_WINDOW: usize = 5;

    pub fn new(weight: f64) -> Self {
        Self::with_windows(weight, Self::DEFAULT_HOT_WINDOW, Self::DEFAULT_COLD_WINDOW)
    }

    /// Windows below `MIN_WINDOW` are raised to it. Configured windows are
    /// rejected before they get here, see `AlgorithmEnvConfig::from_env`.
    pub fn with_windows(weight: f64, hot_window: usize, cold_window: usize) -> Self {
        Self {
            settings: RwLock::new(HotColdSettings {
                weight,
                hot_window: hot_window.max(Self::MIN_WINDOW),
                cold_window: cold_window.max(Self::MIN_WINDOW),
            }),
        }
    }

    pub fn hot_window(&self) -> usize {
        read_settings(&self.settings, NAME).hot_window
    }

    pub fn cold_window(&self) -> usize {
        read_settings(&self.settings, NAME).cold_window
    }

    pub fn set_hot_window(&self, window: usize) -> Result<(), AlgorithmError> {
        write_settings(&self.settings, NAME).hot_window = Self::checked_window("hot_window", window)?;
        Ok(())
    }

    pub fn set_cold_window(&self, window: usize) -> Result<(), AlgorithmError> {
        write_settings(&self.settings, NAME).cold_window =
            Self::checked_window("cold_window", window)?;
        Ok(())
    }

    fn checked_window(parameter: &'static str, window: usize) -> Result<usize, AlgorithmError> {
        if window < Self::MIN_WINDOW {
            return Err(AlgorithmError::InvalidParameter {
                parameter,
                min: Self::MIN_WINDOW,
                value: window,
            });
        }
        Ok(window)
    }

    /// Top values by frequency within the most recent `window` draws.
    fn hot_numbers(history: &[Draw], range: GameRange, window: usize) -> Vec<u8> {
        let mut counts = vec![0usize; range.size()];
        for draw in history.iter().rev().take(window) {
            for value in draw.numbers().iter().filter(|v| range.contains(*v)) {
                counts[range.offset(value)] += 1;
            }
        }

        let mut hot: Vec<(u8, usize)> = range
            .values()
            .map(|v| (v, counts[range.offset(v)]))
            .filter(|(_, count)| *count > 0)
            .collect();
        hot.sort_by_key(|(value, count)| (Reverse(*count), *value));
        hot.into_iter().take(LIST_SIZE).map(|(v, _)| v).collect()
    }

    /// Values unseen for at least `window` draws, longest absent first.
    fn cold_numbers(history: &[Draw], range: GameRange, window: usize) -> Vec<u8> {
        // Rounds back from the most recent draw; None = never seen
        let mut last_seen: Vec<Option<usize>> = vec![None; range.size()];
        for (rounds_back, draw) in history.iter().rev().enumerate() {
            for value in draw.numbers().iter().filter(|v| range.contains(*v)) {
                let slot = &mut last_seen[range.offset(value)];
                if slot.is_none() {
                    *slot = Some(rounds_back);
                }
            }
        }

        let collect = |window: usize| -> Vec<(u8, Option<usize>)> {
            range
                .values()
                .map(|v| (v, last_seen[range.offset(v)]))
                .filter(|(_, seen)| seen.is_none_or(|back| back >= window))
                .collect()
        };

        let mut cold = collect(window);
        if cold.len() < MIN_COLD_CANDIDATES {
            cold = collect(window / 2);
        }

        // Never seen first, then the oldest appearance, then the lower value
        cold.sort_by_key(|(value, seen)| {
            (
                seen.is_some(),
                Reverse(seen.unwrap_or(usize::MAX)),
                *value,
            )
        });
        cold.into_iter().take(LIST_SIZE).map(|(v, _)| v).collect()
    }

    fn combine(hot: &[u8], cold: &[u8], range: GameRange) -> Vec<u8> {
        let mut picked: Vec<u8> = hot.iter().copied().take(PICKS_PER_LIST).collect();

        let mut cold_added = 0;
        for &value in cold {
            if cold_added == PICKS_PER_LIST {
                break;
            }
            if !picked.contains(&value) {
                picked.push(value);
                cold_added += 1;
            }
        }

        let top_up = hot
            .iter()
            .skip(PICKS_PER_LIST)
            .chain(cold.iter())
            .copied()
            .chain(range.values());
        for value in top_up {
            if picked.len() == NUMBER_COUNT {
                break;
            }
            if !picked.contains(&value) {
                picked.push(value);
            }
        }

        picked.sort_unstable();
        picked
    }
}

impl PredictionAlgorithm for HotColdAnalyzer {
    fn name(&self) -> &str {
        NAME
    }

    fn min_history(&self) -> usize {
        MIN_HISTORY
    }

    fn predict(&self, ctx: &PredictionContext<'_>) -> Result<Prediction, AlgorithmError> {
        check_ready(self, ctx)?;

        let (hot_window, cold_window) = {
            let settings = read_settings(&self.settings, NAME);
            (settings.hot_window, settings.cold_window)
        };

        let hot = Self::hot_numbers(ctx.history, ctx.range, hot_window);
        let cold = Self::cold_numbers(ctx.history, ctx.range, cold_window);
        let picked = Self::combine(&hot, &cold, ctx.range);

        let numbers = NumberSet::new(&picked, ctx.range).map_err(|e| AlgorithmError::Prediction {
            algorithm: NAME.to_string(),
            reason: e.to_string(),
        })?;

        let confidence = if hot.len() >= PICKS_PER_LIST && cold.len() >= PICKS_PER_LIST {
            0.85
        } else if !hot.is_empty() && !cold.is_empty() {
            0.7
        } else {
            0.5
        };

        debug!(
            "HotColdAnalyzer: hot={:?} cold={:?} -> {}",
            hot, cold, numbers
        );

        Ok(Prediction::new(NAME, numbers, confidence, ctx.target_index())
            .with_metadata("hot_numbers", format!("{:?}", hot))
            .with_metadata("cold_numbers", format!("{:?}", cold))
            .with_metadata("hot_window", hot_window)
            .with_metadata("cold_window", cold_window))
    }

    fn weight(&self) -> f64 {
        read_settings(&self.settings, NAME).weight
    }

    fn set_weight(&self, weight: f64) -> Result<(), AlgorithmError> {
        write_settings(&self.settings, NAME).weight = checked_weight(weight)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{cycling_draws, draws_from};
    use super::*;
    use crate::domain::lottery::GameType;

    /// 50 draws: old rows spread over 7..=45, the last 20 repeat 1..=6.
    fn skewed_history() -> Vec<Draw> {
        let mut rows = Vec::new();
        for i in 0..30u8 {
            let base = 7 + (i % 6) * 6;
            rows.push([base, base + 1, base + 2, base + 3, base + 4, base + 5]);
        }
        for _ in 0..20 {
            rows.push([1, 2, 3, 4, 5, 6]);
        }
        draws_from(&rows)
    }

    #[test]
    fn test_hot_numbers_come_from_recent_window() {
        let draws = skewed_history();
        let hot = HotColdAnalyzer::hot_numbers(&draws, GameType::Mega645.range(), 20);
        assert_eq!(hot, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_never_seen_values_are_coldest() {
        let draws = skewed_history();
        let cold = HotColdAnalyzer::cold_numbers(&draws, GameType::Mega645.range(), 15);
        // 43, 44, 45 never appear in the skewed history
        assert_eq!(&cold[..3], &[43, 44, 45]);
        assert_eq!(cold.len(), 5);
    }

    #[test]
    fn test_prediction_mixes_hot_and_cold() {
        let draws = skewed_history();
        let ctx = PredictionContext::new(GameType::Mega645.range(), &draws);
        let prediction = HotColdAnalyzer::new(1.2).predict(&ctx).unwrap();

        assert_eq!(prediction.numbers.as_slice(), &[1, 2, 3, 43, 44, 45]);
        assert_eq!(prediction.confidence, 0.85);
        assert_eq!(prediction.produced_for_index, 51);
    }

    #[test]
    fn test_short_lists_are_topped_up() {
        let picked = HotColdAnalyzer::combine(&[10], &[], GameType::Mega645.range());
        assert_eq!(picked, vec![1, 2, 3, 4, 5, 10]);

        let picked = HotColdAnalyzer::combine(&[1, 2, 3], &[2, 3, 4], GameType::Mega645.range());
        assert_eq!(picked, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_requires_fifty_draws() {
        let draws = cycling_draws(49);
        let ctx = PredictionContext::new(GameType::Mega645.range(), &draws);
        assert!(matches!(
            HotColdAnalyzer::new(1.2).predict(&ctx),
            Err(AlgorithmError::InsufficientData { required: 50, got: 49, .. })
        ));
    }

    #[test]
    fn test_window_tunables() {
        let analyzer = HotColdAnalyzer::new(1.2);
        assert!(analyzer.set_hot_window(4).is_err());
        analyzer.set_cold_window(30).unwrap();
        assert_eq!(analyzer.cold_window(), 30);
        assert_eq!(analyzer.hot_window(), 20);
    }
}
