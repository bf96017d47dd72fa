use super::backtest_result::BacktestResult;
use crate::domain::lottery::GameType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const EXACT_SCORE_WEIGHT: f64 = 0.5;
const FOUR_SCORE_WEIGHT: f64 = 0.3;
const THREE_SCORE_WEIGHT: f64 = 0.2;

/// Rolling accuracy summary of one algorithm for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmStats {
    pub algorithm_id: String,
    pub game: GameType,
    pub total_predictions: usize,
    pub exact_rate: f64,
    pub four_rate: f64,
    pub three_rate: f64,
    pub average_confidence: f64,
    pub weight: f64,
    pub last_updated: DateTime<Utc>,
}

impl AlgorithmStats {
    pub fn from_backtest(game: GameType, result: &BacktestResult, weight: f64) -> Self {
        Self {
            algorithm_id: result.algorithm_id.clone(),
            game,
            total_predictions: result.total_rounds,
            exact_rate: result.exact_rate(),
            four_rate: result.four_rate(),
            three_rate: result.three_rate(),
            average_confidence: result.average_confidence,
            weight,
            last_updated: Utc::now(),
        }
    }

    /// Weighted blend of the prize-tier rates.
    pub fn overall_score(&self) -> f64 {
        self.exact_rate * EXACT_SCORE_WEIGHT
            + self.four_rate * FOUR_SCORE_WEIGHT
            + self.three_rate * THREE_SCORE_WEIGHT
    }
}
