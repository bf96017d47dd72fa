use crate::domain::lottery::NumberSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prize tier reached by a single prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchClass {
    Exact,
    FourNumber,
    ThreeNumber,
    Unclassified,
}

impl MatchClass {
    /// Only exactly 6, 4 or 3 matches are counted; 5 is deliberately unclassified.
    pub fn from_match_count(count: usize) -> Self {
        match count {
            6 => MatchClass::Exact,
            4 => MatchClass::FourNumber,
            3 => MatchClass::ThreeNumber,
            _ => MatchClass::Unclassified,
        }
    }
}

/// Per-round detail of a walk-forward backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionMatch {
    /// Position of the scored draw in the history slice
    pub round_index: usize,
    pub sequence_index: u32,
    pub predicted: NumberSet,
    pub actual: NumberSet,
    pub match_count: usize,
    pub confidence: f64,
}

impl PredictionMatch {
    pub fn class(&self) -> MatchClass {
        MatchClass::from_match_count(self.match_count)
    }
}

/// Aggregate accuracy of one algorithm over a history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub id: Uuid,
    pub algorithm_id: String,
    /// Successfully scored rounds
    pub total_rounds: usize,
    pub exact_matches: usize,
    pub four_matches: usize,
    pub three_matches: usize,
    pub skipped_rounds: usize,
    pub average_confidence: f64,
    pub matches: Vec<PredictionMatch>,
    pub execution_time_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl BacktestResult {
    pub fn new(algorithm_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            algorithm_id: algorithm_id.into(),
            total_rounds: 0,
            exact_matches: 0,
            four_matches: 0,
            three_matches: 0,
            skipped_rounds: 0,
            average_confidence: 0.0,
            matches: Vec::new(),
            execution_time_ms: 0,
            created_at: Utc::now(),
        }
    }

    /// Score one round and keep its detail.
    pub fn record(&mut self, round: PredictionMatch) {
        match round.class() {
            MatchClass::Exact => self.exact_matches += 1,
            MatchClass::FourNumber => self.four_matches += 1,
            MatchClass::ThreeNumber => self.three_matches += 1,
            MatchClass::Unclassified => {}
        }
        self.total_rounds += 1;
        self.matches.push(round);
    }

    pub fn record_skip(&mut self) {
        self.skipped_rounds += 1;
    }

    pub fn finalize(&mut self, execution_time_ms: u64) {
        self.average_confidence = if self.matches.is_empty() {
            0.0
        } else {
            self.matches.iter().map(|m| m.confidence).sum::<f64>() / self.matches.len() as f64
        };
        self.execution_time_ms = execution_time_ms;
    }

    fn rate(&self, count: usize) -> f64 {
        if self.total_rounds == 0 {
            0.0
        } else {
            count as f64 / self.total_rounds as f64
        }
    }

    pub fn exact_rate(&self) -> f64 {
        self.rate(self.exact_matches)
    }

    pub fn four_rate(&self) -> f64 {
        self.rate(self.four_matches)
    }

    pub fn three_rate(&self) -> f64 {
        self.rate(self.three_matches)
    }

    pub fn average_match_count(&self) -> f64 {
        if self.matches.is_empty() {
            return 0.0;
        }
        self.matches.iter().map(|m| m.match_count).sum::<usize>() as f64
            / self.matches.len() as f64
    }
}
