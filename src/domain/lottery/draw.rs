use super::game_type::GameType;
use super::number_set::NumberSet;
use crate::domain::errors::{InvalidSetError, InvalidSetReason, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One historical draw result. Immutable once built.
///
/// Deserialization goes through `Draw::new`, so stored documents get the
/// same index and range checks as freshly parsed rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDraw")]
pub struct Draw {
    game: GameType,
    sequence_index: u32,
    numbers: NumberSet,
    observed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    jackpot: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    winners: Option<u32>,
}

/// Unchecked wire shape of a `Draw`.
#[derive(Deserialize)]
struct RawDraw {
    game: GameType,
    sequence_index: u32,
    numbers: NumberSet,
    observed_at: DateTime<Utc>,
    #[serde(default)]
    jackpot: Option<f64>,
    #[serde(default)]
    winners: Option<u32>,
}

impl TryFrom<RawDraw> for Draw {
    type Error = ValidationError;

    fn try_from(raw: RawDraw) -> Result<Self, Self::Error> {
        let mut draw = Draw::new(raw.game, raw.sequence_index, raw.numbers, raw.observed_at)?;
        if let Some(jackpot) = raw.jackpot {
            draw = draw.with_prize(jackpot, 0)?;
        }
        draw.winners = raw.winners;
        Ok(draw)
    }
}

impl Draw {
    pub fn new(
        game: GameType,
        sequence_index: u32,
        numbers: NumberSet,
        observed_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if sequence_index == 0 {
            return Err(ValidationError::NonPositiveIndex {
                index: sequence_index,
            });
        }

        // A set validated against a wider game (6/55) can still be out of range here.
        let range = game.range();
        if let Some(value) = numbers.iter().find(|&v| !range.contains(v)) {
            return Err(InvalidSetError::new(
                InvalidSetReason::OutOfRange,
                format!("{} is outside {}-{} for {}", value, range.min(), range.max(), game),
            )
            .into());
        }

        Ok(Self {
            game,
            sequence_index,
            numbers,
            observed_at,
            jackpot: None,
            winners: None,
        })
    }

    /// Attach the prize details reported by the data source.
    pub fn with_prize(mut self, jackpot: f64, winners: u32) -> Result<Self, ValidationError> {
        if jackpot < 0.0 {
            return Err(ValidationError::NegativeAmount {
                field: "jackpot",
                index: self.sequence_index,
                value: jackpot,
            });
        }
        self.jackpot = Some(jackpot);
        self.winners = Some(winners);
        Ok(self)
    }

    pub fn game(&self) -> GameType {
        self.game
    }

    pub fn sequence_index(&self) -> u32 {
        self.sequence_index
    }

    pub fn numbers(&self) -> &NumberSet {
        &self.numbers
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    pub fn jackpot(&self) -> Option<f64> {
        self.jackpot
    }

    pub fn winners(&self) -> Option<u32> {
        self.winners
    }
}

impl std::fmt::Display for Draw {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Draw #{} ({}) on {}: {}",
            self.sequence_index,
            self.game,
            self.observed_at.format("%Y-%m-%d"),
            self.numbers
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn set(values: &[u8]) -> NumberSet {
        NumberSet::new(values, GameType::Power655.range()).unwrap()
    }

    #[test]
    fn test_draw_requires_positive_index() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 18, 0, 0).unwrap();
        let err = Draw::new(GameType::Mega645, 0, set(&[1, 2, 3, 4, 5, 6]), at).unwrap_err();
        assert_eq!(err, ValidationError::NonPositiveIndex { index: 0 });
    }

    #[test]
    fn test_draw_rejects_numbers_outside_game() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 18, 0, 0).unwrap();
        let err = Draw::new(GameType::Mega645, 7, set(&[1, 2, 3, 4, 5, 50]), at).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidSet(_)));

        assert!(Draw::new(GameType::Power655, 7, set(&[1, 2, 3, 4, 5, 50]), at).is_ok());
    }

    #[test]
    fn test_prize_details() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 18, 0, 0).unwrap();
        let draw = Draw::new(GameType::Mega645, 1, set(&[1, 2, 3, 4, 5, 6]), at)
            .unwrap()
            .with_prize(12_000_000_000.0, 1)
            .unwrap();
        assert_eq!(draw.winners(), Some(1));
        assert!(draw.to_string().contains("Draw #1 (MEGA_6_45) on 2024-01-02"));

        let negative = Draw::new(GameType::Mega645, 2, set(&[1, 2, 3, 4, 5, 6]), at)
            .unwrap()
            .with_prize(-1.0, 0)
            .unwrap_err();
        assert_eq!(
            negative,
            ValidationError::NegativeAmount {
                field: "jackpot",
                index: 2,
                value: -1.0
            }
        );
    }

    #[test]
    fn test_deserialize_checks_invariants() {
        let json = r#"{"game":"MEGA_6_45","sequence_index":12,"numbers":[3,9,14,22,31,45],"observed_at":"2024-01-02T18:00:00Z","jackpot":15000000000.0,"winners":2}"#;
        let draw: Draw = serde_json::from_str(json).unwrap();
        assert_eq!(draw.sequence_index(), 12);
        assert_eq!(draw.numbers().as_slice(), &[3, 9, 14, 22, 31, 45]);
        assert_eq!(draw.winners(), Some(2));

        let zero_index = json.replace(r#""sequence_index":12"#, r#""sequence_index":0"#);
        let err = serde_json::from_str::<Draw>(&zero_index).unwrap_err();
        assert!(err.to_string().contains("must be positive"), "{}", err);

        // 50 is a valid 6/55 value but not a 6/45 one
        let outside_game = json.replace("31,45", "31,50");
        assert!(serde_json::from_str::<Draw>(&outside_game).is_err());

        let negative_jackpot = json.replace("15000000000.0", "-5.0");
        assert!(serde_json::from_str::<Draw>(&negative_jackpot).is_err());
    }

    #[test]
    fn test_serialized_draw_reads_back() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 18, 0, 0).unwrap();
        let draw = Draw::new(GameType::Power655, 4, set(&[5, 10, 20, 30, 40, 55]), at).unwrap();
        let json = serde_json::to_string(&draw).unwrap();
        assert!(!json.contains("jackpot"));
        let back: Draw = serde_json::from_str(&json).unwrap();
        assert_eq!(back, draw);
    }
}
