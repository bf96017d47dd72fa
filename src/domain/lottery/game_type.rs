use crate::domain::errors::ValidationError;
use serde::{Deserialize, Serialize};

/// Every supported game draws six numbers.
pub const NUMBER_COUNT: usize = 6;

/// Inclusive value range of a game variant, picking `NUMBER_COUNT` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameRange {
    min: u8,
    max: u8,
}

impl GameRange {
    pub fn new(min: u8, max: u8) -> Result<Self, ValidationError> {
        if min == 0 || max < min || usize::from(max - min) + 1 < NUMBER_COUNT {
            return Err(ValidationError::InvalidRange {
                min,
                max,
                pick: NUMBER_COUNT,
            });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u8 {
        self.min
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    pub fn pick(&self) -> usize {
        NUMBER_COUNT
    }

    pub fn size(&self) -> usize {
        usize::from(self.max - self.min) + 1
    }

    pub fn contains(&self, value: u8) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn values(&self) -> std::ops::RangeInclusive<u8> {
        self.min..=self.max
    }

    /// Dense index of `value` within the range (caller guarantees containment).
    pub fn offset(&self, value: u8) -> usize {
        usize::from(value - self.min)
    }

    /// Smallest achievable sum of a pick (the lowest six values).
    pub fn min_sum(&self) -> u32 {
        (0..NUMBER_COUNT as u32).map(|i| u32::from(self.min) + i).sum()
    }

    /// Largest achievable sum of a pick (the highest six values).
    pub fn max_sum(&self) -> u32 {
        (0..NUMBER_COUNT as u32).map(|i| u32::from(self.max) - i).sum()
    }

    pub fn midpoint(&self) -> u8 {
        ((u16::from(self.min) + u16::from(self.max)) / 2) as u8
    }
}

/// Vietlott game variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GameType {
    #[serde(rename = "MEGA_6_45")]
    Mega645,
    #[serde(rename = "POWER_6_55")]
    Power655,
}

impl GameType {
    pub fn range(&self) -> GameRange {
        match self {
            GameType::Mega645 => GameRange { min: 1, max: 45 },
            GameType::Power655 => GameRange { min: 1, max: 55 },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            GameType::Mega645 => "MEGA_6_45",
            GameType::Power655 => "POWER_6_55",
        }
    }

    pub fn all() -> [GameType; 2] {
        [GameType::Mega645, GameType::Power655]
    }
}

impl std::str::FromStr for GameType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "").as_str() {
            "mega645" => Ok(GameType::Mega645),
            "power655" => Ok(GameType::Power655),
            _ => Err(ValidationError::UnknownGame {
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for GameType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
