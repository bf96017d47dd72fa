use serde::{Deserialize, Serialize};

/// The prediction heuristics the factory knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlgorithmKind {
    #[serde(rename = "frequency_analysis")]
    Frequency,
    #[serde(rename = "hot_cold_analysis")]
    HotCold,
    #[serde(rename = "pattern_analysis")]
    Pattern,
    #[serde(rename = "random_analysis")]
    Random,
}

impl AlgorithmKind {
    /// Registry identifier of the algorithm built for this kind.
    pub fn id(&self) -> &'static str {
        match self {
            AlgorithmKind::Frequency => "frequency_analysis",
            AlgorithmKind::HotCold => "hot_cold_analysis",
            AlgorithmKind::Pattern => "pattern_analysis",
            AlgorithmKind::Random => "random_analysis",
        }
    }

    pub fn all() -> [AlgorithmKind; 4] {
        [
            AlgorithmKind::Frequency,
            AlgorithmKind::HotCold,
            AlgorithmKind::Pattern,
            AlgorithmKind::Random,
        ]
    }
}

impl std::str::FromStr for AlgorithmKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "frequency" | "frequency_analysis" => Ok(AlgorithmKind::Frequency),
            "hotcold" | "hot_cold" | "hot_cold_analysis" => Ok(AlgorithmKind::HotCold),
            "pattern" | "pattern_analysis" => Ok(AlgorithmKind::Pattern),
            "random" | "random_analysis" => Ok(AlgorithmKind::Random),
            _ => anyhow::bail!(
                "Invalid algorithm: {}. Valid: frequency_analysis, hot_cold_analysis, pattern_analysis, random_analysis",
                s
            ),
        }
    }
}

impl std::fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_short_and_full_names() {
        assert_eq!(
            AlgorithmKind::from_str("hot_cold").unwrap(),
            AlgorithmKind::HotCold
        );
        assert_eq!(
            AlgorithmKind::from_str("PATTERN_ANALYSIS").unwrap(),
            AlgorithmKind::Pattern
        );
        assert!(AlgorithmKind::from_str("markov").is_err());
    }

    #[test]
    fn test_display_matches_id() {
        for kind in AlgorithmKind::all() {
            assert_eq!(kind.to_string(), kind.id());
        }
    }
}
