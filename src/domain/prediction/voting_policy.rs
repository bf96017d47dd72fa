use serde::{Deserialize, Serialize};

/// Aggregation rule reducing several predictions to one final pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VotingPolicy {
    /// Each vote weighs the registry weight of its algorithm
    #[default]
    Weighted,
    /// Each vote weighs 1
    Majority,
    /// Each vote weighs the confidence of its prediction
    ConfidenceWeighted,
}

impl VotingPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            VotingPolicy::Weighted => "weighted",
            VotingPolicy::Majority => "majority",
            VotingPolicy::ConfidenceWeighted => "confidence_weighted",
        }
    }
}

impl std::str::FromStr for VotingPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weighted" => Ok(VotingPolicy::Weighted),
            "majority" => Ok(VotingPolicy::Majority),
            "confidence_weighted" | "confidence" => Ok(VotingPolicy::ConfidenceWeighted),
            _ => anyhow::bail!(
                "Invalid VOTING_POLICY: {}. Valid: weighted, majority, confidence_weighted",
                s
            ),
        }
    }
}

impl std::fmt::Display for VotingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_default_is_weighted() {
        assert_eq!(VotingPolicy::default(), VotingPolicy::Weighted);
        assert_eq!(VotingPolicy::default().to_string(), "weighted");
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            VotingPolicy::from_str("Confidence_Weighted").unwrap(),
            VotingPolicy::ConfidenceWeighted
        );
        assert!(VotingPolicy::from_str("ranked").is_err());
    }
}
