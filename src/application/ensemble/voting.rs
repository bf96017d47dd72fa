use crate::domain::errors::InvalidSetError;
use crate::domain::lottery::{GameRange, NUMBER_COUNT, NumberSet};
use crate::domain::prediction::{Prediction, VotingPolicy};
use std::collections::BTreeMap;

/// One surviving prediction and the registry weight of its algorithm.
#[derive(Debug, Clone, Copy)]
pub struct Ballot<'a> {
    pub prediction: &'a Prediction,
    pub weight: f64,
}

impl Ballot<'_> {
    fn vote_weight(&self, policy: VotingPolicy) -> f64 {
        match policy {
            VotingPolicy::Weighted => self.weight,
            VotingPolicy::Majority => 1.0,
            VotingPolicy::ConfidenceWeighted => self.prediction.confidence,
        }
    }
}

/// Accumulated vote weight per value.
pub fn tally(policy: VotingPolicy, ballots: &[Ballot<'_>]) -> BTreeMap<u8, f64> {
    let mut votes: BTreeMap<u8, f64> = BTreeMap::new();
    for ballot in ballots {
        let weight = ballot.vote_weight(policy);
        for value in ballot.prediction.numbers.iter() {
            *votes.entry(value).or_insert(0.0) += weight;
        }
    }
    votes
}

/// Reduce ballots to six distinct values.
///
/// Highest accumulated weight wins, lower value first on ties. When fewer
/// than six values were voted on, the remainder comes from the ballots in
/// order and then from the range ascending.
pub fn vote(
    policy: VotingPolicy,
    ballots: &[Ballot<'_>],
    range: GameRange,
) -> Result<NumberSet, InvalidSetError> {
    let mut ranked: Vec<(u8, f64)> = tally(policy, ballots).into_iter().collect();
    // BTreeMap order is ascending, so a stable sort keeps lower values first on ties
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut chosen: Vec<u8> = ranked
        .into_iter()
        .take(NUMBER_COUNT)
        .map(|(value, _)| value)
        .collect();

    if chosen.len() < NUMBER_COUNT {
        let fill = ballots
            .iter()
            .flat_map(|b| b.prediction.numbers.iter())
            .chain(range.values());
        for value in fill {
            if chosen.len() == NUMBER_COUNT {
                break;
            }
            if !chosen.contains(&value) {
                chosen.push(value);
            }
        }
    }

    NumberSet::new(&chosen, range)
}
