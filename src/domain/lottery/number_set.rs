use super::game_type::{GameRange, NUMBER_COUNT};
use crate::domain::errors::{InvalidSetError, InvalidSetReason};
use serde::{Deserialize, Serialize};

/// Canonical pick of six distinct in-range values, stored ascending.
///
/// Only constructible through [`NumberSet::new`], so every instance satisfies the
/// count, range and uniqueness invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct NumberSet {
    values: [u8; NUMBER_COUNT],
}

impl NumberSet {
    pub fn new(raw: &[u8], range: GameRange) -> Result<Self, InvalidSetError> {
        if raw.len() != range.pick() {
            return Err(InvalidSetError::new(
                InvalidSetReason::WrongCount,
                format!("expected {} numbers, got {}", range.pick(), raw.len()),
            ));
        }

        let mut values = [0u8; NUMBER_COUNT];
        for (slot, &value) in values.iter_mut().zip(raw) {
            if !range.contains(value) {
                return Err(InvalidSetError::new(
                    InvalidSetReason::OutOfRange,
                    format!(
                        "{} is outside {}-{}",
                        value,
                        range.min(),
                        range.max()
                    ),
                ));
            }
            *slot = value;
        }

        values.sort_unstable();
        if let Some(pair) = values.windows(2).find(|w| w[0] == w[1]) {
            return Err(InvalidSetError::new(
                InvalidSetReason::Duplicate,
                format!("{} appears more than once", pair[0]),
            ));
        }

        Ok(Self { values })
    }

    /// Number of values shared with `other`. Symmetric; a set matches itself fully.
    pub fn match_count(&self, other: &NumberSet) -> usize {
        // Both sides are sorted, so a merge walk is enough.
        let (mut i, mut j, mut count) = (0, 0, 0);
        while i < NUMBER_COUNT && j < NUMBER_COUNT {
            match self.values[i].cmp(&other.values[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    count += 1;
                    i += 1;
                    j += 1;
                }
            }
        }
        count
    }

    pub fn contains(&self, value: u8) -> bool {
        self.values.binary_search(&value).is_ok()
    }

    pub fn sum(&self) -> u32 {
        self.values.iter().map(|&v| u32::from(v)).sum()
    }

    pub fn odd_count(&self) -> usize {
        self.values.iter().filter(|&&v| v % 2 == 1).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.values.iter().copied()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.values
    }

    pub fn len(&self) -> usize {
        NUMBER_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl TryFrom<Vec<u8>> for NumberSet {
    type Error = InvalidSetError;

    /// Deserialization path: validates against the widest supported range.
    fn try_from(raw: Vec<u8>) -> Result<Self, Self::Error> {
        let widest = crate::domain::lottery::GameType::Power655.range();
        NumberSet::new(&raw, widest)
    }
}

impl From<NumberSet> for Vec<u8> {
    fn from(set: NumberSet) -> Self {
        set.values.to_vec()
    }
}

impl std::fmt::Display for NumberSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.values.iter().map(|v| format!("{:02}", v)).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lottery::GameType;

    fn mega() -> GameRange {
        GameType::Mega645.range()
    }

    #[test]
    fn test_valid_set_is_sorted() {
        let set = NumberSet::new(&[45, 3, 17, 1, 22, 9], mega()).unwrap();
        assert_eq!(set.as_slice(), &[1, 3, 9, 17, 22, 45]);
        assert_eq!(set.len(), 6);
    }

    #[test]
    fn test_wrong_count_rejected() {
        let five = NumberSet::new(&[1, 2, 3, 4, 5], mega()).unwrap_err();
        assert_eq!(five.reason, InvalidSetReason::WrongCount);

        let seven = NumberSet::new(&[1, 2, 3, 4, 5, 6, 7], mega()).unwrap_err();
        assert_eq!(seven.reason, InvalidSetReason::WrongCount);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = NumberSet::new(&[1, 2, 3, 4, 5, 46], mega()).unwrap_err();
        assert_eq!(err.reason, InvalidSetReason::OutOfRange);

        let zero = NumberSet::new(&[0, 2, 3, 4, 5, 6], mega()).unwrap_err();
        assert_eq!(zero.reason, InvalidSetReason::OutOfRange);

        // 46..55 is legal for Power 6/55
        assert!(NumberSet::new(&[1, 2, 3, 4, 5, 55], GameType::Power655.range()).is_ok());
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = NumberSet::new(&[1, 2, 3, 4, 4, 6], mega()).unwrap_err();
        assert_eq!(err.reason, InvalidSetReason::Duplicate);
    }

    #[test]
    fn test_match_count_symmetric() {
        let a = NumberSet::new(&[1, 2, 3, 4, 5, 6], mega()).unwrap();
        let b = NumberSet::new(&[4, 5, 6, 7, 8, 9], mega()).unwrap();
        let c = NumberSet::new(&[40, 41, 42, 43, 44, 45], mega()).unwrap();

        assert_eq!(a.match_count(&b), 3);
        assert_eq!(b.match_count(&a), 3);
        assert_eq!(a.match_count(&c), 0);
        assert_eq!(a.match_count(&a), 6);
    }

    #[test]
    fn test_queries() {
        let set = NumberSet::new(&[1, 2, 3, 10, 20, 30], mega()).unwrap();
        assert_eq!(set.sum(), 66);
        assert!(set.contains(20));
        assert!(!set.contains(21));
        assert_eq!(set.odd_count(), 2);
        assert_eq!(set.to_string(), "[01, 02, 03, 10, 20, 30]");
    }

    #[test]
    fn test_serde_round_trip_validates() {
        let set = NumberSet::new(&[5, 10, 15, 20, 25, 30], mega()).unwrap();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, "[5,10,15,20,25,30]");

        let bad: Result<NumberSet, _> = serde_json::from_str("[5,5,15,20,25,30]");
        assert!(bad.is_err());
    }
}
