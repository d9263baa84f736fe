//! ScoreMap - review id to authenticity score.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from review id to an integer suspicion score.
///
/// Scores are nominally 0-100 but are stored as returned; out-of-range values
/// are a data-quality signal for callers, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreMap(BTreeMap<String, i64>);

impl ScoreMap {
    /// Creates an empty score map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a score, returning the previous score for the id if any.
    pub fn insert(&mut self, id: impl Into<String>, score: i64) -> Option<i64> {
        self.0.insert(id.into(), score)
    }

    pub fn get(&self, id: &str) -> Option<i64> {
        self.0.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(id, score)| (id.as_str(), *score))
    }

    /// Absorbs another map (last write wins), returning how many ids collided.
    pub fn merge(&mut self, other: ScoreMap) -> usize {
        let mut collisions = 0;
        for (id, score) in other.0 {
            if self.0.insert(id, score).is_some() {
                collisions += 1;
            }
        }
        collisions
    }
}

impl FromIterator<(String, i64)> for ScoreMap {
    fn from_iter<I: IntoIterator<Item = (String, i64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ScoreMap {
    type Item = (String, i64);
    type IntoIter = std::collections::btree_map::IntoIter<String, i64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, i64)]) -> ScoreMap {
        entries.iter().map(|(id, s)| (id.to_string(), *s)).collect()
    }

    #[test]
    fn merge_unions_disjoint_maps() {
        let mut left = map(&[("a", 10)]);
        let collisions = left.merge(map(&[("b", 20)]));

        assert_eq!(collisions, 0);
        assert_eq!(left, map(&[("a", 10), ("b", 20)]));
    }

    #[test]
    fn merge_last_write_wins_and_counts_collisions() {
        let mut left = map(&[("a", 10), ("b", 20)]);
        let collisions = left.merge(map(&[("b", 99)]));

        assert_eq!(collisions, 1);
        assert_eq!(left.get("b"), Some(99));
    }

    #[test]
    fn serializes_as_plain_object_in_id_order() {
        let scores = map(&[("r2", 7), ("r1", 42)]);
        let json = serde_json::to_string(&scores).unwrap();
        assert_eq!(json, r#"{"r1":42,"r2":7}"#);
    }
}
