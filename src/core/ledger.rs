/// Score ledger — named counters that gate conditional branches.
use rustc_hash::FxHashMap;

use crate::schema::scene::StatMap;

/// Persistent numeric state for one playthrough. A stat that was never
/// set reads as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreLedger {
    scores: FxHashMap<String, i64>,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a ledger, typically from the configured initial scores.
    pub fn from_initial(initial: &StatMap) -> Self {
        Self {
            scores: initial.iter().map(|(k, v)| (k.clone(), *v)).collect(),
        }
    }

    pub fn get(&self, stat: &str) -> i64 {
        self.scores.get(stat).copied().unwrap_or(0)
    }

    /// Add each delta to its stat, creating missing stats at 0.
    pub fn apply(&mut self, delta: &StatMap) {
        for (stat, amount) in delta {
            let value = self.scores.entry(stat.clone()).or_insert(0);
            *value = value.saturating_add(*amount);
        }
    }

    /// True iff every listed stat meets its threshold. Unlisted stats impose
    /// no constraint, so an empty requirement is always satisfied.
    pub fn satisfies(&self, requirement: &StatMap) -> bool {
        requirement
            .iter()
            .all(|(stat, threshold)| self.get(stat) >= *threshold)
    }

    /// A sorted copy of the current scores.
    pub fn snapshot(&self) -> StatMap {
        self.scores.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }
}
