use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Counters for one pass over a linker's candidate stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkageMetrics {
    /// Candidate pairs produced by the strategy (distance already computed).
    pub pairs_evaluated: u64,

    /// Candidates accepted by the strategy's own predicate, which applies
    /// the threshold.
    pub pairs_matched: u64,

    /// Matched pairs vetoed by the viability predicate.
    pub non_viable: u64,

    /// Links that passed every filter.
    pub links_emitted: u64,

    /// Wall time from the first pull to exhaustion.
    #[serde(with = "duration_serializer")]
    pub elapsed: Duration,
}

impl LinkageMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_non_viable(&mut self, count: u64) {
        self.non_viable += count;
    }

    pub fn add_links_emitted(&mut self, count: u64) {
        self.links_emitted += count;
    }

    pub fn set_pair_counts(&mut self, evaluated: u64, matched: u64) {
        self.pairs_evaluated = evaluated;
        self.pairs_matched = matched;
    }

    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }

    /// Get a summary string for logging
    pub fn summary(&self) -> String {
        format!(
            "Linkage: evaluated {} pairs, matched {}, {} not viable, emitted {} links in {:?}",
            self.pairs_evaluated,
            self.pairs_matched,
            self.non_viable,
            self.links_emitted,
            self.elapsed
        )
    }
}

mod duration_serializer {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
