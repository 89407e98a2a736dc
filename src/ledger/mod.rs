/// Activity ledger - append-only log of activity events
///
/// The ledger is the source of truth for every derived statistic: XP,
/// per-category counters and the heatmap can all be rebuilt by folding it.

pub mod events;
pub mod heatmap;

pub use events::{xp_for, ActivityDetails, ActivityEntry, ActivityType, Difficulty};
pub use heatmap::{Heatmap, HeatmapBucket, HeatmapCell};

use crate::error::{TrackerError, TrackerResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only sequence of activity entries, in chronological order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: Vec<ActivityEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    ///
    /// Entries must not precede the last entry; streak and daily counters
    /// are folded in ledger order.
    pub fn append(&mut self, entry: ActivityEntry) -> TrackerResult<()> {
        if let Some(last) = self.entries.last() {
            if entry.timestamp < last.timestamp {
                return Err(TrackerError::Validation(format!(
                    "Activity timestamp {} precedes last logged activity at {}",
                    entry.timestamp.to_rfc3339(),
                    last.timestamp.to_rfc3339()
                )));
            }
        }

        self.entries.push(entry);
        Ok(())
    }

    /// `at`, moved forward to the last entry's timestamp if it would precede it
    pub fn clamp_to_order(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        match self.entries.last() {
            Some(last) if last.timestamp > at => last.timestamp,
            _ => at,
        }
    }

    /// Administrative bulk replacement (hydration, import)
    ///
    /// Entries are re-sorted by timestamp so the chronological invariant holds.
    pub fn replace_all(&mut self, mut entries: Vec<ActivityEntry>) {
        entries.sort_by_key(|e| e.timestamp);
        self.entries = entries;
    }

    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&ActivityEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of XP over all entries
    pub fn total_xp(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |total, e| total.saturating_add(e.xp_earned))
    }

    pub fn get(&self, id: &str) -> Option<&ActivityEntry> {
        self.entries.iter().find(|e| e.id == id)
    }
}
