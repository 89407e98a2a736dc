/// Progression engine
///
/// Derives gamification state (XP, level, streak, category counters and the
/// heatmap) from the activity ledger. Everything here is a pure function of
/// its inputs; the application context decides when to swap state in.

pub mod activity;
pub mod leveling;
pub mod stats;
pub mod streak;

pub use activity::{log_activity, ActivityInput, ActivityOutcome};
pub use leveling::{LevelInfo, LevelTable};
pub use stats::{Stats, StatsView};
pub use streak::{update_streak, Streak};

use crate::{
    civil::CivilZone,
    ledger::{Heatmap, Ledger},
};
use serde::{Deserialize, Serialize};

/// Per-account progression record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionRecord {
    pub xp: u64,
    /// Always `LevelTable::level_of(xp).level`
    pub level: u32,
    pub xp_to_next_level: u64,
    pub streak: Streak,
    pub stats: Stats,
}

impl Default for ProgressionRecord {
    fn default() -> Self {
        Self::with_xp(0, &LevelTable::standard())
    }
}

impl ProgressionRecord {
    /// Fresh record holding `xp`, with level fields derived from `table`
    pub fn with_xp(xp: u64, table: &LevelTable) -> Self {
        let info = table.level_of(xp);
        Self {
            xp,
            level: info.level,
            xp_to_next_level: info.xp_to_next_level,
            streak: Streak::default(),
            stats: Stats::default(),
        }
    }

    /// Re-derive `level` and `xp_to_next_level` from `xp`
    pub fn recompute_level(&mut self, table: &LevelTable) {
        let info = table.level_of(self.xp);
        self.level = info.level;
        self.xp_to_next_level = info.xp_to_next_level;
    }

    pub fn level_info(&self) -> LevelInfo {
        LevelInfo {
            level: self.level,
            xp_to_next_level: self.xp_to_next_level,
        }
    }
}

/// The triple that activity logging mutates as one unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    pub record: ProgressionRecord,
    pub ledger: Ledger,
    pub heatmap: Heatmap,
}

impl ProgressState {
    /// Rebuild every derived field by folding the ledger from empty
    ///
    /// XP is the ledger total, stats and heatmap are re-folded and the streak
    /// is replayed over active days. `longest` keeps the larger of the
    /// replayed and previously stored value, since a streak may predate a
    /// truncated ledger.
    pub fn refold(ledger: Ledger, previous_longest: u32, zone: &CivilZone, table: &LevelTable) -> Self {
        let mut record = ProgressionRecord::with_xp(ledger.total_xp(), table);
        record.stats = Stats::fold(ledger.entries(), zone);
        record.streak = ledger.entries().iter().fold(Streak::default(), |streak, entry| {
            update_streak(&streak, zone.civil_date(entry.timestamp))
        });
        record.streak.longest = record.streak.longest.max(previous_longest);
        let heatmap = Heatmap::fold(ledger.entries(), zone);

        Self {
            record,
            ledger,
            heatmap,
        }
    }
}
