/// Activity logging transaction
use crate::{
    civil::CivilZone,
    error::TrackerResult,
    ledger::{ActivityDetails, ActivityEntry, ActivityType},
    progression::{update_streak, LevelTable, ProgressState},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Activity submitted for logging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityInput {
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    #[serde(default)]
    pub details: ActivityDetails,
}

impl ActivityInput {
    pub fn new(activity_type: ActivityType, details: ActivityDetails) -> Self {
        Self {
            activity_type,
            details,
        }
    }
}

/// Result of logging one activity
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityOutcome {
    pub next: ProgressState,
    pub entry: ActivityEntry,
    pub xp_earned: u64,
    pub leveled_up: bool,
}

/// Log an activity against `prev`, returning the complete next state
///
/// Ledger append, XP and level, streak, category counters and heatmap are
/// all computed on a copy; `prev` is never touched, so a validation failure
/// anywhere leaves no partial update behind.
pub fn log_activity(
    prev: &ProgressState,
    input: ActivityInput,
    at: DateTime<Utc>,
    table: &LevelTable,
    zone: &CivilZone,
) -> TrackerResult<ActivityOutcome> {
    let entry = ActivityEntry::new(input.activity_type, input.details, at)?;
    let day = zone.civil_date(entry.timestamp);

    let mut next = prev.clone();
    next.ledger.append(entry.clone())?;

    let record = &mut next.record;
    let old_level = record.level;
    record.xp = record.xp.saturating_add(entry.xp_earned);
    record.recompute_level(table);
    record.streak = update_streak(&record.streak, day);
    record.stats.apply(&entry, zone);

    next.heatmap.record(&entry, zone);

    let leveled_up = next.record.level > old_level;
    Ok(ActivityOutcome {
        xp_earned: entry.xp_earned,
        leveled_up,
        entry,
        next,
    })
}
