/// Sync envelope - the full user document exchanged with the remote store
use crate::{
    civil::CivilZone,
    collections::{CustomDomain, Goal, LearningModule, Settings, Topic, Workout},
    ledger::{ActivityEntry, Heatmap, Ledger},
    progression::{LevelTable, ProgressState, Stats, Streak},
    state::AppState,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Complete bundle of user-owned state
///
/// Every field is optional on the wire: an omitted field leaves the
/// corresponding server-side value untouched. Envelopes built from local
/// state always carry every field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_log: Option<Vec<ActivityEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goals: Option<Vec<Goal>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<Topic>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modules: Option<Vec<LearningModule>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workouts: Option<Vec<Workout>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_domains: Option<Vec<CustomDomain>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak: Option<Streak>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xp: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xp_to_next_level: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heatmap: Option<Heatmap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
}

/// Profile document as returned by the remote store
pub type RemoteProfile = SyncEnvelope;

impl SyncEnvelope {
    /// Build a complete envelope from the current state
    pub fn from_state(state: &AppState) -> Self {
        let record = &state.progress.record;
        Self {
            activity_log: Some(state.progress.ledger.entries().to_vec()),
            goals: Some(state.goals.clone()),
            topics: Some(state.topics.clone()),
            modules: Some(state.modules.clone()),
            workouts: Some(state.workouts.clone()),
            custom_domains: Some(state.domains.clone()),
            stats: Some(record.stats.clone()),
            streak: Some(record.streak),
            xp: Some(record.xp),
            level: Some(record.level),
            xp_to_next_level: Some(record.xp_to_next_level),
            heatmap: Some(state.progress.heatmap.clone()),
            settings: Some(state.settings.clone()),
        }
    }

    /// Overlay every field present in `self` onto `target`
    pub fn merge_into(self, target: &mut SyncEnvelope) {
        macro_rules! overlay {
            ($($field:ident),* $(,)?) => {
                $(if self.$field.is_some() { target.$field = self.$field; })*
            };
        }
        overlay!(
            activity_log,
            goals,
            topics,
            modules,
            workouts,
            custom_domains,
            stats,
            streak,
            xp,
            level,
            xp_to_next_level,
            heatmap,
            settings,
        );
    }

    pub fn is_empty(&self) -> bool {
        *self == SyncEnvelope::default()
    }
}

/// Replace local state with a hydrated remote profile
///
/// Fields the profile omits keep their local values. When the profile
/// carries an activity log, XP, level, stats, streak and heatmap are all
/// re-derived from it; level always comes from `table`.
pub fn apply_profile(state: &mut AppState, profile: RemoteProfile, zone: &CivilZone, table: &LevelTable) {
    if let Some(goals) = profile.goals {
        state.goals = goals;
    }
    if let Some(topics) = profile.topics {
        state.topics = topics;
    }
    if let Some(modules) = profile.modules {
        state.modules = modules;
    }
    if let Some(workouts) = profile.workouts {
        state.workouts = workouts;
    }
    if let Some(domains) = profile.custom_domains {
        state.domains = domains;
    }
    if let Some(settings) = profile.settings {
        state.settings = settings;
    }

    match profile.activity_log {
        Some(entries) => {
            let mut ledger = Ledger::new();
            ledger.replace_all(entries);
            let total = ledger.total_xp();
            if let Some(remote_xp) = profile.xp {
                if remote_xp != total {
                    warn!(
                        "Remote XP {} disagrees with activity log total {}; using the log",
                        remote_xp, total
                    );
                }
            }

            let previous_longest = profile.streak.map(|s| s.longest).unwrap_or(0);
            let mut progress = ProgressState::refold(ledger, previous_longest, zone, table);
            // A streak the server saw continue later than the replay is kept
            if let Some(remote_streak) = profile.streak {
                if remote_streak.last_activity_date > progress.record.streak.last_activity_date {
                    progress.record.streak = remote_streak;
                    progress.record.streak.longest = remote_streak.longest.max(remote_streak.current);
                }
            }
            state.progress = progress;
        }
        None => {
            let record = &mut state.progress.record;
            if let Some(xp) = profile.xp {
                record.xp = xp;
            }
            if let Some(streak) = profile.streak {
                record.streak = streak;
                record.streak.longest = streak.longest.max(streak.current);
            }
            if let Some(stats) = profile.stats {
                record.stats = stats;
            }
            if let Some(heatmap) = profile.heatmap {
                state.progress.heatmap = heatmap;
            }
            state.progress.record.recompute_level(table);
        }
    }

    if let Some(remote_level) = profile.level {
        let canonical = state.progress.record.level;
        if remote_level != canonical {
            warn!(
                "Remote level {} differs from canonical level {} at {} XP; using canonical table",
                remote_level, canonical, state.progress.record.xp
            );
        }
    }

    debug!(
        "Applied remote profile: {} activities, {} goals, level {}",
        state.progress.ledger.len(),
        state.goals.len(),
        state.progress.record.level
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{ActivityDetails, ActivityType};
    use chrono::{TimeZone, Utc};

    fn gym_at(day: u32) -> ActivityEntry {
        ActivityEntry::new(
            ActivityType::Gym,
            ActivityDetails::default(),
            Utc.with_ymd_and_hms(2024, 9, day, 10, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_from_state_carries_every_field() {
        let envelope = SyncEnvelope::from_state(&AppState::default());
        let json = serde_json::to_value(&envelope).unwrap();
        for field in [
            "activityLog",
            "goals",
            "topics",
            "modules",
            "workouts",
            "customDomains",
            "stats",
            "streak",
            "xp",
            "level",
            "xpToNextLevel",
            "heatmap",
            "settings",
        ] {
            assert!(json.get(field).is_some(), "missing {}", field);
        }
    }

    #[test]
    fn test_omitted_fields_are_not_serialized() {
        let envelope = SyncEnvelope {
            xp: Some(10),
            ..Default::default()
        };
        let json = serde_json::to_string(&envelope).unwrap();
        assert_eq!(json, r#"{"xp":10}"#);
    }

    #[test]
    fn test_merge_leaves_omitted_fields() {
        let mut stored = SyncEnvelope::from_state(&AppState::default());
        stored.goals = Some(vec![Goal::new("Keep me")]);
        let partial = SyncEnvelope {
            xp: Some(500),
            ..Default::default()
        };

        partial.merge_into(&mut stored);
        assert_eq!(stored.xp, Some(500));
        assert_eq!(stored.goals.map(|g| g.len()), Some(1));
    }

    #[test]
    fn test_apply_profile_refolds_from_log() {
        let zone = CivilZone::utc();
        let table = LevelTable::standard();
        let profile = RemoteProfile {
            activity_log: Some(vec![gym_at(2), gym_at(1), gym_at(3)]),
            xp: Some(60),
            level: Some(7),
            ..Default::default()
        };

        let mut state = AppState::default();
        apply_profile(&mut state, profile, &zone, &table);

        let record = &state.progress.record;
        assert_eq!(record.xp, 60);
        assert_eq!(record.level, 1);
        assert_eq!(record.streak.current, 3);
        assert_eq!(state.progress.heatmap.len(), 3);
        assert_eq!(record.stats.count_of(ActivityType::Gym), 3);
    }

    #[test]
    fn test_apply_profile_without_log_recomputes_level() {
        let zone = CivilZone::utc();
        let table = LevelTable::standard();
        let profile = RemoteProfile {
            xp: Some(1200),
            level: Some(3),
            ..Default::default()
        };

        let mut state = AppState::default();
        state.goals.push(Goal::new("Local goal"));
        apply_profile(&mut state, profile, &zone, &table);

        assert_eq!(state.progress.record.level, 5);
        assert_eq!(state.progress.record.xp_to_next_level, 800);
        assert_eq!(state.goals.len(), 1);
    }

    #[test]
    fn test_apply_profile_with_extreme_xp() {
        let profile = RemoteProfile {
            xp: Some(u64::MAX - 1),
            ..Default::default()
        };

        let mut state = AppState::default();
        apply_profile(&mut state, profile, &CivilZone::utc(), &LevelTable::standard());
        assert_eq!(state.progress.record.xp, u64::MAX - 1);
        assert_eq!(state.progress.record.level, u32::MAX);
    }

    #[test]
    fn test_apply_profile_without_log_clamps_longest_streak() {
        let profile = RemoteProfile {
            streak: Some(Streak {
                current: 6,
                longest: 2,
                last_activity_date: None,
            }),
            ..Default::default()
        };

        let mut state = AppState::default();
        apply_profile(&mut state, profile, &CivilZone::utc(), &LevelTable::standard());
        assert_eq!(state.progress.record.streak.current, 6);
        assert_eq!(state.progress.record.streak.longest, 6);
    }
}
