/// Per-category counters derived from the ledger
use crate::{
    civil::CivilZone,
    ledger::{ActivityEntry, ActivityType},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category counters, persisted for fast access
///
/// `Stats::apply` is the only step function: incremental updates and the
/// full fold both go through it, so the two cannot diverge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Problems solved on `problems_day`
    pub problems_solved_today: u32,
    pub problems_day: Option<NaiveDate>,
    pub problems_solved_total: u32,
    pub modules_completed: u32,
    /// Distinct gym days in the week starting `gym_week_start`
    pub gym_days_this_week: u32,
    pub gym_week_start: Option<NaiveDate>,
    pub last_gym_day: Option<NaiveDate>,
    pub applications_sent: u32,
    pub wins_logged: u32,
    #[serde(default)]
    pub by_type: BTreeMap<ActivityType, u32>,
}

/// Counters as seen on a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    pub problems_solved_today: u32,
    pub problems_solved_total: u32,
    pub modules_completed: u32,
    pub gym_days_this_week: u32,
    pub applications_sent: u32,
    pub wins_logged: u32,
}

impl Stats {
    /// Fold a single entry into the counters
    pub fn apply(&mut self, entry: &ActivityEntry, zone: &CivilZone) {
        let day = zone.civil_date(entry.timestamp);
        *self.by_type.entry(entry.activity_type).or_insert(0) += 1;

        match entry.activity_type {
            ActivityType::Dsa => {
                if self.problems_day != Some(day) {
                    self.problems_day = Some(day);
                    self.problems_solved_today = 0;
                }
                self.problems_solved_today += 1;
                self.problems_solved_total += 1;
            }
            ActivityType::Ai => self.modules_completed += 1,
            ActivityType::Gym => {
                let week = CivilZone::week_start(day);
                if self.gym_week_start != Some(week) {
                    self.gym_week_start = Some(week);
                    self.gym_days_this_week = 0;
                }
                if self.last_gym_day != Some(day) {
                    self.last_gym_day = Some(day);
                    self.gym_days_this_week += 1;
                }
            }
            ActivityType::Job => self.applications_sent += 1,
            ActivityType::Personal => self.wins_logged += 1,
        }
    }

    /// Rebuild from scratch
    pub fn fold<'a, I>(entries: I, zone: &CivilZone) -> Self
    where
        I: IntoIterator<Item = &'a ActivityEntry>,
    {
        let mut stats = Self::default();
        for entry in entries {
            stats.apply(entry, zone);
        }
        stats
    }

    /// Problems solved on `today`; zero if the counter day has rolled over
    pub fn problems_solved_on(&self, today: NaiveDate) -> u32 {
        if self.problems_day == Some(today) {
            self.problems_solved_today
        } else {
            0
        }
    }

    /// Gym days in the week containing `today`
    pub fn gym_days_in_week_of(&self, today: NaiveDate) -> u32 {
        if self.gym_week_start == Some(CivilZone::week_start(today)) {
            self.gym_days_this_week
        } else {
            0
        }
    }

    pub fn count_of(&self, activity_type: ActivityType) -> u32 {
        self.by_type.get(&activity_type).copied().unwrap_or(0)
    }

    pub fn view(&self, today: NaiveDate) -> StatsView {
        StatsView {
            problems_solved_today: self.problems_solved_on(today),
            problems_solved_total: self.problems_solved_total,
            modules_completed: self.modules_completed,
            gym_days_this_week: self.gym_days_in_week_of(today),
            applications_sent: self.applications_sent,
            wins_logged: self.wins_logged,
        }
    }
}
