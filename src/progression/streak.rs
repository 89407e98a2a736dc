/// Streak tracker - consecutive civil days with at least one activity
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily streak record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub current: u32,
    pub longest: u32,
    pub last_activity_date: Option<NaiveDate>,
}

impl Streak {
    /// Streak as displayed on `today`: zero once a full day has been missed
    pub fn live_current(&self, today: NaiveDate) -> u32 {
        match self.last_activity_date {
            Some(last) if (today - last).num_days() <= 1 => self.current,
            _ => 0,
        }
    }
}

/// Fold one active civil day into a streak record
///
/// Logging twice on the same day is a no-op. A last activity date later than
/// `today` is also left untouched.
pub fn update_streak(current: &Streak, today: NaiveDate) -> Streak {
    let Some(last) = current.last_activity_date else {
        return Streak {
            current: 1,
            longest: current.longest.max(1),
            last_activity_date: Some(today),
        };
    };

    match (today - last).num_days() {
        gap if gap <= 0 => *current,
        1 => {
            let next = current.current + 1;
            Streak {
                current: next,
                longest: current.longest.max(next),
                last_activity_date: Some(today),
            }
        }
        _ => Streak {
            current: 1,
            longest: current.longest.max(1),
            last_activity_date: Some(today),
        },
    }
}
