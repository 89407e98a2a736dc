/// Heatmap aggregator - per civil day activity totals
use crate::{civil::CivilZone, ledger::ActivityEntry};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Totals for one civil day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapBucket {
    pub count: u32,
    pub total_xp: u64,
}

/// One day of the yearly grid handed to the visualization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub count: u32,
    pub total_xp: u64,
    /// 0 (no activity) to 4 (busiest)
    pub intensity: u8,
}

/// Heatmap keyed by `YYYY-MM-DD`
///
/// Wire shape: `{ "<YYYY-MM-DD>": { "count": int, "totalXp": int } }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Heatmap {
    buckets: BTreeMap<String, HeatmapBucket>,
}

impl Heatmap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one entry to the bucket of its civil date
    pub fn record(&mut self, entry: &ActivityEntry, zone: &CivilZone) {
        let key = CivilZone::date_key(zone.civil_date(entry.timestamp));
        let bucket = self.buckets.entry(key).or_default();
        bucket.count += 1;
        bucket.total_xp += entry.xp_earned;
    }

    /// Rebuild from scratch
    pub fn fold<'a, I>(entries: I, zone: &CivilZone) -> Self
    where
        I: IntoIterator<Item = &'a ActivityEntry>,
    {
        let mut heatmap = Self::new();
        for entry in entries {
            heatmap.record(entry, zone);
        }
        heatmap
    }

    pub fn bucket(&self, date: NaiveDate) -> Option<HeatmapBucket> {
        self.buckets.get(&CivilZone::date_key(date)).copied()
    }

    pub fn buckets(&self) -> &BTreeMap<String, HeatmapBucket> {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of days in `year` with at least one activity
    pub fn active_days_in(&self, year: i32) -> usize {
        let prefix = format!("{:04}-", year);
        self.buckets
            .iter()
            .filter(|(key, bucket)| key.starts_with(&prefix) && bucket.count > 0)
            .count()
    }

    /// Every calendar day of `year`, in order
    pub fn year_grid(&self, year: i32) -> Vec<HeatmapCell> {
        let (Some(start), Some(end)) = (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) else {
            return Vec::new();
        };

        let mut cells = Vec::with_capacity(366);
        let mut date = start;
        while date <= end {
            let bucket = self.bucket(date).unwrap_or_default();
            cells.push(HeatmapCell {
                date,
                count: bucket.count,
                total_xp: bucket.total_xp,
                intensity: intensity(&bucket),
            });
            date += Duration::days(1);
        }

        cells
    }
}

fn intensity(bucket: &HeatmapBucket) -> u8 {
    match (bucket.count, bucket.total_xp) {
        (0, _) => 0,
        (_, xp) if xp <= 20 => 1,
        (_, xp) if xp <= 50 => 2,
        (_, xp) if xp <= 100 => 3,
        _ => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{ActivityDetails, ActivityType, Difficulty};
    use chrono::{TimeZone, Utc};

    fn entry(activity_type: ActivityType, details: ActivityDetails, hour: u32, day: u32) -> ActivityEntry {
        ActivityEntry::new(
            activity_type,
            details,
            Utc.with_ymd_and_hms(2024, 2, day, hour, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_same_day_entries_share_bucket() {
        let zone = CivilZone::utc();
        let mut heatmap = Heatmap::new();
        heatmap.record(&entry(ActivityType::Gym, ActivityDetails::default(), 8, 3), &zone);
        heatmap.record(&entry(ActivityType::Gym, ActivityDetails::default(), 19, 3), &zone);

        let bucket = heatmap.bucket(NaiveDate::from_ymd_opt(2024, 2, 3).unwrap()).unwrap();
        assert_eq!(bucket, HeatmapBucket { count: 2, total_xp: 40 });
        assert_eq!(heatmap.len(), 1);
    }

    #[test]
    fn test_bucket_uses_civil_zone() {
        // 22:00 UTC on the 3rd is already the 4th at +05:30
        let zone = CivilZone::from_offset_minutes(330).unwrap();
        let heatmap = Heatmap::fold(
            [&entry(ActivityType::Job, ActivityDetails::default(), 22, 3)],
            &zone,
        );
        assert!(heatmap.bucket(NaiveDate::from_ymd_opt(2024, 2, 3).unwrap()).is_none());
        assert!(heatmap.bucket(NaiveDate::from_ymd_opt(2024, 2, 4).unwrap()).is_some());
    }

    #[test]
    fn test_wire_shape() {
        let zone = CivilZone::utc();
        let heatmap = Heatmap::fold(
            [&entry(ActivityType::Dsa, ActivityDetails::with_difficulty(Difficulty::Medium), 9, 5)],
            &zone,
        );
        let json = serde_json::to_value(&heatmap).unwrap();
        assert_eq!(json["2024-02-05"]["count"], 1);
        assert_eq!(json["2024-02-05"]["totalXp"], 25);
    }

    #[test]
    fn test_year_grid() {
        let zone = CivilZone::utc();
        let heatmap = Heatmap::fold(
            [
                &entry(ActivityType::Dsa, ActivityDetails::with_difficulty(Difficulty::Hard), 9, 5),
                &entry(ActivityType::Dsa, ActivityDetails::with_difficulty(Difficulty::Hard), 10, 5),
                &entry(ActivityType::Personal, ActivityDetails::default(), 9, 6),
            ],
            &zone,
        );

        let grid = heatmap.year_grid(2024);
        assert_eq!(grid.len(), 366);
        let feb5 = grid.iter().find(|c| c.date == NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()).unwrap();
        assert_eq!(feb5.count, 2);
        assert_eq!(feb5.intensity, 3);
        let feb6 = grid.iter().find(|c| c.date == NaiveDate::from_ymd_opt(2024, 2, 6).unwrap()).unwrap();
        assert_eq!(feb6.intensity, 1);
        assert_eq!(grid[0].intensity, 0);
        assert_eq!(heatmap.active_days_in(2024), 2);
        assert_eq!(heatmap.active_days_in(2023), 0);
    }
}
