/// Civil dates in a single fixed UTC offset
///
/// Every day boundary in the engine (streaks, heatmap buckets, daily and
/// weekly counters) goes through `CivilZone`, never through the host's
/// local timezone.
use crate::error::{TrackerError, TrackerResult};
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Offset, Utc};

/// Format used for heatmap keys and wire dates
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// A fixed-offset civil timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilZone {
    offset: FixedOffset,
}

impl CivilZone {
    /// Build a zone from an offset east of UTC, in minutes
    pub fn from_offset_minutes(minutes: i32) -> TrackerResult<Self> {
        let offset = FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
            TrackerError::Config(format!("Invalid UTC offset: {} minutes", minutes))
        })?;
        Ok(Self { offset })
    }

    /// UTC itself
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Calendar day of `at` as seen from this zone
    pub fn civil_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// Today's civil date
    pub fn today(&self) -> NaiveDate {
        self.civil_date(Utc::now())
    }

    /// Monday of the ISO week containing `date`
    pub fn week_start(date: NaiveDate) -> NaiveDate {
        date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
    }

    pub fn date_key(date: NaiveDate) -> String {
        date.format(DATE_KEY_FORMAT).to_string()
    }

    pub fn parse_date_key(key: &str) -> TrackerResult<NaiveDate> {
        NaiveDate::parse_from_str(key, DATE_KEY_FORMAT)
            .map_err(|e| TrackerError::Validation(format!("Invalid date key {}: {}", key, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_offset_moves_day_boundary() {
        let ist = CivilZone::from_offset_minutes(330).unwrap();
        // 20:00 UTC is 01:30 the next morning at +05:30
        let at = Utc.with_ymd_and_hms(2024, 3, 10, 20, 0, 0).unwrap();
        assert_eq!(ist.civil_date(at), NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
        assert_eq!(CivilZone::utc().civil_date(at), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }

    #[test]
    fn test_negative_offset() {
        let zone = CivilZone::from_offset_minutes(-300).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap();
        assert_eq!(zone.civil_date(at), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn test_week_start_is_monday() {
        // 2024-03-14 is a Thursday
        let thursday = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        assert_eq!(CivilZone::week_start(thursday), NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
        let monday = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        assert_eq!(CivilZone::week_start(monday), monday);
    }

    #[test]
    fn test_date_key_round_trip() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 4).unwrap();
        let key = CivilZone::date_key(date);
        assert_eq!(key, "2024-07-04");
        assert_eq!(CivilZone::parse_date_key(&key).unwrap(), date);
        assert!(CivilZone::parse_date_key("07/04/2024").is_err());
    }
}
