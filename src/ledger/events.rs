/// Activity event definitions for the ledger
use crate::error::{TrackerError, TrackerResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Category of a logged activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    /// Data-structures/algorithms problem solved
    Dsa,
    /// AI/ML learning module completed
    Ai,
    Gym,
    /// Job application sent
    Job,
    /// Personal win
    Personal,
}

impl ActivityType {
    pub const ALL: [ActivityType; 5] = [
        ActivityType::Dsa,
        ActivityType::Ai,
        ActivityType::Gym,
        ActivityType::Job,
        ActivityType::Personal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Dsa => "dsa",
            ActivityType::Ai => "ai",
            ActivityType::Gym => "gym",
            ActivityType::Job => "job",
            ActivityType::Personal => "personal",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dsa" => Ok(ActivityType::Dsa),
            "ai" => Ok(ActivityType::Ai),
            "gym" => Ok(ActivityType::Gym),
            "job" => Ok(ActivityType::Job),
            "personal" => Ok(ActivityType::Personal),
            other => Err(TrackerError::Validation(format!(
                "Unknown activity type: {}",
                other
            ))),
        }
    }
}

/// Problem difficulty for `dsa` activities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl FromStr for Difficulty {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(TrackerError::Validation(format!(
                "Unknown difficulty: {}",
                other
            ))),
        }
    }
}

/// Free-form activity details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ActivityDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ActivityDetails {
    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty: Some(difficulty),
            ..Default::default()
        }
    }

    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }
}

/// XP awarded for an activity, fixed at creation time
///
/// dsa: easy 10 / medium 25 / hard 50, ai 30, gym 20, job 15, personal 10.
pub fn xp_for(activity_type: ActivityType, difficulty: Option<Difficulty>) -> TrackerResult<u64> {
    match activity_type {
        ActivityType::Dsa => match difficulty {
            Some(Difficulty::Easy) => Ok(10),
            Some(Difficulty::Medium) => Ok(25),
            Some(Difficulty::Hard) => Ok(50),
            None => Err(TrackerError::Validation(
                "dsa activities require a difficulty".to_string(),
            )),
        },
        ActivityType::Ai => Ok(30),
        ActivityType::Gym => Ok(20),
        ActivityType::Job => Ok(15),
        ActivityType::Personal => Ok(10),
    }
}

/// Immutable ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub xp_earned: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub details: ActivityDetails,
}

impl ActivityEntry {
    /// Validate input and create a new entry
    pub fn new(
        activity_type: ActivityType,
        details: ActivityDetails,
        timestamp: DateTime<Utc>,
    ) -> TrackerResult<Self> {
        details.validate()?;
        let xp_earned = xp_for(activity_type, details.difficulty)?;

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            activity_type,
            xp_earned,
            timestamp,
            details,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xp_lookup() {
        assert_eq!(xp_for(ActivityType::Dsa, Some(Difficulty::Easy)).unwrap(), 10);
        assert_eq!(xp_for(ActivityType::Dsa, Some(Difficulty::Medium)).unwrap(), 25);
        assert_eq!(xp_for(ActivityType::Dsa, Some(Difficulty::Hard)).unwrap(), 50);
        assert_eq!(xp_for(ActivityType::Ai, None).unwrap(), 30);
        assert_eq!(xp_for(ActivityType::Gym, None).unwrap(), 20);
        assert_eq!(xp_for(ActivityType::Job, None).unwrap(), 15);
        assert_eq!(xp_for(ActivityType::Personal, None).unwrap(), 10);
        assert!(xp_for(ActivityType::Dsa, None).is_err());
    }

    #[test]
    fn test_parse_activity_type() {
        assert_eq!("DSA".parse::<ActivityType>().unwrap(), ActivityType::Dsa);
        assert_eq!(" gym ".parse::<ActivityType>().unwrap(), ActivityType::Gym);
        assert!(matches!(
            "yoga".parse::<ActivityType>(),
            Err(TrackerError::Validation(_))
        ));
        assert!("extreme".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_entry_serialization() {
        let mut details = ActivityDetails::with_difficulty(Difficulty::Hard);
        details
            .extra
            .insert("platform".to_string(), Value::String("leetcode".to_string()));
        let entry = ActivityEntry::new(ActivityType::Dsa, details, Utc::now()).unwrap();

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "dsa");
        assert_eq!(json["xpEarned"], 50);
        assert_eq!(json["details"]["difficulty"], "hard");
        assert_eq!(json["details"]["platform"], "leetcode");

        let back: ActivityEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_rejects_empty_title() {
        let details = ActivityDetails::titled("");
        let result = ActivityEntry::new(ActivityType::Personal, details, Utc::now());
        assert!(matches!(result, Err(TrackerError::Validation(_))));
    }
}
