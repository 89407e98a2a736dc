/// CRUD record models
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Personal goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            description: None,
            target_date: None,
            completed: false,
            created_at: Utc::now(),
        }
    }
}

/// Learning status of a topic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TopicStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

/// Subtopic inside a topic tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtopic {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
}

/// Study topic with its subtopics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    /// Domain the topic belongs to (built-in name or custom domain id)
    #[validate(length(min = 1, max = 60))]
    pub domain: String,
    #[serde(default)]
    pub status: TopicStatus,
    #[serde(default)]
    pub subtopics: Vec<Subtopic>,
}

impl Topic {
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            domain: domain.into(),
            status: TopicStatus::NotStarted,
            subtopics: Vec::new(),
        }
    }

    pub fn add_subtopic(&mut self, name: impl Into<String>) -> &Subtopic {
        self.subtopics.push(Subtopic {
            id: new_id(),
            name: name.into(),
            completed: false,
        });
        &self.subtopics[self.subtopics.len() - 1]
    }

    /// Fraction of completed subtopics, 0.0 when there are none
    pub fn progress(&self) -> f64 {
        if self.subtopics.is_empty() {
            return 0.0;
        }
        let done = self.subtopics.iter().filter(|s| s.completed).count();
        done as f64 / self.subtopics.len() as f64
    }
}

/// Lesson inside a learning module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Course module made of lessons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LearningModule {
    pub id: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 60))]
    pub domain: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub completed: bool,
}

impl LearningModule {
    pub fn new(title: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            domain: domain.into(),
            lessons: Vec::new(),
            completed: false,
        }
    }

    pub fn add_lesson(&mut self, title: impl Into<String>) {
        self.lessons.push(Lesson {
            id: new_id(),
            title: title.into(),
            completed: false,
        });
    }

    /// Mark a lesson done; the module completes with its last lesson
    pub fn complete_lesson(&mut self, lesson_id: &str) -> bool {
        let Some(lesson) = self.lessons.iter_mut().find(|l| l.id == lesson_id) else {
            return false;
        };
        lesson.completed = true;
        self.completed = self.lessons.iter().all(|l| l.completed);
        true
    }
}

/// Exercise within a workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
}

/// Logged or planned workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: String,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub date: NaiveDate,
    #[validate(range(max = 1440))]
    pub duration_minutes: u32,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

impl Workout {
    pub fn new(name: impl Into<String>, date: NaiveDate, duration_minutes: u32) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            date,
            duration_minutes,
            exercises: Vec::new(),
        }
    }

    /// Total volume lifted (sets x reps x weight)
    pub fn volume_kg(&self) -> f64 {
        self.exercises
            .iter()
            .map(|e| f64::from(e.sets * e.reps) * e.weight_kg.unwrap_or(0.0))
            .sum()
    }
}

/// User-defined learning domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomDomain {
    pub id: String,
    #[validate(length(min = 1, max = 60))]
    pub name: String,
    /// Hex color, e.g. `#4f46e5`
    #[validate(length(equal = 7))]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CustomDomain {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            color: color.into(),
            description: None,
        }
    }
}

/// User settings, synced but outside undo history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 60))]
    pub display_name: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub daily_problem_target: u32,
    #[validate(range(max = 7))]
    pub weekly_gym_target: u32,
    pub theme: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display_name: None,
            daily_problem_target: 3,
            weekly_gym_target: 4,
            theme: "dark".to_string(),
        }
    }
}
