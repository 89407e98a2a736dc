/// In-memory application state
use crate::{
    collections::{CustomDomain, Goal, LearningModule, Settings, Topic, Workout},
    history::{HistoryManager, Snapshot},
    progression::ProgressState,
};
use serde::{Deserialize, Serialize};

/// Every user-owned collection held for the session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub progress: ProgressState,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub modules: Vec<LearningModule>,
    #[serde(default)]
    pub workouts: Vec<Workout>,
    #[serde(default)]
    pub domains: Vec<CustomDomain>,
    #[serde(default)]
    pub settings: Settings,
}

/// State plus its undo history, guarded together
#[derive(Debug, Default)]
pub struct Session {
    pub state: AppState,
    pub history: HistoryManager<Snapshot>,
}

impl Session {
    pub fn new(state: AppState, history_limit: usize) -> Self {
        Self {
            state,
            history: HistoryManager::new(history_limit),
        }
    }
}
