/// Snapshot types recorded by the history manager
use crate::{
    collections::{CustomDomain, Goal, LearningModule, Topic, Workout},
    progression::ProgressState,
    state::AppState,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// CRUD collection a mutation touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollectionKind {
    Goals,
    Topics,
    Modules,
    Workouts,
    Domains,
}

impl CollectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Goals => "goal",
            CollectionKind::Topics => "topic",
            CollectionKind::Modules => "module",
            CollectionKind::Workouts => "workout",
            CollectionKind::Domains => "domain",
        }
    }
}

/// Action tag of a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", content = "collection", rename_all = "camelCase")]
pub enum HistoryAction {
    LogActivity,
    Add(CollectionKind),
    Edit(CollectionKind),
    Delete(CollectionKind),
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryAction::LogActivity => write!(f, "log activity"),
            HistoryAction::Add(kind) => write!(f, "add {}", kind.as_str()),
            HistoryAction::Edit(kind) => write!(f, "edit {}", kind.as_str()),
            HistoryAction::Delete(kind) => write!(f, "delete {}", kind.as_str()),
        }
    }
}

/// Structural copy of the subsystem a mutation changed
///
/// Snapshots own their data; later edits to the working state never reach
/// a stored snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum Snapshot {
    Goals(Vec<Goal>),
    Topics(Vec<Topic>),
    Modules(Vec<LearningModule>),
    Workouts(Vec<Workout>),
    Domains(Vec<CustomDomain>),
    Progress(Box<ProgressState>),
}

impl Snapshot {
    /// Write this snapshot back into the subsystem it was taken from
    pub fn apply_to(&self, state: &mut AppState) {
        match self {
            Snapshot::Goals(items) => state.goals = items.clone(),
            Snapshot::Topics(items) => state.topics = items.clone(),
            Snapshot::Modules(items) => state.modules = items.clone(),
            Snapshot::Workouts(items) => state.workouts = items.clone(),
            Snapshot::Domains(items) => state.domains = items.clone(),
            Snapshot::Progress(progress) => state.progress = (**progress).clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_restores_collection() {
        let mut state = AppState::default();
        state.goals.push(Goal::new("Ship the tracker"));
        let snapshot = Snapshot::Goals(Vec::new());

        snapshot.apply_to(&mut state);
        assert!(state.goals.is_empty());
    }

    #[test]
    fn test_snapshot_is_detached_from_state() {
        let mut state = AppState::default();
        state.goals.push(Goal::new("Read a paper"));
        let snapshot = Snapshot::Goals(state.goals.clone());

        state.goals[0].title = "Changed".to_string();
        match &snapshot {
            Snapshot::Goals(goals) => assert_eq!(goals[0].title, "Read a paper"),
            other => panic!("unexpected snapshot {:?}", other),
        }
    }

    #[test]
    fn test_action_display() {
        assert_eq!(HistoryAction::Add(CollectionKind::Workouts).to_string(), "add workout");
        assert_eq!(HistoryAction::Delete(CollectionKind::Domains).to_string(), "delete domain");
    }
}
