/// CRUD collections
///
/// Goals, topics, modules, workouts and custom domains. They share the undo
/// history with activity logging but never touch XP, streak or heatmap.

mod models;

pub use models::{
    CustomDomain, Exercise, Goal, LearningModule, Lesson, Settings, Subtopic, Topic, TopicStatus,
    Workout,
};

use crate::{
    history::{CollectionKind, Snapshot},
    state::AppState,
};
use validator::Validate;

/// A record type stored in one of the synced collections
pub trait Record: Clone + Validate + Send + Sync + 'static {
    const KIND: CollectionKind;

    fn id(&self) -> &str;

    fn items(state: &AppState) -> &Vec<Self>;

    fn items_mut(state: &mut AppState) -> &mut Vec<Self>;

    fn snapshot(items: Vec<Self>) -> Snapshot;
}

macro_rules! impl_record {
    ($ty:ty, $kind:expr, $field:ident, $variant:ident) => {
        impl Record for $ty {
            const KIND: CollectionKind = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn items(state: &AppState) -> &Vec<Self> {
                &state.$field
            }

            fn items_mut(state: &mut AppState) -> &mut Vec<Self> {
                &mut state.$field
            }

            fn snapshot(items: Vec<Self>) -> Snapshot {
                Snapshot::$variant(items)
            }
        }
    };
}

impl_record!(Goal, CollectionKind::Goals, goals, Goals);
impl_record!(Topic, CollectionKind::Topics, topics, Topics);
impl_record!(LearningModule, CollectionKind::Modules, modules, Modules);
impl_record!(Workout, CollectionKind::Workouts, workouts, Workouts);
impl_record!(CustomDomain, CollectionKind::Domains, domains, Domains);

/// Find a record by id
pub fn find<'a, T: Record>(items: &'a [T], id: &str) -> Option<&'a T> {
    items.iter().find(|item| item.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_slots() {
        let mut state = AppState::default();
        Goal::items_mut(&mut state).push(Goal::new("Learn Rust"));
        assert_eq!(Goal::items(&state).len(), 1);
        assert!(Topic::items(&state).is_empty());

        let id = state.goals[0].id.clone();
        assert!(find(Goal::items(&state), &id).is_some());
        assert!(find(Goal::items(&state), "nope").is_none());
    }

    #[test]
    fn test_snapshot_variant_matches_kind() {
        assert!(matches!(Workout::snapshot(Vec::new()), Snapshot::Workouts(_)));
        assert_eq!(CustomDomain::KIND, CollectionKind::Domains);
    }
}
