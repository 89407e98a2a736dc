/// Streakforge - progression and synchronization engine
///
/// Derives XP, levels, streaks and a yearly heatmap from an append-only
/// activity ledger, keeps a bounded undo/redo history over every mutation,
/// and pushes the full user document to a remote profile store through a
/// debounced, hydration-gated sync.

pub mod civil;
pub mod collections;
pub mod config;
pub mod context;
pub mod error;
pub mod history;
pub mod jobs;
pub mod ledger;
pub mod metrics;
pub mod progression;
pub mod state;
pub mod store;
pub mod sync;

pub use config::TrackerConfig;
pub use context::{AppContext, HydrationOutcome};
pub use error::{TrackerError, TrackerResult};
