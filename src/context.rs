/// Application context and dependency injection
use crate::{
    civil::CivilZone,
    collections::{find, Record, Settings},
    config::TrackerConfig,
    error::{TrackerError, TrackerResult},
    history::{HistoryAction, HistoryEntry, HistoryOutcome, Snapshot},
    ledger::{ActivityEntry, Heatmap},
    metrics,
    progression::{self, ActivityInput, ActivityOutcome, LevelTable, ProgressState, ProgressionRecord, StatsView},
    state::{AppState, Session},
    store::LocalStore,
    sync::{apply_profile, EnvelopeSource, HttpRemoteStore, RemoteStore, SyncEnvelope, SyncOrchestrator, SyncStatus},
};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};
use validator::Validate;

/// Session handle the orchestrator reads envelopes from
struct SessionSource(Arc<RwLock<Session>>);

impl EnvelopeSource for SessionSource {
    fn envelope(&self) -> SyncEnvelope {
        let session = self.0.read().unwrap_or_else(PoisonError::into_inner);
        SyncEnvelope::from_state(&session.state)
    }
}

/// Result of loading the remote profile at session start
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydrationOutcome {
    /// Remote state is in memory and sync is enabled
    Hydrated { activities: usize },
    /// Running offline; the reason is kept for the status indicator
    LocalOnly(String),
}

/// Application context holding all shared services
///
/// Every mutator runs synchronously to completion under the session lock,
/// records its history entry, and then schedules a sync.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<TrackerConfig>,
    zone: CivilZone,
    table: Arc<LevelTable>,
    session: Arc<RwLock<Session>>,
    sync: Arc<SyncOrchestrator>,
    store: LocalStore,
}

impl AppContext {
    /// Create a new application context from configuration
    ///
    /// Talks to the configured HTTP remote and starts from the local
    /// snapshot, if one exists.
    pub async fn new(config: TrackerConfig) -> TrackerResult<Self> {
        config.validate()?;
        Self::ensure_directories(&config).await?;

        let remote: Arc<dyn RemoteStore> = Arc::new(HttpRemoteStore::new(&config.remote)?);
        let store = LocalStore::new(config.storage.snapshot_path.clone());
        let state = store.load().await?;

        Self::with_remote(config, remote, state)
    }

    /// Build a context around an explicit remote store and initial state
    pub fn with_remote(
        config: TrackerConfig,
        remote: Arc<dyn RemoteStore>,
        state: AppState,
    ) -> TrackerResult<Self> {
        config.validate()?;

        let zone = CivilZone::from_offset_minutes(config.progression.utc_offset_minutes)?;
        let table = Arc::new(LevelTable::standard());
        let session = Arc::new(RwLock::new(Session::new(state, config.progression.history_limit)));

        let sync = Arc::new(SyncOrchestrator::new(
            remote,
            Arc::new(SessionSource(Arc::clone(&session))),
            config.sync.clone(),
            config.remote.auth_token.clone(),
        ));
        let store = LocalStore::new(config.storage.snapshot_path.clone());

        let context = Self {
            config: Arc::new(config),
            zone,
            table,
            session,
            sync,
            store,
        };
        context.publish_progression();
        Ok(context)
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &TrackerConfig) -> TrackerResult<()> {
        let dir = &config.storage.data_directory;
        if !dir.exists() {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                TrackerError::Internal(format!("Failed to create directory {:?}: {}", dir, e))
            })?;
        }
        Ok(())
    }

    fn read_session(&self) -> RwLockReadGuard<'_, Session> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_session(&self) -> RwLockWriteGuard<'_, Session> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_progression(&self) {
        let session = self.read_session();
        let record = &session.state.progress.record;
        metrics::set_progression(record.level, record.streak.live_current(self.zone.today()));
    }

    // ========== Session lifecycle ==========

    /// Load the authoritative remote profile and open the sync gate
    ///
    /// Without a credential, or when the fetch fails, the session stays in
    /// local-only mode and nothing is ever pushed.
    pub async fn hydrate(&self) -> HydrationOutcome {
        let Some(token) = self.sync.token() else {
            let reason = "no credential available".to_string();
            self.sync.mark_local_only(reason.clone());
            return HydrationOutcome::LocalOnly(reason);
        };

        let profile = match self.sync.remote().fetch_profile(&token).await {
            Ok(profile) => profile,
            Err(e) => {
                let reason = format!("profile fetch failed: {}", e);
                self.sync.mark_local_only(reason.clone());
                return HydrationOutcome::LocalOnly(reason);
            }
        };

        let activities = {
            let mut session = self.write_session();
            apply_profile(&mut session.state, profile, &self.zone, &self.table);
            session.history.clear();
            session.state.progress.ledger.len()
        };

        self.publish_progression();
        self.sync.mark_hydrated();
        info!("Hydrated session with {} activities", activities);
        HydrationOutcome::Hydrated { activities }
    }

    /// Install a fresh credential and hydrate against it
    pub async fn login(&self, token: impl Into<String>) -> HydrationOutcome {
        self.sync.reset_hydration();
        self.sync.set_token(token);
        self.hydrate().await
    }

    /// Drop the credential and close the sync gate
    pub fn logout(&self) {
        self.sync.clear_token();
        info!("Logged out; sync disabled");
    }

    // ========== Activity logging ==========

    /// Log an activity happening now
    ///
    /// A ledger whose last entry is ahead of the local clock (another
    /// device, a skewed server) stamps the new entry with that timestamp
    /// instead of rejecting it.
    pub fn log_activity(&self, input: ActivityInput) -> TrackerResult<ActivityOutcome> {
        self.commit_activity(input, None)
    }

    /// Backfill an activity observed at `at`; rejected if it precedes the ledger
    pub fn log_activity_at(
        &self,
        input: ActivityInput,
        at: DateTime<Utc>,
    ) -> TrackerResult<ActivityOutcome> {
        self.commit_activity(input, Some(at))
    }

    fn commit_activity(
        &self,
        input: ActivityInput,
        at: Option<DateTime<Utc>>,
    ) -> TrackerResult<ActivityOutcome> {
        let outcome = {
            let mut session = self.write_session();
            let at = at.unwrap_or_else(|| session.state.progress.ledger.clamp_to_order(Utc::now()));
            let outcome =
                progression::log_activity(&session.state.progress, input, at, &self.table, &self.zone)?;

            let prev = std::mem::replace(&mut session.state.progress, outcome.next.clone());
            session.history.record(HistoryEntry::new(
                HistoryAction::LogActivity,
                Snapshot::Progress(Box::new(prev)),
                Snapshot::Progress(Box::new(outcome.next.clone())),
            ));
            outcome
        };

        metrics::record_activity(outcome.entry.activity_type, outcome.xp_earned);
        self.publish_progression();

        debug!(
            "Logged {} activity for {} XP",
            outcome.entry.activity_type, outcome.xp_earned
        );
        if outcome.leveled_up {
            info!(
                "Level up! Reached level {} at {} XP",
                outcome.next.record.level, outcome.next.record.xp
            );
        }

        self.sync.schedule_sync();
        Ok(outcome)
    }

    // ========== Collections ==========

    /// Swap a collection for an edited copy and record the change
    fn commit_collection<T, R, F>(&self, action: HistoryAction, edit: F) -> TrackerResult<R>
    where
        T: Record,
        F: FnOnce(&mut Vec<T>) -> TrackerResult<R>,
    {
        let result = {
            let mut session = self.write_session();
            let before = T::items(&session.state).clone();
            let mut after = before.clone();
            let result = edit(&mut after)?;

            *T::items_mut(&mut session.state) = after.clone();
            session
                .history
                .record(HistoryEntry::new(action, T::snapshot(before), T::snapshot(after)));
            result
        };

        self.sync.schedule_sync();
        Ok(result)
    }

    /// Add a record to its collection
    pub fn add<T: Record>(&self, item: T) -> TrackerResult<T> {
        item.validate()?;
        self.commit_collection(HistoryAction::Add(T::KIND), |items: &mut Vec<T>| {
            if find(items, item.id()).is_some() {
                return Err(TrackerError::Validation(format!(
                    "{} {} already exists",
                    T::KIND.as_str(),
                    item.id()
                )));
            }
            items.push(item.clone());
            Ok(item)
        })
    }

    /// Replace the record with the same id
    pub fn edit<T: Record>(&self, item: T) -> TrackerResult<T> {
        item.validate()?;
        self.commit_collection(HistoryAction::Edit(T::KIND), |items: &mut Vec<T>| {
            let slot = items
                .iter_mut()
                .find(|existing| existing.id() == item.id())
                .ok_or_else(|| TrackerError::NotFound(format!("{} {}", T::KIND.as_str(), item.id())))?;
            *slot = item.clone();
            Ok(item)
        })
    }

    /// Remove a record by id, returning it
    pub fn delete<T: Record>(&self, id: &str) -> TrackerResult<T> {
        self.commit_collection(HistoryAction::Delete(T::KIND), |items: &mut Vec<T>| {
            let index = items
                .iter()
                .position(|existing| existing.id() == id)
                .ok_or_else(|| TrackerError::NotFound(format!("{} {}", T::KIND.as_str(), id)))?;
            Ok(items.remove(index))
        })
    }

    pub fn items<T: Record>(&self) -> Vec<T> {
        T::items(&self.read_session().state).clone()
    }

    pub fn get<T: Record>(&self, id: &str) -> Option<T> {
        find(T::items(&self.read_session().state), id).cloned()
    }

    /// Replace settings; synced but not recorded in history
    pub fn update_settings(&self, settings: Settings) -> TrackerResult<()> {
        settings.validate()?;
        self.write_session().state.settings = settings;
        self.sync.schedule_sync();
        Ok(())
    }

    pub fn settings(&self) -> Settings {
        self.read_session().state.settings.clone()
    }

    // ========== History ==========

    pub fn undo(&self) -> HistoryOutcome {
        let outcome = {
            let mut guard = self.write_session();
            let Session { state, history } = &mut *guard;
            history.undo(|snapshot| snapshot.apply_to(state))
        };
        self.after_history("undo", outcome)
    }

    pub fn redo(&self) -> HistoryOutcome {
        let outcome = {
            let mut guard = self.write_session();
            let Session { state, history } = &mut *guard;
            history.redo(|snapshot| snapshot.apply_to(state))
        };
        self.after_history("redo", outcome)
    }

    fn after_history(&self, op: &str, outcome: HistoryOutcome) -> HistoryOutcome {
        metrics::record_history(op, outcome.applied());
        info!("{}", outcome.message());
        if outcome.applied() {
            self.publish_progression();
            self.sync.schedule_sync();
        }
        outcome
    }

    pub fn can_undo(&self) -> bool {
        self.read_session().history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.read_session().history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.read_session().history.len()
    }

    /// Clear the ledger, heatmap, progression record and history
    pub fn reset(&self) {
        {
            let mut session = self.write_session();
            session.state.progress = ProgressState::default();
            session.history.clear();
        }
        self.publish_progression();
        info!("Progress reset");
        self.sync.schedule_sync();
    }

    // ========== Read accessors ==========

    pub fn progression(&self) -> ProgressionRecord {
        self.read_session().state.progress.record.clone()
    }

    pub fn heatmap(&self) -> Heatmap {
        self.read_session().state.progress.heatmap.clone()
    }

    pub fn ledger(&self) -> Vec<ActivityEntry> {
        self.read_session().state.progress.ledger.entries().to_vec()
    }

    pub fn stats_view(&self, today: NaiveDate) -> StatsView {
        self.read_session().state.progress.record.stats.view(today)
    }

    /// Current streak as displayed today (zero once a day has been missed)
    pub fn live_streak(&self) -> u32 {
        self.read_session()
            .state
            .progress
            .record
            .streak
            .live_current(self.zone.today())
    }

    pub fn state(&self) -> AppState {
        self.read_session().state.clone()
    }

    pub fn envelope(&self) -> SyncEnvelope {
        SyncEnvelope::from_state(&self.read_session().state)
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.sync.status()
    }

    pub fn sync(&self) -> &Arc<SyncOrchestrator> {
        &self.sync
    }

    pub fn zone(&self) -> &CivilZone {
        &self.zone
    }

    pub fn today(&self) -> NaiveDate {
        self.zone.today()
    }

    pub fn level_table(&self) -> &LevelTable {
        &self.table
    }

    // ========== Local snapshot ==========

    pub fn local_store(&self) -> &LocalStore {
        &self.store
    }

    pub async fn save_local(&self) -> TrackerResult<()> {
        let state = self.state();
        self.store.save(&state).await
    }
}
