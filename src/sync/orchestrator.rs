/// Sync orchestrator - debounced, hydration-gated pushes to the remote store
use crate::{
    config::SyncConfig,
    error::{TrackerError, TrackerResult},
    metrics,
    sync::{deferred::DeferredTask, envelope::SyncEnvelope, remote::RemoteStore},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, PoisonError, RwLock,
};
use tracing::{debug, info, warn};

/// Supplies the current envelope at the moment a push happens
pub trait EnvelopeSource: Send + Sync {
    fn envelope(&self) -> SyncEnvelope;
}

/// What triggered a push
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    Debounce,
    Heartbeat,
    Forced,
}

impl SyncTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncTrigger::Debounce => "debounce",
            SyncTrigger::Heartbeat => "heartbeat",
            SyncTrigger::Forced => "forced",
        }
    }
}

/// Sync health as shown by the "last saved" indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncMode {
    /// Waiting for the initial profile load
    Hydrating,
    /// Hydrated; local changes are pushed
    Synced,
    /// Hydration failed or no credential; changes stay local
    LocalOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub mode: SyncMode,
    pub last_saved: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub pushes: u64,
    pub failures: u64,
    pub in_flight: u32,
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self {
            mode: SyncMode::Hydrating,
            last_saved: None,
            last_error: None,
            pushes: 0,
            failures: 0,
            in_flight: 0,
        }
    }
}

/// Debounces and transmits the full envelope
///
/// Nothing is pushed until `mark_hydrated` has been called: a fresh
/// session's defaults must never overwrite the server document.
pub struct SyncOrchestrator {
    remote: Arc<dyn RemoteStore>,
    source: Arc<dyn EnvelopeSource>,
    config: SyncConfig,
    token: RwLock<Option<String>>,
    hydration_complete: AtomicBool,
    pending: DeferredTask,
    status: RwLock<SyncStatus>,
}

impl SyncOrchestrator {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        source: Arc<dyn EnvelopeSource>,
        config: SyncConfig,
        token: Option<String>,
    ) -> Self {
        Self {
            remote,
            source,
            config,
            token: RwLock::new(token),
            hydration_complete: AtomicBool::new(false),
            pending: DeferredTask::new(),
            status: RwLock::new(SyncStatus::default()),
        }
    }

    pub fn remote(&self) -> &Arc<dyn RemoteStore> {
        &self.remote
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    /// Drop the credential and close the hydration gate
    pub fn clear_token(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.reset_hydration();
        self.pending.cancel();
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Open the gate once the remote profile is in memory
    pub fn mark_hydrated(&self) {
        self.hydration_complete.store(true, Ordering::SeqCst);
        self.update_status(|s| {
            s.mode = SyncMode::Synced;
            s.last_error = None;
        });
        info!("Hydration complete; sync enabled");
    }

    /// Stay offline; the gate remains closed
    pub fn mark_local_only(&self, reason: impl Into<String>) {
        self.hydration_complete.store(false, Ordering::SeqCst);
        let reason = reason.into();
        warn!("Running in local-only mode: {}", reason);
        self.update_status(|s| {
            s.mode = SyncMode::LocalOnly;
            s.last_error = Some(reason);
        });
    }

    pub fn reset_hydration(&self) {
        self.hydration_complete.store(false, Ordering::SeqCst);
        self.update_status(|s| s.mode = SyncMode::Hydrating);
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydration_complete.load(Ordering::SeqCst)
    }

    /// Whether pushes are currently permitted
    pub fn can_sync(&self) -> bool {
        self.is_authenticated() && self.is_hydrated()
    }

    /// (Re)start the debounce timer; no-op until authenticated and hydrated
    pub fn schedule_sync(self: &Arc<Self>) -> bool {
        if !self.can_sync() {
            debug!("Sync not scheduled: gate closed");
            return false;
        }

        let this = Arc::clone(self);
        let scheduled = self.pending.schedule(self.config.debounce(), async move {
            this.push_logged(SyncTrigger::Debounce).await;
        });
        if scheduled {
            debug!("Sync scheduled in {:?}", self.config.debounce());
        }
        scheduled
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_pending()
    }

    /// Push immediately, superseding any pending debounce
    pub async fn force_sync(&self) -> TrackerResult<()> {
        if !self.is_authenticated() {
            return Err(TrackerError::Unauthenticated);
        }
        if !self.is_hydrated() {
            return Err(TrackerError::SyncUnavailable(
                "hydration has not completed".to_string(),
            ));
        }

        self.pending.cancel();
        self.push_now(SyncTrigger::Forced).await
    }

    /// Periodic heartbeat push; silently skipped while the gate is closed
    pub async fn heartbeat(&self) {
        if !self.can_sync() {
            debug!("Heartbeat skipped: gate closed");
            return;
        }
        self.push_logged(SyncTrigger::Heartbeat).await;
    }

    /// Push and swallow the error; the next push carries a superset
    async fn push_logged(&self, trigger: SyncTrigger) {
        if let Err(e) = self.push_now(trigger).await {
            warn!("Sync ({}) failed, will retry with newer state: {}", trigger.as_str(), e);
        }
    }

    /// Read the current envelope and transmit it
    async fn push_now(&self, trigger: SyncTrigger) -> TrackerResult<()> {
        let token = self.token().ok_or(TrackerError::Unauthenticated)?;
        if !self.is_hydrated() {
            return Err(TrackerError::SyncUnavailable(
                "hydration has not completed".to_string(),
            ));
        }

        let envelope = self.source.envelope();
        self.update_status(|s| s.in_flight += 1);
        let result = self.remote.push_profile(&token, &envelope).await;

        match &result {
            Ok(()) => {
                let now = Utc::now();
                self.update_status(|s| {
                    s.in_flight -= 1;
                    s.pushes += 1;
                    s.last_saved = Some(now);
                    s.last_error = None;
                });
                metrics::record_sync(trigger, true);
                debug!(
                    "Sync ({}) pushed {} activities",
                    trigger.as_str(),
                    envelope.activity_log.as_ref().map(|l| l.len()).unwrap_or(0)
                );
            }
            Err(e) => {
                let message = e.to_string();
                self.update_status(|s| {
                    s.in_flight -= 1;
                    s.failures += 1;
                    s.last_error = Some(message);
                });
                metrics::record_sync(trigger, false);
            }
        }

        result
    }

    pub fn status(&self) -> SyncStatus {
        self.status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Cancel the pending debounce timer (in-flight pushes continue)
    pub fn shutdown(&self) {
        if self.pending.cancel() {
            debug!("Pending sync cancelled on shutdown");
        }
    }

    fn update_status<F: FnOnce(&mut SyncStatus)>(&self, f: F) {
        f(&mut self.status.write().unwrap_or_else(PoisonError::into_inner));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::remote::MemoryRemoteStore;
    use std::sync::atomic::AtomicU64;
    use std::time::Duration;

    /// Envelope source whose XP counter can be bumped between pushes
    #[derive(Default)]
    struct CounterSource {
        xp: AtomicU64,
    }

    impl EnvelopeSource for CounterSource {
        fn envelope(&self) -> SyncEnvelope {
            SyncEnvelope {
                xp: Some(self.xp.load(Ordering::SeqCst)),
                ..Default::default()
            }
        }
    }

    fn orchestrator(token: Option<&str>) -> (Arc<SyncOrchestrator>, Arc<MemoryRemoteStore>, Arc<CounterSource>) {
        let remote = Arc::new(MemoryRemoteStore::new());
        let source = Arc::new(CounterSource::default());
        let sync = Arc::new(SyncOrchestrator::new(
            remote.clone(),
            source.clone(),
            SyncConfig::default(),
            token.map(str::to_string),
        ));
        (sync, remote, source)
    }

    #[tokio::test(start_paused = true)]
    async fn test_gate_blocks_until_hydrated() {
        let (sync, remote, _) = orchestrator(Some("token"));
        assert!(!sync.schedule_sync());
        sync.heartbeat().await;
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(remote.push_count(), 0);
        assert!(matches!(sync.force_sync().await, Err(TrackerError::SyncUnavailable(_))));

        sync.mark_hydrated();
        assert!(sync.schedule_sync());
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(remote.push_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unauthenticated_never_pushes() {
        let (sync, remote, _) = orchestrator(None);
        sync.mark_hydrated();
        assert!(!sync.schedule_sync());
        assert!(matches!(sync.force_sync().await, Err(TrackerError::Unauthenticated)));
        assert_eq!(remote.push_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_reads_state_at_fire_time() {
        let (sync, remote, source) = orchestrator(Some("token"));
        sync.mark_hydrated();

        source.xp.store(10, Ordering::SeqCst);
        sync.schedule_sync();
        // Mutated after scheduling but before the timer fires
        source.xp.store(99, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(remote.pushes()[0].xp, Some(99));
        let status = sync.status();
        assert_eq!(status.pushes, 1);
        assert!(status.last_saved.is_some());
        assert_eq!(status.mode, SyncMode::Synced);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_recorded_and_heals() {
        let (sync, remote, source) = orchestrator(Some("token"));
        sync.mark_hydrated();
        remote.set_fail_push(true);

        source.xp.store(5, Ordering::SeqCst);
        sync.schedule_sync();
        tokio::time::sleep(Duration::from_secs(3)).await;
        let status = sync.status();
        assert_eq!(status.failures, 1);
        assert!(status.last_error.is_some());
        assert_eq!(status.in_flight, 0);

        remote.set_fail_push(false);
        source.xp.store(8, Ordering::SeqCst);
        sync.heartbeat().await;
        assert_eq!(remote.profile().xp, Some(8));
        assert!(sync.status().last_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_token_closes_gate() {
        let (sync, remote, _) = orchestrator(Some("token"));
        sync.mark_hydrated();
        sync.schedule_sync();
        sync.clear_token();

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(remote.push_count(), 0);
        assert!(!sync.is_hydrated());
        assert_eq!(sync.status().mode, SyncMode::Hydrating);
    }

    #[tokio::test]
    async fn test_local_only_mode() {
        let (sync, _, _) = orchestrator(Some("token"));
        sync.mark_local_only("profile fetch failed");
        let status = sync.status();
        assert_eq!(status.mode, SyncMode::LocalOnly);
        assert_eq!(status.last_error.as_deref(), Some("profile fetch failed"));
        assert!(!sync.can_sync());
    }
}
