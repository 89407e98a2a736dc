use crate::context::AppContext;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info};

pub mod tasks;

/// Local snapshot cadence
const SNAPSHOT_INTERVAL_SECS: u64 = 300;

/// Job scheduler for background tasks
pub struct JobScheduler {
    context: AppContext,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl JobScheduler {
    pub fn new(context: AppContext) -> Self {
        Self {
            context,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Start all background jobs
    pub fn start(self: &Arc<Self>) {
        info!("Starting background job scheduler");

        let heartbeat = tokio::spawn(Self::sync_heartbeat_job(Arc::clone(self)));
        let snapshot = tokio::spawn(Self::local_snapshot_job(Arc::clone(self)));
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend([heartbeat, snapshot]);

        info!("Background jobs started");
    }

    /// Abort every running job
    pub fn stop(&self) {
        let handles: Vec<_> = self
            .handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for handle in &handles {
            handle.abort();
        }
        info!("Stopped {} background jobs", handles.len());
    }

    /// Push the current envelope on every heartbeat tick
    async fn sync_heartbeat_job(scheduler: Arc<Self>) {
        let mut interval = interval(scheduler.context.config.sync.heartbeat());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; hydration already covered it
        interval.tick().await;

        loop {
            interval.tick().await;
            tasks::sync_heartbeat(&scheduler.context).await;
        }
    }

    /// Save the local snapshot (runs every 5 minutes)
    async fn local_snapshot_job(scheduler: Arc<Self>) {
        let mut interval = interval(Duration::from_secs(SNAPSHOT_INTERVAL_SECS));
        interval.tick().await;

        loop {
            interval.tick().await;

            match tasks::save_local_snapshot(&scheduler.context).await {
                Ok(count) => info!("Saved local snapshot ({} activities)", count),
                Err(e) => error!("Failed to save local snapshot: {}", e),
            }
        }
    }
}
