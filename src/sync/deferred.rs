/// Single-slot deferred task ("cancel pending, schedule new")
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::warn;

/// Holds at most one pending timer
///
/// Scheduling replaces (and aborts) a timer that has not fired yet. Once a
/// timer fires its work is detached onto its own task, so a later schedule
/// or cancel never interrupts work already in flight.
#[derive(Default)]
pub struct DeferredTask {
    slot: Mutex<Option<JoinHandle<()>>>,
}

impl DeferredTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `work` after `delay`, replacing any pending timer
    ///
    /// Returns false when called outside a tokio runtime.
    pub fn schedule<F>(&self, delay: Duration, work: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Ok(handle) = Handle::try_current() else {
            warn!("No async runtime available; deferred task dropped");
            return false;
        };

        let runtime = handle.clone();
        let timer = handle.spawn(async move {
            tokio::time::sleep(delay).await;
            runtime.spawn(work);
        });

        let previous = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(timer);
        if let Some(previous) = previous {
            previous.abort();
        }

        true
    }

    /// Drop the pending timer, if any
    pub fn cancel(&self) -> bool {
        let previous = self.slot.lock().unwrap_or_else(PoisonError::into_inner).take();
        match previous {
            Some(timer) if !timer.is_finished() => {
                timer.abort();
                true
            }
            _ => false,
        }
    }

    /// Whether a timer is waiting to fire
    pub fn is_pending(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[tokio::test(start_paused = true)]
    async fn test_only_last_schedule_fires() {
        let task = DeferredTask::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(AtomicUsize::new(0));

        for i in 1..=5 {
            let fired = Arc::clone(&fired);
            let last = Arc::clone(&last);
            task.schedule(Duration::from_secs(2), async move {
                fired.fetch_add(1, Ordering::SeqCst);
                last.store(i, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(500)).await;
        }

        assert!(task.is_pending());
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(last.load(Ordering::SeqCst), 5);
        assert!(!task.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_firing() {
        let task = DeferredTask::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        task.schedule(Duration::from_secs(1), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(task.cancel());
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(!task.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fired_work_survives_reschedule() {
        let task = DeferredTask::new();
        let finished = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&finished);
        task.schedule(Duration::from_secs(1), async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            counter.fetch_add(1, Ordering::SeqCst);
        });

        // Timer fires at 1s; the work is now in flight
        tokio::time::sleep(Duration::from_secs(2)).await;
        task.schedule(Duration::from_secs(60), async {});
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_schedule_without_runtime() {
        let task = DeferredTask::new();
        assert!(!task.schedule(Duration::from_secs(1), async {}));
        assert!(!task.is_pending());
    }
}
