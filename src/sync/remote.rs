/// Remote profile store
///
/// The remote store holds one profile document per account. Pushes replace
/// the document field by field (no server-side merge of collections), so the
/// client is the sole arbiter of truth between syncs.
use crate::{
    config::RemoteConfig,
    error::{TrackerError, TrackerResult},
    sync::envelope::{RemoteProfile, SyncEnvelope},
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, PoisonError,
};
use std::time::Duration;
use tracing::{debug, info};

/// Boundary contract with the remote persistence service
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Load the authoritative profile
    async fn fetch_profile(&self, token: &str) -> TrackerResult<RemoteProfile>;

    /// Transmit a full envelope
    async fn push_profile(&self, token: &str, envelope: &SyncEnvelope) -> TrackerResult<()>;
}

/// HTTP implementation backed by `reqwest`
#[derive(Clone)]
pub struct HttpRemoteStore {
    base_url: String,
    http_client: Client,
}

impl HttpRemoteStore {
    /// Create a new HTTP remote store
    pub fn new(config: &RemoteConfig) -> TrackerResult<Self> {
        let http_client = Client::builder()
            .user_agent(concat!("streakforge/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| TrackerError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    fn profile_url(&self) -> String {
        format!("{}/api/user/profile", self.base_url)
    }

    fn sync_url(&self) -> String {
        format!("{}/api/user/sync", self.base_url)
    }

    async fn error_for(response: reqwest::Response) -> TrackerError {
        let status = response.status();
        let message = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED => TrackerError::Unauthenticated,
            _ => TrackerError::RemoteStatus {
                status: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn fetch_profile(&self, token: &str) -> TrackerResult<RemoteProfile> {
        info!("Fetching profile from {}", self.base_url);

        let response = self
            .http_client
            .get(self.profile_url())
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        let profile: RemoteProfile = response
            .json()
            .await
            .map_err(|e| TrackerError::Remote(format!("Invalid profile document: {}", e)))?;

        Ok(profile)
    }

    async fn push_profile(&self, token: &str, envelope: &SyncEnvelope) -> TrackerResult<()> {
        debug!("Pushing envelope to {}", self.sync_url());

        let response = self
            .http_client
            .put(self.sync_url())
            .bearer_auth(token)
            .json(envelope)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        Ok(())
    }
}

/// In-process remote store
///
/// Keeps the profile document in memory and records every push. Used for
/// offline runs and as the stand-in remote in tests.
#[derive(Default)]
pub struct MemoryRemoteStore {
    profile: Mutex<SyncEnvelope>,
    pushes: Mutex<Vec<SyncEnvelope>>,
    fail_fetch: AtomicBool,
    fail_push: AtomicBool,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing server-side profile
    pub fn with_profile(profile: RemoteProfile) -> Self {
        Self {
            profile: Mutex::new(profile),
            ..Default::default()
        }
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_push(&self, fail: bool) {
        self.fail_push.store(fail, Ordering::SeqCst);
    }

    /// Every successfully received envelope, in arrival order
    pub fn pushes(&self) -> Vec<SyncEnvelope> {
        self.pushes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn push_count(&self) -> usize {
        self.pushes.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Current server-side document
    pub fn profile(&self) -> SyncEnvelope {
        self.profile
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn fetch_profile(&self, token: &str) -> TrackerResult<RemoteProfile> {
        if token.is_empty() {
            return Err(TrackerError::Unauthenticated);
        }
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(TrackerError::Remote("profile fetch unavailable".to_string()));
        }
        Ok(self.profile())
    }

    async fn push_profile(&self, token: &str, envelope: &SyncEnvelope) -> TrackerResult<()> {
        if token.is_empty() {
            return Err(TrackerError::Unauthenticated);
        }
        if self.fail_push.load(Ordering::SeqCst) {
            return Err(TrackerError::Remote("push rejected".to_string()));
        }

        envelope
            .clone()
            .merge_into(&mut self.profile.lock().unwrap_or_else(PoisonError::into_inner));
        self.pushes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(envelope.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_http_store_urls() {
        let config = RemoteConfig {
            base_url: "https://tracker.example.com/".to_string(),
            request_timeout_secs: 5,
            auth_token: None,
        };
        let store = HttpRemoteStore::new(&config).unwrap();
        assert_eq!(store.profile_url(), "https://tracker.example.com/api/user/profile");
        assert_eq!(store.sync_url(), "https://tracker.example.com/api/user/sync");
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryRemoteStore::new();
        let envelope = SyncEnvelope {
            xp: Some(75),
            ..Default::default()
        };

        assert_ok!(store.push_profile("token", &envelope).await);
        assert_eq!(store.push_count(), 1);

        let profile = store.fetch_profile("token").await.unwrap();
        assert_eq!(profile.xp, Some(75));
    }

    #[tokio::test]
    async fn test_memory_store_failures() {
        let store = MemoryRemoteStore::new();
        store.set_fail_push(true);
        assert_err!(store.push_profile("token", &SyncEnvelope::default()).await);
        assert_eq!(store.push_count(), 0);

        store.set_fail_fetch(true);
        assert_err!(store.fetch_profile("token").await);
        assert!(matches!(
            store.fetch_profile("").await,
            Err(TrackerError::Unauthenticated)
        ));
    }
}
