/// Configuration management for Streakforge
use crate::error::{TrackerError, TrackerResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Main engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub remote: RemoteConfig,
    pub sync: SyncConfig,
    pub progression: ProgressionConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Remote profile store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the profile API (e.g., https://tracker.example.com)
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// Bearer credential issued by the auth collaborator
    pub auth_token: Option<String>,
}

/// Sync timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub debounce_ms: u64,
    pub heartbeat_secs: u64,
}

/// Progression configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// Fixed UTC offset, in minutes, used for every civil-date boundary
    pub utc_offset_minutes: i32,
    pub history_limit: usize,
}

/// Local storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub snapshot_path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl SyncConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn heartbeat(&self) -> Duration {
        Duration::from_secs(self.heartbeat_secs)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 2000,
            heartbeat_secs: 60,
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        let data_directory = PathBuf::from("./data");
        Self {
            remote: RemoteConfig {
                base_url: "http://localhost:5000".to_string(),
                request_timeout_secs: 10,
                auth_token: None,
            },
            sync: SyncConfig::default(),
            progression: ProgressionConfig {
                utc_offset_minutes: 330,
                history_limit: 50,
            },
            storage: StorageConfig {
                snapshot_path: data_directory.join("state.json"),
                data_directory,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl TrackerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> TrackerResult<Self> {
        dotenv::dotenv().ok();

        let base_url = env::var("TRACKER_REMOTE_URL")
            .unwrap_or_else(|_| "http://localhost:5000".to_string())
            .trim_end_matches('/')
            .to_string();
        let request_timeout_secs = env::var("TRACKER_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);
        let auth_token = env::var("TRACKER_AUTH_TOKEN")
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let debounce_ms = env::var("TRACKER_SYNC_DEBOUNCE_MS")
            .unwrap_or_else(|_| "2000".to_string())
            .parse()
            .map_err(|_| TrackerError::Config("Invalid sync debounce".to_string()))?;
        let heartbeat_secs = env::var("TRACKER_SYNC_HEARTBEAT_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .map_err(|_| TrackerError::Config("Invalid sync heartbeat".to_string()))?;

        let utc_offset_minutes = env::var("TRACKER_UTC_OFFSET_MINUTES")
            .unwrap_or_else(|_| "330".to_string())
            .parse()
            .map_err(|_| TrackerError::Config("Invalid UTC offset".to_string()))?;
        let history_limit = env::var("TRACKER_HISTORY_LIMIT")
            .unwrap_or_else(|_| "50".to_string())
            .parse()
            .unwrap_or(50);

        let data_directory: PathBuf = env::var("TRACKER_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let snapshot_path = env::var("TRACKER_SNAPSHOT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("state.json"));

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let config = TrackerConfig {
            remote: RemoteConfig {
                base_url,
                request_timeout_secs,
                auth_token,
            },
            sync: SyncConfig {
                debounce_ms,
                heartbeat_secs,
            },
            progression: ProgressionConfig {
                utc_offset_minutes,
                history_limit,
            },
            storage: StorageConfig {
                data_directory,
                snapshot_path,
            },
            logging: LoggingConfig { level: log_level },
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> TrackerResult<()> {
        if self.remote.base_url.is_empty() {
            return Err(TrackerError::Config("Remote URL cannot be empty".to_string()));
        }

        if self.sync.debounce_ms == 0 {
            return Err(TrackerError::Config(
                "Sync debounce must be greater than zero".to_string(),
            ));
        }

        if self.sync.heartbeat_secs == 0 {
            return Err(TrackerError::Config(
                "Sync heartbeat must be greater than zero".to_string(),
            ));
        }

        if self.progression.history_limit == 0 {
            return Err(TrackerError::Config(
                "History limit must be greater than zero".to_string(),
            ));
        }

        // chrono::FixedOffset accepts strictly less than a day; civil zones stop at +/-14h
        if self.progression.utc_offset_minutes.abs() > 14 * 60 {
            return Err(TrackerError::Config(format!(
                "UTC offset {} minutes is out of range",
                self.progression.utc_offset_minutes
            )));
        }

        Ok(())
    }
}
