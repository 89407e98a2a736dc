/// Local snapshot store
use crate::{error::TrackerResult, state::AppState};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Persists the full application state as one JSON file
///
/// Writes go to a sibling temp file that is then renamed over the
/// snapshot, so a crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "state.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Load the saved state; a missing snapshot is an empty state
    pub async fn load(&self) -> TrackerResult<AppState> {
        match fs::read(&self.path).await {
            Ok(bytes) => {
                let state: AppState = serde_json::from_slice(&bytes)?;
                debug!(
                    "Loaded local snapshot from {} ({} activities)",
                    self.path.display(),
                    state.progress.ledger.len()
                );
                Ok(state)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No local snapshot at {}", self.path.display());
                Ok(AppState::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save(&self, state: &AppState) -> TrackerResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(state)?;
        let temp = self.temp_path();
        fs::write(&temp, bytes).await?;
        fs::rename(&temp, &self.path).await?;

        debug!("Saved local snapshot to {}", self.path.display());
        Ok(())
    }
}
