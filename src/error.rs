/// Unified error types for Streakforge
use thiserror::Error;

/// Main error type for the progression engine
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Validation errors (rejected before any state change)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// No bearer credential available for a remote call
    #[error("Not authenticated")]
    Unauthenticated,

    /// Sync refused because the session is not ready to push
    #[error("Sync unavailable: {0}")]
    SyncUnavailable(String),

    /// Remote store errors
    #[error("Remote store error: {0}")]
    Remote(String),

    /// Remote store answered with a non-success status
    #[error("Remote store returned {status}: {message}")]
    RemoteStatus { status: u16, message: String },

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON encoding/decoding errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TrackerError {
    /// Whether a later attempt with fresher state may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TrackerError::Remote(_)
                | TrackerError::Http(_)
                | TrackerError::RemoteStatus { status: 500..=599, .. }
        )
    }
}

impl From<validator::ValidationErrors> for TrackerError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .iter()
            .map(|(field, errs)| {
                let codes: Vec<&str> = errs.iter().map(|e| e.code.as_ref()).collect();
                format!("{} ({})", field, codes.join(", "))
            })
            .collect();
        fields.sort();
        TrackerError::Validation(format!("invalid fields: {}", fields.join("; ")))
    }
}

/// Result type alias for engine operations
pub type TrackerResult<T> = Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(TrackerError::Remote("timeout".to_string()).is_transient());
        assert!(TrackerError::RemoteStatus {
            status: 503,
            message: "unavailable".to_string()
        }
        .is_transient());
        assert!(!TrackerError::RemoteStatus {
            status: 401,
            message: "expired".to_string()
        }
        .is_transient());
        assert!(!TrackerError::Validation("bad".to_string()).is_transient());
    }
}
