/// Metrics and telemetry for Streakforge
///
/// Provides Prometheus-compatible metrics for monitoring:
/// - Activities logged and XP awarded
/// - Sync pushes by trigger and outcome
/// - Undo/redo usage
/// - Current level and streak

use crate::{
    error::{TrackerError, TrackerResult},
    ledger::ActivityType,
    sync::SyncTrigger,
};
use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, Encoder, IntCounter,
    IntCounterVec, IntGauge, TextEncoder,
};

lazy_static! {
    // ========== Progression Metrics ==========

    /// Activities logged by activity type
    pub static ref ACTIVITIES_LOGGED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "activities_logged_total",
        "Total number of activities logged",
        &["type"]
    )
    .unwrap();

    /// XP awarded across all activities
    pub static ref XP_AWARDED_TOTAL: IntCounter = register_int_counter!(
        "xp_awarded_total",
        "Total XP awarded"
    )
    .unwrap();

    /// Current level
    pub static ref CURRENT_LEVEL: IntGauge = register_int_gauge!(
        "current_level",
        "Current progression level"
    )
    .unwrap();

    /// Current streak in days
    pub static ref CURRENT_STREAK: IntGauge = register_int_gauge!(
        "current_streak",
        "Current daily streak"
    )
    .unwrap();

    // ========== Sync Metrics ==========

    /// Sync pushes by trigger and outcome
    pub static ref SYNC_PUSHES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "sync_pushes_total",
        "Total number of sync pushes",
        &["trigger", "outcome"]
    )
    .unwrap();

    // ========== History Metrics ==========

    /// Undo/redo requests by operation and whether anything was applied
    pub static ref HISTORY_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "history_operations_total",
        "Total number of undo/redo operations",
        &["op", "applied"]
    )
    .unwrap();
}

/// Render metrics in Prometheus text format
pub fn gather() -> TrackerResult<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TrackerError::Internal(format!("Failed to encode metrics: {}", e)))?;
    String::from_utf8(buffer)
        .map_err(|e| TrackerError::Internal(format!("Metrics are not valid UTF-8: {}", e)))
}

/// Record a logged activity
pub fn record_activity(activity_type: ActivityType, xp: u64) {
    ACTIVITIES_LOGGED_TOTAL
        .with_label_values(&[activity_type.as_str()])
        .inc();
    XP_AWARDED_TOTAL.inc_by(xp);
}

/// Publish the current level and streak
pub fn set_progression(level: u32, streak: u32) {
    CURRENT_LEVEL.set(i64::from(level));
    CURRENT_STREAK.set(i64::from(streak));
}

/// Record a sync push
pub fn record_sync(trigger: SyncTrigger, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    SYNC_PUSHES_TOTAL
        .with_label_values(&[trigger.as_str(), outcome])
        .inc();
}

/// Record an undo or redo request
pub fn record_history(op: &str, applied: bool) {
    HISTORY_OPERATIONS_TOTAL
        .with_label_values(&[op, if applied { "true" } else { "false" }])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_render() {
        record_activity(ActivityType::Gym, 20);
        record_sync(SyncTrigger::Forced, true);
        set_progression(2, 3);

        let rendered = gather().unwrap();
        assert!(rendered.contains("activities_logged_total"));
        assert!(rendered.contains("sync_pushes_total"));
        assert!(rendered.contains("current_level"));
    }
}
