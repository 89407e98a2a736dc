/// Background task implementations
use crate::{context::AppContext, error::TrackerResult};

/// One heartbeat push; the orchestrator skips it while the sync gate is closed
pub async fn sync_heartbeat(ctx: &AppContext) {
    ctx.sync().heartbeat().await;
}

/// Persist the full state locally, returning the ledger length
pub async fn save_local_snapshot(ctx: &AppContext) -> TrackerResult<usize> {
    let state = ctx.state();
    ctx.local_store().save(&state).await?;
    Ok(state.progress.ledger.len())
}
