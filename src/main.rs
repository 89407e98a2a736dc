/// Streakforge - progression tracker session
///
/// Loads the local snapshot, hydrates from the remote profile store and keeps
/// the session synced until interrupted.

use std::sync::Arc;
use streakforge::{jobs::JobScheduler, AppContext, HydrationOutcome, TrackerConfig};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "streakforge=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    print_banner();

    let config = TrackerConfig::from_env()?;
    info!(
        "Remote {} (debounce {}ms, heartbeat {}s, UTC{:+}min)",
        config.remote.base_url,
        config.sync.debounce_ms,
        config.sync.heartbeat_secs,
        config.progression.utc_offset_minutes
    );

    let ctx = AppContext::new(config).await?;

    match ctx.hydrate().await {
        HydrationOutcome::Hydrated { activities } => {
            info!("Session hydrated ({} activities)", activities)
        }
        HydrationOutcome::LocalOnly(reason) => warn!("Local-only session: {}", reason),
    }

    let record = ctx.progression();
    info!(
        "Level {} with {} XP ({} to next), streak {} (longest {})",
        record.level,
        record.xp,
        record.xp_to_next_level,
        ctx.live_streak(),
        record.streak.longest
    );

    let scheduler = Arc::new(JobScheduler::new(ctx.clone()));
    scheduler.start();

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    scheduler.stop();
    ctx.sync().shutdown();

    if ctx.sync().can_sync() {
        if let Err(e) = ctx.sync().force_sync().await {
            error!("Final sync failed: {}", e);
        }
    }
    ctx.save_local().await?;

    let status = ctx.sync_status();
    info!(
        "Session closed: {} pushes, {} failures, last saved {:?}",
        status.pushes, status.failures, status.last_saved
    );

    Ok(())
}

fn print_banner() {
    println!(
        r#"
   _____ __                  __   ____
  / ___// /_________  ____ _/ /__/ __/___  _________ ____
  \__ \/ __/ ___/ _ \/ __ `/ //_/ /_/ __ \/ ___/ __ `/ _ \
 ___/ / /_/ /  /  __/ /_/ / ,< / __/ /_/ / /  / /_/ /  __/
/____/\__/_/   \___/\__,_/_/|_/_/  \____/_/   \__, /\___/
                                             /____/
        Progression & Sync Engine v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
