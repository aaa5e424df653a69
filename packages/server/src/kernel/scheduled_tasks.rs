//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! The expiry policy is lazy at read time; this sweep is the active half:
//! it flips truly lapsed `held` rows to `cancelled` so ambiguous rows do
//! not accumulate and the live-claim index stays truthful.

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::kernel::{BaseReservationStore, ServerDeps};

/// Start all scheduled tasks
pub async fn start_scheduler(deps: ServerDeps) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    // Expired-hold sweep - runs every five minutes
    let sweep_deps = deps.clone();
    let sweep_job = Job::new_async("0 */5 * * * *", move |_uuid, _lock| {
        let deps = sweep_deps.clone();
        Box::pin(async move {
            if let Err(e) = run_expiry_sweep(&deps).await {
                tracing::error!("Expiry sweep failed: {}", e);
            }
        })
    })?;

    scheduler.add(sweep_job).await?;
    scheduler.start().await?;

    tracing::info!("Scheduled tasks started (expired-hold sweep every 5 minutes)");
    Ok(scheduler)
}

/// Cancel every hold whose expiry has passed.
async fn run_expiry_sweep(deps: &ServerDeps) -> Result<()> {
    let released = deps.reservations.sweep_expired().await?;
    if released > 0 {
        tracing::info!("Expiry sweep released {} lapsed holds", released);
    }
    Ok(())
}
