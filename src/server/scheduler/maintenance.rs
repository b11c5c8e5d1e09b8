use chrono::{DateTime, Utc};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::server::{
    error::AppError,
    service::{
        check_in::CheckInService, magic_link::MagicLinkService, reminder::ReminderService,
    },
    state::AppState,
};

/// Starts the maintenance scheduler
///
/// This scheduler runs every minute and:
/// - Sends reminders for tasks whose `reminder_at` has passed
/// - Closes check-in sessions without a recent heartbeat
/// - Purges expired or consumed magic links
///
/// # Arguments
/// - `state`: Shared application state; the job uses its database, realtime hub,
///   delivery service and configuration
pub async fn start_scheduler(state: AppState) -> Result<(), AppError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async("0 * * * * *", move |_uuid, _lock| {
        let state = state.clone();

        Box::pin(async move {
            run_maintenance(&state, Utc::now()).await;
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    tracing::info!("Maintenance scheduler started");

    Ok(())
}

/// Runs one maintenance pass. Each step logs its own failure and the others still run.
pub async fn run_maintenance(state: &AppState, now: DateTime<Utc>) {
    match ReminderService::new(&state.db, &state.realtime, &state.delivery)
        .send_due(now)
        .await
    {
        Ok(0) => {}
        Ok(sent) => tracing::info!(sent, "Sent task reminders"),
        Err(e) => tracing::error!("Error sending task reminders: {}", e),
    }

    match CheckInService::new(&state.db, &state.realtime)
        .close_stale(now, state.config.check_in_stale_after)
        .await
    {
        Ok(0) => {}
        Ok(closed) => tracing::info!(closed, "Closed stale check-in sessions"),
        Err(e) => tracing::error!("Error closing stale check-ins: {}", e),
    }

    match MagicLinkService::new(&state.db, &state.delivery, &state.config)
        .purge()
        .await
    {
        Ok(0) => {}
        Ok(purged) => tracing::debug!(purged, "Purged magic links"),
        Err(e) => tracing::error!("Error purging magic links: {}", e),
    }
}
