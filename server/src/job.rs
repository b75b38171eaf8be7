use time::OffsetDateTime;
use tokio::time::MissedTickBehavior;

use application::service::CompleteBookingsService;
use application::transfer::CompleteBookingsDto;

use crate::handler::AppModule;

/// Periodically moves approved bookings whose rental period has ended to
/// `completed`. Failures are logged and retried on the next tick.
#[tracing::instrument(skip_all)]
pub async fn completion_sweep(module: AppModule) {
    let interval = *module.sweep().interval();
    tracing::info!("completion sweep every {}s", interval.as_secs());
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let today = OffsetDateTime::now_utc().date();
        if let Err(report) = module
            .complete_finished_bookings(CompleteBookingsDto { today })
            .await
        {
            tracing::error!("completion sweep failed: {report:?}");
        }
    }
}
