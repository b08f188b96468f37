//! Periodic background jobs.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use inkwell_common::AppResult;
use tokio::{task::JoinHandle, time::interval};

use super::activity::{ActivityService, SweepReport};

/// Shortest period the sweep loop accepts.
const MIN_PERIOD: Duration = Duration::from_secs(1);

/// A job that reclassifies user activity.
#[async_trait::async_trait]
pub trait ActivitySweep: Send + Sync {
    async fn sweep(&self, now: DateTime<Utc>) -> AppResult<SweepReport>;
}

#[async_trait::async_trait]
impl ActivitySweep for ActivityService {
    async fn sweep(&self, now: DateTime<Utc>) -> AppResult<SweepReport> {
        Self::sweep(self, now).await
    }
}

/// Spawn the activity sweep loop. The first run happens immediately.
///
/// Periods shorter than one second are raised to one second.
pub fn run_activity_sweep<S: ActivitySweep + 'static>(
    job: Arc<S>,
    period: Duration,
) -> JoinHandle<()> {
    let period = period.max(MIN_PERIOD);
    tokio::spawn(async move {
        let mut interval = interval(period);
        loop {
            interval.tick().await;
            match job.sweep(Utc::now()).await {
                Ok(report) => {
                    tracing::info!(
                        scanned = report.scanned,
                        changed = report.changed,
                        unchanged = report.unchanged,
                        failed = report.failed,
                        "Activity sweep finished"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "Activity sweep failed");
                }
            }
        }
    })
}
