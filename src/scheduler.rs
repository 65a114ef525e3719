use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::UpdateError;
use crate::feed::FeedClient;
use crate::processor::normalizer;
use crate::store::{SaveSummary, WarningStore};

const INITIAL_BACKOFF: Duration = Duration::from_secs(60);
const MAX_BACKOFF: Duration = Duration::from_secs(300);

/// Drives the periodic fetch -> normalize -> save cycle.
///
/// One instance runs as a background task; [`run_once`] is also called
/// directly by the manual-trigger endpoint, which gets the failure back
/// instead of the loop's backoff handling.
///
/// [`run_once`]: WarningUpdater::run_once
pub struct WarningUpdater {
    feed: FeedClient,
    store: WarningStore,
    interval: Duration,
}

impl WarningUpdater {
    pub fn new(feed: FeedClient, store: WarningStore, interval: Duration) -> Self {
        Self {
            feed,
            store,
            interval,
        }
    }

    /// One fetch+save cycle. `None` means the feed produced nothing to
    /// save (empty batch, or every record dropped).
    pub async fn run_once(&self) -> Result<Option<SaveSummary>, UpdateError> {
        let batch = self.feed.fetch().await?;
        let warnings = normalizer::normalize_batch(&batch);
        let summary = self.store.save_warnings(&warnings).await?;
        Ok(summary)
    }

    /// Run until `cancel` fires. Cancellation takes effect between cycles,
    /// never during an in-flight fetch or save.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Warning updater started"
        );
        let mut backoff = INITIAL_BACKOFF;
        loop {
            let started = Instant::now();
            let sleep = match self.run_once().await {
                Ok(_) => {
                    backoff = INITIAL_BACKOFF;
                    // Hold the cadence: subtract processing time, floor at zero.
                    self.interval.saturating_sub(started.elapsed())
                }
                Err(e) => {
                    error!(
                        error = %e,
                        retry_secs = backoff.as_secs(),
                        "Update cycle failed, backing off"
                    );
                    let delay = backoff;
                    backoff = next_backoff(backoff);
                    delay
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Warning updater stopping");
                    return;
                }
                _ = tokio::time::sleep(sleep) => {}
            }
        }
    }
}

fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(MAX_BACKOFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let mut backoff = INITIAL_BACKOFF;
        let mut slept = Vec::new();
        for _ in 0..5 {
            slept.push(backoff.as_secs());
            backoff = next_backoff(backoff);
        }
        assert_eq!(slept, vec![60, 120, 240, 300, 300]);
    }
}
