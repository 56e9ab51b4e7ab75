//! Periodic background sync.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::Error;
use crate::services::QuoteService;

use super::merge::SyncReport;

const MIN_SYNC_INTERVAL: Duration = Duration::from_millis(100);

/// Handle to a running periodic sync task.
///
/// The first sync runs immediately. A sync that outlives its interval delays
/// the next tick instead of stacking up; failures are logged and retried on
/// the next tick.
pub struct SyncScheduler {
    shutdown: watch::Sender<bool>,
    reports: watch::Receiver<Option<SyncReport>>,
    handle: JoinHandle<()>,
}

impl SyncScheduler {
    /// Spawn the sync loop on the current tokio runtime.
    pub fn start(service: QuoteService, interval: Duration) -> Self {
        let interval = interval.max(MIN_SYNC_INTERVAL);
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let (report_tx, reports) = watch::channel(None);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!("Background sync started (every {:?})", interval);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Some(report) = run_tick(&service).await {
                            report_tx.send_replace(Some(report));
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            tracing::info!("Background sync stopped");
        });

        Self {
            shutdown,
            reports,
            handle,
        }
    }

    /// Receiver that observes the report of each successful sync.
    pub fn reports(&self) -> watch::Receiver<Option<SyncReport>> {
        self.reports.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Signal the loop to stop and wait for it. An in-progress sync finishes first.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(error) = self.handle.await {
            tracing::warn!("Background sync task ended abnormally: {error}");
        }
    }
}

async fn run_tick(service: &QuoteService) -> Option<SyncReport> {
    match service.sync_with_remote().await {
        Ok(report) => Some(report),
        Err(Error::SyncInProgress) => {
            tracing::debug!("Skipping tick; previous sync still running");
            None
        }
        Err(error) if error.is_transient() => {
            tracing::warn!("Sync failed, will retry next tick: {error}");
            None
        }
        Err(error) => {
            tracing::error!("Sync failed: {error}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::MemoryKeyValueStore;
    use crate::services::test_support::{FailingSource, FixedSource};
    use crate::store::QuoteStore;
    use crate::sync::RemoteQuote;

    fn service(remote: Arc<dyn crate::sync::RemoteQuoteSource>) -> QuoteService {
        let store = QuoteStore::with_quotes(MemoryKeyValueStore::new(), Vec::new()).unwrap();
        QuoteService::new(store, remote)
    }

    #[tokio::test(start_paused = true)]
    async fn syncs_immediately_and_on_every_tick() {
        let source = Arc::new(FixedSource::new(vec![RemoteQuote::new(
            Some(1),
            "from server",
            "Server",
        )]));
        let service = service(source.clone());

        let scheduler = SyncScheduler::start(service.clone(), Duration::from_secs(15));
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(scheduler.is_running());
        scheduler.stop().await;

        assert_eq!(source.fetches(), 3);
        assert_eq!(service.list_quotes().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_do_not_stop_the_loop() {
        let source = Arc::new(FailingSource::default());
        let scheduler = SyncScheduler::start(service(source.clone()), Duration::from_secs(15));

        tokio::time::sleep(Duration::from_secs(46)).await;
        assert!(scheduler.is_running());
        scheduler.stop().await;

        assert_eq!(source.fetches(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn publishes_reports() {
        let source = Arc::new(FixedSource::new(vec![RemoteQuote::new(
            Some(7),
            "seven",
            "Server",
        )]));
        let scheduler = SyncScheduler::start(service(source), Duration::from_secs(15));
        let mut reports = scheduler.reports();

        reports.changed().await.unwrap();
        let report = reports.borrow().clone().unwrap();
        assert_eq!(report.added, 1);

        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_the_task() {
        let source = Arc::new(FixedSource::default());
        let scheduler = SyncScheduler::start(service(source.clone()), Duration::from_secs(15));

        scheduler.stop().await;
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert!(source.fetches() <= 1);
    }
}
