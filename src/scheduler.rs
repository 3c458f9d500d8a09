use crate::services::RefreshService;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{ interval_at, Duration, Instant, MissedTickBehavior };
use tokio_util::sync::CancellationToken;

/// Periodic refresh trigger owned by the application.
///
/// Cycles run one after another on the scheduler task, so a slow cycle never
/// overlaps the next tick; ticks missed meanwhile are skipped. Shutdown is
/// only observed between cycles.
pub struct RefreshScheduler {
    refresh_service: Arc<RefreshService>,
    period: Duration,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    pub fn new(refresh_service: Arc<RefreshService>, period: Duration) -> Self {
        Self {
            refresh_service,
            period,
            cancel: CancellationToken::new(),
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Spawn the timer task. The first cycle fires one period from now.
    /// A scheduler that was shut down can be started again.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }

        self.cancel = CancellationToken::new();

        let refresh_service = self.refresh_service.clone();
        let period = self.period;
        let cancel = self.cancel.clone();

        self.handle = Some(
            tokio::spawn(async move {
                let mut ticker = interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

                tracing::info!(period_secs = period.as_secs(), "refresh scheduler started");

                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = ticker.tick() => {}
                    }

                    match refresh_service.refresh().await {
                        Ok(summary) => {
                            tracing::debug!(?summary, "scheduled refresh finished");
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "scheduled refresh failed, skipping cycle");
                        }
                    }
                }

                tracing::info!("refresh scheduler stopped");
            })
        );
    }

    /// Stop the timer and wait for an in-progress cycle to finish.
    pub async fn shutdown(&mut self) {
        self.cancel.cancel();

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "refresh scheduler task panicked");
            }
        }
    }
}
