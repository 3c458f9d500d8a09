use std::sync::atomic::{ AtomicU64, Ordering };
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{ watch, Mutex };

use crate::db::{ AssetSnapshotRepository, ReconcileSummary };
use crate::error::{ AppError, Result };
use crate::providers::MarketDataProvider;

/// Where the refresh cycle currently is. `Idle` between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RefreshPhase {
    Idle,
    Fetching,
    Reconciling,
}

/// Outcome of one successful refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    pub fetched: usize,
    pub inserted: usize,
    pub updated: usize,
}

#[derive(Default)]
struct Flight {
    last: Option<std::result::Result<RefreshSummary, String>>,
}

/// Runs refresh cycles (fetch upstream, reconcile into storage).
///
/// Cycles are single-flight: a caller arriving while a cycle is in progress
/// waits for it and receives that cycle's outcome instead of starting its own.
pub struct RefreshService {
    provider: Arc<dyn MarketDataProvider>,
    repository: AssetSnapshotRepository,
    asset_ids: Vec<String>,
    flight: Mutex<Flight>,
    completed: AtomicU64,
    phase: watch::Sender<RefreshPhase>,
}

/// Puts the phase back to `Idle` on every exit path of a cycle.
struct PhaseGuard<'a>(&'a watch::Sender<RefreshPhase>);

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.0.send_replace(RefreshPhase::Idle);
    }
}

impl RefreshService {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        repository: AssetSnapshotRepository,
        asset_ids: Vec<String>
    ) -> Self {
        let (phase, _) = watch::channel(RefreshPhase::Idle);

        Self {
            provider,
            repository,
            asset_ids,
            flight: Mutex::new(Flight::default()),
            completed: AtomicU64::new(0),
            phase,
        }
    }

    pub(crate) fn phase(&self) -> RefreshPhase {
        *self.phase.borrow()
    }

    pub(crate) fn subscribe_phase(&self) -> watch::Receiver<RefreshPhase> {
        self.phase.subscribe()
    }

    /// Run one refresh cycle, or join the one already in flight.
    pub async fn refresh(&self) -> Result<RefreshSummary> {
        let observed = self.completed.load(Ordering::Acquire);
        let mut flight = self.flight.lock().await;

        if self.completed.load(Ordering::Acquire) != observed {
            if let Some(outcome) = flight.last.clone() {
                tracing::debug!("joined an in-flight refresh cycle");
                return outcome.map_err(|e| {
                    AppError::Internal(format!("Concurrent refresh cycle failed: {}", e))
                });
            }
        }

        let outcome = self.run_cycle().await;

        flight.last = Some(match &outcome {
            Ok(summary) => Ok(*summary),
            Err(e) => Err(e.to_string()),
        });
        self.completed.fetch_add(1, Ordering::Release);

        outcome
    }

    async fn run_cycle(&self) -> Result<RefreshSummary> {
        let _idle = PhaseGuard(&self.phase);

        self.phase.send_replace(RefreshPhase::Fetching);
        let records = self.provider.fetch_markets(&self.asset_ids).await?;
        if records.is_empty() {
            return Err(AppError::Fetch("No market data returned".to_string()));
        }

        self.phase.send_replace(RefreshPhase::Reconciling);
        let ReconcileSummary { inserted, updated } = self.repository.reconcile(&records).await?;

        tracing::info!(fetched = records.len(), inserted, updated, "refresh cycle completed");

        Ok(RefreshSummary {
            fetched: records.len(),
            inserted,
            updated,
        })
    }
}
