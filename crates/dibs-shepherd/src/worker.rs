//! Background worker for continuous shepherd operation

use crate::{Shepherd, ShepherdConfig, ShepherdError};
use dibs_domain::traits::{ClaimStore, Notifier};
use dibs_domain::Clock;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::{interval, Duration};

/// Background worker that runs the shepherd on a schedule
///
/// Runs the sweep cycle at the interval from the configuration until a stop
/// is requested through a [`StopHandle`] or a Ctrl-C arrives. A sweep
/// failure is logged and the worker waits for the next tick; claims are
/// re-evaluated next cycle regardless.
///
/// # Examples
///
/// ```no_run
/// use dibs_domain::SystemClock;
/// use dibs_shepherd::{ShepherdConfig, ShepherdWorker};
/// use dibs_store::SqliteStore;
/// # use dibs_domain::{traits::Notifier, PrincipalId};
/// # struct NoopNotifier;
/// # impl Notifier for NoopNotifier {
/// #     type Error = String;
/// #     fn notify(&self, _: PrincipalId, _: &str) -> Result<(), String> { Ok(()) }
/// # }
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = SqliteStore::new("dibs.db")?;
///     let config = ShepherdConfig::new(7, 14)?;
///     let mut worker = ShepherdWorker::new(config, SystemClock);
///
///     // Run indefinitely (until Ctrl+C)
///     worker.run(store, NoopNotifier).await?;
///     Ok(())
/// }
/// ```
pub struct ShepherdWorker<C: Clock> {
    shepherd: Shepherd<C>,
    interval: Duration,
    shutdown: Arc<Notify>,
}

/// Handle for stopping a running [`ShepherdWorker`]
///
/// A stop requested before the worker runs is remembered and takes effect
/// at the first loop iteration.
#[derive(Clone)]
pub struct StopHandle {
    inner: Arc<Notify>,
}

impl StopHandle {
    /// Request the worker to stop after the current sweep
    pub fn stop(&self) {
        self.inner.notify_one();
    }
}

impl<C: Clock + Clone> ShepherdWorker<C> {
    /// Create a new background worker with the given configuration
    pub fn new(config: ShepherdConfig, clock: C) -> Self {
        let interval = config.sweep_interval();
        Self {
            shepherd: Shepherd::new(config, clock),
            interval,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Get a handle that can stop this worker from another task
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            inner: self.shutdown.clone(),
        }
    }

    /// Get a reference to the shepherd's current metrics
    pub fn metrics(&self) -> &crate::ShepherdMetrics {
        self.shepherd.metrics()
    }

    /// Reset the shepherd's metrics counters
    pub fn reset_metrics(&mut self) {
        self.shepherd.reset_metrics();
    }

    /// Run the worker until stopped
    ///
    /// Sweeps at the configured interval until the [`StopHandle`] fires or
    /// a shutdown signal (Ctrl+C) is received.
    pub async fn run<S, N>(&mut self, mut store: S, notifier: N) -> Result<(), ShepherdError>
    where
        S: ClaimStore,
        S::Error: std::fmt::Display,
        N: Notifier,
        N::Error: std::fmt::Display,
    {
        let mut ticker = interval(self.interval);

        tracing::info!(interval = ?self.interval, "shepherd worker started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tracing::debug!("starting sweep cycle");

                    match self.shepherd.sweep(&mut store, &notifier) {
                        Ok(metrics) => {
                            tracing::info!(
                                nudges = metrics.nudges_recorded,
                                released = metrics.claims_released,
                                failures = metrics.claim_failures,
                                "sweep completed"
                            );
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "sweep failed");
                        }
                    }
                }
                _ = self.shutdown.notified() => {
                    tracing::info!("stop requested, shutting down shepherd");
                    break;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("shutdown signal received, stopping shepherd");
                    break;
                }
            }
        }

        tracing::info!("shepherd stopped, final metrics:\n{}", self.shepherd.metrics().summary());

        Ok(())
    }

    /// Run for a specific number of cycles (useful for testing)
    pub async fn run_cycles<S, N>(
        &mut self,
        mut store: S,
        notifier: N,
        cycles: usize,
    ) -> Result<(), ShepherdError>
    where
        S: ClaimStore,
        S::Error: std::fmt::Display,
        N: Notifier,
        N::Error: std::fmt::Display,
    {
        let mut ticker = interval(self.interval);

        tracing::info!(cycles, interval = ?self.interval, "shepherd worker started for bounded run");

        for cycle in 0..cycles {
            ticker.tick().await;

            tracing::debug!(cycle = cycle + 1, cycles, "starting sweep cycle");
            self.shepherd.sweep(&mut store, &notifier)?;
        }

        tracing::info!("shepherd finished {} cycles", cycles);

        Ok(())
    }
}
