//! Periodic status refresh.
//!
//! # States
//! ```text
//! Created → Running → Stopped (terminal)
//! ```
//!
//! # Triggers
//! - Fixed period: first tick one full period after `start`
//! - Cron: sleep until the next fire time, recomputed after every cycle
//!
//! # Refresh cycle
//! - Fetch from the source, bounded by an optional timeout
//! - Success: commit the returned status (even if unchanged)
//! - Failure: commit HARD_LOCK, whatever the previous value was
//! - On change: queue (previous, new) for the change callback
//!
//! # Design Decisions
//! - `start` runs one cycle before spawning the periodic task, so the store
//!   holds a fetched value before enforced traffic begins
//! - `stop` is cooperative: the task checks for shutdown between cycles and
//!   an in-flight fetch always runs to completion
//! - Callbacks are drained by a single consumer task, so they observe
//!   transitions in commit order without blocking the refresh loop

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::{ConfigError, RefreshSchedule};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::status::client::StatusSource;
use crate::status::store::StatusStore;
use crate::status::types::{FetchError, RemoteStatusResponse, Status};

/// Invoked with `(previous, new)` whenever a cycle commits a different status.
pub type ChangeCallback = Arc<dyn Fn(Status, Status) + Send + Sync>;

/// Lifecycle phase as reported by [`RefreshScheduler::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Created,
    Running,
    Stopped,
}

/// Lifecycle misuse.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("refresh scheduler has already been started")]
    AlreadyStarted,

    #[error("refresh scheduler has been stopped and cannot be restarted")]
    Stopped,
}

enum Phase {
    Created,
    Running(JoinHandle<()>),
    Stopped,
}

/// Keeps a [`StatusStore`] in sync with a [`StatusSource`].
pub struct RefreshScheduler<S> {
    source: Arc<S>,
    store: Arc<StatusStore>,
    schedule: RefreshSchedule,
    fetch_timeout: Option<Duration>,
    on_change: Option<ChangeCallback>,
    shutdown: Shutdown,
    phase: Mutex<Phase>,
}

impl<S: StatusSource> RefreshScheduler<S> {
    /// Create a scheduler refreshing on `schedule`. A zero period is rejected.
    pub fn new(
        source: Arc<S>,
        store: Arc<StatusStore>,
        schedule: impl Into<RefreshSchedule>,
    ) -> Result<Self, ConfigError> {
        let schedule = schedule.into();
        if schedule.period().is_some_and(|period| period.is_zero()) {
            return Err(ConfigError::InvalidSchedule("refresh interval must be greater than zero".into()));
        }

        Ok(Self {
            source,
            store,
            schedule,
            fetch_timeout: None,
            on_change: None,
            shutdown: Shutdown::new(),
            phase: Mutex::new(Phase::Created),
        })
    }

    /// Abort a fetch that takes longer than `timeout` and treat it as failed.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Register a callback fired once per committed status change.
    ///
    /// Runs on a dispatcher task; keep it short.
    pub fn on_change(mut self, callback: ChangeCallback) -> Self {
        self.on_change = Some(callback);
        self
    }

    pub fn store(&self) -> &Arc<StatusStore> {
        &self.store
    }

    pub fn schedule(&self) -> &RefreshSchedule {
        &self.schedule
    }

    /// Current lifecycle phase.
    pub async fn state(&self) -> SchedulerState {
        match *self.phase.lock().await {
            Phase::Created => SchedulerState::Created,
            Phase::Running(_) => SchedulerState::Running,
            Phase::Stopped => SchedulerState::Stopped,
        }
    }

    pub async fn is_running(&self) -> bool {
        self.state().await == SchedulerState::Running
    }

    /// Run one refresh cycle now, then keep refreshing in the background.
    ///
    /// Returns once the first cycle has committed a value.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        let mut phase = self.phase.lock().await;
        match *phase {
            Phase::Created => {}
            Phase::Running(_) => return Err(SchedulerError::AlreadyStarted),
            Phase::Stopped => return Err(SchedulerError::Stopped),
        }

        let refresher = Refresher {
            source: self.source.clone(),
            store: self.store.clone(),
            fetch_timeout: self.fetch_timeout,
            transitions: self.on_change.clone().map(spawn_dispatcher),
        };

        tracing::info!(schedule = %self.schedule, "Refresh scheduler starting");
        refresher.refresh().await;

        let shutdown = self.shutdown.subscribe();
        let schedule = self.schedule.clone();
        let task = tokio::spawn(async move {
            refresher.run(schedule, shutdown).await;
        });

        *phase = Phase::Running(task);
        Ok(())
    }

    /// Stop the background task and wait for it to exit.
    ///
    /// Safe to call repeatedly or before `start`; both are no-ops apart from
    /// leaving the scheduler in `Stopped`.
    pub async fn stop(&self) {
        let mut phase = self.phase.lock().await;
        match std::mem::replace(&mut *phase, Phase::Stopped) {
            Phase::Running(task) => {
                self.shutdown.trigger();
                if let Err(e) = task.await {
                    tracing::error!(error = %e, "Refresh task terminated abnormally");
                }
                tracing::info!("Refresh scheduler stopped");
            }
            Phase::Created => {
                tracing::debug!("Refresh scheduler stopped before it was started");
            }
            Phase::Stopped => {}
        }
    }
}

/// State moved into the background task.
struct Refresher<S> {
    source: Arc<S>,
    store: Arc<StatusStore>,
    fetch_timeout: Option<Duration>,
    transitions: Option<mpsc::UnboundedSender<(Status, Status)>>,
}

impl<S: StatusSource> Refresher<S> {
    async fn run(self, schedule: RefreshSchedule, shutdown: broadcast::Receiver<()>) {
        match schedule {
            RefreshSchedule::Every(period) => self.run_every(period, shutdown).await,
            cron => self.run_cron(&cron, shutdown).await,
        }
    }

    async fn run_every(&self, period: Duration, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Refresh task received shutdown signal, exiting loop");
                    break;
                }
                _ = ticker.tick() => {
                    self.refresh().await;
                }
            }
        }
    }

    async fn run_cron(&self, schedule: &RefreshSchedule, mut shutdown: broadcast::Receiver<()>) {
        let mut last_fire = None;
        loop {
            // A timer that wakes a hair early must not fire the same slot twice.
            let Some((fire_at, delay)) = schedule.next_fire(last_fire) else {
                tracing::warn!(schedule = %schedule, "Cron schedule has no upcoming fire times, refresh loop idle");
                let _ = shutdown.recv().await;
                break;
            };

            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Refresh task received shutdown signal, exiting loop");
                    break;
                }
                _ = time::sleep(delay) => {
                    last_fire = fire_at;
                    self.refresh().await;
                }
            }
        }
    }

    async fn fetch(&self) -> Result<RemoteStatusResponse, FetchError> {
        match self.fetch_timeout {
            Some(limit) => match time::timeout(limit, self.source.fetch()).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout(limit)),
            },
            None => self.source.fetch().await,
        }
    }

    /// One fetch-and-commit cycle. Returns the committed status.
    async fn refresh(&self) -> Status {
        let started = std::time::Instant::now();

        let (status, message) = match self.fetch().await {
            Ok(resp) => {
                metrics::record_refresh("success", started);
                (resp.status, resp.message)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Status refresh failed, failing closed to HARD_LOCK");
                metrics::record_refresh("failure", started);
                (Status::most_restrictive(), None)
            }
        };

        let previous = self.store.write_with_message(status, message);
        metrics::record_status(status);

        if previous != status {
            tracing::info!(from = %previous, to = %status, "Status changed");
            metrics::record_transition(previous, status);
            if let Some(tx) = &self.transitions {
                if tx.send((previous, status)).is_err() {
                    tracing::warn!("Change callback dispatcher is gone, dropping notification");
                }
            }
        } else {
            tracing::debug!(status = %status, "Status unchanged");
        }

        status
    }
}

fn spawn_dispatcher(callback: ChangeCallback) -> mpsc::UnboundedSender<(Status, Status)> {
    let (tx, mut rx) = mpsc::unbounded_channel::<(Status, Status)>();
    tokio::spawn(async move {
        while let Some((previous, current)) = rx.recv().await {
            callback(previous, current);
        }
    });
    tx
}
