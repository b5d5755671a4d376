//! Refresh trigger - Drives dashboard refreshes on a fixed cadence
//!
//! On the environment-ready signal it runs one tick immediately, then one tick
//! per interval until cancelled. Each tick emits a trace line and hands off to
//! the watched-data loader, if one was supplied.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::time::{self, Instant, Interval};
use tokio_util::sync::CancellationToken;

use super::base::{Agent, AgentError, AgentStatus};
use super::handle::RefreshHandle;
use crate::loader::WatchedDataLoader;

/// Cadence of timer-driven ticks
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for the refresh trigger
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Interval between timer-driven ticks
    pub interval: Duration,
    /// Whether to tick immediately on the environment-ready signal
    pub fetch_on_start: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REFRESH_INTERVAL,
            fetch_on_start: true,
        }
    }
}

impl RefreshConfig {
    /// Creates a config with a custom interval in seconds
    pub fn with_interval_seconds(seconds: u64) -> Self {
        Self {
            interval: Duration::from_secs(seconds),
            fetch_on_start: true,
        }
    }
}

/// Agent that periodically asks the watched-data loader to refresh
pub struct RefreshTrigger {
    config: RefreshConfig,
    loader: Option<Arc<dyn WatchedDataLoader>>,
    status: RwLock<AgentStatus>,
    cancel_token: CancellationToken,
    ticks: AtomicU64,
    last_tick_at: Mutex<Option<DateTime<Utc>>>,
}

impl RefreshTrigger {
    /// Creates a trigger with the default 30 second cadence
    pub fn new(loader: Option<Arc<dyn WatchedDataLoader>>) -> Self {
        Self::with_config(RefreshConfig::default(), loader)
    }

    /// Creates a trigger with custom configuration
    pub fn with_config(config: RefreshConfig, loader: Option<Arc<dyn WatchedDataLoader>>) -> Self {
        Self {
            config,
            loader,
            status: RwLock::new(AgentStatus::Idle),
            cancel_token: CancellationToken::new(),
            ticks: AtomicU64::new(0),
            last_tick_at: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    /// Returns true if a watched-data loader was supplied
    pub fn has_loader(&self) -> bool {
        self.loader.is_some()
    }

    /// Number of ticks run so far, including manual triggers
    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    /// Wall-clock time of the most recent tick
    pub fn last_tick_at(&self) -> Option<DateTime<Utc>> {
        self.last_tick_at.lock().ok().and_then(|last| *last)
    }

    /// Runs one refresh
    ///
    /// Never fails. A panicking loader is logged and the timer keeps going;
    /// anything else the loader does with the call is its own business.
    pub fn tick(&self) {
        tracing::info!("Updating dashboard data...");

        self.ticks.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_tick_at.lock() {
            *last = Some(Utc::now());
        }

        if let Some(ref loader) = self.loader {
            let result = panic::catch_unwind(AssertUnwindSafe(|| loader.load_watched_coins()));
            if result.is_err() {
                tracing::warn!("Watched-data loader panicked, next refresh is still scheduled");
            }
        }
    }

    /// Handles the environment-ready signal
    ///
    /// Ticks once before returning, then polls on a spawned task. The returned
    /// handle owns the timer: stopping or dropping it ends the polling.
    pub async fn spawn(self: &Arc<Self>) -> Result<RefreshHandle, AgentError> {
        let interval = self.activate()?;

        let trigger = Arc::clone(self);
        let task = tokio::spawn(async move {
            trigger.poll(interval).await;
        });

        Ok(RefreshHandle::new(
            Arc::clone(self),
            self.cancel_token.clone(),
            task,
        ))
    }

    /// Moves Idle -> Running and runs the immediate tick
    fn activate(&self) -> Result<Interval, AgentError> {
        if self.config.interval.is_zero() {
            return Err(AgentError::Internal(
                "refresh interval must be greater than zero".to_string(),
            ));
        }

        {
            let mut status = self.status.write().unwrap_or_else(PoisonError::into_inner);
            match *status {
                AgentStatus::Running => return Err(AgentError::AlreadyRunning),
                AgentStatus::Stopped => return Err(AgentError::Cancelled),
                AgentStatus::Idle => {}
            }
            *status = AgentStatus::Running;
        }

        tracing::info!(
            interval_ms = self.config.interval.as_millis() as u64,
            loader = self.has_loader(),
            "Refresh trigger active"
        );

        // Cadence is anchored at readiness, not at the end of the first tick
        let interval = time::interval_at(
            Instant::now() + self.config.interval,
            self.config.interval,
        );

        if self.config.fetch_on_start {
            self.tick();
        }

        Ok(interval)
    }

    async fn poll(&self, mut interval: Interval) {
        loop {
            tokio::select! {
                biased;
                _ = self.cancel_token.cancelled() => {
                    tracing::info!("Refresh trigger cancelled");
                    break;
                }
                _ = interval.tick() => {
                    self.tick();
                }
            }
        }

        self.set_status(AgentStatus::Stopped);
    }

    fn set_status(&self, status: AgentStatus) {
        *self.status.write().unwrap_or_else(PoisonError::into_inner) = status;
    }
}

impl Default for RefreshTrigger {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl Agent for RefreshTrigger {
    fn id(&self) -> &'static str {
        "refresh"
    }

    fn name(&self) -> &'static str {
        "Dashboard Refresh Trigger"
    }

    fn status(&self) -> AgentStatus {
        // Writers never hold the lock across an await, so this only blocks briefly
        self.status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn start(&self) -> Result<(), AgentError> {
        let interval = self.activate()?;
        self.poll(interval).await;
        Ok(())
    }

    async fn stop(&self) -> Result<(), AgentError> {
        if !self.status().is_running() {
            return Ok(()); // Never started, or already stopped
        }

        self.cancel_token.cancel();
        self.set_status(AgentStatus::Stopped);
        Ok(())
    }

    async fn trigger(&self) -> Result<(), AgentError> {
        self.tick();
        Ok(())
    }
}
