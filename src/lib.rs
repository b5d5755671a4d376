//! Coinwatch - Keeps the coin-watching dashboard fresh
//!
//! Once the hosting shell reports that it is ready, the dashboard refreshes
//! immediately and then every 30 seconds until shutdown.
//!
//! ## Architecture
//!
//! - **Agents**: the refresh trigger and the handle that owns its timer
//! - **Loader**: the optional capability each refresh delegates to
//! - **Config**: persistent settings for the cadence and loader command

pub mod agents;
pub mod config;
pub mod loader;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use agents::{Agent, AgentError, AgentStatus, RefreshConfig, RefreshHandle, RefreshTrigger};
use config::{AppConfig, ConfigError};
use loader::WatchedDataLoader;

/// Hosting shell for the refresh trigger
///
/// Receives the one-time environment-ready signal and owns the running timer.
pub struct Dashboard {
    trigger: Arc<RefreshTrigger>,
    handle: Mutex<Option<RefreshHandle>>,
}

impl Dashboard {
    /// Creates a dashboard with an optional watched-data loader
    pub fn new(config: RefreshConfig, loader: Option<Arc<dyn WatchedDataLoader>>) -> Self {
        Self {
            trigger: Arc::new(RefreshTrigger::with_config(config, loader)),
            handle: Mutex::new(None),
        }
    }

    /// Creates a dashboard from persisted settings
    ///
    /// Uses a [`loader::CommandLoader`] when a loader command is configured.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let refresh = config.refresh_config()?;
        let loader = config
            .command_loader()
            .map(|l| Arc::new(l) as Arc<dyn WatchedDataLoader>);
        Ok(Self::new(refresh, loader))
    }

    /// The refresh trigger driven by this dashboard
    pub fn trigger(&self) -> &Arc<RefreshTrigger> {
        &self.trigger
    }

    /// Current trigger status
    pub fn status(&self) -> AgentStatus {
        self.trigger.status()
    }

    /// Handles the environment-ready signal
    ///
    /// Refreshes once before returning and starts the repeating timer.
    /// Fails with [`AgentError::AlreadyRunning`] if called again.
    pub async fn on_environment_ready(&self) -> Result<(), AgentError> {
        let mut slot = self.handle.lock().await;
        let handle = self.trigger.spawn().await?;
        *slot = Some(handle);
        Ok(())
    }

    /// Stops the repeating timer and waits for it to finish
    ///
    /// Fails with [`AgentError::NotRunning`] if the environment never became
    /// ready or the dashboard was already shut down.
    pub async fn shutdown(&self) -> Result<(), AgentError> {
        let handle = self
            .handle
            .lock()
            .await
            .take()
            .ok_or(AgentError::NotRunning)?;
        handle.stop().await?;
        tracing::info!("Dashboard shut down");
        Ok(())
    }
}

/// Initializes logging
///
/// `RUST_LOG` overrides the default directives.
pub fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("coinwatch=debug,coinwatch_lib=debug,info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

/// Runs the dashboard until Ctrl-C
pub fn run() -> anyhow::Result<()> {
    init_logging()?;

    tracing::info!("Starting Coinwatch...");

    let config = AppConfig::load();
    let dashboard = Dashboard::from_config(&config)?;
    if !dashboard.trigger().has_loader() {
        tracing::info!("No loader command configured, refreshes will only be traced");
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        dashboard.on_environment_ready().await?;
        tracing::info!("Coinwatch initialized successfully");

        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutdown requested");

        dashboard.shutdown().await?;
        Ok::<(), anyhow::Error>(())
    })
}
