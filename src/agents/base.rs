//! Base agent trait and types
//!
//! Defines the Agent trait implemented by background tasks such as the
//! dashboard refresh trigger.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur in agents
#[derive(Debug, Error)]
pub enum AgentError {
    /// Agent is already running
    #[error("Agent is already running")]
    AlreadyRunning,

    /// Agent is not running
    #[error("Agent is not running")]
    NotRunning,

    /// Agent was cancelled and cannot be started again
    #[error("Agent was cancelled")]
    Cancelled,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Status of an agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentStatus {
    /// Waiting for the environment-ready signal
    Idle,
    /// Actively polling
    Running,
    /// Agent has been stopped
    Stopped,
}

impl AgentStatus {
    /// Returns true if the agent is running
    pub fn is_running(&self) -> bool {
        matches!(self, AgentStatus::Running)
    }
}

/// Trait for background agents
///
/// Agents are long-running background tasks that can be started and stopped.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Returns the unique identifier for this agent
    fn id(&self) -> &'static str;

    /// Returns the display name for this agent
    fn name(&self) -> &'static str;

    /// Returns the current status of the agent
    fn status(&self) -> AgentStatus;

    /// Starts the agent
    ///
    /// Runs the agent's main loop until cancelled.
    async fn start(&self) -> Result<(), AgentError>;

    /// Stops the agent
    async fn stop(&self) -> Result<(), AgentError>;

    /// Triggers an immediate action (if supported)
    async fn trigger(&self) -> Result<(), AgentError> {
        Ok(())
    }
}
