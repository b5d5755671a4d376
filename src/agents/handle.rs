//! Owned handle for a running refresh timer

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::base::{Agent, AgentError};
use super::refresh_trigger::RefreshTrigger;

/// Owns the repeating timer started by [`RefreshTrigger::spawn`]
///
/// The timer keeps firing for as long as the handle is alive. Dropping the
/// handle cancels it; [`RefreshHandle::stop`] cancels it and waits for the
/// polling task to finish.
pub struct RefreshHandle {
    trigger: Arc<RefreshTrigger>,
    cancel_token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    pub(crate) fn new(
        trigger: Arc<RefreshTrigger>,
        cancel_token: CancellationToken,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            trigger,
            cancel_token,
            task: Some(task),
        }
    }

    /// The trigger driven by this timer
    pub fn trigger(&self) -> &Arc<RefreshTrigger> {
        &self.trigger
    }

    /// Returns true once the polling task has exited
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |task| task.is_finished())
    }

    /// Stops the timer and waits for the polling task to exit
    pub async fn stop(mut self) -> Result<(), AgentError> {
        self.trigger.stop().await?;

        if let Some(task) = self.task.take() {
            task.await
                .map_err(|e| AgentError::Internal(format!("Refresh task failed: {}", e)))?;
        }

        tracing::debug!("Refresh timer released");
        Ok(())
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        if !self.cancel_token.is_cancelled() {
            tracing::debug!("Refresh handle dropped, cancelling timer");
            self.cancel_token.cancel();
        }
    }
}
