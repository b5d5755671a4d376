//! Agent module - Background tasks and periodic operations
//!
//! Provides the dashboard refresh trigger and the handle that owns its timer.

mod base;
mod handle;
mod refresh_trigger;

pub use base::{Agent, AgentError, AgentStatus};
pub use handle::RefreshHandle;
pub use refresh_trigger::{RefreshConfig, RefreshTrigger, DEFAULT_REFRESH_INTERVAL};
