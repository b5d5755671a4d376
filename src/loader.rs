//! Watched-data loader - The capability a refresh tick delegates to
//!
//! The refresh trigger does not know how watched coins are loaded. It holds an
//! optional loader and calls it once per tick, fire-and-forget.

use tokio::process::Command;

/// An externally supplied refresh capability
///
/// Called with no arguments and no result. Implementations must return
/// quickly; real work belongs on a spawned task.
pub trait WatchedDataLoader: Send + Sync {
    /// Starts a refresh of the watched coins
    fn load_watched_coins(&self);
}

impl<F> WatchedDataLoader for F
where
    F: Fn() + Send + Sync,
{
    fn load_watched_coins(&self) {
        self()
    }
}

/// Loader that runs an external command on every tick
///
/// The child process is not awaited by the caller. A detached task reaps it
/// and logs the exit status.
#[derive(Debug, Clone)]
pub struct CommandLoader {
    program: String,
    args: Vec<String>,
}

impl CommandLoader {
    /// Creates a loader for `program` with the given arguments
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Builds a loader from an argv-style list (program first)
    ///
    /// Returns `None` for an empty list.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    /// Returns the program this loader runs
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl WatchedDataLoader for CommandLoader {
    fn load_watched_coins(&self) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime available, skipping '{}'", self.program);
            return;
        };

        let mut child = match Command::new(&self.program).args(&self.args).spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!("Failed to spawn loader '{}': {}", self.program, e);
                return;
            }
        };

        let program = self.program.clone();
        runtime.spawn(async move {
            match child.wait().await {
                Ok(status) => tracing::debug!("Loader '{}' exited with {}", program, status),
                Err(e) => tracing::debug!("Failed to wait for loader '{}': {}", program, e),
            }
        });
    }
}
