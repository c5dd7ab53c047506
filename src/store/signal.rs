//! The one-shot "loaded" signal collaborators block startup on.

use std::fmt;

use tokio::sync::watch;

/// Load lifecycle of a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// `load()` has not completed
    Pending,
    /// Migrated and bound from the backing medium
    Ready,
    /// Backing medium unreadable; every entry holds its default and
    /// writes stay in memory
    Degraded { reason: String },
}

impl LoadState {
    /// Ready or Degraded: typed access is available
    pub fn is_loaded(&self) -> bool {
        !matches!(self, LoadState::Pending)
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, LoadState::Degraded { .. })
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::Pending => write!(f, "pending"),
            LoadState::Ready => write!(f, "ready"),
            LoadState::Degraded { reason } => write!(f, "degraded ({})", reason),
        }
    }
}

/// Readable synchronously, awaitable asynchronously. Cheap to clone.
#[derive(Debug, Clone)]
pub struct LoadedSignal {
    receiver: watch::Receiver<LoadState>,
}

impl LoadedSignal {
    pub(crate) fn new(receiver: watch::Receiver<LoadState>) -> Self {
        Self { receiver }
    }

    /// Current state
    pub fn state(&self) -> LoadState {
        self.receiver.borrow().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.receiver.borrow().is_loaded()
    }

    /// Waits until the store is loaded and returns the final state.
    ///
    /// If the store is dropped before loading, returns `Pending`.
    pub async fn wait(&mut self) -> LoadState {
        let loaded = self
            .receiver
            .wait_for(LoadState::is_loaded)
            .await
            .map(|state| state.clone());
        match loaded {
            Ok(state) => state,
            Err(_) => self.state(),
        }
    }
}
