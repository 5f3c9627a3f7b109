use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use tracing::debug;

use crate::action::Action;
use crate::reducer::reduce;
use crate::state::AppState;

/// Owned, injectable container for the root state.
///
/// Cloning yields another handle to the same state. Dispatches are applied one
/// at a time under the lock, so each action sees the result of the previous one.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: Mutex<AppState>,

    /// Names of applied actions, for observers that re-render on change
    applied_tx: broadcast::Sender<&'static str>,
}

impl Store {
    pub fn new(initial: AppState) -> Self {
        let (applied_tx, _) = broadcast::channel(256);
        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(initial),
                applied_tx,
            }),
        }
    }

    pub fn dispatch(&self, action: Action) {
        let name = action.name();
        {
            let mut guard = self.lock();
            let current = std::mem::take(&mut *guard);
            *guard = reduce(current, action);
        }
        debug!("Dispatched {}", name);
        let _ = self.inner.applied_tx.send(name);
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> AppState {
        self.lock().clone()
    }

    /// Read from the current state without cloning it.
    pub fn with_state<T>(&self, f: impl FnOnce(&AppState) -> T) -> T {
        f(&self.lock())
    }

    /// Receive the name of every action applied after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<&'static str> {
        self.inner.applied_tx.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, AppState> {
        // The reducer does not panic mid-update, so a poisoned lock still
        // holds a whole state value.
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}
