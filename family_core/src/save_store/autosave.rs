//! Debounced auto-save.
//!
//! Each [`AutoSaveScheduler::schedule`] call replaces the pending write, so a
//! burst of state changes produces one auto-save once the state has been quiet
//! for the debounce interval.

use family_rules::GameState;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{SaveResult, SaveStore, StorageBackend};

/// Coalesces auto-save requests onto a shared store.
pub struct AutoSaveScheduler<S> {
    store: Arc<Mutex<SaveStore<S>>>,
    debounce: Duration,
    pending: Option<JoinHandle<()>>,
}

impl<S: StorageBackend + Send + 'static> AutoSaveScheduler<S> {
    pub fn new(store: Arc<Mutex<SaveStore<S>>>, debounce: Duration) -> Self {
        Self {
            store,
            debounce,
            pending: None,
        }
    }

    /// Scheduler using the store's configured debounce interval.
    pub fn from_config(store: Arc<Mutex<SaveStore<S>>>) -> Self {
        let debounce = store.lock().config().autosave_debounce();
        Self::new(store, debounce)
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Write `state` to the auto-save slot after the debounce interval,
    /// dropping any write scheduled earlier.
    ///
    /// Must be called from within a Tokio runtime. Failures are logged, not
    /// returned.
    pub fn schedule(&mut self, state: GameState) {
        self.cancel();
        let store = Arc::clone(&self.store);
        let debounce = self.debounce;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let result = store.lock().auto_save(&state);
            match result {
                Ok(()) => debug!(age = state.current_age, "scheduled auto-save written"),
                Err(error) => warn!(%error, "scheduled auto-save failed"),
            }
        }));
    }

    /// Write `state` immediately, dropping any pending write.
    pub fn flush(&mut self, state: &GameState) -> SaveResult<()> {
        self.cancel();
        self.store.lock().auto_save(state)
    }

    /// Drop the pending write, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}
