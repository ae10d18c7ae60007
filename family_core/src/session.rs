//! Game session - ties the live state to achievements and persistence.
//!
//! Every meaningful transition goes through [`GameSession::commit_transition`]:
//! achievements and badges are brought up to date and a debounced auto-save is
//! scheduled. Loading goes the other way and makes sure the loaded state has an
//! achievement ledger.

use family_rules::{GameState, UnlockedAchievement};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

use crate::achievements::AchievementEngine;
use crate::save_store::{
    AutoSaveScheduler, SaveGame, SaveGameMetadata, SaveResult, SaveStore, StorageBackend,
};

/// What a committed transition produced, for one-shot notifications.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionOutcome {
    pub unlocked: Vec<UnlockedAchievement>,
    /// Ids of badges awarded by this transition.
    pub badges: Vec<String>,
}

impl TransitionOutcome {
    pub fn is_empty(&self) -> bool {
        self.unlocked.is_empty() && self.badges.is_empty()
    }
}

/// A running playthrough.
pub struct GameSession<S> {
    state: GameState,
    engine: AchievementEngine,
    store: Arc<Mutex<SaveStore<S>>>,
    autosave: AutoSaveScheduler<S>,
}

impl<S: StorageBackend + Send + 'static> GameSession<S> {
    pub fn new(store: SaveStore<S>, engine: AchievementEngine) -> Self {
        let store = Arc::new(Mutex::new(store));
        let autosave = AutoSaveScheduler::from_config(Arc::clone(&store));
        let mut state = GameState::default();
        engine.initialize_game_state_achievements(&mut state);
        Self {
            state,
            engine,
            store,
            autosave,
        }
    }

    /// Replace the live state with a new playthrough.
    pub fn new_game(&mut self, mut state: GameState) {
        self.autosave.cancel();
        self.engine.initialize_game_state_achievements(&mut state);
        self.state = state;
        info!(parent = %self.state.parent.name, "new game started");
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable access to the live state. Call [`Self::commit_transition`]
    /// once a change is complete.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn engine(&self) -> &AchievementEngine {
        &self.engine
    }

    /// Handle to the shared store.
    pub fn store(&self) -> Arc<Mutex<SaveStore<S>>> {
        Arc::clone(&self.store)
    }

    /// Update achievements, award badges and schedule an auto-save.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn commit_transition(&mut self) -> TransitionOutcome {
        let unlocked = self.engine.update_progress(&mut self.state);
        let badges: Vec<String> = self
            .engine
            .check_badge_eligibility(&self.state)
            .into_iter()
            .map(|badge| badge.id.clone())
            .collect();

        let ledger = self.state.ensure_achievements();
        for badge in &badges {
            ledger.award_badge(badge.clone());
        }

        self.autosave.schedule(self.state.clone());
        TransitionOutcome { unlocked, badges }
    }

    pub fn save(&mut self, name: Option<&str>) -> SaveResult<SaveGame> {
        self.store.lock().save(&self.state, name)
    }

    /// Replace the live state with a saved one.
    pub fn load(&mut self, id: &str) -> SaveResult<()> {
        let state = self.store.lock().load(id)?;
        self.adopt(state);
        info!(save_id = %id, "game loaded");
        Ok(())
    }

    /// Replace the live state with the auto-save, if a usable one exists.
    pub fn resume_auto_save(&mut self) -> bool {
        let state = self.store.lock().get_auto_save();
        match state {
            Some(state) => {
                self.adopt(state);
                info!("resumed from auto-save");
                true
            }
            None => false,
        }
    }

    /// Write the auto-save now instead of waiting for the debounce.
    pub fn flush_auto_save(&mut self) -> SaveResult<()> {
        self.autosave.flush(&self.state)
    }

    pub fn list_saves(&self) -> Vec<SaveGameMetadata> {
        self.store.lock().list()
    }

    fn adopt(&mut self, mut state: GameState) {
        self.autosave.cancel();
        self.engine.initialize_game_state_achievements(&mut state);
        self.state = state;
    }
}
