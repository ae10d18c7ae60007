//! Achievement Engine - evaluates progress and grants achievements.
//!
//! Each achievement is implicitly Locked, InProgress or Unlocked for a given
//! game state. The only transition driver is [`AchievementEngine::update_progress`]:
//! 1. **Decide**: every catalog entry is checked with [`AchievementEngine::unlock`]
//! 2. **Apply**: new unlocks are appended to the ledger, never twice
//! 3. **Refresh**: progress entries and stats are recomputed from scratch
//!
//! Evaluation never fails. Anything a requirement cannot find in the state
//! scores zero.

mod badges;
mod catalog;
mod requirement;
mod stats;

pub use badges::*;
pub use catalog::*;
pub use requirement::*;
pub use stats::*;

use chrono::Utc;
use family_rules::{
    AchievementCategory, AchievementProgress, AchievementStats, GameState, UnlockSnapshot,
    UnlockedAchievement,
};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// Owns the achievement and badge catalogs and the predicate registry.
pub struct AchievementEngine {
    catalog: Vec<Achievement>,
    badges: Vec<Badge>,
    predicates: PredicateRegistry,
}

impl AchievementEngine {
    pub fn new(catalog: Vec<Achievement>, badges: Vec<Badge>, predicates: PredicateRegistry) -> Self {
        Self {
            catalog,
            badges,
            predicates,
        }
    }

    /// Engine with the stock catalog, badges and predicates.
    pub fn with_defaults() -> Self {
        Self::new(
            default_catalog(),
            default_badges(),
            PredicateRegistry::with_builtins(),
        )
    }

    pub fn all_achievements(&self) -> &[Achievement] {
        &self.catalog
    }

    pub fn by_category(&self, category: AchievementCategory) -> Vec<&Achievement> {
        self.catalog
            .iter()
            .filter(|a| a.category == category)
            .collect()
    }

    pub fn get(&self, achievement_id: &str) -> Option<&Achievement> {
        self.catalog.iter().find(|a| a.id == achievement_id)
    }

    /// Achievements a player may see: everything not hidden, plus hidden ones
    /// already unlocked in `state`.
    pub fn visible_achievements<'a>(&'a self, state: &GameState) -> Vec<&'a Achievement> {
        self.catalog
            .iter()
            .filter(|a| !a.hidden || is_unlocked(state, &a.id))
            .collect()
    }

    pub fn predicates(&self) -> &PredicateRegistry {
        &self.predicates
    }

    /// Register extra custom predicates.
    pub fn predicates_mut(&mut self) -> &mut PredicateRegistry {
        &mut self.predicates
    }

    pub fn evaluate_requirement(
        &self,
        requirement: &AchievementRequirement,
        state: &GameState,
    ) -> RequirementEvaluation {
        requirement.evaluate(state, &self.predicates)
    }

    /// Score an achievement against `state`.
    ///
    /// `progress` is the mean of the requirement percentages while
    /// `is_completed` needs every requirement met, so a partly met achievement
    /// can show high progress and still be incomplete.
    pub fn evaluate_achievement(&self, achievement: &Achievement, state: &GameState) -> AchievementProgress {
        let mut current_values = BTreeMap::new();
        let mut total = 0.0;
        let mut all_met = !achievement.requirements.is_empty();

        for requirement in &achievement.requirements {
            let eval = self.evaluate_requirement(requirement, state);
            current_values.insert(requirement.kind.target_key(), eval.current_value);
            total += eval.progress;
            all_met &= eval.is_completed;
        }

        let progress = if achievement.requirements.is_empty() {
            0.0
        } else {
            total / achievement.requirements.len() as f64
        };

        AchievementProgress {
            achievement_id: achievement.id.clone(),
            progress,
            current_values,
            is_completed: all_met,
            can_unlock: all_met && !is_unlocked(state, &achievement.id),
        }
    }

    /// Decide whether `achievement_id` unlocks now.
    ///
    /// Returns the unlock record without touching `state`, or `None` if the
    /// id is unknown, already unlocked or not yet earned.
    pub fn unlock(&self, achievement_id: &str, state: &GameState) -> Option<UnlockedAchievement> {
        let achievement = self.get(achievement_id)?;
        if !self.evaluate_achievement(achievement, state).can_unlock {
            return None;
        }

        let child = state.active_child();
        Some(UnlockedAchievement {
            achievement_id: achievement.id.clone(),
            unlocked_at: Utc::now(),
            game_age: state.current_age,
            child_id: child.map(|c| c.id),
            snapshot: UnlockSnapshot {
                family_size: state.children.len() + 1,
                parent_name: state.parent.name.clone(),
                child_name: child.map(|c| c.name.clone()),
            },
        })
    }

    /// Re-evaluate every achievement, record new unlocks and refresh the
    /// derived progress and stats.
    ///
    /// Returns only the unlocks made by this call.
    pub fn update_progress(&self, state: &mut GameState) -> Vec<UnlockedAchievement> {
        self.initialize_game_state_achievements(state);

        let candidates: Vec<UnlockedAchievement> = self
            .catalog
            .iter()
            .filter_map(|a| self.unlock(&a.id, state))
            .collect();

        let ledger = state.ensure_achievements();
        let unlocked: Vec<UnlockedAchievement> = candidates
            .into_iter()
            .filter(|u| ledger.record_unlock(u.clone()))
            .collect();
        for unlock in &unlocked {
            info!(achievement = %unlock.achievement_id, age = unlock.game_age, "achievement unlocked");
        }

        let progress: HashMap<String, AchievementProgress> = self
            .catalog
            .iter()
            .map(|a| (a.id.clone(), self.evaluate_achievement(a, state)))
            .collect();

        let ledger = state.ensure_achievements();
        ledger.stats = self.calculate_stats(&ledger.unlocked);
        ledger.progress = progress;
        debug!(
            unlocked = ledger.stats.achievements_unlocked,
            points = ledger.stats.total_points,
            "achievement progress updated"
        );
        unlocked
    }

    /// Stats for `unlocked` against this engine's catalog.
    pub fn calculate_stats(&self, unlocked: &[UnlockedAchievement]) -> AchievementStats {
        calculate_stats(&self.catalog, unlocked)
    }

    /// Give `state` an empty achievement ledger if it has none. Existing data
    /// is left alone.
    pub fn initialize_game_state_achievements(&self, state: &mut GameState) {
        if state.achievements.is_none() {
            let stats = self.calculate_stats(&[]);
            state.ensure_achievements().stats = stats;
        }
    }

    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    /// Badges `state` qualifies for that it has not been awarded yet. Does not
    /// award them.
    pub fn check_badge_eligibility<'a>(&'a self, state: &GameState) -> Vec<&'a Badge> {
        self.badges
            .iter()
            .filter(|badge| {
                let earned = state
                    .achievements
                    .as_ref()
                    .is_some_and(|ledger| ledger.has_badge(&badge.id));
                !earned && badge.criterion.is_met(state)
            })
            .collect()
    }
}

impl Default for AchievementEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn is_unlocked(state: &GameState, achievement_id: &str) -> bool {
    state
        .achievements
        .as_ref()
        .is_some_and(|ledger| ledger.is_unlocked(achievement_id))
}
