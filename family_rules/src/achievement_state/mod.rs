//! Achievement data embedded in every game state.
//!
//! Unlock records are the only source of truth here. Progress entries and the
//! statistics block are derived caches, rewritten on every evaluation pass and
//! never edited by hand.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::entities::ChildId;
use crate::mechanics::{AchievementCategory, Rarity};

/// Family details frozen at the moment of an unlock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockSnapshot {
    pub family_size: usize,
    pub parent_name: String,
    pub child_name: Option<String>,
}

/// A granted achievement. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockedAchievement {
    pub achievement_id: String,
    pub unlocked_at: DateTime<Utc>,
    /// In-game age when the unlock happened.
    pub game_age: u32,
    pub child_id: Option<ChildId>,
    pub snapshot: UnlockSnapshot,
}

/// Evaluated progress of one achievement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementProgress {
    pub achievement_id: String,
    /// Mean of the per-requirement percentages, 0-100.
    pub progress: f64,
    /// Raw value per requirement target.
    pub current_values: BTreeMap<String, f64>,
    /// Every requirement met. Never derived from `progress`.
    pub is_completed: bool,
    /// Completed and not yet unlocked.
    pub can_unlock: bool,
}

/// Per-category rollup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryProgress {
    pub unlocked: usize,
    pub total: usize,
    pub points: u32,
}

/// Summary statistics over the unlocked achievements.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AchievementStats {
    pub total_points: u32,
    pub achievements_unlocked: usize,
    pub achievements_available: usize,
    pub rarity_breakdown: BTreeMap<Rarity, usize>,
    pub category_progress: BTreeMap<AchievementCategory, CategoryProgress>,
    /// Up to five entries, most recent first.
    pub recent_unlocks: Vec<UnlockedAchievement>,
}

/// The achievement sub-aggregate of a [`crate::GameState`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AchievementLedger {
    /// Append-only, at most one entry per achievement id.
    pub unlocked: Vec<UnlockedAchievement>,
    pub progress: HashMap<String, AchievementProgress>,
    pub stats: AchievementStats,
    /// Ids of badges the player has been awarded.
    #[serde(default)]
    pub earned_badges: Vec<String>,
}

impl AchievementLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether an achievement has been granted.
    pub fn is_unlocked(&self, achievement_id: &str) -> bool {
        self.unlocked
            .iter()
            .any(|u| u.achievement_id == achievement_id)
    }

    /// Append an unlock. Returns `false` and leaves the ledger untouched if the
    /// achievement was already granted.
    pub fn record_unlock(&mut self, unlock: UnlockedAchievement) -> bool {
        if self.is_unlocked(&unlock.achievement_id) {
            return false;
        }
        self.unlocked.push(unlock);
        true
    }

    /// Check whether a badge has been awarded.
    pub fn has_badge(&self, badge_id: &str) -> bool {
        self.earned_badges.iter().any(|b| b == badge_id)
    }

    /// Award a badge. Returns `false` if it was already held.
    pub fn award_badge(&mut self, badge_id: impl Into<String>) -> bool {
        let badge_id = badge_id.into();
        if self.has_badge(&badge_id) {
            return false;
        }
        self.earned_badges.push(badge_id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unlock(id: &str) -> UnlockedAchievement {
        UnlockedAchievement {
            achievement_id: id.to_string(),
            unlocked_at: Utc::now(),
            game_age: 3,
            child_id: None,
            snapshot: UnlockSnapshot {
                family_size: 1,
                parent_name: "Sam".to_string(),
                child_name: None,
            },
        }
    }

    #[test]
    fn test_record_unlock_refuses_duplicates() {
        let mut ledger = AchievementLedger::new();

        assert!(ledger.record_unlock(unlock("first_steps")));
        assert!(!ledger.record_unlock(unlock("first_steps")));
        assert!(ledger.record_unlock(unlock("creative_genius")));

        assert_eq!(ledger.unlocked.len(), 2);
        assert!(ledger.is_unlocked("first_steps"));
        assert!(!ledger.is_unlocked("milestone_master"));
    }

    #[test]
    fn test_award_badge_once() {
        let mut ledger = AchievementLedger::new();
        assert!(ledger.award_badge("storyteller"));
        assert!(!ledger.award_badge("storyteller"));
        assert_eq!(ledger.earned_badges, vec!["storyteller".to_string()]);
    }

    #[test]
    fn test_stats_keys_serialize_as_names() {
        let mut stats = AchievementStats::default();
        stats.rarity_breakdown.insert(Rarity::Rare, 2);
        stats
            .category_progress
            .insert(AchievementCategory::Individual, CategoryProgress::default());

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["rarity_breakdown"]["rare"], 2);
        assert!(json["category_progress"]["individual"].is_object());
    }
}
