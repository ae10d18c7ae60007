//! Badges: lightweight awards with a single threshold each.

use family_rules::GameState;
use serde::{Deserialize, Serialize};

/// The single condition a badge checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "threshold", rename_all = "snake_case")]
pub enum BadgeCriterion {
    TimelineEntries(usize),
    ChildrenCount(usize),
    HappinessAtLeast(i32),
    AgeAtLeast(u32),
    AchievementsUnlocked(usize),
}

impl BadgeCriterion {
    pub fn is_met(&self, state: &GameState) -> bool {
        match *self {
            BadgeCriterion::TimelineEntries(n) => state.timeline.len() >= n,
            BadgeCriterion::ChildrenCount(n) => state.children.len() >= n,
            BadgeCriterion::HappinessAtLeast(n) => state.happiness >= n,
            BadgeCriterion::AgeAtLeast(n) => state.current_age >= n,
            BadgeCriterion::AchievementsUnlocked(n) => {
                state
                    .achievements
                    .as_ref()
                    .map_or(0, |ledger| ledger.unlocked.len())
                    >= n
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub criterion: BadgeCriterion,
}

impl Badge {
    pub fn new(
        id: &str,
        name: &str,
        description: &str,
        icon: &str,
        criterion: BadgeCriterion,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            criterion,
        }
    }
}

/// The badges shipped with the game.
pub fn default_badges() -> Vec<Badge> {
    vec![
        Badge::new(
            "first_choice",
            "First Choice",
            "Make your first parenting decision",
            "✨",
            BadgeCriterion::TimelineEntries(1),
        ),
        Badge::new(
            "storyteller",
            "Storyteller",
            "Make 25 decisions",
            "📖",
            BadgeCriterion::TimelineEntries(25),
        ),
        Badge::new(
            "growing_family",
            "Growing Family",
            "Welcome a second child",
            "🍼",
            BadgeCriterion::ChildrenCount(2),
        ),
        Badge::new(
            "sunshine",
            "Sunshine",
            "Reach family happiness of 80",
            "☀️",
            BadgeCriterion::HappinessAtLeast(80),
        ),
        Badge::new(
            "first_decade",
            "First Decade",
            "Play through ten years",
            "🎂",
            BadgeCriterion::AgeAtLeast(10),
        ),
        Badge::new(
            "collector",
            "Collector",
            "Unlock five achievements",
            "🏆",
            BadgeCriterion::AchievementsUnlocked(5),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use family_rules::{ChildCharacter, TimelineEntry};

    #[test]
    fn test_criteria() {
        let mut state = GameState::default();
        assert!(!BadgeCriterion::TimelineEntries(1).is_met(&state));
        assert!(!BadgeCriterion::AchievementsUnlocked(1).is_met(&state));
        assert!(BadgeCriterion::AchievementsUnlocked(0).is_met(&state));

        state.record_decision(TimelineEntry::new(0, "newborn", "Sing a lullaby"));
        state.add_child(ChildCharacter::new("Maya"));
        state.add_child(ChildCharacter::new("Leo"));
        state.happiness = 80;
        state.current_age = 9;

        assert!(BadgeCriterion::TimelineEntries(1).is_met(&state));
        assert!(BadgeCriterion::ChildrenCount(2).is_met(&state));
        assert!(BadgeCriterion::HappinessAtLeast(80).is_met(&state));
        assert!(!BadgeCriterion::AgeAtLeast(10).is_met(&state));
    }

    #[test]
    fn test_default_badges_unique() {
        let badges = default_badges();
        let mut ids: Vec<_> = badges.iter().map(|b| b.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), badges.len());
    }
}
