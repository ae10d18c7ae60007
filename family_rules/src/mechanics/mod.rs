//! Closed vocabularies: game phases, styles, trait/skill categories and the
//! achievement taxonomy.

use serde::{Deserialize, Serialize};

/// Where the playthrough currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    #[default]
    Setup,
    Playing,
    /// A scenario card is on screen awaiting a choice.
    Scenario,
    Reflection,
    Completed,
}

/// Tone of the scenario deck chosen at game start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameStyle {
    #[default]
    Realistic,
    Whimsical,
    Challenging,
}

impl std::fmt::Display for GameStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GameStyle::Realistic => "realistic",
            GameStyle::Whimsical => "whimsical",
            GameStyle::Challenging => "challenging",
        };
        f.write_str(name)
    }
}

/// Personality trait groupings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitCategory {
    Emotional,
    Social,
    Cognitive,
    Creative,
    Physical,
}

/// Skill groupings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Academic,
    Artistic,
    Athletic,
    Social,
    Practical,
}

/// Who a child has a relationship with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    Parent,
    Sibling,
    Grandparent,
    Friend,
    Teacher,
}

/// Achievement categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementCategory {
    Family,
    Individual,
    Sibling,
    Parenting,
    Milestone,
    Financial,
    Social,
}

impl AchievementCategory {
    /// Every category, in display order.
    pub const ALL: [AchievementCategory; 7] = [
        AchievementCategory::Family,
        AchievementCategory::Individual,
        AchievementCategory::Sibling,
        AchievementCategory::Parenting,
        AchievementCategory::Milestone,
        AchievementCategory::Financial,
        AchievementCategory::Social,
    ];
}

/// Achievement tiers, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Special,
}

/// Achievement rarity, most common first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enums_use_snake_case_on_the_wire() {
        assert_eq!(
            serde_json::to_string(&AchievementCategory::Financial).unwrap(),
            "\"financial\""
        );
        assert_eq!(serde_json::to_string(&GamePhase::Scenario).unwrap(), "\"scenario\"");
        let rarity: Rarity = serde_json::from_str("\"legendary\"").unwrap();
        assert_eq!(rarity, Rarity::Legendary);
    }

    #[test]
    fn test_rarity_ordering() {
        assert!(Rarity::Common < Rarity::Legendary);
        assert!(AchievementTier::Bronze < AchievementTier::Special);
    }
}
