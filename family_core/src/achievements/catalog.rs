//! Achievement definitions and the stock catalog.

use family_rules::{AchievementCategory, AchievementTier, Rarity};
use serde::{Deserialize, Serialize};

use super::requirement::{
    AchievementRequirement, FamilyStat, FinancialMetric, RequirementKind, CHILDREN_UNDER_18,
    SUPPORTIVE_CHOICES,
};

/// Immutable definition of an achievement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: AchievementCategory,
    pub tier: AchievementTier,
    pub rarity: Rarity,
    pub icon: String,
    pub points: u32,
    /// Kept out of listings until unlocked.
    pub hidden: bool,
    /// All must be met to unlock.
    pub requirements: Vec<AchievementRequirement>,
}

impl Achievement {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: AchievementCategory,
        tier: AchievementTier,
        rarity: Rarity,
        points: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category,
            tier,
            rarity,
            icon: String::new(),
            points,
            hidden: false,
            requirements: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_requirement(mut self, requirement: AchievementRequirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// The achievements shipped with the game.
pub fn default_catalog() -> Vec<Achievement> {
    use AchievementCategory::*;
    use AchievementTier::*;

    vec![
        Achievement::new("first_steps", "First Steps", Milestone, Bronze, Rarity::Common, 10)
            .with_description("Celebrate your child's first milestone")
            .with_icon("👣")
            .with_requirement(AchievementRequirement::new(
                RequirementKind::MilestoneCount,
                1.0,
                "Reach one milestone",
            )),
        Achievement::new("milestone_master", "Milestone Master", Milestone, Gold, Rarity::Rare, 50)
            .with_description("Guide your child through ten milestones")
            .with_icon("🏅")
            .with_requirement(AchievementRequirement::new(
                RequirementKind::MilestoneCount,
                10.0,
                "Reach ten milestones",
            )),
        Achievement::new("school_days", "School Days", Milestone, Bronze, Rarity::Common, 10)
            .with_description("Reach school age")
            .with_icon("🎒")
            .with_requirement(AchievementRequirement::new(
                RequirementKind::AgeReached,
                6.0,
                "Reach age 6",
            )),
        Achievement::new("creative_genius", "Creative Genius", Individual, Silver, Rarity::Rare, 30)
            .with_description("Nurture exceptional creativity")
            .with_icon("🎨")
            .with_requirement(AchievementRequirement::trait_level(
                "creativity",
                90.0,
                "Creativity of 90 or more",
            )),
        Achievement::new("bookworm", "Bookworm", Individual, Bronze, Rarity::Common, 15)
            .with_description("Raise an avid reader")
            .with_icon("📚")
            .with_requirement(AchievementRequirement::skill_level(
                "reading",
                8.0,
                "Reading skill of 8 or more",
            )),
        Achievement::new("social_butterfly", "Social Butterfly", Social, Silver, Rarity::Uncommon, 25)
            .with_description("Raise a child who makes friends everywhere")
            .with_icon("🦋")
            .with_requirement(AchievementRequirement::trait_level(
                "sociability",
                85.0,
                "Sociability of 85 or more",
            ))
            .with_requirement(AchievementRequirement::skill_level(
                "communication",
                7.0,
                "Communication skill of 7 or more",
            )),
        Achievement::new("happy_home", "Happy Home", Family, Silver, Rarity::Uncommon, 25)
            .with_description("Keep family happiness high")
            .with_icon("🏡")
            .with_requirement(AchievementRequirement::new(
                RequirementKind::FamilyStat(FamilyStat::Happiness),
                90.0,
                "Family happiness of 90 or more",
            )),
        Achievement::new("big_family", "Big Family", Sibling, Gold, Rarity::Rare, 40)
            .with_description("Raise three children at once")
            .with_icon("👨‍👩‍👧‍👦")
            .with_requirement(AchievementRequirement::custom(
                CHILDREN_UNDER_18,
                3.0,
                "Three children under 18",
            )),
        Achievement::new("close_bond", "Close Bond", Parenting, Gold, Rarity::Rare, 40)
            .with_description("Build a deep relationship with your child")
            .with_icon("🤝")
            .with_requirement(AchievementRequirement::new(
                RequirementKind::FamilyStat(FamilyStat::BondQuality),
                85.0,
                "Average relationship quality of 85 or more",
            )),
        Achievement::new("supportive_parent", "Supportive Parent", Parenting, Silver, Rarity::Uncommon, 30)
            .with_description("Choose support and encouragement again and again")
            .with_icon("💛")
            .with_requirement(AchievementRequirement::custom(
                SUPPORTIVE_CHOICES,
                10.0,
                "Ten supportive decisions",
            )),
        Achievement::new("nest_egg", "Nest Egg", Financial, Silver, Rarity::Uncommon, 25)
            .with_description("Put money aside for the future")
            .with_icon("🪺")
            .with_requirement(AchievementRequirement::new(
                RequirementKind::FinancialLevel(FinancialMetric::Savings),
                50_000.0,
                "Savings of 50000",
            )),
        Achievement::new("secure_footing", "Secure Footing", Financial, Gold, Rarity::Rare, 40)
            .with_description("Reach lasting financial stability")
            .with_icon("💰")
            .with_requirement(AchievementRequirement::new(
                RequirementKind::FinancialLevel(FinancialMetric::StabilityLevel),
                9.0,
                "Financial level of 9 or more",
            )),
        Achievement::new("graduation_day", "Graduation Day", Milestone, Platinum, Rarity::Epic, 75)
            .with_description("See your child into adulthood with a happy family")
            .with_icon("🎓")
            .with_requirement(AchievementRequirement::new(
                RequirementKind::AgeReached,
                18.0,
                "Reach age 18",
            ))
            .with_requirement(AchievementRequirement::new(
                RequirementKind::FamilyStat(FamilyStat::Happiness),
                70.0,
                "Family happiness of 70 or more",
            )),
        Achievement::new("heart_of_the_home", "Heart of the Home", Parenting, Special, Rarity::Legendary, 100)
            .with_description("Raise a child to adulthood with warmth at every step")
            .with_icon("🌟")
            .hidden()
            .with_requirement(AchievementRequirement::new(
                RequirementKind::AgeReached,
                18.0,
                "Reach age 18",
            ))
            .with_requirement(AchievementRequirement::new(
                RequirementKind::FamilyStat(FamilyStat::Happiness),
                95.0,
                "Family happiness of 95 or more",
            ))
            .with_requirement(AchievementRequirement::new(
                RequirementKind::FamilyStat(FamilyStat::BondQuality),
                95.0,
                "Average relationship quality of 95 or more",
            ))
            .with_requirement(AchievementRequirement::custom(
                SUPPORTIVE_CHOICES,
                25.0,
                "Twenty-five supportive decisions",
            )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_catalog_ids_unique() {
        let catalog = default_catalog();
        let ids: HashSet<_> = catalog.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_every_achievement_has_requirements() {
        for achievement in default_catalog() {
            assert!(!achievement.requirements.is_empty(), "{}", achievement.id);
            assert!(achievement.points > 0);
        }
    }

    #[test]
    fn test_creative_genius_definition() {
        let catalog = default_catalog();
        let genius = catalog.iter().find(|a| a.id == "creative_genius").unwrap();
        assert_eq!(genius.points, 30);
        assert_eq!(genius.category, AchievementCategory::Individual);
        assert_eq!(
            genius.requirements[0].kind,
            RequirementKind::TraitLevel {
                trait_id: "creativity".to_string()
            }
        );
        assert_eq!(genius.requirements[0].threshold, 90.0);
    }
}
