//! Achievement requirements and how they are measured against a game state.

use family_rules::{GameState, ADULT_AGE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Name of a registered custom predicate.
pub type PredicateId = String;

/// Evaluator behind a [`RequirementKind::Custom`] requirement.
pub type Predicate = fn(&GameState) -> f64;

/// Number of children younger than 18.
pub const CHILDREN_UNDER_18: &str = "children_under_18";

/// Timeline decisions phrased in supportive language.
pub const SUPPORTIVE_CHOICES: &str = "supportive_choices";

const SUPPORTIVE_WORDS: [&str; 10] = [
    "support",
    "encourage",
    "listen",
    "comfort",
    "praise",
    "together",
    "help",
    "hug",
    "patient",
    "understand",
];

/// Family-wide statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FamilyStat {
    Happiness,
    ChildCount,
    /// Mean relationship quality of the active child.
    BondQuality,
}

/// Money-related measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialMetric {
    /// Family finances.
    Savings,
    /// The parent's financial level, 1-10.
    StabilityLevel,
}

/// What a requirement measures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "target", rename_all = "snake_case")]
pub enum RequirementKind {
    /// A personality trait of the active child.
    TraitLevel { trait_id: String },
    /// A skill level of the active child.
    SkillLevel { skill_id: String },
    /// Achieved milestones of the active child.
    MilestoneCount,
    FamilyStat(FamilyStat),
    FinancialLevel(FinancialMetric),
    /// The game's current age.
    AgeReached,
    /// A predicate looked up in the [`PredicateRegistry`].
    Custom(PredicateId),
}

impl RequirementKind {
    /// Key under which the measured value is reported in progress entries.
    pub fn target_key(&self) -> String {
        match self {
            RequirementKind::TraitLevel { trait_id } => format!("trait:{trait_id}"),
            RequirementKind::SkillLevel { skill_id } => format!("skill:{skill_id}"),
            RequirementKind::MilestoneCount => "milestones".to_string(),
            RequirementKind::FamilyStat(FamilyStat::Happiness) => "family:happiness".to_string(),
            RequirementKind::FamilyStat(FamilyStat::ChildCount) => "family:child_count".to_string(),
            RequirementKind::FamilyStat(FamilyStat::BondQuality) => {
                "family:bond_quality".to_string()
            }
            RequirementKind::FinancialLevel(FinancialMetric::Savings) => {
                "finances:savings".to_string()
            }
            RequirementKind::FinancialLevel(FinancialMetric::StabilityLevel) => {
                "finances:stability".to_string()
            }
            RequirementKind::AgeReached => "age".to_string(),
            RequirementKind::Custom(id) => format!("custom:{id}"),
        }
    }
}

/// One measurable condition of an achievement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementRequirement {
    pub kind: RequirementKind,
    /// Met when the measured value reaches this.
    pub threshold: f64,
    pub description: String,
}

impl AchievementRequirement {
    pub fn new(kind: RequirementKind, threshold: f64, description: impl Into<String>) -> Self {
        Self {
            kind,
            threshold,
            description: description.into(),
        }
    }

    /// Shorthand for a trait requirement on the active child.
    pub fn trait_level(trait_id: impl Into<String>, threshold: f64, description: &str) -> Self {
        Self::new(
            RequirementKind::TraitLevel {
                trait_id: trait_id.into(),
            },
            threshold,
            description,
        )
    }

    /// Shorthand for a skill requirement on the active child.
    pub fn skill_level(skill_id: impl Into<String>, threshold: f64, description: &str) -> Self {
        Self::new(
            RequirementKind::SkillLevel {
                skill_id: skill_id.into(),
            },
            threshold,
            description,
        )
    }

    /// Shorthand for a custom predicate requirement.
    pub fn custom(predicate: impl Into<String>, threshold: f64, description: &str) -> Self {
        Self::new(RequirementKind::Custom(predicate.into()), threshold, description)
    }

    /// Locate the measured value in `state`.
    ///
    /// Returns `None` when the referenced entity does not exist, such as a
    /// trait requirement with no active child.
    pub fn measure(&self, state: &GameState, predicates: &PredicateRegistry) -> Option<f64> {
        let value = match &self.kind {
            RequirementKind::TraitLevel { trait_id } => state.active_child()?.trait_value(trait_id)?,
            RequirementKind::SkillLevel { skill_id } => {
                f64::from(state.active_child()?.skill_level(skill_id)?)
            }
            RequirementKind::MilestoneCount => state.active_child()?.achieved_milestones() as f64,
            RequirementKind::FamilyStat(FamilyStat::Happiness) => f64::from(state.happiness),
            RequirementKind::FamilyStat(FamilyStat::ChildCount) => state.children.len() as f64,
            RequirementKind::FamilyStat(FamilyStat::BondQuality) => {
                state.active_child()?.average_relationship_quality()?
            }
            RequirementKind::FinancialLevel(FinancialMetric::Savings) => state.finances as f64,
            RequirementKind::FinancialLevel(FinancialMetric::StabilityLevel) => {
                f64::from(state.parent.financial_level)
            }
            RequirementKind::AgeReached => f64::from(state.current_age),
            RequirementKind::Custom(id) => predicates.evaluate(id, state)?,
        };
        value.is_finite().then_some(value)
    }

    /// Measure and score this requirement. Never fails: anything that cannot
    /// be measured scores zero.
    pub fn evaluate(&self, state: &GameState, predicates: &PredicateRegistry) -> RequirementEvaluation {
        match self.measure(state, predicates) {
            Some(current_value) => RequirementEvaluation {
                current_value,
                progress: percent_of(current_value, self.threshold),
                is_completed: current_value >= self.threshold,
            },
            None => RequirementEvaluation {
                current_value: 0.0,
                progress: 0.0,
                is_completed: false,
            },
        }
    }
}

fn percent_of(value: f64, threshold: f64) -> f64 {
    if threshold > 0.0 {
        (100.0 * value / threshold).clamp(0.0, 100.0)
    } else if value >= threshold {
        100.0
    } else {
        0.0
    }
}

/// Result of scoring one requirement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequirementEvaluation {
    pub current_value: f64,
    /// 0-100.
    pub progress: f64,
    pub is_completed: bool,
}

/// Lookup table for custom requirement predicates.
#[derive(Debug, Clone, Default)]
pub struct PredicateRegistry {
    predicates: HashMap<PredicateId, Predicate>,
}

impl PredicateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the stock predicates.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(CHILDREN_UNDER_18, children_under_18);
        registry.register(SUPPORTIVE_CHOICES, supportive_choices);
        registry
    }

    /// Add or replace a predicate.
    pub fn register(&mut self, id: impl Into<PredicateId>, predicate: Predicate) {
        self.predicates.insert(id.into(), predicate);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.predicates.contains_key(id)
    }

    /// Run a predicate. Unknown ids yield `None`.
    pub fn evaluate(&self, id: &str, state: &GameState) -> Option<f64> {
        match self.predicates.get(id) {
            Some(predicate) => Some(predicate(state)),
            None => {
                warn!(predicate = %id, "unknown achievement predicate");
                None
            }
        }
    }
}

fn children_under_18(state: &GameState) -> f64 {
    state.children_under(ADULT_AGE) as f64
}

fn supportive_choices(state: &GameState) -> f64 {
    state
        .timeline
        .iter()
        .filter(|entry| is_supportive(&entry.choice_text))
        .count() as f64
}

fn is_supportive(choice_text: &str) -> bool {
    let text = choice_text.to_lowercase();
    SUPPORTIVE_WORDS.iter().any(|word| text.contains(word))
}

#[cfg(test)]
mod tests {
    use super::*;
    use family_rules::{
        ChildCharacter, Milestone, ParentCharacter, PersonalityTrait, RelationType,
        RelationshipMetrics, TimelineEntry, TraitCategory,
    };

    fn state_with_child() -> GameState {
        let mut state = GameState::default();
        state.parent = ParentCharacter::new("Sam");
        state.add_child(
            ChildCharacter::new("Maya")
                .with_age(7)
                .with_trait(PersonalityTrait::new("creativity", TraitCategory::Creative, 45.0))
                .with_milestone(Milestone::new("first_word", 1).achieved())
                .with_milestone(Milestone::new("first_steps", 1))
                .with_relationship(
                    RelationType::Parent,
                    RelationshipMetrics {
                        quality: 80.0,
                        trust: 70.0,
                        communication: 60.0,
                    },
                ),
        );
        state
    }

    #[test]
    fn test_trait_progress() {
        let registry = PredicateRegistry::with_builtins();
        let requirement = AchievementRequirement::trait_level("creativity", 90.0, "Creativity 90");

        let eval = requirement.evaluate(&state_with_child(), &registry);
        assert_eq!(eval.current_value, 45.0);
        assert_eq!(eval.progress, 50.0);
        assert!(!eval.is_completed);
    }

    #[test]
    fn test_progress_is_capped() {
        let registry = PredicateRegistry::new();
        let mut state = state_with_child();
        state.current_age = 12;

        let eval = AchievementRequirement::new(RequirementKind::AgeReached, 6.0, "School age")
            .evaluate(&state, &registry);
        assert_eq!(eval.progress, 100.0);
        assert!(eval.is_completed);
    }

    #[test]
    fn test_missing_entities_score_zero() {
        let registry = PredicateRegistry::with_builtins();
        let state = GameState::default();

        for requirement in [
            AchievementRequirement::trait_level("creativity", 90.0, ""),
            AchievementRequirement::skill_level("reading", 5.0, ""),
            AchievementRequirement::new(RequirementKind::MilestoneCount, 1.0, ""),
            AchievementRequirement::new(RequirementKind::FamilyStat(FamilyStat::BondQuality), 50.0, ""),
            AchievementRequirement::custom("no_such_predicate", 1.0, ""),
        ] {
            let eval = requirement.evaluate(&state, &registry);
            assert_eq!(eval.progress, 0.0, "{:?}", requirement.kind);
            assert!(!eval.is_completed);
        }

        // Trait missing on an existing child.
        let eval = AchievementRequirement::trait_level("patience", 10.0, "")
            .evaluate(&state_with_child(), &registry);
        assert_eq!(eval.progress, 0.0);
    }

    #[test]
    fn test_child_measures() {
        let registry = PredicateRegistry::new();
        let state = state_with_child();

        let milestones = AchievementRequirement::new(RequirementKind::MilestoneCount, 4.0, "")
            .evaluate(&state, &registry);
        assert_eq!(milestones.current_value, 1.0);
        assert_eq!(milestones.progress, 25.0);

        let bond = AchievementRequirement::new(RequirementKind::FamilyStat(FamilyStat::BondQuality), 80.0, "")
            .evaluate(&state, &registry);
        assert!(bond.is_completed);
    }

    #[test]
    fn test_builtin_predicates() {
        let registry = PredicateRegistry::with_builtins();
        let mut state = state_with_child();
        state.add_child(ChildCharacter::new("Leo").with_age(20));
        state.add_child(ChildCharacter::new("Ivy").with_age(2));

        assert_eq!(registry.evaluate(CHILDREN_UNDER_18, &state), Some(2.0));

        state.record_decision(TimelineEntry::new(3, "tantrum", "Listen calmly and offer a hug"));
        state.record_decision(TimelineEntry::new(4, "homework", "Do it for them"));
        state.record_decision(TimelineEntry::new(5, "recital", "ENCOURAGE them to keep going"));
        assert_eq!(registry.evaluate(SUPPORTIVE_CHOICES, &state), Some(2.0));

        assert_eq!(registry.evaluate("unregistered", &state), None);
    }

    #[test]
    fn test_register_custom_predicate() {
        let mut registry = PredicateRegistry::new();
        assert!(!registry.contains("timeline_length"));
        registry.register("timeline_length", |state| state.timeline.len() as f64);

        let mut state = GameState::default();
        state.record_decision(TimelineEntry::new(0, "birth", "Welcome home"));
        let eval = AchievementRequirement::custom("timeline_length", 2.0, "")
            .evaluate(&state, &registry);
        assert_eq!(eval.progress, 50.0);
    }

    #[test]
    fn test_zero_threshold() {
        let registry = PredicateRegistry::new();
        let state = GameState::default();
        let eval = AchievementRequirement::new(RequirementKind::AgeReached, 0.0, "")
            .evaluate(&state, &registry);
        assert!(eval.is_completed);
        assert_eq!(eval.progress, 100.0);
    }

    #[test]
    fn test_target_keys_are_distinct() {
        let keys = [
            RequirementKind::TraitLevel { trait_id: "creativity".into() }.target_key(),
            RequirementKind::SkillLevel { skill_id: "creativity".into() }.target_key(),
            RequirementKind::FamilyStat(FamilyStat::Happiness).target_key(),
            RequirementKind::Custom(CHILDREN_UNDER_18.into()).target_key(),
        ];
        let unique: std::collections::HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }
}
