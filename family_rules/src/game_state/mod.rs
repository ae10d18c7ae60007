//! Game state management - the root aggregate of one playthrough.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::achievement_state::AchievementLedger;
use crate::entities::{
    ChildCharacter, ChildId, ParentCharacter, RELATIONSHIP_RANGE, SKILL_LEVEL_RANGE, TRAIT_RANGE,
};
use crate::mechanics::{GamePhase, GameStyle, RelationType};

/// Inclusive happiness bounds.
pub const HAPPINESS_RANGE: (i32, i32) = (0, 100);

/// Finances never drop below this.
pub const FINANCES_FLOOR: i64 = -100_000;

/// Highest in-game age a state may carry.
pub const MAX_GAME_AGE: u32 = 120;

/// Age at which a child counts as grown up.
pub const ADULT_AGE: u32 = 18;

/// Structural problems that make a state unfit to persist.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StateValidationError {
    #[error("happiness {0} is outside 0-100")]
    HappinessOutOfRange(i32),

    #[error("finances {0} are below the floor of -100000")]
    FinancesBelowFloor(i64),

    #[error("current age {0} exceeds 120")]
    AgeOutOfRange(u32),

    #[error("parent name is empty")]
    MissingParentName,

    #[error("parent financial level {0} is outside 1-10")]
    FinancialLevelOutOfRange(u8),

    #[error("child {child} has trait '{trait_id}' with value {value} outside 0-100")]
    TraitOutOfRange {
        child: String,
        trait_id: String,
        value: f64,
    },

    #[error("child {child} has {relation:?} relationship {metric} of {value}, outside 0-100")]
    RelationshipOutOfRange {
        child: String,
        relation: RelationType,
        metric: &'static str,
        value: f64,
    },

    #[error("child {child} has skill '{skill_id}' at level {level} outside 1-10")]
    SkillOutOfRange {
        child: String,
        skill_id: String,
        level: u8,
    },
}

/// One decision the player made, in the order it was made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub age: u32,
    pub scenario_id: String,
    pub choice_text: String,
    pub happiness_delta: i32,
    pub finances_delta: i64,
    pub recorded_at: DateTime<Utc>,
}

impl TimelineEntry {
    /// Create an entry with no stat effects.
    pub fn new(age: u32, scenario_id: impl Into<String>, choice_text: impl Into<String>) -> Self {
        Self {
            age,
            scenario_id: scenario_id.into(),
            choice_text: choice_text.into(),
            happiness_delta: 0,
            finances_delta: 0,
            recorded_at: Utc::now(),
        }
    }

    /// Set the stat effects of this choice.
    pub fn with_effects(mut self, happiness_delta: i32, finances_delta: i64) -> Self {
        self.happiness_delta = happiness_delta;
        self.finances_delta = finances_delta;
        self
    }
}

/// The complete state of one playthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub current_age: u32,
    /// Family happiness, 0-100.
    pub happiness: i32,
    /// Household money; bounded below by [`FINANCES_FLOOR`].
    pub finances: i64,
    pub phase: GamePhase,
    pub game_style: GameStyle,
    pub parent: ParentCharacter,

    /// Append-only decision log.
    pub timeline: Vec<TimelineEntry>,

    pub children: HashMap<ChildId, ChildCharacter>,

    /// Key into `children`; a dangling id behaves like no active child.
    pub active_child_id: Option<ChildId>,

    /// Created lazily by [`GameState::ensure_achievements`].
    #[serde(default)]
    pub achievements: Option<AchievementLedger>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            current_age: 0,
            happiness: 50,
            finances: 0,
            phase: GamePhase::Setup,
            game_style: GameStyle::Realistic,
            parent: ParentCharacter::default(),
            timeline: Vec::new(),
            children: HashMap::new(),
            active_child_id: None,
            achievements: None,
        }
    }
}

impl GameState {
    /// Create a fresh state for a new game.
    pub fn new(parent: ParentCharacter, game_style: GameStyle) -> Self {
        Self {
            parent,
            game_style,
            ..Default::default()
        }
    }

    /// Add a child; the first child added becomes the active one.
    pub fn add_child(&mut self, child: ChildCharacter) -> ChildId {
        let id = child.id;
        self.children.insert(id, child);
        if self.active_child_id.is_none() {
            self.active_child_id = Some(id);
        }
        id
    }

    /// Switch the active child. Unknown ids are rejected.
    pub fn set_active_child(&mut self, id: ChildId) -> bool {
        if self.children.contains_key(&id) {
            self.active_child_id = Some(id);
            true
        } else {
            false
        }
    }

    /// The active child, if there is one and it still exists.
    pub fn active_child(&self) -> Option<&ChildCharacter> {
        self.active_child_id.and_then(|id| self.children.get(&id))
    }

    /// Mutable access to the active child.
    pub fn active_child_mut(&mut self) -> Option<&mut ChildCharacter> {
        match self.active_child_id {
            Some(id) => self.children.get_mut(&id),
            None => None,
        }
    }

    /// Number of children younger than `age`.
    pub fn children_under(&self, age: u32) -> usize {
        self.children.values().filter(|c| c.age < age).count()
    }

    /// Append a decision and apply its effects, clamping to the legal ranges.
    pub fn record_decision(&mut self, entry: TimelineEntry) {
        self.happiness = self
            .happiness
            .saturating_add(entry.happiness_delta)
            .clamp(HAPPINESS_RANGE.0, HAPPINESS_RANGE.1);
        self.finances = self
            .finances
            .saturating_add(entry.finances_delta)
            .max(FINANCES_FLOOR);
        self.timeline.push(entry);
    }

    /// Make sure the achievement ledger exists. Existing data is left alone,
    /// so this is safe to call after every load.
    pub fn ensure_achievements(&mut self) -> &mut AchievementLedger {
        self.achievements.get_or_insert_with(AchievementLedger::new)
    }

    /// Check the structural rules a state must satisfy before it is persisted.
    pub fn validate(&self) -> Result<(), StateValidationError> {
        if !(HAPPINESS_RANGE.0..=HAPPINESS_RANGE.1).contains(&self.happiness) {
            return Err(StateValidationError::HappinessOutOfRange(self.happiness));
        }
        if self.finances < FINANCES_FLOOR {
            return Err(StateValidationError::FinancesBelowFloor(self.finances));
        }
        if self.current_age > MAX_GAME_AGE {
            return Err(StateValidationError::AgeOutOfRange(self.current_age));
        }
        if self.parent.name.trim().is_empty() {
            return Err(StateValidationError::MissingParentName);
        }
        if !(1..=10).contains(&self.parent.financial_level) {
            return Err(StateValidationError::FinancialLevelOutOfRange(
                self.parent.financial_level,
            ));
        }

        for child in self.children.values() {
            for t in &child.personality_traits {
                if !in_range(t.value, TRAIT_RANGE) {
                    return Err(StateValidationError::TraitOutOfRange {
                        child: child.name.clone(),
                        trait_id: t.id.clone(),
                        value: t.value,
                    });
                }
            }
            for (relation, metrics) in &child.relationships {
                for (metric, value) in [
                    ("quality", metrics.quality),
                    ("trust", metrics.trust),
                    ("communication", metrics.communication),
                ] {
                    if !in_range(value, RELATIONSHIP_RANGE) {
                        return Err(StateValidationError::RelationshipOutOfRange {
                            child: child.name.clone(),
                            relation: *relation,
                            metric,
                            value,
                        });
                    }
                }
            }
            for s in &child.skills {
                if !(SKILL_LEVEL_RANGE.0..=SKILL_LEVEL_RANGE.1).contains(&s.level) {
                    return Err(StateValidationError::SkillOutOfRange {
                        child: child.name.clone(),
                        skill_id: s.id.clone(),
                        level: s.level,
                    });
                }
            }
        }

        Ok(())
    }
}

fn in_range(value: f64, (low, high): (f64, f64)) -> bool {
    value.is_finite() && value >= low && value <= high
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{PersonalityTrait, RelationshipMetrics, Skill};
    use crate::mechanics::{SkillCategory, TraitCategory};

    #[test]
    fn test_first_child_becomes_active() {
        let mut state = GameState::default();
        assert!(state.active_child().is_none());

        let first = state.add_child(ChildCharacter::new("Maya"));
        state.add_child(ChildCharacter::new("Leo"));

        assert_eq!(state.active_child_id, Some(first));
        assert_eq!(state.active_child().unwrap().name, "Maya");
    }

    #[test]
    fn test_dangling_active_child_is_none() {
        let mut state = GameState::default();
        state.active_child_id = Some(ChildId::new());
        assert!(state.active_child().is_none());
        assert!(state.active_child_mut().is_none());
        assert!(!state.set_active_child(ChildId::new()));
    }

    #[test]
    fn test_record_decision_clamps() {
        let mut state = GameState::default();
        state.record_decision(TimelineEntry::new(1, "daycare", "Stay home").with_effects(80, -150_000));

        assert_eq!(state.happiness, 100);
        assert_eq!(state.finances, FINANCES_FLOOR);
        assert_eq!(state.timeline.len(), 1);

        state.record_decision(TimelineEntry::new(2, "tantrum", "Yell back").with_effects(-500, 0));
        assert_eq!(state.happiness, 0);
        assert_eq!(state.timeline.len(), 2);
    }

    #[test]
    fn test_ensure_achievements_keeps_existing() {
        let mut state = GameState::default();
        assert!(state.achievements.is_none());

        state.ensure_achievements().award_badge("storyteller");
        state.ensure_achievements();

        assert!(state.achievements.as_ref().unwrap().has_badge("storyteller"));
    }

    #[test]
    fn test_children_under() {
        let mut state = GameState::default();
        state.add_child(ChildCharacter::new("Teen").with_age(17));
        state.add_child(ChildCharacter::new("Adult").with_age(19));
        state.add_child(ChildCharacter::new("Baby"));

        assert_eq!(state.children_under(ADULT_AGE), 2);
    }

    #[test]
    fn test_validate() {
        let mut state = GameState::default();
        assert!(state.validate().is_ok());

        state.happiness = 101;
        assert_eq!(
            state.validate(),
            Err(StateValidationError::HappinessOutOfRange(101))
        );
        state.happiness = 50;

        state.finances = FINANCES_FLOOR - 1;
        assert!(matches!(
            state.validate(),
            Err(StateValidationError::FinancesBelowFloor(_))
        ));
        state.finances = 0;

        state.parent.name = "  ".to_string();
        assert_eq!(state.validate(), Err(StateValidationError::MissingParentName));
        state.parent.name = "Sam".to_string();

        state.add_child(
            ChildCharacter::new("Maya")
                .with_trait(PersonalityTrait::new("creativity", TraitCategory::Creative, 150.0)),
        );
        assert!(matches!(
            state.validate(),
            Err(StateValidationError::TraitOutOfRange { .. })
        ));

        let mut state = GameState::default();
        state.add_child(
            ChildCharacter::new("Leo").with_skill(Skill::new("chess", SkillCategory::Academic, 0)),
        );
        assert!(matches!(
            state.validate(),
            Err(StateValidationError::SkillOutOfRange { level: 0, .. })
        ));
    }

    #[test]
    fn test_validate_relationship_metrics() {
        let mut state = GameState::default();
        state.add_child(ChildCharacter::new("Maya").with_relationship(
            RelationType::Parent,
            RelationshipMetrics {
                quality: f64::NAN,
                ..RelationshipMetrics::default()
            },
        ));
        assert!(matches!(
            state.validate(),
            Err(StateValidationError::RelationshipOutOfRange {
                relation: RelationType::Parent,
                metric: "quality",
                ..
            })
        ));

        let mut state = GameState::default();
        state.add_child(ChildCharacter::new("Leo").with_relationship(
            RelationType::Friend,
            RelationshipMetrics {
                trust: 120.0,
                ..RelationshipMetrics::default()
            },
        ));
        assert!(matches!(
            state.validate(),
            Err(StateValidationError::RelationshipOutOfRange { metric: "trust", .. })
        ));

        let mut state = GameState::default();
        state.add_child(ChildCharacter::new("Ivy").with_relationship(
            RelationType::Sibling,
            RelationshipMetrics {
                communication: f64::INFINITY,
                ..RelationshipMetrics::default()
            },
        ));
        assert!(state.validate().is_err());

        let mut state = GameState::default();
        state.add_child(
            ChildCharacter::new("Sol")
                .with_relationship(RelationType::Teacher, RelationshipMetrics::default()),
        );
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_serde_round_trip() {
        let mut state = GameState::new(ParentCharacter::new("Sam"), GameStyle::Whimsical);
        state.add_child(
            ChildCharacter::new("Maya")
                .with_trait(PersonalityTrait::new("creativity", TraitCategory::Creative, 95.0)),
        );
        state.record_decision(TimelineEntry::new(0, "naming", "Pick a family name"));
        state.ensure_achievements();

        let json = serde_json::to_string(&state).unwrap();
        let restored: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
    }
}
