//! Building blocks of a child: traits, skills, relationships, milestones.

use serde::{Deserialize, Serialize};

use crate::mechanics::{SkillCategory, TraitCategory};

/// Lowest and highest value a personality trait normally takes.
pub const TRAIT_RANGE: (f64, f64) = (0.0, 100.0);

/// Lowest and highest value of each relationship metric.
pub const RELATIONSHIP_RANGE: (f64, f64) = (0.0, 100.0);

/// Lowest and highest skill level.
pub const SKILL_LEVEL_RANGE: (u8, u8) = (1, 10);

/// A personality trait such as "creativity" or "empathy".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityTrait {
    pub id: String,
    pub category: TraitCategory,
    /// Usually within 0-100.
    pub value: f64,
}

impl PersonalityTrait {
    pub fn new(id: impl Into<String>, category: TraitCategory, value: f64) -> Self {
        Self {
            id: id.into(),
            category,
            value,
        }
    }
}

/// A learned skill with an integer level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub category: SkillCategory,
    /// Usually within 1-10.
    pub level: u8,
}

impl Skill {
    pub fn new(id: impl Into<String>, category: SkillCategory, level: u8) -> Self {
        Self {
            id: id.into(),
            category,
            level,
        }
    }
}

/// Health of one relationship, each metric 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelationshipMetrics {
    pub quality: f64,
    pub trust: f64,
    pub communication: f64,
}

impl Default for RelationshipMetrics {
    fn default() -> Self {
        Self {
            quality: 50.0,
            trust: 50.0,
            communication: 50.0,
        }
    }
}

/// A developmental milestone, e.g. "first_words" at age 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub age: u32,
    pub achieved: bool,
}

impl Milestone {
    pub fn new(id: impl Into<String>, age: u32) -> Self {
        Self {
            id: id.into(),
            age,
            achieved: false,
        }
    }

    /// Same milestone, already reached.
    pub fn achieved(mut self) -> Self {
        self.achieved = true;
        self
    }
}

/// One line of a child's development log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevelopmentRecord {
    pub age: u32,
    pub description: String,
}
