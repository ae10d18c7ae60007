//! Child and parent definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{
    ChildId, DevelopmentRecord, Milestone, PersonalityTrait, RelationshipMetrics, Skill,
};
use crate::mechanics::RelationType;

/// A child being raised in the playthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildCharacter {
    pub id: ChildId,
    pub name: String,
    pub age: u32,

    pub personality_traits: Vec<PersonalityTrait>,
    pub skills: Vec<Skill>,
    pub relationships: BTreeMap<RelationType, RelationshipMetrics>,
    pub milestones: Vec<Milestone>,

    /// Append-only.
    #[serde(default)]
    pub development_history: Vec<DevelopmentRecord>,
}

impl ChildCharacter {
    /// Create a newborn child with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ChildId::new(),
            name: name.into(),
            age: 0,
            personality_traits: Vec::new(),
            skills: Vec::new(),
            relationships: BTreeMap::new(),
            milestones: Vec::new(),
            development_history: Vec::new(),
        }
    }

    /// Set the age.
    pub fn with_age(mut self, age: u32) -> Self {
        self.age = age;
        self
    }

    /// Add or replace a trait.
    pub fn with_trait(mut self, personality_trait: PersonalityTrait) -> Self {
        self.set_trait(personality_trait);
        self
    }

    /// Add or replace a skill.
    pub fn with_skill(mut self, skill: Skill) -> Self {
        self.skills.retain(|s| s.id != skill.id);
        self.skills.push(skill);
        self
    }

    /// Add a milestone.
    pub fn with_milestone(mut self, milestone: Milestone) -> Self {
        self.milestones.push(milestone);
        self
    }

    /// Set the metrics for one relationship.
    pub fn with_relationship(mut self, relation: RelationType, metrics: RelationshipMetrics) -> Self {
        self.relationships.insert(relation, metrics);
        self
    }

    /// Add or replace a trait in place.
    pub fn set_trait(&mut self, personality_trait: PersonalityTrait) {
        match self
            .personality_traits
            .iter_mut()
            .find(|t| t.id == personality_trait.id)
        {
            Some(existing) => *existing = personality_trait,
            None => self.personality_traits.push(personality_trait),
        }
    }

    /// Value of a trait, if the child has it.
    pub fn trait_value(&self, trait_id: &str) -> Option<f64> {
        self.personality_traits
            .iter()
            .find(|t| t.id == trait_id)
            .map(|t| t.value)
    }

    /// Level of a skill, if the child has it.
    pub fn skill_level(&self, skill_id: &str) -> Option<u8> {
        self.skills
            .iter()
            .find(|s| s.id == skill_id)
            .map(|s| s.level)
    }

    /// Number of milestones already reached.
    pub fn achieved_milestones(&self) -> usize {
        self.milestones.iter().filter(|m| m.achieved).count()
    }

    /// Mean relationship quality, or `None` without relationships.
    pub fn average_relationship_quality(&self) -> Option<f64> {
        if self.relationships.is_empty() {
            return None;
        }
        let total: f64 = self.relationships.values().map(|r| r.quality).sum();
        Some(total / self.relationships.len() as f64)
    }

    /// Append a line to the development log.
    pub fn record_development(&mut self, description: impl Into<String>) {
        self.development_history.push(DevelopmentRecord {
            age: self.age,
            description: description.into(),
        });
    }
}

/// The player's own character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentCharacter {
    pub name: String,
    pub age: u32,
    /// Financial stability from 1 (struggling) to 10 (comfortable).
    pub financial_level: u8,
}

impl ParentCharacter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age: 30,
            financial_level: 5,
        }
    }
}

impl Default for ParentCharacter {
    fn default() -> Self {
        Self::new("Parent")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mechanics::{SkillCategory, TraitCategory};

    #[test]
    fn test_new_child() {
        let child = ChildCharacter::new("Maya");
        assert_eq!(child.name, "Maya");
        assert_eq!(child.age, 0);
        assert!(child.trait_value("creativity").is_none());
        assert_eq!(child.achieved_milestones(), 0);
    }

    #[test]
    fn test_trait_replacement() {
        let mut child = ChildCharacter::new("Maya")
            .with_trait(PersonalityTrait::new("creativity", TraitCategory::Creative, 40.0));
        child.set_trait(PersonalityTrait::new("creativity", TraitCategory::Creative, 70.0));

        assert_eq!(child.personality_traits.len(), 1);
        assert_eq!(child.trait_value("creativity"), Some(70.0));
    }

    #[test]
    fn test_skills_and_milestones() {
        let child = ChildCharacter::new("Leo")
            .with_skill(Skill::new("reading", SkillCategory::Academic, 3))
            .with_skill(Skill::new("reading", SkillCategory::Academic, 5))
            .with_milestone(Milestone::new("first_words", 1).achieved())
            .with_milestone(Milestone::new("first_steps", 1));

        assert_eq!(child.skill_level("reading"), Some(5));
        assert_eq!(child.achieved_milestones(), 1);
    }

    #[test]
    fn test_average_relationship_quality() {
        let child = ChildCharacter::new("Leo");
        assert!(child.average_relationship_quality().is_none());

        let child = child
            .with_relationship(
                RelationType::Parent,
                RelationshipMetrics {
                    quality: 80.0,
                    ..Default::default()
                },
            )
            .with_relationship(
                RelationType::Friend,
                RelationshipMetrics {
                    quality: 60.0,
                    ..Default::default()
                },
            );
        assert_eq!(child.average_relationship_quality(), Some(70.0));
    }

    #[test]
    fn test_development_history_appends() {
        let mut child = ChildCharacter::new("Leo").with_age(4);
        child.record_development("Started preschool");
        child.record_development("Made a best friend");

        assert_eq!(child.development_history.len(), 2);
        assert_eq!(child.development_history[0].age, 4);
        assert_eq!(child.development_history[1].description, "Made a best friend");
    }
}
