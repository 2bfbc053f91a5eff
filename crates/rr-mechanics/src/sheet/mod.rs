//! Character sheets: skill proficiencies and attribute scores.
//!
//! The engine never owns characters. Anything that can answer "how trained
//! is this actor in this skill, and how strong is the governing attribute"
//! implements [`SkillActor`]; [`CharacterSheet`] is the stock implementation
//! used by the CLI and tests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Attribute consulted when a skill has no governing attribute set.
pub const DEFAULT_ATTRIBUTE: &str = "wits";

/// Attribute points per bonus die.
pub const ATTRIBUTE_DICE_DIVISOR: i32 = 2;

/// Training level in a skill. Each step adds one die to the pool.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Proficiency {
    /// No training.
    #[default]
    Untrained,
    /// Basic familiarity.
    Novice,
    /// Some practice.
    Apprentice,
    /// Competent professional.
    Journeyman,
    /// Recognised specialist.
    Expert,
    /// Peak of the craft.
    Master,
}

impl Proficiency {
    /// Dice contributed to the pool (0 for untrained through 5 for master).
    pub fn dice(self) -> i32 {
        self as i32
    }

    /// Parse from a level name or a number 0-5.
    pub fn from_str_tag(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "untrained" | "0" => Some(Self::Untrained),
            "novice" | "1" => Some(Self::Novice),
            "apprentice" | "2" => Some(Self::Apprentice),
            "journeyman" | "3" => Some(Self::Journeyman),
            "expert" | "4" => Some(Self::Expert),
            "master" | "5" => Some(Self::Master),
            _ => None,
        }
    }
}

impl std::fmt::Display for Proficiency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Untrained => write!(f, "Untrained"),
            Self::Novice => write!(f, "Novice"),
            Self::Apprentice => write!(f, "Apprentice"),
            Self::Journeyman => write!(f, "Journeyman"),
            Self::Expert => write!(f, "Expert"),
            Self::Master => write!(f, "Master"),
        }
    }
}

/// Anything that can make a skill check.
pub trait SkillActor {
    /// Stable identifier used in results.
    fn id(&self) -> &str;

    /// Training level in the given skill.
    fn proficiency(&self, skill_id: &str) -> Proficiency;

    /// Score of the attribute that governs the given skill.
    fn attribute(&self, skill_id: &str) -> i32;

    /// Dice from training.
    fn proficiency_dice(&self, skill_id: &str) -> i32 {
        self.proficiency(skill_id).dice()
    }

    /// Dice from the governing attribute (half the score, rounded toward zero).
    fn attribute_dice(&self, skill_id: &str) -> i32 {
        self.attribute(skill_id) / ATTRIBUTE_DICE_DIVISOR
    }
}

/// A character's skill-relevant numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSheet {
    /// Identifier used in check results.
    pub id: String,
    /// Display name; falls back to the id when empty.
    #[serde(default)]
    pub name: String,
    /// Proficiency per skill id. Missing skills are untrained.
    #[serde(default)]
    pub skills: HashMap<String, Proficiency>,
    /// Attribute scores (e.g. might, finesse, wits).
    #[serde(default)]
    pub attributes: HashMap<String, i32>,
    /// Which attribute governs each skill. Missing skills use wits.
    #[serde(default)]
    pub governing_attributes: HashMap<String, String>,
}

impl CharacterSheet {
    /// Create a sheet with no training and no attributes.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set a display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the proficiency for a skill.
    pub fn with_skill(mut self, skill_id: impl Into<String>, level: Proficiency) -> Self {
        self.skills.insert(skill_id.into(), level);
        self
    }

    /// Set an attribute score.
    pub fn with_attribute(mut self, attribute: impl Into<String>, score: i32) -> Self {
        self.attributes.insert(attribute.into(), score);
        self
    }

    /// Declare which attribute governs a skill.
    pub fn with_governing(
        mut self,
        skill_id: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        self.governing_attributes
            .insert(skill_id.into(), attribute.into());
        self
    }

    /// Display name, or the id when no name is set.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Load a party from a JSON array of sheets.
    pub fn party_from_json(json: &str) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The attribute name that governs a skill.
    pub fn governing_attribute(&self, skill_id: &str) -> &str {
        lookup(&self.governing_attributes, skill_id)
            .map(String::as_str)
            .unwrap_or(DEFAULT_ATTRIBUTE)
    }
}

impl SkillActor for CharacterSheet {
    fn id(&self) -> &str {
        &self.id
    }

    fn proficiency(&self, skill_id: &str) -> Proficiency {
        lookup(&self.skills, skill_id).copied().unwrap_or_default()
    }

    fn attribute(&self, skill_id: &str) -> i32 {
        let attribute = self.governing_attribute(skill_id);
        lookup(&self.attributes, attribute).copied().unwrap_or(0)
    }
}

/// Case-insensitive map lookup.
fn lookup<'a, V>(map: &'a HashMap<String, V>, key: &str) -> Option<&'a V> {
    map.get(key).or_else(|| {
        let lower = key.to_lowercase();
        map.iter()
            .find(|(k, _)| k.to_lowercase() == lower)
            .map(|(_, v)| v)
    })
}
