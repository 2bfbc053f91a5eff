//! Individual modifier sources that make up a [`SkillContext`](super::SkillContext).

use serde::{Deserialize, Serialize};

/// Anything that shifts a check's dice pool or difficulty.
pub trait Modifier {
    /// Display name of the modifier.
    fn name(&self) -> &str;
    /// Dice added to (or removed from) the pool.
    fn dice_modifier(&self) -> i32;
    /// Amount added to (or removed from) the difficulty class.
    fn dc_modifier(&self) -> i32;

    /// One-line summary like `Lockpicks (+1d10)` or `Rain (DC +4)`.
    fn describe(&self) -> String {
        let mut parts = Vec::new();
        if self.dice_modifier() != 0 {
            parts.push(format!("{:+}d10", self.dice_modifier()));
        }
        if self.dc_modifier() != 0 {
            parts.push(format!("DC {:+}", self.dc_modifier()));
        }
        if parts.is_empty() {
            self.name().to_string()
        } else {
            format!("{} ({})", self.name(), parts.join(", "))
        }
    }
}

/// A modifier granted by carried or worn equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentModifier {
    /// Equipment identifier.
    pub equipment_id: String,
    /// Display name.
    pub equipment_name: String,
    /// Dice delta.
    pub dice_modifier: i32,
    /// DC delta.
    pub dc_modifier: i32,
}

impl EquipmentModifier {
    /// A tool that adds dice to the pool.
    pub fn tool(id: impl Into<String>, name: impl Into<String>, dice: i32) -> Self {
        Self {
            equipment_id: id.into(),
            equipment_name: name.into(),
            dice_modifier: dice,
            dc_modifier: 0,
        }
    }
}

impl Modifier for EquipmentModifier {
    fn name(&self) -> &str {
        &self.equipment_name
    }
    fn dice_modifier(&self) -> i32 {
        self.dice_modifier
    }
    fn dc_modifier(&self) -> i32 {
        self.dc_modifier
    }
}

/// A modifier arising from circumstances: help, haste, a blood trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SituationalModifier {
    /// Modifier identifier.
    pub modifier_id: String,
    /// Display name.
    pub name: String,
    /// Dice delta.
    pub dice_modifier: i32,
    /// DC delta.
    pub dc_modifier: i32,
    /// Where the modifier comes from.
    pub source: String,
    /// Optional narrative description.
    #[serde(default)]
    pub description: Option<String>,
}

impl SituationalModifier {
    /// Create a single-check situational modifier.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        dice: i32,
        dc: i32,
        source: impl Into<String>,
    ) -> Self {
        Self {
            modifier_id: id.into(),
            name: name.into(),
            dice_modifier: dice,
            dc_modifier: dc,
            source: source.into(),
            description: None,
        }
    }

    /// Bonus dice granted by helpers on an assisted check.
    pub fn assisted(bonus_dice: i32, source: impl Into<String>) -> Self {
        let source = source.into();
        Self {
            description: Some(format!("Assisted by {source}")),
            ..Self::new("assisted", "Assisted", bonus_dice, 0, source)
        }
    }
}

impl Modifier for SituationalModifier {
    fn name(&self) -> &str {
        &self.name
    }
    fn dice_modifier(&self) -> i32 {
        self.dice_modifier
    }
    fn dc_modifier(&self) -> i32 {
        self.dc_modifier
    }
}

/// A modifier from the surroundings: darkness, corruption, weather.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentModifier {
    /// Modifier identifier.
    pub modifier_id: String,
    /// Display name.
    pub name: String,
    /// Dice delta.
    pub dice_modifier: i32,
    /// DC delta.
    pub dc_modifier: i32,
    /// Optional narrative description.
    #[serde(default)]
    pub description: Option<String>,
}

impl EnvironmentModifier {
    /// Create an environment modifier.
    pub fn new(id: impl Into<String>, name: impl Into<String>, dice: i32, dc: i32) -> Self {
        Self {
            modifier_id: id.into(),
            name: name.into(),
            dice_modifier: dice,
            dc_modifier: dc,
            description: None,
        }
    }
}

impl Modifier for EnvironmentModifier {
    fn name(&self) -> &str {
        &self.name
    }
    fn dice_modifier(&self) -> i32 {
        self.dice_modifier
    }
    fn dc_modifier(&self) -> i32 {
        self.dc_modifier
    }
}

/// A modifier contributed by the target of the check (a lock, a terminal, a foe).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetModifier {
    /// Target identifier.
    pub target_id: String,
    /// Display name.
    pub name: String,
    /// Dice delta.
    pub dice_modifier: i32,
    /// DC delta.
    pub dc_modifier: i32,
    /// Optional narrative description.
    #[serde(default)]
    pub description: Option<String>,
}

impl TargetModifier {
    /// Create a target modifier.
    pub fn new(target_id: impl Into<String>, name: impl Into<String>, dice: i32, dc: i32) -> Self {
        Self {
            target_id: target_id.into(),
            name: name.into(),
            dice_modifier: dice,
            dc_modifier: dc,
            description: None,
        }
    }
}

impl Modifier for TargetModifier {
    fn name(&self) -> &str {
        &self.name
    }
    fn dice_modifier(&self) -> i32 {
        self.dice_modifier
    }
    fn dc_modifier(&self) -> i32 {
        self.dc_modifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_shows_nonzero_parts() {
        let tool = EquipmentModifier::tool("picks", "Lockpicks", 1);
        assert_eq!(tool.describe(), "Lockpicks (+1d10)");

        let rain = SituationalModifier::new("rain", "Recent Rain", 0, 4, "weather");
        assert_eq!(rain.describe(), "Recent Rain (DC +4)");

        let dark = EnvironmentModifier::new("dark", "Darkness", -2, 1);
        assert_eq!(dark.describe(), "Darkness (-2d10, DC +1)");

        let flat = TargetModifier::new("door", "Plain Door", 0, 0);
        assert_eq!(flat.describe(), "Plain Door");
    }

    #[test]
    fn assisted_factory() {
        let m = SituationalModifier::assisted(2, "party members");
        assert_eq!(m.modifier_id, "assisted");
        assert_eq!(m.dice_modifier, 2);
        assert_eq!(m.dc_modifier, 0);
        assert_eq!(m.source, "party members");
        assert_eq!(m.description.as_deref(), Some("Assisted by party members"));
    }

    #[test]
    fn situational_deserializes_with_defaults() {
        let json = r#"{
            "modifier_id": "haste",
            "name": "Hasty",
            "dice_modifier": -1,
            "dc_modifier": 0,
            "source": "rushing"
        }"#;
        let m: SituationalModifier = serde_json::from_str(json).unwrap();
        assert_eq!(m.dice_modifier, -1);
        assert_eq!(m.description, None);
    }
}
