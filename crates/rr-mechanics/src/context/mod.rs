//! Skill contexts: the modifiers surrounding a single check.
//!
//! A [`SkillContext`] groups modifiers by where they come from (equipment,
//! the situation, the environment, the target) and reduces them to two
//! numbers: a dice delta and a difficulty delta. Contexts are values;
//! the `with_*` methods return a new context and leave the caller's copy
//! untouched.

pub mod modifier;

pub use modifier::{
    EnvironmentModifier, EquipmentModifier, Modifier, SituationalModifier, TargetModifier,
};

use serde::{Deserialize, Serialize};

/// All modifiers that apply to one check. The default context is the identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillContext {
    /// Modifiers from gear.
    pub equipment: Vec<EquipmentModifier>,
    /// Modifiers from circumstances.
    pub situational: Vec<SituationalModifier>,
    /// Modifiers from the surroundings.
    pub environment: Vec<EnvironmentModifier>,
    /// Modifiers from the target.
    pub target: Vec<TargetModifier>,
    /// Status effects in play, kept for narration only.
    pub applied_statuses: Vec<String>,
}

impl SkillContext {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy with an equipment modifier appended.
    pub fn with_equipment(mut self, modifier: EquipmentModifier) -> Self {
        self.equipment.push(modifier);
        self
    }

    /// Return a copy with a situational modifier appended.
    pub fn with_situational(mut self, modifier: SituationalModifier) -> Self {
        self.situational.push(modifier);
        self
    }

    /// Return a copy with an environment modifier appended.
    pub fn with_environment(mut self, modifier: EnvironmentModifier) -> Self {
        self.environment.push(modifier);
        self
    }

    /// Return a copy with a target modifier appended.
    pub fn with_target(mut self, modifier: TargetModifier) -> Self {
        self.target.push(modifier);
        self
    }

    /// Return a copy with a status name recorded.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.applied_statuses.push(status.into());
        self
    }

    /// Every modifier in the context, category by category.
    pub fn modifiers(&self) -> impl Iterator<Item = &dyn Modifier> {
        self.equipment
            .iter()
            .map(|m| m as &dyn Modifier)
            .chain(self.situational.iter().map(|m| m as &dyn Modifier))
            .chain(self.environment.iter().map(|m| m as &dyn Modifier))
            .chain(self.target.iter().map(|m| m as &dyn Modifier))
    }

    /// Net dice added to the pool across all categories.
    pub fn total_dice_modifier(&self) -> i32 {
        self.modifiers()
            .fold(0, |total: i32, m| total.saturating_add(m.dice_modifier()))
    }

    /// Net change to the difficulty class across all categories.
    pub fn total_dc_modifier(&self) -> i32 {
        self.modifiers()
            .fold(0, |total: i32, m| total.saturating_add(m.dc_modifier()))
    }

    /// Returns true if any modifier is present.
    pub fn has_modifiers(&self) -> bool {
        self.modifiers().next().is_some()
    }

    /// One line per modifier, for logs and narration.
    pub fn describe(&self) -> String {
        self.modifiers()
            .map(|m| format!("  {}", m.describe()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl std::fmt::Display for SkillContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:+}d10, DC {:+}",
            self.total_dice_modifier(),
            self.total_dc_modifier()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_context() -> SkillContext {
        SkillContext::new()
            .with_equipment(EquipmentModifier::tool("picks", "Fine Lockpicks", 2))
            .with_environment(EnvironmentModifier::new("glitch", "Glitched", 0, 2))
            .with_target(TargetModifier::new("lock-1", "Jammed", 0, 2))
            .with_situational(SituationalModifier::new(
                "haste",
                "Hurried",
                -1,
                0,
                "guards approaching",
            ))
    }

    #[test]
    fn empty_context_is_identity() {
        let ctx = SkillContext::default();
        assert_eq!(ctx.total_dice_modifier(), 0);
        assert_eq!(ctx.total_dc_modifier(), 0);
        assert!(!ctx.has_modifiers());
        assert_eq!(ctx.describe(), "");
    }

    #[test]
    fn totals_sum_all_categories() {
        let ctx = lock_context();
        assert_eq!(ctx.total_dice_modifier(), 1);
        assert_eq!(ctx.total_dc_modifier(), 4);
        assert!(ctx.has_modifiers());
    }

    #[test]
    fn appending_leaves_original_untouched() {
        let original = lock_context();
        let assisted = original
            .clone()
            .with_situational(SituationalModifier::assisted(2, "party members"));
        assert_eq!(original.total_dice_modifier(), 1);
        assert_eq!(assisted.total_dice_modifier(), 3);
        assert_eq!(original.situational.len(), 1);
        assert_eq!(assisted.situational.len(), 2);
    }

    #[test]
    fn statuses_do_not_modify_totals() {
        let ctx = SkillContext::new().with_status("Bleeding");
        assert_eq!(ctx.total_dice_modifier(), 0);
        assert!(!ctx.has_modifiers());
        assert_eq!(ctx.applied_statuses, vec!["Bleeding".to_string()]);
    }

    #[test]
    fn describe_lists_each_modifier() {
        let text = lock_context().describe();
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("Fine Lockpicks (+2d10)"));
        assert!(text.contains("Hurried (-1d10)"));
    }

    #[test]
    fn totals_saturate() {
        let ctx = SkillContext::new()
            .with_equipment(EquipmentModifier::tool("a", "Huge", i32::MAX))
            .with_equipment(EquipmentModifier::tool("b", "Huger", 10));
        assert_eq!(ctx.total_dice_modifier(), i32::MAX);
    }

    #[test]
    fn display_shows_totals() {
        assert_eq!(lock_context().to_string(), "+1d10, DC +4");
    }

    #[test]
    fn partial_json_uses_defaults() {
        let ctx: SkillContext = serde_json::from_str(
            r#"{"target": [{"target_id": "t", "name": "Warded", "dice_modifier": 0, "dc_modifier": 3}]}"#,
        )
        .unwrap();
        assert_eq!(ctx.total_dc_modifier(), 3);
        assert!(ctx.equipment.is_empty());
    }
}
