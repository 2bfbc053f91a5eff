//! Skill-check resolution engine for Rune & Rust.
//!
//! Characters roll pools of ten-sided dice: every 8, 9 or 10 is a success,
//! every 1 is a botch, and net successes are measured against a difficulty
//! class to land in one of six outcome tiers. On top of that primitive the
//! crate builds cooperative checks (four ways for a party to pool effort),
//! chained checks (multi-step procedures with per-step retry budgets),
//! contested checks and extended checks.
//!
//! All randomness is injected: pass any [`rand::Rng`], typically a seeded
//! `StdRng`, and identical seeds replay identical rolls.

pub mod chain;
pub mod config;
pub mod contested;
pub mod context;
pub mod cooperative;
pub mod dice;
pub mod error;
pub mod extended;
pub mod resolution;
pub mod sheet;

pub use chain::{
    ChainRepository, ChainStatus, ChainStep, ChainedCheckProcessResult, ChainedCheckService,
    ChainedCheckState, InMemoryChainRepository, sort_oldest_first,
};
pub use config::{ExtendedCheckConfig, MechanicsConfig};
pub use contested::{ContestSide, ContestedCheckResult, ContestedOutcome, resolve_contested};
pub use context::{
    EnvironmentModifier, EquipmentModifier, Modifier, SituationalModifier, SkillContext,
    TargetModifier,
};
pub use cooperative::{
    CooperationType, CooperativeCheckResult, CooperativeResolver, HelperContribution, Participant,
};
pub use dice::{Advantage, DicePool, RollResult};
pub use error::{MechError, MechResult};
pub use extended::{ExtendedCheckState, ExtendedStatus, perform_round};
pub use resolution::{CheckRequest, SkillCheckResult, SkillOutcome, perform_check};
pub use sheet::{CharacterSheet, Proficiency, SkillActor};
