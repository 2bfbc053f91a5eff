pub mod chain;
pub mod check;
pub mod contest;
pub mod coop;
pub mod extended;
pub mod roll;

use std::path::{Path, PathBuf};

use colored::{ColoredString, Colorize};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use rr_mechanics::{CharacterSheet, MechanicsConfig, RollResult, SkillOutcome};

/// Flags shared by every command.
pub struct GlobalOpts {
    pub config: Option<PathBuf>,
    pub seed: Option<u64>,
    pub json: bool,
}

impl GlobalOpts {
    /// Seeded from `--seed` when given, otherwise from OS entropy.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Rng for one attempt on a stored chain.
    ///
    /// With `--seed` the stream is derived from the seed, the chain id and
    /// the attempt number, so a rerun reproduces every roll while each step
    /// and retry still rolls fresh dice.
    pub fn attempt_rng(&self, key: &str, attempt: usize) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(mix_seed(seed, key, attempt as u64)),
            None => StdRng::from_os_rng(),
        }
    }

    /// Config from `--config`, or the defaults.
    pub fn mechanics_config(&self) -> Result<MechanicsConfig, String> {
        match &self.config {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading mechanics config");
                MechanicsConfig::from_path(path).map_err(|e| e.to_string())
            }
            None => Ok(MechanicsConfig::default()),
        }
    }
}

/// FNV-1a over the key and attempt, starting from the user seed.
fn mix_seed(seed: u64, key: &str, attempt: u64) -> u64 {
    key.bytes()
        .chain(attempt.to_le_bytes())
        .fold(seed ^ 0xcbf2_9ce4_8422_2325, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
        })
}

/// Read and parse a JSON file, naming the file in any error.
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid JSON in {}: {e}", path.display()))
}

pub fn load_party(path: &Path) -> Result<Vec<CharacterSheet>, String> {
    let party: Vec<CharacterSheet> = read_json(path)?;
    if party.is_empty() {
        return Err(format!("party file {} is empty", path.display()));
    }
    Ok(party)
}

pub fn find_member<'a>(party: &'a [CharacterSheet], id: &str) -> Result<&'a CharacterSheet, String> {
    party
        .iter()
        .find(|c| c.id.eq_ignore_ascii_case(id))
        .ok_or_else(|| format!("character not found in party: \"{id}\""))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

pub fn colorize_outcome(outcome: SkillOutcome) -> ColoredString {
    let text = outcome.to_string();
    match outcome {
        SkillOutcome::CriticalFailure => text.red().bold(),
        SkillOutcome::Failure => text.red(),
        SkillOutcome::MarginalSuccess => text.yellow(),
        SkillOutcome::FullSuccess => text.green(),
        SkillOutcome::ExceptionalSuccess => text.green().bold(),
        SkillOutcome::CriticalSuccess => text.cyan().bold(),
    }
}

/// Faces with successes and botches highlighted.
pub fn render_faces(roll: &RollResult) -> String {
    let faces: Vec<String> = roll
        .faces()
        .iter()
        .map(|&f| {
            let s = f.to_string();
            if f >= rr_mechanics::dice::SUCCESS_THRESHOLD {
                s.green().bold().to_string()
            } else if f == rr_mechanics::dice::BOTCH_FACE {
                s.red().to_string()
            } else {
                s.dimmed().to_string()
            }
        })
        .collect();
    format!("[{}]", faces.join(", "))
}

/// `3S - 1B = 2 net`
pub fn render_counts(roll: &RollResult) -> String {
    format!(
        "{}S - {}B = {} net",
        roll.total_successes(),
        roll.total_botches(),
        roll.net_successes()
    )
}
