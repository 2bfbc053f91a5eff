//! CLI frontend for the Rune & Rust skill-check engine.

mod commands;
mod store;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "rr",
    about = "Rune & Rust: d10 pool skill checks, party checks and chained procedures",
    version,
    propagate_version = true
)]
struct Cli {
    /// Mechanics config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// RNG seed for reproducible rolls (default: OS entropy)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Roll a pool of d10s and count successes and botches
    Roll {
        /// Number of dice (clamped to at least one)
        #[arg(allow_hyphen_values = true)]
        pool: i32,
    },

    /// Resolve a single skill check
    Check {
        /// Skill name shown in the result
        #[arg(short, long, default_value = "skill")]
        skill: String,

        /// Base dice from training
        #[arg(short, long, allow_hyphen_values = true)]
        pool: i32,

        /// Dice from the governing attribute
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        attr: i32,

        /// Difficulty class
        #[arg(short, long, allow_hyphen_values = true)]
        dc: i32,

        /// Extra dice from modifiers
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        dice_mod: i32,

        /// DC adjustment from modifiers
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        dc_mod: i32,

        /// Roll twice, keep the better result
        #[arg(long, conflicts_with = "disadvantage")]
        advantage: bool,

        /// Roll twice, keep the worse result
        #[arg(long)]
        disadvantage: bool,
    },

    /// Resolve a party check from a JSON party file
    Coop {
        /// Party file: JSON array of character sheets
        #[arg(short, long)]
        party: PathBuf,

        /// Skill being tested
        #[arg(short, long)]
        skill: String,

        /// Difficulty class
        #[arg(short, long, allow_hyphen_values = true)]
        dc: i32,

        /// weakest-link, best-attempt, combined or assisted
        #[arg(short, long, default_value = "weakest-link")]
        mode: String,
    },

    /// Roll a contest between two party members
    Contest {
        /// Party file: JSON array of character sheets
        #[arg(short, long)]
        party: PathBuf,

        /// Id of the initiating character
        #[arg(long)]
        initiator: String,

        /// Skill the initiator rolls
        #[arg(short, long)]
        skill: String,

        /// Id of the defending character
        #[arg(long)]
        defender: String,

        /// Skill the defender rolls (default: same as initiator)
        #[arg(long)]
        defender_skill: Option<String>,
    },

    /// Run an extended check to completion
    Extended {
        /// Party file: JSON array of character sheets
        #[arg(short, long)]
        party: PathBuf,

        /// Id of the character making the check
        #[arg(long)]
        actor: String,

        /// Skill rolled each round
        #[arg(short, long)]
        skill: String,

        /// Successes needed
        #[arg(short, long)]
        target: u32,

        /// Rounds allowed (default from config)
        #[arg(short, long)]
        rounds: Option<u32>,
    },

    /// Start and drive chained checks stored in a JSON file
    Chain {
        /// Chain store file
        #[arg(long, global = true, default_value = "chains.json")]
        store: PathBuf,

        #[command(subcommand)]
        action: ChainAction,
    },
}

#[derive(Subcommand)]
enum ChainAction {
    /// Start a new chain from a JSON array of steps
    Start {
        /// Character working the chain
        #[arg(short, long)]
        character: String,

        /// Chain name
        #[arg(short, long)]
        name: String,

        /// Steps file: JSON array of chain steps
        #[arg(long)]
        steps: PathBuf,

        /// What the chain is aimed at
        #[arg(long)]
        target: Option<String>,
    },

    /// Attempt the current step
    Step {
        /// Chain id
        id: String,

        /// Party file: JSON array of character sheets
        #[arg(short, long)]
        party: PathBuf,

        /// Character rolling (default: the chain's character)
        #[arg(long)]
        actor: Option<String>,

        /// Context file overriding the step's modifiers
        #[arg(long)]
        context: Option<PathBuf>,
    },

    /// Spend a retry on a failed step
    Retry {
        /// Chain id
        id: String,

        /// Party file: JSON array of character sheets
        #[arg(short, long)]
        party: PathBuf,

        /// Character rolling (default: the chain's character)
        #[arg(long)]
        actor: Option<String>,

        /// Context file overriding the step's modifiers
        #[arg(long)]
        context: Option<PathBuf>,
    },

    /// Give up on a chain
    Abandon {
        /// Chain id
        id: String,
    },

    /// Show a chain's state and history
    Show {
        /// Chain id
        id: String,
    },

    /// List a character's unfinished chains
    List {
        /// Character id
        #[arg(short, long)]
        character: String,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let opts = commands::GlobalOpts {
        config: cli.config,
        seed: cli.seed,
        json: cli.json,
    };

    let result = match cli.command {
        Commands::Roll { pool } => commands::roll::run(&opts, pool),
        Commands::Check {
            skill,
            pool,
            attr,
            dc,
            dice_mod,
            dc_mod,
            advantage,
            disadvantage,
        } => commands::check::run(
            &opts,
            &commands::check::CheckArgs {
                skill,
                pool,
                attr,
                dc,
                dice_mod,
                dc_mod,
                advantage,
                disadvantage,
            },
        ),
        Commands::Coop {
            party,
            skill,
            dc,
            mode,
        } => commands::coop::run(&opts, &party, &skill, dc, &mode),
        Commands::Contest {
            party,
            initiator,
            skill,
            defender,
            defender_skill,
        } => commands::contest::run(
            &opts,
            &party,
            (&initiator, &skill),
            (&defender, defender_skill.as_deref().unwrap_or(&skill)),
        ),
        Commands::Extended {
            party,
            actor,
            skill,
            target,
            rounds,
        } => commands::extended::run(&opts, &party, &actor, &skill, target, rounds),
        Commands::Chain { store, action } => match action {
            ChainAction::Start {
                character,
                name,
                steps,
                target,
            } => commands::chain::start(&opts, &store, &character, &name, &steps, target),
            ChainAction::Step {
                id,
                party,
                actor,
                context,
            } => commands::chain::step(
                &opts,
                &store,
                &commands::chain::StepArgs {
                    id,
                    party,
                    actor,
                    context,
                    retry: false,
                },
            ),
            ChainAction::Retry {
                id,
                party,
                actor,
                context,
            } => commands::chain::step(
                &opts,
                &store,
                &commands::chain::StepArgs {
                    id,
                    party,
                    actor,
                    context,
                    retry: true,
                },
            ),
            ChainAction::Abandon { id } => commands::chain::abandon(&opts, &store, &id),
            ChainAction::Show { id } => commands::chain::show(&opts, &store, &id),
            ChainAction::List { character } => commands::chain::list(&opts, &store, &character),
        },
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
