use std::path::{Path, PathBuf};

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use rr_mechanics::{ChainStatus, ChainStep, ChainedCheckService, ChainedCheckState, SkillContext};

use super::GlobalOpts;
use crate::store::JsonChainStore;

pub struct StepArgs {
    pub id: String,
    pub party: PathBuf,
    pub actor: Option<String>,
    pub context: Option<PathBuf>,
    pub retry: bool,
}

fn open_service(store: &Path) -> Result<ChainedCheckService<JsonChainStore>, String> {
    let store = JsonChainStore::open(store).map_err(|e| e.to_string())?;
    Ok(ChainedCheckService::new(store))
}

pub fn start(
    opts: &GlobalOpts,
    store: &Path,
    character: &str,
    name: &str,
    steps_path: &Path,
    target: Option<String>,
) -> Result<(), String> {
    let steps: Vec<ChainStep> = super::read_json(steps_path)?;
    let mut service = open_service(store)?;
    let state = service
        .start(character, name, steps, target)
        .map_err(|e| e.to_string())?;

    if opts.json {
        return super::print_json(&state);
    }
    println!(
        "  {} {} {}",
        "Started".green().bold(),
        state.chain_name.bold(),
        format!("({} steps)", state.total_steps()).dimmed()
    );
    println!("  id: {}", state.id);
    Ok(())
}

pub fn step(opts: &GlobalOpts, store: &Path, args: &StepArgs) -> Result<(), String> {
    let party = super::load_party(&args.party)?;
    let context_override: Option<SkillContext> = match &args.context {
        Some(path) => Some(super::read_json(path)?),
        None => None,
    };

    let mut service = open_service(store)?;
    let chain = service
        .get(&args.id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("chain {} not found", args.id))?;
    let actor_id = args.actor.as_deref().unwrap_or(&chain.character_id);
    let actor = super::find_member(&party, actor_id)?;

    let mut rng = opts.attempt_rng(&chain.id, chain.history.len());
    let result = if args.retry {
        service.retry_step(actor, &args.id, context_override.as_ref(), &mut rng)
    } else {
        service.process_step(actor, &args.id, context_override.as_ref(), &mut rng)
    }
    .map_err(|e| e.to_string())?;

    if opts.json {
        return super::print_json(&result);
    }

    let step_index = result.state.history.last().map_or(0, |a| a.step_index);
    let step = result
        .state
        .steps
        .get(step_index)
        .ok_or("chain has no steps")?;
    println!(
        "  {} {}{}",
        step.name.bold(),
        format!("({}, DC {})", step.skill_id, result.step_result.difficulty_class).dimmed(),
        if result.was_retry { " [retry]" } else { "" }
    );
    super::check::print_result(&result.step_result);
    println!();
    println!("  {}", result.message);
    println!("  status: {}", colorize_status(result.state.status));
    Ok(())
}

pub fn abandon(opts: &GlobalOpts, store: &Path, id: &str) -> Result<(), String> {
    let mut service = open_service(store)?;
    let state = service.abandon(id).map_err(|e| e.to_string())?;
    if opts.json {
        return super::print_json(&state);
    }
    println!("  {} {}", "Abandoned".yellow().bold(), state.chain_name);
    Ok(())
}

pub fn show(opts: &GlobalOpts, store: &Path, id: &str) -> Result<(), String> {
    let service = open_service(store)?;
    let state = service
        .get(id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("chain {id} not found"))?;
    if opts.json {
        return super::print_json(&state);
    }
    print_chain(&state);
    Ok(())
}

pub fn list(opts: &GlobalOpts, store: &Path, character: &str) -> Result<(), String> {
    let service = open_service(store)?;
    let chains = service
        .active_for_character(character)
        .map_err(|e| e.to_string())?;
    if opts.json {
        return super::print_json(&chains);
    }
    if chains.is_empty() {
        println!("  No active chains.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Name", "Step", "Status"]);
    for chain in &chains {
        table.add_row(vec![
            chain.id.clone(),
            chain.chain_name.clone(),
            format!("{}/{}", chain.current_step_index + 1, chain.total_steps()),
            chain.status.to_string(),
        ]);
    }
    println!("{table}");
    println!();
    println!("  {} active chains", chains.len());
    Ok(())
}

fn print_chain(state: &ChainedCheckState) {
    println!(
        "  {} [{}]",
        state.chain_name.bold(),
        colorize_status(state.status)
    );
    println!("  {}", state.id.dimmed());
    println!("  character: {}", state.character_id);
    if let Some(target) = &state.target_id {
        println!("  target:    {target}");
    }
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Step", "Skill", "DC", "Retries left", ""]);
    for (i, step) in state.steps.iter().enumerate() {
        let marker = if i == state.current_step_index && state.is_active() {
            "<-"
        } else {
            ""
        };
        table.add_row(vec![
            (i + 1).to_string(),
            step.name.clone(),
            step.skill_id.clone(),
            step.difficulty_class.to_string(),
            format!(
                "{}/{}",
                state.retries_remaining.get(i).copied().unwrap_or(0),
                step.max_retries
            ),
            marker.to_string(),
        ]);
    }
    println!("{table}");

    if !state.history.is_empty() {
        println!();
        println!("  {}", "History".bold().underline());
        for attempt in &state.history {
            let name = state
                .steps
                .get(attempt.step_index)
                .map(|s| s.name.as_str())
                .unwrap_or("?");
            println!(
                "  {} {name}: {} ({} net){}",
                format!("[{}]", attempt.at.format("%H:%M:%S")).dimmed(),
                super::colorize_outcome(attempt.outcome),
                attempt.net_successes,
                if attempt.was_retry { " [retry]" } else { "" }
            );
        }
    }
}

fn colorize_status(status: ChainStatus) -> colored::ColoredString {
    let text = status.to_string();
    match status {
        ChainStatus::InProgress => text.normal(),
        ChainStatus::AwaitingRetry => text.yellow(),
        ChainStatus::Succeeded => text.green().bold(),
        ChainStatus::Failed => text.red().bold(),
        ChainStatus::Abandoned => text.dimmed(),
    }
}
