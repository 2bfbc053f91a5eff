use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use rr_mechanics::{Advantage, ExtendedCheckState, ExtendedStatus, perform_round};

use super::GlobalOpts;

pub fn run(
    opts: &GlobalOpts,
    party_path: &Path,
    actor_id: &str,
    skill: &str,
    target: u32,
    rounds: Option<u32>,
) -> Result<(), String> {
    let config = opts.mechanics_config()?;
    let party = super::load_party(party_path)?;
    let actor = super::find_member(&party, actor_id)?;
    let max_rounds = rounds.unwrap_or(config.extended.default_max_rounds);

    let mut state = ExtendedCheckState::new(&actor.id, skill, target, max_rounds)
        .map_err(|e| e.to_string())?;
    let mut rng = opts.rng();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Round", "Faces", "Net", "Fumble", "Total"]);

    while state.is_active() {
        let check = perform_round(
            &mut state,
            actor,
            None,
            Advantage::Normal,
            &config.extended,
            &mut rng,
        )
        .map_err(|e| e.to_string())?;
        table.add_row(vec![
            state.rounds_completed.to_string(),
            format!("{:?}", check.roll.faces()),
            check.net_successes.to_string(),
            if check.roll.is_fumble() { "yes" } else { "" }.to_string(),
            format!("{}/{}", state.accumulated_successes, state.target_successes),
        ]);
    }

    if opts.json {
        return super::print_json(&state);
    }

    println!(
        "  {} {} {}",
        "Extended".bold(),
        skill.bold(),
        format!(
            "({} needs {target} successes in {max_rounds} rounds)",
            actor.display_name()
        )
        .dimmed()
    );
    println!();
    println!("{table}");
    println!();

    let status = state.status.to_string();
    let status = match state.status {
        ExtendedStatus::Succeeded => status.green().bold(),
        ExtendedStatus::CatastrophicFailure => status.red().bold(),
        _ => status.red(),
    };
    println!(
        "  {status} after {} rounds ({} fumbles)",
        state.rounds_completed, state.total_fumbles
    );
    Ok(())
}
