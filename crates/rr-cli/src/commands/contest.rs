use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use rr_mechanics::{ContestSide, resolve_contested};

use super::GlobalOpts;

/// `initiator` and `defender` are `(character id, skill)` pairs.
pub fn run(
    opts: &GlobalOpts,
    party_path: &Path,
    initiator: (&str, &str),
    defender: (&str, &str),
) -> Result<(), String> {
    let party = super::load_party(party_path)?;
    let attacker = super::find_member(&party, initiator.0)?;
    let target = super::find_member(&party, defender.0)?;

    let result = resolve_contested(
        ContestSide::new(attacker, initiator.1),
        ContestSide::new(target, defender.1),
        &mut opts.rng(),
    );

    if opts.json {
        return super::print_json(&result);
    }

    println!(
        "  {} {} vs {}",
        "Contest".bold(),
        attacker.display_name(),
        target.display_name()
    );
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Side", "Character", "Skill", "Pool", "Faces", "Net"]);
    for (side, id, skill, check) in [
        (
            "initiator",
            &result.initiator_id,
            &result.initiator_skill,
            &result.initiator_result,
        ),
        (
            "defender",
            &result.defender_id,
            &result.defender_skill,
            &result.defender_result,
        ),
    ] {
        table.add_row(vec![
            side.to_string(),
            id.clone(),
            skill.clone(),
            format!("{}d10", check.pool_size),
            format!("{:?}", check.roll.faces()),
            check.net_successes.to_string(),
        ]);
    }
    println!("{table}");
    println!();

    let outcome = result.outcome.to_string();
    let outcome = if result.outcome.had_fumble() {
        outcome.red().bold()
    } else {
        outcome.bold()
    };
    println!("  outcome: {outcome} (margin {:+})", result.margin);
    match result.winner_id() {
        Some(winner) => println!("  winner:  {winner}"),
        None => println!("  winner:  {}", "none".dimmed()),
    }
    Ok(())
}
