use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use rr_mechanics::{CooperationType, CooperativeResolver, Participant, SkillActor};

use super::GlobalOpts;

pub fn run(
    opts: &GlobalOpts,
    party_path: &Path,
    skill: &str,
    dc: i32,
    mode: &str,
) -> Result<(), String> {
    let cooperation = CooperationType::from_str_tag(mode).ok_or_else(|| {
        format!(
            "unknown cooperation mode: \"{mode}\" (expected weakest-link, best-attempt, combined or assisted)"
        )
    })?;
    let config = opts.mechanics_config()?;
    let party = super::load_party(party_path)?;
    let participants: Vec<Participant<'_>> = party
        .iter()
        .map(|c| Participant::new(c as &dyn SkillActor))
        .collect();

    let result = CooperativeResolver::new(&config)
        .resolve(&participants, skill, dc, cooperation, &mut opts.rng())
        .map_err(|e| e.to_string())?;

    if opts.json {
        return super::print_json(&result);
    }

    println!(
        "  {} {} {}",
        cooperation.to_string().bold(),
        skill.bold(),
        format!("(DC {dc}, {} participants)", result.participant_ids.len()).dimmed()
    );
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if result.helper_contributions.is_empty() {
        table.set_header(vec!["Roller", "Pool", "Faces", "Net"]);
        let rollers = rollers_for(&result);
        for (id, check) in rollers.iter().zip(&result.individual_results) {
            table.add_row(vec![
                id.clone(),
                format!("{}d10", check.pool_size),
                format!("{:?}", check.roll.faces()),
                check.net_successes.to_string(),
            ]);
        }
    } else {
        table.set_header(vec!["Helper", "Net", "Bonus die"]);
        for help in &result.helper_contributions {
            table.add_row(vec![
                help.helper_id.clone(),
                help.net_successes.to_string(),
                if help.granted_bonus { "yes" } else { "no" }.to_string(),
            ]);
        }
    }
    println!("{table}");
    println!();

    if let Some(roller) = &result.active_roller_id {
        println!("  active roller: {roller}");
    }
    let assisted_primary = result
        .individual_results
        .first()
        .filter(|_| result.cooperation_type == CooperationType::Assisted);
    if let Some(check) = assisted_primary {
        println!(
            "  primary roll:  {}d10 {}",
            check.pool_size,
            super::render_counts(&check.roll)
        );
    }
    println!(
        "  contributors:  {}",
        if result.contributing_participants.is_empty() {
            "none".to_string()
        } else {
            result.contributing_participants.join(", ")
        }
    );
    println!(
        "  net {} vs DC {} (margin {:+}): {}",
        result.net_successes,
        result.difficulty_class,
        result.margin(),
        super::colorize_outcome(result.outcome)
    );
    Ok(())
}

/// Who made each of the individual rolls, in order.
fn rollers_for(result: &rr_mechanics::CooperativeCheckResult) -> Vec<String> {
    match result.cooperation_type {
        CooperationType::BestAttempt | CooperationType::Combined => result.participant_ids.clone(),
        CooperationType::WeakestLink | CooperationType::Assisted => {
            result.active_roller_id.iter().cloned().collect()
        }
    }
}
