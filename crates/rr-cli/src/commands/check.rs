use colored::Colorize;

use rr_mechanics::{
    Advantage, CheckRequest, SituationalModifier, SkillCheckResult, SkillContext, perform_check,
};

use super::GlobalOpts;

pub struct CheckArgs {
    pub skill: String,
    pub pool: i32,
    pub attr: i32,
    pub dc: i32,
    pub dice_mod: i32,
    pub dc_mod: i32,
    pub advantage: bool,
    pub disadvantage: bool,
}

pub fn run(opts: &GlobalOpts, args: &CheckArgs) -> Result<(), String> {
    let mut context = SkillContext::new();
    if args.dice_mod != 0 || args.dc_mod != 0 {
        context = context.with_situational(SituationalModifier::new(
            "cli",
            "Command-line modifiers",
            args.dice_mod,
            args.dc_mod,
            "rr check",
        ));
    }
    let advantage = if args.advantage {
        Advantage::Advantage
    } else if args.disadvantage {
        Advantage::Disadvantage
    } else {
        Advantage::Normal
    };

    let request = CheckRequest {
        skill_id: args.skill.clone(),
        base_pool: args.pool,
        attribute_dice: args.attr,
        context,
        difficulty_class: args.dc,
        advantage,
    };
    let result = perform_check(&request, &mut opts.rng());

    if opts.json {
        return super::print_json(&result);
    }
    print_result(&result);
    Ok(())
}

pub fn print_result(result: &SkillCheckResult) {
    println!(
        "  {} {}",
        result.skill_id.bold(),
        format!("({}d10 vs DC {})", result.pool_size, result.difficulty_class).dimmed()
    );
    println!(
        "  roll:    {}  {}",
        super::render_faces(&result.roll),
        super::render_counts(&result.roll)
    );
    if let Some(discarded) = &result.discarded_roll {
        println!(
            "  {}",
            format!("discard: {}", super::render_counts(discarded)).dimmed()
        );
    }
    println!("  margin:  {:+}", result.margin);
    println!("  outcome: {}", super::colorize_outcome(result.outcome));
}
