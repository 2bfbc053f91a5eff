use rr_mechanics::DicePool;

use super::GlobalOpts;

pub fn run(opts: &GlobalOpts, pool: i32) -> Result<(), String> {
    let pool = DicePool::new(pool);
    let roll = pool.roll(&mut opts.rng());

    if opts.json {
        return super::print_json(&serde_json::json!({
            "pool": pool.size(),
            "faces": roll.faces(),
            "successes": roll.total_successes(),
            "botches": roll.total_botches(),
            "net_successes": roll.net_successes(),
        }));
    }

    println!("  {pool}: {}", super::render_faces(&roll));
    println!("  {}", super::render_counts(&roll));
    Ok(())
}
