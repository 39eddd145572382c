use std::time::Instant;

use anyhow::Result;
use rewrite_sim::prelude::*;

fn main() -> Result<()> {
    env_logger::init();
    let start = Instant::now();

    let sim = SimulationBuilder::new()
        .honest_miners(6)
        .attackers_iter([1, 3, 6, 9])
        .rounds(300)
        .attack_at_round(100)
        .target_depth(1)
        .names(vec!["Alice".to_string(), "Bob".to_string(), "Carol".to_string()])
        .repeat_all(50)
        .build()?;

    let results = sim
        .run_all()
        .average(Average::Mean)
        .all()
        .format(Format::PrettyPrint)
        .build();

    println!("{}", results);
    println!("Elapsed time: {:.4} secs", start.elapsed().as_secs_f64());

    Ok(())
}
