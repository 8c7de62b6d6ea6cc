// --- File: balance.rs ---
// Runs many seeded worlds in parallel to see how stable the default tuning is.
use clap::Parser;
use ecobox::constants::FIXED_TIMESTEP_MS;
use ecobox::{ExtinctionState, SimulationConfig, World};
use rayon::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "balance")]
#[command(about = "Run independent seeded worlds and report which population collapses first")]
struct Args {
    /// Number of worlds to run
    #[arg(short, long, default_value = "32")]
    worlds: u64,

    /// First seed; world i uses seed + i
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Fixed steps per world
    #[arg(short = 'n', long, default_value = "36000")]
    steps: u64,

    /// JSON config file
    #[arg(short, long)]
    config: Option<String>,
}

#[derive(Debug, Clone, Copy)]
struct Outcome {
    seed: u64,
    steps: u64,
    extinction: ExtinctionState,
    plants: usize,
    rabbits: usize,
    crocodiles: usize,
}

fn run_world(config: SimulationConfig, seed: u64, steps: u64) -> Result<Outcome, ecobox::ConfigError> {
    let mut world = World::with_seed(config, seed)?;
    for _ in 0..steps {
        world.advance(f64::from(FIXED_TIMESTEP_MS));
        if world.is_ended() {
            break;
        }
    }
    Ok(Outcome {
        seed,
        steps: world.stats().steps,
        extinction: world.extinction(),
        plants: world.plants().len(),
        rabbits: world.herbivores().len(),
        crocodiles: world.predators().len(),
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => SimulationConfig::from_json_file(path)?,
        None => SimulationConfig::default(),
    };

    let outcomes: Vec<Outcome> = (0..args.worlds)
        .into_par_iter()
        .map(|i| run_world(config.clone(), args.seed + i, args.steps))
        .collect::<Result<_, _>>()?;

    let mut survived = 0;
    let mut first = [0usize; 3];
    for outcome in &outcomes {
        let e = outcome.extinction;
        if !e.any() {
            survived += 1;
        }
        for (slot, gone) in first.iter_mut().zip([e.no_plants, e.no_herbivores, e.no_predators]) {
            if gone {
                *slot += 1;
            }
        }
        println!(
            "seed {:>4}: {:>6} steps | plants {:>3} rabbits {:>3} crocodiles {:>3}{}",
            outcome.seed,
            outcome.steps,
            outcome.plants,
            outcome.rabbits,
            outcome.crocodiles,
            if e.any() { " | collapsed" } else { "" },
        );
    }

    println!(
        "Survived {}/{} | plants died out {} | rabbits {} | crocodiles {}",
        survived,
        outcomes.len(),
        first[0],
        first[1],
        first[2]
    );
    Ok(())
}
