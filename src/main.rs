// --- File: main.rs ---
// Headless driver: runs the world on a fixed timestep and prints a summary.
use clap::Parser;
use ecobox::constants::FIXED_TIMESTEP_MS;
use ecobox::resources::Resource;
use ecobox::{SimulationConfig, World};

#[derive(Parser, Debug)]
#[command(name = "ecobox")]
#[command(about = "Run the plant / rabbit / crocodile ecosystem without a window")]
struct Args {
    /// Random seed (uses entropy if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of fixed steps to run
    #[arg(short = 'n', long, default_value = "36000")]
    steps: u64,

    /// Length of one step in milliseconds
    #[arg(long, default_value_t = FIXED_TIMESTEP_MS as f64)]
    step_ms: f64,

    /// How many times to cycle the speed multiplier before starting
    #[arg(long, default_value = "0")]
    speed_presses: usize,

    /// JSON config file (defaults are used for missing fields)
    #[arg(short, long)]
    config: Option<String>,

    /// Write the effective config to this path and exit
    #[arg(long)]
    dump_config: Option<String>,

    /// Print a status line every this many steps (0 disables)
    #[arg(long, default_value = "600")]
    report_every: u64,
}

fn print_status(world: &World) {
    let scene = world.scene();
    println!(
        "[{}] {:<6} speed {}x | plants {:>3} rabbits {:>3} crocodiles {:>3} | leafium {} animite {} ecopoint {}{}",
        scene.hud.calendar,
        scene.hud.season,
        scene.hud.speed,
        world.plants().len(),
        world.herbivores().len(),
        world.predators().len(),
        world.ledger().get(Resource::Leafium),
        world.ledger().get(Resource::Animite),
        world.ledger().get(Resource::Ecopoint),
        if world.season().is_raining() { " | raining" } else { "" },
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimulationConfig::from_json_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(path) = &args.dump_config {
        config.save_json(path)?;
        println!("Config written to {}", path);
        return Ok(());
    }

    let mut world = match args.seed {
        Some(seed) => World::with_seed(config, seed)?,
        None => World::new(config)?,
    };
    for _ in 0..args.speed_presses {
        println!("Speed Multiplier: {}x", world.change_speed());
    }

    for step in 1..=args.steps {
        let report = world.advance(args.step_ms);
        if let Some(kind) = report.disaster {
            println!("Disaster: {}", kind.message());
        }
        for item in &report.crafted {
            println!("Crafted: {}", item.name());
        }
        if world.is_ended() {
            println!("Simulation ended at step {}", step);
            break;
        }
        if args.report_every > 0 && step % args.report_every == 0 {
            print_status(&world);
        }
    }

    print_status(&world);
    let extinction = world.extinction();
    if extinction.any() {
        let which = [
            (extinction.no_plants, "plants"),
            (extinction.no_herbivores, "rabbits"),
            (extinction.no_predators, "crocodiles"),
        ];
        for (gone, name) in which {
            if gone {
                println!("Extinct: {}", name);
            }
        }
    }
    let stats = world.stats();
    println!(
        "Steps {} | grown {} eaten {} | killed {} births {} old age {} | cures {} disasters {}",
        stats.steps,
        stats.plants_grown,
        stats.plants_eaten,
        stats.herbivores_killed,
        stats.births,
        stats.deaths_of_age,
        stats.cures,
        stats.disasters,
    );
    Ok(())
}
