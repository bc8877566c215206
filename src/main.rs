/*
 * Shoal - Headless Runner
 *
 * Spawns an aquarium population and steps the flocking simulation at a fixed
 * timestep, reporting throughput and collision statistics through tracing.
 */

use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use shoal::{AgentRegistry, AquariumConfig, Result, StatsAccumulator};

#[derive(Parser, Debug)]
#[command(name = "shoal", about = "Run the fish schooling simulation without a renderer")]
struct Args {
    /// TOML scenario file; built-in aquarium when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ticks to run (overrides the config)
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Fixed timestep in seconds (overrides the config)
    #[arg(long)]
    dt: Option<f32>,

    /// Random seed (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Run the force pass on a single thread
    #[arg(long)]
    sequential: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "shoal=info")]
    log_level: String,

    /// Ticks between progress reports
    #[arg(long, default_value_t = 600)]
    report_every: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing for logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &args.config {
        Some(path) => AquariumConfig::load(path)?,
        None => AquariumConfig::default(),
    };
    if let Some(ticks) = args.ticks {
        config.ticks = ticks;
    }
    if let Some(dt) = args.dt {
        config.timestep = dt;
    }
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if args.sequential {
        config.simulation.parallel = false;
    }
    config.validate()?;

    let mut registry = AgentRegistry::new(config.tank.swimmable_area()?, config.simulation)?;
    for template in &config.species {
        registry.add_species(template.clone())?;
    }
    for entry in &config.spawn {
        if let Err(err) = registry.spawn(&entry.species, entry.count, None) {
            warn!(species = %entry.species, %err, "skipping spawn entry");
        }
    }

    info!(
        agents = registry.len(),
        ticks = config.ticks,
        dt = config.timestep,
        parallel = config.simulation.parallel,
        "starting simulation"
    );
    for (species, count) in registry.species_counts() {
        info!(%species, count, "population");
    }

    let report_every = args.report_every.max(1);
    let mut window = StatsAccumulator::default();
    let mut overall = StatsAccumulator::default();

    for tick in 1..=config.ticks {
        let stats = registry.update(config.timestep);
        window.record(&stats);
        overall.record(&stats);

        if tick % report_every == 0 {
            let mean_speed = if registry.is_empty() {
                0.0
            } else {
                registry.agents().iter().map(|a| a.speed()).sum::<f32>() / registry.len() as f32
            };
            info!(
                tick,
                sim_time = tick as f32 * config.timestep,
                mean_speed,
                contacts = window.contacts,
                degenerate = window.degenerate_contacts,
                max_overlap = registry.max_overlap(),
                mean_tick_us = window.mean_tick_time().as_micros() as u64,
                "progress"
            );
            window.reset();
        }
    }

    info!(
        ticks = overall.ticks,
        contacts = overall.contacts,
        max_overlap = registry.max_overlap(),
        mean_tick_us = overall.mean_tick_time().as_micros() as u64,
        "simulation finished"
    );

    Ok(())
}
