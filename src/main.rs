use clap::Parser;
use surface_swarm::cli::{Args, handle_list_integrators, load_and_apply_config};
use surface_swarm::simulation::Simulation;
use tracing::{error, info};

fn main() {
    let args = Args::parse();

    if args.list_integrators {
        handle_list_integrators();
        return;
    }

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();

    if let Err(e) = run(&args) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> surface_swarm::error::Result<()> {
    let config = load_and_apply_config(args)?;
    let mut simulation = Simulation::from_config(&config)?;
    info!(
        particles = simulation.system().size(),
        steps = config.run.steps,
        dt = config.run.dt,
        "simulation assembled"
    );
    let stats = simulation.run(config.run.steps)?;
    info!(
        builds = stats.builds,
        wall_seconds = format!("{:.2}", stats.wall_seconds),
        "run complete"
    );
    Ok(())
}
