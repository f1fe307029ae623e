//! Command line interface for surface-swarm.

use clap::Parser;

use crate::config::SimulationConfig;
use crate::error::{Result, SimulationError};
use crate::integrator::IntegratorRegistry;

/// surface-swarm - active particle dynamics on curved surfaces
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// Number of simulation steps (overrides config file)
    #[arg(short = 'n', long, value_name = "STEPS")]
    pub steps: Option<u64>,

    /// Integrator type (e.g., brownian, brownian_align)
    #[arg(short = 'i', long, value_name = "TYPE")]
    pub integrator: Option<String>,

    /// Random seed for the integrator (overrides config file)
    #[arg(short = 's', long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// List available integrators and exit
    #[arg(long)]
    pub list_integrators: bool,
}

/// Handles the --list-integrators flag by printing available integrators.
pub fn handle_list_integrators() {
    let registry = IntegratorRegistry::new().with_standard_integrators();
    println!("Available integrators:");
    for name in registry.list_available() {
        println!("  - {name}");
    }

    let aliases = registry.list_aliases();
    if !aliases.is_empty() {
        println!("\nAliases:");
        for (alias, target) in aliases {
            println!("  - {alias} -> {target}");
        }
    }
}

/// Loads configuration from file or defaults, then applies command-line
/// overrides.
pub fn load_and_apply_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = if let Some(config_path) = &args.config {
        println!("Loading configuration from: {config_path}");
        SimulationConfig::load_or_default(config_path)
    } else {
        SimulationConfig::default()
    };

    if let Some(steps) = args.steps {
        println!("Overriding step count to: {steps}");
        config.run.steps = steps;
    }

    if let Some(integrator_kind) = &args.integrator {
        let registry = IntegratorRegistry::new().with_standard_integrators();
        if !registry.list_available().iter().any(|n| n == integrator_kind)
            && !registry
                .list_aliases()
                .iter()
                .any(|(alias, _)| alias == integrator_kind)
        {
            return Err(SimulationError::config(format!(
                "unknown integrator '{}'. Available integrators: {}",
                integrator_kind,
                registry.list_available().join(", ")
            )));
        }
        println!("Using integrator: {integrator_kind}");
        config.integrator.kind = integrator_kind.clone();
    }

    if let Some(seed) = args.seed {
        println!("Using random seed: {seed}");
        config.integrator.seed = Some(seed);
    }

    Ok(config)
}
