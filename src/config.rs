//! TOML configuration for a simulation run.
//!
//! One aggregate with per-section structs, mirroring the construction order
//! of the engine: box, initial particles, constraint, neighbor list,
//! potentials, integrator, and the optional population module. Every section
//! has sensible defaults so a missing file still yields a runnable setup.

use crate::math::Scalar;
use crate::potential::{ExternalParamSpec, PairParamSpec};
use crate::sim_box::SimBox;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SimulationConfig {
    pub run: RunConfig,
    #[serde(rename = "box")]
    pub sim_box: BoxConfig,
    pub particles: ParticlesConfig,
    pub constraint: ConstraintConfig,
    pub neighbor_list: NeighborListConfig,
    pub integrator: IntegratorConfig,
    #[serde(default)]
    pub pair_potentials: Vec<PairPotentialConfig>,
    #[serde(default)]
    pub external_potentials: Vec<ExternalPotentialConfig>,
    #[serde(default)]
    pub population: Option<PopulationConfig>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RunConfig {
    pub steps: u64,
    pub dt: Scalar,
    /// Progress is printed every this many steps.
    pub print_every: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            steps: 1000,
            dt: 0.01,
            print_every: 100,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BoxConfig {
    pub lx: Scalar,
    pub ly: Scalar,
    pub lz: Scalar,
    pub periodic: bool,
}

impl BoxConfig {
    pub fn to_sim_box(&self) -> SimBox {
        SimBox::new(self.lx, self.ly, self.lz, self.periodic)
    }
}

impl Default for BoxConfig {
    fn default() -> Self {
        Self {
            lx: 50.0,
            ly: 50.0,
            lz: 50.0,
            periodic: false,
        }
    }
}

/// Initial random on-surface seeding.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ParticlesConfig {
    pub count: usize,
    pub radius: Scalar,
    pub type_id: usize,
    /// Seed for the placement generator; entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for ParticlesConfig {
    fn default() -> Self {
        Self {
            count: 100,
            radius: 1.0,
            type_id: 0,
            seed: Some(0),
        }
    }
}

/// Shape selection plus the parameters the shapes understand.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ConstraintConfig {
    pub kind: String,
    /// Sphere radius.
    pub radius: Option<Scalar>,
    /// Plane height along z.
    pub offset: Option<Scalar>,
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            kind: "sphere".to_string(),
            radius: Some(10.0),
            offset: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NeighborListConfig {
    /// Interaction cutoff; derived from the largest pair-potential cutoff
    /// when absent.
    pub cutoff: Option<Scalar>,
    pub padding: Scalar,
}

impl Default for NeighborListConfig {
    fn default() -> Self {
        Self {
            cutoff: None,
            padding: 0.5,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct IntegratorConfig {
    pub kind: String,
    /// Group of particles this integrator advances.
    pub group: String,
    pub v0: Option<Scalar>,
    /// Rotational diffusion rate.
    pub nu: Option<Scalar>,
    /// Translational mobility.
    pub mu: Option<Scalar>,
    /// Rotational mobility.
    pub mur: Option<Scalar>,
    pub seed: Option<u64>,
    #[serde(default)]
    pub nematic: bool,
    /// Director flip time scale for nematic order.
    pub tau: Option<Scalar>,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            kind: "brownian".to_string(),
            group: crate::system::GROUP_ALL.to_string(),
            v0: Some(1.0),
            nu: Some(1.0),
            mu: Some(1.0),
            mur: Some(1.0),
            seed: Some(0),
            nematic: false,
            tau: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PairPotentialConfig {
    pub kind: String,
    #[serde(flatten)]
    pub params: PairParamSpec,
    /// Per-type-pair overrides applied after registration.
    #[serde(default)]
    pub type_params: Vec<PairParamSpec>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ExternalPotentialConfig {
    pub kind: String,
    #[serde(flatten)]
    pub params: ExternalParamSpec,
    #[serde(default)]
    pub type_params: Vec<ExternalParamSpec>,
}

/// Random birth/death control.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PopulationConfig {
    pub group: String,
    /// Events are attempted every `freq` steps.
    pub freq: u64,
    pub division_rate: Scalar,
    pub death_rate: Scalar,
    /// Fraction of the parent radius the child is offset by along the
    /// director; the parent is pushed back by the remainder.
    pub alpha: Scalar,
    pub seed: Option<u64>,
    /// Probability of reassigning type/radius/group of the parent after a
    /// division.
    pub change_prob_parent: Scalar,
    /// Same, for the child.
    pub change_prob_child: Scalar,
    pub new_type: Option<usize>,
    pub new_radius: Option<Scalar>,
    pub old_group: Option<String>,
    pub new_group: Option<String>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            group: crate::system::GROUP_ALL.to_string(),
            freq: 100,
            division_rate: 0.1,
            death_rate: 0.1,
            alpha: 0.5,
            seed: Some(0),
            change_prob_parent: 0.0,
            change_prob_child: 0.0,
            new_type: None,
            new_radius: None,
            old_group: None,
            new_group: None,
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a file, falling back to defaults if the file
    /// doesn't exist.
    pub fn load_or_default(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to parse config file {}: {}. Using defaults.", path, e);
                    Self::default()
                }
            },
            Err(_) => {
                info!("Config file {} not found. Using defaults.", path);
                Self::default()
            }
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_toml() {
        let config = SimulationConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: SimulationConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.run.steps, config.run.steps);
        assert_eq!(parsed.constraint.kind, "sphere");
        assert_eq!(parsed.integrator.seed, Some(0));
        assert!(parsed.population.is_none());
    }

    #[test]
    fn test_parse_minimal_file() {
        let text = r#"
            [run]
            steps = 10
            dt = 0.001
            print_every = 5

            [box]
            lx = 20.0
            ly = 20.0
            lz = 20.0
            periodic = true

            [particles]
            count = 7
            radius = 0.5
            type_id = 1

            [constraint]
            kind = "plane"
            offset = 1.0

            [neighbor_list]
            padding = 0.3

            [integrator]
            kind = "brownian"
            group = "all"
            v0 = 0.5
            seed = 42

            [[pair_potentials]]
            kind = "soft"
            k = 10.0
            a = 2.0
        "#;
        let config: SimulationConfig = toml::from_str(text).unwrap();
        assert_eq!(config.run.steps, 10);
        assert!(config.sim_box.periodic);
        assert_eq!(config.constraint.kind, "plane");
        assert_eq!(config.constraint.offset, Some(1.0));
        assert_eq!(config.neighbor_list.cutoff, None);
        assert_eq!(config.integrator.v0, Some(0.5));
        assert_eq!(config.pair_potentials.len(), 1);
        assert_eq!(config.pair_potentials[0].params.k, Some(10.0));
    }

    #[test]
    fn test_population_section_is_optional() {
        let mut config = SimulationConfig::default();
        config.population = Some(PopulationConfig {
            freq: 50,
            division_rate: 0.2,
            ..Default::default()
        });
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: SimulationConfig = toml::from_str(&text).unwrap();
        let pop = parsed.population.unwrap();
        assert_eq!(pop.freq, 50);
        assert_eq!(pop.alpha, 0.5);
    }
}
