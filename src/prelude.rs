//! surface-swarm prelude module
//!
//! Re-exports the most commonly used types and traits to reduce import
//! boilerplate.

// External crate re-exports
pub use rand::Rng;

pub use crate::config::SimulationConfig;
pub use crate::constraint::{Constraint, ConstraintRegistry, Plane, Sphere};
pub use crate::error::{Result, SimulationError};
pub use crate::integrator::{Brownian, BrownianAlign, Integrator, IntegratorRegistry};
pub use crate::math::{Scalar, Vector};
pub use crate::neighbor_list::NeighborList;
pub use crate::particle::Particle;
pub use crate::population::PopulationRandom;
pub use crate::potential::{
    ExternalParamSpec, ExternalPotential, PairParamSpec, PairPotential, Potential,
    PotentialRegistry,
};
pub use crate::rng::SimRng;
pub use crate::sim_box::SimBox;
pub use crate::simulation::{ComponentBuilder, RunStats, Simulation, SimulationBuilder};
pub use crate::system::{GROUP_ALL, System};
