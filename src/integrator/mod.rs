//! Stochastic integrators.
//!
//! An integrator advances the system by one fixed time step: it asks the
//! potential layer for fresh forces and torques, applies the deterministic
//! and stochastic increments to every particle in its target group, and
//! re-applies the manifold constraint so nothing drifts off the surface.
//! Integration is explicit first order (Euler-Maruyama); there are no
//! implicit solves and no step-size adaptation.
//!
//! Each integrator owns its random number generator, seeded from its own
//! configuration. Identical seeds and identical parameters reproduce
//! bit-identical trajectories.

use crate::config::IntegratorConfig;
use crate::constraint::Constraint;
use crate::error::{Result, SimulationError};
use crate::math::Scalar;
use crate::neighbor_list::NeighborList;
use crate::potential::Potential;
use crate::system::System;
use tracing::warn;

pub mod brownian;
pub mod brownian_align;
pub mod registry;

pub use brownian::Brownian;
pub use brownian_align::BrownianAlign;
pub use registry::IntegratorRegistry;

pub trait Integrator: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Advance the target group by one time step. Forces and torques are
    /// recomputed internally; the neighbor list is read as-is, staleness is
    /// the driver's concern.
    fn integrate(
        &mut self,
        system: &mut System,
        potential: &mut Potential,
        nlist: &NeighborList,
        constraint: &dyn Constraint,
    ) -> Result<()>;
}

/// Parameters shared by the Brownian integrator family, resolved from the
/// configuration with the documented defaults. Each substituted default is
/// logged as a warning so silent misconfiguration cannot happen.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BrownianParams {
    pub dt: Scalar,
    /// Magnitude of the active (self-propulsion) velocity.
    pub v0: Scalar,
    /// Translational mobility.
    pub mu: Scalar,
    /// Rotational mobility.
    pub mur: Scalar,
    /// Stochastic coefficient `sqrt(nu * dt)` for the orientational noise.
    pub stoch_coeff: Scalar,
    pub nematic: bool,
    /// Per-step director flip probability `dt / tau`, nematic mode only.
    pub flip_prob: Scalar,
}

impl BrownianParams {
    pub fn from_config(name: &str, config: &IntegratorConfig, dt: Scalar) -> Result<Self> {
        if dt <= 0.0 || !dt.is_finite() {
            return Err(SimulationError::config(format!(
                "{name} integrator: time step must be positive and finite, got {dt}"
            )));
        }
        let v0 = config.v0.unwrap_or_else(|| {
            warn!("{name} integrator: active velocity v0 not specified, using default 1.");
            1.0
        });
        let nu = config.nu.unwrap_or_else(|| {
            warn!("{name} integrator: rotational diffusion rate not set, using default 1.");
            1.0
        });
        if nu < 0.0 {
            return Err(SimulationError::config(format!(
                "{name} integrator: rotational diffusion rate must be non-negative, got {nu}"
            )));
        }
        let mu = config.mu.unwrap_or_else(|| {
            warn!("{name} integrator: mobility not set, using default 1.");
            1.0
        });
        let mur = config.mur.unwrap_or_else(|| {
            warn!("{name} integrator: rotational mobility not set, using default 1.");
            1.0
        });
        let flip_prob = if config.nematic {
            let tau = config.tau.unwrap_or_else(|| {
                warn!("{name} integrator: nematic system with no flip time scale, assuming 1.");
                1.0
            });
            if tau <= 0.0 {
                return Err(SimulationError::config(format!(
                    "{name} integrator: flip time scale must be positive, got {tau}"
                )));
            }
            dt / tau
        } else {
            0.0
        };
        Ok(Self {
            dt,
            v0,
            mu,
            mur,
            stoch_coeff: (nu * dt).sqrt(),
            nematic: config.nematic,
            flip_prob,
        })
    }
}

/// Seed resolution shared by the family: the original engine falls back to a
/// fixed seed, not to entropy, so unseeded runs stay reproducible.
pub(crate) fn resolve_seed(name: &str, config: &IntegratorConfig) -> u64 {
    config.seed.unwrap_or_else(|| {
        warn!("{name} integrator: no random seed specified, using default 0.");
        0
    })
}
