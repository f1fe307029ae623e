//! Brownian dynamics for self-propelled particles.
//!
//! Each step, for every particle in the target group: the director may flip
//! by 180 degrees in nematic mode, torques and forces are recomputed, the
//! orientation advances by `dt * mur * projected_torque` plus Gaussian noise
//! scaled by `sqrt(nu * dt)`, and the position advances with the active
//! velocity `v0 * director` plus the mobility-scaled tangential force. The
//! constraint is re-enforced afterward so drift off the surface never
//! compounds across steps.

use crate::config::IntegratorConfig;
use crate::constraint::Constraint;
use crate::error::Result;
use crate::integrator::{BrownianParams, Integrator, resolve_seed};
use crate::math::Scalar;
use crate::neighbor_list::NeighborList;
use crate::potential::Potential;
use crate::rng::SimRng;
use crate::system::System;

#[derive(Debug)]
pub struct Brownian {
    params: BrownianParams,
    group: String,
    rng: SimRng,
}

impl Brownian {
    pub fn new(config: &IntegratorConfig, dt: Scalar) -> Result<Self> {
        let params = BrownianParams::from_config("brownian", config, dt)?;
        let rng = SimRng::from_seed(resolve_seed("brownian", config));
        Ok(Self {
            params,
            group: config.group.clone(),
            rng,
        })
    }
}

pub(super) fn factory(config: &IntegratorConfig, dt: Scalar) -> Result<Box<dyn Integrator>> {
    Ok(Box::new(Brownian::new(config, dt)?))
}

impl Integrator for Brownian {
    fn name(&self) -> &'static str {
        "brownian"
    }

    fn integrate(
        &mut self,
        system: &mut System,
        potential: &mut Potential,
        nlist: &NeighborList,
        constraint: &dyn Constraint,
    ) -> Result<()> {
        let ids: Vec<usize> = system.group(&self.group)?.to_vec();

        if self.params.nematic {
            for &id in &ids {
                if self.rng.uniform() < self.params.flip_prob {
                    if let Some(p) = system.by_id_mut(id) {
                        p.director = -p.director;
                    }
                }
            }
        }

        // Flips feed into alignment torques, so evaluation comes after them.
        potential.compute(system, nlist)?;

        let sim_box = *system.sim_box();
        for &id in &ids {
            let Some(idx) = system.index_of(id) else {
                continue;
            };
            let omega = self.params.mur * constraint.project_torque(system.get(idx));
            let dtheta = self.params.dt * omega + self.params.stoch_coeff * self.rng.gauss(1.0);
            system.get_mut(idx).omega = omega;
            constraint.rotate_director(system.get_mut(idx), dtheta);

            let tangential_force = constraint.project_force(system.get(idx));
            let p = system.get_mut(idx);
            p.vel = self.params.v0 * p.director + self.params.mu * tangential_force;
            p.pos += self.params.dt * p.vel;
            p.age += self.params.dt;
            constraint.enforce(p);
            sim_box.wrap(&mut p.pos);
        }
        Ok(())
    }
}
