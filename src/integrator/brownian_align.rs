//! Orientation-only Brownian dynamics.
//!
//! Rotational counterpart of the full Brownian integrator: directors diffuse
//! and relax under alignment torques, but positions never move. Useful for
//! equilibrating orientations on a frozen configuration.

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
pub struct BrownianAlign {
    params: BrownianParams,
    group: String,
    rng: SimRng,
}

impl BrownianAlign {
    pub fn new(config: &IntegratorConfig, dt: Scalar) -> Result<Self> {
        let params = BrownianParams::from_config("brownian_align", config, dt)?;
        let rng = SimRng::from_seed(resolve_seed("brownian_align", config));
        Ok(Self {
            params,
            group: config.group.clone(),
            rng,
        })
    }
}

pub(super) fn factory(config: &IntegratorConfig, dt: Scalar) -> Result<Box<dyn Integrator>> {
    Ok(Box::new(BrownianAlign::new(config, dt)?))
}

impl Integrator for BrownianAlign {
    fn name(&self) -> &'static str {
        "brownian_align"
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

        potential.compute(system, nlist)?;

        for &id in &ids {
            let Some(idx) = system.index_of(id) else {
                continue;
            };
            let omega = self.params.mur * constraint.project_torque(system.get(idx));
            let dtheta = self.params.dt * omega + self.params.stoch_coeff * self.rng.gauss(1.0);
            system.get_mut(idx).omega = omega;
            constraint.rotate_director(system.get_mut(idx), dtheta);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Plane;
    use crate::math::Vector;
    use crate::particle::Particle;
    use crate::potential::{PairParamSpec, Potential, PotentialRegistry};
    use crate::sim_box::SimBox;

    fn aligner_setup() -> (System, NeighborList, Potential, Plane) {
        let mut sys = System::new(SimBox::cube(50.0, false));
        sys.add_particle(Particle::new(0, 0, 0.5).with_director(Vector::X));
        sys.add_particle(
            Particle::new(0, 0, 0.5)
                .with_pos(Vector::new(1.0, 0.0, 0.0))
                .with_director(Vector::new(1.0, 0.2, 0.0)),
        );
        let mut nlist = NeighborList::new(3.0, 0.5).unwrap();
        nlist.build(&sys);
        let registry = PotentialRegistry::default();
        let mut pot = Potential::new();
        pot.add_pair_potential(
            "polar_align",
            registry
                .create_pair("polar_align", &PairParamSpec {
                    j: Some(5.0),
                    a: Some(2.0),
                    ..Default::default()
                })
                .unwrap(),
        );
        (sys, nlist, pot, Plane::new(0.0).unwrap())
    }

    #[test]
    fn test_positions_never_move() {
        let (mut sys, nlist, mut pot, plane) = aligner_setup();
        let before: Vec<Vector> = sys.particles().iter().map(|p| p.pos).collect();
        let config = IntegratorConfig {
            nu: Some(1.0),
            seed: Some(3),
            ..Default::default()
        };
        let mut aligner = BrownianAlign::new(&config, 0.01).unwrap();
        for _ in 0..100 {
            aligner.integrate(&mut sys, &mut pot, &nlist, &plane).unwrap();
        }
        let after: Vec<Vector> = sys.particles().iter().map(|p| p.pos).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_torques_align_directors_without_noise() {
        let (mut sys, nlist, mut pot, plane) = aligner_setup();
        let config = IntegratorConfig {
            nu: Some(0.0),
            seed: Some(3),
            ..Default::default()
        };
        let mut aligner = BrownianAlign::new(&config, 0.01).unwrap();

        let misalignment = |sys: &System| {
            1.0 - sys.get(0).director.dot(sys.get(1).director)
        };
        let initial = misalignment(&sys);
        for _ in 0..200 {
            aligner.integrate(&mut sys, &mut pot, &nlist, &plane).unwrap();
        }
        assert!(misalignment(&sys) < 0.01 * initial);
        for p in sys.particles() {
            assert!((p.director.length() - 1.0).abs() < 1e-9);
            assert!(p.director.z.abs() < 1e-9);
        }
    }
}
