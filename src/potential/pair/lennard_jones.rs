//! Lennard-Jones interaction.
//!
//! `V(r) = 4 epsilon [ (sigma/r)^12 - (sigma/r)^6 ]`, truncated at `rcut`.

use crate::error::Result;
use crate::math::Scalar;
use crate::neighbor_list::NeighborList;
use crate::potential::{PairParamSpec, PairPotential, TypePairTable};
use crate::system::System;
use tracing::warn;

const DEFAULT_EPSILON: Scalar = 1.0;
const DEFAULT_SIGMA: Scalar = 1.0;
const DEFAULT_RCUT_FACTOR: Scalar = 2.5;

#[derive(Debug, Clone, Copy)]
struct LjParams {
    epsilon: Scalar,
    sigma: Scalar,
    rcut: Scalar,
}

#[derive(Debug)]
pub struct LennardJones {
    params: TypePairTable<LjParams>,
    energy: Scalar,
}

impl LennardJones {
    pub fn new(spec: &PairParamSpec) -> Self {
        let defaults = resolve(spec, None);
        if defaults.is_none() {
            warn!(
                "Lennard-Jones pair potential registered without parameters; set pair \
                 parameters before the run starts."
            );
        }
        Self {
            params: TypePairTable::new(defaults),
            energy: 0.0,
        }
    }
}

fn resolve(spec: &PairParamSpec, current: Option<LjParams>) -> Option<LjParams> {
    if spec.epsilon.is_none() && spec.sigma.is_none() && spec.rcut.is_none() {
        return current;
    }
    let base = current.unwrap_or_else(|| {
        if spec.epsilon.is_none() {
            warn!("Lennard-Jones: epsilon not set, using default {DEFAULT_EPSILON}.");
        }
        if spec.sigma.is_none() {
            warn!("Lennard-Jones: sigma not set, using default {DEFAULT_SIGMA}.");
        }
        let sigma = spec.sigma.unwrap_or(DEFAULT_SIGMA);
        if spec.rcut.is_none() {
            warn!(
                "Lennard-Jones: rcut not set, using default {}.",
                DEFAULT_RCUT_FACTOR * sigma
            );
        }
        LjParams {
            epsilon: DEFAULT_EPSILON,
            sigma: DEFAULT_SIGMA,
            rcut: DEFAULT_RCUT_FACTOR * sigma,
        }
    });
    Some(LjParams {
        epsilon: spec.epsilon.unwrap_or(base.epsilon),
        sigma: spec.sigma.unwrap_or(base.sigma),
        rcut: spec.rcut.unwrap_or(base.rcut),
    })
}

pub(in crate::potential) fn factory(
    spec: &PairParamSpec,
) -> Result<Box<dyn PairPotential>> {
    Ok(Box::new(LennardJones::new(spec)))
}

impl PairPotential for LennardJones {
    fn name(&self) -> &'static str {
        "lj"
    }

    fn max_cutoff(&self) -> Scalar {
        self.params.max_by(|p| p.rcut)
    }

    fn set_type_params(&mut self, spec: &PairParamSpec) -> Result<()> {
        match spec.type_pair() {
            Some((t1, t2)) => {
                let params = resolve(spec, self.params.defaults())
                    .expect("resolve with explicit fields always yields params");
                self.params.set_pair(t1, t2, params);
            }
            None => {
                if let Some(params) = resolve(spec, self.params.defaults()) {
                    self.params.set_defaults(params);
                }
            }
        }
        Ok(())
    }

    fn compute(&mut self, system: &mut System, nlist: &NeighborList) -> Result<()> {
        self.energy = 0.0;
        let sim_box = *system.sim_box();
        for i in 0..system.size() {
            for &j in nlist.neighbors(i) {
                let (ti, tj) = (system.get(i).type_id, system.get(j).type_id);
                let params = self.params.get("lj", ti, tj)?;
                let d = sim_box.min_image(system.get(i).pos, system.get(j).pos);
                let r_sq = d.length_squared();
                if r_sq > params.rcut * params.rcut || r_sq == 0.0 {
                    continue;
                }
                let inv_r_sq = params.sigma * params.sigma / r_sq;
                let sig6 = inv_r_sq * inv_r_sq * inv_r_sq;
                let sig12 = sig6 * sig6;
                self.energy += 4.0 * params.epsilon * (sig12 - sig6);
                // f(r)/r, positive when repulsive.
                let force_over_r = 48.0 * params.epsilon * (sig12 - 0.5 * sig6) / r_sq;
                let f = force_over_r * d;
                system.get_mut(i).force -= f;
                system.get_mut(j).force += f;
            }
        }
        Ok(())
    }

    fn energy(&self) -> Scalar {
        self.energy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector;
    use crate::particle::Particle;
    use crate::sim_box::SimBox;

    fn harness(separation: Scalar) -> (System, NeighborList, LennardJones) {
        let mut sys = System::new(SimBox::cube(20.0, false));
        sys.add_particle(Particle::new(0, 0, 0.5).with_pos(Vector::ZERO));
        sys.add_particle(Particle::new(0, 0, 0.5).with_pos(Vector::new(separation, 0.0, 0.0)));
        let mut nlist = NeighborList::new(3.0, 0.5).unwrap();
        nlist.build(&sys);
        let lj = LennardJones::new(&PairParamSpec {
            epsilon: Some(1.0),
            sigma: Some(1.0),
            rcut: Some(2.5),
            ..Default::default()
        });
        (sys, nlist, lj)
    }

    #[test]
    fn test_zero_force_at_minimum() {
        // Minimum of the potential sits at r = 2^(1/6) sigma.
        let r_min = 2f64.powf(1.0 / 6.0);
        let (mut sys, nlist, mut lj) = harness(r_min);
        lj.compute(&mut sys, &nlist).unwrap();
        assert!(sys.get(0).force.length() < 1e-10);
        assert!((lj.energy() + 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_repulsive_inside_minimum() {
        let (mut sys, nlist, mut lj) = harness(0.9);
        lj.compute(&mut sys, &nlist).unwrap();
        assert!(sys.get(0).force.x < 0.0);
        assert!((sys.get(0).force + sys.get(1).force).length() < 1e-12);
    }

    #[test]
    fn test_attractive_outside_minimum() {
        let (mut sys, nlist, mut lj) = harness(1.5);
        lj.compute(&mut sys, &nlist).unwrap();
        assert!(sys.get(0).force.x > 0.0);
    }

    #[test]
    fn test_truncated_at_rcut() {
        let (mut sys, nlist, mut lj) = harness(2.6);
        lj.compute(&mut sys, &nlist).unwrap();
        assert_eq!(sys.get(0).force, Vector::ZERO);
        assert_eq!(lj.energy(), 0.0);
    }
}
