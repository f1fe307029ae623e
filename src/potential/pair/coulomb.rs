//! Coulomb-type 1/r interaction.
//!
//! `V(r) = alpha / r`, truncated at `rcut`. Repulsive for positive `alpha`.

use crate::error::Result;
use crate::math::Scalar;
use crate::neighbor_list::NeighborList;
use crate::potential::{PairParamSpec, PairPotential, TypePairTable};
use crate::system::System;
use tracing::warn;

const DEFAULT_ALPHA: Scalar = 1.0;
const DEFAULT_RCUT: Scalar = 3.0;

#[derive(Debug, Clone, Copy)]
struct CoulombParams {
    alpha: Scalar,
    rcut: Scalar,
}

#[derive(Debug)]
pub struct Coulomb {
    params: TypePairTable<CoulombParams>,
    energy: Scalar,
}

impl Coulomb {
    pub fn new(spec: &PairParamSpec) -> Self {
        let defaults = resolve(spec, None);
        if defaults.is_none() {
            warn!(
                "Coulomb pair potential registered without parameters; set pair parameters \
                 before the run starts."
            );
        }
        Self {
            params: TypePairTable::new(defaults),
            energy: 0.0,
        }
    }
}

fn resolve(spec: &PairParamSpec, current: Option<CoulombParams>) -> Option<CoulombParams> {
    if spec.alpha.is_none() && spec.rcut.is_none() {
        return current;
    }
    let base = current.unwrap_or_else(|| {
        if spec.alpha.is_none() {
            warn!("Coulomb: alpha not set, using default {DEFAULT_ALPHA}.");
        }
        if spec.rcut.is_none() {
            warn!("Coulomb: rcut not set, using default {DEFAULT_RCUT}.");
        }
        CoulombParams {
            alpha: DEFAULT_ALPHA,
            rcut: DEFAULT_RCUT,
        }
    });
    Some(CoulombParams {
        alpha: spec.alpha.unwrap_or(base.alpha),
        rcut: spec.rcut.unwrap_or(base.rcut),
    })
}

pub(in crate::potential) fn factory(
    spec: &PairParamSpec,
) -> Result<Box<dyn PairPotential>> {
    Ok(Box::new(Coulomb::new(spec)))
}

impl PairPotential for Coulomb {
    fn name(&self) -> &'static str {
        "coulomb"
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
                let params = self.params.get("coulomb", ti, tj)?;
                let d = sim_box.min_image(system.get(i).pos, system.get(j).pos);
                let r = d.length();
                if r > params.rcut || r == 0.0 {
                    continue;
                }
                self.energy += params.alpha / r;
                let f = (params.alpha / (r * r * r)) * d;
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
