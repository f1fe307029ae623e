//! Soft-core repulsion.
//!
//! `V(r) = k/2 (a - r)^2` for `r < a`, zero beyond. The standard contact
//! potential for overlapping active discs: purely repulsive, finite at zero
//! separation.

use crate::error::Result;
use crate::math::Scalar;
use crate::neighbor_list::NeighborList;
use crate::potential::{PairParamSpec, PairPotential, TypePairTable};
use crate::system::System;
use tracing::warn;

const DEFAULT_K: Scalar = 1.0;
const DEFAULT_A: Scalar = 2.0;

#[derive(Debug, Clone, Copy)]
struct SoftParams {
    k: Scalar,
    a: Scalar,
}

#[derive(Debug)]
pub struct Soft {
    params: TypePairTable<SoftParams>,
    energy: Scalar,
}

impl Soft {
    pub fn new(spec: &PairParamSpec) -> Self {
        let defaults = resolve(spec, None);
        if defaults.is_none() {
            warn!(
                "Soft pair potential registered without parameters; set pair parameters \
                 before the run starts."
            );
        }
        Self {
            params: TypePairTable::new(defaults),
            energy: 0.0,
        }
    }
}

/// Build params when the spec carries at least one relevant field, filling
/// the other from the current defaults (or the documented default, with a
/// warning, at registration).
fn resolve(spec: &PairParamSpec, current: Option<SoftParams>) -> Option<SoftParams> {
    if spec.k.is_none() && spec.a.is_none() {
        return current;
    }
    let base = current.unwrap_or_else(|| {
        if spec.k.is_none() {
            warn!("Soft pair potential: strength k not set, using default {DEFAULT_K}.");
        }
        if spec.a.is_none() {
            warn!("Soft pair potential: range a not set, using default {DEFAULT_A}.");
        }
        SoftParams {
            k: DEFAULT_K,
            a: DEFAULT_A,
        }
    });
    Some(SoftParams {
        k: spec.k.unwrap_or(base.k),
        a: spec.a.unwrap_or(base.a),
    })
}

pub(in crate::potential) fn factory(
    spec: &PairParamSpec,
) -> Result<Box<dyn PairPotential>> {
    Ok(Box::new(Soft::new(spec)))
}

impl PairPotential for Soft {
    fn name(&self) -> &'static str {
        "soft"
    }

    fn max_cutoff(&self) -> Scalar {
        self.params.max_by(|p| p.a)
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
                let params = self.params.get("soft", ti, tj)?;
                let d = sim_box.min_image(system.get(i).pos, system.get(j).pos);
                let r = d.length();
                if r >= params.a {
                    continue;
                }
                let overlap = params.a - r;
                self.energy += 0.5 * params.k * overlap * overlap;
                // Zero separation has no direction; the pair exerts no force
                // but still stores contact energy.
                if r > 0.0 {
                    let f = params.k * overlap * (d / r);
                    system.get_mut(i).force -= f;
                    system.get_mut(j).force += f;
                }
            }
        }
        Ok(())
    }

    fn energy(&self) -> Scalar {
        self.energy
    }
}
