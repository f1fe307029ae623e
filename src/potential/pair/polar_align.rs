//! Polar alignment interaction.
//!
//! Couples particle orientations instead of positions: within range `a`,
//! each pair contributes a torque `J n_i x n_j` driving the directors
//! toward a common heading, with alignment energy `-J n_i . n_j`. No forces
//! are exerted.

use crate::error::Result;
use crate::math::Scalar;
use crate::neighbor_list::NeighborList;
use crate::potential::{PairParamSpec, PairPotential, TypePairTable};
use crate::system::System;
use tracing::warn;

const DEFAULT_J: Scalar = 1.0;
const DEFAULT_A: Scalar = 2.0;

#[derive(Debug, Clone, Copy)]
struct AlignParams {
    j: Scalar,
    a: Scalar,
}

#[derive(Debug)]
pub struct PolarAlign {
    params: TypePairTable<AlignParams>,
    energy: Scalar,
}

impl PolarAlign {
    pub fn new(spec: &PairParamSpec) -> Self {
        let defaults = resolve(spec, None);
        if defaults.is_none() {
            warn!(
                "Polar alignment registered without parameters; set pair parameters before \
                 the run starts."
            );
        }
        Self {
            params: TypePairTable::new(defaults),
            energy: 0.0,
        }
    }
}

fn resolve(spec: &PairParamSpec, current: Option<AlignParams>) -> Option<AlignParams> {
    if spec.j.is_none() && spec.a.is_none() {
        return current;
    }
    let base = current.unwrap_or_else(|| {
        if spec.j.is_none() {
            warn!("Polar alignment: coupling J not set, using default {DEFAULT_J}.");
        }
        if spec.a.is_none() {
            warn!("Polar alignment: range a not set, using default {DEFAULT_A}.");
        }
        AlignParams {
            j: DEFAULT_J,
            a: DEFAULT_A,
        }
    });
    Some(AlignParams {
        j: spec.j.unwrap_or(base.j),
        a: spec.a.unwrap_or(base.a),
    })
}

pub(in crate::potential) fn factory(
    spec: &PairParamSpec,
) -> Result<Box<dyn PairPotential>> {
    Ok(Box::new(PolarAlign::new(spec)))
}

impl PairPotential for PolarAlign {
    fn name(&self) -> &'static str {
        "polar_align"
    }

    fn max_cutoff(&self) -> Scalar {
        self.params.max_by(|p| p.a)
    }

    fn couples_orientation(&self) -> bool {
        true
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
                let params = self.params.get("polar_align", ti, tj)?;
                let d = sim_box.min_image(system.get(i).pos, system.get(j).pos);
                if d.length() >= params.a {
                    continue;
                }
                let ni = system.get(i).director;
                let nj = system.get(j).director;
                let tau = params.j * ni.cross(nj);
                system.get_mut(i).torque += tau;
                system.get_mut(j).torque -= tau;
                self.energy -= params.j * ni.dot(nj);
            }
        }
        Ok(())
    }

    fn energy(&self) -> Scalar {
        self.energy
    }
}
