//! Uniform gravity along -z.
//!
//! `V = g z` per particle, so the force is `-g` along z. On a plane
//! constraint the force is purely normal and tangent-space projection
//! removes it entirely.

use crate::error::Result;
use crate::math::{Scalar, Vector};
use crate::potential::{ExternalParamSpec, ExternalPotential};
use crate::system::System;
use std::collections::HashMap;
use tracing::warn;

const DEFAULT_G: Scalar = 1.0;

#[derive(Debug)]
pub struct Gravity {
    g: Scalar,
    /// Per-type strength overrides.
    per_type: HashMap<usize, Scalar>,
    energy: Scalar,
}

impl Gravity {
    pub fn new(spec: &ExternalParamSpec) -> Self {
        let g = spec.g.unwrap_or_else(|| {
            warn!("Gravity external potential: g not set, using default {DEFAULT_G}.");
            DEFAULT_G
        });
        Self {
            g,
            per_type: HashMap::new(),
            energy: 0.0,
        }
    }
}

pub(in crate::potential) fn factory(
    spec: &ExternalParamSpec,
) -> Result<Box<dyn ExternalPotential>> {
    Ok(Box::new(Gravity::new(spec)))
}

impl ExternalPotential for Gravity {
    fn name(&self) -> &'static str {
        "gravity"
    }

    fn set_type_params(&mut self, spec: &ExternalParamSpec) -> Result<()> {
        let g = spec.g.unwrap_or(self.g);
        match spec.type_1 {
            Some(t) => {
                self.per_type.insert(t, g);
            }
            None => self.g = g,
        }
        Ok(())
    }

    fn compute(&mut self, system: &mut System) -> Result<()> {
        self.energy = 0.0;
        for p in system.particles_mut() {
            let g = self.per_type.get(&p.type_id).copied().unwrap_or(self.g);
            p.force += Vector::new(0.0, 0.0, -g);
            self.energy += g * p.pos.z;
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
    use crate::particle::Particle;
    use crate::sim_box::SimBox;

    #[test]
    fn test_constant_downward_force() {
        let mut sys = System::new(SimBox::cube(10.0, false));
        sys.add_particle(Particle::new(0, 0, 1.0).with_pos(Vector::new(0.0, 0.0, 2.0)));
        let mut gravity = Gravity::new(&ExternalParamSpec {
            g: Some(9.81),
            ..Default::default()
        });
        gravity.compute(&mut sys).unwrap();
        assert_eq!(sys.get(0).force, Vector::new(0.0, 0.0, -9.81));
        assert!((gravity.energy() - 9.81 * 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_per_type_strength() {
        let mut sys = System::new(SimBox::cube(10.0, false));
        sys.add_particle(Particle::new(0, 0, 1.0));
        sys.add_particle(Particle::new(0, 1, 1.0));
        let mut gravity = Gravity::new(&ExternalParamSpec {
            g: Some(1.0),
            ..Default::default()
        });
        gravity
            .set_type_params(&ExternalParamSpec {
                type_1: Some(1),
                g: Some(3.0),
                ..Default::default()
            })
            .unwrap();
        gravity.compute(&mut sys).unwrap();
        assert_eq!(sys.get(0).force.z, -1.0);
        assert_eq!(sys.get(1).force.z, -3.0);
    }
}
