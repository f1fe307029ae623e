//! Harmonic restoring potential toward the z = 0 plane.
//!
//! `V = k/2 z^2` per particle.

use crate::error::Result;
use crate::math::{Scalar, Vector};
use crate::potential::{ExternalParamSpec, ExternalPotential};
use crate::system::System;
use std::collections::HashMap;
use tracing::warn;

const DEFAULT_K: Scalar = 1.0;

#[derive(Debug)]
pub struct Harmonic {
    k: Scalar,
    per_type: HashMap<usize, Scalar>,
    energy: Scalar,
}

impl Harmonic {
    pub fn new(spec: &ExternalParamSpec) -> Self {
        let k = spec.k.unwrap_or_else(|| {
            warn!("Harmonic external potential: k not set, using default {DEFAULT_K}.");
            DEFAULT_K
        });
        Self {
            k,
            per_type: HashMap::new(),
            energy: 0.0,
        }
    }
}

pub(in crate::potential) fn factory(
    spec: &ExternalParamSpec,
) -> Result<Box<dyn ExternalPotential>> {
    Ok(Box::new(Harmonic::new(spec)))
}

impl ExternalPotential for Harmonic {
    fn name(&self) -> &'static str {
        "harmonic"
    }

    fn set_type_params(&mut self, spec: &ExternalParamSpec) -> Result<()> {
        let k = spec.k.unwrap_or(self.k);
        match spec.type_1 {
            Some(t) => {
                self.per_type.insert(t, k);
            }
            None => self.k = k,
        }
        Ok(())
    }

    fn compute(&mut self, system: &mut System) -> Result<()> {
        self.energy = 0.0;
        for p in system.particles_mut() {
            let k = self.per_type.get(&p.type_id).copied().unwrap_or(self.k);
            p.force += Vector::new(0.0, 0.0, -k * p.pos.z);
            self.energy += 0.5 * k * p.pos.z * p.pos.z;
        }
        Ok(())
    }

    fn energy(&self) -> Scalar {
        self.energy
    }
}
