//! Potential composition layer.
//!
//! The `Potential` aggregator owns every active pairwise and external
//! interaction. One `compute` pass zeroes the per-particle force and torque
//! accumulators, walks the neighbor pairs once per pair potential (equal and
//! opposite contributions, each potential filtered to its own cutoff), and
//! then adds single-particle external contributions. Per-potential energies
//! are stored on the instances and read back without recomputation.
//!
//! Registration is name-keyed and last-registration-wins; replacing an
//! instance is reported through the logging channel, never silent.

use crate::error::{Result, SimulationError};
use crate::math::Scalar;
use crate::neighbor_list::NeighborList;
use crate::system::System;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

pub mod external;
pub mod pair;

/// Numeric parameters for a pairwise potential.
///
/// Optional-field stand-in for the original's free-form key/value parameter
/// list: each potential picks the fields it understands. When `type_1` and
/// `type_2` are present the update targets that type pair, otherwise it
/// updates the defaults applied to every pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairParamSpec {
    pub type_1: Option<usize>,
    pub type_2: Option<usize>,
    /// Spring stiffness (soft) .
    pub k: Option<Scalar>,
    /// Interaction range (soft, polar alignment).
    pub a: Option<Scalar>,
    /// Well depth (Lennard-Jones).
    pub epsilon: Option<Scalar>,
    /// Particle diameter (Lennard-Jones).
    pub sigma: Option<Scalar>,
    /// Coupling strength (Coulomb).
    pub alpha: Option<Scalar>,
    /// Alignment strength (polar alignment).
    pub j: Option<Scalar>,
    /// Cutoff distance (Lennard-Jones, Coulomb).
    pub rcut: Option<Scalar>,
}

impl PairParamSpec {
    pub fn type_pair(&self) -> Option<(usize, usize)> {
        match (self.type_1, self.type_2) {
            (Some(a), Some(b)) => Some((a.min(b), a.max(b))),
            _ => None,
        }
    }
}

/// Numeric parameters for an external (single-particle) potential. `type_1`
/// scopes the update to one particle type when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalParamSpec {
    pub type_1: Option<usize>,
    /// Field strength (gravity).
    pub g: Option<Scalar>,
    /// Spring stiffness (harmonic).
    pub k: Option<Scalar>,
}

/// A pairwise interaction evaluated over neighbor pairs.
pub trait PairPotential: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Largest cutoff any type pair of this potential uses; the neighbor
    /// list cutoff must not be smaller.
    fn max_cutoff(&self) -> Scalar;

    /// True when the potential contributes torques coupled to particle
    /// orientation rather than central forces.
    fn couples_orientation(&self) -> bool {
        false
    }

    /// Update per-type-pair parameters (or the defaults when the spec names
    /// no type pair). Fails only on invalid values; the potential stays
    /// registered.
    fn set_type_params(&mut self, spec: &PairParamSpec) -> Result<()>;

    /// Accumulate forces, torques, and energy over the supplied neighbor
    /// pairs. Pairs whose parameters were never set are fatal.
    fn compute(&mut self, system: &mut System, nlist: &NeighborList) -> Result<()>;

    /// Energy accumulated by the most recent `compute`.
    fn energy(&self) -> Scalar;
}

/// A single-particle interaction evaluated over all particles.
pub trait ExternalPotential: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn set_type_params(&mut self, spec: &ExternalParamSpec) -> Result<()>;

    fn compute(&mut self, system: &mut System) -> Result<()>;

    fn energy(&self) -> Scalar;
}

/// Resolve per-type-pair parameters with fall-back to registration defaults.
///
/// Shared by every pair potential: overrides set through `pair_param`
/// commands win, then the defaults given at registration; a pair with
/// neither is a fatal configuration error (parameters are never silently
/// invented at evaluation time).
#[derive(Debug)]
pub(crate) struct TypePairTable<P: Copy> {
    defaults: Option<P>,
    overrides: HashMap<(usize, usize), P>,
}

impl<P: Copy> TypePairTable<P> {
    pub fn new(defaults: Option<P>) -> Self {
        Self {
            defaults,
            overrides: HashMap::new(),
        }
    }

    pub fn set_defaults(&mut self, params: P) {
        self.defaults = Some(params);
    }

    pub fn defaults(&self) -> Option<P> {
        self.defaults
    }

    pub fn set_pair(&mut self, type_1: usize, type_2: usize, params: P) {
        self.overrides
            .insert((type_1.min(type_2), type_1.max(type_2)), params);
    }

    pub fn get(&self, potential: &str, type_1: usize, type_2: usize) -> Result<P> {
        let key = (type_1.min(type_2), type_1.max(type_2));
        self.overrides
            .get(&key)
            .copied()
            .or(self.defaults)
            .ok_or_else(|| {
                SimulationError::config(format!(
                    "parameters for type pair ({type_1},{type_2}) of pair potential \
                     {potential} were never set"
                ))
            })
    }

    pub fn max_by(&self, f: impl Fn(&P) -> Scalar) -> Scalar {
        let mut max = self.defaults.as_ref().map(&f).unwrap_or(0.0);
        for p in self.overrides.values() {
            max = max.max(f(p));
        }
        max
    }
}

/// Registry of active interactions and the entry point for force evaluation.
#[derive(Debug)]
pub struct Potential {
    pair: Vec<(String, Box<dyn PairPotential>)>,
    external: Vec<(String, Box<dyn ExternalPotential>)>,
}

impl Potential {
    pub fn new() -> Self {
        Self {
            pair: Vec::new(),
            external: Vec::new(),
        }
    }

    /// Register a pair potential under a type name. Registering a name twice
    /// replaces the previous instance.
    pub fn add_pair_potential(&mut self, name: &str, potential: Box<dyn PairPotential>) {
        if let Some(slot) = self.pair.iter_mut().find(|(n, _)| n == name) {
            info!("Pair potential {name} was already registered; replacing previous instance.");
            slot.1 = potential;
        } else {
            info!("Added {name} to the list of pair potentials.");
            self.pair.push((name.to_string(), potential));
        }
    }

    /// Register an external potential under a type name, replacing any
    /// previous instance of the same name.
    pub fn add_external_potential(&mut self, name: &str, potential: Box<dyn ExternalPotential>) {
        if let Some(slot) = self.external.iter_mut().find(|(n, _)| n == name) {
            info!("External potential {name} was already registered; replacing previous instance.");
            slot.1 = potential;
        } else {
            info!("Added {name} to the list of external potentials.");
            self.external.push((name.to_string(), potential));
        }
    }

    /// Update parameters of an already-registered pair potential.
    pub fn add_pair_potential_parameters(
        &mut self,
        name: &str,
        spec: &PairParamSpec,
    ) -> Result<()> {
        let (_, potential) = self
            .pair
            .iter_mut()
            .find(|(n, _)| n == name)
            .ok_or_else(|| {
                SimulationError::config(format!(
                    "cannot set parameters: pair potential {name} was never registered"
                ))
            })?;
        potential.set_type_params(spec)
    }

    /// Update parameters of an already-registered external potential.
    pub fn add_external_potential_parameters(
        &mut self,
        name: &str,
        spec: &ExternalParamSpec,
    ) -> Result<()> {
        let (_, potential) = self
            .external
            .iter_mut()
            .find(|(n, _)| n == name)
            .ok_or_else(|| {
                SimulationError::config(format!(
                    "cannot set parameters: external potential {name} was never registered"
                ))
            })?;
        potential.set_type_params(spec)
    }

    /// True when any registered potential needs pairwise neighbor
    /// information. A purely external system never maintains a neighbor
    /// list.
    pub fn need_nlist(&self) -> bool {
        !self.pair.is_empty()
    }

    /// True when nothing at all is registered.
    pub fn is_empty(&self) -> bool {
        self.pair.is_empty() && self.external.is_empty()
    }

    /// Largest cutoff over all registered pair potentials.
    pub fn max_pair_cutoff(&self) -> Scalar {
        self.pair
            .iter()
            .map(|(_, p)| p.max_cutoff())
            .fold(0.0, Scalar::max)
    }

    /// Evaluate every registered interaction once: zero accumulators, pair
    /// contributions over the neighbor list, then external contributions.
    /// Non-finite accumulated values abort the run.
    pub fn compute(&mut self, system: &mut System, nlist: &NeighborList) -> Result<()> {
        system.reset_forces();
        system.reset_torques();
        for (_, potential) in &mut self.pair {
            potential.compute(system, nlist)?;
        }
        for (_, potential) in &mut self.external {
            potential.compute(system)?;
        }
        for p in system.particles() {
            if !p.force.is_finite() || !p.torque.is_finite() {
                return Err(SimulationError::numerical(format!(
                    "non-finite force or torque on particle {} after potential evaluation",
                    p.id
                )));
            }
        }
        Ok(())
    }

    /// Stored pair energy of a registered potential; reflects the most
    /// recent `compute` without triggering recomputation.
    pub fn compute_pair_potential_energy_of_type(&self, name: &str) -> Result<Scalar> {
        self.pair
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p.energy())
            .ok_or_else(|| {
                SimulationError::config(format!("pair potential {name} was never registered"))
            })
    }

    /// Stored alignment energy of an orientation-coupled pair potential.
    pub fn compute_angle_potential_energy_of_type(&self, name: &str) -> Result<Scalar> {
        let (_, potential) = self
            .pair
            .iter()
            .find(|(n, _)| n == name)
            .ok_or_else(|| {
                SimulationError::config(format!("pair potential {name} was never registered"))
            })?;
        if !potential.couples_orientation() {
            return Err(SimulationError::config(format!(
                "pair potential {name} does not couple to orientation"
            )));
        }
        Ok(potential.energy())
    }

    /// Stored external energy of a registered potential.
    pub fn external_potential_energy_of_type(&self, name: &str) -> Result<Scalar> {
        self.external
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p.energy())
            .ok_or_else(|| {
                SimulationError::config(format!("external potential {name} was never registered"))
            })
    }

    /// Sum of all stored energies, for logging.
    pub fn total_energy(&self) -> Scalar {
        self.pair.iter().map(|(_, p)| p.energy()).sum::<Scalar>()
            + self.external.iter().map(|(_, p)| p.energy()).sum::<Scalar>()
    }
}

impl Default for Potential {
    fn default() -> Self {
        Self::new()
    }
}

type PairFactory = fn(&PairParamSpec) -> Result<Box<dyn PairPotential>>;
type ExternalFactory = fn(&ExternalParamSpec) -> Result<Box<dyn ExternalPotential>>;

/// Startup-time table from potential type name to constructor.
pub struct PotentialRegistry {
    pair: HashMap<String, PairFactory>,
    external: HashMap<String, ExternalFactory>,
}

impl PotentialRegistry {
    pub fn new() -> Self {
        Self {
            pair: HashMap::new(),
            external: HashMap::new(),
        }
    }

    pub fn with_standard_potentials(mut self) -> Self {
        self.register_pair("soft", pair::soft::factory);
        self.register_pair("lj", pair::lennard_jones::factory);
        self.register_pair("coulomb", pair::coulomb::factory);
        self.register_pair("polar_align", pair::polar_align::factory);
        self.register_external("gravity", external::gravity::factory);
        self.register_external("harmonic", external::harmonic::factory);
        self
    }

    pub fn register_pair(&mut self, name: &str, factory: PairFactory) {
        self.pair.insert(name.to_string(), factory);
    }

    pub fn register_external(&mut self, name: &str, factory: ExternalFactory) {
        self.external.insert(name.to_string(), factory);
    }

    pub fn create_pair(&self, name: &str, spec: &PairParamSpec) -> Result<Box<dyn PairPotential>> {
        match self.pair.get(name) {
            Some(factory) => factory(spec),
            None => Err(SimulationError::config(format!(
                "unknown pair potential: '{}'. Available pair potentials: {}",
                name,
                self.sorted_names(true).join(", ")
            ))),
        }
    }

    pub fn create_external(
        &self,
        name: &str,
        spec: &ExternalParamSpec,
    ) -> Result<Box<dyn ExternalPotential>> {
        match self.external.get(name) {
            Some(factory) => factory(spec),
            None => Err(SimulationError::config(format!(
                "unknown external potential: '{}'. Available external potentials: {}",
                name,
                self.sorted_names(false).join(", ")
            ))),
        }
    }

    fn sorted_names(&self, pair: bool) -> Vec<&str> {
        let mut names: Vec<&str> = if pair {
            self.pair.keys().map(String::as_str).collect()
        } else {
            self.external.keys().map(String::as_str).collect()
        };
        names.sort_unstable();
        names
    }
}

impl Default for PotentialRegistry {
    fn default() -> Self {
        Self::new().with_standard_potentials()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector;
    use crate::particle::Particle;
    use crate::sim_box::SimBox;

    fn spec_soft(k: Scalar, a: Scalar) -> PairParamSpec {
        PairParamSpec {
            k: Some(k),
            a: Some(a),
            ..Default::default()
        }
    }

    fn two_particle_system(separation: Scalar) -> (System, NeighborList) {
        let mut sys = System::new(SimBox::cube(20.0, false));
        sys.add_particle(Particle::new(0, 0, 1.0).with_pos(Vector::ZERO));
        sys.add_particle(Particle::new(0, 0, 1.0).with_pos(Vector::new(separation, 0.0, 0.0)));
        let mut nlist = NeighborList::new(3.0, 0.5).unwrap();
        nlist.build(&sys);
        (sys, nlist)
    }

    #[test]
    fn test_duplicate_registration_replaces() {
        let registry = PotentialRegistry::default();
        let mut pot = Potential::new();
        pot.add_pair_potential("soft", registry.create_pair("soft", &spec_soft(1.0, 2.0)).unwrap());
        pot.add_pair_potential("soft", registry.create_pair("soft", &spec_soft(5.0, 2.0)).unwrap());

        let (mut sys, nlist) = two_particle_system(1.0);
        pot.compute(&mut sys, &nlist).unwrap();
        // Energy reflects the replacement instance: 0.5 * 5 * (2-1)^2.
        let e = pot.compute_pair_potential_energy_of_type("soft").unwrap();
        assert!((e - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_parameters_require_prior_registration() {
        let mut pot = Potential::new();
        let err = pot
            .add_pair_potential_parameters("soft", &spec_soft(1.0, 2.0))
            .unwrap_err();
        assert!(err.to_string().contains("never registered"));

        let err = pot
            .add_external_potential_parameters("gravity", &ExternalParamSpec::default())
            .unwrap_err();
        assert!(err.to_string().contains("never registered"));
    }

    #[test]
    fn test_need_nlist() {
        let registry = PotentialRegistry::default();
        let mut pot = Potential::new();
        assert!(!pot.need_nlist());
        pot.add_external_potential(
            "gravity",
            registry
                .create_external("gravity", &ExternalParamSpec {
                    g: Some(1.0),
                    ..Default::default()
                })
                .unwrap(),
        );
        assert!(!pot.need_nlist());
        pot.add_pair_potential("soft", registry.create_pair("soft", &spec_soft(1.0, 2.0)).unwrap());
        assert!(pot.need_nlist());
    }

    #[test]
    fn test_unknown_potential_names() {
        let registry = PotentialRegistry::default();
        let err = registry
            .create_pair("yukawa", &PairParamSpec::default())
            .unwrap_err();
        assert!(err.to_string().contains("soft"));
        assert!(err.to_string().contains("lj"));

        let err = registry
            .create_external("wind", &ExternalParamSpec::default())
            .unwrap_err();
        assert!(err.to_string().contains("gravity"));
    }

    #[test]
    fn test_energy_accessor_does_not_recompute() {
        let registry = PotentialRegistry::default();
        let mut pot = Potential::new();
        pot.add_pair_potential("soft", registry.create_pair("soft", &spec_soft(1.0, 2.0)).unwrap());

        let (mut sys, nlist) = two_particle_system(1.0);
        pot.compute(&mut sys, &nlist).unwrap();
        let e1 = pot.compute_pair_potential_energy_of_type("soft").unwrap();
        let e2 = pot.compute_pair_potential_energy_of_type("soft").unwrap();
        assert_eq!(e1, e2);
        assert!(e1 > 0.0);
    }

    #[test]
    fn test_angle_energy_requires_orientation_coupling() {
        let registry = PotentialRegistry::default();
        let mut pot = Potential::new();
        pot.add_pair_potential("soft", registry.create_pair("soft", &spec_soft(1.0, 2.0)).unwrap());
        let err = pot.compute_angle_potential_energy_of_type("soft").unwrap_err();
        assert!(err.to_string().contains("does not couple"));
    }

    #[test]
    fn test_missing_type_pair_parameters_are_fatal() {
        let registry = PotentialRegistry::default();
        let mut pot = Potential::new();
        // Register with no parameters at all: nothing is silently defaulted.
        pot.add_pair_potential(
            "soft",
            registry.create_pair("soft", &PairParamSpec::default()).unwrap(),
        );
        let (mut sys, nlist) = two_particle_system(1.0);
        let err = pot.compute(&mut sys, &nlist).unwrap_err();
        assert!(err.to_string().contains("never set"));
    }
}
