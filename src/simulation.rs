//! Owning simulation context and the staged builder that assembles it.
//!
//! Construction follows the dependency order of the engine: a box must exist
//! before a system, a constraint before particles can be seeded on the
//! surface, and potentials plus a neighbor list before an integrator. The
//! builder encodes that order in its types, so a caller cannot reach
//! `with_integrator` without having passed through `with_constraint`, and the
//! remaining prerequisites are checked there with sequencing errors.
//!
//! The run loop advances a fixed number of steps: population events first,
//! then a lazy neighbor-list rebuild when a rebuild was forced or any
//! particle tripped the half-skin test, then one integrator step. Rebuild
//! statistics and wall-clock throughput are reported at the end of each run.

use crate::config::SimulationConfig;
use crate::constraint::{Constraint, ConstraintRegistry};
use crate::error::{Result, SimulationError};
use crate::integrator::{Integrator, IntegratorRegistry};
use crate::math::{Scalar, Vector, random_unit_vector};
use crate::neighbor_list::NeighborList;
use crate::particle::Particle;
use crate::population::PopulationRandom;
use crate::potential::{ExternalPotential, PairPotential, Potential, PotentialRegistry};
use crate::rng::SimRng;
use crate::sim_box::SimBox;
use crate::system::System;
use std::time::Instant;
use tracing::info;

/// First builder stage: a box and the particle store it defines.
pub struct SimulationBuilder {
    system: System,
}

impl SimulationBuilder {
    pub fn with_box(sim_box: SimBox) -> Self {
        Self {
            system: System::new(sim_box),
        }
    }

    pub fn add_particle(mut self, p: Particle) -> Self {
        self.system.add_particle(p);
        self
    }

    pub fn create_group(mut self, name: &str) -> Self {
        self.system.create_group(name);
        self
    }

    /// Attach the manifold constraint, unlocking the component stage. Every
    /// particle added so far is snapped onto the surface.
    pub fn with_constraint(mut self, constraint: Box<dyn Constraint>) -> ComponentBuilder {
        for p in self.system.particles_mut() {
            constraint.enforce(p);
        }
        ComponentBuilder {
            system: self.system,
            constraint,
            potential: Potential::new(),
            nlist_cutoff: None,
            nlist_padding: 0.5,
            population: None,
        }
    }
}

/// Second builder stage: potentials, neighbor list, and population, with the
/// constraint available for on-surface seeding.
pub struct ComponentBuilder {
    system: System,
    constraint: Box<dyn Constraint>,
    potential: Potential,
    nlist_cutoff: Option<Scalar>,
    nlist_padding: Scalar,
    population: Option<PopulationRandom>,
}

impl ComponentBuilder {
    pub fn add_particle(mut self, mut p: Particle) -> Self {
        self.constraint.enforce(&mut p);
        self.system.add_particle(p);
        self
    }

    pub fn create_group(mut self, name: &str) -> Self {
        self.system.create_group(name);
        self
    }

    /// Seed `count` particles at uniform random positions in the box, each
    /// snapped onto the surface with a random tangent director.
    pub fn spawn_random_particles(
        mut self,
        count: usize,
        radius: Scalar,
        type_id: usize,
        seed: Option<u64>,
    ) -> Self {
        let mut rng = SimRng::from_optional_seed(seed);
        let sim_box = *self.system.sim_box();
        for _ in 0..count {
            let pos = Vector::new(
                sim_box.xlo + rng.uniform() * sim_box.lx,
                sim_box.ylo + rng.uniform() * sim_box.ly,
                sim_box.zlo + rng.uniform() * sim_box.lz,
            );
            let mut p = Particle::new(0, type_id, radius)
                .with_pos(pos)
                .with_director(random_unit_vector(&mut rng));
            self.constraint.enforce(&mut p);
            self.system.add_particle(p);
        }
        self
    }

    pub fn with_pair_potential(mut self, name: &str, potential: Box<dyn PairPotential>) -> Self {
        self.potential.add_pair_potential(name, potential);
        self
    }

    pub fn with_external_potential(
        mut self,
        name: &str,
        potential: Box<dyn ExternalPotential>,
    ) -> Self {
        self.potential.add_external_potential(name, potential);
        self
    }

    /// Neighbor-list parameters. A `None` cutoff is derived from the largest
    /// registered pair-potential cutoff when the integrator is attached.
    pub fn with_neighbor_list(mut self, cutoff: Option<Scalar>, padding: Scalar) -> Self {
        self.nlist_cutoff = cutoff;
        self.nlist_padding = padding;
        self
    }

    pub fn with_population(mut self, population: PopulationRandom) -> Self {
        self.population = Some(population);
        self
    }

    /// Attach the integrator and finish construction. This is where the
    /// remaining prerequisites are enforced: at least one potential must be
    /// registered, and the neighbor-list cutoff must cover every pair
    /// potential. The first neighbor-list build happens here.
    pub fn with_integrator(
        self,
        integrator: Box<dyn Integrator>,
        dt: Scalar,
    ) -> Result<Simulation> {
        if self.potential.is_empty() {
            return Err(SimulationError::sequencing(
                "no potentials have been defined; register at least one pair or external \
                 potential before the integrator",
            ));
        }
        if dt <= 0.0 || !dt.is_finite() {
            return Err(SimulationError::config(format!(
                "time step must be positive and finite, got {dt}"
            )));
        }

        let max_pair_cutoff = self.potential.max_pair_cutoff();
        let cutoff = match self.nlist_cutoff {
            Some(cutoff) => {
                if self.potential.need_nlist() && cutoff < max_pair_cutoff {
                    return Err(SimulationError::config(format!(
                        "neighbor list cutoff {cutoff} is smaller than the largest pair \
                         potential cutoff {max_pair_cutoff}; pairs would be missed"
                    )));
                }
                cutoff
            }
            None if self.potential.need_nlist() => max_pair_cutoff,
            // External-only system: the list is built once and never read.
            None => 1.0,
        };
        let mut nlist = NeighborList::new(cutoff, self.nlist_padding)?;

        let mut system = self.system;
        system.set_integrator_step(dt);
        nlist.build(&system);

        Ok(Simulation {
            system,
            constraint: self.constraint,
            potential: self.potential,
            nlist,
            integrator,
            population: self.population,
            print_every: 100,
            time_step: 0,
        })
    }
}

/// Per-run bookkeeping reported by `Simulation::run`.
#[derive(Debug, Clone, Copy)]
pub struct RunStats {
    pub steps: u64,
    pub builds: usize,
    pub wall_seconds: f64,
}

/// The assembled engine: owns every component and lends borrowed access per
/// step, so the dependency graph stays a DAG with a single owner.
#[derive(Debug)]
pub struct Simulation {
    system: System,
    constraint: Box<dyn Constraint>,
    potential: Potential,
    nlist: NeighborList,
    integrator: Box<dyn Integrator>,
    population: Option<PopulationRandom>,
    print_every: u64,
    time_step: u64,
}

impl Simulation {
    /// Assemble a simulation from a configuration file, using the standard
    /// constraint, potential, and integrator registries.
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        let constraints = ConstraintRegistry::default();
        let potentials = PotentialRegistry::default();
        let integrators = IntegratorRegistry::default();

        let mut builder = SimulationBuilder::with_box(config.sim_box.to_sim_box())
            .with_constraint(constraints.create(&config.constraint)?)
            .spawn_random_particles(
                config.particles.count,
                config.particles.radius,
                config.particles.type_id,
                config.particles.seed,
            );

        for pc in &config.pair_potentials {
            let mut potential = potentials.create_pair(&pc.kind, &pc.params)?;
            for spec in &pc.type_params {
                potential.set_type_params(spec)?;
            }
            builder = builder.with_pair_potential(&pc.kind, potential);
        }
        for ec in &config.external_potentials {
            let mut potential = potentials.create_external(&ec.kind, &ec.params)?;
            for spec in &ec.type_params {
                potential.set_type_params(spec)?;
            }
            builder = builder.with_external_potential(&ec.kind, potential);
        }

        builder = builder.with_neighbor_list(
            config.neighbor_list.cutoff,
            config.neighbor_list.padding,
        );
        if let Some(pc) = &config.population {
            builder = builder.with_population(PopulationRandom::new(pc)?);
        }

        let integrator = integrators.create(&config.integrator, config.run.dt)?;
        let mut simulation = builder.with_integrator(integrator, config.run.dt)?;
        simulation.print_every = config.run.print_every.max(1);
        Ok(simulation)
    }

    pub fn set_print_every(&mut self, print_every: u64) {
        self.print_every = print_every.max(1);
    }

    /// Advance the simulation by `steps` steps.
    pub fn run(&mut self, steps: u64) -> Result<RunStats> {
        info!("Starting simulation run for {steps} steps.");
        let start = Instant::now();
        let builds_before = self.nlist.builds();

        for t in 0..steps {
            if let Some(population) = &mut self.population {
                population.divide(self.time_step, &mut self.system, &mut self.nlist)?;
                population.remove(self.time_step, &mut self.system, &mut self.nlist)?;
            }

            // Lazy rebuild: forced after topology changes, or as soon as any
            // particle tripped the half-skin displacement test during the
            // previous step.
            if self.potential.need_nlist() {
                let stale = self.system.force_nlist_rebuild()
                    || self.nlist.rebuild_forced()
                    || self
                        .system
                        .particles()
                        .iter()
                        .any(|p| self.nlist.need_update(p, self.system.sim_box()));
                if stale {
                    self.nlist.build(&self.system);
                    self.system.set_force_nlist_rebuild(false);
                }
            }

            self.integrator.integrate(
                &mut self.system,
                &mut self.potential,
                &self.nlist,
                self.constraint.as_ref(),
            )?;

            if t % self.print_every == 0 {
                info!(
                    "Time step: {t}/{steps}   cumulative time step: {}",
                    self.time_step
                );
            }
            self.time_step += 1;
        }

        let builds = self.nlist.builds() - builds_before;
        let wall_seconds = start.elapsed().as_secs_f64();
        info!(
            "Built neighbor list {builds} times. Average steps between builds: {:.1}.",
            steps as f64 / builds.max(1) as f64
        );
        info!(
            "Finished {steps} steps in {wall_seconds:.2} s ({:.0} steps/s).",
            steps as f64 / wall_seconds.max(1e-9)
        );
        Ok(RunStats {
            steps,
            builds,
            wall_seconds,
        })
    }

    /// Cumulative step count across runs.
    pub fn time_step(&self) -> u64 {
        self.time_step
    }

    pub fn system(&self) -> &System {
        &self.system
    }

    pub fn potential(&self) -> &Potential {
        &self.potential
    }

    pub fn neighbor_list(&self) -> &NeighborList {
        &self.nlist
    }

    pub fn constraint(&self) -> &dyn Constraint {
        self.constraint.as_ref()
    }
}
