//! Random birth and death control.
//!
//! Division and removal are attempted every `freq` steps on a named group.
//! Both use an age-proportional acceptance: the per-event probability is
//! `rate * freq * dt`, and a particle of age `a` divides (or dies) when a
//! uniform draw falls below `a * probability`. A probability above one means
//! the time step, attempt frequency, and rate are mutually inconsistent and
//! the run aborts.
//!
//! A division splits the parent along its director: the child is placed
//! `alpha * radius` ahead, the parent is pushed back by the remainder, both
//! ages reset, and the child inherits director, velocity, and groups. Either
//! half may then be reassigned a new type, radius, and group with the
//! configured probabilities. Every event marks the neighbor list for a
//! forced rebuild.

use crate::config::PopulationConfig;
use crate::error::{Result, SimulationError};
use crate::neighbor_list::NeighborList;
use crate::particle::Particle;
use crate::rng::SimRng;
use crate::system::{GROUP_ALL, System};
use tracing::{debug, error};

#[derive(Debug)]
pub struct PopulationRandom {
    group: String,
    freq: u64,
    division_rate: f64,
    death_rate: f64,
    alpha: f64,
    change_prob_parent: f64,
    change_prob_child: f64,
    new_type: Option<usize>,
    new_radius: Option<f64>,
    old_group: String,
    new_group: String,
    rng: SimRng,
}

impl PopulationRandom {
    pub fn new(config: &PopulationConfig) -> Result<Self> {
        if config.freq == 0 {
            return Err(SimulationError::config(
                "population attempt frequency must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&config.alpha) {
            return Err(SimulationError::config(format!(
                "population split fraction alpha must lie in [0, 1], got {}",
                config.alpha
            )));
        }
        Ok(Self {
            group: config.group.clone(),
            freq: config.freq,
            division_rate: config.division_rate,
            death_rate: config.death_rate,
            alpha: config.alpha,
            change_prob_parent: config.change_prob_parent,
            change_prob_child: config.change_prob_child,
            new_type: config.new_type,
            new_radius: config.new_radius,
            old_group: config
                .old_group
                .clone()
                .unwrap_or_else(|| GROUP_ALL.to_string()),
            new_group: config
                .new_group
                .clone()
                .unwrap_or_else(|| GROUP_ALL.to_string()),
            rng: SimRng::from_optional_seed(config.seed),
        })
    }

    fn due(&self, t: u64) -> bool {
        t % self.freq == 0
    }

    fn event_probability(&self, rate: f64, system: &System, what: &str) -> Result<f64> {
        let prob = rate * self.freq as f64 * system.integrator_step();
        if prob > 1.0 {
            error!("{what} probability {prob} is too large for current time step and attempt rate.");
            return Err(SimulationError::numerical(format!(
                "{what} probability {prob} exceeds 1; reduce the rate, frequency, or time step"
            )));
        }
        Ok(prob)
    }

    /// Reassign type, radius, and group per the configured target values.
    fn reassign(&mut self, system: &mut System, id: usize) -> Result<()> {
        if let Some(t) = self.new_type {
            if let Some(p) = system.by_id_mut(id) {
                p.type_id = t;
            }
        }
        if let Some(r) = self.new_radius {
            if let Some(p) = system.by_id_mut(id) {
                p.radius = r;
            }
        }
        system.change_group(id, &self.old_group, &self.new_group)
    }

    /// Attempt age-proportional divisions. Called once per step with the
    /// current step count; off-cadence calls are no-ops.
    pub fn divide(
        &mut self,
        t: u64,
        system: &mut System,
        nlist: &mut NeighborList,
    ) -> Result<()> {
        if !self.due(t) {
            return Ok(());
        }
        let prob_div = self.event_probability(self.division_rate, system, "division")?;
        let members: Vec<usize> = system.group(&self.group)?.to_vec();
        let sim_box = *system.sim_box();
        let mut divisions = 0usize;

        for id in members {
            let Some(parent) = system.by_id(id) else {
                continue;
            };
            if self.rng.uniform() >= parent.age * prob_div {
                continue;
            }
            let offset = parent.radius * parent.director;
            let mut child = Particle::new(0, parent.type_id, parent.radius)
                .with_pos(parent.pos + self.alpha * offset);
            sim_box.wrap(&mut child.pos);
            child.director = parent.director;
            child.vel = parent.vel;
            child.groups = parent.groups.clone();

            {
                let p = system.by_id_mut(id).expect("parent id just resolved");
                p.pos -= (1.0 - self.alpha) * offset;
                p.age = 0.0;
                sim_box.wrap(&mut p.pos);
            }
            if self.rng.uniform() < self.change_prob_parent {
                self.reassign(system, id)?;
            }
            let child_id = system.add_particle(child);
            if self.rng.uniform() < self.change_prob_child {
                self.reassign(system, child_id)?;
            }
            divisions += 1;
        }

        if divisions > 0 {
            debug!(divisions, size = system.size(), "population divisions applied");
        }
        system.set_force_nlist_rebuild(true);
        nlist.force_rebuild();
        Ok(())
    }

    /// Attempt age-proportional removals. Selection happens on a snapshot of
    /// the group, removal in a second pass, so earlier removals cannot bias
    /// later draws.
    pub fn remove(
        &mut self,
        t: u64,
        system: &mut System,
        nlist: &mut NeighborList,
    ) -> Result<()> {
        if !self.due(t) {
            return Ok(());
        }
        let prob_death = self.event_probability(self.death_rate, system, "death")?;
        let members: Vec<usize> = system.group(&self.group)?.to_vec();

        let mut to_remove = Vec::new();
        for id in members {
            let Some(p) = system.by_id(id) else {
                continue;
            };
            if self.rng.uniform() < p.age * prob_death {
                to_remove.push(id);
            }
        }
        let removals = to_remove.len();
        for id in to_remove {
            system.remove_particle(id)?;
        }

        if system.is_empty() {
            error!("Random population control: no particles left in the system.");
            return Err(SimulationError::numerical(
                "population reached zero; reduce the death rate",
            ));
        }
        if !system.group_ok(&self.group) {
            return Err(SimulationError::numerical(format!(
                "group bookkeeping mismatch for group {} after removal",
                self.group
            )));
        }
        if removals > 0 {
            debug!(removals, size = system.size(), "population removals applied");
        }
        system.set_force_nlist_rebuild(true);
        nlist.force_rebuild();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector;
    use crate::sim_box::SimBox;

    fn aged_system(count: usize, age: f64) -> System {
        let mut sys = System::new(SimBox::cube(20.0, false));
        sys.set_integrator_step(0.01);
        for i in 0..count {
            let id = sys.add_particle(
                Particle::new(0, 0, 1.0)
                    .with_pos(Vector::new(i as f64, 0.0, 0.0))
                    .with_director(Vector::Y),
            );
            sys.by_id_mut(id).unwrap().age = age;
        }
        sys
    }

    fn population(division_rate: f64, death_rate: f64) -> PopulationRandom {
        PopulationRandom::new(&PopulationConfig {
            freq: 10,
            division_rate,
            death_rate,
            seed: Some(5),
            ..Default::default()
        })
        .unwrap()
    }

    fn nlist_for(sys: &System) -> NeighborList {
        let mut nlist = NeighborList::new(2.0, 0.5).unwrap();
        nlist.build(sys);
        nlist
    }

    #[test]
    fn test_division_splits_along_director() {
        let mut sys = aged_system(1, 1000.0); // certain to divide
        let mut nlist = nlist_for(&sys);
        let mut pop = population(10.0, 0.0);

        pop.divide(10, &mut sys, &mut nlist).unwrap();
        assert_eq!(sys.size(), 2);
        // Child takes the next id, placed half a radius ahead along the
        // director; parent is pushed back by the other half.
        let parent = sys.by_id(0).unwrap();
        let child = sys.by_id(1).unwrap();
        assert!((child.pos - Vector::new(0.0, 0.5, 0.0)).length() < 1e-12);
        assert!((parent.pos - Vector::new(0.0, -0.5, 0.0)).length() < 1e-12);
        assert_eq!(child.director, parent.director);
        assert_eq!(parent.age, 0.0);
        assert_eq!(child.age, 0.0);
        assert!(child.in_group(GROUP_ALL));
        assert!(nlist.rebuild_forced());
        assert!(sys.force_nlist_rebuild());
    }

    #[test]
    fn test_off_cadence_steps_do_nothing() {
        let mut sys = aged_system(1, 1000.0);
        let mut nlist = nlist_for(&sys);
        let mut pop = population(10.0, 10.0);

        pop.divide(7, &mut sys, &mut nlist).unwrap();
        pop.remove(7, &mut sys, &mut nlist).unwrap();
        assert_eq!(sys.size(), 1);
        assert!(!nlist.rebuild_forced());
    }

    #[test]
    fn test_excessive_probability_is_fatal() {
        let mut sys = aged_system(1, 1.0);
        sys.set_integrator_step(10.0); // freq * dt * rate = 10 * 10 * 10 >> 1
        let mut nlist = nlist_for(&sys);
        let mut pop = population(10.0, 10.0);

        assert!(matches!(
            pop.divide(10, &mut sys, &mut nlist),
            Err(SimulationError::Numerical(_))
        ));
        assert!(matches!(
            pop.remove(10, &mut sys, &mut nlist),
            Err(SimulationError::Numerical(_))
        ));
    }

    #[test]
    fn test_removal_of_everything_is_fatal() {
        // Death probability 1 per attempt and enormous ages: all die.
        let mut sys = aged_system(3, 1000.0);
        let mut nlist = nlist_for(&sys);
        let mut pop = population(0.0, 10.0);

        let err = pop.remove(10, &mut sys, &mut nlist).unwrap_err();
        assert!(err.to_string().contains("population reached zero"));
    }

    #[test]
    fn test_young_particles_rarely_die() {
        let mut sys = aged_system(50, 0.0); // age 0: acceptance is 0
        let mut nlist = nlist_for(&sys);
        let mut pop = population(0.0, 1.0);

        pop.remove(10, &mut sys, &mut nlist).unwrap();
        assert_eq!(sys.size(), 50);
    }

    #[test]
    fn test_child_reassignment() {
        let mut sys = aged_system(1, 1000.0);
        sys.create_group("daughter");
        let mut pop = PopulationRandom::new(&PopulationConfig {
            freq: 10,
            division_rate: 10.0,
            change_prob_child: 1.0,
            new_type: Some(2),
            new_radius: Some(0.25),
            new_group: Some("daughter".to_string()),
            seed: Some(5),
            ..Default::default()
        })
        .unwrap();
        let mut nlist = nlist_for(&sys);

        pop.divide(10, &mut sys, &mut nlist).unwrap();
        let child = sys.by_id(1).unwrap();
        assert_eq!(child.type_id, 2);
        assert_eq!(child.radius, 0.25);
        assert!(child.in_group("daughter"));
        assert_eq!(sys.group("daughter").unwrap(), &[1]);
        // Parent untouched.
        assert_eq!(sys.by_id(0).unwrap().type_id, 0);
    }

    #[test]
    fn test_invalid_configuration_rejected() {
        assert!(PopulationRandom::new(&PopulationConfig {
            freq: 0,
            ..Default::default()
        })
        .is_err());
        assert!(PopulationRandom::new(&PopulationConfig {
            alpha: 1.5,
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn test_division_wraps_into_periodic_box() {
        let mut sys = System::new(SimBox::cube(10.0, true));
        sys.set_integrator_step(0.01);
        let id = sys.add_particle(
            Particle::new(0, 0, 1.0)
                .with_pos(Vector::new(0.0, 4.8, 0.0))
                .with_director(Vector::Y),
        );
        sys.by_id_mut(id).unwrap().age = 1000.0;
        let mut nlist = nlist_for(&sys);
        let mut pop = population(10.0, 0.0);

        pop.divide(10, &mut sys, &mut nlist).unwrap();
        let child = sys.by_id(1).unwrap();
        // 4.8 + 0.5 crosses the boundary at 5 and wraps to the far side.
        assert!((child.pos.y + 4.7).abs() < 1e-12);
    }
}
