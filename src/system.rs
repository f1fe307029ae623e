//! Particle store.
//!
//! Owns the mutable particle array, named group membership, and the small
//! pieces of bookkeeping shared between components: the simulation box, the
//! integrator time step (needed by population event probabilities), and the
//! flag that forces the next neighbor-list rebuild after a topology change.

use crate::error::{Result, SimulationError};
use crate::math::{Scalar, Vector};
use crate::particle::Particle;
use crate::sim_box::SimBox;
use std::collections::HashMap;
use tracing::info;

/// Name of the implicit group every particle belongs to.
pub const GROUP_ALL: &str = "all";

#[derive(Debug)]
pub struct System {
    particles: Vec<Particle>,
    sim_box: SimBox,
    /// Group name to member particle ids.
    groups: HashMap<String, Vec<usize>>,
    /// Particle id to index in `particles`.
    index: HashMap<usize, usize>,
    /// Next id to hand out. Ids are never reused within a run.
    next_id: usize,
    force_nlist_rebuild: bool,
    integrator_step: Scalar,
}

impl System {
    pub fn new(sim_box: SimBox) -> Self {
        let mut groups = HashMap::new();
        groups.insert(GROUP_ALL.to_string(), Vec::new());
        Self {
            particles: Vec::new(),
            sim_box,
            groups,
            index: HashMap::new(),
            next_id: 0,
            force_nlist_rebuild: false,
            integrator_step: 0.0,
        }
    }

    pub fn sim_box(&self) -> &SimBox {
        &self.sim_box
    }

    pub fn size(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn get(&self, index: usize) -> &Particle {
        &self.particles[index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut Particle {
        &mut self.particles[index]
    }

    pub fn index_of(&self, id: usize) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn by_id(&self, id: usize) -> Option<&Particle> {
        self.index_of(id).map(|i| &self.particles[i])
    }

    pub fn by_id_mut(&mut self, id: usize) -> Option<&mut Particle> {
        let i = self.index_of(id)?;
        Some(&mut self.particles[i])
    }

    /// Id the next appended particle will receive.
    pub fn next_id(&self) -> usize {
        self.next_id
    }

    /// Append a particle. The store assigns the id; any id set by the caller
    /// is overwritten. Returns the assigned id.
    pub fn add_particle(&mut self, mut p: Particle) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        p.id = id;
        if !p.in_group(GROUP_ALL) {
            p.groups.push(GROUP_ALL.to_string());
        }
        for g in &p.groups {
            self.groups.entry(g.clone()).or_default().push(id);
        }
        self.index.insert(id, self.particles.len());
        self.particles.push(p);
        id
    }

    /// Remove a particle by id, compacting indices. Group membership sets and
    /// the id index are kept consistent; the removed id is not reused.
    pub fn remove_particle(&mut self, id: usize) -> Result<()> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| SimulationError::config(format!("no particle with id {id}")))?;
        self.particles.remove(idx);
        self.index.remove(&id);
        for i in idx..self.particles.len() {
            self.index.insert(self.particles[i].id, i);
        }
        for members in self.groups.values_mut() {
            members.retain(|&m| m != id);
        }
        Ok(())
    }

    /// Create an empty group. Creating a group that already exists is allowed
    /// and leaves its membership untouched.
    pub fn create_group(&mut self, name: &str) {
        if self.groups.contains_key(name) {
            return;
        }
        info!("Creating particle group {name}.");
        self.groups.insert(name.to_string(), Vec::new());
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// Member ids of a named group.
    pub fn group(&self, name: &str) -> Result<&[usize]> {
        self.groups
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| SimulationError::config(format!("group {name} has not been defined")))
    }

    pub fn add_to_group(&mut self, id: usize, name: &str) -> Result<()> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| SimulationError::config(format!("no particle with id {id}")))?;
        let members = self
            .groups
            .get_mut(name)
            .ok_or_else(|| SimulationError::config(format!("group {name} has not been defined")))?;
        if !members.contains(&id) {
            members.push(id);
        }
        let p = &mut self.particles[idx];
        if !p.in_group(name) {
            p.groups.push(name.to_string());
        }
        Ok(())
    }

    /// Move a particle from one group to another. Moving within the implicit
    /// `all` group is a no-op.
    pub fn change_group(&mut self, id: usize, old: &str, new: &str) -> Result<()> {
        if old == new {
            return Ok(());
        }
        if old != GROUP_ALL {
            if let Some(members) = self.groups.get_mut(old) {
                members.retain(|&m| m != id);
            }
            if let Some(p) = self.by_id_mut(id) {
                p.groups.retain(|g| g != old);
            }
        }
        if new != GROUP_ALL {
            self.add_to_group(id, new)?;
        }
        Ok(())
    }

    /// Verify that group membership bookkeeping agrees with the per-particle
    /// group lists. Used after population events.
    pub fn group_ok(&self, name: &str) -> bool {
        let Some(members) = self.groups.get(name) else {
            return false;
        };
        for &id in members {
            match self.by_id(id) {
                Some(p) if p.in_group(name) => {}
                _ => return false,
            }
        }
        let claimed = self.particles.iter().filter(|p| p.in_group(name)).count();
        claimed == members.len()
    }

    /// Zero every particle's force accumulator.
    pub fn reset_forces(&mut self) {
        for p in &mut self.particles {
            p.force = Vector::ZERO;
        }
    }

    /// Zero every particle's torque accumulator.
    pub fn reset_torques(&mut self) {
        for p in &mut self.particles {
            p.torque = Vector::ZERO;
        }
    }

    pub fn set_force_nlist_rebuild(&mut self, flag: bool) {
        self.force_nlist_rebuild = flag;
    }

    pub fn force_nlist_rebuild(&self) -> bool {
        self.force_nlist_rebuild
    }

    pub fn set_integrator_step(&mut self, dt: Scalar) {
        self.integrator_step = dt;
    }

    pub fn integrator_step(&self) -> Scalar {
        self.integrator_step
    }
}
