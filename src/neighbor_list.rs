//! Verlet neighbor list with a skin padding.
//!
//! The list records, for every particle, the candidate interaction partners
//! within `cutoff + padding`. It is rebuilt wholesale, never incrementally:
//! either when any particle has moved more than half the padding since the
//! last build (the standard half-skin safety margin), or when a component
//! that changed the particle topology forces a rebuild.
//!
//! The build is cell-binned when the box can hold at least three cells per
//! axis and falls back to the all-pairs loop otherwise; the resulting
//! neighbor set is identical either way.

use crate::error::{Result, SimulationError};
use crate::math::{Scalar, Vector};
use crate::particle::Particle;
use crate::sim_box::SimBox;
use crate::system::System;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug)]
pub struct NeighborList {
    cutoff: Scalar,
    padding: Scalar,
    /// Half list: `neighbors[i]` holds only indices `j > i`.
    neighbors: Vec<Vec<usize>>,
    /// Position of each particle (by id) at the moment of the last build.
    reference_positions: HashMap<usize, Vector>,
    force_rebuild: bool,
    builds: usize,
}

impl NeighborList {
    pub fn new(cutoff: Scalar, padding: Scalar) -> Result<Self> {
        if cutoff <= 0.0 || !cutoff.is_finite() {
            return Err(SimulationError::config(format!(
                "neighbor list cutoff must be positive and finite, got {cutoff}"
            )));
        }
        if padding < 0.0 || !padding.is_finite() {
            return Err(SimulationError::config(format!(
                "neighbor list padding must be non-negative and finite, got {padding}"
            )));
        }
        Ok(Self {
            cutoff,
            padding,
            neighbors: Vec::new(),
            reference_positions: HashMap::new(),
            force_rebuild: true,
            builds: 0,
        })
    }

    pub fn cutoff(&self) -> Scalar {
        self.cutoff
    }

    pub fn padding(&self) -> Scalar {
        self.padding
    }

    /// Number of builds since construction.
    pub fn builds(&self) -> usize {
        self.builds
    }

    /// Candidate partners of particle `i` with index greater than `i`.
    pub fn neighbors(&self, i: usize) -> &[usize] {
        &self.neighbors[i]
    }

    /// Mark the list unconditionally stale; the next evaluation must rebuild
    /// regardless of displacement. Called after insertions and removals.
    pub fn force_rebuild(&mut self) {
        self.force_rebuild = true;
    }

    pub fn rebuild_forced(&self) -> bool {
        self.force_rebuild
    }

    /// True when the particle has moved more than half the padding since the
    /// last build. Particles unknown to the list (added since then) are
    /// always stale.
    pub fn need_update(&self, p: &Particle, sim_box: &SimBox) -> bool {
        match self.reference_positions.get(&p.id) {
            Some(&reference) => {
                let displacement = sim_box.min_image(reference, p.pos).length();
                displacement > 0.5 * self.padding
            }
            None => true,
        }
    }

    /// Recompute the neighbor sets from current positions and record them as
    /// the new staleness reference.
    pub fn build(&mut self, system: &System) {
        let n = system.size();
        let range = self.cutoff + self.padding;
        let sim_box = system.sim_box();

        self.neighbors.clear();
        self.neighbors.resize(n, Vec::new());

        if let Some(grid) = CellGrid::try_new(sim_box, range) {
            self.build_binned(system, &grid, range);
        } else {
            self.build_all_pairs(system, range);
        }

        self.reference_positions.clear();
        for p in system.particles() {
            self.reference_positions.insert(p.id, p.pos);
        }
        self.force_rebuild = false;
        self.builds += 1;
        debug!(build = self.builds, particles = n, "rebuilt neighbor list");
    }

    fn build_all_pairs(&mut self, system: &System, range: Scalar) {
        let range_sq = range * range;
        let particles = system.particles();
        let sim_box = system.sim_box();
        for i in 0..particles.len() {
            for j in (i + 1)..particles.len() {
                let d = sim_box.min_image(particles[i].pos, particles[j].pos);
                if d.length_squared() <= range_sq {
                    self.neighbors[i].push(j);
                }
            }
        }
    }

    fn build_binned(&mut self, system: &System, grid: &CellGrid, range: Scalar) {
        let range_sq = range * range;
        let particles = system.particles();
        let sim_box = system.sim_box();

        let mut cells: Vec<Vec<usize>> = vec![Vec::new(); grid.cell_count()];
        for (i, p) in particles.iter().enumerate() {
            cells[grid.cell_of(p.pos)].push(i);
        }

        for (i, p) in particles.iter().enumerate() {
            for cell in grid.neighborhood(p.pos, sim_box.periodic) {
                for &j in &cells[cell] {
                    if j <= i {
                        continue;
                    }
                    let d = sim_box.min_image(p.pos, particles[j].pos);
                    if d.length_squared() <= range_sq {
                        self.neighbors[i].push(j);
                    }
                }
            }
        }
        // Binning visits cells, not indices, so restore index order to keep
        // pair traversal identical to the all-pairs build.
        for list in &mut self.neighbors {
            list.sort_unstable();
        }
    }
}

/// Uniform grid used to bin particles during a build.
struct CellGrid {
    origin: Vector,
    cell: Vector,
    nx: usize,
    ny: usize,
    nz: usize,
}

impl CellGrid {
    /// A grid is only worthwhile when every axis fits at least three cells of
    /// edge >= `range`; otherwise the caller should use the all-pairs loop.
    fn try_new(sim_box: &SimBox, range: Scalar) -> Option<Self> {
        let nx = (sim_box.lx / range).floor() as usize;
        let ny = (sim_box.ly / range).floor() as usize;
        let nz = (sim_box.lz / range).floor() as usize;
        if nx < 3 || ny < 3 || nz < 3 {
            return None;
        }
        Some(Self {
            origin: Vector::new(sim_box.xlo, sim_box.ylo, sim_box.zlo),
            cell: Vector::new(
                sim_box.lx / nx as Scalar,
                sim_box.ly / ny as Scalar,
                sim_box.lz / nz as Scalar,
            ),
            nx,
            ny,
            nz,
        })
    }

    fn cell_count(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    fn coords_of(&self, pos: Vector) -> (usize, usize, usize) {
        let rel = (pos - self.origin) / self.cell;
        let clamp = |v: Scalar, n: usize| (v.floor().max(0.0) as usize).min(n - 1);
        (
            clamp(rel.x, self.nx),
            clamp(rel.y, self.ny),
            clamp(rel.z, self.nz),
        )
    }

    fn cell_of(&self, pos: Vector) -> usize {
        let (cx, cy, cz) = self.coords_of(pos);
        (cz * self.ny + cy) * self.nx + cx
    }

    /// Indices of the 27-cell neighborhood around `pos`. Out-of-range cells
    /// wrap for a periodic box and are skipped for a fixed one.
    fn neighborhood(&self, pos: Vector, periodic: bool) -> Vec<usize> {
        let (cx, cy, cz) = self.coords_of(pos);
        let mut cells = Vec::with_capacity(27);
        for dz in -1i64..=1 {
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let coords = [
                        (cx as i64 + dx, self.nx),
                        (cy as i64 + dy, self.ny),
                        (cz as i64 + dz, self.nz),
                    ];
                    let mut wrapped = [0usize; 3];
                    let mut in_range = true;
                    for (k, &(c, n)) in coords.iter().enumerate() {
                        let n = n as i64;
                        if c < 0 || c >= n {
                            if periodic {
                                wrapped[k] = (c.rem_euclid(n)) as usize;
                            } else {
                                in_range = false;
                                break;
                            }
                        } else {
                            wrapped[k] = c as usize;
                        }
                    }
                    if in_range {
                        let idx = (wrapped[2] * self.ny + wrapped[1]) * self.nx + wrapped[0];
                        if !cells.contains(&idx) {
                            cells.push(idx);
                        }
                    }
                }
            }
        }
        cells
    }
}
