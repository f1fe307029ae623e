//! Per-particle state.

use crate::math::{Scalar, Vector};

/// A single self-propelled particle.
///
/// The director is a unit vector in the tangent plane of the active
/// constraint at the particle's position; both properties are re-established
/// by `Constraint::enforce` after every mutation of position or orientation.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Stable identity, assigned by the store at creation and never reused.
    pub id: usize,
    /// Small integer tag selecting potential parameter sets.
    pub type_id: usize,
    pub pos: Vector,
    pub vel: Vector,
    /// Orientation of the self-propulsion axis.
    pub director: Vector,
    /// Angular velocity about the local surface normal.
    pub omega: Scalar,
    /// Force accumulated by the most recent potential evaluation.
    pub force: Vector,
    /// Torque accumulated by the most recent potential evaluation.
    pub torque: Vector,
    pub radius: Scalar,
    /// Time since creation or last division.
    pub age: Scalar,
    /// Names of the groups this particle belongs to.
    pub groups: Vec<String>,
}

impl Particle {
    pub fn new(id: usize, type_id: usize, radius: Scalar) -> Self {
        Self {
            id,
            type_id,
            pos: Vector::ZERO,
            vel: Vector::ZERO,
            director: Vector::X,
            omega: 0.0,
            force: Vector::ZERO,
            torque: Vector::ZERO,
            radius,
            age: 0.0,
            groups: Vec::new(),
        }
    }

    pub fn with_pos(mut self, pos: Vector) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_director(mut self, director: Vector) -> Self {
        self.director = director.normalize();
        self
    }

    pub fn in_group(&self, name: &str) -> bool {
        self.groups.iter().any(|g| g == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_particle_defaults() {
        let p = Particle::new(3, 1, 0.5);
        assert_eq!(p.id, 3);
        assert_eq!(p.type_id, 1);
        assert_eq!(p.radius, 0.5);
        assert_eq!(p.force, Vector::ZERO);
        assert_eq!(p.age, 0.0);
        assert!((p.director.length() - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_with_director_normalizes() {
        let p = Particle::new(0, 0, 1.0).with_director(Vector::new(0.0, 3.0, 4.0));
        assert!((p.director.length() - 1.0).abs() < 1e-15);
        assert!((p.director.y - 0.6).abs() < 1e-15);
    }
}
