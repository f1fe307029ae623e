//! Manifold constraints.
//!
//! A constraint keeps every particle's position on a surface and its director
//! in the local tangent plane. Concrete shapes implement `normal` and
//! `enforce`; tangent-space projection and director rotation are shared,
//! expressed in terms of the local surface normal.
//!
//! The registry maps shape names to factory functions so that new shapes are
//! added by extending the registration table, not by touching dispatch sites.

use crate::config::ConstraintConfig;
use crate::error::{Result, SimulationError};
use crate::math::{Scalar, Vector, tangent_component};
use crate::particle::Particle;
use std::collections::HashMap;

pub mod plane;
pub mod sphere;

pub use plane::Plane;
pub use sphere::Sphere;

/// Geometric contract every surface implements.
///
/// A constraint never fails at runtime; misconfiguration (for example a
/// zero-radius sphere) is rejected at construction. Degenerate inputs get
/// degenerate but well-defined answers, such as the zero vector for a purely
/// normal force.
pub trait Constraint: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Outward unit normal at the particle's position.
    fn normal(&self, p: &Particle) -> Vector;

    /// Move the particle to the nearest point on the surface and restore the
    /// director to the tangent plane. Idempotent.
    fn enforce(&self, p: &mut Particle);

    /// Accumulated force with its normal component removed.
    fn project_force(&self, p: &Particle) -> Vector {
        tangent_component(p.force, self.normal(p))
    }

    /// Scalar angular-velocity contribution: the torque component along the
    /// local normal.
    fn project_torque(&self, p: &Particle) -> Scalar {
        p.torque.dot(self.normal(p))
    }

    /// Rotate the director by `dtheta` about the local normal, staying in the
    /// tangent plane. Renormalizes on every call so floating-point drift
    /// cannot compound.
    fn rotate_director(&self, p: &mut Particle, dtheta: Scalar) {
        let axis = self.normal(p);
        let n = p.director;
        let (s, c) = dtheta.sin_cos();
        let rotated = n * c + axis.cross(n) * s + axis * (axis.dot(n) * (1.0 - c));
        p.director = rotated;
        make_tangent(&mut p.director, axis);
    }
}

/// Project a director onto the tangent plane of unit normal `n` and
/// renormalize. A director parallel to the normal has no meaningful tangent
/// image; it is replaced by an arbitrary tangent direction.
pub(crate) fn make_tangent(director: &mut Vector, n: Vector) {
    let t = tangent_component(*director, n);
    *director = if t.length_squared() > 1e-24 {
        t.normalize()
    } else {
        n.any_orthonormal_vector()
    };
}

type ConstraintFactory = fn(&ConstraintConfig) -> Result<Box<dyn Constraint>>;

/// Registry mapping constraint shape names to factories.
pub struct ConstraintRegistry {
    factories: HashMap<String, ConstraintFactory>,
}

impl ConstraintRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register the shapes that ship with the engine.
    pub fn with_standard_constraints(mut self) -> Self {
        self.register("sphere", sphere::factory);
        self.register("plane", plane::factory);
        self
    }

    pub fn register(&mut self, name: &str, factory: ConstraintFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, config: &ConstraintConfig) -> Result<Box<dyn Constraint>> {
        match self.factories.get(&config.kind) {
            Some(factory) => factory(config),
            None => {
                let mut available: Vec<&str> =
                    self.factories.keys().map(String::as_str).collect();
                available.sort_unstable();
                Err(SimulationError::config(format!(
                    "unknown constraint: '{}'. Available constraints: {}",
                    config.kind,
                    available.join(", ")
                )))
            }
        }
    }
}

impl Default for ConstraintRegistry {
    fn default() -> Self {
        Self::new().with_standard_constraints()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_creates_sphere_and_plane() {
        let registry = ConstraintRegistry::default();

        let cfg = ConstraintConfig {
            kind: "sphere".to_string(),
            radius: Some(5.0),
            offset: None,
        };
        let c = registry.create(&cfg).unwrap();
        assert_eq!(c.name(), "sphere");

        let cfg = ConstraintConfig {
            kind: "plane".to_string(),
            radius: None,
            offset: Some(1.0),
        };
        let c = registry.create(&cfg).unwrap();
        assert_eq!(c.name(), "plane");
    }

    #[test]
    fn test_unknown_constraint_error_lists_available() {
        let registry = ConstraintRegistry::default();
        let cfg = ConstraintConfig {
            kind: "torus".to_string(),
            radius: Some(1.0),
            offset: None,
        };
        let err = registry.create(&cfg).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("unknown constraint"));
        assert!(message.contains("sphere"));
        assert!(message.contains("plane"));
    }

    #[test]
    fn test_make_tangent_handles_normal_aligned_director() {
        let n = Vector::Z;
        let mut d = Vector::Z;
        make_tangent(&mut d, n);
        assert!(d.dot(n).abs() < 1e-12);
        assert!((d.length() - 1.0).abs() < 1e-12);
    }
}
