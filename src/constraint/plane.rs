//! Planar constraint surface.

use super::{Constraint, make_tangent};
use crate::config::ConstraintConfig;
use crate::error::{Result, SimulationError};
use crate::math::{Scalar, Vector};
use crate::particle::Particle;

/// Plane z = offset with normal +z.
#[derive(Debug)]
pub struct Plane {
    offset: Scalar,
}

impl Plane {
    pub fn new(offset: Scalar) -> Result<Self> {
        if !offset.is_finite() {
            return Err(SimulationError::config(format!(
                "plane constraint offset must be finite, got {offset}"
            )));
        }
        Ok(Self { offset })
    }

    pub fn offset(&self) -> Scalar {
        self.offset
    }
}

pub(super) fn factory(config: &ConstraintConfig) -> Result<Box<dyn Constraint>> {
    Ok(Box::new(Plane::new(config.offset.unwrap_or(0.0))?))
}

impl Constraint for Plane {
    fn name(&self) -> &'static str {
        "plane"
    }

    fn normal(&self, _p: &Particle) -> Vector {
        Vector::Z
    }

    fn enforce(&self, p: &mut Particle) {
        p.pos.z = self.offset;
        make_tangent(&mut p.director, Vector::Z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enforce_sets_out_of_plane_coordinate() {
        let plane = Plane::new(2.0).unwrap();
        let mut p = Particle::new(0, 0, 1.0).with_pos(Vector::new(1.0, -4.0, 9.0));
        plane.enforce(&mut p);
        assert_eq!(p.pos, Vector::new(1.0, -4.0, 2.0));

        // Idempotent.
        plane.enforce(&mut p);
        assert_eq!(p.pos, Vector::new(1.0, -4.0, 2.0));
    }

    #[test]
    fn test_project_force_zeros_normal_component() {
        let plane = Plane::new(0.0).unwrap();
        let mut p = Particle::new(0, 0, 1.0);
        p.force = Vector::new(0.0, 0.0, -9.81);
        assert!(plane.project_force(&p).length() < 1e-15);

        p.force = Vector::new(3.0, 4.0, -9.81);
        let projected = plane.project_force(&p);
        assert_eq!(projected, Vector::new(3.0, 4.0, 0.0));
    }

    #[test]
    fn test_rotate_director_stays_in_plane() {
        let plane = Plane::new(0.0).unwrap();
        let mut p = Particle::new(0, 0, 1.0).with_director(Vector::X);
        plane.rotate_director(&mut p, std::f64::consts::FRAC_PI_2);
        assert!((p.director - Vector::Y).length() < 1e-12);
        assert!(p.director.z.abs() < 1e-15);
    }

    #[test]
    fn test_rotation_drift_does_not_compound() {
        let plane = Plane::new(0.0).unwrap();
        let mut p = Particle::new(0, 0, 1.0).with_director(Vector::X);
        for _ in 0..100_000 {
            plane.rotate_director(&mut p, 0.013);
        }
        assert!((p.director.length() - 1.0).abs() < 1e-12);
        assert!(p.director.z.abs() < 1e-12);
    }
}
