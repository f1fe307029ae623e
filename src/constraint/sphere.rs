//! Spherical constraint surface.

use super::{Constraint, make_tangent};
use crate::config::ConstraintConfig;
use crate::error::{Result, SimulationError};
use crate::math::{Scalar, Vector};
use crate::particle::Particle;

/// Sphere of radius `r` centered at the origin.
#[derive(Debug)]
pub struct Sphere {
    radius: Scalar,
}

impl Sphere {
    pub fn new(radius: Scalar) -> Result<Self> {
        if radius <= 0.0 || !radius.is_finite() {
            return Err(SimulationError::config(format!(
                "sphere constraint radius must be positive and finite, got {radius}"
            )));
        }
        Ok(Self { radius })
    }

    pub fn radius(&self) -> Scalar {
        self.radius
    }
}

pub(super) fn factory(config: &ConstraintConfig) -> Result<Box<dyn Constraint>> {
    let radius = config.radius.ok_or_else(|| {
        SimulationError::config("sphere constraint requires a radius parameter")
    })?;
    Ok(Box::new(Sphere::new(radius)?))
}

impl Constraint for Sphere {
    fn name(&self) -> &'static str {
        "sphere"
    }

    fn normal(&self, p: &Particle) -> Vector {
        // A particle sitting exactly at the center has no preferred normal;
        // any fixed direction is a valid answer.
        p.pos.try_normalize().unwrap_or(Vector::Z)
    }

    fn enforce(&self, p: &mut Particle) {
        let n = self.normal(p);
        p.pos = self.radius * n;
        make_tangent(&mut p.director, n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle_at(pos: Vector) -> Particle {
        Particle::new(0, 0, 1.0)
            .with_pos(pos)
            .with_director(Vector::new(0.0, 1.0, 0.0))
    }

    #[test]
    fn test_invalid_radius_is_fatal_at_construction() {
        assert!(Sphere::new(0.0).is_err());
        assert!(Sphere::new(-3.0).is_err());
        assert!(Sphere::new(f64::NAN).is_err());
        assert!(Sphere::new(5.0).is_ok());
    }

    #[test]
    fn test_enforce_places_particle_on_surface() {
        let sphere = Sphere::new(5.0).unwrap();
        let mut p = particle_at(Vector::new(1.0, 2.0, 2.0));
        sphere.enforce(&mut p);
        assert!((p.pos.length() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_enforce_is_idempotent() {
        let sphere = Sphere::new(5.0).unwrap();
        let mut p = particle_at(Vector::new(-3.0, 4.0, 12.0));
        sphere.enforce(&mut p);
        let once = p.clone();
        sphere.enforce(&mut p);
        assert!((p.pos - once.pos).length() < 1e-12);
        assert!((p.director - once.director).length() < 1e-12);
    }

    #[test]
    fn test_enforce_restores_director_tangency() {
        let sphere = Sphere::new(2.0).unwrap();
        let mut p = particle_at(Vector::new(0.0, 0.0, 3.0));
        p.director = Vector::new(0.3, 0.4, 0.9);
        sphere.enforce(&mut p);
        let n = sphere.normal(&p);
        assert!(p.director.dot(n).abs() < 1e-12);
        assert!((p.director.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_project_force_removes_normal_component() {
        let sphere = Sphere::new(5.0).unwrap();
        let mut p = particle_at(Vector::new(0.0, 0.0, 5.0));

        // Purely radial force projects to zero.
        p.force = Vector::new(0.0, 0.0, 7.0);
        assert!(sphere.project_force(&p).length() < 1e-12);

        // A tangent force is returned unchanged.
        p.force = Vector::new(1.5, -2.0, 0.0);
        let projected = sphere.project_force(&p);
        assert!((projected - p.force).length() < 1e-12);
    }

    #[test]
    fn test_project_torque_takes_normal_component() {
        let sphere = Sphere::new(5.0).unwrap();
        let mut p = particle_at(Vector::new(0.0, 0.0, 5.0));
        p.torque = Vector::new(1.0, 2.0, 3.0);
        assert!((sphere.project_torque(&p) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotate_director_preserves_norm_and_tangency() {
        let sphere = Sphere::new(5.0).unwrap();
        let mut p = particle_at(Vector::new(0.0, 0.0, 5.0));
        p.director = Vector::X;

        for _ in 0..1000 {
            sphere.rotate_director(&mut p, 0.37);
            assert!((p.director.length() - 1.0).abs() < 1e-12);
            assert!(p.director.dot(sphere.normal(&p)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_rotate_director_quarter_turn() {
        let sphere = Sphere::new(1.0).unwrap();
        let mut p = particle_at(Vector::new(0.0, 0.0, 1.0));
        p.director = Vector::X;
        sphere.rotate_director(&mut p, std::f64::consts::FRAC_PI_2);
        assert!((p.director - Vector::Y).length() < 1e-12);
    }

    #[test]
    fn test_degenerate_center_position_still_answers() {
        let sphere = Sphere::new(5.0).unwrap();
        let mut p = particle_at(Vector::ZERO);
        sphere.enforce(&mut p);
        assert!((p.pos.length() - 5.0).abs() < 1e-12);
    }
}
