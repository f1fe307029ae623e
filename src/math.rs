//! Scalar and vector types shared by every component, plus small geometric
//! helpers used when seeding particles on a surface.

use crate::rng::SimRng;
use rand::Rng;

/// Scalar type for physics calculations (f64 for precision)
pub type Scalar = f64;

/// 3D vector type for positions, velocities, forces, and directors
pub type Vector = glam::DVec3;

/// Draw a vector uniformly distributed on the unit sphere.
pub fn random_unit_vector(rng: &mut SimRng) -> Vector {
    let theta = rng.random_range(0.0..=2.0 * std::f64::consts::PI);
    let phi = f64::acos(rng.random_range(-1.0..=1.0));

    Vector::new(
        phi.sin() * theta.cos(),
        phi.sin() * theta.sin(),
        phi.cos(),
    )
}

/// Remove the component of `v` along the unit vector `normal`.
#[inline]
pub fn tangent_component(v: Vector, normal: Vector) -> Vector {
    v - v.dot(normal) * normal
}
