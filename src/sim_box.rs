//! Axis-aligned simulation domain.

use crate::math::{Scalar, Vector};
use serde::{Deserialize, Serialize};

/// Simulation box centered at the origin.
///
/// Pure geometry: edge lengths, the derived low/high bound per axis, and a
/// periodicity flag. Shared read-only by every component that needs
/// minimum-image wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimBox {
    pub lx: Scalar,
    pub ly: Scalar,
    pub lz: Scalar,
    pub xlo: Scalar,
    pub xhi: Scalar,
    pub ylo: Scalar,
    pub yhi: Scalar,
    pub zlo: Scalar,
    pub zhi: Scalar,
    pub periodic: bool,
}

impl SimBox {
    pub fn new(lx: Scalar, ly: Scalar, lz: Scalar, periodic: bool) -> Self {
        Self {
            lx,
            ly,
            lz,
            xlo: -0.5 * lx,
            xhi: 0.5 * lx,
            ylo: -0.5 * ly,
            yhi: 0.5 * ly,
            zlo: -0.5 * lz,
            zhi: 0.5 * lz,
            periodic,
        }
    }

    /// Cube of edge `l`.
    pub fn cube(l: Scalar, periodic: bool) -> Self {
        Self::new(l, l, l, periodic)
    }

    /// Wrap a position into the primary image. No-op for a fixed box.
    pub fn wrap(&self, r: &mut Vector) {
        if !self.periodic {
            return;
        }
        if r.x > self.xhi {
            r.x -= self.lx;
        } else if r.x < self.xlo {
            r.x += self.lx;
        }
        if r.y > self.yhi {
            r.y -= self.ly;
        } else if r.y < self.ylo {
            r.y += self.ly;
        }
        if r.z > self.zhi {
            r.z -= self.lz;
        } else if r.z < self.zlo {
            r.z += self.lz;
        }
    }

    /// Minimum-image displacement from `a` to `b`.
    pub fn min_image(&self, a: Vector, b: Vector) -> Vector {
        let mut d = b - a;
        if self.periodic {
            if d.x > 0.5 * self.lx {
                d.x -= self.lx;
            } else if d.x < -0.5 * self.lx {
                d.x += self.lx;
            }
            if d.y > 0.5 * self.ly {
                d.y -= self.ly;
            } else if d.y < -0.5 * self.ly {
                d.y += self.ly;
            }
            if d.z > 0.5 * self.lz {
                d.z -= self.lz;
            } else if d.z < -0.5 * self.lz {
                d.z += self.lz;
            }
        }
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_centered() {
        let b = SimBox::new(10.0, 20.0, 30.0, false);
        assert_eq!(b.xlo, -5.0);
        assert_eq!(b.xhi, 5.0);
        assert_eq!(b.ylo, -10.0);
        assert_eq!(b.zhi, 15.0);
    }

    #[test]
    fn test_wrap_periodic() {
        let b = SimBox::cube(10.0, true);
        let mut r = Vector::new(5.5, -5.5, 0.0);
        b.wrap(&mut r);
        assert_eq!(r, Vector::new(-4.5, 4.5, 0.0));
    }

    #[test]
    fn test_wrap_fixed_is_noop() {
        let b = SimBox::cube(10.0, false);
        let mut r = Vector::new(7.0, 0.0, 0.0);
        b.wrap(&mut r);
        assert_eq!(r, Vector::new(7.0, 0.0, 0.0));
    }

    #[test]
    fn test_min_image_crosses_boundary() {
        let b = SimBox::cube(10.0, true);
        let a = Vector::new(4.5, 0.0, 0.0);
        let c = Vector::new(-4.5, 0.0, 0.0);
        let d = b.min_image(a, c);
        assert!((d.x - 1.0).abs() < 1e-12);
        assert_eq!(d.y, 0.0);
    }

    #[test]
    fn test_min_image_fixed_box() {
        let b = SimBox::cube(10.0, false);
        let d = b.min_image(Vector::new(4.5, 0.0, 0.0), Vector::new(-4.5, 0.0, 0.0));
        assert_eq!(d.x, -9.0);
    }
}
