use nalgebra::{Point3, Vector3};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_BOUNDARY_SPRING: f64 = 250.0;
pub const DEFAULT_BOUNDARY_EXTENT: f64 = 1e10;

/// Shape of the enclosure that keeps atoms from drifting away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryShape {
    /// Axis-aligned cube; the extent is its half-width.
    Cube,
    /// Sphere; the extent is its radius.
    #[default]
    Sphere,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown boundary type '{0}' (expected 'cube' or 'sphere')")]
pub struct ParseBoundaryShapeError(pub String);

impl FromStr for BoundaryShape {
    type Err = ParseBoundaryShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cube" => Ok(Self::Cube),
            "sphere" => Ok(Self::Sphere),
            _ => Err(ParseBoundaryShapeError(s.to_string())),
        }
    }
}

impl fmt::Display for BoundaryShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cube => write!(f, "cube"),
            Self::Sphere => write!(f, "sphere"),
        }
    }
}

/// A soft wall: zero energy inside, harmonic penalty on the excess outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary {
    pub shape: BoundaryShape,
    /// Spring constant in kcal/(mol·Å²).
    pub spring: f64,
    /// Half-width (cube) or radius (sphere) in Angstroms.
    pub extent: f64,
    pub origin: Point3<f64>,
}

impl Default for Boundary {
    fn default() -> Self {
        Self {
            shape: BoundaryShape::Sphere,
            spring: DEFAULT_BOUNDARY_SPRING,
            extent: DEFAULT_BOUNDARY_EXTENT,
            origin: Point3::origin(),
        }
    }
}

impl Boundary {
    /// A boundary with a non-positive extent encloses nothing and is ignored.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.extent > 0.0
    }

    /// Penalty energy and its gradient with respect to `position`.
    pub fn penalty(&self, position: &Point3<f64>) -> (f64, Vector3<f64>) {
        if !self.is_active() {
            return (0.0, Vector3::zeros());
        }
        let offset = position - self.origin;
        match self.shape {
            BoundaryShape::Cube => {
                let mut energy = 0.0;
                let mut gradient = Vector3::zeros();
                for axis in 0..3 {
                    let d = offset[axis];
                    let excess = d.abs() - self.extent;
                    if excess >= 0.0 {
                        energy += self.spring * excess * excess;
                        gradient[axis] = 2.0 * self.spring * excess * d.signum();
                    }
                }
                (energy, gradient)
            }
            BoundaryShape::Sphere => {
                let r = offset.norm();
                let excess = r - self.extent;
                if excess < 0.0 || r == 0.0 {
                    return (0.0, Vector3::zeros());
                }
                let energy = self.spring * excess * excess;
                let gradient = offset / r * (2.0 * self.spring * excess);
                (energy, gradient)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn boundary(shape: BoundaryShape, extent: f64) -> Boundary {
        Boundary {
            shape,
            spring: 10.0,
            extent,
            origin: Point3::origin(),
        }
    }

    #[test]
    fn parses_shape_names_case_insensitively() {
        assert_eq!("Cube".parse::<BoundaryShape>(), Ok(BoundaryShape::Cube));
        assert_eq!(" sphere ".parse::<BoundaryShape>(), Ok(BoundaryShape::Sphere));
        assert!("torus".parse::<BoundaryShape>().is_err());
    }

    #[test]
    fn penalty_is_zero_inside_the_enclosure() {
        let p = Point3::new(1.0, 1.0, 1.0);
        assert_eq!(boundary(BoundaryShape::Sphere, 5.0).penalty(&p).0, 0.0);
        assert_eq!(boundary(BoundaryShape::Cube, 5.0).penalty(&p).0, 0.0);
    }

    #[test]
    fn sphere_penalty_is_harmonic_in_radial_excess() {
        let (energy, gradient) = boundary(BoundaryShape::Sphere, 2.0).penalty(&Point3::new(0.0, 3.0, 0.0));
        assert!(f64_approx_equal(energy, 10.0));
        assert!(f64_approx_equal(gradient.y, 20.0));
        assert!(f64_approx_equal(gradient.x, 0.0));
    }

    #[test]
    fn cube_penalty_sums_each_axis_independently() {
        let (energy, gradient) = boundary(BoundaryShape::Cube, 1.0).penalty(&Point3::new(-3.0, 2.0, 0.5));
        assert!(f64_approx_equal(energy, 10.0 * 4.0 + 10.0 * 1.0));
        assert!(f64_approx_equal(gradient.x, -40.0));
        assert!(f64_approx_equal(gradient.y, 20.0));
        assert!(f64_approx_equal(gradient.z, 0.0));
    }

    #[test]
    fn inactive_boundary_contributes_nothing() {
        let (energy, gradient) = boundary(BoundaryShape::Cube, 0.0).penalty(&Point3::new(9.0, 9.0, 9.0));
        assert_eq!(energy, 0.0);
        assert_eq!(gradient, Vector3::zeros());
    }
}
