use crate::core::models::boundary::BoundaryShape;
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;
use tracing::warn;

#[inline]
pub fn distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    (b - a).norm()
}

#[inline]
pub fn distance_squared(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    (b - a).norm_squared()
}

/// Unit vector pointing from `from` to `to`, or the zero vector for coincident points.
#[inline]
pub fn unit_vector(from: &Point3<f64>, to: &Point3<f64>) -> Vector3<f64> {
    let delta = to - from;
    let r = delta.norm();
    if r == 0.0 {
        Vector3::zeros()
    } else {
        delta / r
    }
}

/// Dot product of two unit vectors, clamped to `[-1, 1]` so it is always a valid cosine.
#[inline]
pub fn unit_dot(u: &Vector3<f64>, v: &Vector3<f64>) -> f64 {
    u.dot(v).clamp(-1.0, 1.0)
}

/// Cross product of two unit vectors, normalized by the sine of the angle between them.
///
/// Returns the zero vector when the inputs are parallel.
#[inline]
pub fn unit_cross(u: &Vector3<f64>, v: &Vector3<f64>) -> Vector3<f64> {
    let cos = unit_dot(u, v);
    let sin = (1.0 - cos * cos).sqrt();
    if sin < f64::EPSILON {
        Vector3::zeros()
    } else {
        u.cross(v) / sin
    }
}

/// Unit vector from `from` to `to` scaled by a known separation, such as a
/// cached bond length. Zero when the separation is zero.
#[inline]
pub fn unit_vector_with_length(from: &Point3<f64>, to: &Point3<f64>, length: f64) -> Vector3<f64> {
    if length == 0.0 {
        Vector3::zeros()
    } else {
        (to - from) / length
    }
}

/// Bond angle i-j-k in degrees, with `j` as the vertex.
pub fn bond_angle(i: &Point3<f64>, j: &Point3<f64>, k: &Point3<f64>) -> f64 {
    angle_between(&unit_vector(j, i), &unit_vector(j, k))
}

/// Angle in degrees between two unit bond vectors leaving the same vertex.
#[inline]
pub fn angle_between(u_ji: &Vector3<f64>, u_jk: &Vector3<f64>) -> f64 {
    unit_dot(u_ji, u_jk).acos().to_degrees()
}

/// Signed dihedral angle i-j-k-l in degrees, in `(-180, 180]`.
///
/// Uses the IUPAC sign convention: looking down the j→k bond, a clockwise
/// rotation of the far substituent is positive.
pub fn dihedral_angle(i: &Point3<f64>, j: &Point3<f64>, k: &Point3<f64>, l: &Point3<f64>) -> f64 {
    dihedral_between(&(j - i), &(k - j), &(l - k))
}

/// Signed dihedral in degrees along the chained bond vectors i→j, j→k and k→l.
/// The vectors need not be normalized.
pub fn dihedral_between(b1: &Vector3<f64>, b2: &Vector3<f64>, b3: &Vector3<f64>) -> f64 {
    let n1 = b1.cross(b2);
    let n2 = b2.cross(b3);
    let y = b2.norm() * b1.dot(&n2);
    let x = n1.dot(&n2);
    y.atan2(x).to_degrees()
}

/// Out-of-plane angle in degrees between the k→l bond and the plane spanned by
/// the k→i and k→j bonds. Atom `k` is the center.
pub fn out_of_plane_angle(
    i: &Point3<f64>,
    j: &Point3<f64>,
    k: &Point3<f64>,
    l: &Point3<f64>,
) -> f64 {
    out_of_plane_between(&unit_vector(k, i), &unit_vector(k, j), &unit_vector(k, l))
}

/// Out-of-plane angle in degrees from the three unit bonds leaving the center.
pub fn out_of_plane_between(u_ki: &Vector3<f64>, u_kj: &Vector3<f64>, u_kl: &Vector3<f64>) -> f64 {
    let normal = unit_cross(u_ki, u_kj);
    unit_dot(&normal, u_kl).asin().to_degrees()
}

/// Volume enclosed by a boundary of the given shape and extent.
///
/// `extent` is the half-width of a cube or the radius of a sphere. A
/// non-positive extent has no meaningful volume and yields `None`.
pub fn enclosure_volume(shape: BoundaryShape, extent: f64) -> Option<f64> {
    if extent <= 0.0 {
        warn!("Boundary extent {} is not positive; volume is undefined.", extent);
        return None;
    }
    let volume = match shape {
        BoundaryShape::Cube => 8.0 * extent.powi(3),
        BoundaryShape::Sphere => 4.0 / 3.0 * PI * extent.powi(3),
    };
    Some(volume)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn unit_vector_with_length_matches_unit_vector_for_true_length() {
        let a = Point3::new(0.5, -1.0, 2.0);
        let b = Point3::new(1.5, 1.0, 0.0);
        let u = unit_vector_with_length(&a, &b, distance(&a, &b));
        assert!(f64_approx_equal((u - unit_vector(&a, &b)).norm(), 0.0));
        assert_eq!(unit_vector_with_length(&a, &b, 0.0), Vector3::zeros());
    }

    #[test]
    fn unit_vector_of_coincident_points_is_zero() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(unit_vector(&p, &p), Vector3::zeros());
    }

    #[test]
    fn unit_vector_points_from_first_to_second_point() {
        let u = unit_vector(&Point3::origin(), &Point3::new(0.0, 3.0, 0.0));
        assert!(f64_approx_equal(u.y, 1.0));
        assert!(f64_approx_equal(u.norm(), 1.0));
    }

    #[test]
    fn unit_dot_is_clamped_for_slightly_overlong_vectors() {
        let u = Vector3::new(1.0 + 1e-12, 0.0, 0.0);
        assert_eq!(unit_dot(&u, &u), 1.0);
    }

    #[test]
    fn unit_cross_of_parallel_vectors_is_zero() {
        let u = Vector3::x();
        assert_eq!(unit_cross(&u, &u), Vector3::zeros());
    }

    #[test]
    fn unit_cross_of_non_orthogonal_unit_vectors_is_unit_length() {
        let u = Vector3::x();
        let v = Vector3::new(1.0, 1.0, 0.0).normalize();
        let w = unit_cross(&u, &v);
        assert!(f64_approx_equal(w.norm(), 1.0));
        assert!(f64_approx_equal(w.z, 1.0));
    }

    #[test]
    fn bond_angle_of_right_angle_is_ninety_degrees() {
        let angle = bond_angle(
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::origin(),
            &Point3::new(0.0, 2.0, 0.0),
        );
        assert!(f64_approx_equal(angle, 90.0));
    }

    #[test]
    fn bond_angle_of_collinear_atoms_is_one_eighty_degrees() {
        let angle = bond_angle(
            &Point3::new(-1.0, 0.0, 0.0),
            &Point3::origin(),
            &Point3::new(1.0, 0.0, 0.0),
        );
        assert!(f64_approx_equal(angle, 180.0));
    }

    #[test]
    fn dihedral_angle_is_signed() {
        let i = Point3::new(1.0, 0.0, 0.0);
        let j = Point3::origin();
        let k = Point3::new(0.0, 0.0, 1.0);
        let plus = Point3::new(0.0, 1.0, 1.0);
        let minus = Point3::new(0.0, -1.0, 1.0);
        assert!(f64_approx_equal(dihedral_angle(&i, &j, &k, &plus), 90.0));
        assert!(f64_approx_equal(dihedral_angle(&i, &j, &k, &minus), -90.0));
    }

    #[test]
    fn dihedral_angle_of_cis_and_trans_conformers() {
        let i = Point3::new(1.0, 0.0, 0.0);
        let j = Point3::origin();
        let k = Point3::new(0.0, 0.0, 1.0);
        let cis = Point3::new(1.0, 0.0, 1.0);
        let trans = Point3::new(-1.0, 0.0, 1.0);
        assert!(f64_approx_equal(dihedral_angle(&i, &j, &k, &cis), 0.0));
        assert!(f64_approx_equal(dihedral_angle(&i, &j, &k, &trans).abs(), 180.0));
    }

    #[test]
    fn out_of_plane_angle_is_zero_for_planar_center() {
        let angle = out_of_plane_angle(
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
            &Point3::origin(),
            &Point3::new(-1.0, -1.0, 0.0),
        );
        assert!(f64_approx_equal(angle, 0.0));
    }

    #[test]
    fn out_of_plane_angle_measures_elevation_above_the_plane() {
        let angle = out_of_plane_angle(
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
            &Point3::origin(),
            &Point3::new(-1.0, 0.0, 1.0),
        );
        assert!(f64_approx_equal(angle, 45.0));
    }

    #[test]
    fn enclosure_volume_of_cube_uses_half_width() {
        let volume = enclosure_volume(BoundaryShape::Cube, 2.0).unwrap();
        assert!(f64_approx_equal(volume, 64.0));
    }

    #[test]
    fn enclosure_volume_of_sphere() {
        let volume = enclosure_volume(BoundaryShape::Sphere, 1.0).unwrap();
        assert!(f64_approx_equal(volume, 4.0 / 3.0 * PI));
    }

    #[test]
    fn enclosure_volume_with_zero_extent_is_none() {
        assert!(enclosure_volume(BoundaryShape::Sphere, 0.0).is_none());
    }
}
