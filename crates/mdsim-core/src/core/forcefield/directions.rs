//! Derivatives of internal coordinates with respect to atomic positions.
//!
//! Each function returns, for every atom of a term, the gradient of the term's
//! internal coordinate (distance in Å, angles in radians) with respect to that
//! atom's position. Multiplying by the scalar `dE/dq` from [`super::potentials`]
//! gives the per-atom energy gradient. The vectors of one term always sum to
//! zero. Degenerate geometries (coincident atoms, collinear angles) yield zero
//! vectors instead of non-finite values.

use super::potentials::MIN_DISTANCE;
use nalgebra::{Point3, Vector3};

/// Smallest sine of a bond angle for which angular derivatives are computed.
pub const MIN_SIN: f64 = 1e-8;

#[inline]
fn zeros<const N: usize>() -> [Vector3<f64>; N] {
    [Vector3::zeros(); N]
}

/// Gradient of the distance |p1 - p2|.
pub fn pair_directions(p1: &Point3<f64>, p2: &Point3<f64>) -> [Vector3<f64>; 2] {
    let delta = p1 - p2;
    let r = delta.norm();
    if r < MIN_DISTANCE {
        return zeros();
    }
    let u = delta / r;
    [u, -u]
}

/// Gradient of the bond angle p1-p2-p3 centered on `p2`.
pub fn angle_directions(
    p1: &Point3<f64>,
    p2: &Point3<f64>,
    p3: &Point3<f64>,
) -> [Vector3<f64>; 3] {
    let d21 = p1 - p2;
    let d23 = p3 - p2;
    let r21 = d21.norm();
    let r23 = d23.norm();
    if r21 < MIN_DISTANCE || r23 < MIN_DISTANCE {
        return zeros();
    }
    let u21 = d21 / r21;
    let u23 = d23 / r23;
    let cos = u21.dot(&u23).clamp(-1.0, 1.0);
    let sin = (1.0 - cos * cos).sqrt();
    if sin < MIN_SIN {
        return zeros();
    }
    let normal = u21.cross(&u23) / sin;

    let g1 = u21.cross(&normal) / r21;
    let g3 = normal.cross(&u23) / r23;
    [g1, -(g1 + g3), g3]
}

/// Gradient of the signed dihedral p1-p2-p3-p4 about the p2-p3 bond.
pub fn torsion_directions(
    p1: &Point3<f64>,
    p2: &Point3<f64>,
    p3: &Point3<f64>,
    p4: &Point3<f64>,
) -> [Vector3<f64>; 4] {
    let b1 = p2 - p1;
    let b2 = p3 - p2;
    let b3 = p4 - p3;
    let r12 = b1.norm();
    let r23 = b2.norm();
    let r34 = b3.norm();
    if r12 < MIN_DISTANCE || r23 < MIN_DISTANCE || r34 < MIN_DISTANCE {
        return zeros();
    }

    let n1 = b1.cross(&b2);
    let n2 = b2.cross(&b3);
    let n1_sq = n1.norm_squared();
    let n2_sq = n2.norm_squared();
    // |n| = r·r·sin(angle), so these compare the sines of both bond angles.
    if n1_sq.sqrt() < MIN_SIN * r12 * r23 || n2_sq.sqrt() < MIN_SIN * r23 * r34 {
        return zeros();
    }

    let g1 = n1 * (-r23 / n1_sq);
    let g4 = n2 * (r23 / n2_sq);

    let r23_sq = r23 * r23;
    let s1 = -b1.dot(&b2) / r23_sq;
    let s4 = -b3.dot(&b2) / r23_sq;

    let g2 = g1 * (s1 - 1.0) - g4 * s4;
    let g3 = g4 * (s4 - 1.0) - g1 * s1;
    [g1, g2, g3, g4]
}

/// Gradient of the out-of-plane angle of the p3→p4 bond relative to the
/// plane (p1, p3, p2). Atom `p3` is the center.
pub fn improper_directions(
    p1: &Point3<f64>,
    p2: &Point3<f64>,
    p3: &Point3<f64>,
    p4: &Point3<f64>,
) -> [Vector3<f64>; 4] {
    let d31 = p1 - p3;
    let d32 = p2 - p3;
    let d34 = p4 - p3;
    let r31 = d31.norm();
    let r32 = d32.norm();
    let r34 = d34.norm();
    if r31 < MIN_DISTANCE || r32 < MIN_DISTANCE || r34 < MIN_DISTANCE {
        return zeros();
    }
    let e1 = d31 / r31;
    let e2 = d32 / r32;
    let e4 = d34 / r34;

    let cos_phi = e1.dot(&e2).clamp(-1.0, 1.0);
    let sin_phi = (1.0 - cos_phi * cos_phi).sqrt();
    if sin_phi < MIN_SIN {
        return zeros();
    }
    let sin_omega = (e1.cross(&e2).dot(&e4) / sin_phi).clamp(-1.0, 1.0);
    let cos_omega = (1.0 - sin_omega * sin_omega).sqrt();
    if cos_omega < MIN_SIN {
        return zeros();
    }
    let tan_omega = sin_omega / cos_omega;
    let inv_cos_sin = 1.0 / (cos_omega * sin_phi);
    let tan_over_sin_sq = tan_omega / (sin_phi * sin_phi);

    let g4 = (e1.cross(&e2) * inv_cos_sin - e4 * tan_omega) / r34;
    let g1 = (e2.cross(&e4) * inv_cos_sin - (e1 - e2 * cos_phi) * tan_over_sin_sq) / r31;
    let g2 = (e4.cross(&e1) * inv_cos_sin - (e2 - e1 * cos_phi) * tan_over_sin_sq) / r32;
    let g3 = -(g1 + g2 + g4);
    [g1, g2, g3, g4]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::utils::geometry::{bond_angle, dihedral_angle, out_of_plane_angle};

    const SUM_TOLERANCE: f64 = 1e-9;

    fn assert_sums_to_zero(vectors: &[Vector3<f64>]) {
        let sum: Vector3<f64> = vectors.iter().sum();
        assert!(sum.norm() < SUM_TOLERANCE, "direction vectors sum to {:?}", sum);
    }

    /// Central finite-difference gradient of `f` over every coordinate of `points`.
    fn numeric_gradient<const N: usize>(
        points: [Point3<f64>; N],
        f: impl Fn(&[Point3<f64>; N]) -> f64,
    ) -> [Vector3<f64>; N] {
        let h = 1e-6;
        let mut out = [Vector3::zeros(); N];
        for atom in 0..N {
            for axis in 0..3 {
                let mut plus = points;
                let mut minus = points;
                plus[atom][axis] += 0.5 * h;
                minus[atom][axis] -= 0.5 * h;
                out[atom][axis] = (f(&plus) - f(&minus)) / h;
            }
        }
        out
    }

    fn assert_matches_numeric<const N: usize>(
        analytic: [Vector3<f64>; N],
        numeric: [Vector3<f64>; N],
    ) {
        for (a, n) in analytic.iter().zip(numeric.iter()) {
            for axis in 0..3 {
                let scale = n[axis].abs().max(1.0);
                assert!(
                    (a[axis] - n[axis]).abs() / scale < 1e-5,
                    "analytic {:?} vs numeric {:?}",
                    a,
                    n
                );
            }
        }
    }

    fn skewed_quadruple() -> [Point3<f64>; 4] {
        [
            Point3::new(1.2, -0.3, 0.4),
            Point3::new(0.1, 0.2, -0.1),
            Point3::new(-0.2, 1.4, 0.3),
            Point3::new(0.9, 2.1, 1.1),
        ]
    }

    #[test]
    fn pair_directions_are_opposite_unit_vectors() {
        let [g1, g2] = pair_directions(&Point3::new(3.0, 0.0, 0.0), &Point3::origin());
        assert_eq!(g1, Vector3::x());
        assert_sums_to_zero(&[g1, g2]);
    }

    #[test]
    fn pair_directions_of_coincident_atoms_are_zero() {
        let p = Point3::new(1.0, 1.0, 1.0);
        assert_eq!(pair_directions(&p, &p), [Vector3::zeros(); 2]);
    }

    #[test]
    fn angle_directions_sum_to_zero_and_match_numeric_gradient() {
        let [p1, p2, p3, _] = skewed_quadruple();
        let analytic = angle_directions(&p1, &p2, &p3);
        assert_sums_to_zero(&analytic);
        let numeric = numeric_gradient([p1, p2, p3], |p| {
            bond_angle(&p[0], &p[1], &p[2]).to_radians()
        });
        assert_matches_numeric(analytic, numeric);
    }

    #[test]
    fn angle_directions_of_collinear_atoms_are_zero() {
        let directions = angle_directions(
            &Point3::new(-1.0, 0.0, 0.0),
            &Point3::origin(),
            &Point3::new(2.0, 0.0, 0.0),
        );
        assert_eq!(directions, [Vector3::zeros(); 3]);
    }

    #[test]
    fn torsion_directions_sum_to_zero_and_match_numeric_gradient() {
        let points = skewed_quadruple();
        let analytic = torsion_directions(&points[0], &points[1], &points[2], &points[3]);
        assert_sums_to_zero(&analytic);
        let numeric = numeric_gradient(points, |p| {
            dihedral_angle(&p[0], &p[1], &p[2], &p[3]).to_radians()
        });
        assert_matches_numeric(analytic, numeric);
    }

    #[test]
    fn torsion_directions_with_collinear_bond_angle_are_zero() {
        let directions = torsion_directions(
            &Point3::new(-1.0, 0.0, 0.0),
            &Point3::origin(),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(1.0, 1.0, 0.0),
        );
        assert_eq!(directions, [Vector3::zeros(); 4]);
    }

    #[test]
    fn improper_directions_sum_to_zero_and_match_numeric_gradient() {
        let points = [
            Point3::new(1.3, 0.1, 0.0),
            Point3::new(-0.6, 1.1, 0.1),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(-0.7, -1.0, 0.35),
        ];
        let analytic = improper_directions(&points[0], &points[1], &points[2], &points[3]);
        assert_sums_to_zero(&analytic);
        let numeric = numeric_gradient(points, |p| {
            out_of_plane_angle(&p[0], &p[1], &p[2], &p[3]).to_radians()
        });
        assert_matches_numeric(analytic, numeric);
    }

    #[test]
    fn improper_directions_with_collinear_wings_are_zero() {
        let directions = improper_directions(
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(2.0, 0.0, 0.0),
            &Point3::origin(),
            &Point3::new(0.0, 1.0, 0.0),
        );
        assert_eq!(directions, [Vector3::zeros(); 4]);
    }
}
