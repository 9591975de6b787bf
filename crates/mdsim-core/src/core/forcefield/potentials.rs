pub const COULOMB_CONSTANT: f64 = 332.06375; // In kcal·Å/(mol·e²)

/// Separations below this are treated as coincident atoms.
pub const MIN_DISTANCE: f64 = 1e-6;

#[inline]
pub fn harmonic_bond(distance: f64, spring: f64, equilibrium: f64) -> f64 {
    let stretch = distance - equilibrium;
    spring * stretch * stretch
}

#[inline]
pub fn harmonic_bond_derivative(distance: f64, spring: f64, equilibrium: f64) -> f64 {
    2.0 * spring * (distance - equilibrium)
}

/// Angles in degrees; the spring constant is per radian squared.
#[inline]
pub fn harmonic_angle(angle: f64, spring: f64, equilibrium: f64) -> f64 {
    let bend = (angle - equilibrium).to_radians();
    spring * bend * bend
}

#[inline]
pub fn harmonic_angle_derivative(angle: f64, spring: f64, equilibrium: f64) -> f64 {
    2.0 * spring * (angle - equilibrium).to_radians()
}

#[inline]
pub fn fourier_torsion(angle: f64, barrier: f64, phase: f64, periodicity: u32, paths: u32) -> f64 {
    let arg = (f64::from(periodicity) * angle - phase).to_radians();
    barrier / f64::from(paths.max(1)) * (1.0 + arg.cos())
}

/// Derivative with respect to the dihedral in radians.
#[inline]
pub fn fourier_torsion_derivative(
    angle: f64,
    barrier: f64,
    phase: f64,
    periodicity: u32,
    paths: u32,
) -> f64 {
    let n = f64::from(periodicity);
    let arg = (n * angle - phase).to_radians();
    -barrier * n * arg.sin() / f64::from(paths.max(1))
}

#[inline]
pub fn out_of_plane(angle: f64, barrier: f64) -> f64 {
    barrier * (1.0 + (2.0 * angle - 180.0).to_radians().cos())
}

/// Derivative with respect to the out-of-plane angle in radians.
#[inline]
pub fn out_of_plane_derivative(angle: f64, barrier: f64) -> f64 {
    -2.0 * barrier * (2.0 * angle - 180.0).to_radians().sin()
}

#[inline]
pub fn lennard_jones_12_6(dist: f64, r_min: f64, well_depth: f64) -> f64 {
    if dist < MIN_DISTANCE {
        return 0.0;
    }
    let rho = r_min / dist;
    let rho6 = rho.powi(6);
    let rho12 = rho6 * rho6;
    well_depth * (rho12 - 2.0 * rho6)
}

#[inline]
pub fn lennard_jones_12_6_derivative(dist: f64, r_min: f64, well_depth: f64) -> f64 {
    if dist < MIN_DISTANCE || r_min <= 0.0 {
        return 0.0;
    }
    let rho = r_min / dist;
    let rho7 = rho.powi(7);
    let rho13 = rho7 * rho.powi(6);
    -12.0 * well_depth / r_min * (rho13 - rho7)
}

#[inline]
pub fn coulomb(dist: f64, q1: f64, q2: f64, dielectric: f64) -> f64 {
    if dist < MIN_DISTANCE || dielectric == 0.0 {
        return 0.0;
    }
    COULOMB_CONSTANT * q1 * q2 / (dielectric * dist)
}

#[inline]
pub fn coulomb_derivative(dist: f64, q1: f64, q2: f64, dielectric: f64) -> f64 {
    if dist < MIN_DISTANCE || dielectric == 0.0 {
        return 0.0;
    }
    -COULOMB_CONSTANT * q1 * q2 / (dielectric * dist * dist)
}

/// Pair parameters from per-atom values: radii add, well depths take the geometric mean.
#[inline]
pub fn combine_vdw(radius_i: f64, well_i: f64, radius_j: f64, well_j: f64) -> (f64, f64) {
    (radius_i + radius_j, well_i.abs().sqrt() * well_j.abs().sqrt())
}
