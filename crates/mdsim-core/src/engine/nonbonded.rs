use super::config::BackendKind;
use crate::core::forcefield::directions::pair_directions;
use crate::core::forcefield::potentials::{
    MIN_DISTANCE, combine_vdw, coulomb, coulomb_derivative, lennard_jones_12_6,
    lennard_jones_12_6_derivative,
};
use crate::core::models::atom::Atom;
use crate::core::models::topology::ExclusionList;
use nalgebra::Vector3;
use tracing::trace;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Per-atom gradients of the two non-bonded energy categories.
#[derive(Debug, Clone, PartialEq)]
pub struct NonBondedGradient {
    pub vdw: Vec<Vector3<f64>>,
    pub electrostatic: Vec<Vector3<f64>>,
}

impl NonBondedGradient {
    fn zeros(atom_count: usize) -> Self {
        Self {
            vdw: vec![Vector3::zeros(); atom_count],
            electrostatic: vec![Vector3::zeros(); atom_count],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NonBondedResult {
    pub vdw: f64,
    pub electrostatic: f64,
    pub gradient: Option<NonBondedGradient>,
}

/// Sums van der Waals and Coulomb interactions over every non-excluded atom pair.
///
/// Implementations must agree with each other within floating-point tolerance.
pub trait NonBondedBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn compute(
        &self,
        atoms: &[Atom],
        exclusions: &ExclusionList,
        dielectric: f64,
        with_gradient: bool,
    ) -> NonBondedResult;
}

/// Number of unordered pairs among `atom_count` atoms.
#[inline]
pub fn pair_count(atom_count: usize) -> usize {
    atom_count * atom_count.saturating_sub(1) / 2
}

#[inline]
fn row_start(i: usize, atom_count: usize) -> usize {
    i * (2 * atom_count - i - 1) / 2
}

/// Maps a linear pair index to `(i, j)` with `i < j`, in the order
/// `(0,1), (0,2), ..., (0,n-1), (1,2), ...`.
///
/// `index` must be less than [`pair_count`]`(atom_count)`.
pub fn pair_from_index(index: usize, atom_count: usize) -> (usize, usize) {
    let n = atom_count as f64;
    let k = index as f64;
    let estimate = n - 2.0 - ((4.0 * n * (n - 1.0) - 8.0 * k - 7.0).max(0.0).sqrt() / 2.0 - 0.5).floor();
    let mut i = (estimate.max(0.0) as usize).min(atom_count.saturating_sub(2));
    // Correct any rounding error in the closed form.
    while i > 0 && row_start(i, atom_count) > index {
        i -= 1;
    }
    while i + 1 < atom_count.saturating_sub(1) && row_start(i + 1, atom_count) <= index {
        i += 1;
    }
    let j = index - row_start(i, atom_count) + i + 1;
    (i, j)
}

#[derive(Debug, Clone)]
struct Accumulator {
    vdw: f64,
    electrostatic: f64,
    gradient: Option<NonBondedGradient>,
}

impl Accumulator {
    fn new(atom_count: usize, with_gradient: bool) -> Self {
        Self {
            vdw: 0.0,
            electrostatic: 0.0,
            gradient: with_gradient.then(|| NonBondedGradient::zeros(atom_count)),
        }
    }

    fn add_pair(&mut self, atoms: &[Atom], i: usize, j: usize, dielectric: f64) {
        let (a, b) = (&atoms[i], &atoms[j]);
        let r = (a.position - b.position).norm();
        if r < MIN_DISTANCE {
            trace!("Skipping coincident atoms {} and {}.", i, j);
            return;
        }
        let (r_min, well) = combine_vdw(a.vdw_radius, a.vdw_well_depth, b.vdw_radius, b.vdw_well_depth);
        self.vdw += lennard_jones_12_6(r, r_min, well);
        self.electrostatic += coulomb(r, a.charge, b.charge, dielectric);

        if let Some(gradient) = &mut self.gradient {
            let [di, dj] = pair_directions(&a.position, &b.position);
            let d_vdw = lennard_jones_12_6_derivative(r, r_min, well);
            let d_elec = coulomb_derivative(r, a.charge, b.charge, dielectric);
            gradient.vdw[i] += di * d_vdw;
            gradient.vdw[j] += dj * d_vdw;
            gradient.electrostatic[i] += di * d_elec;
            gradient.electrostatic[j] += dj * d_elec;
        }
    }

    fn merge(mut self, other: Self) -> Self {
        self.vdw += other.vdw;
        self.electrostatic += other.electrostatic;
        if let (Some(mine), Some(theirs)) = (&mut self.gradient, other.gradient) {
            for (m, t) in mine.vdw.iter_mut().zip(theirs.vdw) {
                *m += t;
            }
            for (m, t) in mine.electrostatic.iter_mut().zip(theirs.electrostatic) {
                *m += t;
            }
        }
        self
    }

    fn finish(self) -> NonBondedResult {
        NonBondedResult {
            vdw: self.vdw,
            electrostatic: self.electrostatic,
            gradient: self.gradient,
        }
    }
}

/// Single-threaded pair sum.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarBackend;

impl NonBondedBackend for ScalarBackend {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn compute(
        &self,
        atoms: &[Atom],
        exclusions: &ExclusionList,
        dielectric: f64,
        with_gradient: bool,
    ) -> NonBondedResult {
        let n = atoms.len();
        let mut acc = Accumulator::new(n, with_gradient);
        for index in 0..pair_count(n) {
            let (i, j) = pair_from_index(index, n);
            if !exclusions.contains(i, j) {
                acc.add_pair(atoms, i, j, dielectric);
            }
        }
        acc.finish()
    }
}

/// Multi-threaded pair sum over the rayon pool. Each worker accumulates its
/// own partial sums, which are reduced at the end.
#[cfg(feature = "parallel")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelBackend;

#[cfg(feature = "parallel")]
impl NonBondedBackend for ParallelBackend {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn compute(
        &self,
        atoms: &[Atom],
        exclusions: &ExclusionList,
        dielectric: f64,
        with_gradient: bool,
    ) -> NonBondedResult {
        let n = atoms.len();
        (0..pair_count(n))
            .into_par_iter()
            .fold(
                || Accumulator::new(n, with_gradient),
                |mut acc, index| {
                    let (i, j) = pair_from_index(index, n);
                    if !exclusions.contains(i, j) {
                        acc.add_pair(atoms, i, j, dielectric);
                    }
                    acc
                },
            )
            .reduce(|| Accumulator::new(n, with_gradient), Accumulator::merge)
            .finish()
    }
}

/// Creates the backend selected by configuration.
pub fn create_backend(kind: BackendKind) -> Box<dyn NonBondedBackend> {
    match kind {
        BackendKind::Scalar => Box::new(ScalarBackend),
        #[cfg(feature = "parallel")]
        BackendKind::Parallel => Box::new(ParallelBackend),
        #[cfg(not(feature = "parallel"))]
        BackendKind::Parallel => {
            tracing::warn!("Parallel backend requested but the 'parallel' feature is disabled; using scalar.");
            Box::new(ScalarBackend)
        }
    }
}
