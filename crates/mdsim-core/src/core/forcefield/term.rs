use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Energy of a molecular state, split by interaction category. All values in kcal/mol.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnergyBreakdown {
    pub bond: f64,
    pub angle: f64,
    pub torsion: f64,
    pub improper: f64,
    pub vdw: f64,
    pub electrostatic: f64,
    pub boundary: f64,
    pub kinetic: f64,
}

impl EnergyBreakdown {
    #[inline]
    pub fn bonded(&self) -> f64 {
        self.bond + self.angle + self.torsion + self.improper
    }

    #[inline]
    pub fn non_bonded(&self) -> f64 {
        self.vdw + self.electrostatic
    }

    #[inline]
    pub fn potential(&self) -> f64 {
        self.bonded() + self.non_bonded() + self.boundary
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.potential() + self.kinetic
    }

    /// The eleven reported components in output-column order: kinetic,
    /// potential, non-bonded, bonded, boundary, vdw, electrostatic, bond,
    /// angle, torsion, improper.
    pub fn columns(&self) -> [f64; 11] {
        [
            self.kinetic,
            self.potential(),
            self.non_bonded(),
            self.bonded(),
            self.boundary,
            self.vdw,
            self.electrostatic,
            self.bond,
            self.angle,
            self.torsion,
            self.improper,
        ]
    }
}

impl Add for EnergyBreakdown {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            bond: self.bond + rhs.bond,
            angle: self.angle + rhs.angle,
            torsion: self.torsion + rhs.torsion,
            improper: self.improper + rhs.improper,
            vdw: self.vdw + rhs.vdw,
            electrostatic: self.electrostatic + rhs.electrostatic,
            boundary: self.boundary + rhs.boundary,
            kinetic: self.kinetic + rhs.kinetic,
        }
    }
}

impl AddAssign for EnergyBreakdown {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for EnergyBreakdown {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, term| acc + term)
    }
}
