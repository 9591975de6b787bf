use super::config::{GradientMode, KineticMode};
use crate::core::forcefield::term::EnergyBreakdown;
use crate::core::models::atom::Atom;
use crate::core::models::boundary::Boundary;
use nalgebra::Vector3;

/// A molecule that can be evaluated and advanced by the integrator.
///
/// Evaluation is split into steps so callers control what is recomputed:
/// after moving atoms, call [`Molecule::update_internals`] before any energy
/// or gradient evaluation. Aggregates are fully recomputed on each call.
pub trait Molecule {
    fn atoms(&self) -> &[Atom];

    /// Mutable access for drift and kick updates. Internal coordinates are
    /// stale until the next [`Molecule::update_internals`].
    fn atoms_mut(&mut self) -> &mut [Atom];

    /// Refreshes bond lengths and internal coordinates from atom positions.
    fn update_internals(&mut self);

    fn calculate_energy(&mut self, kinetic: KineticMode);

    fn calculate_gradient(&mut self, mode: GradientMode);

    /// Instantaneous temperature in Kelvin, from the last kinetic energy.
    fn calculate_temperature(&mut self) -> f64;

    /// Pressure in Pascal, or `None` when the enclosure has no finite volume.
    fn calculate_pressure(&mut self) -> Option<f64>;

    /// Enclosure volume in cubic Angstroms.
    fn calculate_volume(&mut self) -> Option<f64>;

    fn energies(&self) -> &EnergyBreakdown;

    /// Total gradient of the potential energy per atom, in kcal/(mol·Å).
    fn gradient(&self) -> &[Vector3<f64>];

    fn temperature(&self) -> f64;

    fn boundary(&self) -> &Boundary;

    /// Number of bonded interaction terms.
    fn term_count(&self) -> usize;
}
