use super::params::ForceField;
use crate::core::models::atom::{Atom, element_from_type};
use tracing::debug;

/// Assigns per-atom force-field parameters to a freshly loaded structure.
pub struct Parameterizer<'a> {
    forcefield: &'a ForceField,
}

impl<'a> Parameterizer<'a> {
    pub fn new(forcefield: &'a ForceField) -> Self {
        Self { forcefield }
    }

    /// Fills in element, mass, covalent radius, and van der Waals constants.
    ///
    /// Missing entries are logged by the force field and leave the value at
    /// zero, which removes the atom from the corresponding interaction.
    pub fn parameterize_atoms(&self, atoms: &mut [Atom]) {
        for atom in atoms.iter_mut() {
            self.parameterize_atom(atom);
        }
        debug!("Parameterized {} atoms.", atoms.len());
    }

    pub fn parameterize_atom(&self, atom: &mut Atom) {
        atom.element = element_from_type(&atom.force_field_type);
        atom.mass = self.forcefield.mass(&atom.element).unwrap_or(0.0);
        atom.covalent_radius = self
            .forcefield
            .covalent_radius(&atom.element)
            .unwrap_or(0.0);
        let vdw = self.forcefield.vdw(&atom.force_field_type);
        atom.vdw_radius = vdw.map_or(0.0, |p| p.radius);
        atom.vdw_well_depth = vdw.map_or(0.0, |p| p.well_depth);
    }
}
