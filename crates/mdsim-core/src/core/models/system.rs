use super::atom::Atom;
use std::collections::HashMap;

/// A loaded structure: atoms plus any bonds the input file declared explicitly.
///
/// This is the raw input to topology construction. It carries no force-field
/// parameters and no derived terms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MolecularSystem {
    atoms: Vec<Atom>,
    explicit_bonds: Vec<(usize, usize)>,
}

impl MolecularSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_atoms(atoms: Vec<Atom>) -> Self {
        Self {
            atoms,
            explicit_bonds: Vec::new(),
        }
    }

    /// Appends an atom and returns its index.
    pub fn add_atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.atoms.len() - 1
    }

    /// Records an explicit bond between two atom indices.
    ///
    /// Returns `false` without recording anything if either index is out of
    /// range or the indices are equal.
    pub fn add_bond(&mut self, i: usize, j: usize) -> bool {
        if i == j || i >= self.atoms.len() || j >= self.atoms.len() {
            return false;
        }
        let pair = if i < j { (i, j) } else { (j, i) };
        if !self.explicit_bonds.contains(&pair) {
            self.explicit_bonds.push(pair);
        }
        true
    }

    #[inline]
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    #[inline]
    pub fn atoms_mut(&mut self) -> &mut [Atom] {
        &mut self.atoms
    }

    #[inline]
    pub fn explicit_bonds(&self) -> &[(usize, usize)] {
        &self.explicit_bonds
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Maps file serial numbers to atom indices.
    pub fn serial_index(&self) -> HashMap<usize, usize> {
        self.atoms
            .iter()
            .enumerate()
            .map(|(index, atom)| (atom.serial, index))
            .collect()
    }

    pub fn into_atoms(self) -> Vec<Atom> {
        self.atoms
    }
}
