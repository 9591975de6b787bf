//! # Topology Module
//!
//! Infers chemical connectivity from geometry and enumerates every bonded
//! interaction term of a molecule.
//!
//! ## Overview
//!
//! Topology is built once, right after a structure is loaded and its atoms are
//! parameterized, and stays fixed for the rest of a simulation. Construction
//! proceeds in a fixed order because each stage feeds the next:
//!
//! - **Bond graph** - Explicit bonds from the input file, optionally augmented by
//!   covalent-radius based inference
//! - **Bonded terms** - Bonds, angles, torsions, and impropers enumerated from the
//!   graph, each kept only when the force field supplies a non-zero constant
//! - **Exclusions** - The 1-2, 1-3, and 1-4 pairs covered by bonded terms, which
//!   the non-bonded engine must skip
//!
//! ## Key Components
//!
//! - [`builder`] - The [`builder::TopologyBuilder`] and its enumeration rules
//! - [`Topology`] - The immutable result handed to the molecular state

pub mod builder;

use crate::core::models::topology::{Angle, Bond, BondGraph, ExclusionList, Improper, Torsion};

/// Every bonded term of a molecule, together with its connectivity.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    pub bonds: Vec<Bond>,
    pub angles: Vec<Angle>,
    pub torsions: Vec<Torsion>,
    pub impropers: Vec<Improper>,
    pub graph: BondGraph,
    pub exclusions: ExclusionList,
}

impl Topology {
    pub fn term_count(&self) -> usize {
        self.bonds.len() + self.angles.len() + self.torsions.len() + self.impropers.len()
    }
}
