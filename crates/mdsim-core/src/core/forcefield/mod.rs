//! # Force Field Module
//!
//! Parameters and functional forms of the classical force field.
//!
//! ## Overview
//!
//! The force field maps atom-type combinations to interaction constants and
//! defines how each interaction turns geometry into energy:
//!
//! - **Bonded terms**: harmonic bonds and angles, Fourier torsions, and out-of-plane impropers
//! - **Non-bonded terms**: 12-6 Lennard-Jones and Coulomb interactions
//! - **Gradients**: a scalar `dE/dq` per term, combined with geometric direction
//!   vectors that give `dq/dx` for each atom of the term
//!
//! ## Key Components
//!
//! - [`params`] - The immutable parameter tables, the record-file parser, and symmetric lookups
//! - [`defaults`] - Built-in element tables and the embedded default parameter set
//! - [`parameterization`] - Assignment of per-atom parameters after a structure is loaded
//! - [`potentials`] - Energy and energy-derivative formulas for every interaction class
//! - [`directions`] - Per-atom derivatives of internal coordinates
//! - [`term`] - The per-category energy breakdown
//!
//! ## Usage
//!
//! ```ignore
//! use mdsim::core::forcefield::params::ForceField;
//!
//! let forcefield = ForceField::load_or_default(Some(path));
//! let bond = forcefield.bond("CT", "HC");
//! ```

pub mod defaults;
pub mod directions;
pub mod parameterization;
pub mod params;
pub mod potentials;
pub mod term;
