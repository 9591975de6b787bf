//! # Core Module
//!
//! The stateless foundation of the engine: molecular data models, geometry,
//! the force field, topology construction, and file I/O.
//!
//! ## Overview
//!
//! Nothing in this module advances time or owns simulation state. Every
//! function either describes a molecule or evaluates a closed-form quantity
//! from its current geometry, which keeps these pieces easy to test in
//! isolation.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, loaded structures, bonded terms, and the boundary
//! - **Geometry** ([`utils`]) - Distances, angles, dihedrals, and enclosure volumes
//! - **Force Field** ([`forcefield`]) - Parameter tables, potentials, and gradient directions
//! - **Connectivity** ([`topology`]) - Bond inference and enumeration of bonded terms
//! - **File I/O** ([`io`]) - PQR structures, energy tables, and XYZ trajectories

pub mod forcefield;
pub mod io;
pub mod models;
pub mod topology;
pub mod utils;
