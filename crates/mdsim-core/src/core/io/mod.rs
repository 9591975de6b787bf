//! Provides input/output functionality for simulation files.
//!
//! Structures are read from and written to PQR through the [`traits::StructureFile`]
//! interface. Simulation results are written as a fixed-width energy table and
//! a multi-frame XYZ trajectory.

pub mod energy;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod pqr;
pub mod traits;
pub mod xyz;
