//! # mdsim Core Library
//!
//! A classical molecular-mechanics engine: topology inference from geometry,
//! analytic energies and forces for an AMBER-style force field, and leapfrog
//! molecular dynamics with a velocity-rescaling thermostat.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Atom`, `MolecularSystem`),
//!   pure geometry and potential functions, the immutable `ForceField`, topology
//!   construction, and file I/O.
//!
//! - **[`engine`]: The Logic Core.** The stateful layer. `MolecularState` owns the
//!   atoms and bonded terms and evaluates energies and gradients; the non-bonded
//!   backends sum pair interactions; `MolecularDynamics` advances time.
//!
//! - **[`workflows`]: The Public API.** End-to-end entry points that load a
//!   structure, build the state, and run a trajectory or a single-point evaluation.

pub mod core;
pub mod engine;
pub mod workflows;
