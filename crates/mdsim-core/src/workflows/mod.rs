//! # Workflows Module
//!
//! End-to-end entry points for users of mdsim.
//!
//! ## Overview
//!
//! Each workflow loads its resources (force field, structure), builds a
//! [`crate::engine::state::MolecularState`], and runs one kind of calculation,
//! reporting progress through a [`crate::engine::progress::ProgressReporter`].
//! Missing or unreadable scientific input is never fatal: the force field falls
//! back to its built-in parameters and an unreadable structure yields an empty one.
//!
//! - **Simulation** ([`simulate`]) - A full molecular-dynamics trajectory written to disk
//! - **Single Point** ([`single_point`]) - Energies and gradients of one geometry

pub mod simulate;
pub mod single_point;
