//! # Engine Module
//!
//! The stateful layer of mdsim: it owns a molecule while it is evaluated and
//! advanced in time.
//!
//! ## Overview
//!
//! A [`state::MolecularState`] is built once from a structure and a force field.
//! Its topology never changes afterwards; positions and velocities change every
//! step, and every energy and gradient is recomputed from scratch on request.
//! [`integrator::MolecularDynamics`] drives any [`molecule::Molecule`] with a
//! leapfrog scheme and streams results to an [`output::OutputSink`].
//!
//! ## Key Components
//!
//! - **Configuration** ([`config`]) - Run settings, their defaults, and validation
//! - **Molecule Interface** ([`molecule`]) - The evaluation contract the integrator relies on
//! - **Molecular State** ([`state`]) - Bonded terms, per-category energies and gradients,
//!   temperature, pressure, and volume
//! - **Non-bonded Engine** ([`nonbonded`]) - Exclusion-aware pair sums with scalar and
//!   rayon-parallel backends
//! - **Integrator** ([`integrator`]) - Velocity initialization, time stepping, thermostat,
//!   and output gating
//! - **Output** ([`output`]) - Energy table and trajectory sinks
//! - **Progress** ([`progress`]) - Callback-based progress events for front ends
//! - **Errors** ([`error`]) - Failures that abort a run

pub mod config;
pub mod error;
pub mod integrator;
pub mod molecule;
pub mod nonbonded;
pub mod output;
pub mod progress;
pub mod state;
