//! # Core Models Module
//!
//! Plain data structures describing a molecule for classical simulation.
//!
//! ## Overview
//!
//! These models carry no evaluation logic of their own beyond small, local
//! helpers. They are created once when a structure is loaded and topology is
//! inferred; afterwards only their coordinates and cached per-term values
//! change.
//!
//! ## Key Components
//!
//! - [`atom`] - Atom identity, force-field parameters, and kinematic state
//! - [`system`] - A loaded structure: atoms plus explicitly declared bonds
//! - [`topology`] - Bonded terms, the bond graph, and the non-bonded exclusion list
//! - [`boundary`] - The soft enclosure that keeps atoms inside a finite region

pub mod atom;
pub mod boundary;
pub mod system;
pub mod topology;
