//! Configuration
//!
//! Shared types, error taxonomy, and layered harness configuration.

pub mod harness;
pub mod types;
