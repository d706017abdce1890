//! Thin wrappers around host kernel interfaces.

pub mod cgroup;
pub mod signal;
