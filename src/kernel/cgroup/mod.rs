//! Memory cgroup control
//!
//! Applies the per-run memory ceiling through cgroup v1, or not at all.

pub mod backend;
pub mod noop;
pub mod v1;

pub use backend::{create_memory_limiter, MemoryLimiter};
pub use noop::NoopLimiter;
pub use v1::CgroupV1Limiter;
