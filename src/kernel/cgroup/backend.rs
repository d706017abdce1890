//! Memory limiter abstraction: cgroup v1 writer or no-op.

use crate::config::harness::HarnessConfig;
use crate::config::types::{LimiterKind, MemoryCeiling, Result};

pub trait MemoryLimiter {
    fn backend_name(&self) -> &str;
    /// Install `ceiling` for the cgroup the verifier will inherit.
    /// Returns non-fatal warnings; `Err` means no ceiling is in place.
    fn apply(&self, ceiling: MemoryCeiling) -> Result<Vec<String>>;
}

/// Create the limiter selected by configuration.
pub fn create_memory_limiter(config: &HarnessConfig) -> Box<dyn MemoryLimiter> {
    log::info!("Memory limiter selection: {:?}", config.limiter);

    match config.limiter {
        LimiterKind::CgroupV1 => Box::new(crate::kernel::cgroup::v1::CgroupV1Limiter::new(
            &config.proc_cgroup,
            &config.memory_mount,
        )),
        LimiterKind::Disabled => Box::new(crate::kernel::cgroup::noop::NoopLimiter),
    }
}
