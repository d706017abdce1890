use crate::config::types::{MemoryCeiling, Result};
use crate::kernel::cgroup::backend::MemoryLimiter;

/// Limiter for hosts without a writable memory cgroup
pub struct NoopLimiter;

impl MemoryLimiter for NoopLimiter {
    fn backend_name(&self) -> &str {
        "none"
    }

    fn apply(&self, ceiling: MemoryCeiling) -> Result<Vec<String>> {
        log::debug!("Memory limiter disabled, not applying {}", ceiling);
        Ok(Vec::new())
    }
}
