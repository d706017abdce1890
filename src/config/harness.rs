use crate::config::types::{HarnessError, LimiterKind, MemoryCeiling, ResourceLimits, Result};
/// Harness configuration: defaults, JSON file, then environment overrides
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_MAX_TIME: &str = "DIVBENCH_MAX_TIME";
pub const ENV_MAX_MEM: &str = "DIVBENCH_MAX_MEM";
pub const ENV_VERIFIER: &str = "DIVBENCH_VERIFIER";
pub const ENV_RESULT_FILE: &str = "DIVBENCH_RESULT_FILE";
pub const ENV_NO_CGROUP: &str = "DIVBENCH_NO_CGROUP";

/// Captured verifier output, relative to the working directory
pub const DEFAULT_RESULT_FILE: &str = "cbmc-output.txt";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Verifier executable
    pub verifier: PathBuf,
    /// File receiving the verifier's combined stdout/stderr
    pub result_file: PathBuf,
    /// Defaults for every `verify` line
    pub limits: ResourceLimits,
    pub limiter: LimiterKind,
    /// Cgroup membership file of this process
    pub proc_cgroup: PathBuf,
    /// Mount point of the cgroup v1 memory hierarchy
    pub memory_mount: PathBuf,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            verifier: default_verifier_path(),
            result_file: PathBuf::from(DEFAULT_RESULT_FILE),
            limits: ResourceLimits::default(),
            limiter: LimiterKind::CgroupV1,
            proc_cgroup: PathBuf::from("/proc/self/cgroup"),
            memory_mount: PathBuf::from("/sys/fs/cgroup/memory"),
        }
    }
}

/// The verifier ships next to the launcher as `cbmc/cbmc-binary`.
fn default_verifier_path() -> PathBuf {
    let base = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.canonicalize().ok())
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    base.join("cbmc").join("cbmc-binary")
}

impl HarnessConfig {
    /// Load configuration from a JSON file. Missing keys keep their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&content)
            .map_err(|e| HarnessError::Config(format!("Failed to parse config JSON: {}", e)))
    }

    /// Apply `DIVBENCH_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(value) = lookup(ENV_MAX_TIME) {
            let secs = value.trim().parse::<u64>().map_err(|_| {
                HarnessError::Config(format!("{} is not a number of seconds: {}", ENV_MAX_TIME, value))
            })?;
            self.limits.max_time_secs = Some(secs);
        }

        if let Some(value) = lookup(ENV_MAX_MEM) {
            self.limits.max_memory = Some(MemoryCeiling::parse(&value)?);
        }

        if let Some(value) = lookup(ENV_VERIFIER) {
            self.verifier = PathBuf::from(value);
        }

        if let Some(value) = lookup(ENV_RESULT_FILE) {
            self.result_file = PathBuf::from(value);
        }

        if lookup(ENV_NO_CGROUP).is_some() {
            self.limiter = LimiterKind::Disabled;
        }

        log::debug!(
            "Harness limits: max_time={:?}s, max_memory={:?}, limiter={:?}",
            self.limits.max_time_secs,
            self.limits.max_memory,
            self.limiter
        );

        Ok(())
    }
}
