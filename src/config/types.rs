/// Core types shared by the divbench harness
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Memory ceiling applied to the verifier's cgroup before each run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryCeiling {
    /// Lift the ceiling to the largest value the control file accepts
    Unlimited,
    /// Hard limit in bytes
    Bytes(u64),
}

impl MemoryCeiling {
    /// Sentinel written for an unlimited ceiling (one exbibyte, clamped by the kernel)
    pub const UNLIMITED_SENTINEL: &'static str = "1E";

    /// Parse a ceiling in the cgroup v1 control-file notation: a byte count
    /// with an optional binary `K`/`M`/`G`/`T` suffix, or `-1`/`max` for no limit.
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(HarnessError::Config("empty memory limit".to_string()));
        }
        if value == "-1" || value.eq_ignore_ascii_case("max") {
            return Ok(Self::Unlimited);
        }

        let (digits, shift) = match value.chars().last() {
            Some('k') | Some('K') => (&value[..value.len() - 1], 10),
            Some('m') | Some('M') => (&value[..value.len() - 1], 20),
            Some('g') | Some('G') => (&value[..value.len() - 1], 30),
            Some('t') | Some('T') => (&value[..value.len() - 1], 40),
            _ => (value, 0),
        };

        let base: u64 = digits
            .parse()
            .map_err(|_| HarnessError::Config(format!("invalid memory limit: {}", value)))?;
        base.checked_mul(1u64 << shift)
            .map(Self::Bytes)
            .ok_or_else(|| HarnessError::Config(format!("memory limit overflows: {}", value)))
    }

    /// Text written into a cgroup memory control file
    pub fn control_value(&self) -> String {
        match self {
            Self::Unlimited => Self::UNLIMITED_SENTINEL.to_string(),
            Self::Bytes(bytes) => bytes.to_string(),
        }
    }
}

impl fmt::Display for MemoryCeiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlimited => write!(f, "unlimited"),
            Self::Bytes(bytes) => write!(f, "{} bytes", bytes),
        }
    }
}

/// Limits for one verifier run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Wall-clock limit in seconds
    pub max_time_secs: Option<u64>,
    /// Memory ceiling; `None` means unlimited
    pub max_memory: Option<MemoryCeiling>,
}

impl ResourceLimits {
    pub fn timeout(&self) -> Option<Duration> {
        self.max_time_secs.map(Duration::from_secs)
    }

    /// Ceiling to write before the run. An absent limit still resets the
    /// control files so a previous run's value never leaks into this one.
    pub fn ceiling(&self) -> MemoryCeiling {
        self.max_memory.unwrap_or(MemoryCeiling::Unlimited)
    }
}

/// Which memory limiter the harness installs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimiterKind {
    /// Write limits through the cgroup v1 memory hierarchy
    #[default]
    CgroupV1,
    /// Leave memory unconstrained
    Disabled,
}

/// Errors raised by the harness
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cgroup error: {0}")]
    Cgroup(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Process error: {0}")]
    Process(String),

    #[error("output path given twice: '{first}' and '{second}'")]
    DuplicateOutput { first: String, second: String },

    #[error("'-o' is missing its output path")]
    MissingOutput,

    #[error("interrupted by signal {0}")]
    Interrupted(i32),
}

pub type Result<T> = std::result::Result<T, HarnessError>;
