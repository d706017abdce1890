/// Memory ceiling enforcement through the cgroup v1 memory hierarchy
use crate::config::types::{HarnessError, MemoryCeiling, Result};
use crate::kernel::cgroup::backend::MemoryLimiter;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const MEMSW_LIMIT_FILE: &str = "memory.memsw.limit_in_bytes";
pub const MEMORY_LIMIT_FILE: &str = "memory.limit_in_bytes";

/// Writes limits into the memory cgroup this process already belongs to.
/// The verifier inherits the membership when it is spawned.
pub struct CgroupV1Limiter {
    proc_cgroup: PathBuf,
    memory_mount: PathBuf,
}

impl CgroupV1Limiter {
    pub fn new(proc_cgroup: &Path, memory_mount: &Path) -> Self {
        Self {
            proc_cgroup: proc_cgroup.to_path_buf(),
            memory_mount: memory_mount.to_path_buf(),
        }
    }

    /// Resolve the memory cgroup directory from the membership file
    pub fn cgroup_path(&self) -> Result<PathBuf> {
        let content = fs::read_to_string(&self.proc_cgroup).map_err(|e| {
            HarnessError::Cgroup(format!(
                "Failed to read {}: {}",
                self.proc_cgroup.display(),
                e
            ))
        })?;

        let relative = memory_cgroup_relative_path(&content).ok_or_else(|| {
            HarnessError::Cgroup(format!(
                "No memory controller listed in {}",
                self.proc_cgroup.display()
            ))
        })?;

        Ok(self.memory_mount.join(relative.trim_start_matches('/')))
    }
}

/// Controller-relative path of the `memory` hierarchy in a
/// `/proc/<pid>/cgroup` listing (`id:controllers:path` per line).
/// The last matching line wins.
pub fn memory_cgroup_relative_path(content: &str) -> Option<&str> {
    content
        .lines()
        .filter_map(|line| {
            let mut fields = line.splitn(3, ':');
            let _id = fields.next()?;
            let controllers = fields.next()?;
            let path = fields.next()?;
            controllers
                .split(',')
                .any(|c| c == "memory")
                .then_some(path)
        })
        .last()
}

/// Write `value` into each control file in order. Permission denial is
/// recorded in `warnings` and skipped; any other failure aborts this ordering.
fn write_controls(
    cgroup: &Path,
    value: &str,
    controls: &[&str],
    warnings: &mut Vec<String>,
) -> io::Result<()> {
    for control in controls {
        let path = cgroup.join(control);
        if *control == MEMSW_LIMIT_FILE && !path.exists() {
            // absent when swap accounting is off
            log::debug!("Skipping missing control file {}", path.display());
            continue;
        }

        match fs::write(&path, value) {
            Ok(()) => log::debug!("Wrote {} to {}", value, path.display()),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                warnings.push("memory limit setting failed".to_string());
                log::warn!("Permission denied writing {}: {}", path.display(), e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

impl MemoryLimiter for CgroupV1Limiter {
    fn backend_name(&self) -> &str {
        "cgroup_v1"
    }

    fn apply(&self, ceiling: MemoryCeiling) -> Result<Vec<String>> {
        let cgroup = self.cgroup_path()?;
        if !cgroup.join(MEMORY_LIMIT_FILE).is_file() {
            return Err(HarnessError::Cgroup(format!(
                "{} not found in {}",
                MEMORY_LIMIT_FILE,
                cgroup.display()
            )));
        }

        let value = ceiling.control_value();
        log::info!("Applying memory ceiling {} to {}", ceiling, cgroup.display());

        // The kernel refuses to set memsw below memory (or memory above
        // memsw) depending on the current values, so try both orders.
        let mut warnings = Vec::new();
        let forward = [MEMSW_LIMIT_FILE, MEMORY_LIMIT_FILE];
        if let Err(first) = write_controls(&cgroup, &value, &forward, &mut warnings) {
            log::debug!("Forward limit order rejected ({}), retrying reversed", first);
            warnings.clear();
            let reversed = [MEMORY_LIMIT_FILE, MEMSW_LIMIT_FILE];
            write_controls(&cgroup, &value, &reversed, &mut warnings).map_err(|e| {
                HarnessError::Cgroup(format!(
                    "Failed to set memory limit in {}: {}",
                    cgroup.display(),
                    e
                ))
            })?;
        }

        Ok(warnings)
    }
}
