/// Run-to-run identification of the launcher and the verifier binary
use crate::config::types::{HarnessError, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Build classification reported for the shipped verifier
pub const BUILD_TYPE: &str = "Release";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BenchDescription {
    pub driver_checksum: String,
    pub driver: String,
    pub version: String,
    pub checksum: String,
    pub build: String,
}

impl fmt::Display for BenchDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "driver checksum: {}", self.driver_checksum)?;
        writeln!(f, "driver: {}", self.driver)?;
        writeln!(f, "version: {}", self.version)?;
        writeln!(f, "checksum: {}", self.checksum)?;
        writeln!(f, "build type: {}", self.build)
    }
}

/// SHA-256 over the full file contents, lowercase hex
pub fn file_checksum(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path).map_err(|e| {
        HarnessError::Config(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Locate an executable: paths are taken as given, bare names are
/// looked up on `PATH`.
pub fn resolve_executable(name: &Path) -> Option<PathBuf> {
    if name.components().count() > 1 || name.is_absolute() {
        return name.is_file().then(|| name.to_path_buf());
    }

    let search = std::env::var_os("PATH")?;
    std::env::split_paths(&search)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// First line the verifier prints for `--version`
pub fn verifier_version(verifier: &Path) -> Result<String> {
    let output = Command::new(verifier)
        .arg("--version")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| {
            HarnessError::Process(format!("Failed to run {} --version: {}", verifier.display(), e))
        })?;

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .unwrap_or_default()
        .trim_end()
        .to_string())
}

pub fn describe(launcher: &Path, verifier: &Path) -> Result<BenchDescription> {
    let verifier = resolve_executable(verifier).ok_or_else(|| {
        HarnessError::Config(format!("Verifier not found: {}", verifier.display()))
    })?;
    log::debug!("Describing launcher {} and verifier {}", launcher.display(), verifier.display());

    Ok(BenchDescription {
        driver_checksum: file_checksum(launcher)?,
        driver: launcher.display().to_string(),
        version: verifier_version(&verifier)?,
        checksum: file_checksum(&verifier)?,
        build: BUILD_TYPE.to_string(),
    })
}
