/// Verifier command-line construction from compile state and verify tokens
use crate::config::types::{MemoryCeiling, ResourceLimits};
use crate::script::assembler::CompileState;
use std::fmt;
use std::path::{Path, PathBuf};

/// Wrapper switches with no meaning to the verifier
const DROPPED_SWITCHES: &[&str] = &["--symbolic", "--sequential", "--svcomp"];

/// Intermediate artifacts named on verify lines; the sources are passed instead
const ARTIFACT_SUFFIX: &str = ".bc";

/// Tokens of one `verify` line after the harness took its own options out
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VerifyRequest {
    /// Forwarded to the verifier, in script order
    pub args: Vec<String>,
    pub max_time_secs: Option<u64>,
    pub max_memory: Option<MemoryCeiling>,
    /// Malformed harness options; reported, never fatal
    pub warnings: Vec<String>,
}

impl VerifyRequest {
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Self {
        let mut request = Self::default();
        let mut tokens = tokens.iter().map(AsRef::as_ref);

        while let Some(token) = tokens.next() {
            match token {
                "-o" => {
                    tokens.next();
                }
                "--max-time" => match tokens.next() {
                    Some(value) => match value.parse::<u64>() {
                        Ok(secs) => request.max_time_secs = Some(secs),
                        Err(_) => request
                            .warnings
                            .push(format!("invalid value for --max-time: {}", value)),
                    },
                    None => request.warnings.push("missing value for --max-time".to_string()),
                },
                "--max-memory" => match tokens.next() {
                    Some(value) => match MemoryCeiling::parse(value) {
                        Ok(ceiling) => request.max_memory = Some(ceiling),
                        Err(e) => request
                            .warnings
                            .push(format!("invalid value for --max-memory: {}", e)),
                    },
                    None => request
                        .warnings
                        .push("missing value for --max-memory".to_string()),
                },
                t if DROPPED_SWITCHES.contains(&t) => {}
                t if t.ends_with(ARTIFACT_SUFFIX) => {}
                t => request.args.push(t.to_string()),
            }
        }

        request
    }

    /// Per-line overrides on top of the configured defaults
    pub fn resolve(&self, defaults: &ResourceLimits) -> ResourceLimits {
        ResourceLimits {
            max_time_secs: self.max_time_secs.or(defaults.max_time_secs),
            max_memory: self.max_memory.or(defaults.max_memory),
        }
    }
}

/// Concrete argument vector submitted to the verifier
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunInvocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl RunInvocation {
    /// Verifier, compile flags, verify tokens, then source files
    pub fn assemble(verifier: &Path, compile: &CompileState, request: &VerifyRequest) -> Self {
        let args = compile
            .flags()
            .iter()
            .chain(request.args.iter())
            .chain(compile.files().iter())
            .cloned()
            .collect();

        Self {
            program: verifier.to_path_buf(),
            args,
        }
    }

    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

impl fmt::Display for RunInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.argv())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_options_are_stripped() {
        let request = VerifyRequest::parse(&[
            "-o",
            "prog.bc",
            "--max-time",
            "30",
            "--symbolic",
            "--unwind",
            "5",
            "--max-memory",
            "2G",
            "--sequential",
            "--svcomp",
            "other.bc",
            "--bounds-check",
        ]);

        assert_eq!(request.args, ["--unwind", "5", "--bounds-check"]);
        assert_eq!(request.max_time_secs, Some(30));
        assert_eq!(request.max_memory, Some(MemoryCeiling::Bytes(2 << 30)));
        assert!(request.warnings.is_empty());
    }

    #[test]
    fn test_malformed_options_warn() {
        let request = VerifyRequest::parse(&["--max-time", "soon", "--max-memory"]);
        assert_eq!(request.max_time_secs, None);
        assert_eq!(request.max_memory, None);
        assert_eq!(request.warnings.len(), 2);
        assert!(request.args.is_empty());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let defaults = ResourceLimits {
            max_time_secs: Some(100),
            max_memory: Some(MemoryCeiling::Bytes(1 << 30)),
        };

        let request = VerifyRequest::parse(&["--max-time", "7"]);
        let limits = request.resolve(&defaults);
        assert_eq!(limits.max_time_secs, Some(7));
        assert_eq!(limits.max_memory, Some(MemoryCeiling::Bytes(1 << 30)));

        let limits = VerifyRequest::parse::<&str>(&[]).resolve(&ResourceLimits::default());
        assert_eq!(limits, ResourceLimits::default());
    }

    #[test]
    fn test_command_order() {
        let mut compile = CompileState::new();
        compile
            .add_compile_args(&["-DN=3", "a.c", "-o", "a.bc", "-m32", "b.c"])
            .unwrap();
        let request = VerifyRequest::parse(&["--unwind", "4", "a.bc"]);

        let invocation = RunInvocation::assemble(Path::new("/opt/cbmc"), &compile, &request);
        assert_eq!(
            invocation.argv(),
            ["/opt/cbmc", "-DN=3", "-m32", "--unwind", "4", "a.c", "b.c"]
        );
        assert_eq!(
            invocation.to_string(),
            r#"["/opt/cbmc", "-DN=3", "-m32", "--unwind", "4", "a.c", "b.c"]"#
        );
    }

    #[test]
    fn test_verify_without_compile() {
        let request = VerifyRequest::parse(&["--version"]);
        let invocation = RunInvocation::assemble(Path::new("cbmc"), &CompileState::new(), &request);
        assert_eq!(invocation.args, ["--version"]);
    }
}
