/// Accumulates compiler-style arguments from `compile` directives
use crate::config::types::{HarnessError, Result};

/// Suffixes of sources handed to the verifier
pub const SOURCE_SUFFIXES: &[&str] = &[".c", ".cpp", ".cc"];

/// Compiler flags the verifier rejects
const DROPPED_FLAGS: &[&str] = &["-fgnu89-inline"];

pub fn is_source_file(token: &str) -> bool {
    SOURCE_SUFFIXES.iter().any(|suffix| token.ends_with(suffix))
}

/// Arguments collected across every `compile` line of one script.
/// Later `verify` lines read it; nothing clears it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompileState {
    flags: Vec<String>,
    output: Option<String>,
    files: Vec<String>,
}

impl CompileState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route the tokens of one `compile` directive. Order is preserved
    /// within each bucket since the verifier honours flag precedence.
    pub fn add_compile_args<S: AsRef<str>>(&mut self, args: &[S]) -> Result<()> {
        let mut tokens = args.iter().map(AsRef::as_ref);

        while let Some(token) = tokens.next() {
            if is_source_file(token) {
                self.files.push(token.to_string());
            } else if token == "-o" {
                let path = tokens.next().ok_or(HarnessError::MissingOutput)?;
                self.set_output(path)?;
            } else if DROPPED_FLAGS.contains(&token) {
                log::debug!("Dropping incompatible compiler flag {}", token);
            } else {
                self.flags.push(token.to_string());
            }
        }

        Ok(())
    }

    fn set_output(&mut self, path: &str) -> Result<()> {
        if let Some(first) = &self.output {
            return Err(HarnessError::DuplicateOutput {
                first: first.clone(),
                second: path.to_string(),
            });
        }
        self.output = Some(path.to_string());
        Ok(())
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    /// The `-o` path is never passed to the verifier; it is tracked only so a
    /// second `-o` in the same script is rejected.
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }
}
