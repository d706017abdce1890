/// Verdict classification over captured verifier output
///
/// The result file carries the external contract: the verifier's combined
/// output followed by an `EC: <code>` trailer on normal exit. It is parsed
/// once into a [`CapturedRun`] and classified from the typed fields.
use crate::config::types::{HarnessError, Result};
use std::path::Path;

/// Line the verifier prints when it rejects its own command line
pub const USAGE_ERROR_SENTINEL: &str = "Usage error!";

pub const TRAILER_PREFIX: &str = "EC: ";

/// Verifier exit code for "property violated"
pub const EXIT_VIOLATION: i32 = 10;
/// Verifier exit code for "no violation found"
pub const EXIT_NO_VIOLATION: i32 = 0;

pub fn trailer_line(code: i32) -> String {
    format!("{}{}", TRAILER_PREFIX, code)
}

/// Only the exact text [`trailer_line`] writes is a trailer, so `EC: +10`
/// or `EC: 010` in verifier output are not mistaken for one.
fn parse_trailer(line: &str) -> Option<i32> {
    let code = line.strip_prefix(TRAILER_PREFIX)?.parse().ok()?;
    (trailer_line(code) == line).then_some(code)
}

/// Pick the deciding code when the file holds several trailers: a violation
/// wins over a clean exit, which wins over any other code.
fn deciding_code(codes: impl Iterator<Item = i32>) -> Option<i32> {
    let codes: Vec<i32> = codes.collect();
    [EXIT_VIOLATION, EXIT_NO_VIOLATION]
        .into_iter()
        .find(|code| codes.contains(code))
        .or_else(|| codes.last().copied())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The verifier found a violation
    Error,
    /// The verifier found none
    Valid,
    /// No recognizable exit status (timeout, crash, other exit codes)
    Unknown,
}

impl Verdict {
    pub fn from_exit_code(code: Option<i32>) -> Self {
        match code {
            Some(EXIT_VIOLATION) => Self::Error,
            Some(EXIT_NO_VIOLATION) => Self::Valid,
            _ => Self::Unknown,
        }
    }

    /// Label compared against `expect --result <value>`
    pub fn label(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Valid => "valid",
            Self::Unknown => "unknown",
        }
    }

    /// Value of the `error found:` report line
    pub fn error_found(&self) -> &'static str {
        match self {
            Self::Error => "yes",
            Self::Valid => "no",
            Self::Unknown => "null",
        }
    }

    /// Whether this verdict satisfies an expectation. An unknown outcome
    /// never does, whatever label was expected.
    pub fn meets(&self, expected: &str) -> bool {
        match self {
            Self::Unknown => false,
            verdict => verdict.label() == expected,
        }
    }
}

/// Outcome of one run as recovered from the result file
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CapturedRun {
    pub lines: Vec<String>,
    /// Code from the `EC:` trailer; `None` after a timeout
    pub exit_code: Option<i32>,
    /// The usage-error sentinel appeared on a line of its own
    pub usage_error: bool,
}

impl CapturedRun {
    pub fn parse(text: &str) -> Self {
        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        let exit_code = deciding_code(lines.iter().filter_map(|line| parse_trailer(line)));
        let usage_error = lines.iter().any(|line| line == USAGE_ERROR_SENTINEL);

        Self {
            lines,
            exit_code,
            usage_error,
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            HarnessError::Process(format!(
                "Failed to read result file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self::parse(&String::from_utf8_lossy(&bytes)))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// The verifier rejected its invocation; no verdict is drawn
    UsageError,
    Verdict(Verdict),
}

impl Classification {
    pub fn error_found(&self) -> &'static str {
        match self {
            Self::UsageError => Verdict::Unknown.error_found(),
            Self::Verdict(verdict) => verdict.error_found(),
        }
    }
}

/// Pure function of the captured output
pub fn classify(run: &CapturedRun) -> Classification {
    if run.usage_error {
        return Classification::UsageError;
    }
    Classification::Verdict(Verdict::from_exit_code(run.exit_code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_trailer_is_error() {
        let run = CapturedRun::parse("** Results:\nVERIFICATION FAILED\nEC: 10\n");
        assert_eq!(run.exit_code, Some(10));
        assert_eq!(classify(&run), Classification::Verdict(Verdict::Error));
    }

    #[test]
    fn test_clean_trailer_is_valid() {
        let run = CapturedRun::parse("VERIFICATION SUCCESSFUL\nEC: 0\n");
        assert_eq!(classify(&run), Classification::Verdict(Verdict::Valid));
    }

    #[test]
    fn test_missing_trailer_is_unknown() {
        let run = CapturedRun::parse("still unwinding loop 3\n");
        assert_eq!(run.exit_code, None);
        assert_eq!(classify(&run), Classification::Verdict(Verdict::Unknown));

        let empty = CapturedRun::parse("");
        assert_eq!(classify(&empty), Classification::Verdict(Verdict::Unknown));
    }

    #[test]
    fn test_other_exit_codes_are_unknown() {
        for text in ["EC: 6\n", "EC: 1\n", "EC: -9\n"] {
            let run = CapturedRun::parse(text);
            assert_eq!(classify(&run), Classification::Verdict(Verdict::Unknown));
        }
        assert_eq!(CapturedRun::parse("EC: -9").exit_code, Some(-9));
    }

    #[test]
    fn test_trailer_must_match_whole_line() {
        let run = CapturedRun::parse("EXEC: 10\n  EC: 0\nEC: 10 (done)\n");
        assert_eq!(run.exit_code, None);
    }

    #[test]
    fn test_non_canonical_trailers_are_ignored() {
        for text in ["EC: +10\n", "EC: 010\n", "EC: 00\n", "EC: -0\n", "EC:  0\n"] {
            let run = CapturedRun::parse(text);
            assert_eq!(run.exit_code, None, "{:?}", text);
            assert_eq!(classify(&run), Classification::Verdict(Verdict::Unknown));
        }
    }

    #[test]
    fn test_violation_trailer_takes_precedence() {
        let run = CapturedRun::parse("EC: 10\nmore output\nEC: 0\n");
        assert_eq!(run.exit_code, Some(10));
        assert_eq!(classify(&run), Classification::Verdict(Verdict::Error));

        let run = CapturedRun::parse("EC: 0\nEC: 10\n");
        assert_eq!(classify(&run), Classification::Verdict(Verdict::Error));

        let run = CapturedRun::parse("EC: 6\nEC: 0\nEC: 1\n");
        assert_eq!(run.exit_code, Some(0));

        let run = CapturedRun::parse("EC: 6\nEC: 1\n");
        assert_eq!(run.exit_code, Some(1));
    }

    #[test]
    fn test_usage_error_takes_precedence() {
        let run = CapturedRun::parse("Usage error!\nEC: 6\n");
        assert!(run.usage_error);
        assert_eq!(classify(&run), Classification::UsageError);
        assert_eq!(classify(&run).error_found(), "null");

        let embedded = CapturedRun::parse("warning: Usage error! ignored\nEC: 0\n");
        assert!(!embedded.usage_error);
    }

    #[test]
    fn test_expectation_matching() {
        assert!(Verdict::Error.meets("error"));
        assert!(!Verdict::Valid.meets("error"));
        assert!(Verdict::Valid.meets("valid"));
        assert!(!Verdict::Unknown.meets("unknown"));
        assert!(!Verdict::Unknown.meets("error"));
    }

    #[test]
    fn test_read_result_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, b"\xff binary noise\nEC: 0\n").unwrap();

        let run = CapturedRun::read(&path).unwrap();
        assert_eq!(run.lines.len(), 2);
        assert_eq!(run.exit_code, Some(0));

        assert!(CapturedRun::read(&dir.path().join("missing.txt")).is_err());
    }
}
