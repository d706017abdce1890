/// Line-oriented report consumed by the benchmark aggregator
use crate::verdict::verdict::{CapturedRun, Classification};
use std::io::{self, Write};
use std::time::Duration;

/// Everything printed for one `verify` directive
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    pub timed_out: bool,
    /// Wall-clock time of the `search` timer
    pub elapsed: Duration,
    pub classification: Classification,
    pub expected: Option<String>,
}

impl RunReport {
    pub fn new(
        timed_out: bool,
        elapsed: Duration,
        classification: Classification,
        expected: Option<String>,
    ) -> Self {
        Self {
            timed_out,
            elapsed,
            classification,
            expected,
        }
    }

    /// Expectation set and not met. Usage errors are never compared.
    pub fn is_wrong(&self) -> bool {
        match (&self.classification, &self.expected) {
            (Classification::Verdict(verdict), Some(expected)) => !verdict.meets(expected),
            _ => false,
        }
    }

    /// Write the stdout block for this run
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.timed_out {
            writeln!(out, "timeout: 1")?;
        }
        writeln!(out, "timers:")?;
        writeln!(out, "  search: {:.3}", self.elapsed.as_secs_f64())?;
        writeln!(out, "error found: {}", self.classification.error_found())?;
        if self.is_wrong() {
            writeln!(out, "wrong: 1")?;
        }
        out.flush()
    }
}

/// Dump captured output after the verifier rejected its invocation
pub fn write_unexpected_output<E: Write>(run: &CapturedRun, err: &mut E) -> io::Result<()> {
    writeln!(err, "Warning! Unexpected output")?;
    for line in &run.lines {
        writeln!(err, "{}", line)?;
    }
    Ok(())
}
