/// Driver script interpreter
///
/// Reads a benchmark script top to bottom and dispatches each directive.
/// Report blocks go to `out`; diagnostics go to `err`.
use crate::config::types::{HarnessError, Result};
use crate::exec::executor::VerifierExecutor;
use crate::script::assembler::CompileState;
use crate::script::directive::Directive;
use crate::verdict::report::{write_unexpected_output, RunReport};
use crate::verdict::verdict::{classify, CapturedRun, Classification};
use std::io::Write;
use std::path::Path;

/// Result of interpreting one script
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptSummary {
    /// One entry per executed `verify` line, in order
    pub reports: Vec<RunReport>,
    pub warnings: usize,
}

impl ScriptSummary {
    pub fn verify_runs(&self) -> usize {
        self.reports.len()
    }

    pub fn wrong(&self) -> usize {
        self.reports.iter().filter(|r| r.is_wrong()).count()
    }
}

pub struct Driver<W: Write, E: Write> {
    executor: VerifierExecutor,
    compile: CompileState,
    expected: Option<String>,
    out: W,
    err: E,
}

impl<W: Write, E: Write> Driver<W, E> {
    pub fn new(executor: VerifierExecutor, out: W, err: E) -> Self {
        Self {
            executor,
            compile: CompileState::new(),
            expected: None,
            out,
            err,
        }
    }

    pub fn run_script(&mut self, path: &Path) -> Result<ScriptSummary> {
        let bytes = std::fs::read(path).map_err(|e| {
            HarnessError::Config(format!("Failed to read script {}: {}", path.display(), e))
        })?;
        log::info!("Running driver script {}", path.display());
        self.run_source(&String::from_utf8_lossy(&bytes))
    }

    pub fn run_source(&mut self, source: &str) -> Result<ScriptSummary> {
        let mut summary = ScriptSummary::default();
        for line in source.lines() {
            self.execute_line(line, &mut summary)?;
        }
        log::info!(
            "Script finished: {} verify runs, {} wrong, {} warnings",
            summary.verify_runs(),
            summary.wrong(),
            summary.warnings
        );
        Ok(summary)
    }

    /// Only a malformed output path or an I/O failure returns `Err`;
    /// everything else degrades to a warning or a report.
    pub fn execute_line(&mut self, line: &str, summary: &mut ScriptSummary) -> Result<()> {
        match Directive::parse(line) {
            Directive::Blank => {}
            Directive::Compile(args) => {
                writeln!(self.err, "{:?}", args)?;
                self.compile.add_compile_args(&args)?;
            }
            Directive::Verify(args) => {
                let report = self.verify(&args)?;
                summary.reports.push(report);
            }
            Directive::Expect(value) => {
                if let Some(previous) = self.expected.replace(value) {
                    log::debug!("Expectation '{}' replaced", previous);
                }
            }
            Directive::BadExpect(option) => {
                writeln!(self.err, "W: unexpected option to expect: {}", option)?;
                summary.warnings += 1;
            }
            Directive::Unknown(raw) => {
                writeln!(self.err, "W: unexpected script line: {}", raw)?;
                summary.warnings += 1;
            }
        }
        Ok(())
    }

    fn verify(&mut self, args: &[String]) -> Result<RunReport> {
        let outcome = self.executor.run(&self.compile, args, &mut self.err)?;
        let captured = CapturedRun::read(self.executor.result_file())?;

        if outcome.exit_code.is_some() && captured.exit_code != outcome.exit_code {
            log::debug!(
                "Result file trailer {:?} differs from observed exit {:?}",
                captured.exit_code,
                outcome.exit_code
            );
        }

        let classification = classify(&captured);
        if classification == Classification::UsageError {
            write_unexpected_output(&captured, &mut self.err)?;
        }

        let report = RunReport::new(
            outcome.timed_out,
            outcome.elapsed,
            classification,
            self.expected.clone(),
        );
        report.write_to(&mut self.out)?;
        Ok(report)
    }

    pub fn compile_state(&self) -> &CompileState {
        &self.compile
    }

    pub fn expected(&self) -> Option<&str> {
        self.expected.as_deref()
    }

    pub fn into_writers(self) -> (W, E) {
        (self.out, self.err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::harness::HarnessConfig;
    use crate::config::types::LimiterKind;
    use crate::kernel::cgroup::noop::NoopLimiter;
    use crate::verdict::verdict::Verdict;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn driver(dir: &TempDir, verifier: &str) -> Driver<Vec<u8>, Vec<u8>> {
        let config = HarnessConfig {
            verifier: PathBuf::from(verifier),
            result_file: dir.path().join("cbmc-output.txt"),
            limiter: LimiterKind::Disabled,
            ..HarnessConfig::default()
        };
        let executor = VerifierExecutor::with_limiter(&config, Box::new(NoopLimiter));
        Driver::new(executor, Vec::new(), Vec::new())
    }

    fn finish(driver: Driver<Vec<u8>, Vec<u8>>) -> (String, String) {
        let (out, err) = driver.into_writers();
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_unknown_lines_warn_and_continue() {
        let dir = tempfile::tempdir().unwrap();
        let mut driver = driver(&dir, "true");

        let summary = driver
            .run_source("link a.o\nexpect --mode fast\n\nverify\n")
            .unwrap();

        assert_eq!(summary.warnings, 2);
        assert_eq!(summary.verify_runs(), 1);
        let (out, err) = finish(driver);
        assert!(err.contains("W: unexpected script line: link a.o"));
        assert!(err.contains("W: unexpected option to expect: --mode"));
        assert!(out.contains("error found: no"));
    }

    #[test]
    fn test_compile_state_and_expectation_persist() {
        let dir = tempfile::tempdir().unwrap();
        let mut driver = driver(&dir, "true");

        driver
            .run_source("compile -O1 a.c\nexpect --result error\ncompile b.c\nexpect --result valid\n")
            .unwrap();

        assert_eq!(driver.compile_state().flags(), ["-O1"]);
        assert_eq!(driver.compile_state().files(), ["a.c", "b.c"]);
        assert_eq!(driver.expected(), Some("valid"));
        let (_, err) = finish(driver);
        assert!(err.contains(r#"["-O1", "a.c"]"#));
    }

    #[test]
    fn test_duplicate_output_aborts_script() {
        let dir = tempfile::tempdir().unwrap();
        let mut driver = driver(&dir, "true");

        let err = driver
            .run_source("compile -o a.bc a.c\ncompile -o b.bc b.c\nverify\n")
            .unwrap_err();

        assert!(matches!(err, HarnessError::DuplicateOutput { .. }));
        let (out, _) = finish(driver);
        assert!(out.is_empty());
    }

    #[test]
    fn test_expectation_mismatch_marks_wrong() {
        let dir = tempfile::tempdir().unwrap();
        let mut driver = driver(&dir, "true");

        let summary = driver
            .run_source("expect --result error\nverify\nexpect --result valid\nverify\n")
            .unwrap();

        assert_eq!(summary.verify_runs(), 2);
        assert_eq!(summary.wrong(), 1);
        assert_eq!(
            summary.reports[0].classification,
            Classification::Verdict(Verdict::Valid)
        );
        let (out, _) = finish(driver);
        assert_eq!(out.matches("wrong: 1").count(), 1);
        assert_eq!(out.matches("timers:").count(), 2);
    }

    #[test]
    fn test_usage_error_dumps_output() {
        let dir = tempfile::tempdir().unwrap();
        let stub = dir.path().join("usage.sh");
        std::fs::write(&stub, "echo 'Usage error!'\nexit 6\n").unwrap();
        let mut driver = driver(&dir, "sh");

        let source = format!("compile {}\nexpect --result error\nverify\n", stub.display());
        let summary = driver.run_source(&source).unwrap();

        assert_eq!(summary.reports[0].classification, Classification::UsageError);
        assert_eq!(summary.wrong(), 0);
        let (out, err) = finish(driver);
        assert!(out.contains("error found: null\n"));
        assert!(!out.contains("wrong"));
        assert!(err.contains("Warning! Unexpected output\nUsage error!\nEC: 6\n"));
    }

    #[test]
    fn test_missing_script_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut driver = driver(&dir, "true");
        let result = driver.run_script(&dir.path().join("absent.script"));
        assert!(matches!(result, Err(HarnessError::Config(_))));
    }
}
