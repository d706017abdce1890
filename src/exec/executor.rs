use crate::config::harness::HarnessConfig;
use crate::config::types::{HarnessError, ResourceLimits, Result};
use crate::exec::invocation::{RunInvocation, VerifyRequest};
/// Timed verifier execution with a memory ceiling and a wall-clock deadline
use crate::kernel::cgroup::backend::{self, MemoryLimiter};
use crate::kernel::signal;
use crate::script::assembler::CompileState;
use crate::verdict::verdict::trailer_line;
use std::fs::File;
use std::io::Write;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// What the runner observed; the verdict itself comes from the result file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    /// Exit code written to the trailer; `None` on timeout or spawn failure
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    /// Wall-clock time from opening the result file to the trailer
    pub elapsed: Duration,
}

/// Runs the verifier once per `verify` directive
pub struct VerifierExecutor {
    verifier: PathBuf,
    result_file: PathBuf,
    defaults: ResourceLimits,
    limiter: Box<dyn MemoryLimiter>,
}

impl VerifierExecutor {
    pub fn new(config: &HarnessConfig) -> Self {
        Self::with_limiter(config, backend::create_memory_limiter(config))
    }

    pub fn with_limiter(config: &HarnessConfig, limiter: Box<dyn MemoryLimiter>) -> Self {
        Self {
            verifier: config.verifier.clone(),
            result_file: config.result_file.clone(),
            defaults: config.limits.clone(),
            limiter,
        }
    }

    pub fn result_file(&self) -> &Path {
        &self.result_file
    }

    /// Execute one `verify` directive. Diagnostics go to `err`.
    pub fn run<S: AsRef<str>, E: Write>(
        &self,
        compile: &CompileState,
        verify_args: &[S],
        err: &mut E,
    ) -> Result<RunOutcome> {
        let request = VerifyRequest::parse(verify_args);
        for warning in &request.warnings {
            writeln!(err, "W: {}", warning)?;
        }

        let limits = request.resolve(&self.defaults);
        match self.limiter.apply(limits.ceiling()) {
            Ok(warnings) => {
                for warning in warnings {
                    writeln!(err, "W: {}", warning)?;
                }
            }
            Err(e) => {
                writeln!(err, "W: memory limit not applied: {}", e)?;
                log::warn!(
                    "Running without memory ceiling ({} backend): {}",
                    self.limiter.backend_name(),
                    e
                );
            }
        }

        let invocation = RunInvocation::assemble(&self.verifier, compile, &request);
        writeln!(err, "{}", invocation)?;
        log::info!(
            "Starting verifier (timeout={:?}, memory={})",
            limits.timeout(),
            limits.ceiling()
        );

        let started = Instant::now();
        let (exit_code, timed_out) = self.execute(&invocation, limits.timeout(), err)?;
        let elapsed = started.elapsed();

        log::info!(
            "Verifier finished: exit_code={:?}, timed_out={}, elapsed={:.3}s",
            exit_code,
            timed_out,
            elapsed.as_secs_f64()
        );

        Ok(RunOutcome {
            exit_code,
            timed_out,
            elapsed,
        })
    }

    fn execute<E: Write>(
        &self,
        invocation: &RunInvocation,
        timeout: Option<Duration>,
        err: &mut E,
    ) -> Result<(Option<i32>, bool)> {
        let mut out = File::create(&self.result_file).map_err(|e| {
            HarnessError::Process(format!(
                "Failed to create result file {}: {}",
                self.result_file.display(),
                e
            ))
        })?;

        // Both streams share the file description, so the trailer written
        // through `out` afterwards lands after everything the child wrote.
        let child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(out.try_clone()?))
            .stderr(Stdio::from(out.try_clone()?))
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                writeln!(
                    err,
                    "W: failed to start {}: {}",
                    invocation.program.display(),
                    e
                )?;
                return Ok((None, false));
            }
        };

        match wait_with_deadline(child, timeout)? {
            Some(status) => {
                let code = exit_code_of(status);
                writeln!(out, "{}", trailer_line(code))?;
                out.flush()?;
                Ok((Some(code), false))
            }
            None => {
                writeln!(err, "W: timeout")?;
                Ok((None, true))
            }
        }
    }
}

/// Exit code as recorded in the trailer; signal deaths are negative
fn exit_code_of(status: ExitStatus) -> i32 {
    status
        .code()
        .unwrap_or_else(|| -status.signal().unwrap_or(0))
}

/// Poll the child until it exits, the deadline passes, or the harness is
/// asked to shut down. `Ok(None)` means the child was killed on timeout.
fn wait_with_deadline(mut child: Child, timeout: Option<Duration>) -> Result<Option<ExitStatus>> {
    let started = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) => {
                if signal::shutdown_requested() {
                    let _ = child.kill();
                    let _ = child.wait();
                    let sig = signal::received_signal().unwrap_or(0);
                    return Err(HarnessError::Interrupted(sig));
                }

                if timeout.is_some_and(|limit| started.elapsed() >= limit) {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok(None);
                }

                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => return Err(HarnessError::Process(format!("wait(verifier): {}", e))),
        }
    }
}
