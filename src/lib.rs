//! divbench: runs a program verifier against one benchmark under time and
//! memory limits and reports its verdict for an outer aggregator.
//!
//! # Architecture
//!
//! ## Script ([`script`])
//! - [`script::directive`]: `compile` / `verify` / `expect` line parsing
//! - [`script::assembler`]: Compile-argument accumulation (flags, output, sources)
//!
//! ## Kernel Interfaces ([`kernel`])
//! - [`kernel::cgroup`]: Memory ceiling through cgroup v1, or a no-op limiter
//! - [`kernel::signal`]: Async-safe shutdown flag checked by the runner
//!
//! ## Execution Control ([`exec`])
//! - [`exec::invocation`]: Verify-line filtering and command assembly
//! - [`exec::executor`]: Timed child execution with output capture
//!
//! ## Verdict ([`verdict`])
//! - [`verdict::verdict`]: Classification over the captured result file
//! - [`verdict::report`]: Aggregator-facing report lines
//!
//! ## Driver ([`driver`]) and Provenance ([`provenance`])
//!
//! # Report contract
//!
//! For every `verify` line the harness prints to stdout:
//!
//! ```text
//! timeout: 1          (only when the deadline was hit)
//! timers:
//!   search: 12.345
//! error found: yes|no|null
//! wrong: 1            (only when the verdict misses the expectation)
//! ```

// Configuration
pub mod config;

// Script grammar
pub mod script;

// Kernel Interfaces
pub mod kernel;

// Execution Control
pub mod exec;

// Verdict & Report
pub mod verdict;

// Script interpreter
pub mod driver;

// Launcher and verifier identification
pub mod provenance;

// CLI entrypoint wiring
pub mod cli;

pub use config::types::*;
pub use driver::{Driver, ScriptSummary};
