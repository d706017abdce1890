//! Execution control
//!
//! Builds the verifier invocation and runs it under the per-run limits.

pub mod executor;
pub mod invocation;

pub use executor::{RunOutcome, VerifierExecutor};
pub use invocation::{RunInvocation, VerifyRequest};
