//! Verdict classification and reporting
//!
//! Derives verdicts as pure functions over the captured result file and
//! renders the aggregator-facing report.

pub mod report;
pub mod verdict;

pub use report::RunReport;
pub use verdict::{classify, CapturedRun, Classification, Verdict};
