//! Driver script grammar
//!
//! Directive parsing and compile-argument accumulation.

pub mod assembler;
pub mod directive;

pub use assembler::CompileState;
pub use directive::Directive;
