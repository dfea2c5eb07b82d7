//! End-to-end tests for attest
//!
//! Library-level runs against temp projects, plus the compiled binary.

pub mod cli;
pub mod helpers;
pub mod pipeline;

pub use helpers::*;
