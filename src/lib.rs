pub mod chat;
pub mod checks;
pub mod commands;
pub mod config;
pub mod engine;
pub mod evidence;
pub mod logging;
pub mod report;
pub mod runner;

pub use checks::{Status, VerificationResult};
pub use config::{ConfigError, Specification};
pub use engine::{Engine, RunOptions};
pub use report::Report;

/// ASCII art logo for attest CLI
pub const LOGO: &str = "\
   ┌─┐┌┬┐┌┬┐┌─┐┌─┐┌┬┐
   ├─┤ │  │ ├┤ └─┐ │
   ┴ ┴ ┴  ┴ └─┘└─┘ ┴ ";
