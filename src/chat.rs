//! Chat command handler
//!
//! Maps free-text messages onto engine commands through a fixed table of
//! normalized phrases. Delivery and authentication belong to whatever listener
//! feeds messages in; this side is a plain `&str -> String` function.

use tracing::{error, info};

use crate::engine::{Engine, DEFAULT_PHASE};

/// Reply for any message that does not name a known command
pub const HELP_TEXT: &str = "Available commands:\n\
'Run Phase 2 test' - Execute verification\n\
'Run verification' - Execute verification";

/// Commands a chat message can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCommand {
    RunVerification,
}

/// Phrase table, keys already normalized
const COMMANDS: &[(&str, ChatCommand)] = &[
    ("run phase 2 test", ChatCommand::RunVerification),
    ("run verification", ChatCommand::RunVerification),
];

/// Lowercase and collapse runs of whitespace to a single space.
pub fn normalize(message: &str) -> String {
    message
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Look up the command a message names, if any.
pub fn parse_command(message: &str) -> Option<ChatCommand> {
    let normalized = normalize(message);
    COMMANDS
        .iter()
        .find(|(phrase, _)| normalized.contains(*phrase))
        .map(|(_, command)| *command)
}

pub struct ChatHandler {
    engine: Engine,
}

impl ChatHandler {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Reply to one message: the report text, or the help text.
    pub fn handle(&mut self, message: &str) -> String {
        match parse_command(message) {
            Some(ChatCommand::RunVerification) => {
                info!(command = ?ChatCommand::RunVerification, "chat command received");
                match self.engine.run_verification(DEFAULT_PHASE) {
                    Ok(report) => report.text,
                    Err(e) => {
                        error!(error = %format!("{e:#}"), "verification from chat failed");
                        HELP_TEXT.to_string()
                    }
                }
            }
            None => HELP_TEXT.to_string(),
        }
    }
}
