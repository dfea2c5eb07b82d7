//! Chat command - feed messages through the chat handler
//!
//! Reads one message from `--message`, or one message per stdin line, and
//! prints each reply. A message listener for a real chat service would call
//! [`ChatHandler::handle`] the same way.

use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, BufRead, Write};

use super::EngineArgs;
use crate::chat::ChatHandler;
use crate::engine::Engine;

pub fn execute(args: &EngineArgs, message: Option<&str>) -> Result<()> {
    let engine = Engine::from_config(&args.config, args.run_options())?;
    let mut handler = ChatHandler::new(engine);

    if let Some(message) = message {
        println!("{}", handler.handle(message));
        return Ok(());
    }

    if !handler.engine().specification().has_bot_token() {
        eprintln!(
            "{} Bot token not configured; replies are printed locally",
            "─".dimmed()
        );
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read message from stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        writeln!(stdout, "{}", handler.handle(&line)).context("Failed to write reply")?;
        stdout.flush().context("Failed to write reply")?;
    }
    Ok(())
}
