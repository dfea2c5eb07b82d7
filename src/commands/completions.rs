//! Completions command - print a shell completion script

use clap::Command;
use clap_complete::{generate, Shell};
use std::io;

/// Write the completion script for `shell` to stdout.
pub fn execute(cmd: &mut Command, shell: Shell) {
    let bin_name = cmd.get_name().to_string();
    generate(shell, cmd, bin_name, &mut io::stdout());
}
