//! Welcome banner shown when no subcommand is given

use colored::Colorize;

use crate::LOGO;

pub fn execute() {
    println!("{}", LOGO.cyan().bold());
    println!("\n{}", "AI Project Verification System".bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}", "Available commands:".bold());
    for (command, about) in [
        ("attest run", "Run every check and print the report"),
        ("attest init", "Write the default specification"),
        ("attest chat", "Answer chat commands ('Run Phase 2 test')"),
        ("attest evidence list", "Show evidence files"),
        ("attest evidence verify", "Check a run manifest's digests"),
        ("attest doctor", "Check prerequisites"),
    ] {
        println!("  {:<24} {}", command.cyan(), about.dimmed());
    }
    println!("{}", "─".repeat(40).dimmed());
}
