//! Run command - execute every check and print the report

use anyhow::Result;
use colored::Colorize;

use super::EngineArgs;
use crate::engine::Engine;

/// Run verification for `phase`. Returns whether the overall status is PASS.
pub fn execute(args: &EngineArgs, phase: &str) -> Result<bool> {
    let mut engine = Engine::from_config(&args.config, args.run_options())?;

    println!(
        "{} Verifying {} ({})...\n",
        "→".cyan().bold(),
        engine.specification().project_name.bold(),
        phase
    );

    let report = engine.run_verification(phase)?;
    println!("{}", report.text);

    if report.is_pass() {
        println!("{} All checks passed", "✓".green().bold());
    } else {
        println!(
            "{} {}/{} checks passed",
            "✗".red().bold(),
            report.passed,
            report.total
        );
    }
    println!(
        "  {} {}",
        "Report:".dimmed(),
        report.path().display().to_string().dimmed()
    );

    Ok(report.is_pass())
}
