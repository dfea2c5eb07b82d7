use anyhow::Result;
use attest::commands::{chat, completions, doctor, evidence, init, run, welcome, EngineArgs};
use attest::engine::DEFAULT_PHASE;
use attest::evidence::{DEFAULT_EVIDENCE_DIR, LOG_FILE_NAME};
use attest::logging;
use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "attest")]
#[command(about = "Deliverable verification with an evidence trail", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging (overrides ATTEST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every check and print the report (exit 1 on FAIL)
    Run {
        /// Phase label recorded in the report
        #[arg(short, long, default_value = DEFAULT_PHASE)]
        phase: String,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Write the default specification file
    Init {
        /// Specification file to create
        #[arg(short, long, default_value = attest::config::DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Answer chat commands from --message or stdin
    Chat {
        /// Single message to answer
        #[arg(short, long)]
        message: Option<String>,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Inspect the evidence directory
    Evidence {
        #[command(subcommand)]
        command: EvidenceCommands,
    },

    /// Check verification prerequisites
    Doctor {
        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum EvidenceCommands {
    /// List evidence files with sizes
    List {
        /// Evidence directory
        #[arg(long, default_value = DEFAULT_EVIDENCE_DIR)]
        evidence_dir: PathBuf,
    },

    /// Re-hash the artifacts a run manifest lists
    Verify {
        /// Path to a run_*.json manifest
        manifest: PathBuf,
    },
}

fn exit_code(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn dispatch(cli: Cli) -> Result<ExitCode> {
    let Some(command) = cli.command else {
        welcome::execute();
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Run { phase, engine } => {
            logging::init(Some(&engine.evidence_dir.join(LOG_FILE_NAME)), cli.verbose)?;
            run::execute(&engine, &phase).map(exit_code)
        }
        Commands::Init { config, force } => {
            logging::init(None, cli.verbose)?;
            init::execute(&config, force).map(|()| ExitCode::SUCCESS)
        }
        Commands::Chat { message, engine } => {
            logging::init(Some(&engine.evidence_dir.join(LOG_FILE_NAME)), cli.verbose)?;
            chat::execute(&engine, message.as_deref()).map(|()| ExitCode::SUCCESS)
        }
        Commands::Evidence { command } => {
            logging::init(None, cli.verbose)?;
            match command {
                EvidenceCommands::List { evidence_dir } => {
                    evidence::list(&evidence_dir).map(|()| ExitCode::SUCCESS)
                }
                EvidenceCommands::Verify { manifest } => evidence::verify(&manifest).map(exit_code),
            }
        }
        Commands::Doctor { engine } => {
            logging::init(None, cli.verbose)?;
            doctor::execute(&engine).map(exit_code)
        }
        Commands::Completions { shell } => {
            completions::execute(&mut Cli::command(), shell);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    match dispatch(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
