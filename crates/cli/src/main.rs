// recmatch CLI - match, merge and filter record collections from a TOML plan

mod exit_codes;
mod plan;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "recmatch")]
#[command(about = "Match, merge and filter record collections (JSON/CSV) from a TOML plan")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a plan and write its output collection as JSON
    #[command(after_help = "\
Examples:
  recmatch run payroll.plan.toml
  recmatch run payroll.plan.toml --json | jq '.[0]'
  recmatch run payroll.plan.toml --output roster.json
  RUST_LOG=debug recmatch run payroll.plan.toml")]
    Run {
        /// Path to the .plan.toml file
        plan: PathBuf,

        /// Print the output collection to stdout
        #[arg(long)]
        json: bool,

        /// Write JSON output to file (overrides [output].json)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Validate a plan without reading any input
    #[command(after_help = "\
Examples:
  recmatch validate payroll.plan.toml")]
    Validate {
        /// Path to the .plan.toml file
        plan: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        None => Err(CliError {
            code: EXIT_USAGE,
            message: "no command given".into(),
            hint: Some("recmatch --help for more information".into()),
        }),
        Some(Commands::Run { plan, json, output }) => plan::cmd_run(plan, json, output),
        Some(Commands::Validate { plan }) => plan::cmd_validate(plan),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
