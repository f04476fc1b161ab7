use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use posref::{commands, diagnostics, error, info};
use tracing_subscriber::EnvFilter;

/// Command-line arguments.
#[derive(Parser)]
#[command(
    name = "posref",
    about = "Find the symbol under a cursor position in shell scripts",
    long_about = None,
    version
)]
struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// posref subcommands.
#[derive(Subcommand)]
#[allow(
    clippy::arbitrary_source_item_ordering,
    reason = "positional arguments are parsed in declaration order: file, line, column"
)]
enum Commands {
    /// Print the function, parameter, or variable at a 1-based position
    At {
        /// Script to inspect
        file: PathBuf,
        /// 1-based line
        line: u32,
        /// 1-based column
        column: u32,
        /// Match function definitions on their whole declaration, not just the name
        #[arg(long)]
        full_definition: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show supported languages, exit codes, and current configuration
    Info {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List every symbol in a script in traversal order
    Symbols {
        /// Script to inspect
        file: PathBuf,
        /// Match function definitions on their whole declaration, not just the name
        #[arg(long)]
        full_definition: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Print a diagnostic and map it to the runtime-error exit code.
fn exit_with_error(e: &error::Error) -> ExitCode {
    diagnostics::print_error(e);
    return ExitCode::from(2);
}

/// Install a stderr subscriber when `POSREF_LOG` or `RUST_LOG` is set.
/// `POSREF_LOG` wins when both are present.
fn init_tracing() {
    let filter = match (std::env::var("POSREF_LOG"), std::env::var("RUST_LOG")) {
        (Ok(directives), _) => EnvFilter::builder().parse_lossy(directives),
        (Err(_), Ok(_)) => EnvFilter::from_default_env(),
        (Err(_), Err(_)) => return,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run one subcommand and map its outcome to an exit code.
fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::At { file, line, column, full_definition, json } => {
            commands::at(&file, line, column, full_definition, json)
        },
        Commands::Info { json } => {
            info::run(json);
            Ok(ExitCode::SUCCESS)
        },
        Commands::Symbols { file, full_definition, json } => commands::symbols(&file, full_definition, json),
    };

    return match result {
        Ok(code) => code,
        Err(e) => exit_with_error(&e),
    };
}
