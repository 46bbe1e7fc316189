mod commands;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use commands::{cmd_check, cmd_keywords, cmd_parse, Settings};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Structural parser for keyword/record deck files.
#[derive(Parser)]
#[command(
    name = "rawdeck",
    version,
    about = "Structural parser for keyword/record deck files"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log parser progress to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// JSON keyword table merged over the built-in one
    #[arg(long, global = true, value_name = "FILE")]
    keywords: Option<PathBuf>,

    /// Keep INCLUDE keywords in the deck instead of expanding them
    #[arg(long, global = true)]
    no_includes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a deck and print every keyword with its records
    Parse {
        /// Path to the root deck file
        file: PathBuf,
    },

    /// List keywords in deck order with their record counts
    Keywords {
        /// Path to the root deck file
        file: PathBuf,
    },

    /// Parse a deck and report only whether it succeeded
    Check {
        /// Path to the root deck file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let settings = match Settings::load(
        cli.keywords.as_deref(),
        cli.no_includes,
        cli.output,
        cli.quiet,
    ) {
        Ok(s) => s,
        Err(e) => {
            commands::report_deck_error(&e, cli.output, cli.quiet);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Parse { file } => cmd_parse(&file, &settings),
        Commands::Keywords { file } => cmd_keywords(&file, &settings),
        Commands::Check { file } => cmd_check(&file, &settings),
    }
}

/// `RUST_LOG` wins unless `--verbose` or `--quiet` is given.
fn init_logging(verbose: bool, quiet: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
