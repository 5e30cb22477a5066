//! modelres CLI - command-line interface
//!
//! Looks up, downloads and registers model archives through the
//! `modelres` library.

mod commands;
mod error;
mod progress;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use modelres::logging::{init_logging, LogConfig};
use tracing::debug;

use commands::common::{load_config, open_resolver, verbosity_level};
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "modelres")]
#[command(version)]
#[command(about = "Resolve libraries to pre-built model archives", long_about = None)]
struct Cli {
    /// Configuration file (default: <config dir>/modelres/config.ini)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Find the best stored archive for a library
    Find {
        /// Library name, e.g. org.eclipse.jface
        name: String,
        /// Library version; latest when omitted
        version: Option<String>,
    },
    /// Download an archive into the local repository
    Resolve {
        /// groupId:artifactId:extension[:classifier]:version
        coordinate: String,
        /// Ignore cached outcomes and local files
        #[arg(long)]
        force: bool,
    },
    /// Download an archive and add it to the store
    Install {
        /// groupId:artifactId:extension[:classifier]:version
        coordinate: String,
        /// Ignore cached outcomes and local files
        #[arg(long)]
        force: bool,
    },
    /// Print the local path of a resolved archive
    Location {
        /// groupId:artifactId:extension[:classifier]:version
        coordinate: String,
    },
    /// Move an archive file into the store
    Register {
        /// Archive to register
        file: PathBuf,
    },
    /// List stored archives
    List,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{} {}", console::style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(cli.config.as_deref())?;
    let log_config = LogConfig {
        level: verbosity_level(cli.verbose, &config.logging.level),
        file: config.logging.file.clone(),
    };
    let _log_guard = init_logging(&log_config)?;
    debug!(?config, "Loaded configuration");

    let (resolver, progress) = open_resolver(&config)?;
    match cli.command {
        Command::Find { name, version } => commands::archive::find(&resolver, &name, version.as_deref()),
        Command::Resolve { coordinate, force } => {
            commands::repository::resolve(&resolver, &progress, &coordinate, force)
        }
        Command::Install { coordinate, force } => {
            commands::repository::install(&resolver, &progress, &coordinate, force)
        }
        Command::Location { coordinate } => commands::repository::location(&resolver, &coordinate),
        Command::Register { file } => commands::archive::register(&resolver, &file),
        Command::List => commands::archive::list(&resolver),
    }
}
