//! `mobio` — command-line access to the MOBIO verification database.
//!
//! # Commands
//!
//! - `dumplist`: print the paths of the files matching a filter
//!
//! Listings go to stdout, logs to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use tracing::{debug, error, warn};
use tracing_subscriber::{fmt, EnvFilter};

use mobio_db::config::DatabaseConfig;
use mobio_db::dumplist::{self, DumpListArgs};
use mobio_db::Database;

/// MOBIO database access
#[derive(Parser)]
#[command(name = "mobio")]
#[command(version)]
#[command(about = "Query the MOBIO biometric verification database")]
#[command(propagate_version = true)]
struct Cli {
    /// Database file (defaults to $MOBIO_DATABASE, then the packaged db.sql3)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dumps lists of files based on your criteria
    Dumplist(DumpListArgs),
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    // Choices of --protocol and --client come from the database, so the
    // global options are read before the real parse.
    let early = Cli::command()
        .ignore_errors(true)
        .try_get_matches_from(std::env::args_os())
        .ok();
    let verbose = early.as_ref().map_or(0, |m| m.get_count("verbose"));
    let database = early
        .as_ref()
        .and_then(|m| m.get_one::<PathBuf>("database").cloned());
    init_logging(verbose);

    let config = database.map_or_else(DatabaseConfig::from_env, DatabaseConfig::new);
    let db = match Database::open(&config) {
        Ok(db) => Some(db),
        Err(e) => {
            warn!(error = %e, "database not available");
            None
        }
    };

    let cmd = match dumplist::with_choices(Cli::command(), db.as_ref()) {
        Ok(cmd) => cmd,
        Err(e) => {
            error!(error = %e, "failed to read choices from database");
            return ExitCode::FAILURE;
        }
    };
    let cli = match Cli::from_arg_matches(&cmd.get_matches()) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };
    debug!(database = ?cli.database, verbose = cli.verbose, "arguments parsed");

    let Some(db) = db else {
        error!(path = %config.path.display(), "cannot run without a database");
        return ExitCode::FAILURE;
    };

    let result = match cli.command {
        Commands::Dumplist(args) => dumplist::run(&db, &args),
    };
    match result {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            error!(error = %e, "dumplist failed");
            ExitCode::FAILURE
        }
    }
}
