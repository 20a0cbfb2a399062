use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cal_cli::commands::util::{read_payload, resolve_owner};
use cal_cli::commands::{add, delete, list, today, update};
use cal_cli::{Cli, Commands, Config};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<cal_db::Database> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    cal_db::Database::open(&config.database_path).context("failed to open database")
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match &cli.command {
        Some(Commands::Add { file, user }) => {
            let requester = resolve_owner(*user)?;
            let payload = read_payload(file.as_deref())?;
            let db = open_database(cli.config.as_deref())?;
            add::run(db, &payload, requester)?;
        }
        Some(Commands::Update { id, file, user }) => {
            let requester = resolve_owner(*user)?;
            let payload = read_payload(file.as_deref())?;
            let db = open_database(cli.config.as_deref())?;
            update::run(db, *id, &payload, requester)?;
        }
        Some(Commands::Delete { id, user }) => {
            let requester = resolve_owner(*user)?;
            let db = open_database(cli.config.as_deref())?;
            delete::run(db, *id, requester)?;
        }
        Some(Commands::List(args)) => {
            let requester = resolve_owner(args.user)?;
            let db = open_database(cli.config.as_deref())?;
            list::run(&db, requester, args)?;
        }
        Some(Commands::Today { date, user }) => {
            let requester = resolve_owner(*user)?;
            let db = open_database(cli.config.as_deref())?;
            if !today::run(&db, date.as_deref(), requester)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(ExitCode::SUCCESS)
}
