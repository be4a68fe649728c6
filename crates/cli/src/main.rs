//! nosql CLI: run one storage command against a backend.
//!
//! ```text
//! nosql --backend 'plugin:///?cmd=/usr/local/bin/nosql-memory-backend' create-table users
//! nosql --backend memory:// --json get users 1
//! ```
//!
//! Exit status is 0 on success and 1 on any error. The backend is closed
//! before exiting either way.

mod commands;
mod format;
mod parse;

use std::process;

use nosql::plugin::LaunchConfig;
use nosql::prelude::*;
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::{format_error, format_output, Output, OutputMode};
use parse::{matches_to_command, CliCommand};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = build_cli().get_matches();
    let mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let command = match matches_to_command(&matches) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("(error) {}", e);
            process::exit(1);
        }
    };

    let db = match open_database(&matches) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            process::exit(1);
        }
    };

    let result = execute(&db, command);
    let closed = db.close();

    let code = match result.and_then(|output| closed.map(|()| output)) {
        Ok(output) => {
            let formatted = format_output(&output, mode);
            if !formatted.is_empty() {
                println!("{}", formatted);
            }
            0
        }
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            1
        }
    };
    process::exit(code);
}

fn open_database(matches: &clap::ArgMatches) -> Result<Database> {
    let descriptor = matches
        .get_one::<String>("backend")
        .ok_or_else(|| Error::Config("missing --backend".to_string()))?;
    let config = match matches.get_one::<String>("config") {
        Some(path) => LaunchConfig::from_file(path)?,
        None => LaunchConfig::default(),
    };
    Database::builder().launch_config(config).open(descriptor)
}

fn execute(db: &Database, command: CliCommand) -> Result<Output> {
    match command {
        CliCommand::CreateTable { bucket } => {
            db.create_table(bucket.as_bytes())?;
            Ok(Output::Ok)
        }
        CliCommand::DeleteTable { bucket } => {
            db.delete_table(bucket.as_bytes())?;
            Ok(Output::Ok)
        }
        CliCommand::Get { bucket, key } => {
            Ok(Output::Value(db.get(bucket.as_bytes(), key.as_bytes())?))
        }
        CliCommand::Set { bucket, key, value } => {
            db.set(bucket.as_bytes(), key.as_bytes(), value.as_bytes())?;
            Ok(Output::Ok)
        }
        CliCommand::Del { bucket, key } => {
            db.del(bucket.as_bytes(), key.as_bytes())?;
            Ok(Output::Ok)
        }
        CliCommand::Cas {
            bucket,
            key,
            old,
            new,
        } => {
            let (value, swapped) = db.cmp_and_swap(
                bucket.as_bytes(),
                key.as_bytes(),
                old.as_bytes(),
                new.as_bytes(),
            )?;
            Ok(Output::Swap { value, swapped })
        }
        CliCommand::List { bucket } => Ok(Output::Entries(db.list(bucket.as_bytes())?)),
    }
}
