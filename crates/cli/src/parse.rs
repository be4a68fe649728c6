//! ArgMatches → CliCommand conversion.

use clap::ArgMatches;

/// One storage action requested on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    CreateTable { bucket: String },
    DeleteTable { bucket: String },
    Get { bucket: String, key: String },
    Set { bucket: String, key: String, value: String },
    Del { bucket: String, key: String },
    Cas { bucket: String, key: String, old: String, new: String },
    List { bucket: String },
}

fn arg(matches: &ArgMatches, name: &str) -> Result<String, String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .ok_or_else(|| format!("missing argument: {}", name))
}

/// Convert clap ArgMatches into a CliCommand.
pub fn matches_to_command(matches: &ArgMatches) -> Result<CliCommand, String> {
    let (name, m) = matches
        .subcommand()
        .ok_or_else(|| "No command provided".to_string())?;

    let bucket = arg(m, "bucket")?;
    match name {
        "create-table" => Ok(CliCommand::CreateTable { bucket }),
        "delete-table" => Ok(CliCommand::DeleteTable { bucket }),
        "get" => Ok(CliCommand::Get {
            bucket,
            key: arg(m, "key")?,
        }),
        "set" => Ok(CliCommand::Set {
            bucket,
            key: arg(m, "key")?,
            value: arg(m, "value")?,
        }),
        "del" => Ok(CliCommand::Del {
            bucket,
            key: arg(m, "key")?,
        }),
        "cas" => Ok(CliCommand::Cas {
            bucket,
            key: arg(m, "key")?,
            old: arg(m, "old")?,
            new: arg(m, "new")?,
        }),
        "list" => Ok(CliCommand::List { bucket }),
        other => Err(format!("Unknown command: {}", other)),
    }
}
