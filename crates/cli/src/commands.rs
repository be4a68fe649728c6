//! clap command tree.

use clap::{Arg, ArgAction, Command};

fn bucket() -> Arg {
    Arg::new("bucket").required(true).help("Bucket (table) name")
}

fn key() -> Arg {
    Arg::new("key").required(true).help("Key")
}

/// Build the `nosql` command.
pub fn build_cli() -> Command {
    Command::new("nosql")
        .about("Talk to a nosql storage backend")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("backend")
                .long("backend")
                .short('b')
                .value_name("DESCRIPTOR")
                .required(true)
                .help("Backend descriptor, e.g. memory:// or plugin:///?cmd=/path/to/backend"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .global(true)
                .help("TOML launch configuration"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Print results as JSON"),
        )
        .subcommand(
            Command::new("create-table")
                .about("Create a bucket (no error if it exists)")
                .arg(bucket()),
        )
        .subcommand(
            Command::new("delete-table")
                .about("Delete a bucket and its contents")
                .arg(bucket()),
        )
        .subcommand(Command::new("get").about("Read a key").arg(bucket()).arg(key()))
        .subcommand(
            Command::new("set")
                .about("Write a key")
                .arg(bucket())
                .arg(key())
                .arg(Arg::new("value").required(true).help("Value")),
        )
        .subcommand(Command::new("del").about("Delete a key").arg(bucket()).arg(key()))
        .subcommand(
            Command::new("cas")
                .about("Compare-and-swap a key")
                .arg(bucket())
                .arg(key())
                .arg(Arg::new("old").required(true).help("Expected current value"))
                .arg(Arg::new("new").required(true).help("Replacement value")),
        )
        .subcommand(Command::new("list").about("List a bucket").arg(bucket()))
}
