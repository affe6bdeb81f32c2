use clap::{Parser, Subcommand};
use log::LevelFilter;

use crate::cmd::{
    check::CheckCommand, delete::DeleteCommand, edit::EditCommand, list::ListCommand,
    prune::PruneCommand, schema::SchemaCommand, tax::TaxCommand,
};

mod cmd;
mod domain;
mod records;

#[derive(Parser, Debug)]
#[command(
    name = "txaudit",
    version,
    about = "Validate transaction batches and calculate tax on the valid records"
)]
struct Cli {
    /// Log debug detail (ignored when RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report rejected records and why they failed
    Check(CheckCommand),
    /// Show records with derived profit and validity
    List(ListCommand),
    /// Calculate the final tax over valid records
    Tax(TaxCommand),
    /// Change fields of one record, re-sealing its checksum
    Edit(EditCommand),
    /// Remove one record by index
    Delete(DeleteCommand),
    /// Remove all zero-profit records
    Prune(PruneCommand),
    /// Print the expected CSV columns or the record JSON schema
    Schema(SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Command::Check(cmd) => cmd.exec(),
        Command::List(cmd) => cmd.exec(),
        Command::Tax(cmd) => cmd.exec(),
        Command::Edit(cmd) => cmd.exec(),
        Command::Delete(cmd) => cmd.exec(),
        Command::Prune(cmd) => cmd.exec(),
        Command::Schema(cmd) => cmd.exec(),
    }
}

fn init_logger(verbose: bool) {
    let mut builder = pretty_env_logger::formatted_builder();
    match std::env::var("RUST_LOG") {
        Ok(filters) => {
            builder.parse_filters(&filters);
        }
        Err(_) => {
            builder.filter_level(if verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            });
        }
    }
    builder.init();
}
