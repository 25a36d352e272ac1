use clap::{Parser, Subcommand};
use colored::{Color, Colorize};
#[cfg(feature = "json_schema")]
use commands::schema::Schema;
use commands::{convert::Convert, migrate::Migrate};
use dynamic_compose_lib::Result;

mod commands;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Migrate every application of an application store
    Migrate(Migrate),
    /// Translate one docker-compose file
    Convert(Convert),
    /// Print the JSON schema of the dynamic compose format
    #[cfg(feature = "json_schema")]
    Schema(Schema),
}

impl Command {
    pub fn run(&self) -> Result<()> {
        match self {
            Command::Migrate(migrate) => migrate.run(),
            Command::Convert(convert) => convert.run(),
            #[cfg(feature = "json_schema")]
            Command::Schema(schema) => schema.run(),
        }
    }
}

pub trait CliCommand {
    fn run(&self) -> Result<()>;
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = cli.command.run() {
        eprintln!("{}: {}", "error".color(Color::Red).bold(), err);
        std::process::exit(1);
    }
}
