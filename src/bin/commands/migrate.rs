//! # migrate
//!
//! The migrate subcommand translates the docker-compose file of every application of an
//! application store.

use super::print_messages;
use crate::CliCommand;
use clap::Args;
use colored::{Color, Colorize};
use dynamic_compose_lib::{
    MigrationOutcome, Migrator, OnExisting, Result, COMPOSE_FILE, OUTPUT_FILE,
};
use std::path::PathBuf;

#[derive(Args, Debug, Default, Clone)]
pub struct Migrate {
    /// The application store path, containing the apps directory.
    /// Default uses the apps directory of the current directory
    appstore: Option<PathBuf>,

    /// What to do with an application already having a dynamic compose file
    #[clap(long, value_enum, default_value_t = OnExisting::Ignore)]
    on_existing: OnExisting,
}

impl CliCommand for Migrate {
    fn run(&self) -> Result<()> {
        if self.appstore.is_none() {
            println!("No path provided, using the apps directory of the current directory");
        }
        let migrator =
            Migrator::from_appstore(self.appstore.as_deref()).on_existing(self.on_existing);

        for migration in migrator.migrate_all()? {
            let app = migration.app;
            match migration.outcome {
                MigrationOutcome::Migrated { output, messages } => {
                    println!(
                        "{:>20} {}",
                        "Migrated".color(Color::Green).bold(),
                        output.display()
                    );
                    print_messages(&messages);
                }
                MigrationOutcome::SkippedExisting => println!(
                    "{:>20} {} already has a {} file",
                    "Skipped".color(Color::Blue).bold(),
                    app,
                    OUTPUT_FILE
                ),
                MigrationOutcome::MissingCompose => println!(
                    "{:>20} {} has no {} file",
                    "Skipped".color(Color::Yellow).bold(),
                    app,
                    COMPOSE_FILE
                ),
                MigrationOutcome::Failed(err) => eprintln!(
                    "{:>20} {}: {}",
                    "Failed".color(Color::Red).bold(),
                    app,
                    err
                ),
            }
        }
        Ok(())
    }
}
