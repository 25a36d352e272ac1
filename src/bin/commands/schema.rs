//! # schema
//!
//! The schema subcommand prints the JSON schema of the dynamic compose format.

use crate::CliCommand;
use clap::Args;
use dynamic_compose_lib::{generate_json_schema, Result};

#[derive(Args, Debug, Default, Clone)]
pub struct Schema;

impl CliCommand for Schema {
    fn run(&self) -> Result<()> {
        println!("{}", generate_json_schema()?);
        Ok(())
    }
}
