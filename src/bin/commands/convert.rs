//! # convert
//!
//! The convert subcommand translates one docker-compose file.

use super::print_messages;
use crate::CliCommand;
use clap::Args;
use dynamic_compose_lib::{migrate_compose_str, Error, Result, COMPOSE_FILE};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Args, Debug, Default, Clone)]
pub struct Convert {
    /// The docker-compose file. Use "-" to read from stdin
    #[clap(short, long, default_value = COMPOSE_FILE)]
    file: String,

    /// The application name, the service with the same name is the main one.
    /// Default is the name of the directory of the compose file
    #[clap(short, long)]
    app_name: Option<String>,

    /// The output dynamic compose file.
    /// Define to - to write to stdout
    #[clap(short, long, default_value = "-")]
    output: String,
}

impl CliCommand for Convert {
    fn run(&self) -> Result<()> {
        let (content, app_name) = if self.file == "-" {
            let content = std::io::read_to_string(std::io::stdin()).map_err(Error::display)?;
            let app_name = self.app_name.clone().ok_or(Error::Custom(
                "The application name is required when reading from stdin".into(),
            ))?;
            (content, app_name)
        } else {
            let path = PathBuf::from(&self.file);
            if !path.exists() {
                return Err(Error::Custom(format!(
                    "No compose file found at path: {}",
                    path.display()
                )));
            }
            let content = fs::read_to_string(&path).map_err(|err| {
                Error::Custom(format!("Unable to read the compose file: {}", err))
            })?;
            let app_name = match &self.app_name {
                Some(app_name) => app_name.clone(),
                None => app_name_of(&path)?,
            };
            (content, app_name)
        };

        let (json, messages) = migrate_compose_str(&content, &app_name)?;
        print_messages(&messages);

        if self.output == "-" {
            print!("{}", json);
        } else {
            fs::write(PathBuf::from(&self.output), json).map_err(|err| {
                Error::Custom(format!("Unable to write the dynamic compose file: {}", err))
            })?;
        }
        Ok(())
    }
}

/// The name of the directory containing the compose file
fn app_name_of(path: &Path) -> Result<String> {
    let path = fs::canonicalize(path)
        .map_err(|err| Error::Custom(format!("Unable to resolve the compose file: {}", err)))?;
    path.parent()
        .and_then(|dir| dir.file_name())
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or(Error::Custom(
            "Unable to get the application name from the compose file path".into(),
        ))
}
