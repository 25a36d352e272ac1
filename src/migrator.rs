//! # migrator
//!
//! Applies the translation to every application folder of an application store.

use crate::{generate_json_content, translate_compose_str, Error, Result, TranslateMessage};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// The directory of the application store containing the application folders
pub const APPS_DIR: &str = "apps";
/// The compose file of an application folder
pub const COMPOSE_FILE: &str = "docker-compose.yml";
/// The dynamic compose file of an application folder
pub const OUTPUT_FILE: &str = "docker-compose.json";
/// The file written next to an existing dynamic compose file
pub const NEW_OUTPUT_FILE: &str = "docker-compose.json.new";

/// What to do with an application already having a dynamic compose file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OnExisting {
    /// Skip the application
    #[default]
    Ignore,
    /// Write the translation to a `.new` file next to the existing one
    New,
}

#[derive(Debug)]
pub enum MigrationOutcome {
    Migrated {
        output: PathBuf,
        messages: Vec<TranslateMessage>,
    },
    SkippedExisting,
    MissingCompose,
    Failed(Error),
}

#[derive(Debug)]
pub struct AppMigration {
    pub app: String,
    pub outcome: MigrationOutcome,
}

/// Migrates the application folders of an `apps` directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Migrator {
    pub apps_dir: PathBuf,
    pub on_existing: OnExisting,
}

impl Migrator {
    pub fn new<P: Into<PathBuf>>(apps_dir: P) -> Self {
        Self {
            apps_dir: apps_dir.into(),
            on_existing: OnExisting::default(),
        }
    }

    /// The `apps` directory of an application store, or the one of the current directory.
    pub fn from_appstore(appstore: Option<&Path>) -> Self {
        match appstore {
            Some(appstore) => Self::new(appstore.join(APPS_DIR)),
            None => Self::new(APPS_DIR),
        }
    }

    pub fn on_existing(mut self, on_existing: OnExisting) -> Self {
        self.on_existing = on_existing;
        self
    }

    /// Migrates every application folder, sorted by name.
    ///
    /// Only a failure to list the `apps` directory is returned as an error, each folder failure
    /// is reported in its own outcome.
    pub fn migrate_all(&self) -> Result<Vec<AppMigration>> {
        let entries = fs::read_dir(&self.apps_dir).map_err(|err| {
            Error::Custom(format!(
                "Unable to read the apps directory {}: {}",
                self.apps_dir.display(),
                err
            ))
        })?;

        let mut apps: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .collect();
        apps.sort();

        Ok(apps
            .into_iter()
            .map(|app| AppMigration {
                outcome: self.migrate_app(&app),
                app,
            })
            .collect())
    }

    /// Migrates one application folder.
    pub fn migrate_app(&self, app: &str) -> MigrationOutcome {
        let app_path = self.apps_dir.join(app);
        let compose_path = app_path.join(COMPOSE_FILE);
        if !compose_path.exists() {
            return MigrationOutcome::MissingCompose;
        }

        let mut output = app_path.join(OUTPUT_FILE);
        if output.exists() {
            match self.on_existing {
                OnExisting::Ignore => return MigrationOutcome::SkippedExisting,
                OnExisting::New => output = app_path.join(NEW_OUTPUT_FILE),
            }
        }

        match migrate_file(&compose_path, &output, app) {
            Ok(messages) => MigrationOutcome::Migrated { output, messages },
            Err(err) => MigrationOutcome::Failed(err),
        }
    }
}

/// Translates the compose file `input` of the application `app` into `output`.
pub fn migrate_file(input: &Path, output: &Path, app: &str) -> Result<Vec<TranslateMessage>> {
    let content = fs::read_to_string(input).map_err(|err| {
        Error::Custom(format!(
            "Unable to read the compose file {}: {}",
            input.display(),
            err
        ))
    })?;
    let (json, messages) = migrate_compose_str(&content, app)?;
    fs::write(output, json).map_err(|err| {
        Error::Custom(format!(
            "Unable to write the dynamic compose file {}: {}",
            output.display(),
            err
        ))
    })?;
    Ok(messages)
}

/// Translates a compose content of the application `app` into the dynamic compose file content.
pub fn migrate_compose_str(input: &str, app: &str) -> Result<(String, Vec<TranslateMessage>)> {
    let translation = translate_compose_str(input, app)?;
    let json = generate_json_content(&translation.compose)?;
    Ok((json, translation.messages))
}
