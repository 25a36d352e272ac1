//! # dynamic_compose_lib
//!
//! `dynamic_compose_lib` translates the docker-compose files of an application store into the
//! dynamic compose JSON format.
//! The translation works on parsed documents and never touches the filesystem, the [`Migrator`]
//! applies it to a whole `apps` directory.

mod compose;
mod deploy;
mod dynamic_compose_struct;
mod errors;
mod healthcheck;
mod migrator;
mod port;
mod translator;

pub use compose::{ComposeDocument, Truthy};
pub use deploy::normalize_deploy;
pub use dynamic_compose_struct::*;
pub use errors::*;
pub use healthcheck::normalize_healthcheck;
pub use migrator::*;
pub use port::*;
pub use translator::*;

/// Translates a docker-compose YAML content for the application `app_name`.
///
/// # Examples
///
/// ```
/// use dynamic_compose_lib::translate_compose_str;
///
/// let yaml = r#"
/// services:
///   gitea:
///     image: gitea/gitea:1.22
///     ports:
///       - ${APP_PORT}:3000
///       - 2222:22
///   db:
///     image: postgres:16
/// "#;
/// let translation = translate_compose_str(yaml, "gitea").unwrap();
/// assert_eq!(translation.compose.services.len(), 2);
/// assert_eq!(translation.compose.services[0].is_main, Some(true));
/// assert_eq!(translation.compose.services[1].is_main, None);
/// ```
pub fn translate_compose_str(input: &str, app_name: &str) -> Result<Translation> {
    let compose = ComposeDocument::from_yaml_str(input)?;
    Translator::new(app_name).translate(&compose)
}

/// Generates the dynamic compose file content: pretty printed JSON with a trailing newline.
///
/// # Examples
///
/// ```
/// use dynamic_compose_lib::{generate_json_content, DynamicCompose, Service};
///
/// let compose = DynamicCompose {
///     services: vec![Service {
///         name: "whoami".into(),
///         image: Some("traefik/whoami".into()),
///         is_main: Some(true),
///         ..Default::default()
///     }],
///     ..Default::default()
/// };
/// assert_eq!(
///     generate_json_content(&compose).unwrap(),
///     r#"{
///   "$schema": "../dynamic-compose-schema.json",
///   "services": [
///     {
///       "name": "whoami",
///       "image": "traefik/whoami",
///       "isMain": true
///     }
///   ]
/// }
/// "#
/// );
/// ```
pub fn generate_json_content(compose: &DynamicCompose) -> Result<String> {
    let mut content = serde_json::to_string_pretty(compose)?;
    content.push('\n');
    Ok(content)
}

/// Generates the JSON schema of the dynamic compose format.
#[cfg(feature = "json_schema")]
pub fn generate_json_schema() -> Result<String> {
    let schema = schemars::schema_for!(DynamicCompose);
    serde_json::to_string_pretty(&schema).map_err(Error::from)
}
