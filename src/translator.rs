//! # translator
//!
//! Translates each service of a compose document into a dynamic compose service.

use crate::{
    compose::{get, scalar_to_string, to_json},
    deploy::normalize_deploy,
    healthcheck::normalize_healthcheck,
    port::{PortCollector, PortSpec},
    ComposeDocument, DependsOn, DynamicCompose, Error, Logging, PortMapping, PortValue, Result,
    Service, Volume,
};
use colored::{Color, Colorize};
use serde_json::{json, Map, Value as JsonValue};
use serde_yaml::{Mapping, Sequence, Value};
use std::fmt;

/// Label prefixes owned by the reverse proxy and the platform
pub const RESERVED_LABEL_PREFIXES: &[&str] = &["traefik", "runtipi"];

/// Service keys translated into the dynamic compose format
pub const RECOGNIZED_KEYS: &[&str] = &[
    "image",
    "ports",
    "hostname",
    "extra_hosts",
    "user",
    "pid",
    "network_mode",
    "network-mode",
    "environment",
    "depends_on",
    "volumes",
    "working_dir",
    "read_only",
    "entrypoint",
    "command",
    "sysctls",
    "privileged",
    "tty",
    "stdin_open",
    "deploy",
    "devices",
    "cap_add",
    "cap_drop",
    "logging",
    "shm_size",
    "stop_signal",
    "security_opt",
    "ulimits",
    "stop_grace_period",
    "healthcheck",
    "labels",
];

/// Service keys the dynamic compose format intentionally does not carry
pub const IGNORED_KEYS: &[&str] = &[
    "restart",
    "build",
    "dns",
    "networks",
    "container_name",
    "env_file",
    "links",
];

#[derive(Debug, Clone, PartialEq)]
pub struct TranslateMessage {
    pub level: MessageLevel,
    pub path: Vec<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageLevel {
    /// The input is translated but may lose meaning
    Warn,
    /// Part of the input could not be translated and was dropped
    Error,
}

impl fmt::Display for TranslateMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}[path={}]: {}",
            match self.level {
                MessageLevel::Error => "error".color(Color::Red).bold(),
                MessageLevel::Warn => "warning".color(Color::Yellow).bold(),
            },
            self.path.join(".").color(Color::Blue).bold(),
            self.message
        )
    }
}

/// The result of a translation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Translation {
    pub compose: DynamicCompose,
    pub messages: Vec<TranslateMessage>,
}

/// Translates compose documents of one application.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Translator {
    app_name: String,
    messages: Vec<TranslateMessage>,
}

impl Translator {
    /// Creates a translator for the application `app_name`: the service with the same name is
    /// the main one.
    pub fn new<S: Into<String>>(app_name: S) -> Self {
        Self {
            app_name: app_name.into(),
            messages: vec![],
        }
    }

    /// Translates all the services of the document in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use dynamic_compose_lib::{ComposeDocument, Translator};
    ///
    /// let compose = ComposeDocument::from_yaml_str(r#"
    /// services:
    ///   whoami:
    ///     image: traefik/whoami
    ///     ports:
    ///       - ${APP_PORT}:80
    /// "#).unwrap();
    /// let translation = Translator::new("whoami").translate(&compose).unwrap();
    /// let service = &translation.compose.services[0];
    /// assert_eq!(service.name, "whoami");
    /// assert_eq!(service.is_main, Some(true));
    /// assert!(translation.messages.is_empty());
    /// ```
    pub fn translate(mut self, compose: &ComposeDocument) -> Result<Translation> {
        let mut services = vec![];
        for (position, (name, spec)) in compose.services().enumerate() {
            match scalar_to_string(name) {
                Some(name) => services.push(self.translate_service(&name, spec)?),
                None => self.push_message(
                    MessageLevel::Error,
                    vec![format!("services[{position}]")],
                    "The service name must be a scalar, the service is dropped".into(),
                ),
            }
        }

        Ok(Translation {
            compose: DynamicCompose {
                services,
                ..Default::default()
            },
            messages: self.messages,
        })
    }

    fn translate_service(&mut self, name: &str, spec: &Value) -> Result<Service> {
        let empty = Mapping::new();
        let spec = match spec {
            Value::Mapping(spec) => spec,
            Value::Null => &empty,
            _ => {
                return Err(Error::Custom(format!(
                    "The service '{name}' must be a mapping"
                )))
            }
        };

        self.check_keys(name, spec);

        let (internal_port, add_ports) = match get(spec, "ports") {
            Some(ports) => self.collect_ports(name, ports)?,
            None => (None, vec![]),
        };

        Ok(Service {
            name: name.into(),
            image: spec.get("image").and_then(scalar_to_string),
            is_main: (name == self.app_name).then_some(true),
            internal_port,
            add_ports: non_empty(add_ports),
            hostname: copy(spec, "hostname")?,
            extra_hosts: copy(spec, "extra_hosts")?,
            user: copy(spec, "user")?,
            pid: copy(spec, "pid")?,
            network_mode: match copy(spec, "network_mode")? {
                Some(network_mode) => Some(network_mode),
                None => copy(spec, "network-mode")?,
            },
            environment: match get(spec, "environment") {
                Some(environment) => key_values(environment)?,
                None => None,
            },
            depends_on: match get(spec, "depends_on") {
                Some(depends_on) => depends_on_of(depends_on)?,
                None => None,
            },
            volumes: match get(spec, "volumes") {
                Some(volumes) => non_empty(self.volumes_of(name, volumes)),
                None => None,
            },
            working_dir: copy(spec, "working_dir")?,
            read_only: copy(spec, "read_only")?,
            entrypoint: copy(spec, "entrypoint")?,
            command: copy(spec, "command")?,
            sysctls: copy(spec, "sysctls")?,
            privileged: copy(spec, "privileged")?,
            tty: copy(spec, "tty")?,
            stdin_open: copy(spec, "stdin_open")?,
            deploy: match get(spec, "deploy") {
                Some(deploy) => normalize_deploy(deploy)?,
                None => None,
            },
            devices: copy(spec, "devices")?,
            cap_add: copy(spec, "cap_add")?,
            cap_drop: copy(spec, "cap_drop")?,
            logging: match get(spec, "logging").and_then(Value::as_mapping) {
                Some(logging) => Some(logging_of(logging)?),
                None => None,
            },
            shm_size: copy(spec, "shm_size")?,
            stop_signal: copy(spec, "stop_signal")?,
            security_opt: copy(spec, "security_opt")?,
            ulimits: match get(spec, "ulimits").and_then(Value::as_mapping) {
                Some(ulimits) => ulimits_of(ulimits)?,
                None => None,
            },
            stop_grace_period: copy(spec, "stop_grace_period")?,
            health_check: match get(spec, "healthcheck") {
                Some(healthcheck) => normalize_healthcheck(healthcheck)?,
                None => None,
            },
            labels: match get(spec, "labels") {
                Some(labels) => key_values(labels)?
                    .map(filter_reserved_labels)
                    .filter(|labels| !labels.is_empty()),
                None => None,
            },
        })
    }

    /// Warns about the keys that are neither translated nor knowingly ignored.
    fn check_keys(&mut self, name: &str, spec: &Mapping) {
        for key in spec.keys() {
            let key = scalar_to_string(key).unwrap_or_else(|| format!("{key:?}"));
            if !RECOGNIZED_KEYS.contains(&key.as_str()) && !IGNORED_KEYS.contains(&key.as_str()) {
                self.push_message(
                    MessageLevel::Warn,
                    vec![name.into(), key],
                    "Unrecognized service key, it is not translated".into(),
                );
            }
        }
    }

    fn collect_ports(
        &mut self,
        name: &str,
        ports: &Value,
    ) -> Result<(Option<PortValue>, Vec<PortMapping>)> {
        let mut collector = PortCollector::new();
        let Some(ports) = ports.as_sequence() else {
            self.push_message(
                MessageLevel::Error,
                vec![name.into(), "ports".into()],
                "The ports must be a list, they are not translated".into(),
            );
            return Ok(collector.finish());
        };
        for (position, port) in ports.iter().enumerate() {
            match scalar_to_string(port) {
                Some(line) if line.trim().is_empty() => self.push_message(
                    MessageLevel::Error,
                    vec![name.into(), "ports".into(), position.to_string()],
                    "Empty port, the port is dropped".into(),
                ),
                Some(line) => collector.push(line.parse::<PortSpec>()?),
                None => self.push_message(
                    MessageLevel::Error,
                    vec![name.into(), "ports".into(), position.to_string()],
                    "Only the short port syntax is translated, the port is dropped".into(),
                ),
            }
        }
        Ok(collector.finish())
    }

    fn volumes_of(&mut self, name: &str, volumes: &Value) -> Vec<Volume> {
        let Some(volumes) = volumes.as_sequence() else {
            self.push_message(
                MessageLevel::Error,
                vec![name.into(), "volumes".into()],
                "The volumes must be a list, they are not translated".into(),
            );
            return vec![];
        };
        let mut result = vec![];
        for (position, volume) in volumes.iter().enumerate() {
            match volume.as_str() {
                Some(volume) => result.push(volume_of(volume)),
                None => self.push_message(
                    MessageLevel::Error,
                    vec![name.into(), "volumes".into(), position.to_string()],
                    "Only the short volume syntax is translated, the volume is dropped".into(),
                ),
            }
        }
        result
    }

    fn push_message(&mut self, level: MessageLevel, path: Vec<String>, message: String) {
        self.messages.push(TranslateMessage {
            level,
            path,
            message,
        });
    }
}

fn non_empty<T>(values: Vec<T>) -> Option<Vec<T>> {
    (!values.is_empty()).then_some(values)
}

/// Copies the value of `key` as is when it is set
fn copy(spec: &Mapping, key: &str) -> Result<Option<JsonValue>> {
    get(spec, key).map(to_json).transpose()
}

/// Reads either a mapping or a list of `KEY=VALUE` entries. List entries without `=` are dropped.
fn key_values(value: &Value) -> Result<Option<Map<String, JsonValue>>> {
    let map = match value {
        Value::Sequence(entries) => parse_key_value_entries(entries),
        Value::Mapping(_) => match to_json(value)? {
            JsonValue::Object(map) => map,
            _ => Map::new(),
        },
        _ => Map::new(),
    };
    Ok((!map.is_empty()).then_some(map))
}

fn parse_key_value_entries(entries: &Sequence) -> Map<String, JsonValue> {
    entries
        .iter()
        .filter_map(Value::as_str)
        .filter_map(|entry| entry.split_once('='))
        .map(|(key, value)| (key.to_string(), JsonValue::String(value.into())))
        .collect()
}

fn filter_reserved_labels(labels: Map<String, JsonValue>) -> Map<String, JsonValue> {
    labels
        .into_iter()
        .filter(|(key, _)| {
            !RESERVED_LABEL_PREFIXES
                .iter()
                .any(|prefix| key.starts_with(prefix))
        })
        .collect()
}

fn depends_on_of(depends_on: &Value) -> Result<Option<DependsOn>> {
    Ok(match depends_on {
        Value::Mapping(services) => Some(DependsOn::Conditions(
            services
                .iter()
                .filter_map(|(name, options)| scalar_to_string(name).map(|name| (name, options)))
                .map(|(name, options)| {
                    let condition = match options.as_mapping().and_then(|o| o.get("condition")) {
                        Some(condition) => to_json(condition)?,
                        None => JsonValue::Null,
                    };
                    Ok((name, json!({ "condition": condition })))
                })
                .collect::<Result<_>>()?,
        )),
        Value::Sequence(services) => Some(DependsOn::Services(
            services.iter().map(to_json).collect::<Result<_>>()?,
        )),
        _ => None,
    })
}

fn volume_of(volume: &str) -> Volume {
    let parts: Vec<&str> = volume.split(':').collect();
    Volume {
        host_path: parts[0].into(),
        container_path: parts.get(1).map(|path| path.to_string()),
        read_only: (parts.get(2) == Some(&"ro")).then_some(true),
    }
}

fn logging_of(logging: &Mapping) -> Result<Logging> {
    Ok(Logging {
        driver: match logging.get("driver") {
            Some(driver) => to_json(driver)?,
            None => JsonValue::Null,
        },
        options: match logging.get("options") {
            Some(Value::Null) | None => JsonValue::Object(Map::new()),
            Some(options) => to_json(options)?,
        },
    })
}

fn ulimits_of(ulimits: &Mapping) -> Result<Option<Map<String, JsonValue>>> {
    let mut result = Map::new();
    for (name, limit) in ulimits {
        let Some(name) = scalar_to_string(name) else {
            continue;
        };
        let limit = match limit {
            Value::Mapping(limits) => {
                let bound = |key: &str| -> Result<JsonValue> {
                    Ok(match limits.get(key) {
                        Some(value) => to_json(value)?,
                        None => JsonValue::Null,
                    })
                };
                json!({ "soft": bound("soft")?, "hard": bound("hard")? })
            }
            limit => to_json(limit)?,
        };
        result.insert(name, limit);
    }
    Ok((!result.is_empty()).then_some(result))
}
