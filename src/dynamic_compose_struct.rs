#[cfg(feature = "json_schema")]
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// The relative location of the schema from an application folder
pub const DEFAULT_SCHEMA: &str = "../dynamic-compose-schema.json";

/** Represents the dynamic compose document of an application */
#[derive(Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
pub struct DynamicCompose {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub services: Vec<Service>,
}

impl Default for DynamicCompose {
    fn default() -> Self {
        Self {
            schema: DEFAULT_SCHEMA.into(),
            services: vec![],
        }
    }
}

/** Represents one service of a dynamic compose document */
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub name: String,
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_main: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_port: Option<PortValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_ports: Option<Vec<PortMapping>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_hosts: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<DependsOn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<Volume>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sysctls: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privileged: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tty: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdin_open: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy: Option<Deploy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devices: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cap_add: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cap_drop: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<Logging>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shm_size: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_signal: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_opt: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ulimits: Option<Map<String, Value>>,
    // the catalog reads this one in snake case
    #[serde(rename = "stop_grace_period", skip_serializing_if = "Option::is_none")]
    pub stop_grace_period: Option<Value>,
    #[serde(rename = "healthCheck", skip_serializing_if = "Option::is_none")]
    pub health_check: Option<HealthCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Map<String, Value>>,
}

/// A port number, or the literal text when it is not purely numeric (variable references)
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[serde(untagged)]
pub enum PortValue {
    Number(u64),
    Literal(String),
}

impl From<&str> for PortValue {
    fn from(value: &str) -> Self {
        if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
            // a digit string too long for a u64 stays literal
            value
                .parse()
                .map(PortValue::Number)
                .unwrap_or_else(|_| PortValue::Literal(value.into()))
        } else {
            PortValue::Literal(value.into())
        }
    }
}

impl fmt::Display for PortValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PortValue::Number(port) => write!(f, "{port}"),
            PortValue::Literal(port) => write!(f, "{port}"),
        }
    }
}

/// An additional port exposed by a service
#[derive(Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_port: Option<PortValue>,
    pub container_port: PortValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcp: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udp: Option<bool>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub host_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[serde(untagged)]
pub enum DependsOn {
    Conditions(Map<String, Value>),
    Services(Vec<Value>),
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_period: Option<Value>,
    pub test: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
pub struct Deploy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Resources>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
pub struct Resources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservations: Option<Reservations>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
pub struct Reservations {
    #[serde(flatten)]
    pub values: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devices: Option<Vec<DeviceReservation>>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
pub struct DeviceReservation {
    pub driver: Value,
    pub count: Value,
    pub capabilities: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
pub struct Logging {
    pub driver: Value,
    pub options: Value,
}
