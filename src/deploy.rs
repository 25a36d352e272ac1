use crate::{
    compose::{get, to_json, Truthy},
    Deploy, DeviceReservation, Reservations, Resources, Result,
};
use serde_json::{Map, Value as JsonValue};
use serde_yaml::{Mapping, Value};

/// Normalizes the resources part of a compose deploy block.
///
/// Returns `None` when nothing of the block is translated.
pub fn normalize_deploy(deploy: &Value) -> Result<Option<Deploy>> {
    let resources = match deploy
        .as_mapping()
        .and_then(|deploy| get(deploy, "resources"))
        .and_then(Value::as_mapping)
    {
        Some(resources) => normalize_resources(resources)?,
        None => None,
    };
    Ok(resources.map(|resources| Deploy {
        resources: Some(resources),
    }))
}

fn normalize_resources(resources: &Mapping) -> Result<Option<Resources>> {
    let limits = match get(resources, "limits").and_then(Value::as_mapping) {
        Some(limits) => Some(copy_mapping(limits, |_| true)?),
        None => None,
    };
    let reservations = match get(resources, "reservations").and_then(Value::as_mapping) {
        Some(reservations) => normalize_reservations(reservations)?,
        None => None,
    };
    if limits.is_none() && reservations.is_none() {
        return Ok(None);
    }
    Ok(Some(Resources {
        limits,
        reservations,
    }))
}

fn normalize_reservations(reservations: &Mapping) -> Result<Option<Reservations>> {
    let values = copy_mapping(reservations, |key| key != "devices")?;
    let devices = match get(reservations, "devices").and_then(Value::as_sequence) {
        Some(devices) => devices
            .iter()
            .filter_map(Value::as_mapping)
            .map(normalize_device)
            .collect::<Result<Vec<_>>>()?,
        None => vec![],
    };
    if values.is_empty() && devices.is_empty() {
        return Ok(None);
    }
    Ok(Some(Reservations {
        values,
        devices: (!devices.is_empty()).then_some(devices),
    }))
}

fn normalize_device(device: &Mapping) -> Result<DeviceReservation> {
    let field = |key: &str| -> Result<JsonValue> {
        device
            .get(key)
            .map(to_json)
            .transpose()
            .map(Option::unwrap_or_default)
    };
    let capabilities = match device.get("capabilities") {
        Some(Value::Null) | None => JsonValue::Array(vec![]),
        Some(capabilities) => to_json(capabilities)?,
    };
    let options = match device.get("options").filter(|options| options.is_truthy()) {
        Some(options) => Some(to_json(options)?),
        None => None,
    };
    Ok(DeviceReservation {
        driver: field("driver")?,
        count: field("count")?,
        capabilities,
        options,
    })
}

/// Copies the string keyed entries accepted by `filter`, verbatim.
fn copy_mapping<F>(mapping: &Mapping, filter: F) -> Result<Map<String, JsonValue>>
where
    F: Fn(&str) -> bool,
{
    mapping
        .iter()
        .filter_map(|(key, value)| key.as_str().map(|key| (key, value)))
        .filter(|(key, _)| filter(*key))
        .map(|(key, value)| Ok((key.to_string(), to_json(value)?)))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions_sorted::assert_eq_sorted;
    use serde_json::json;

    fn normalize(yaml: &str) -> Option<Deploy> {
        normalize_deploy(&serde_yaml::from_str(yaml).unwrap()).unwrap()
    }

    fn to_json_string(yaml: &str) -> String {
        serde_json::to_string(&normalize(yaml)).unwrap()
    }

    #[test]
    fn not_set() {
        assert_eq_sorted!(normalize("null"), None);
        assert_eq_sorted!(normalize("{}"), None);
        assert_eq_sorted!(normalize("mode: replicated\nreplicas: 2\n"), None);
        assert_eq_sorted!(normalize("resources: {limits: {}}\n"), None);
        assert_eq_sorted!(normalize("resources: {reservations: {devices: []}}\n"), None);
    }

    #[test]
    fn limits_are_verbatim() {
        assert_eq_sorted!(
            to_json_string("resources:\n  limits:\n    cpus: '0.50'\n    memory: 512M\n    pids: 100\n"),
            r#"{"resources":{"limits":{"cpus":"0.50","memory":"512M","pids":100}}}"#
        );
    }

    #[test]
    fn gpu_reservation() {
        let deploy = normalize(
            r#"
resources:
  reservations:
    memory: 1G
    devices:
      - driver: nvidia
        count: all
        capabilities: [gpu]
"#,
        )
        .unwrap();

        assert_eq_sorted!(
            deploy,
            Deploy {
                resources: Some(Resources {
                    limits: None,
                    reservations: Some(Reservations {
                        values: Map::from_iter([("memory".to_string(), json!("1G"))]),
                        devices: Some(vec![DeviceReservation {
                            driver: json!("nvidia"),
                            count: json!("all"),
                            capabilities: json!(["gpu"]),
                            options: None,
                        }]),
                    }),
                }),
            }
        );
    }

    #[test]
    fn device_defaults() {
        assert_eq_sorted!(
            to_json_string(
                "resources:\n  reservations:\n    devices:\n      - device_ids: ['0']\n        options: {}\n"
            ),
            r#"{"resources":{"reservations":{"devices":[{"driver":null,"count":null,"capabilities":[]}]}}}"#
        );
    }

    #[test]
    fn device_options_kept_when_set() {
        assert_eq_sorted!(
            to_json_string(
                "resources:\n  reservations:\n    devices:\n      - driver: cdi\n        capabilities: [gpu]\n        options:\n          virtualization: 'false'\n"
            ),
            r#"{"resources":{"reservations":{"devices":[{"driver":"cdi","count":null,"capabilities":["gpu"],"options":{"virtualization":"false"}}]}}}"#
        );
    }

    #[test]
    fn empty_devices_dropped() {
        assert_eq_sorted!(
            to_json_string("resources:\n  reservations:\n    cpus: '1'\n    devices: []\n"),
            r#"{"resources":{"reservations":{"cpus":"1"}}}"#
        );
    }
}
