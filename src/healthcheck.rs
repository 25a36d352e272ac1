use crate::{
    compose::{scalar_to_string, to_json, Truthy},
    HealthCheck, Result,
};
use serde_yaml::Value;

const CMD_PREFIX: &str = "CMD ";
const CMD_SHELL_PREFIX: &str = "CMD-SHELL ";

/// Normalizes a compose healthcheck block, `None` when the block is not set.
pub fn normalize_healthcheck(healthcheck: &Value) -> Result<Option<HealthCheck>> {
    if !healthcheck.is_truthy() {
        return Ok(None);
    }
    let Some(block) = healthcheck.as_mapping() else {
        return Ok(Some(HealthCheck::default()));
    };

    let copy = |key: &str| block.get(key).map(to_json).transpose();

    Ok(Some(HealthCheck {
        interval: copy("interval")?,
        timeout: copy("timeout")?,
        retries: copy("retries")?,
        start_period: copy("start_period")?,
        test: block.get("test").and_then(normalize_test),
    }))
}

/// Reduces a healthcheck test to the shell command, without the `CMD` or `CMD-SHELL` marker.
fn normalize_test(test: &Value) -> Option<String> {
    match test {
        Value::Sequence(tokens) if !tokens.is_empty() => {
            let tokens = tokens
                .iter()
                .map(scalar_to_string)
                .collect::<Option<Vec<String>>>()?;
            let skip = tokens
                .first()
                .filter(|first| {
                    first.eq_ignore_ascii_case("CMD") || first.eq_ignore_ascii_case("CMD-SHELL")
                })
                .is_some() as usize;
            Some(tokens[skip..].join(" "))
        }
        Value::String(command) => Some(
            strip_prefix_ignore_case(command, CMD_PREFIX)
                .or_else(|| strip_prefix_ignore_case(command, CMD_SHELL_PREFIX))
                .unwrap_or(command.as_str())
                .trim()
                .to_string(),
        ),
        Value::Tagged(tagged) => normalize_test(&tagged.value),
        _ => None,
    }
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    value
        .get(..prefix.len())
        .filter(|start| start.eq_ignore_ascii_case(prefix))
        .map(|_| &value[prefix.len()..])
}
