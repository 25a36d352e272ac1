//! # compose
//!
//! The docker-compose input side: an ordered view of the `services` mapping, kept untyped since
//! compose files are hand-written and loosely shaped.

use crate::{Error, Result};
use serde_yaml::{Mapping, Value};
use std::io::Read;

/// A parsed docker-compose document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComposeDocument {
    services: Mapping,
}

impl ComposeDocument {
    /// Parse a compose document from a YAML string.
    ///
    /// # Examples
    ///
    /// ```
    /// use dynamic_compose_lib::ComposeDocument;
    ///
    /// let yaml = "
    /// services:
    ///   whoami:
    ///     image: traefik/whoami
    /// ";
    /// let compose = ComposeDocument::from_yaml_str(yaml).unwrap();
    /// let names: Vec<&str> = compose.services().filter_map(|(name, _)| name.as_str()).collect();
    /// assert_eq!(names, vec!["whoami"]);
    /// ```
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(input)?;
        Self::from_value(value)
    }

    /// Parse a compose document from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let value: Value = serde_yaml::from_reader(reader)?;
        Self::from_value(value)
    }

    /// Build a compose document from an already parsed YAML value.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut root = match value {
            Value::Mapping(root) => root,
            Value::Null => return Ok(Self::default()),
            _ => {
                return Err(Error::Custom(
                    "The compose document must be a mapping".into(),
                ))
            }
        };
        let services = match root.remove("services") {
            Some(Value::Mapping(services)) => services,
            Some(Value::Null) | None => Mapping::new(),
            Some(_) => {
                return Err(Error::Custom(
                    "The compose 'services' entry must be a mapping".into(),
                ))
            }
        };
        Ok(Self { services })
    }

    /// Iterates over the services in document order, with their raw YAML keys.
    pub fn services(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.services.iter()
    }
}

/// The compose authors' notion of a present value: null, `false`, zero and empty containers all
/// mean "not set".
pub trait Truthy {
    fn is_truthy(&self) -> bool;
}

impl Truthy for Value {
    fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    i != 0
                } else if let Some(u) = n.as_u64() {
                    u != 0
                } else {
                    n.as_f64().map(|f| f != 0.0).unwrap_or(true)
                }
            }
            Value::String(s) => !s.is_empty(),
            Value::Sequence(seq) => !seq.is_empty(),
            Value::Mapping(map) => !map.is_empty(),
            Value::Tagged(tagged) => tagged.value.is_truthy(),
        }
    }
}

/// Gets the value of `key` in `spec` only when it is set.
pub(crate) fn get<'a>(spec: &'a Mapping, key: &str) -> Option<&'a Value> {
    spec.get(key).filter(|value| value.is_truthy())
}

/// Formats a scalar the way it was written, `None` for containers and null.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        _ => None,
    }
}

/// Converts a YAML value into its JSON counterpart, keeping the mapping order.
pub(crate) fn to_json(value: &Value) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(Error::from)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions_sorted::assert_eq_sorted;

    fn yaml(input: &str) -> Value {
        serde_yaml::from_str(input).unwrap()
    }

    mod truthy {
        use super::*;

        #[test]
        fn falsy_values() {
            for input in ["null", "~", "false", "0", "0.0", "''", "[]", "{}"] {
                assert!(!yaml(input).is_truthy(), "{input} should be falsy");
            }
        }

        #[test]
        fn truthy_values() {
            for input in ["true", "1", "-1", "0.5", "a", "'0'", "[a]", "{a: b}"] {
                assert!(yaml(input).is_truthy(), "{input} should be truthy");
            }
        }
    }

    mod document {
        use super::*;

        #[test]
        fn keeps_services_order() {
            let compose = ComposeDocument::from_yaml_str(
                "services:\n  web: {}\n  db: {}\n  cache: {}\n",
            )
            .unwrap();

            let names: Vec<&str> = compose
                .services()
                .filter_map(|(name, _)| name.as_str())
                .collect();
            assert_eq_sorted!(names, vec!["web", "db", "cache"]);
        }

        #[test]
        fn from_reader() {
            let compose =
                ComposeDocument::from_reader("services:\n  whoami: null\n".as_bytes()).unwrap();

            let names: Vec<&str> = compose
                .services()
                .filter_map(|(name, _)| name.as_str())
                .collect();
            assert_eq_sorted!(names, vec!["whoami"]);
        }

        #[test]
        fn empty_document() {
            let compose = ComposeDocument::from_yaml_str("").unwrap();
            assert_eq_sorted!(compose.services().count(), 0);
        }

        #[test]
        fn without_services() {
            let compose = ComposeDocument::from_yaml_str("version: '3.9'\n").unwrap();
            assert_eq_sorted!(compose.services().count(), 0);
        }

        #[test]
        fn services_not_a_mapping() {
            let error = ComposeDocument::from_yaml_str("services: [web]\n").unwrap_err();
            assert_eq_sorted!(
                error.to_string(),
                "The compose 'services' entry must be a mapping"
            );
        }

        #[test]
        fn document_not_a_mapping() {
            assert!(ComposeDocument::from_yaml_str("- web\n").is_err());
        }

        #[test]
        fn malformed_yaml() {
            assert!(matches!(
                ComposeDocument::from_yaml_str("services:\n  web: [\n"),
                Err(Error::Deserialize(_))
            ));
        }
    }

    #[test]
    fn scalars_to_string() {
        assert_eq_sorted!(scalar_to_string(&yaml("80")), Some("80".to_string()));
        assert_eq_sorted!(scalar_to_string(&yaml("true")), Some("true".to_string()));
        assert_eq_sorted!(scalar_to_string(&yaml("web")), Some("web".to_string()));
        assert_eq_sorted!(scalar_to_string(&yaml("[80]")), None);
        assert_eq_sorted!(scalar_to_string(&yaml("null")), None);
    }

    #[test]
    fn mapping_to_json_keeps_order() {
        let json = to_json(&yaml("z: 1\na: two\nm: [true]\n")).unwrap();
        assert_eq_sorted!(
            serde_json::to_string(&json).unwrap(),
            r#"{"z":1,"a":"two","m":[true]}"#
        );
    }
}
