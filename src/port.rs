//! # port
//!
//! Parsing of the compose short port syntax (`[[interface:]host:]container[/protocol]`) and the
//! grouping of the parsed lines into the dynamic compose port fields.

use crate::{Error, PortMapping, PortValue};
use regex::Regex;
use std::str::FromStr;

/// The port of the application, chosen by the user at install time
pub const APP_PORT_PLACEHOLDER: &str = "${APP_PORT}";

const PORT_REGEX: &str = r"(?s)^(?:(?:(?<interface>.*):)?(?<host>[^:]*):)?(?<container>[^:/]*)(?:/(?<protocol>[^:]*))?$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
    Other(String),
}

impl From<&str> for Protocol {
    fn from(value: &str) -> Self {
        match value {
            "tcp" => Protocol::Tcp,
            "udp" => Protocol::Udp,
            other => Protocol::Other(other.into()),
        }
    }
}

/// One port line of a compose service
#[derive(Debug, Clone, PartialEq)]
pub struct PortSpec {
    pub interface: Option<String>,
    pub host_port: Option<PortValue>,
    pub container_port: PortValue,
    pub protocol: Option<Protocol>,
    /// The line references the application port placeholder
    pub internal: bool,
}

impl FromStr for PortSpec {
    type Err = Error;

    /// Parses a port line. Every input matches the grammar, so only a regex build failure errors.
    ///
    /// # Examples
    ///
    /// ```
    /// use dynamic_compose_lib::{PortSpec, PortValue, Protocol};
    ///
    /// let spec: PortSpec = "127.0.0.1:8080:80/udp".parse().unwrap();
    /// assert_eq!(spec.interface, Some("127.0.0.1".to_string()));
    /// assert_eq!(spec.host_port, Some(PortValue::Number(8080)));
    /// assert_eq!(spec.container_port, PortValue::Number(80));
    /// assert_eq!(spec.protocol, Some(Protocol::Udp));
    /// assert!(!spec.internal);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let regex = Regex::new(PORT_REGEX)?;
        let Some(captures) = regex.captures(s) else {
            return Err(Error::Custom(format!("Not matching port pattern: {s}")));
        };
        Ok(Self {
            interface: captures
                .name("interface")
                .map(|m| m.as_str())
                // ":8080:80" binds like "8080:80" and merges with it
                .filter(|interface| !interface.is_empty())
                .map(str::to_string),
            host_port: captures.name("host").map(|m| m.as_str().into()),
            container_port: captures
                .name("container")
                .map(|m| m.as_str())
                .unwrap_or_default()
                .into(),
            protocol: captures.name("protocol").map(|m| m.as_str().into()),
            internal: s.contains(APP_PORT_PLACEHOLDER),
        })
    }
}

/// Groups the port lines of one service.
///
/// The first placeholder line gives the internal port, later ones are dropped. Other lines
/// differing only by protocol are merged into one mapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PortCollector {
    internal_port: Option<PortValue>,
    mappings: Vec<PortMapping>,
}

impl PortCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, spec: PortSpec) {
        if spec.internal {
            if self.internal_port.is_none() {
                self.internal_port = Some(spec.container_port);
            }
            return;
        }

        let position = self.mappings.iter().position(|mapping| {
            mapping.host_port == spec.host_port
                && mapping.container_port == spec.container_port
                && mapping.interface == spec.interface
        });
        let mapping = match position {
            Some(position) => &mut self.mappings[position],
            None => {
                self.mappings.push(PortMapping {
                    host_port: spec.host_port,
                    container_port: spec.container_port,
                    interface: spec.interface,
                    tcp: None,
                    udp: None,
                });
                let last = self.mappings.len() - 1;
                &mut self.mappings[last]
            }
        };

        match spec.protocol {
            Some(Protocol::Tcp) => mapping.tcp = Some(true),
            Some(Protocol::Udp) => mapping.udp = Some(true),
            _ => {}
        }
    }

    /// Returns the internal port and the additional port mappings in first-seen order
    pub fn finish(self) -> (Option<PortValue>, Vec<PortMapping>) {
        (self.internal_port, self.mappings)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions_sorted::assert_eq_sorted;

    fn parse(input: &str) -> PortSpec {
        input.parse().unwrap()
    }

    fn collect(lines: &[&str]) -> (Option<PortValue>, Vec<PortMapping>) {
        let mut collector = PortCollector::new();
        for line in lines {
            collector.push(parse(line));
        }
        collector.finish()
    }

    mod port_spec {
        use super::*;

        #[test]
        fn host_and_container() {
            assert_eq_sorted!(
                parse("8080:80"),
                PortSpec {
                    interface: None,
                    host_port: Some(PortValue::Number(8080)),
                    container_port: PortValue::Number(80),
                    protocol: None,
                    internal: false,
                }
            );
        }

        #[test]
        fn with_interface_and_protocol() {
            assert_eq_sorted!(
                parse("127.0.0.1:53:53/udp"),
                PortSpec {
                    interface: Some("127.0.0.1".into()),
                    host_port: Some(PortValue::Number(53)),
                    container_port: PortValue::Number(53),
                    protocol: Some(Protocol::Udp),
                    internal: false,
                }
            );
        }

        #[test]
        fn ipv6_interface() {
            let spec = parse("::1:8080:80");
            assert_eq_sorted!(spec.interface, Some("::1".into()));
            assert_eq_sorted!(spec.host_port, Some(PortValue::Number(8080)));
            assert_eq_sorted!(spec.container_port, PortValue::Number(80));
        }

        #[test]
        fn placeholder() {
            let spec = parse("${APP_PORT}:3000");
            assert!(spec.internal);
            assert_eq_sorted!(
                spec.host_port,
                Some(PortValue::Literal("${APP_PORT}".into()))
            );
            assert_eq_sorted!(spec.container_port, PortValue::Number(3000));
        }

        #[test]
        fn variable_ports_stay_literal() {
            let spec = parse("${DNS_PORT}:${DNS_PORT}/tcp");
            assert_eq_sorted!(
                spec.host_port,
                Some(PortValue::Literal("${DNS_PORT}".into()))
            );
            assert_eq_sorted!(
                spec.container_port,
                PortValue::Literal("${DNS_PORT}".into())
            );
            assert_eq_sorted!(spec.protocol, Some(Protocol::Tcp));
        }

        #[test]
        fn bare_container_port() {
            assert_eq_sorted!(
                parse("3000"),
                PortSpec {
                    interface: None,
                    host_port: None,
                    container_port: PortValue::Number(3000),
                    protocol: None,
                    internal: false,
                }
            );
        }

        #[test]
        fn empty_line() {
            let spec = parse("");
            assert_eq_sorted!(spec.host_port, None);
            assert_eq_sorted!(spec.container_port, PortValue::Literal("".into()));
        }

        #[test]
        fn unknown_protocol() {
            assert_eq_sorted!(
                parse("5000:5000/sctp").protocol,
                Some(Protocol::Other("sctp".into()))
            );
        }

        #[test]
        fn empty_interface_is_none() {
            assert_eq_sorted!(parse(":8080:80").interface, None);
        }
    }

    mod collector {
        use super::*;

        #[test]
        fn numeric_mapping_has_no_flags() {
            let (internal, mappings) = collect(&["8080:80"]);
            assert_eq_sorted!(internal, None);
            assert_eq_sorted!(
                serde_json::to_string(&mappings).unwrap(),
                r#"[{"hostPort":8080,"containerPort":80}]"#
            );
        }

        #[test]
        fn merges_tcp_and_udp() {
            let (_, mappings) = collect(&["8080:80/tcp", "8080:80/udp"]);
            assert_eq_sorted!(
                mappings,
                vec![PortMapping {
                    host_port: Some(PortValue::Number(8080)),
                    container_port: PortValue::Number(80),
                    interface: None,
                    tcp: Some(true),
                    udp: Some(true),
                }]
            );
        }

        #[test]
        fn does_not_merge_different_interfaces() {
            let (_, mappings) = collect(&["127.0.0.1:53:53/tcp", "53:53/udp"]);
            assert_eq_sorted!(mappings.len(), 2);
            assert_eq_sorted!(mappings[0].interface, Some("127.0.0.1".into()));
            assert_eq_sorted!(mappings[1].interface, None);
        }

        #[test]
        fn first_placeholder_wins() {
            let (internal, mappings) =
                collect(&["${APP_PORT}:3000", "9000:9000", "${APP_PORT}:4000/udp"]);
            assert_eq_sorted!(internal, Some(PortValue::Number(3000)));
            assert_eq_sorted!(
                mappings,
                vec![PortMapping {
                    host_port: Some(PortValue::Number(9000)),
                    container_port: PortValue::Number(9000),
                    interface: None,
                    tcp: None,
                    udp: None,
                }]
            );
        }

        #[test]
        fn keeps_first_seen_order() {
            let (_, mappings) = collect(&["3:3/udp", "1:1", "3:3/tcp", "2:2"]);
            let hosts: Vec<Option<PortValue>> =
                mappings.into_iter().map(|mapping| mapping.host_port).collect();
            assert_eq_sorted!(
                hosts,
                vec![
                    Some(PortValue::Number(3)),
                    Some(PortValue::Number(1)),
                    Some(PortValue::Number(2)),
                ]
            );
        }
    }
}
