//! Outbound proxy connection settings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of outbound proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyType {
    #[default]
    Http,
    Socks,
    Direct,
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyType::Http => write!(f, "http"),
            ProxyType::Socks => write!(f, "socks"),
            ProxyType::Direct => write!(f, "direct"),
        }
    }
}

/// Proxy settings, owned by the global configuration or by a single repository.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProxyConfiguration {
    pub host: String,

    pub port: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(rename = "type", default)]
    pub proxy_type: ProxyType,

    /// Hosts reached directly, in declaration order.
    #[serde(default)]
    pub non_proxy_hosts: Vec<String>,
}

impl ProxyConfiguration {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_non_proxy_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.non_proxy_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_serializes_lowercase() {
        let pc = ProxyConfiguration::new("localhost", 8080);
        let json = serde_json::to_value(&pc).unwrap();
        assert_eq!(json["type"], "http");
        assert_eq!(json["port"], 8080);
        assert!(json.get("username").is_none());
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let pc: ProxyConfiguration =
            serde_json::from_str(r#"{"host": "proxy.local", "port": 3128}"#).unwrap();
        assert_eq!(pc.proxy_type, ProxyType::Http);
        assert!(pc.non_proxy_hosts.is_empty());
        assert_eq!(pc.password, None);
    }

    #[test]
    fn test_out_of_range_port_rejected() {
        let res: Result<ProxyConfiguration, _> =
            serde_json::from_str(r#"{"host": "proxy.local", "port": 70000}"#);
        assert!(res.is_err());
    }
}
