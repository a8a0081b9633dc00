//! Root-wrapped JSON documents exchanged with adapters.
//!
//! Every entity has a root tag (`{"rule-set": {...}}`). Encoding always
//! wraps; decoding accepts the wrapped and the bare form.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ConfigurationError, StoreError};
use crate::model::{Configuration, ProxyConfiguration, Repository, RoutingRule, RuleSet, Storage};

pub trait Document: Serialize + DeserializeOwned {
    const ROOT: &'static str;

    fn encode(&self) -> Result<String, StoreError> {
        let mut root = serde_json::Map::new();
        root.insert(Self::ROOT.to_string(), serde_json::to_value(self)?);
        Ok(serde_json::to_string_pretty(&Value::Object(root))?)
    }

    fn decode(input: &str) -> Result<Self, ConfigurationError> {
        let invalid = |e: serde_json::Error| {
            ConfigurationError::invalid(Self::ROOT, format!("malformed document: {}", e))
        };

        let value: Value = serde_json::from_str(input).map_err(invalid)?;
        let inner = match value {
            Value::Object(mut map) if map.len() == 1 && map.contains_key(Self::ROOT) => {
                map.remove(Self::ROOT).unwrap_or(Value::Null)
            }
            other => other,
        };
        serde_json::from_value(inner).map_err(invalid)
    }
}

impl Document for ProxyConfiguration {
    const ROOT: &'static str = "proxy-configuration";
}

impl Document for Repository {
    const ROOT: &'static str = "repository";
}

impl Document for Storage {
    const ROOT: &'static str = "storage";
}

impl Document for RoutingRule {
    const ROOT: &'static str = "rule";
}

impl Document for RuleSet {
    const ROOT: &'static str = "rule-set";
}

impl Document for Configuration {
    const ROOT: &'static str = "configuration";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProxyType;

    const ADD_ACCEPTED_RULE_SET_JSON: &str = r#"{
  "rule-set": {
    "group-repository": "group-releases-2",
    "rule": [
      {
        "pattern": ".*some.test",
        "repository": [
          "releases-with-trash",
          "releases-with-redeployment"
        ]
      }
    ]
  }
}"#;

    #[test]
    fn test_decode_wrapped_rule_set() {
        let set = RuleSet::decode(ADD_ACCEPTED_RULE_SET_JSON).unwrap();
        assert_eq!(set.group_repository, "group-releases-2");
        assert_eq!(set.rules.len(), 1);
        assert!(set.rules[0].repositories.contains("releases-with-trash"));
    }

    #[test]
    fn test_decode_bare_rule() {
        let rule = RoutingRule::decode(r#"{"pattern": ".*some.test", "repository": ["releases22", "releases32"]}"#)
            .unwrap();
        assert_eq!(rule.repositories.len(), 2);
    }

    #[test]
    fn test_encode_wraps_in_root() {
        let pc = ProxyConfiguration::new("localhost", 8080)
            .with_credentials("user1", "pass2")
            .with_non_proxy_hosts(["localhost", "some-hosts.com"]);
        let value: Value = serde_json::from_str(&pc.encode().unwrap()).unwrap();

        assert_eq!(value["proxy-configuration"]["host"], "localhost");
        assert_eq!(value["proxy-configuration"]["non-proxy-hosts"][1], "some-hosts.com");

        let decoded = ProxyConfiguration::decode(&pc.encode().unwrap()).unwrap();
        assert_eq!(decoded, pc);
        assert_eq!(decoded.proxy_type, ProxyType::Http);
    }

    #[test]
    fn test_malformed_document_is_validation_error() {
        let err = Storage::decode("{\"storage\": 42}").unwrap_err();
        assert!(matches!(err, ConfigurationError::Validation(ref issues) if issues[0].field == "storage"));

        assert!(Storage::decode("not json").is_err());
    }

    #[test]
    fn test_wrong_root_is_rejected() {
        let err = Configuration::decode(r#"{"storage": {"id": "storage9"}}"#).unwrap_err();
        assert!(matches!(err, ConfigurationError::Validation(ref issues) if issues[0].field == "configuration"));

        assert!(Configuration::decode(r#"{"configuration": {"prot": 18080}}"#).is_err());
        assert!(RuleSet::decode(r#"{"group-repository": "g", "rules": []}"#).is_err());
        assert!(Repository::decode(r#"{"id": "releases", "trash": true}"#).is_err());
    }
}
