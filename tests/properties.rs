//! Property tests for setters and document encoding.

use proptest::prelude::*;
use std::sync::Arc;

use strongbox_config::manager::{ConfigurationManager, MemoryStore};
use strongbox_config::{Document, ProxyConfiguration, ProxyType};

fn manager() -> ConfigurationManager {
    ConfigurationManager::open(Arc::new(MemoryStore::new())).unwrap()
}

fn proxy_type() -> impl Strategy<Value = ProxyType> {
    prop_oneof![
        Just(ProxyType::Http),
        Just(ProxyType::Socks),
        Just(ProxyType::Direct),
    ]
}

prop_compose! {
    fn proxy_configuration()(
        host in "[a-z][a-z0-9.-]{0,20}",
        port in any::<u16>(),
        username in proptest::option::of("[a-zA-Z0-9_]{1,12}"),
        password in proptest::option::of(".{0,16}"),
        proxy_type in proxy_type(),
        non_proxy_hosts in proptest::collection::vec("[a-z0-9.-]{1,20}", 0..5),
    ) -> ProxyConfiguration {
        ProxyConfiguration { host, port, username, password, proxy_type, non_proxy_hosts }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_port_set_then_get(port in 0i64..=65535) {
        let manager = manager();
        manager.set_port(port).unwrap();
        prop_assert_eq!(i64::from(manager.port()), port);
    }

    #[test]
    fn prop_port_out_of_range_rejected(port in prop_oneof![i64::MIN..0i64, 65536i64..i64::MAX]) {
        let manager = manager();
        let before = manager.port();
        prop_assert!(manager.set_port(port).is_err());
        prop_assert_eq!(manager.port(), before);
    }

    #[test]
    fn prop_base_url_set_then_get(path in "[a-z0-9/]{0,24}", port in 1u16..) {
        let manager = manager();
        let url = format!("http://localhost:{}/{}", port, path);
        manager.set_base_url(&url).unwrap();
        prop_assert_eq!(manager.base_url(), url);
    }

    #[test]
    fn prop_proxy_document_round_trip(pc in proxy_configuration()) {
        let decoded = ProxyConfiguration::decode(&pc.encode().unwrap()).unwrap();
        prop_assert_eq!(decoded, pc);
    }
}
