//! Strongbox configuration management core.
//!
//! A persisted, concurrency-safe configuration model for an artifact
//! repository manager: server port and base URL, outbound proxy settings,
//! storages with their repositories, and accepted/denied routing rule sets.
//!
//! ```text
//! adapter (CLI, HTTP, ...)
//!     → ConfigurationManager ── validate ── ConfigurationStore (durable)
//!         → Configuration (published snapshot)
//!             → RoutingMatcher (request-time rule evaluation)
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod manager;
pub mod model;
pub mod observability;
pub mod routing;

pub use codec::Document;
pub use error::{ConfigurationError, StoreError, ValidationError};
pub use manager::ConfigurationManager;
pub use model::{
    Configuration, ProxyConfiguration, ProxyType, Repository, RoutingRule, RuleKind, RuleSet,
    Storage,
};
