//! Configuration data model.
//!
//! # Ownership
//! ```text
//! Configuration
//!     → ProxyConfiguration (global, optional)
//!     → Storage (by id)
//!         → Repository (by id, back-reference is the storage id)
//!             → ProxyConfiguration (optional)
//!     → RoutingRules
//!         → accepted / denied: RuleSet (by group repository)
//!             → RoutingRule (ordered)
//! ```
//!
//! # Design Decisions
//! - Plain owned data, `Clone` gives an independent deep copy
//! - Ordered maps and sets keep serialized documents deterministic
//! - Field-to-tag mapping is declared on each type with serde attributes

pub mod configuration;
pub mod proxy;
pub mod repository;
pub mod routing;
pub mod storage;

pub use configuration::{Configuration, RoutingRules};
pub use proxy::{ProxyConfiguration, ProxyType};
pub use repository::Repository;
pub use routing::{RoutingRule, RuleKind, RuleSet};
pub use storage::Storage;
