//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Manager operations produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (mutation and reload counters)
//!
//! Consumers:
//!     → stderr via tracing-subscriber
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields (ids, kinds, outcomes) on every event
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
