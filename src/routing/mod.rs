//! Routing rule evaluation.
//!
//! # Data Flow
//! ```text
//! Request for artifact path via group repository
//!     → router.rs (rule set lookup by group repository)
//!     → matcher.rs (candidate membership + anchored pattern)
//!     → Return: Accepted(rule) | Denied(rule) | Unmatched
//!
//! Compilation:
//!     Configuration snapshot
//!     → compile every pattern
//!     → Freeze as immutable RoutingMatcher
//! ```
//!
//! # Design Decisions
//! - Compiled from a snapshot, never observes later mutations
//! - Deterministic: same input always yields the same decision
//! - What to do on Unmatched is left to the caller

pub mod matcher;
pub mod router;

pub use matcher::{Candidate, CompiledRule};
pub use router::{RoutingDecision, RoutingMatcher};
