//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for the binary
//! - Pick the filter from `RUST_LOG`, falling back to settings
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - The library only emits events; installing a subscriber is the binary's job

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when neither `RUST_LOG` nor settings provide one.
pub const DEFAULT_DIRECTIVE: &str = "strongbox_config=info";

/// Build the filter directive for a configured log level.
pub fn directive_for(log_level: &str) -> String {
    format!("strongbox_config={}", log_level)
}

/// Install the global subscriber. `RUST_LOG` wins over `directive`.
pub fn init(directive: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| directive.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
