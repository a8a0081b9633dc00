//! Service settings subsystem.
//!
//! # Data Flow
//! ```text
//! strongbox.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → Settings (validated, immutable)
//!     → used by the binary to build store, probe, logging, watcher
//!
//! On document change:
//!     watcher.rs detects change
//!     → ConfigurationManager::reload
//!     → validated document swapped in atomically
//! ```
//!
//! # Design Decisions
//! - Settings are immutable once loaded
//! - All fields have defaults to allow minimal settings files
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_settings, SettingsError};
pub use schema::Settings;
