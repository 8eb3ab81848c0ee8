//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → protocol settings cloned into each process' router
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → new extension list replaces the catalog contents
//! ```
//!
//! # Design Decisions
//! - Protocol and coordinator settings apply at startup only
//! - Only the extension list is hot-reloaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::CoordinatorConfig;
pub use schema::ExtensionConfig;
pub use schema::LogFormat;
pub use schema::ObservabilityConfig;
pub use schema::ProtocolConfig;
pub use schema::RouterConfig;
