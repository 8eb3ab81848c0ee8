//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RouterConfig {
    /// URL scheme and host names.
    pub protocol: ProtocolConfig,

    /// Main/renderer coordination settings.
    pub coordinator: CoordinatorConfig,

    /// Installed extensions known at startup.
    pub extensions: Vec<ExtensionConfig>,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Which URLs the router accepts.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Custom scheme (e.g., "app" for `app://...`).
    pub scheme: String,

    /// Host that addresses application routes.
    pub internal_host: String,

    /// Host that addresses extension routes.
    pub extension_host: String,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            scheme: "app".to_string(),
            internal_host: "app".to_string(),
            extension_host: "extension".to_string(),
        }
    }
}

/// Cross-process coordination.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Number of renderer windows opened at startup.
    pub windows: usize,

    /// Hold routed links until a renderer reports it is ready.
    pub queue_until_renderer_ready: bool,

    /// Maximum links held while waiting (oldest dropped first).
    pub max_pending: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            windows: 1,
            queue_until_renderer_ready: true,
            max_pending: 32,
        }
    }
}

/// One installed extension.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ExtensionConfig {
    /// Publisher scope, if any.
    #[serde(default)]
    pub publisher: Option<String>,

    /// Extension name.
    pub name: String,

    /// Installed version.
    #[serde(default)]
    pub version: Option<String>,

    /// Disabled extensions are installed but unknown to the router.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
