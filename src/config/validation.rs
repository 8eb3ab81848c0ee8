//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate protocol names and coordinator limits
//! - Detect duplicate extension entries
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::extensions::address::ExtensionId;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("protocol.{field} must not be empty")]
    EmptyProtocolField { field: &'static str },

    #[error("protocol.scheme `{0}` is not a valid URL scheme")]
    InvalidScheme(String),

    #[error("protocol.internal_host and protocol.extension_host must differ (both `{0}`)")]
    SameHosts(String),

    #[error("coordinator.windows must be at least 1")]
    NoWindows,

    #[error("coordinator.max_pending must be at least 1 when queueing is enabled")]
    NoPendingCapacity,

    #[error("extension entry #{0} has an empty name")]
    EmptyExtensionName(usize),

    #[error("extension `{0}` is listed more than once")]
    DuplicateExtension(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let protocol = &config.protocol;

    for (field, value) in [
        ("scheme", &protocol.scheme),
        ("internal_host", &protocol.internal_host),
        ("extension_host", &protocol.extension_host),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::EmptyProtocolField { field });
        }
    }

    if !protocol.scheme.is_empty() && !is_valid_scheme(&protocol.scheme) {
        errors.push(ValidationError::InvalidScheme(protocol.scheme.clone()));
    }

    if !protocol.internal_host.is_empty()
        && protocol.internal_host.eq_ignore_ascii_case(&protocol.extension_host)
    {
        errors.push(ValidationError::SameHosts(protocol.internal_host.clone()));
    }

    if config.coordinator.windows == 0 {
        errors.push(ValidationError::NoWindows);
    }
    if config.coordinator.queue_until_renderer_ready && config.coordinator.max_pending == 0 {
        errors.push(ValidationError::NoPendingCapacity);
    }

    let mut seen = HashSet::new();
    for (index, extension) in config.extensions.iter().enumerate() {
        if extension.name.trim().is_empty() {
            errors.push(ValidationError::EmptyExtensionName(index));
            continue;
        }
        let id = ExtensionId::new(extension.publisher.as_deref(), &extension.name);
        if !seen.insert(id.clone()) {
            errors.push(ValidationError::DuplicateExtension(id.to_string()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// RFC 3986: ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ExtensionConfig;

    #[test]
    fn test_default_is_valid() {
        assert!(validate_config(&RouterConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RouterConfig::default();
        config.protocol.scheme = "1nvalid".into();
        config.protocol.extension_host = "APP".into();
        config.coordinator.windows = 0;
        config.extensions = vec![
            ExtensionConfig {
                publisher: None,
                name: "widget".into(),
                version: None,
                enabled: true,
            },
            ExtensionConfig {
                publisher: None,
                name: "widget".into(),
                version: Some("2.0.0".into()),
                enabled: false,
            },
            ExtensionConfig {
                publisher: Some("acme".into()),
                name: " ".into(),
                version: None,
                enabled: true,
            },
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidScheme("1nvalid".into()),
                ValidationError::SameHosts("app".into()),
                ValidationError::NoWindows,
                ValidationError::DuplicateExtension("widget".into()),
                ValidationError::EmptyExtensionName(2),
            ]
        );
    }

    #[test]
    fn test_empty_fields() {
        let mut config = RouterConfig::default();
        config.protocol.scheme.clear();
        config.coordinator.max_pending = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::EmptyProtocolField { field: "scheme" }));
        assert!(errors.contains(&ValidationError::NoPendingCapacity));
    }
}
