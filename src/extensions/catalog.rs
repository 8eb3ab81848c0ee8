//! Installed extension catalog.
//!
//! # Responsibilities
//! - Answer "is this extension known?" for the router
//! - Track installed extensions, their version and enabled state
//! - Accept wholesale replacement when configuration is reloaded
//!
//! # Design Decisions
//! - Known means installed *and* enabled; a disabled extension has no live routes
//! - Shared between tasks through an internal `Arc<DashMap>`, clones are cheap
//! - Reload upserts first and removes stale entries last, so an extension present
//!   in both the old and new lists never looks missing to a concurrent lookup
//! - Extensions installed at runtime survive a reload of the config list

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;

use crate::config::ExtensionConfig;
use crate::extensions::address::ExtensionId;

/// Lookup used by the router before dispatching extension-scoped links.
pub trait ExtensionResolver: Send + Sync {
    /// Returns true if an extension with this identity is installed and usable.
    fn is_known(&self, publisher: Option<&str>, name: &str) -> bool;
}

impl<F> ExtensionResolver for F
where
    F: Fn(Option<&str>, &str) -> bool + Send + Sync,
{
    fn is_known(&self, publisher: Option<&str>, name: &str) -> bool {
        self(publisher, name)
    }
}

/// Where a catalog entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOrigin {
    /// Listed in the `[[extensions]]` config section.
    Config,
    /// Installed while running (install link or installer).
    Runtime,
}

/// Catalog entry for one installed extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledExtension {
    pub version: Option<String>,
    pub enabled: bool,
    pub origin: InstallOrigin,
}

/// Thread-safe catalog of installed extensions.
#[derive(Debug, Clone, Default)]
pub struct ExtensionCatalog {
    inner: Arc<DashMap<ExtensionId, InstalledExtension>>,
}

impl ExtensionCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from the `[[extensions]]` config section.
    pub fn from_config(configs: &[ExtensionConfig]) -> Self {
        let catalog = Self::new();
        catalog.replace_all(configs);
        catalog
    }

    /// Record an installed (and enabled) extension.
    pub fn install(&self, id: ExtensionId, version: Option<String>) {
        tracing::info!(extension = %id, version = ?version, "Extension installed");
        self.inner.insert(
            id,
            InstalledExtension {
                version,
                enabled: true,
                origin: InstallOrigin::Runtime,
            },
        );
    }

    /// Remove an extension. Returns true if it was present.
    pub fn uninstall(&self, id: &ExtensionId) -> bool {
        let removed = self.inner.remove(id).is_some();
        if removed {
            tracing::info!(extension = %id, "Extension uninstalled");
        }
        removed
    }

    /// Enable or disable an installed extension. Returns false if unknown.
    pub fn set_enabled(&self, id: &ExtensionId, enabled: bool) -> bool {
        match self.inner.get_mut(id) {
            Some(mut entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Replace the config-listed extensions with `configs`.
    ///
    /// Entries are upserted one key at a time before stale config entries are
    /// dropped; runtime installs are kept.
    pub fn replace_all(&self, configs: &[ExtensionConfig]) {
        let mut listed = HashSet::with_capacity(configs.len());
        for config in configs {
            let id = ExtensionId::new(config.publisher.as_deref(), &config.name);
            self.inner.insert(
                id.clone(),
                InstalledExtension {
                    version: config.version.clone(),
                    enabled: config.enabled,
                    origin: InstallOrigin::Config,
                },
            );
            listed.insert(id);
        }

        self.inner
            .retain(|id, entry| entry.origin == InstallOrigin::Runtime || listed.contains(id));
        tracing::debug!(count = self.inner.len(), listed = listed.len(), "Extension catalog loaded");
    }

    pub fn get(&self, id: &ExtensionId) -> Option<InstalledExtension> {
        self.inner.get(id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl ExtensionResolver for ExtensionCatalog {
    fn is_known(&self, publisher: Option<&str>, name: &str) -> bool {
        let id = ExtensionId::new(publisher, name);
        self.inner.get(&id).map(|r| r.enabled).unwrap_or(false)
    }
}
