//! Hot reload of the installed extension list.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::RouterConfig;

/// Watches the config file and publishes reloaded configurations whose
/// extension list changed.
pub struct ConfigWatcher {
    path: PathBuf,
    current: Mutex<Option<RouterConfig>>,
    update_tx: mpsc::UnboundedSender<RouterConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end for reloaded configurations.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<RouterConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            current: Mutex::new(load_config(path).ok()),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. The returned handle must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.path.clone();

        let mut handle = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if should_reload(&event.kind) => self.reload(),
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        handle.watch(&path, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?path, "Watching config for extension changes");
        Ok(handle)
    }

    fn reload(&self) {
        let config = match load_config(&self.path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(path = ?self.path, error = %e, "Config reload failed, keeping current extensions");
                return;
            }
        };

        let Ok(mut current) = self.current.lock() else {
            return;
        };
        if !extensions_changed(current.as_ref(), &config) {
            tracing::debug!(path = ?self.path, "Config changed but extension list did not");
            return;
        }

        tracing::info!(path = ?self.path, extensions = config.extensions.len(), "Extension list reloaded");
        *current = Some(config.clone());
        let _ = self.update_tx.send(config);
    }
}

/// File events that can change the contents on disk.
fn should_reload(kind: &EventKind) -> bool {
    kind.is_modify() || kind.is_create()
}

fn extensions_changed(current: Option<&RouterConfig>, next: &RouterConfig) -> bool {
    current.map_or(true, |current| current.extensions != next.extensions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtensionConfig;
    use notify::event::{AccessKind, CreateKind, ModifyKind};

    #[test]
    fn test_reload_filter() {
        assert!(should_reload(&EventKind::Modify(ModifyKind::Any)));
        assert!(should_reload(&EventKind::Create(CreateKind::File)));
        assert!(!should_reload(&EventKind::Access(AccessKind::Any)));
    }

    #[test]
    fn test_only_extension_changes_count() {
        let before = RouterConfig::default();
        let mut logging_only = before.clone();
        logging_only.observability.log_level = "debug".into();
        assert!(!extensions_changed(Some(&before), &logging_only));

        let mut installed = before.clone();
        installed.extensions.push(ExtensionConfig {
            publisher: None,
            name: "widget".into(),
            version: None,
            enabled: true,
        });
        assert!(extensions_changed(Some(&before), &installed));
        assert!(extensions_changed(None, &before));
    }
}
