//! Deep Link Protocol Router
//!
//! Routes `app://` URLs opened by the OS to handlers in the main process and
//! in every renderer window, then tells the user what happened.
//!
//! # Architecture Overview
//!
//! ```text
//!     URL (argv / stdin)
//!          │
//!          ▼
//!   ┌──────────────┐   routed | invalid (JSON)   ┌──────────────────┐
//!   │ main process │ ──────────────────────────▶ │ renderer window  │ × N
//!   │   router     │                             │   router         │
//!   └──────┬───────┘                             └────────┬─────────┘
//!          │                                              │ fold(main, renderer)
//!          ▼                                              ▼
//!   extension catalog                              presenter (stdout)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use deeplink_router::config::watcher::ConfigWatcher;
use deeplink_router::config::{load_config, RouterConfig};
use deeplink_router::coordinator::RendererCoordinator;
use deeplink_router::extensions::ExtensionCatalog;
use deeplink_router::features::{self, CatalogInstaller, ConsoleSink};
use deeplink_router::lifecycle::signals::spawn_signal_handler;
use deeplink_router::lifecycle::Application;
use deeplink_router::observability::init_logging;
use deeplink_router::presenter::{NotificationPresenter, OutcomePresenter};

#[derive(Parser)]
#[command(name = "deeplink-router")]
#[command(about = "Route deep links through main and renderer processes", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of renderer windows (overrides the config).
    #[arg(short, long, value_parser = parse_window_count)]
    windows: Option<usize>,

    /// Reload the extension list when the config file changes.
    #[arg(long)]
    watch: bool,

    /// Links to open. Read one per line from stdin when empty.
    urls: Vec<String>,
}

/// Same rule as config validation: at least one window.
fn parse_window_count(raw: &str) -> Result<usize, String> {
    let windows: usize = raw.parse().map_err(|e| format!("`{raw}` is not a window count: {e}"))?;
    if windows == 0 {
        return Err("at least one renderer window is required".to_string());
    }
    Ok(windows)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    if let Some(windows) = cli.windows {
        config.coordinator.windows = windows;
    }

    init_logging(&config.observability)?;

    tracing::info!(
        scheme = %config.protocol.scheme,
        windows = config.coordinator.windows,
        extensions = config.extensions.len(),
        "deeplink-router v0.1.0 starting"
    );

    let catalog = ExtensionCatalog::from_config(&config.extensions);

    // Watcher must outlive the run.
    let _watcher = match (&cli.config, cli.watch) {
        (Some(path), true) => {
            let (watcher, mut updates) = ConfigWatcher::new(path);
            let handle = watcher.run()?;
            let catalog = catalog.clone();
            tokio::spawn(async move {
                while let Some(updated) = updates.recv().await {
                    tracing::info!(extensions = updated.extensions.len(), "Applying reloaded extension list");
                    catalog.replace_all(&updated.extensions);
                }
            });
            Some(handle)
        }
        (None, true) => {
            tracing::warn!("--watch needs --config, ignoring");
            None
        }
        _ => None,
    };

    let presenter: Arc<dyn OutcomePresenter> = Arc::new(
        NotificationPresenter::new(Arc::new(ConsoleSink))
            .with_installer(Arc::new(CatalogInstaller::new(catalog.clone()))),
    );

    let main_router = features::main_router(&config.protocol, catalog.clone())?;
    let app = Application::start(&config.coordinator, main_router, |id| {
        let router = features::renderer_router(&config.protocol, catalog.clone())?;
        Ok(RendererCoordinator::new(id, router, presenter.clone()))
    })?;

    spawn_signal_handler(app.shutdown().clone());

    if cli.urls.is_empty() {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut shutdown = app.shutdown().subscribe();
        loop {
            tokio::select! {
                line = lines.next_line() => match line? {
                    Some(line) => {
                        let url = line.trim();
                        if !url.is_empty() && !app.open_url(url) {
                            break;
                        }
                    }
                    None => break,
                },
                _ = shutdown.recv() => break,
            }
        }
    } else {
        for url in &cli.urls {
            app.open_url(url.as_str());
        }
    }

    if app.shutdown().is_triggered() {
        app.abort().await;
    } else {
        app.close().await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_override_must_be_positive() {
        assert!(Cli::try_parse_from(["deeplink-router", "--windows", "0"]).is_err());
        assert!(Cli::try_parse_from(["deeplink-router", "--windows", "many"]).is_err());

        let cli = Cli::try_parse_from(["deeplink-router", "-w", "2", "app://app/landing"]).unwrap();
        assert_eq!(cli.windows, Some(2));
        assert_eq!(cli.urls, vec!["app://app/landing".to_string()]);
    }
}
