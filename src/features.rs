//! Application routes registered at bootstrap.
//!
//! # Responsibilities
//! - Main-process routes (extension install)
//! - Renderer routes (navigation targets)
//! - Console notification sink and catalog-backed installer for the binary
//!
//! # Design Decisions
//! - Handlers only record what they would do; navigation is a log line here
//! - The renderer registers no root route, so unknown paths surface as `Missing`

use std::sync::Arc;

use crate::config::ProtocolConfig;
use crate::extensions::address::{ExtensionId, EXTENSION_ADDRESS_PATTERN};
use crate::extensions::catalog::ExtensionCatalog;
use crate::presenter::{ExtensionInstaller, InstallRequest, Notification, NotificationSink, VERSION_QUERY};
use crate::routing::matcher::TemplateError;
use crate::routing::registry::{HandlerResult, RouteMatch};
use crate::routing::router::{ProcessKind, ProtocolRouter};

/// Install route prefix, completed with the extension address sub-pattern.
pub const INSTALL_ROUTE_PREFIX: &str = "/extensions/install";

pub fn install_route() -> String {
    format!("{}{}", INSTALL_ROUTE_PREFIX, EXTENSION_ADDRESS_PATTERN)
}

/// Router for the main process.
pub fn main_router(protocol: &ProtocolConfig, catalog: ExtensionCatalog) -> Result<ProtocolRouter, TemplateError> {
    let mut router = ProtocolRouter::new(ProcessKind::Main, protocol.clone(), Arc::new(catalog.clone()));

    router.add_handler(&install_route(), move |params| {
        let extension = ExtensionId::from_params(&params.pathname).ok_or("install link names no extension")?;
        let version = params.search.get(VERSION_QUERY).map(str::to_string);
        tracing::info!(extension = %extension, version = ?version, "Installing extension from deep link");
        catalog.install(extension, version);
        Ok(())
    })?;

    Ok(router)
}

/// Router for one renderer window.
pub fn renderer_router(
    protocol: &ProtocolConfig,
    catalog: ExtensionCatalog,
) -> Result<ProtocolRouter, TemplateError> {
    let mut router = ProtocolRouter::new(ProcessKind::Renderer, protocol.clone(), Arc::new(catalog));

    router
        .add_handler("/preferences", |m| navigate("preferences", m))?
        .add_handler("/landing", |m| navigate("landing", m))?
        .add_handler("/landing/view/:view", |m| navigate("landing view", m))?
        .add_handler("/cluster/:clusterId", |m| navigate("cluster", m))?
        .add_handler("/cluster/:clusterId/settings", |m| navigate("cluster settings", m))?
        .add_handler("/entity/:entityId/settings", |m| navigate("entity settings", m))?
        .add_handler("/extensions", |m| navigate("extensions", m))?;

    Ok(router)
}

fn navigate(view: &str, params: &RouteMatch) -> HandlerResult {
    tracing::info!(
        view = view,
        params = ?params.pathname,
        search = ?params.search,
        "Navigating"
    );
    Ok(())
}

/// Prints notifications to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn notify(&self, notification: Notification) {
        println!("{}", notification);
    }
}

/// Installs requested extensions straight into the catalog.
#[derive(Debug, Clone)]
pub struct CatalogInstaller {
    catalog: ExtensionCatalog,
}

impl CatalogInstaller {
    pub fn new(catalog: ExtensionCatalog) -> Self {
        Self { catalog }
    }
}

impl ExtensionInstaller for CatalogInstaller {
    fn install(&self, request: InstallRequest) {
        if self.catalog.get(&request.extension).is_some() {
            tracing::debug!(extension = %request.extension, "Extension already installed");
            return;
        }
        self.catalog.install(request.extension, request.version);
    }
}
