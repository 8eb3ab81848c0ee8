//! Per-process deep link router.
//!
//! # Responsibilities
//! - Parse raw links against the configured protocol
//! - Send internal links to the internal route table
//! - Check extension-scoped links against the extension catalog before lookup
//! - Invoke the matched handler and report a [`RouteAttempt`]
//!
//! # Design Decisions
//! - An unknown extension short-circuits to `MissingExtension`; its routes cannot exist
//! - `app://extension/install/<address>` is never dispatched; it reports whether the
//!   named extension is installed
//! - A failing or panicking handler still counts as `Matched`: dispatch worked,
//!   and a broken handler must not surface as "unknown action"
//! - No memoization: routing the same link twice runs the handler twice
//! - One long-lived instance per process; the only state is the registry

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::config::ProtocolConfig;
use crate::extensions::address::{address_candidates, install_address, ExtensionId};
use crate::extensions::catalog::ExtensionResolver;
use crate::observability::metrics;
use crate::routing::attempt::RouteAttempt;
use crate::routing::link::{DeepLink, LinkTarget, RoutingError};
use crate::routing::matcher::TemplateError;
use crate::routing::registry::{HandlerResult, RouteMatch, RouteRegistry, RouteTable};

/// Which side of the application a router lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessKind {
    Main,
    Renderer,
}

impl ProcessKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessKind::Main => "main",
            ProcessKind::Renderer => "renderer",
        }
    }
}

impl fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deep link router for one process.
pub struct ProtocolRouter {
    process: ProcessKind,
    protocol: ProtocolConfig,
    registry: RouteRegistry,
    resolver: Arc<dyn ExtensionResolver>,
}

impl ProtocolRouter {
    /// Create a router with an empty registry.
    pub fn new(process: ProcessKind, protocol: ProtocolConfig, resolver: Arc<dyn ExtensionResolver>) -> Self {
        Self {
            process,
            protocol,
            registry: RouteRegistry::new(),
            resolver,
        }
    }

    pub fn process(&self) -> ProcessKind {
        self.process
    }

    pub fn protocol(&self) -> &ProtocolConfig {
        &self.protocol
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    /// Register an internal route. Order matters: the first template that
    /// matches wins, so register specific templates before general ones.
    pub fn add_handler<F>(&mut self, template: &str, handler: F) -> Result<&mut Self, TemplateError>
    where
        F: Fn(&RouteMatch) -> HandlerResult + Send + Sync + 'static,
    {
        self.registry.register_internal(template, Arc::new(handler))?;
        tracing::debug!(process = %self.process, template = %template, "Deep link handler registered");
        Ok(self)
    }

    /// Register a route owned by an extension. `template` is relative to the
    /// extension's address (`app://extension/<publisher>/<name><template>`).
    pub fn add_extension_handler<F>(
        &mut self,
        extension: ExtensionId,
        template: &str,
        handler: F,
    ) -> Result<&mut Self, TemplateError>
    where
        F: Fn(&RouteMatch) -> HandlerResult + Send + Sync + 'static,
    {
        tracing::debug!(
            process = %self.process,
            extension = %extension,
            template = %template,
            "Extension deep link handler registered"
        );
        self.registry.register_extension(extension, template, Arc::new(handler))?;
        Ok(self)
    }

    pub fn remove_handler(&mut self, template: &str) -> bool {
        self.registry.remove_internal(template)
    }

    /// Drop all routes of an extension, e.g. when it is unloaded.
    pub fn remove_extension_handlers(&mut self, extension: &ExtensionId) -> usize {
        self.registry.remove_extension(extension)
    }

    /// Parse a raw link with this router's protocol settings.
    pub fn parse(&self, raw: &str) -> Result<DeepLink, RoutingError> {
        DeepLink::parse(raw, &self.protocol)
    }

    /// Parse and route in one step.
    pub fn route_raw(&self, raw: &str) -> Result<RouteAttempt, RoutingError> {
        let link = self.parse(raw)?;
        Ok(self.route(&link))
    }

    /// Route a parsed link.
    pub fn route(&self, link: &DeepLink) -> RouteAttempt {
        let attempt = match link.target() {
            LinkTarget::Internal => self.dispatch(self.registry.internal(), link.pathname(), link, None),
            LinkTarget::Extension => self.route_to_extension(link),
        };

        tracing::debug!(
            process = %self.process,
            url = %link.raw(),
            target = link.target().as_str(),
            attempt = %attempt,
            "Deep link routed"
        );
        metrics::record_route_attempt(self.process, link.target(), attempt);
        attempt
    }

    fn route_to_extension(&self, link: &DeepLink) -> RouteAttempt {
        if let Some(requested) = install_address(link.pathname()) {
            return self.install_by_name(&requested);
        }

        let candidates = address_candidates(link.pathname());
        let known = candidates
            .iter()
            .find(|c| self.resolver.is_known(c.extension.publisher(), c.extension.name()));

        let Some(candidate) = known else {
            tracing::info!(
                process = %self.process,
                url = %link.raw(),
                "No installed extension matches deep link"
            );
            return RouteAttempt::MissingExtension;
        };

        match self.registry.extension(&candidate.extension) {
            Some(table) => self.dispatch(table, &candidate.remainder, link, Some(&candidate.extension)),
            None => {
                tracing::debug!(
                    process = %self.process,
                    extension = %candidate.extension,
                    "Extension has no deep link handlers in this process"
                );
                RouteAttempt::Missing
            }
        }
    }

    /// `app://extension/install/<address>`: nothing to route, only whether the
    /// named extension is present.
    fn install_by_name(&self, requested: &ExtensionId) -> RouteAttempt {
        if self.resolver.is_known(requested.publisher(), requested.name()) {
            tracing::info!(
                process = %self.process,
                extension = %requested,
                "Install link names an extension that is already installed"
            );
            return RouteAttempt::Matched;
        }
        tracing::info!(
            process = %self.process,
            extension = %requested,
            "Install link names a missing extension"
        );
        RouteAttempt::MissingExtension
    }

    fn dispatch(
        &self,
        table: &RouteTable,
        pathname: &str,
        link: &DeepLink,
        extension: Option<&ExtensionId>,
    ) -> RouteAttempt {
        let Some(resolved) = table.resolve(pathname) else {
            return RouteAttempt::Missing;
        };

        let template = resolved.registration.template();
        let handler = resolved.registration.handler();
        let route_match = RouteMatch::new(resolved.path, link.search().clone());

        match catch_unwind(AssertUnwindSafe(|| handler(&route_match))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!(
                    process = %self.process,
                    template = %template,
                    extension = ?extension.map(ToString::to_string),
                    error = %e,
                    "Deep link handler failed"
                );
                metrics::record_handler_failure(self.process);
            }
            Err(_) => {
                tracing::error!(
                    process = %self.process,
                    template = %template,
                    extension = ?extension.map(ToString::to_string),
                    "Deep link handler panicked"
                );
                metrics::record_handler_failure(self.process);
            }
        }

        RouteAttempt::Matched
    }
}

impl fmt::Debug for ProtocolRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolRouter")
            .field("process", &self.process)
            .field("protocol", &self.protocol)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
