//! Route registration and lookup.
//!
//! # Responsibilities
//! - Store compiled templates with their handlers
//! - Keep internal routes and per-extension routes apart
//! - Resolve a pathname to the first matching registration
//!
//! # Design Decisions
//! - First match wins, in registration order. Overlapping templates are not
//!   ranked by specificity: a template registered earlier shadows a later one
//!   that also matches, so specific routes must be registered before catch-alls
//! - Re-registering an identical template replaces its handler in place
//! - Templates compile at registration; a bad template is rejected there

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::extensions::address::ExtensionId;
use crate::routing::link::SearchParams;
use crate::routing::matcher::{Matcher, PathMatch, PathParams, TemplateError};

/// Error type a handler may return. It is logged, never propagated.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result of running a handler.
pub type HandlerResult = Result<(), HandlerError>;

/// A deep link handler.
pub type RouteHandler = Arc<dyn Fn(&RouteMatch) -> HandlerResult + Send + Sync>;

/// What a handler receives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMatch {
    /// Named and positional path captures.
    pub pathname: PathParams,
    /// Query parameters.
    pub search: SearchParams,
    /// Remainder under the root template, if any.
    pub tail: Option<String>,
}

impl RouteMatch {
    pub fn new(path: PathMatch, search: SearchParams) -> Self {
        Self {
            pathname: path.params,
            search,
            tail: path.tail,
        }
    }
}

/// A template bound to its handler.
#[derive(Clone)]
pub struct RouteRegistration {
    matcher: Matcher,
    handler: RouteHandler,
}

impl RouteRegistration {
    pub fn template(&self) -> &str {
        self.matcher.template()
    }

    pub fn handler(&self) -> &RouteHandler {
        &self.handler
    }
}

impl fmt::Debug for RouteRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteRegistration")
            .field("template", &self.template())
            .finish_non_exhaustive()
    }
}

/// A successful lookup.
#[derive(Debug)]
pub struct Resolved<'a> {
    pub registration: &'a RouteRegistration,
    pub path: PathMatch,
}

/// Ordered list of registrations.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteRegistration>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `template` and append it, or replace the handler of an
    /// identical template already present.
    pub fn register(&mut self, template: &str, handler: RouteHandler) -> Result<(), TemplateError> {
        let matcher = Matcher::compile(template)?;

        if let Some(existing) = self.routes.iter_mut().find(|r| r.template() == template) {
            tracing::debug!(template = %template, "Replacing deep link handler");
            existing.handler = handler;
            return Ok(());
        }

        if self.routes.iter().any(|r| r.matcher.is_root()) {
            tracing::warn!(
                template = %template,
                "Route registered after the root catch-all; it will never match"
            );
        }

        self.routes.push(RouteRegistration { matcher, handler });
        Ok(())
    }

    /// Remove a template. Returns true if it was registered.
    pub fn remove(&mut self, template: &str) -> bool {
        let before = self.routes.len();
        self.routes.retain(|r| r.template() != template);
        self.routes.len() != before
    }

    /// First registration matching `pathname`.
    pub fn resolve(&self, pathname: &str) -> Option<Resolved<'_>> {
        self.routes.iter().find_map(|registration| {
            registration
                .matcher
                .matches(pathname)
                .map(|path| Resolved { registration, path })
        })
    }

    /// Registered templates in lookup order.
    pub fn templates(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(RouteRegistration::template)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Internal routes plus one table per extension.
#[derive(Debug, Clone, Default)]
pub struct RouteRegistry {
    internal: RouteTable,
    extensions: HashMap<ExtensionId, RouteTable>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_internal(&mut self, template: &str, handler: RouteHandler) -> Result<(), TemplateError> {
        self.internal.register(template, handler)
    }

    pub fn register_extension(
        &mut self,
        extension: ExtensionId,
        template: &str,
        handler: RouteHandler,
    ) -> Result<(), TemplateError> {
        self.extensions
            .entry(extension)
            .or_default()
            .register(template, handler)
    }

    pub fn remove_internal(&mut self, template: &str) -> bool {
        self.internal.remove(template)
    }

    /// Drop every route of an extension. Returns the number removed.
    pub fn remove_extension(&mut self, extension: &ExtensionId) -> usize {
        self.extensions
            .remove(extension)
            .map(|table| table.len())
            .unwrap_or(0)
    }

    pub fn internal(&self) -> &RouteTable {
        &self.internal
    }

    pub fn extension(&self, extension: &ExtensionId) -> Option<&RouteTable> {
        self.extensions.get(extension)
    }
}
