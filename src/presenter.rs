//! Turning folded outcomes into user-facing actions.
//!
//! # Responsibilities
//! - Describe each outcome as a notification (or nothing)
//! - Offer an install for links that need a missing extension
//!
//! # Design Decisions
//! - `Matched` is silent
//! - Unresolved routes are informational, parse failures are errors
//! - Rendering toasts and installing extensions are collaborators behind traits

use std::fmt;
use std::sync::Arc;

use crate::extensions::address::{address_candidates, install_address, ExtensionId};
use crate::routing::attempt::RouteAttempt;
use crate::routing::link::{DeepLink, LinkTarget};

/// Query key that names an extension explicitly.
pub const NAME_QUERY: &str = "name";
/// Query key carrying a requested extension version.
pub const VERSION_QUERY: &str = "version";

/// What a renderer hands to its presenter.
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
    /// The link parsed; `attempt` is already folded.
    Routed { link: &'a DeepLink, attempt: RouteAttempt },
    /// The link was rejected by the parser.
    Rejected { url: &'a str, error: &'a str },
}

/// A toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Info(String),
    Error(String),
}

impl Notification {
    pub fn message(&self) -> &str {
        match self {
            Notification::Info(m) | Notification::Error(m) => m,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::Info(m) => write!(f, "[info] {}", m),
            Notification::Error(m) => write!(f, "[error] {}", m),
        }
    }
}

/// Request to install an extension a link needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub extension: ExtensionId,
    pub version: Option<String>,
}

/// Shows notifications to the user.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Starts the install-by-name flow.
pub trait ExtensionInstaller: Send + Sync {
    fn install(&self, request: InstallRequest);
}

/// Consumes folded outcomes.
pub trait OutcomePresenter: Send + Sync {
    fn present(&self, outcome: Outcome<'_>);
}

/// Notification text for an outcome, `None` when nothing should be shown.
pub fn describe(outcome: Outcome<'_>) -> Option<Notification> {
    match outcome {
        Outcome::Routed { attempt: RouteAttempt::Matched, .. } => None,
        Outcome::Routed { link, attempt: RouteAttempt::Missing } => {
            let suffix = match link.target() {
                LinkTarget::Internal => "",
                LinkTarget::Extension => " of the extension",
            };
            Some(Notification::Info(format!(
                "Unknown action `{}`. Are you on the latest version{}?",
                link.raw(),
                suffix
            )))
        }
        Outcome::Routed { link, attempt: RouteAttempt::MissingExtension } => Some(Notification::Info(format!(
            "Missing extension for action `{}`. Not able to find the extension in the known list. Try installing it manually.",
            link.raw()
        ))),
        Outcome::Rejected { url, error } => Some(Notification::Error(format!(
            "Failed to route `{}`: {}",
            url, error
        ))),
    }
}

/// Which extension a link that ended in `MissingExtension` asked for.
///
/// An explicit `name` query parameter wins, then an `/install/<address>` path,
/// then the longest address reading of the path.
pub fn install_request(link: &DeepLink) -> Option<InstallRequest> {
    let version = link.search().get(VERSION_QUERY).map(str::to_string);

    if let Some(name) = link.search().get(NAME_QUERY) {
        if let Ok(extension) = name.parse::<ExtensionId>() {
            return Some(InstallRequest { extension, version });
        }
    }

    if link.target() != LinkTarget::Extension {
        return None;
    }

    install_address(link.pathname())
        .or_else(|| {
            address_candidates(link.pathname())
                .into_iter()
                .next()
                .map(|candidate| candidate.extension)
        })
        .map(|extension| InstallRequest { extension, version })
}

/// Default presenter: notifications to a sink, installs to an installer.
#[derive(Clone)]
pub struct NotificationPresenter {
    sink: Arc<dyn NotificationSink>,
    installer: Option<Arc<dyn ExtensionInstaller>>,
}

impl NotificationPresenter {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink, installer: None }
    }

    pub fn with_installer(mut self, installer: Arc<dyn ExtensionInstaller>) -> Self {
        self.installer = Some(installer);
        self
    }
}

impl OutcomePresenter for NotificationPresenter {
    fn present(&self, outcome: Outcome<'_>) {
        if let Some(notification) = describe(outcome) {
            self.sink.notify(notification);
        }

        if let (Outcome::Routed { link, attempt: RouteAttempt::MissingExtension }, Some(installer)) =
            (outcome, &self.installer)
        {
            match install_request(link) {
                Some(request) => {
                    tracing::info!(extension = %request.extension, version = ?request.version, "Offering extension install");
                    installer.install(request);
                }
                None => tracing::debug!(url = %link.raw(), "Missing extension link names no extension"),
            }
        }
    }
}

impl fmt::Debug for NotificationPresenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationPresenter")
            .field("installer", &self.installer.is_some())
            .finish_non_exhaustive()
    }
}
