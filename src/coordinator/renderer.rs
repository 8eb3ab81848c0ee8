//! Renderer-side handling of forwarded deep links.
//!
//! # Responsibilities
//! - Receive messages from the main process
//! - Route the same link against this window's own registry
//! - Fold main's outcome with the local one and present the result
//!
//! # Design Decisions
//! - Each window routes independently; windows do not coordinate
//! - The link is re-parsed locally from the raw URL, never trusted as structure
//! - Announces readiness once, then drops its handle on the main event queue

use std::fmt;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use crate::coordinator::main_process::MainEvent;
use crate::ipc::{RouterMessage, WindowId, WindowInbox};
use crate::observability::metrics;
use crate::presenter::{Outcome, OutcomePresenter};
use crate::routing::attempt::{fold, RouteAttempt};
use crate::routing::router::ProtocolRouter;

/// Deep link coordinator for one renderer window.
pub struct RendererCoordinator {
    window_id: WindowId,
    router: ProtocolRouter,
    presenter: Arc<dyn OutcomePresenter>,
}

impl RendererCoordinator {
    pub fn new(window_id: WindowId, router: ProtocolRouter, presenter: Arc<dyn OutcomePresenter>) -> Self {
        Self {
            window_id,
            router,
            presenter,
        }
    }

    pub fn window_id(&self) -> WindowId {
        self.window_id
    }

    pub fn router(&self) -> &ProtocolRouter {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut ProtocolRouter {
        &mut self.router
    }

    /// Handle one message. Returns the folded attempt for routed links.
    pub fn handle_message(&self, message: &RouterMessage) -> Option<RouteAttempt> {
        let span = tracing::info_span!(
            "deep_link",
            event_id = %message.event_id(),
            process = "renderer",
            window = %self.window_id
        );
        let _enter = span.enter();

        match message {
            RouterMessage::Invalid { error, url, .. } => {
                tracing::warn!(url = %url, error = %error, "Main process rejected deep link");
                self.presenter.present(Outcome::Rejected { url, error });
                None
            }
            RouterMessage::Routed { url, attempt, .. } => {
                let link = match self.router.parse(url) {
                    Ok(link) => link,
                    Err(e) => {
                        let error = e.to_string();
                        tracing::error!(url = %url, error = %error, "Renderer could not parse forwarded deep link");
                        self.presenter.present(Outcome::Rejected { url, error: &error });
                        return None;
                    }
                };

                let local = self.router.route(&link);
                let folded = fold(*attempt, local);
                tracing::debug!(main = %attempt, renderer = %local, folded = %folded, "Deep link outcome");
                metrics::record_folded_outcome(folded);

                self.presenter.present(Outcome::Routed { link: &link, attempt: folded });
                Some(folded)
            }
        }
    }

    /// Process messages until the main side closes the inbox or shutdown fires.
    ///
    /// `ready` is told once that this window can handle links.
    pub async fn run(
        self,
        mut inbox: WindowInbox,
        ready: Option<mpsc::UnboundedSender<MainEvent>>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        if let Some(ready) = ready {
            if ready.send(MainEvent::RendererReady(self.window_id)).is_err() {
                tracing::warn!(window = %self.window_id, "Main process gone before renderer became ready");
            }
        }
        tracing::info!(window = %self.window_id, "Renderer deep link loop started");

        loop {
            tokio::select! {
                biased;
                received = inbox.recv() => match received {
                    Some(Ok(message)) => {
                        self.handle_message(&message);
                    }
                    Some(Err(e)) => {
                        tracing::error!(window = %self.window_id, error = %e, "Dropping undecodable message");
                    }
                    None => break,
                },
                _ = shutdown.recv() => {
                    tracing::info!(window = %self.window_id, "Shutdown signal received, stopping renderer");
                    break;
                }
            }
        }

        tracing::info!(window = %self.window_id, "Renderer deep link loop stopped");
    }
}

impl fmt::Debug for RendererCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererCoordinator")
            .field("window_id", &self.window_id)
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}
