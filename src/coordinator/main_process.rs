//! Main-process side of deep link coordination.
//!
//! # Responsibilities
//! - Receive raw deep links first (OS / shell / single-instance forwarding)
//! - Route each link in the main process
//! - Broadcast the link and main's outcome to every live renderer window
//! - Hold messages until a renderer has loaded
//!
//! # Design Decisions
//! - Never waits on renderers: a broadcast is a series of non-blocking posts
//! - Malformed links go out on the invalid channel instead of being routed
//! - Closed windows are pruned on the next broadcast
//! - The pending queue is bounded; on overflow the oldest link is dropped

use std::collections::VecDeque;

use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::config::CoordinatorConfig;
use crate::ipc::{ChannelError, MessageChannel, RouterMessage, WindowId};
use crate::observability::metrics;
use crate::routing::router::ProtocolRouter;

/// Inputs to the main process loop.
#[derive(Debug)]
pub enum MainEvent {
    /// A raw deep link arrived.
    DeepLink(String),
    /// A renderer window was created.
    WindowOpened(Box<dyn MessageChannel>),
    /// A renderer finished loading and can handle links.
    RendererReady(WindowId),
}

/// Main-process coordinator.
#[derive(Debug)]
pub struct MainCoordinator {
    router: ProtocolRouter,
    config: CoordinatorConfig,
    windows: Vec<Box<dyn MessageChannel>>,
    renderer_ready: bool,
    pending: VecDeque<RouterMessage>,
}

impl MainCoordinator {
    pub fn new(router: ProtocolRouter, config: CoordinatorConfig) -> Self {
        let renderer_ready = !config.queue_until_renderer_ready;
        Self {
            router,
            config,
            windows: Vec::new(),
            renderer_ready,
            pending: VecDeque::new(),
        }
    }

    pub fn router(&self) -> &ProtocolRouter {
        &self.router
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Start delivering to a new window.
    pub fn attach_window(&mut self, channel: Box<dyn MessageChannel>) {
        tracing::debug!(window = %channel.window_id(), "Renderer window attached");
        self.windows.push(channel);
    }

    /// Mark renderers as loaded and flush anything queued.
    pub fn renderer_ready(&mut self, window: WindowId) {
        if self.renderer_ready {
            return;
        }
        self.renderer_ready = true;

        tracing::info!(window = %window, pending = self.pending.len(), "Renderer ready, flushing deep links");
        while let Some(message) = self.pending.pop_front() {
            self.broadcast(&message);
        }
    }

    /// Route a raw deep link and forward the result. Returns the message sent
    /// (or queued) to renderers.
    pub fn handle_deep_link(&mut self, raw: &str) -> RouterMessage {
        let event_id = Uuid::new_v4();
        let span = tracing::info_span!("deep_link", %event_id, process = "main");
        let _enter = span.enter();

        let message = match self.router.parse(raw) {
            Ok(link) => {
                let attempt = self.router.route(&link);
                RouterMessage::Routed {
                    event_id,
                    url: raw.to_string(),
                    target: link.target(),
                    attempt,
                }
            }
            Err(e) => {
                tracing::warn!(url = %raw, error = %e, "Rejected malformed deep link");
                metrics::record_invalid_link();
                RouterMessage::Invalid {
                    event_id,
                    error: e.to_string(),
                    url: raw.to_string(),
                }
            }
        };

        self.dispatch(message.clone());
        message
    }

    /// Apply one event.
    pub fn handle_event(&mut self, event: MainEvent) {
        match event {
            MainEvent::DeepLink(raw) => {
                self.handle_deep_link(&raw);
            }
            MainEvent::WindowOpened(channel) => self.attach_window(channel),
            MainEvent::RendererReady(window) => self.renderer_ready(window),
        }
    }

    /// Process events until the sender side closes or shutdown fires.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<MainEvent>, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!("Main process deep link loop started");

        loop {
            tokio::select! {
                biased;
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, stopping main deep link loop");
                    break;
                }
            }
        }

        if !self.pending.is_empty() {
            tracing::warn!(dropped = self.pending.len(), "No renderer became ready; dropping queued deep links");
        }
        tracing::info!("Main process deep link loop stopped");
    }

    fn dispatch(&mut self, message: RouterMessage) {
        if self.renderer_ready {
            self.broadcast(&message);
            return;
        }

        if self.pending.len() >= self.config.max_pending {
            if let Some(dropped) = self.pending.pop_front() {
                tracing::warn!(
                    event_id = %dropped.event_id(),
                    url = %dropped.url(),
                    "Pending deep link queue full, dropping oldest"
                );
                metrics::record_pending_dropped();
            }
        }
        tracing::debug!(event_id = %message.event_id(), "Renderer not ready, queueing deep link");
        self.pending.push_back(message);
    }

    fn broadcast(&mut self, message: &RouterMessage) {
        if self.windows.is_empty() {
            tracing::debug!(event_id = %message.event_id(), "No renderer windows to receive deep link");
            return;
        }

        self.windows.retain(|window| match window.post(message) {
            Ok(()) => true,
            Err(ChannelError::Closed(id)) => {
                tracing::info!(window = %id, "Renderer window closed, detaching");
                false
            }
            Err(e) => {
                tracing::error!(window = %window.window_id(), error = %e, "Failed to forward deep link");
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::ProtocolConfig;
    use crate::extensions::catalog::ExtensionCatalog;
    use crate::ipc::{window_channel, WindowInbox};
    use crate::routing::attempt::RouteAttempt;
    use crate::routing::router::ProcessKind;

    fn coordinator(config: CoordinatorConfig) -> MainCoordinator {
        let mut router = ProtocolRouter::new(
            ProcessKind::Main,
            ProtocolConfig::default(),
            Arc::new(ExtensionCatalog::new()),
        );
        router.add_handler("/extensions/install/:publisher?/:name", |_| Ok(())).unwrap();
        MainCoordinator::new(router, config)
    }

    fn drain(inbox: &mut WindowInbox) -> Vec<RouterMessage> {
        let mut out = Vec::new();
        while let Some(message) = inbox.try_recv() {
            out.push(message.unwrap());
        }
        out
    }

    #[test]
    fn test_broadcasts_main_attempt_to_every_window() {
        let mut main = coordinator(CoordinatorConfig {
            queue_until_renderer_ready: false,
            ..CoordinatorConfig::default()
        });
        let (a, mut inbox_a) = window_channel(WindowId(1));
        let (b, mut inbox_b) = window_channel(WindowId(2));
        main.attach_window(Box::new(a));
        main.attach_window(Box::new(b));

        let sent = main.handle_deep_link("app://app/extensions/install/acme/widget");
        assert!(matches!(sent, RouterMessage::Routed { attempt: RouteAttempt::Matched, .. }));

        assert_eq!(drain(&mut inbox_a), vec![sent.clone()]);
        assert_eq!(drain(&mut inbox_b), vec![sent]);
    }

    #[test]
    fn test_malformed_link_uses_invalid_channel() {
        let mut main = coordinator(CoordinatorConfig {
            queue_until_renderer_ready: false,
            ..CoordinatorConfig::default()
        });
        let (a, mut inbox) = window_channel(WindowId(1));
        main.attach_window(Box::new(a));

        main.handle_deep_link("app://nowhere/x");
        let received = drain(&mut inbox);
        assert_eq!(received.len(), 1);
        match &received[0] {
            RouterMessage::Invalid { error, url, .. } => {
                assert_eq!(url, "app://nowhere/x");
                assert!(error.contains("nowhere"));
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_queues_until_renderer_ready() {
        let mut main = coordinator(CoordinatorConfig::default());
        let (a, mut inbox) = window_channel(WindowId(1));
        main.attach_window(Box::new(a));

        let first = main.handle_deep_link("app://app/one");
        let second = main.handle_deep_link("app://app/two");
        assert_eq!(main.pending_len(), 2);
        assert!(drain(&mut inbox).is_empty());

        main.renderer_ready(WindowId(1));
        assert_eq!(main.pending_len(), 0);
        assert_eq!(drain(&mut inbox), vec![first, second]);

        let third = main.handle_deep_link("app://app/three");
        assert_eq!(drain(&mut inbox), vec![third]);
    }

    #[test]
    fn test_pending_overflow_drops_oldest() {
        let mut main = coordinator(CoordinatorConfig {
            max_pending: 2,
            ..CoordinatorConfig::default()
        });
        let (a, mut inbox) = window_channel(WindowId(1));
        main.attach_window(Box::new(a));

        main.handle_deep_link("app://app/one");
        let second = main.handle_deep_link("app://app/two");
        let third = main.handle_deep_link("app://app/three");
        assert_eq!(main.pending_len(), 2);

        main.renderer_ready(WindowId(1));
        assert_eq!(drain(&mut inbox), vec![second, third]);
    }

    #[test]
    fn test_closed_window_is_pruned() {
        let mut main = coordinator(CoordinatorConfig {
            queue_until_renderer_ready: false,
            ..CoordinatorConfig::default()
        });
        let (a, inbox_a) = window_channel(WindowId(1));
        let (b, mut inbox_b) = window_channel(WindowId(2));
        main.attach_window(Box::new(a));
        main.attach_window(Box::new(b));
        drop(inbox_a);

        main.handle_deep_link("app://app/landing");
        assert_eq!(main.window_count(), 1);
        assert_eq!(drain(&mut inbox_b).len(), 1);
    }

    #[tokio::test]
    async fn test_run_stops_when_events_close() {
        let main = coordinator(CoordinatorConfig::default());
        let (tx, rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let (a, mut inbox) = window_channel(WindowId(1));

        tx.send(MainEvent::WindowOpened(Box::new(a))).unwrap();
        tx.send(MainEvent::DeepLink("app://app/cluster/abc".into())).unwrap();
        tx.send(MainEvent::RendererReady(WindowId(1))).unwrap();
        drop(tx);

        main.run(rx, shutdown_rx).await;
        drop(shutdown_tx);

        let message = inbox.recv().await.unwrap().unwrap();
        assert!(matches!(message, RouterMessage::Routed { attempt: RouteAttempt::Missing, .. }));
        assert!(inbox.recv().await.is_none());
    }
}
