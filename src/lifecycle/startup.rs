//! Startup orchestration.
//!
//! # Responsibilities
//! - Spawn the main process loop
//! - Open renderer windows and spawn their loops
//! - Accept raw deep links from the outside world
//! - Close gracefully or abort
//!
//! # Design Decisions
//! - Renderer routers are built by a caller-supplied factory, one per window
//! - The application owns the only long-lived sender to the main loop,
//!   so dropping it is what ends the run

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::CoordinatorConfig;
use crate::coordinator::{MainCoordinator, MainEvent, RendererCoordinator};
use crate::ipc::{window_channel, WindowId};
use crate::lifecycle::shutdown::Shutdown;
use crate::routing::matcher::TemplateError;
use crate::routing::router::ProtocolRouter;

/// A running main process and its renderer windows.
#[derive(Debug)]
pub struct Application {
    events: mpsc::UnboundedSender<MainEvent>,
    shutdown: Shutdown,
    main_task: JoinHandle<()>,
    renderer_tasks: Vec<JoinHandle<()>>,
    next_window: u32,
}

impl Application {
    /// Start the main loop and `config.windows` renderer windows.
    ///
    /// `renderer` builds the coordinator for each window; a registration error
    /// there stops startup and tears down what was already spawned.
    pub fn start<F>(config: &CoordinatorConfig, main_router: ProtocolRouter, mut renderer: F) -> Result<Self, TemplateError>
    where
        F: FnMut(WindowId) -> Result<RendererCoordinator, TemplateError>,
    {
        let shutdown = Shutdown::new();
        let (events, rx) = mpsc::unbounded_channel();

        let main = MainCoordinator::new(main_router, config.clone());
        let main_task = tokio::spawn(main.run(rx, shutdown.subscribe()));

        let mut app = Self {
            events,
            shutdown,
            main_task,
            renderer_tasks: Vec::new(),
            next_window: 1,
        };

        for _ in 0..config.windows {
            let id = app.next_window_id();
            match renderer(id) {
                Ok(coordinator) => {
                    app.open_window(coordinator);
                }
                Err(e) => {
                    tracing::error!(window = %id, error = %e, "Failed to build renderer routes");
                    app.shutdown.trigger();
                    return Err(e);
                }
            }
        }

        tracing::info!(windows = config.windows, "Application started");
        Ok(app)
    }

    /// Id for the next window to open.
    pub fn next_window_id(&self) -> WindowId {
        WindowId(self.next_window)
    }

    /// Attach a renderer window and spawn its loop.
    pub fn open_window(&mut self, renderer: RendererCoordinator) -> WindowId {
        let id = renderer.window_id();
        self.next_window = self.next_window.max(id.0 + 1);

        let (channel, inbox) = window_channel(id);
        if self.events.send(MainEvent::WindowOpened(Box::new(channel))).is_err() {
            tracing::warn!(window = %id, "Main process loop is gone; window will receive nothing");
        }

        let task = tokio::spawn(renderer.run(inbox, Some(self.events.clone()), self.shutdown.subscribe()));
        self.renderer_tasks.push(task);
        id
    }

    /// Hand a raw deep link to the main process. Returns false if it has stopped.
    pub fn open_url(&self, raw: impl Into<String>) -> bool {
        self.events.send(MainEvent::DeepLink(raw.into())).is_ok()
    }

    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }

    /// Stop accepting links and wait until every accepted link was handled.
    pub async fn close(self) {
        let Self {
            events,
            main_task,
            renderer_tasks,
            ..
        } = self;
        drop(events);

        if let Err(e) = main_task.await {
            tracing::error!(error = %e, "Main process loop failed");
        }
        for task in renderer_tasks {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Renderer loop failed");
            }
        }
        tracing::info!("Application closed");
    }

    /// Stop every loop now, dropping whatever is still queued.
    pub async fn abort(self) {
        self.shutdown.trigger();
        self.close().await;
    }
}
