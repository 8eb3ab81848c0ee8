//! Main → renderer message channel.
//!
//! # Responsibilities
//! - Deliver encoded messages to one renderer window
//! - Report a closed window so the main process can forget it
//!
//! # Design Decisions
//! - Fire-and-forget: posting never waits for the renderer
//! - Messages are serialized on send, so nothing but data reaches the other side
//! - In-process transport over an unbounded tokio mpsc channel; a real IPC
//!   transport implements [`MessageChannel`] instead

use std::fmt;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::ipc::message::RouterMessage;

/// Identifies a renderer window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u32);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window-{}", self.0)
    }
}

/// Errors moving a message between processes.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("window {0} is closed")]
    Closed(WindowId),

    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Sending side of a main → renderer channel.
pub trait MessageChannel: Send + fmt::Debug {
    fn window_id(&self) -> WindowId;

    /// Post a message without waiting for the receiver.
    fn post(&self, message: &RouterMessage) -> Result<(), ChannelError>;

    fn is_closed(&self) -> bool;
}

/// In-process channel to one window.
#[derive(Debug, Clone)]
pub struct WindowChannel {
    window_id: WindowId,
    tx: mpsc::UnboundedSender<String>,
}

impl MessageChannel for WindowChannel {
    fn window_id(&self) -> WindowId {
        self.window_id
    }

    fn post(&self, message: &RouterMessage) -> Result<(), ChannelError> {
        let wire = message.encode().map_err(ChannelError::Encode)?;
        self.tx.send(wire).map_err(|_| ChannelError::Closed(self.window_id))
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving side, owned by the renderer.
#[derive(Debug)]
pub struct WindowInbox {
    window_id: WindowId,
    rx: mpsc::UnboundedReceiver<String>,
}

impl WindowInbox {
    pub fn window_id(&self) -> WindowId {
        self.window_id
    }

    /// Next message. `None` once the main side is gone and the inbox is drained.
    pub async fn recv(&mut self) -> Option<Result<RouterMessage, ChannelError>> {
        let wire = self.rx.recv().await?;
        Some(RouterMessage::decode(&wire).map_err(ChannelError::Decode))
    }

    /// Next message if one is already waiting.
    pub fn try_recv(&mut self) -> Option<Result<RouterMessage, ChannelError>> {
        let wire = self.rx.try_recv().ok()?;
        Some(RouterMessage::decode(&wire).map_err(ChannelError::Decode))
    }
}

/// Create a connected channel/inbox pair for a window.
pub fn window_channel(window_id: WindowId) -> (WindowChannel, WindowInbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (WindowChannel { window_id, tx }, WindowInbox { window_id, rx })
}
