//! Cross-process messaging.
//!
//! # Data Flow
//! ```text
//! main process
//!     → RouterMessage (routed | invalid)
//!     → encode (JSON)
//!     → MessageChannel::post (one per renderer window)
//!     → WindowInbox::recv → decode
//!     → renderer process
//! ```

pub mod channel;
pub mod message;

pub use channel::{window_channel, ChannelError, MessageChannel, WindowChannel, WindowId, WindowInbox};
pub use message::{EventId, RouterMessage};
