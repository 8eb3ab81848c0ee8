//! Deep link protocol router library.

pub mod config;
pub mod coordinator;
pub mod extensions;
pub mod features;
pub mod ipc;
pub mod lifecycle;
pub mod observability;
pub mod presenter;
pub mod routing;

pub use config::schema::RouterConfig;
pub use lifecycle::{Application, Shutdown};
pub use routing::{DeepLink, ProtocolRouter, RouteAttempt};
