//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Build routers → Spawn main loop → Open windows → Renderers report ready
//!
//! Close (startup.rs):
//!     Drop event sender → Main drains and exits → Window inboxes close → Renderers drain and exit
//!
//! Abort (shutdown.rs, signals.rs):
//!     Ctrl-C → Shutdown broadcast → Every loop stops without draining
//! ```
//!
//! # Design Decisions
//! - Ordered close: downstream queues drain before their consumers stop
//! - Windows are opened before any link can be accepted

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::Application;
