//! Cross-process deep link coordination.
//!
//! # Data Flow
//! ```text
//! OS / shell / second instance
//!     → MainEvent::DeepLink
//!     → main_process.rs: parse, route in main, queue until a renderer is ready
//!     → broadcast RouterMessage to every window
//!     → renderer.rs (per window): re-parse, route locally, fold with main's attempt
//!     → presenter
//! ```
//!
//! # Design Decisions
//! - The main process never waits for renderers
//! - Closing the main event queue drains everything downstream, in order

pub mod main_process;
pub mod renderer;

pub use main_process::{MainCoordinator, MainEvent};
pub use renderer::RendererCoordinator;
