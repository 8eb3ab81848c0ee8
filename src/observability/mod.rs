//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Deep link handling produces:
//!     → logging.rs (structured log events, one span per deep link event id)
//!     → metrics.rs (route attempts, folded outcomes, handler failures)
//! ```
//!
//! # Design Decisions
//! - Logs go to stderr so stdout stays free for presented notifications
//! - Metrics are cheap counters; without an installed recorder they are no-ops

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
