//! Metrics collection.
//!
//! # Responsibilities
//! - Define deep link routing metrics
//! - Keep label sets small and static
//!
//! # Metrics
//! - `deeplink_route_attempts_total` (counter): per-process outcomes by process, target, outcome
//! - `deeplink_folded_outcomes_total` (counter): folded renderer outcomes by outcome
//! - `deeplink_handler_failures_total` (counter): handlers that returned an error or panicked
//! - `deeplink_invalid_links_total` (counter): links rejected before routing
//! - `deeplink_pending_dropped_total` (counter): queued links dropped on overflow
//!
//! # Design Decisions
//! - Uses the `metrics` facade only; the embedding application installs a recorder
//! - Without a recorder every call is a no-op

use crate::routing::attempt::RouteAttempt;
use crate::routing::link::LinkTarget;
use crate::routing::router::ProcessKind;

/// Record the outcome of routing one link in one process.
pub fn record_route_attempt(process: ProcessKind, target: LinkTarget, attempt: RouteAttempt) {
    ::metrics::counter!(
        "deeplink_route_attempts_total",
        "process" => process.as_str(),
        "target" => target.as_str(),
        "outcome" => attempt.as_str()
    )
    .increment(1);
}

/// Record the outcome a renderer presented after folding.
pub fn record_folded_outcome(attempt: RouteAttempt) {
    ::metrics::counter!("deeplink_folded_outcomes_total", "outcome" => attempt.as_str()).increment(1);
}

/// Record a handler that failed after being matched.
pub fn record_handler_failure(process: ProcessKind) {
    ::metrics::counter!("deeplink_handler_failures_total", "process" => process.as_str()).increment(1);
}

/// Record a link that failed to parse.
pub fn record_invalid_link() {
    ::metrics::counter!("deeplink_invalid_links_total").increment(1);
}

/// Record a queued link dropped because the pending queue was full.
pub fn record_pending_dropped() {
    ::metrics::counter!("deeplink_pending_dropped_total").increment(1);
}
