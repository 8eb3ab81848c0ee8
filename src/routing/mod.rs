//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Raw URL (app://app/cluster/abc?tab=pods)
//!     → link.rs (parse: protocol, host → target, pathname, search)
//!     → router.rs
//!         internal  → registry.rs (internal table)
//!         extension → extension catalog check → registry.rs (extension table)
//!     → matcher.rs (first registered template that matches wins)
//!     → handler(RouteMatch)
//!     → attempt.rs (Matched | Missing | MissingExtension)
//!
//! Cross-process:
//!     main attempt ⊕ renderer attempt → fold → presenter
//! ```
//!
//! # Design Decisions
//! - Templates validated at registration, never at lookup
//! - Registration order decides between overlapping templates, not specificity
//! - Deterministic: the same link against the same registry matches the same route

pub mod attempt;
pub mod link;
pub mod matcher;
pub mod registry;
pub mod router;

pub use attempt::{fold, RouteAttempt};
pub use link::{DeepLink, LinkTarget, RoutingError, SearchParams, SearchValue};
pub use matcher::{Matcher, PathMatch, PathParams, TemplateError};
pub use registry::{HandlerError, HandlerResult, RouteHandler, RouteMatch, RouteRegistry, RouteTable};
pub use router::{ProcessKind, ProtocolRouter};
