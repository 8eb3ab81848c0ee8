//! Extension identity and installation state.
//!
//! # Data Flow
//! ```text
//! extension link pathname (/acme/widget/open)
//!     → address.rs (candidate readings: acme/widget + /open, acme + /widget/open)
//!     → catalog.rs (first candidate that is installed and enabled)
//!     → that extension's route table
//! ```

pub mod address;
pub mod catalog;

pub use address::{address_candidates, install_address, AddressCandidate, ExtensionId, InvalidExtensionId};
pub use catalog::{ExtensionCatalog, ExtensionResolver, InstallOrigin, InstalledExtension};
