//! Extension address sub-pattern and extension identity.
//!
//! # Responsibilities
//! - Define the reusable `/:publisher?/:name` path fragment
//! - Fix the positional indices of its two captures
//! - Peel an extension address off an extension-scoped pathname
//!
//! # Design Decisions
//! - Any template embedding the fragment verbatim gets publisher/name at the
//!   same positions, regardless of what surrounds it
//! - Address candidates are ordered longest first (publisher present, then absent)
//! - `/install/<address>` on the extension host is an install-by-name request,
//!   not an extension published by `install`

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::routing::matcher::{Matcher, PathParams};

/// Parameter name of the optional publisher capture.
pub const PUBLISHER_PARAM: &str = "publisher";
/// Parameter name of the extension name capture.
pub const NAME_PARAM: &str = "name";
/// The shared extension address fragment.
pub const EXTENSION_ADDRESS_PATTERN: &str = "/:publisher?/:name";
/// Position of the publisher capture.
pub const PUBLISHER_POSITION: usize = 0;
/// Position of the name capture.
pub const NAME_POSITION: usize = 1;

/// Extension-host path of an install-by-name request.
pub const INSTALL_PATTERN: &str = "/install/:publisher?/:name";

static INSTALL_MATCHER: LazyLock<Matcher> =
    LazyLock::new(|| Matcher::compile(INSTALL_PATTERN).expect("install pattern is a valid template"));

static ADDRESS_MATCHER: LazyLock<Matcher> = LazyLock::new(|| {
    Matcher::compile(EXTENSION_ADDRESS_PATTERN).expect("extension address pattern is a valid template")
});

/// Identity of an extension: optional publisher plus name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExtensionId {
    pub publisher: Option<String>,
    pub name: String,
}

impl ExtensionId {
    pub fn new(publisher: Option<&str>, name: &str) -> Self {
        Self {
            publisher: publisher.map(str::to_string),
            name: name.to_string(),
        }
    }

    /// Build an id from the positional captures of an embedded address.
    pub fn from_params(params: &PathParams) -> Option<Self> {
        let name = params.position(NAME_POSITION)?;
        Some(Self::new(params.position(PUBLISHER_POSITION), name))
    }

    pub fn publisher(&self) -> Option<&str> {
        self.publisher.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.publisher {
            Some(publisher) => write!(f, "{}/{}", publisher, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Error parsing an `ExtensionId` from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid extension id `{0}`")]
pub struct InvalidExtensionId(pub String);

impl FromStr for ExtensionId {
    type Err = InvalidExtensionId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [name] if !name.is_empty() => Ok(Self::new(None, name)),
            [publisher, name] if !publisher.is_empty() && !name.is_empty() => {
                Ok(Self::new(Some(*publisher), name))
            }
            _ => Err(InvalidExtensionId(s.to_string())),
        }
    }
}

/// A possible reading of an extension-scoped pathname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressCandidate {
    pub extension: ExtensionId,
    /// Path left for the extension's own routes, starting with `/`.
    pub remainder: String,
}

/// All readings of `pathname` as `/:publisher?/:name/...`, longest first.
pub fn address_candidates(pathname: &str) -> Vec<AddressCandidate> {
    ADDRESS_MATCHER
        .match_prefix(pathname)
        .into_iter()
        .filter_map(|m| {
            Some(AddressCandidate {
                extension: ExtensionId::from_params(&m.params)?,
                remainder: m.remainder,
            })
        })
        .collect()
}

/// The extension an extension-scoped `/install/:publisher?/:name` path asks for.
pub fn install_address(pathname: &str) -> Option<ExtensionId> {
    INSTALL_MATCHER
        .matches(pathname)
        .and_then(|m| ExtensionId::from_params(&m.params))
}
