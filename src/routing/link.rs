//! Deep link parsing.
//!
//! # Responsibilities
//! - Parse a raw `scheme://host/path?query` string
//! - Check the scheme and classify the host (internal vs extension)
//! - Collect query parameters, keeping repeated keys as lists
//!
//! # Design Decisions
//! - Parsing happens once, before any registry lookup; failures never reach handlers
//! - Scheme and host compare case-insensitively, the path stays case-sensitive
//! - The raw string is kept verbatim for notifications

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::config::ProtocolConfig;

/// A link that could not be turned into a routable [`DeepLink`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid protocol `{found}`, expected `{expected}`")]
    InvalidProtocol { expected: String, found: String },

    #[error("URL has no host")]
    MissingHost,

    #[error("unknown host `{0}`")]
    InvalidHost(String),

    #[error("extension link does not name an extension")]
    MissingExtensionId,
}

/// Which route table a link is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkTarget {
    Internal,
    Extension,
}

impl LinkTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkTarget::Internal => "internal",
            LinkTarget::Extension => "extension",
        }
    }
}

/// A query value: single, or every value of a repeated key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchValue {
    Single(String),
    Multiple(Vec<String>),
}

impl SearchValue {
    /// First value.
    pub fn first(&self) -> &str {
        match self {
            SearchValue::Single(v) => v,
            SearchValue::Multiple(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// All values in query order.
    pub fn all(&self) -> Vec<&str> {
        match self {
            SearchValue::Single(v) => vec![v.as_str()],
            SearchValue::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            SearchValue::Single(first) => {
                *self = SearchValue::Multiple(vec![std::mem::take(first), value]);
            }
            SearchValue::Multiple(values) => values.push(value),
        }
    }
}

/// Decoded query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams(BTreeMap<String, SearchValue>);

impl SearchParams {
    pub fn from_query(url: &Url) -> Self {
        let mut params: BTreeMap<String, SearchValue> = BTreeMap::new();
        for (key, value) in url.query_pairs() {
            match params.get_mut(key.as_ref()) {
                Some(existing) => existing.push(value.into_owned()),
                None => {
                    params.insert(key.into_owned(), SearchValue::Single(value.into_owned()));
                }
            }
        }
        Self(params)
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(SearchValue::first)
    }

    /// Raw value for `key`, single or repeated.
    pub fn value(&self, key: &str) -> Option<&SearchValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A parsed, routable deep link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLink {
    raw: String,
    target: LinkTarget,
    pathname: String,
    search: SearchParams,
}

impl DeepLink {
    /// Parse `raw` against the configured scheme and hosts.
    pub fn parse(raw: &str, protocol: &ProtocolConfig) -> Result<Self, RoutingError> {
        let url = Url::parse(raw.trim())?;

        if !url.scheme().eq_ignore_ascii_case(&protocol.scheme) {
            return Err(RoutingError::InvalidProtocol {
                expected: protocol.scheme.clone(),
                found: url.scheme().to_string(),
            });
        }

        let host = url.host_str().ok_or(RoutingError::MissingHost)?;
        let target = if host.eq_ignore_ascii_case(&protocol.internal_host) {
            LinkTarget::Internal
        } else if host.eq_ignore_ascii_case(&protocol.extension_host) {
            LinkTarget::Extension
        } else {
            return Err(RoutingError::InvalidHost(host.to_string()));
        };

        let pathname = match url.path() {
            "" => "/".to_string(),
            path => path.to_string(),
        };

        if target == LinkTarget::Extension && pathname.trim_matches('/').is_empty() {
            return Err(RoutingError::MissingExtensionId);
        }

        Ok(Self {
            raw: raw.to_string(),
            target,
            pathname,
            search: SearchParams::from_query(&url),
        })
    }

    /// The link exactly as it was received.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn target(&self) -> LinkTarget {
        self.target
    }

    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    pub fn search(&self) -> &SearchParams {
        &self.search
    }
}
