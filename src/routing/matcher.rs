//! Path template compilation and matching.
//!
//! # Responsibilities
//! - Compile a route template (`/cluster/:clusterId/settings`) into segments
//! - Match a pathname against the compiled segments
//! - Extract named captures, positional captures and the root tail
//!
//! # Design Decisions
//! - Templates are validated at compile time; a bad template never reaches dispatch
//! - Matching is case-sensitive and ignores trailing slashes
//! - An empty interior segment (`/cluster//settings`) never fills a template segment
//! - An optional parameter yields two alternatives, the longer one is tried first
//! - At most one optional parameter per template keeps alternatives unambiguous
//! - No regex: a compiled template is a list of segment kinds walked once per alternative

use std::collections::HashMap;

use thiserror::Error;

use crate::extensions::address::{NAME_PARAM, NAME_POSITION, PUBLISHER_PARAM, PUBLISHER_POSITION};

/// Errors raised while compiling a route template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template `{0}` must start with `/`")]
    MissingLeadingSlash(String),

    #[error("template `{0}` contains an empty segment")]
    EmptySegment(String),

    #[error("template `{0}` has a parameter without a name")]
    EmptyParameterName(String),

    #[error("template `{template}` has an invalid parameter name `{name}`")]
    InvalidParameterName { template: String, name: String },

    #[error("template `{template}` declares parameter `{name}` more than once")]
    DuplicateParameter { template: String, name: String },

    #[error("template `{0}` declares more than one optional parameter")]
    MultipleOptional(String),
}

/// One compiled piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Named(String),
    OptionalNamed(String),
    /// The embedded `/:publisher?/:name` sub-pattern.
    ExtensionAddress,
    /// Root template: everything after `/`.
    Tail,
}

/// Captured path parameters.
///
/// Named captures are addressed by parameter name. Captures of an embedded
/// extension address are additionally reachable by position, so callers can
/// recover publisher and name without knowing the containing template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    named: HashMap<String, String>,
    positional: Vec<Option<String>>,
}

impl PathParams {
    fn with_positions(len: usize) -> Self {
        Self {
            named: HashMap::new(),
            positional: vec![None; len],
        }
    }

    /// Value of a named parameter. Absent optionals return `None`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }

    /// Value at a fixed sub-pattern position.
    pub fn position(&self, index: usize) -> Option<&str> {
        self.positional.get(index).and_then(|v| v.as_deref())
    }

    /// Iterate over named captures.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.named.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty()
    }

    fn insert(&mut self, name: &str, raw: &str) {
        self.named.insert(name.to_string(), decode_segment(raw));
    }

    fn set_position(&mut self, index: usize, raw: &str) {
        if let Some(slot) = self.positional.get_mut(index) {
            *slot = Some(decode_segment(raw));
        }
    }
}

/// Result of matching a pathname against a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMatch {
    pub params: PathParams,
    /// Unstructured remainder, only ever set by the root template.
    pub tail: Option<String>,
}

/// A prefix match plus the part of the pathname that was not consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixMatch {
    pub params: PathParams,
    /// Always starts with `/`; `/` when nothing is left.
    pub remainder: String,
}

/// A compiled route template.
#[derive(Debug, Clone)]
pub struct Matcher {
    template: String,
    segments: Vec<Segment>,
    has_optional: bool,
    positions: usize,
}

impl Matcher {
    /// Compile a template. Fails on malformed templates.
    pub fn compile(template: &str) -> Result<Self, TemplateError> {
        if !template.starts_with('/') {
            return Err(TemplateError::MissingLeadingSlash(template.to_string()));
        }

        let trimmed = template.trim_end_matches('/');
        if trimmed.is_empty() {
            return Ok(Self {
                template: template.to_string(),
                segments: vec![Segment::Tail],
                has_optional: false,
                positions: 0,
            });
        }

        let raw: Vec<&str> = trimmed[1..].split('/').collect();
        let mut segments = Vec::with_capacity(raw.len());
        let mut seen: Vec<&str> = Vec::new();
        let mut optionals = 0usize;
        let mut positions = 0usize;
        let mut i = 0;

        while i < raw.len() {
            let part = raw[i];
            if part.is_empty() {
                return Err(TemplateError::EmptySegment(template.to_string()));
            }

            let Some(param) = part.strip_prefix(':') else {
                segments.push(Segment::Static(part.to_string()));
                i += 1;
                continue;
            };

            let (name, optional) = match param.strip_suffix('?') {
                Some(name) => (name, true),
                None => (param, false),
            };
            validate_name(template, name)?;
            if seen.contains(&name) {
                return Err(TemplateError::DuplicateParameter {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            }
            seen.push(name);

            if optional {
                optionals += 1;
                if optionals > 1 {
                    return Err(TemplateError::MultipleOptional(template.to_string()));
                }
            }

            // `:publisher?` directly followed by `:name` is the shared address sub-pattern.
            let next_is_name = raw.get(i + 1).is_some_and(|next| next.strip_prefix(':') == Some(NAME_PARAM));
            if optional && name == PUBLISHER_PARAM && next_is_name {
                if seen.contains(&NAME_PARAM) {
                    return Err(TemplateError::DuplicateParameter {
                        template: template.to_string(),
                        name: NAME_PARAM.to_string(),
                    });
                }
                seen.push(NAME_PARAM);
                segments.push(Segment::ExtensionAddress);
                positions = positions.max(NAME_POSITION + 1);
                i += 2;
                continue;
            }

            if optional {
                segments.push(Segment::OptionalNamed(name.to_string()));
            } else {
                segments.push(Segment::Named(name.to_string()));
            }
            i += 1;
        }

        Ok(Self {
            template: template.to_string(),
            segments,
            has_optional: optionals > 0,
            positions,
        })
    }

    /// The template this matcher was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// True for the root template that captures a tail.
    pub fn is_root(&self) -> bool {
        matches!(self.segments.as_slice(), [Segment::Tail])
    }

    /// Match a whole pathname.
    pub fn matches(&self, pathname: &str) -> Option<PathMatch> {
        let path = normalize(pathname);

        if self.is_root() {
            let rest = path.trim_start_matches('/');
            return Some(PathMatch {
                params: PathParams::default(),
                tail: (!rest.is_empty()).then(|| rest.to_string()),
            });
        }

        let parts = split(path);
        self.alternatives().find_map(|with_optional| {
            let (params, consumed) = self.walk(&parts, with_optional)?;
            (consumed == parts.len()).then_some(PathMatch { params, tail: None })
        })
    }

    /// Match the leading segments of a pathname, yielding one result per
    /// alternative that fits (longest first).
    pub fn match_prefix(&self, pathname: &str) -> Vec<PrefixMatch> {
        if self.is_root() {
            return vec![PrefixMatch {
                params: PathParams::default(),
                remainder: normalize(pathname).to_string(),
            }];
        }

        let parts = split(normalize(pathname));
        self.alternatives()
            .filter_map(|with_optional| {
                let (params, consumed) = self.walk(&parts, with_optional)?;
                Some(PrefixMatch {
                    params,
                    remainder: format!("/{}", parts[consumed..].join("/")),
                })
            })
            .collect()
    }

    fn alternatives(&self) -> impl Iterator<Item = bool> {
        let with = std::iter::once(true);
        let without = self.has_optional.then_some(false);
        with.chain(without)
    }

    fn walk(&self, parts: &[&str], with_optional: bool) -> Option<(PathParams, usize)> {
        let mut params = PathParams::with_positions(self.positions);
        let mut rest = parts.iter();

        for segment in &self.segments {
            match segment {
                Segment::Static(literal) => {
                    if next_segment(&mut rest)? != literal.as_str() {
                        return None;
                    }
                }
                Segment::Named(name) => params.insert(name, next_segment(&mut rest)?),
                Segment::OptionalNamed(name) => {
                    if with_optional {
                        params.insert(name, next_segment(&mut rest)?);
                    }
                }
                Segment::ExtensionAddress => {
                    if with_optional {
                        let publisher = next_segment(&mut rest)?;
                        params.insert(PUBLISHER_PARAM, publisher);
                        params.set_position(PUBLISHER_POSITION, publisher);
                    }
                    let name = next_segment(&mut rest)?;
                    params.insert(NAME_PARAM, name);
                    params.set_position(NAME_POSITION, name);
                }
                Segment::Tail => return None,
            }
        }

        Some((params, parts.len() - rest.len()))
    }
}

fn validate_name(template: &str, name: &str) -> Result<(), TemplateError> {
    if name.is_empty() {
        return Err(TemplateError::EmptyParameterName(template.to_string()));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(TemplateError::InvalidParameterName {
            template: template.to_string(),
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Strip trailing slashes, keeping the root.
fn normalize(pathname: &str) -> &str {
    let trimmed = pathname.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Segments of a normalized path. Interior empty segments are kept so that
/// `walk` can refuse them.
fn split(path: &str) -> Vec<&str> {
    match path.strip_prefix('/').unwrap_or(path) {
        "" => Vec::new(),
        rest => rest.split('/').collect(),
    }
}

/// Next path segment, `None` when the path is exhausted or the segment is empty.
fn next_segment<'a>(rest: &mut std::slice::Iter<'_, &'a str>) -> Option<&'a str> {
    rest.next().copied().filter(|part| !part.is_empty())
}

fn decode_segment(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_parameter() {
        let matcher = Matcher::compile("/cluster/:clusterId/settings").unwrap();
        let m = matcher.matches("/cluster/abc/settings").unwrap();
        assert_eq!(m.params.get("clusterId"), Some("abc"));
        assert!(m.tail.is_none());

        assert!(matcher.matches("/cluster/abc").is_none());
        assert!(matcher.matches("/cluster/abc/settings/extra").is_none());
    }

    #[test]
    fn test_case_sensitive_and_trailing_slash() {
        let matcher = Matcher::compile("/preferences/").unwrap();
        assert!(matcher.matches("/preferences").is_some());
        assert!(matcher.matches("/preferences///").is_some());
        assert!(matcher.matches("/Preferences").is_none());
    }

    #[test]
    fn test_empty_interior_segment_does_not_match() {
        let matcher = Matcher::compile("/cluster/:clusterId/settings").unwrap();
        assert!(matcher.matches("/cluster/abc//settings").is_none());
        assert!(matcher.matches("/cluster//settings").is_none());
        assert!(matcher.matches("/cluster/abc/settings/").is_some());

        let address = Matcher::compile("/:publisher?/:name").unwrap();
        assert!(address.match_prefix("//widget").is_empty());
        let prefixes = address.match_prefix("/acme/widget//open");
        assert_eq!(prefixes[0].remainder, "//open");
    }

    #[test]
    fn test_optional_publisher_present() {
        let matcher = Matcher::compile("/extensions/install/:publisher?/:name").unwrap();
        let m = matcher.matches("/extensions/install/acme/widget").unwrap();
        assert_eq!(m.params.get("publisher"), Some("acme"));
        assert_eq!(m.params.get("name"), Some("widget"));
        assert_eq!(m.params.position(PUBLISHER_POSITION), Some("acme"));
        assert_eq!(m.params.position(NAME_POSITION), Some("widget"));
    }

    #[test]
    fn test_optional_publisher_absent() {
        let matcher = Matcher::compile("/extensions/install/:publisher?/:name").unwrap();
        let m = matcher.matches("/extensions/install/widget").unwrap();
        assert_eq!(m.params.get("publisher"), None);
        assert_eq!(m.params.get("name"), Some("widget"));
        assert_eq!(m.params.position(PUBLISHER_POSITION), None);
        assert_eq!(m.params.position(NAME_POSITION), Some("widget"));
    }

    #[test]
    fn test_plain_optional_shifts_static_segments() {
        let matcher = Matcher::compile("/landing/:view?/open").unwrap();
        let with = matcher.matches("/landing/catalog/open").unwrap();
        assert_eq!(with.params.get("view"), Some("catalog"));

        let without = matcher.matches("/landing/open").unwrap();
        assert_eq!(without.params.get("view"), None);
        assert!(without.params.is_empty());
    }

    #[test]
    fn test_root_captures_tail() {
        let matcher = Matcher::compile("/").unwrap();
        assert!(matcher.is_root());
        assert_eq!(matcher.matches("/").unwrap().tail, None);
        assert_eq!(
            matcher.matches("/some/unknown/path/").unwrap().tail.as_deref(),
            Some("some/unknown/path")
        );
    }

    #[test]
    fn test_captures_are_percent_decoded() {
        let matcher = Matcher::compile("/entity/:entityId/settings").unwrap();
        let m = matcher.matches("/entity/my%20entity/settings").unwrap();
        assert_eq!(m.params.get("entityId"), Some("my entity"));
    }

    #[test]
    fn test_match_prefix_longest_first() {
        let matcher = Matcher::compile("/:publisher?/:name").unwrap();
        let results = matcher.match_prefix("/acme/widget/open/now");
        assert_eq!(results.len(), 2);

        assert_eq!(results[0].params.position(PUBLISHER_POSITION), Some("acme"));
        assert_eq!(results[0].params.position(NAME_POSITION), Some("widget"));
        assert_eq!(results[0].remainder, "/open/now");

        assert_eq!(results[1].params.position(PUBLISHER_POSITION), None);
        assert_eq!(results[1].params.position(NAME_POSITION), Some("acme"));
        assert_eq!(results[1].remainder, "/widget/open/now");
    }

    #[test]
    fn test_match_prefix_single_segment() {
        let matcher = Matcher::compile("/:publisher?/:name").unwrap();
        let results = matcher.match_prefix("/widget");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].params.get("name"), Some("widget"));
        assert_eq!(results[0].remainder, "/");
    }

    #[test]
    fn test_compile_errors() {
        assert_eq!(
            Matcher::compile("cluster").unwrap_err(),
            TemplateError::MissingLeadingSlash("cluster".into())
        );
        assert!(matches!(
            Matcher::compile("/a/:id/b/:id"),
            Err(TemplateError::DuplicateParameter { .. })
        ));
        assert!(matches!(
            Matcher::compile("/a//b"),
            Err(TemplateError::EmptySegment(_))
        ));
        assert!(matches!(
            Matcher::compile("/a/:"),
            Err(TemplateError::EmptyParameterName(_))
        ));
        assert!(matches!(
            Matcher::compile("/a/:x-y"),
            Err(TemplateError::InvalidParameterName { .. })
        ));
        assert!(matches!(
            Matcher::compile("/:a?/:b?"),
            Err(TemplateError::MultipleOptional(_))
        ));
        assert!(matches!(
            Matcher::compile("/:publisher?/:name/:name"),
            Err(TemplateError::DuplicateParameter { .. })
        ));
    }

    #[test]
    fn test_substituted_template_round_trip() {
        let templates = [
            ("/cluster/:clusterId", vec![("clusterId", "c1")]),
            ("/landing/view/:view", vec![("view", "catalog")]),
            ("/entity/:entityId/settings", vec![("entityId", "e-42")]),
        ];

        for (template, values) in templates {
            let mut path = template.to_string();
            for (name, value) in &values {
                path = path.replace(&format!(":{}", name), value);
            }
            let m = Matcher::compile(template).unwrap().matches(&path).unwrap();
            for (name, value) in values {
                assert_eq!(m.params.get(name), Some(value), "template {}", template);
            }
        }
    }
}
