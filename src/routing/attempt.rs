//! Routing outcomes and how two of them combine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of routing one deep link in one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteAttempt {
    /// A handler was found and invoked.
    #[serde(rename = "matched")]
    Matched,
    /// Well-formed link, but no registered handler matched it.
    #[serde(rename = "missing")]
    Missing,
    /// The link addressed an extension that is not installed.
    #[serde(rename = "no-extension")]
    MissingExtension,
}

impl RouteAttempt {
    /// Combine this process' outcome with another process' outcome.
    ///
    /// Precedence: `Matched` > `MissingExtension` > `Missing`.
    pub fn fold(self, other: RouteAttempt) -> RouteAttempt {
        if self.rank() >= other.rank() {
            self
        } else {
            other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteAttempt::Matched => "matched",
            RouteAttempt::Missing => "missing",
            RouteAttempt::MissingExtension => "no-extension",
        }
    }

    fn rank(self) -> u8 {
        match self {
            RouteAttempt::Missing => 0,
            RouteAttempt::MissingExtension => 1,
            RouteAttempt::Matched => 2,
        }
    }
}

/// Free-function form of [`RouteAttempt::fold`].
pub fn fold(main: RouteAttempt, renderer: RouteAttempt) -> RouteAttempt {
    main.fold(renderer)
}

impl fmt::Display for RouteAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RouteAttempt::*;

    const ALL: [RouteAttempt; 3] = [Matched, Missing, MissingExtension];

    #[test]
    fn test_matched_wins() {
        for x in ALL {
            assert_eq!(fold(Matched, x), Matched);
            assert_eq!(fold(x, Matched), Matched);
        }
    }

    #[test]
    fn test_missing_extension_beats_missing() {
        assert_eq!(fold(MissingExtension, Missing), MissingExtension);
        assert_eq!(fold(Missing, MissingExtension), MissingExtension);
        assert_eq!(fold(MissingExtension, MissingExtension), MissingExtension);
    }

    #[test]
    fn test_missing_only_when_both_missing() {
        assert_eq!(fold(Missing, Missing), Missing);
    }

    #[test]
    fn test_fold_is_commutative() {
        for a in ALL {
            for b in ALL {
                assert_eq!(fold(a, b), fold(b, a));
            }
        }
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&MissingExtension).unwrap(), "\"no-extension\"");
        assert_eq!(Matched.to_string(), "matched");
    }
}
