//! [`Freshness`]: whether a node's stored value is known to still be valid.

use serde::{Deserialize, Serialize};

/// A node's freshness state (spec §3.1, §3.2 invariant I4).
///
/// The absence of a stored `Freshness` record means "never materialized";
/// that third state is represented by `Option<Freshness>` at call sites
/// rather than as a variant here, so that "missing" and "stale" can never
/// be confused by a match arm that forgets a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Freshness {
    /// The stored value is consistent with every recorded dependency
    /// counter: `inputs(N)` all match `counter(dep)`, and every dep is
    /// itself up to date.
    UpToDate,
    /// A transitive dependency may have changed since this node was last
    /// computed; the stored value may be stale and must be validated (or
    /// recomputed) before it can be returned from `pull`.
    PotentiallyOutdated,
}

impl Freshness {
    /// True for [`Freshness::UpToDate`].
    pub fn is_up_to_date(self) -> bool {
        matches!(self, Freshness::UpToDate)
    }
}

/// The freshness of a node as reported to debug introspection callers,
/// which additionally distinguishes "never materialized" from the two
/// states tracked by [`Freshness`] (spec §4.4.1, `debugGetFreshness`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreshnessState {
    /// No value has ever been stored for this node.
    Missing,
    /// See [`Freshness::UpToDate`].
    UpToDate,
    /// See [`Freshness::PotentiallyOutdated`].
    PotentiallyOutdated,
}

impl From<Option<Freshness>> for FreshnessState {
    fn from(f: Option<Freshness>) -> Self {
        match f {
            None => FreshnessState::Missing,
            Some(Freshness::UpToDate) => FreshnessState::UpToDate,
            Some(Freshness::PotentiallyOutdated) => FreshnessState::PotentiallyOutdated,
        }
    }
}

impl std::fmt::Display for FreshnessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FreshnessState::Missing => "missing",
            FreshnessState::UpToDate => "up-to-date",
            FreshnessState::PotentiallyOutdated => "potentially-outdated",
        };
        f.write_str(s)
    }
}
