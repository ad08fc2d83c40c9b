//! Turning a [`Distribution`] into a pass/fail [`Verdict`].
//!
//! The check is count based: it asks how many distinct responders
//! answered, not whether the load was spread evenly over them.
//! [`verify_with_bounds`] can be used when per-responder counts matter.

use crate::Distribution;
use std::{fmt, ops::RangeInclusive};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Outcome of verifying a [`Distribution`].
pub struct Verdict {
    /// Number of distinct responders the caller expected.
    pub expected_distinct: usize,
    /// Number of distinct responders actually observed.
    pub distinct_responder_count: usize,
    /// Number of samples the distribution was built from.
    pub total_samples: usize,
    /// Whether the distribution met the expectation.
    pub pass: bool,
}

impl Verdict {
    /// Returns `true` if at least `k` distinct responders were observed.
    ///
    /// This is the tolerant form of the check, for scenarios where
    /// a balancer is allowed to miss a replica within a limited
    /// number of connections.
    #[must_use]
    pub fn distinct_at_least(&self, k: usize) -> bool {
        self.distinct_responder_count >= k
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {} distinct responder(s), observed {} over {} sample(s)",
            if self.pass { "pass" } else { "fail" },
            self.expected_distinct,
            self.distinct_responder_count,
            self.total_samples,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Inclusive bounds every per-responder count has to fall within.
pub struct CountBounds {
    min: usize,
    max: usize,
}

impl CountBounds {
    /// Create new [`CountBounds`], `min` and `max` included.
    ///
    /// The bounds are swapped if `min > max`.
    #[must_use]
    pub fn new(min: usize, max: usize) -> Self {
        if min > max {
            Self { min: max, max: min }
        } else {
            Self { min, max }
        }
    }

    /// Lower bound (inclusive).
    #[must_use]
    pub fn min(&self) -> usize {
        self.min
    }

    /// Upper bound (inclusive).
    #[must_use]
    pub fn max(&self) -> usize {
        self.max
    }

    /// Returns `true` if `count` lies within these bounds.
    #[must_use]
    pub fn contains(&self, count: usize) -> bool {
        (self.min..=self.max).contains(&count)
    }
}

impl From<RangeInclusive<usize>> for CountBounds {
    fn from(range: RangeInclusive<usize>) -> Self {
        Self::new(*range.start(), *range.end())
    }
}

/// Verify that exactly `expected_distinct` responders answered.
pub fn verify(distribution: &Distribution, expected_distinct: usize) -> Verdict {
    let distinct_responder_count = distribution.distinct();
    Verdict {
        expected_distinct,
        distinct_responder_count,
        total_samples: distribution.total(),
        pass: distinct_responder_count == expected_distinct,
    }
}

/// Like [`verify`], but also require every responder's count to be within `bounds`.
pub fn verify_with_bounds(
    distribution: &Distribution,
    expected_distinct: usize,
    bounds: impl Into<CountBounds>,
) -> Verdict {
    let bounds = bounds.into();
    let mut verdict = verify(distribution, expected_distinct);
    if verdict.pass
        && let Some((identity, count)) = distribution
            .iter()
            .find(|(_, count)| !bounds.contains(*count))
    {
        tracing::debug!(
            responder.identity = identity,
            responder.count = count,
            bounds.min = bounds.min,
            bounds.max = bounds.max,
            "responder count out of bounds",
        );
        verdict.pass = false;
    }
    verdict
}
