//! Tabulation of responder identities into a [`Distribution`].

use std::collections::{BTreeMap, btree_map};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// One observation of a sampling run: which responder answered
/// the connection made during `iteration`.
pub struct Sample {
    /// Zero-based index of the connection attempt that produced this sample.
    pub iteration: usize,
    /// The payload returned by the peer, decoded as text.
    pub responder_identity: String,
}

impl Sample {
    /// Create a new [`Sample`].
    pub fn new(iteration: usize, responder_identity: impl Into<String>) -> Self {
        Self {
            iteration,
            responder_identity: responder_identity.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Occurrence count per responder identity.
///
/// Keys are kept ordered so that the distribution displays the same
/// way for the same counts, regardless of the order samples came in.
pub struct Distribution {
    counts: BTreeMap<String, usize>,
}

impl Distribution {
    /// Create an empty [`Distribution`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of the given responder identity.
    pub fn record(&mut self, responder_identity: impl Into<String>) {
        *self.counts.entry(responder_identity.into()).or_insert(0) += 1;
    }

    /// Number of distinct responders observed.
    #[must_use]
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Total number of samples tabulated.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Number of times the given responder answered.
    #[must_use]
    pub fn count(&self, responder_identity: &str) -> usize {
        self.counts.get(responder_identity).copied().unwrap_or_default()
    }

    /// Returns `true` if no sample was tabulated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate over `(responder_identity, count)` pairs, ordered by identity.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.counts.iter(),
        }
    }
}

/// Tabulate a sequence of samples into a [`Distribution`].
///
/// The result only depends on the multiset of identities,
/// not on the order of the samples.
pub fn tabulate<'a, I>(samples: I) -> Distribution
where
    I: IntoIterator<Item = &'a Sample>,
{
    samples
        .into_iter()
        .map(|sample| sample.responder_identity.as_str())
        .collect()
}

impl<S: Into<String>> FromIterator<S> for Distribution {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut distribution = Self::new();
        distribution.extend(iter);
        distribution
    }
}

impl<S: Into<String>> Extend<S> for Distribution {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        for identity in iter {
            self.record(identity);
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.counts.iter()).finish()
    }
}

/// Iterator over the entries of a [`Distribution`].
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, String, usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, usize);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(identity, count)| (identity.as_str(), *count))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a Distribution {
    type Item = (&'a str, usize);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
