//! Run-scoped parse state.

use std::collections::HashSet;

/// Dense index of a node inside a [`Spec`](crate::Spec).
///
/// Assigned in pre-order when the spec is built; the root group is `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The raw index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Mutable state for a single parse.
///
/// Holds one usage counter per node and borrows the spec's registry of leaf
/// names. A `Spec` can be shared between parses; each parse gets its own
/// context.
#[derive(Debug)]
pub struct ParseContext<'s> {
    counters: Vec<u32>,
    leaf_names: &'s HashSet<String>,
}

impl<'s> ParseContext<'s> {
    pub(crate) fn new(node_count: usize, leaf_names: &'s HashSet<String>) -> Self {
        Self {
            counters: vec![0; node_count],
            leaf_names,
        }
    }

    /// How many times node `id` consumed tokens so far.
    pub fn count(&self, id: NodeId) -> u32 {
        self.counters.get(id.0).copied().unwrap_or(0)
    }

    /// Whether node `id` consumed tokens at least once.
    pub fn fired(&self, id: NodeId) -> bool {
        self.count(id) > 0
    }

    pub(crate) fn record(&mut self, id: NodeId) {
        if let Some(counter) = self.counters.get_mut(id.0) {
            *counter = counter.saturating_add(1);
        }
    }

    /// Whether `token` should be treated as an option rather than a value.
    ///
    /// Anything starting with `-` (other than a lone `-`) looks like an
    /// option, except a finite number that no leaf in the spec is literally
    /// named.
    pub fn looks_like_option(&self, token: &str) -> bool {
        if !token.starts_with('-') || token == "-" {
            return false;
        }
        !(is_number(token) && !self.leaf_names.contains(token))
    }
}

fn is_number(token: &str) -> bool {
    token.parse::<f64>().is_ok_and(f64::is_finite)
}
