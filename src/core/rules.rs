//! Sets of destination states.

use super::state::State;
use std::collections::hash_set::{self, HashSet};

/// The destinations reachable from one source state.
///
/// An empty set marks a terminal state. Sets handed out by a machine are
/// owned copies: changing them never touches the machine's registry.
///
/// # Example
///
/// ```rust
/// use statekeeper::core::TransitionRuleSet;
///
/// let mut rules = TransitionRuleSet::new();
/// rules.insert("finishing");
/// rules.insert("aborted");
/// rules.insert("aborted");
///
/// assert_eq!(rules.len(), 2);
/// assert!(rules.contains(&"aborted"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionRuleSet<S: State> {
    destinations: HashSet<S>,
}

impl<S: State> Default for TransitionRuleSet<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> TransitionRuleSet<S> {
    pub fn new() -> Self {
        Self {
            destinations: HashSet::new(),
        }
    }

    /// Add a destination. Returns `false` if it was already present.
    pub fn insert(&mut self, destination: S) -> bool {
        self.destinations.insert(destination)
    }

    pub fn contains(&self, destination: &S) -> bool {
        self.destinations.contains(destination)
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    /// Iterate over the destinations in arbitrary order.
    pub fn iter(&self) -> hash_set::Iter<'_, S> {
        self.destinations.iter()
    }
}

impl<S: State> Extend<S> for TransitionRuleSet<S> {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.destinations.extend(iter);
    }
}

impl<S: State> FromIterator<S> for TransitionRuleSet<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            destinations: iter.into_iter().collect(),
        }
    }
}

impl<S: State> IntoIterator for TransitionRuleSet<S> {
    type Item = S;
    type IntoIter = hash_set::IntoIter<S>;

    fn into_iter(self) -> Self::IntoIter {
        self.destinations.into_iter()
    }
}

impl<'a, S: State> IntoIterator for &'a TransitionRuleSet<S> {
    type Item = &'a S;
    type IntoIter = hash_set::Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.destinations.iter()
    }
}
