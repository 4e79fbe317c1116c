//! Predicate-based filtering over instance snapshots.

use std::marker::PhantomData;

use crate::domain::models::ServerInstance;

/// A filter criterion over entities of type `T`.
///
/// Criteria are first-class values; any `Fn(&T) -> bool` closure
/// qualifies through the blanket impl.
pub trait Criterion<T> {
    /// Whether the candidate matches this criterion.
    fn matches(&self, candidate: &T) -> bool;
}

impl<T, F> Criterion<T> for F
where
    F: Fn(&T) -> bool,
{
    fn matches(&self, candidate: &T) -> bool {
        self(candidate)
    }
}

/// Matches instances by server group.
///
/// An empty target group is a deliberate wildcard: every instance
/// matches, regardless of its own group key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCriterion {
    group: String,
}

impl GroupCriterion {
    /// Build a criterion for the given group key.
    pub fn new(group: impl Into<String>) -> Self {
        Self { group: group.into() }
    }
}

impl Criterion<ServerInstance> for GroupCriterion {
    fn matches(&self, candidate: &ServerInstance) -> bool {
        self.group.is_empty() || candidate.group == self.group
    }
}

/// Pure predicate-based filtering over an ordered entity sequence.
///
/// Produces a new list preserving the relative order of matches; the
/// input is never mutated.
#[derive(Debug, Default, Clone, Copy)]
pub struct EntityFilter<T> {
    _marker: PhantomData<fn(&T)>,
}

impl<T: Clone> EntityFilter<T> {
    /// Create a filter for entities of type `T`.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    /// Apply a criterion, returning the matching subsequence.
    pub fn apply(&self, criterion: &impl Criterion<T>, entities: &[T]) -> Vec<T> {
        entities
            .iter()
            .filter(|candidate| criterion.matches(candidate))
            .cloned()
            .collect()
    }
}
