//! Typed filter combinator for registry queries.
//!
//! A [`Query`] is an ordered list of filters evaluated against a running
//! result set that starts as the `ALL` group:
//!
//! - [`Filter::Group`] intersects the running set with a group's members.
//! - [`Filter::Where`] keeps only entities the predicate accepts.
//!
//! Filters run in the order they were added, so a cheap group filter placed
//! first narrows the set before any predicate is called.
//!
//! ```
//! use tilefall_ecs::prelude::*;
//!
//! let mut registry: Registry<i32> = Registry::new();
//! let enemy = registry.register_group("enemy").unwrap();
//! let a = registry.add(5, &[enemy]).unwrap();
//! let _b = registry.add(-3, &[enemy]).unwrap();
//!
//! let alive = registry.query(&Query::new().group(enemy).filter(|_, hp: &i32| *hp > 0));
//! assert_eq!(alive, vec![a]);
//! ```

use std::fmt;

use crate::entity::EntityId;
use crate::group::GroupId;

/// Boxed entity predicate.
pub type Predicate<'q, T> = Box<dyn Fn(EntityId, &T) -> bool + 'q>;

/// One step of a query.
pub enum Filter<'q, T> {
    /// Keep entities tagged with this group.
    Group(GroupId),
    /// Keep entities the predicate accepts.
    Where(Predicate<'q, T>),
}

impl<T> fmt::Debug for Filter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Group(g) => f.debug_tuple("Group").field(g).finish(),
            Filter::Where(_) => f.write_str("Where(<predicate>)"),
        }
    }
}

/// An ordered conjunction of [`Filter`]s.
pub struct Query<'q, T> {
    filters: Vec<Filter<'q, T>>,
}

impl<'q, T> Query<'q, T> {
    /// The empty query, which matches every live entity.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Shorthand for `Query::new().group(group)`.
    pub fn in_group(group: GroupId) -> Self {
        Self::new().group(group)
    }

    /// Intersect with `group`.
    #[must_use]
    pub fn group(mut self, group: GroupId) -> Self {
        self.filters.push(Filter::Group(group));
        self
    }

    /// Keep only entities for which `predicate` returns `true`.
    #[must_use]
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(EntityId, &T) -> bool + 'q,
    {
        self.filters.push(Filter::Where(Box::new(predicate)));
        self
    }

    pub fn filters(&self) -> &[Filter<'q, T>] {
        &self.filters
    }

    /// Group filters only, in order.
    pub(crate) fn groups(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.filters.iter().filter_map(|f| match f {
            Filter::Group(g) => Some(*g),
            Filter::Where(_) => None,
        })
    }
}

impl<T> Default for Query<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Query<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.filters).finish()
    }
}
