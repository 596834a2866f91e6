//! Tilefall ECS -- group-indexed entity registry with typed queries.
//!
//! Entities are plain values stored in an arena and addressed by generational
//! [`EntityId`](entity::EntityId)s. Each entity is tagged with a fixed set of
//! groups at registration; per-group index sets give deterministic, slot-ordered
//! iteration. Queries are ordered lists of group and predicate filters.
//!
//! # Quick Start
//!
//! ```
//! use tilefall_ecs::prelude::*;
//!
//! #[derive(Debug)]
//! struct Crate { x: i32 }
//!
//! let mut registry = Registry::new();
//! let wall = registry.register_group("wall").unwrap();
//! let render = registry.register_group("render").unwrap();
//!
//! let id = registry.add(Crate { x: 40 }, &[wall, render]).unwrap();
//! assert_eq!(registry.query_group(wall), vec![id]);
//!
//! registry.remove(id).unwrap();
//! assert!(registry.is_empty());
//! ```

#![deny(unsafe_code)]

pub mod entity;
pub mod group;
pub mod query;
pub mod registry;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The entity is absent from a group it should belong to (or the handle
    /// is stale). Always an invariant violation on the caller's side.
    #[error("entity {entity} is not registered in group {group:?}")]
    NotRegistered {
        entity: entity::EntityId,
        group: group::GroupId,
    },

    /// A group set holds a slot whose entity does not claim that group.
    #[error("slot {index} is listed in group {group:?} but does not belong to it")]
    StrayMember { index: u32, group: group::GroupId },

    /// Entities must carry at least one explicit group tag.
    #[error("entity registered with an empty group set")]
    EmptyGroupSet,

    /// A group id that was never registered with this registry.
    #[error("group {0:?} is not registered")]
    UnknownGroup(group::GroupId),

    /// No room left in the group mask.
    #[error("cannot register group '{name}': limit of {max} groups reached", max = group::MAX_GROUPS)]
    GroupCapacity { name: String },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::entity::EntityId;
    pub use crate::group::{GroupId, GroupMask, GroupTable};
    pub use crate::query::{Filter, Query};
    pub use crate::registry::Registry;
    pub use crate::RegistryError;
}
