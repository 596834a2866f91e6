//! Group tags and their registration.
//!
//! Groups are registered by name once, at startup, and referred to by a
//! [`GroupId`] afterwards. Each entity records the groups it was added under
//! as a [`GroupMask`]; the implicit [`GroupId::ALL`] group is always part of
//! that mask.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::RegistryError;

/// Upper bound on registered groups, fixed by the width of [`GroupMask`].
pub const MAX_GROUPS: usize = 64;

// ---------------------------------------------------------------------------
// GroupId
// ---------------------------------------------------------------------------

/// Opaque identifier for a registered group tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub(crate) u8);

impl GroupId {
    /// The universal group every live entity belongs to.
    pub const ALL: GroupId = GroupId(0);

    /// Position of this group in a [`GroupMask`].
    #[inline]
    pub fn bit(self) -> u64 {
        1u64 << self.0
    }
}

impl fmt::Debug for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupId({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// GroupMask
// ---------------------------------------------------------------------------

/// The exact set of groups an entity was registered under, plus `ALL`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupMask(u64);

impl GroupMask {
    /// A mask holding only [`GroupId::ALL`].
    pub fn all_only() -> Self {
        Self(GroupId::ALL.bit())
    }

    /// Build a mask from explicit groups; `ALL` is always added.
    pub fn from_groups(groups: &[GroupId]) -> Self {
        groups
            .iter()
            .fold(Self::all_only(), |mask, g| mask.with(*g))
    }

    /// This mask with `group` added.
    #[must_use]
    pub fn with(self, group: GroupId) -> Self {
        Self(self.0 | group.bit())
    }

    pub fn contains(self, group: GroupId) -> bool {
        self.0 & group.bit() != 0
    }

    /// Groups in ascending id order, `ALL` first.
    pub fn iter(self) -> impl Iterator<Item = GroupId> {
        (0..MAX_GROUPS as u8)
            .map(GroupId)
            .filter(move |g| self.contains(*g))
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for GroupMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|g| g.0)).finish()
    }
}

// ---------------------------------------------------------------------------
// GroupTable
// ---------------------------------------------------------------------------

/// Name <-> id table for registered groups.
///
/// Registering a name twice returns the id it already has.
#[derive(Debug)]
pub struct GroupTable {
    by_name: HashMap<String, GroupId>,
    names: Vec<String>,
}

impl GroupTable {
    /// A table holding only the built-in `"all"` group.
    pub fn new() -> Self {
        let mut table = Self {
            by_name: HashMap::new(),
            names: Vec::new(),
        };
        table.names.push("all".to_owned());
        table.by_name.insert("all".to_owned(), GroupId::ALL);
        table
    }

    /// Register `name`, or return its existing id.
    ///
    /// # Errors
    ///
    /// [`RegistryError::GroupCapacity`] once [`MAX_GROUPS`] names exist.
    pub fn register(&mut self, name: &str) -> Result<GroupId, RegistryError> {
        if let Some(&existing) = self.by_name.get(name) {
            return Ok(existing);
        }
        if self.names.len() >= MAX_GROUPS {
            return Err(RegistryError::GroupCapacity {
                name: name.to_owned(),
            });
        }
        let id = GroupId(self.names.len() as u8);
        self.names.push(name.to_owned());
        self.by_name.insert(name.to_owned(), id);
        Ok(id)
    }

    pub fn lookup(&self, name: &str) -> Option<GroupId> {
        self.by_name.get(name).copied()
    }

    /// The name a group was registered under.
    pub fn name(&self, id: GroupId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    pub fn is_registered(&self, id: GroupId) -> bool {
        (id.0 as usize) < self.names.len()
    }

    /// Number of registered groups, including `"all"`.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for GroupTable {
    fn default() -> Self {
        Self::new()
    }
}
