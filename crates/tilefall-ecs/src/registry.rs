//! The [`Registry`]: an arena of entities plus one index set per group.
//!
//! Entities live in slots addressed by [`EntityId::index`]. Every registered
//! group owns a `BTreeSet` of slot indices, so membership tests are cheap and
//! every query walks entities in ascending slot order. That order is stable
//! for a given sequence of adds and removes, which keeps ticks reproducible.
//!
//! # Membership invariant
//!
//! An entity's slot index is in a group's set **iff** that group is in the
//! entity's [`GroupMask`]. [`Registry::add`] and [`Registry::remove`] touch
//! every group of the mask together; `remove` checks all of them before it
//! changes anything, so a failing removal leaves the registry as it was.

use std::collections::BTreeSet;

use crate::entity::{EntityId, SlotAllocator};
use crate::group::{GroupId, GroupMask, GroupTable};
use crate::query::{Filter, Query};
use crate::RegistryError;

#[derive(Debug)]
struct Entry<T> {
    id: EntityId,
    mask: GroupMask,
    value: T,
}

/// Group-indexed container of live entities.
#[derive(Debug)]
pub struct Registry<T> {
    slots: SlotAllocator,
    entries: Vec<Option<Entry<T>>>,
    groups: GroupTable,
    /// Indexed by `GroupId.0`.
    members: Vec<BTreeSet<u32>>,
}

impl<T> Registry<T> {
    /// An empty registry with only the `"all"` group.
    pub fn new() -> Self {
        Self {
            slots: SlotAllocator::new(),
            entries: Vec::new(),
            groups: GroupTable::new(),
            members: vec![BTreeSet::new()],
        }
    }

    // -- groups -------------------------------------------------------------

    /// Register a group tag (or fetch the id of an existing one).
    pub fn register_group(&mut self, name: &str) -> Result<GroupId, RegistryError> {
        let id = self.groups.register(name)?;
        if self.members.len() <= id.0 as usize {
            self.members.resize_with(id.0 as usize + 1, BTreeSet::new);
        }
        Ok(id)
    }

    pub fn group_table(&self) -> &GroupTable {
        &self.groups
    }

    // -- lifecycle ----------------------------------------------------------

    /// Store `value` and register it under every group in `groups` plus `ALL`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::EmptyGroupSet`] if `groups` is empty.
    /// - [`RegistryError::UnknownGroup`] if a group was never registered.
    pub fn add(&mut self, value: T, groups: &[GroupId]) -> Result<EntityId, RegistryError> {
        if groups.is_empty() {
            return Err(RegistryError::EmptyGroupSet);
        }
        if let Some(&unknown) = groups.iter().find(|g| !self.groups.is_registered(**g)) {
            return Err(RegistryError::UnknownGroup(unknown));
        }

        let id = self.slots.allocate();
        let idx = id.index();
        let mask = GroupMask::from_groups(groups);
        for group in mask.iter() {
            self.members[group.0 as usize].insert(idx);
        }

        if self.entries.len() <= idx as usize {
            self.entries.resize_with(idx as usize + 1, || None);
        }
        self.entries[idx as usize] = Some(Entry { id, mask, value });
        Ok(id)
    }

    /// Deregister `id` from every one of its groups and hand back its value.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotRegistered`] if the handle is stale or if the
    /// entity is missing from any group its mask names. The latter is an
    /// invariant violation; nothing is modified in either case.
    pub fn remove(&mut self, id: EntityId) -> Result<T, RegistryError> {
        let idx = id.index();
        let mask = self
            .entry(id)
            .map(|e| e.mask)
            .ok_or(RegistryError::NotRegistered {
                entity: id,
                group: GroupId::ALL,
            })?;

        if let Some(missing) = mask
            .iter()
            .find(|g| !self.members[g.0 as usize].contains(&idx))
        {
            tracing::error!(
                entity = %id,
                group = ?self.groups.name(missing),
                "group membership out of sync with entity mask"
            );
            return Err(RegistryError::NotRegistered {
                entity: id,
                group: missing,
            });
        }

        for group in mask.iter() {
            self.members[group.0 as usize].remove(&idx);
        }
        self.slots.release(id);
        let entry = self.entries[idx as usize]
            .take()
            .ok_or(RegistryError::NotRegistered {
                entity: id,
                group: GroupId::ALL,
            })?;
        Ok(entry.value)
    }

    // -- access -------------------------------------------------------------

    fn entry(&self, id: EntityId) -> Option<&Entry<T>> {
        self.entries
            .get(id.index() as usize)?
            .as_ref()
            .filter(|e| e.id == id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entry(id).is_some()
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.entry(id).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.entries
            .get_mut(id.index() as usize)?
            .as_mut()
            .filter(|e| e.id == id)
            .map(|e| &mut e.value)
    }

    /// The groups `id` was registered under (always including `ALL`).
    pub fn groups_of(&self, id: EntityId) -> Option<GroupMask> {
        self.entry(id).map(|e| e.mask)
    }

    pub fn is_member(&self, id: EntityId, group: GroupId) -> bool {
        self.entry(id).is_some()
            && self
                .members
                .get(group.0 as usize)
                .is_some_and(|set| set.contains(&id.index()))
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.members[GroupId::ALL.0 as usize].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entities tagged with `group` (0 for unknown groups).
    pub fn group_len(&self, group: GroupId) -> usize {
        self.members.get(group.0 as usize).map_or(0, BTreeSet::len)
    }

    /// Every live entity with its value, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.members[GroupId::ALL.0 as usize].iter().filter_map(|&idx| {
            let entry = self.entries[idx as usize].as_ref()?;
            Some((entry.id, &entry.value))
        })
    }

    // -- queries ------------------------------------------------------------

    /// Evaluate `query` and return the matching ids in slot order.
    ///
    /// The result is an owned snapshot: removing or adding entities while
    /// walking it cannot disturb the walk. Callers that mutate mid-walk must
    /// re-check [`contains`](Self::contains) before touching an id.
    pub fn query(&self, query: &Query<'_, T>) -> Vec<EntityId> {
        let mut running: Vec<u32> = self.members[GroupId::ALL.0 as usize]
            .iter()
            .copied()
            .collect();

        for filter in query.filters() {
            match filter {
                Filter::Group(group) => match self.members.get(group.0 as usize) {
                    Some(set) => running.retain(|idx| set.contains(idx)),
                    None => running.clear(),
                },
                Filter::Where(predicate) => running.retain(|&idx| {
                    self.entries[idx as usize]
                        .as_ref()
                        .is_some_and(|e| predicate(e.id, &e.value))
                }),
            }
            if running.is_empty() {
                break;
            }
        }

        running
            .into_iter()
            .filter_map(|idx| self.slots.current(idx))
            .collect()
    }

    /// Snapshot of every entity tagged with `group`.
    pub fn query_group(&self, group: GroupId) -> Vec<EntityId> {
        self.query(&Query::in_group(group))
    }

    /// First match of `query` in slot order, if any.
    pub fn first(&self, query: &Query<'_, T>) -> Option<EntityId> {
        // Groups are cheap set lookups; walk ALL in order and stop early.
        let groups: Vec<GroupId> = query.groups().collect();
        self.members[GroupId::ALL.0 as usize]
            .iter()
            .filter_map(|&idx| self.entries[idx as usize].as_ref())
            .filter(|e| groups.iter().all(|g| e.mask.contains(*g)))
            .find(|e| {
                query.filters().iter().all(|f| match f {
                    Filter::Group(_) => true,
                    Filter::Where(predicate) => predicate(e.id, &e.value),
                })
            })
            .map(|e| e.id)
    }

    /// `true` if any entity matches `query`.
    pub fn any(&self, query: &Query<'_, T>) -> bool {
        self.first(query).is_some()
    }

    // -- diagnostics --------------------------------------------------------

    /// Check the membership invariant across every group and entity.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotRegistered`] naming the first entity whose mask and
    /// group sets disagree (missing from a group it claims), or
    /// [`RegistryError::StrayMember`] for a group holding an index whose
    /// entity does not claim it.
    pub fn verify_membership(&self) -> Result<(), RegistryError> {
        for entry in self.entries.iter().flatten() {
            let idx = entry.id.index();
            for group in entry.mask.iter() {
                if !self.members[group.0 as usize].contains(&idx) {
                    return Err(RegistryError::NotRegistered {
                        entity: entry.id,
                        group,
                    });
                }
            }
        }
        for (g, set) in self.members.iter().enumerate() {
            let group = GroupId(g as u8);
            for &idx in set {
                let claimed = self
                    .entries
                    .get(idx as usize)
                    .and_then(Option::as_ref)
                    .is_some_and(|e| e.mask.contains(group));
                if !claimed {
                    return Err(RegistryError::StrayMember { index: idx, group });
                }
            }
        }
        Ok(())
    }

    /// Drop `id` from one group's set without touching its mask.
    ///
    /// Only exists to let tests provoke the invariant violation `remove`
    /// must report.
    #[cfg(test)]
    pub(crate) fn corrupt_membership(&mut self, id: EntityId, group: GroupId) {
        self.members[group.0 as usize].remove(&id.index());
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Body {
        x: i32,
        hp: i32,
    }

    struct Tags {
        update: GroupId,
        render: GroupId,
        wall: GroupId,
        enemy: GroupId,
    }

    fn setup() -> (Registry<Body>, Tags) {
        let mut reg = Registry::new();
        let tags = Tags {
            update: reg.register_group("update").unwrap(),
            render: reg.register_group("render").unwrap(),
            wall: reg.register_group("wall").unwrap(),
            enemy: reg.register_group("enemy").unwrap(),
        };
        (reg, tags)
    }

    #[test]
    fn add_registers_every_group_plus_all() {
        let (mut reg, t) = setup();
        let e = reg.add(Body { x: 0, hp: 5 }, &[t.update, t.enemy]).unwrap();

        assert!(reg.is_member(e, GroupId::ALL));
        assert!(reg.is_member(e, t.update));
        assert!(reg.is_member(e, t.enemy));
        assert!(!reg.is_member(e, t.wall));
        assert_eq!(reg.groups_of(e).unwrap().len(), 3);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn add_rejects_empty_and_unknown_groups() {
        let (mut reg, _) = setup();
        assert!(matches!(
            reg.add(Body { x: 0, hp: 0 }, &[]),
            Err(RegistryError::EmptyGroupSet)
        ));
        assert!(matches!(
            reg.add(Body { x: 0, hp: 0 }, &[GroupId(40)]),
            Err(RegistryError::UnknownGroup(_))
        ));
        assert!(reg.is_empty());
    }

    #[test]
    fn remove_deregisters_from_all_groups() {
        let (mut reg, t) = setup();
        let e = reg.add(Body { x: 1, hp: 1 }, &[t.update, t.render]).unwrap();
        let body = reg.remove(e).unwrap();

        assert_eq!(body, Body { x: 1, hp: 1 });
        assert!(!reg.contains(e));
        assert_eq!(reg.group_len(t.update), 0);
        assert_eq!(reg.group_len(t.render), 0);
        assert_eq!(reg.group_len(GroupId::ALL), 0);
        reg.verify_membership().unwrap();
    }

    #[test]
    fn removing_twice_is_not_registered() {
        let (mut reg, t) = setup();
        let e = reg.add(Body { x: 0, hp: 0 }, &[t.update]).unwrap();
        reg.remove(e).unwrap();
        assert!(matches!(
            reg.remove(e),
            Err(RegistryError::NotRegistered { group, .. }) if group == GroupId::ALL
        ));
    }

    #[test]
    fn partial_membership_fails_without_mutation() {
        let (mut reg, t) = setup();
        let e = reg.add(Body { x: 0, hp: 0 }, &[t.update, t.enemy]).unwrap();
        reg.corrupt_membership(e, t.enemy);

        let err = reg.remove(e).unwrap_err();
        assert!(matches!(err, RegistryError::NotRegistered { group, .. } if group == t.enemy));
        // Still present everywhere it was before the failed call.
        assert!(reg.contains(e));
        assert!(reg.is_member(e, t.update));
        assert!(reg.is_member(e, GroupId::ALL));
    }

    #[test]
    fn stale_handle_does_not_resolve_after_recycle() {
        let (mut reg, t) = setup();
        let old = reg.add(Body { x: 0, hp: 0 }, &[t.update]).unwrap();
        reg.remove(old).unwrap();
        let new = reg.add(Body { x: 9, hp: 0 }, &[t.render]).unwrap();

        assert_eq!(new.index(), old.index());
        assert!(reg.get(old).is_none());
        assert!(reg.get_mut(old).is_none());
        assert_eq!(reg.get(new).map(|b| b.x), Some(9));
        assert!(!reg.is_member(old, t.render));
    }

    #[test]
    fn query_intersects_groups_in_order() {
        let (mut reg, t) = setup();
        let a = reg.add(Body { x: 0, hp: 3 }, &[t.update, t.enemy]).unwrap();
        let _b = reg.add(Body { x: 1, hp: 3 }, &[t.update]).unwrap();
        let c = reg.add(Body { x: 2, hp: 3 }, &[t.enemy, t.render]).unwrap();

        assert_eq!(reg.query(&Query::in_group(t.enemy)), vec![a, c]);
        assert_eq!(
            reg.query(&Query::new().group(t.enemy).group(t.update)),
            vec![a]
        );
        assert!(reg.query(&Query::new().group(t.wall)).is_empty());
    }

    #[test]
    fn query_applies_predicates_to_running_set() {
        let (mut reg, t) = setup();
        let _a = reg.add(Body { x: 0, hp: 3 }, &[t.enemy]).unwrap();
        let b = reg.add(Body { x: 50, hp: 3 }, &[t.enemy]).unwrap();
        let _c = reg.add(Body { x: 60, hp: 3 }, &[t.update]).unwrap();

        let far = reg.query(&Query::new().group(t.enemy).filter(|_, body: &Body| body.x > 10));
        assert_eq!(far, vec![b]);
        assert_eq!(
            reg.first(&Query::new().group(t.enemy).filter(|_, body: &Body| body.x > 10)),
            Some(b)
        );
        assert!(!reg.any(&Query::new().group(t.wall)));
    }

    #[test]
    fn empty_query_is_all() {
        let (mut reg, t) = setup();
        let a = reg.add(Body { x: 0, hp: 0 }, &[t.update]).unwrap();
        let b = reg.add(Body { x: 0, hp: 0 }, &[t.wall]).unwrap();
        assert_eq!(reg.query(&Query::new()), vec![a, b]);
    }

    #[test]
    fn snapshot_survives_removal_during_walk() {
        let (mut reg, t) = setup();
        let ids: Vec<_> = (0..4)
            .map(|i| reg.add(Body { x: i, hp: 0 }, &[t.update]).unwrap())
            .collect();

        let snapshot = reg.query_group(t.update);
        let mut visited = Vec::new();
        for id in snapshot {
            if !reg.contains(id) {
                continue;
            }
            visited.push(id);
            // The first entity removes the last one mid-walk.
            if id == ids[0] {
                reg.remove(ids[3]).unwrap();
            }
        }
        assert_eq!(visited, ids[..3].to_vec());
    }

    #[test]
    fn verify_membership_passes_on_healthy_registry() {
        let (mut reg, t) = setup();
        for i in 0..10 {
            reg.add(Body { x: i, hp: 0 }, &[t.update, t.render]).unwrap();
        }
        reg.verify_membership().unwrap();
    }

    #[test]
    fn iter_walks_slot_order() {
        let (mut reg, t) = setup();
        let a = reg.add(Body { x: 1, hp: 0 }, &[t.update]).unwrap();
        let b = reg.add(Body { x: 2, hp: 0 }, &[t.render]).unwrap();
        let xs: Vec<_> = reg.iter().map(|(id, body)| (id, body.x)).collect();
        assert_eq!(xs, vec![(a, 1), (b, 2)]);
    }
}
