//! Entity handles and slot allocation.
//!
//! An [`EntityId`] names one arena slot: a stable *index* (low 32 bits) plus a
//! *generation* (high 32 bits) that is bumped whenever the slot is freed. A
//! handle kept across a removal (a bullet's owner that has since died, say)
//! therefore stops resolving instead of silently pointing at a newer entity.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// A generational entity handle.
///
/// Layout: `[generation: u32 | index: u32]`
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Build a handle from a slot index and generation.
    #[inline]
    pub fn new(index: u32, generation: u32) -> Self {
        Self((generation as u64) << 32 | index as u64)
    }

    /// The arena slot this handle addresses.
    #[inline]
    pub fn index(self) -> u32 {
        self.0 as u32
    }

    /// How many times the slot had been recycled when this handle was issued.
    #[inline]
    pub fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({}v{})", self.index(), self.generation())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

// ---------------------------------------------------------------------------
// SlotAllocator
// ---------------------------------------------------------------------------

/// Hands out arena slots and recycles them with a bumped generation.
///
/// Freed indices are reused FIFO, so a short-lived entity (a bullet) does not
/// keep churning through the same slot and its generation counter.
#[derive(Debug, Default)]
pub(crate) struct SlotAllocator {
    generations: Vec<u32>,
    live: Vec<bool>,
    free: VecDeque<u32>,
}

impl SlotAllocator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Reserve a slot, reusing the oldest freed index when one exists.
    pub(crate) fn allocate(&mut self) -> EntityId {
        if let Some(index) = self.free.pop_front() {
            self.live[index as usize] = true;
            EntityId::new(index, self.generations[index as usize])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.live.push(true);
            EntityId::new(index, 0)
        }
    }

    /// Release a slot. Returns `false` for stale or already-freed handles.
    pub(crate) fn release(&mut self, id: EntityId) -> bool {
        if !self.is_live(id) {
            return false;
        }
        let idx = id.index() as usize;
        self.live[idx] = false;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free.push_back(id.index());
        true
    }

    /// `true` if `id` is the current occupant of its slot.
    pub(crate) fn is_live(&self, id: EntityId) -> bool {
        let idx = id.index() as usize;
        idx < self.generations.len() && self.live[idx] && self.generations[idx] == id.generation()
    }

    /// The handle currently occupying `index`, if any.
    pub(crate) fn current(&self, index: u32) -> Option<EntityId> {
        let idx = index as usize;
        (idx < self.live.len() && self.live[idx]).then(|| EntityId::new(index, self.generations[idx]))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_unique_indices() {
        let mut slots = SlotAllocator::new();
        let mut indices: Vec<u32> = (0..64).map(|_| slots.allocate().index()).collect();
        indices.sort();
        indices.dedup();
        assert_eq!(indices.len(), 64);
    }

    #[test]
    fn recycled_slot_gets_new_generation() {
        let mut slots = SlotAllocator::new();
        let bullet = slots.allocate();
        assert!(slots.release(bullet));
        let next = slots.allocate();
        assert_eq!(next.index(), bullet.index());
        assert_eq!(next.generation(), 1);
        assert!(!slots.is_live(bullet), "old handle must not resolve");
        assert!(slots.is_live(next));
    }

    #[test]
    fn double_release_is_rejected() {
        let mut slots = SlotAllocator::new();
        let e = slots.allocate();
        assert!(slots.release(e));
        assert!(!slots.release(e));
    }

    #[test]
    fn current_reports_occupant() {
        let mut slots = SlotAllocator::new();
        let a = slots.allocate();
        assert_eq!(slots.current(a.index()), Some(a));
        slots.release(a);
        assert_eq!(slots.current(a.index()), None);
        assert_eq!(slots.current(99), None);
    }

    #[test]
    fn id_packs_index_and_generation() {
        let id = EntityId::new(42, 7);
        assert_eq!(id.index(), 42);
        assert_eq!(id.generation(), 7);
        assert_eq!(id.to_string(), "42v7");
    }
}
