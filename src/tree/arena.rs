//! Generational slot storage backing the node and attribute arenas.
//!
//! Slot 0 is a permanent placeholder so indices fit in `NonZeroU32`.
//! Freed slots go on a free list and their generation is bumped, so a
//! handle minted before the free never matches the slot's next occupant.

use std::num::NonZeroU32;
use std::ops::{Index, IndexMut};

/// Raw slot index shared by node and attribute arenas.
pub(crate) type SlotIndex = NonZeroU32;

#[derive(Debug, Clone)]
enum Slot<T> {
    Occupied { generation: u32, value: T },
    Vacant { generation: u32 },
}

#[derive(Debug, Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<SlotIndex>,
    live: usize,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: vec![Slot::Vacant { generation: 0 }],
            free: Vec::new(),
            live: 0,
        }
    }

    /// Stores `value` and returns its slot.
    ///
    /// # Panics
    ///
    /// Panics if the arena would exceed `u32::MAX` slots.
    #[allow(clippy::expect_used)]
    pub fn insert(&mut self, value: T) -> SlotIndex {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index.get() as usize];
            let generation = match *slot {
                Slot::Vacant { generation } | Slot::Occupied { generation, .. } => generation,
            };
            *slot = Slot::Occupied { generation, value };
            return index;
        }
        let index = u32::try_from(self.slots.len())
            .ok()
            .and_then(NonZeroU32::new)
            .expect("arena index overflow");
        self.slots.push(Slot::Occupied {
            generation: 0,
            value,
        });
        index
    }

    /// Frees a slot, returning its value if it was occupied.
    pub fn remove(&mut self, index: SlotIndex) -> Option<T> {
        let slot = self.slots.get_mut(index.get() as usize)?;
        let Slot::Occupied { generation, .. } = *slot else {
            return None;
        };
        let old = std::mem::replace(
            slot,
            Slot::Vacant {
                generation: generation.wrapping_add(1),
            },
        );
        self.free.push(index);
        self.live -= 1;
        match old {
            Slot::Occupied { value, .. } => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    /// Returns the generation of an occupied slot.
    pub fn generation(&self, index: SlotIndex) -> Option<u32> {
        match self.slots.get(index.get() as usize)? {
            Slot::Occupied { generation, .. } => Some(*generation),
            Slot::Vacant { .. } => None,
        }
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.live
    }
}

impl<T> Index<SlotIndex> for Arena<T> {
    type Output = T;

    fn index(&self, index: SlotIndex) -> &T {
        match &self.slots[index.get() as usize] {
            Slot::Occupied { value, .. } => value,
            Slot::Vacant { .. } => panic!("access to freed slot {index}"),
        }
    }
}

impl<T> IndexMut<SlotIndex> for Arena<T> {
    fn index_mut(&mut self, index: SlotIndex) -> &mut T {
        match &mut self.slots[index.get() as usize] {
            Slot::Occupied { value, .. } => value,
            Slot::Vacant { .. } => panic!("access to freed slot {index}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_index() {
        let mut arena = Arena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");
        assert_eq!(a.get(), 1);
        assert_eq!(arena[a], "a");
        assert_eq!(arena[b], "b");
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_remove_bumps_generation_and_reuses_slot() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        assert_eq!(arena.generation(a), Some(0));
        assert_eq!(arena.remove(a), Some(1));
        assert_eq!(arena.generation(a), None);
        assert_eq!(arena.remove(a), None);
        assert_eq!(arena.len(), 0);

        let again = arena.insert(2);
        assert_eq!(again, a);
        assert_eq!(arena.generation(again), Some(1));
    }

    #[test]
    #[should_panic(expected = "freed slot")]
    fn test_index_freed_slot_panics() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        arena.remove(a);
        let value: i32 = arena[a];
        assert_eq!(value, 1);
    }
}
