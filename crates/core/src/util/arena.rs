//! Slot storage with free-list reuse and generation-checked handles. Tiles
//! and nodes reference each other by handle only, so the network can reuse
//! slots freely while stale handles get rejected instead of aliasing whatever
//! moved into the slot.

use std::{fmt::Debug, marker::PhantomData};

/// A typed handle into an [Arena]. Implemented via [arena_handle!] for each
/// kind of stored item, so a tile handle can never be used to look up a node.
pub trait ArenaHandle: Copy + Debug + Eq {
    fn from_parts(slot: u32, generation: u32) -> Self;

    /// Index of the slot this handle points to. Slot indices are reused after
    /// removal, so only the (slot, generation) pair is unique.
    fn slot(self) -> u32;

    fn generation(self) -> u32;

    /// Slot index as a usize, for flat buffers that mirror the arena layout
    fn index(self) -> usize {
        self.slot() as usize
    }
}

/// Define a handle type for an [Arena]
#[macro_export]
macro_rules! arena_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Copy,
            Clone,
            Debug,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            derive_more::Display,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[display(fmt = "{}#{}", slot, generation)]
        pub struct $name {
            slot: u32,
            generation: u32,
        }

        impl $crate::util::arena::ArenaHandle for $name {
            fn from_parts(slot: u32, generation: u32) -> Self {
                Self { slot, generation }
            }

            fn slot(self) -> u32 {
                self.slot
            }

            fn generation(self) -> u32 {
                self.generation
            }
        }
    };
}

#[derive(Clone, Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// A vector of optional values with a free list. Removing a value empties
/// its slot and bumps the slot's generation, so any handle issued before the
/// removal no longer resolves.
#[derive(Clone, Debug)]
pub struct Arena<H: ArenaHandle, T> {
    slots: Vec<Slot<T>>,
    free_slots: Vec<u32>,
    len: usize,
    _handle: PhantomData<H>,
}

impl<H: ArenaHandle, T> Default for Arena<H, T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<H: ArenaHandle, T> Arena<H, T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_slots: Vec::new(),
            len: 0,
            _handle: PhantomData,
        }
    }

    /// Store a value, reusing the most recently freed slot if there is one
    pub fn insert(&mut self, value: T) -> H {
        self.len += 1;
        match self.free_slots.pop() {
            Some(slot) => {
                let entry = &mut self.slots[slot as usize];
                debug_assert!(
                    entry.value.is_none(),
                    "free slot {} is full",
                    slot
                );
                entry.value = Some(value);
                H::from_parts(slot, entry.generation)
            }
            None => {
                let slot = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    value: Some(value),
                });
                H::from_parts(slot, 0)
            }
        }
    }

    /// Claim a slot without storing anything yet, so that values that need
    /// each other's handles can be built. The slot counts as live but reads as
    /// empty until [Self::fill] is called.
    pub fn reserve(&mut self) -> H {
        self.len += 1;
        match self.free_slots.pop() {
            Some(slot) => {
                H::from_parts(slot, self.slots[slot as usize].generation)
            }
            None => {
                let slot = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    value: None,
                });
                H::from_parts(slot, 0)
            }
        }
    }

    /// Store a value in a slot claimed by [Self::reserve]. Panics if the
    /// handle is stale or the slot is already full.
    pub fn fill(&mut self, handle: H, value: T) {
        let entry = crate::unwrap!(
            self.slots
                .get_mut(handle.index())
                .filter(|entry| entry.generation == handle.generation()),
            "cannot fill stale handle {:?}",
            handle
        );
        assert!(entry.value.is_none(), "slot for {:?} is already full", handle);
        entry.value = Some(value);
    }

    /// Remove a value. Returns `None` if the handle is stale.
    pub fn remove(&mut self, handle: H) -> Option<T> {
        let entry = self.slots.get_mut(handle.index())?;
        if entry.generation != handle.generation() {
            return None;
        }
        let value = entry.value.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free_slots.push(handle.slot());
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, handle: H) -> Option<&T> {
        self.slots
            .get(handle.index())
            .filter(|entry| entry.generation == handle.generation())
            .and_then(|entry| entry.value.as_ref())
    }

    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index())
            .filter(|entry| entry.generation == handle.generation())
            .and_then(|entry| entry.value.as_mut())
    }

    pub fn contains(&self, handle: H) -> bool {
        self.get(handle).is_some()
    }

    /// Number of live values
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots, live or free. Flat buffers indexed by
    /// [ArenaHandle::index] need to be this long.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Iterate over all live values, in slot order
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> {
        self.slots.iter().enumerate().filter_map(|(slot, entry)| {
            let handle = H::from_parts(slot as u32, entry.generation);
            entry.value.as_ref().map(|value| (handle, value))
        })
    }

    /// Handles of all live values, in slot order
    pub fn handles(&self) -> impl Iterator<Item = H> + '_ {
        self.iter().map(|(handle, _)| handle)
    }
}
