//! # Free list
//!
//! A growable array with O(1) erase and slot reuse. Values are addressed by
//! stable `usize` handles, so other structures can link to them by index
//! instead of by reference.
//!
//! Erased slots form a singly-linked chain threaded through the slots
//! themselves: a free slot stores the handle of the next free slot. The most
//! recently erased slot is reused first.

#[derive(Debug, Clone)]
enum Slot<T> {
    Occupied(T),
    Free { next: Option<usize> },
}

#[derive(Debug, Clone)]
pub struct FreeList<T> {
    slots: Vec<Slot<T>>,
    first_free: Option<usize>,
    live: usize,
}

impl<T> Default for FreeList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FreeList<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            first_free: None,
            live: 0,
        }
    }

    /// Store `value` and return its handle.
    ///
    /// Reuses the most recently erased slot if there is one, otherwise appends.
    pub fn insert(&mut self, value: T) -> usize {
        self.live += 1;
        match self.first_free {
            Some(index) => {
                if let Slot::Free { next } = self.slots[index] {
                    self.first_free = next;
                }
                self.slots[index] = Slot::Occupied(value);
                index
            }
            None => {
                self.slots.push(Slot::Occupied(value));
                self.slots.len() - 1
            }
        }
    }

    /// Free the slot behind `handle` and return its value.
    ///
    /// Erasing an already free handle is a no-op returning `None`.
    pub fn erase(&mut self, handle: usize) -> Option<T> {
        let slot = self.slots.get_mut(handle)?;
        if matches!(slot, Slot::Free { .. }) {
            return None;
        }
        let old = std::mem::replace(slot, Slot::Free { next: self.first_free });
        self.first_free = Some(handle);
        self.live -= 1;
        match old {
            Slot::Occupied(value) => Some(value),
            Slot::Free { .. } => None,
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.first_free = None;
        self.live = 0;
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of slots, live or free. Handles are always below this.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, handle: usize) -> Option<&T> {
        match self.slots.get(handle) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, handle: usize) -> Option<&mut T> {
        match self.slots.get_mut(handle) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Live values with their handles, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| match slot {
            Slot::Occupied(value) => Some((i, value)),
            Slot::Free { .. } => None,
        })
    }
}

/// Panics on an erased or out of range handle.
impl<T> std::ops::Index<usize> for FreeList<T> {
    type Output = T;

    fn index(&self, handle: usize) -> &T {
        match &self.slots[handle] {
            Slot::Occupied(value) => value,
            Slot::Free { .. } => panic!("free list handle {handle} was erased"),
        }
    }
}

impl<T> std::ops::IndexMut<usize> for FreeList<T> {
    fn index_mut(&mut self, handle: usize) -> &mut T {
        match &mut self.slots[handle] {
            Slot::Occupied(value) => value,
            Slot::Free { .. } => panic!("free list handle {handle} was erased"),
        }
    }
}
