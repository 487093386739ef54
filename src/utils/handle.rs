use std::hash::Hash;
use std::marker::PhantomData;

use bytemuck::{Pod, Zeroable};

/// Generational handle to a resource of kind `M`.
///
/// Handles are plain data: 16 bits of slot index and 16 bits of generation.
/// The all-zero handle is the null handle; slot 0 is never allocated, so a
/// `Default` handle can never address a live resource. Handles are `Pod` so
/// they can ride inside serialized command payloads.
#[repr(C)]
pub struct Handle<M> {
    pub slot: u16,
    pub generation: u16,
    phantom: PhantomData<fn() -> M>,
}

impl<M> Handle<M> {
    pub fn new(slot: u16, generation: u16) -> Self {
        Self {
            slot,
            generation,
            phantom: PhantomData,
        }
    }

    /// The null handle. Never addresses a live resource.
    pub fn null() -> Self {
        Self::new(0, 0)
    }

    pub fn is_null(&self) -> bool {
        self.slot == 0
    }
}

impl<M> std::fmt::Debug for Handle<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("slot", &self.slot)
            .field("generation", &self.generation)
            .finish()
    }
}

impl<M> PartialEq for Handle<M> {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot && self.generation == other.generation
    }
}

impl<M> Eq for Handle<M> {}

impl<M> Clone for Handle<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for Handle<M> {}

impl<M> Hash for Handle<M> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.slot.hash(state);
        self.generation.hash(state);
    }
}

impl<M> Default for Handle<M> {
    fn default() -> Self {
        Self::null()
    }
}

unsafe impl<M: 'static> Zeroable for Handle<M> {}
unsafe impl<M: 'static> Pod for Handle<M> {}

/// Fixed-capacity slot pool keyed by [`Handle<M>`].
///
/// The stored payload type `T` is independent of the handle marker `M`, so a
/// backend can hand out abstract handles while keeping its own native entries
/// inside. Freed slots bump their generation, which invalidates every handle
/// that still points at them; `get`/`get_mut` on a stale or null handle return
/// `None` instead of aliasing whatever lives there now.
pub struct Pool<M, T> {
    items: Vec<Option<T>>,
    generations: Vec<u16>,
    empty: Vec<u16>,
    live: usize,
    phantom: PhantomData<fn() -> M>,
}

const DEFAULT_POOL_SIZE: usize = 1024;

impl<M, T> Default for Pool<M, T> {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}

impl<M, T> Pool<M, T> {
    /// Create a pool with room for `capacity` entries. Slot 0 is reserved as
    /// the null slot and is never handed out.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(2, u16::MAX as usize);
        let mut items = Vec::with_capacity(capacity);
        items.resize_with(capacity, || None);
        Self {
            items,
            generations: vec![0; capacity],
            // Reverse order so low slots are handed out first.
            empty: (1..capacity as u16).rev().collect(),
            live: 0,
            phantom: PhantomData,
        }
    }

    /// Insert an item, returning its handle. `None` when every slot is taken.
    pub fn insert(&mut self, item: T) -> Option<Handle<M>> {
        let slot = self.empty.pop()?;
        self.items[slot as usize] = Some(item);
        self.live += 1;
        Some(Handle::new(slot, self.generations[slot as usize]))
    }

    pub fn get(&self, handle: Handle<M>) -> Option<&T> {
        let slot = handle.slot as usize;
        if slot >= self.items.len() || self.generations[slot] != handle.generation {
            return None;
        }
        self.items[slot].as_ref()
    }

    pub fn get_mut(&mut self, handle: Handle<M>) -> Option<&mut T> {
        let slot = handle.slot as usize;
        if slot >= self.items.len() || self.generations[slot] != handle.generation {
            return None;
        }
        self.items[slot].as_mut()
    }

    /// Remove the item addressed by `handle`, invalidating the handle and
    /// every copy of it. Returns the payload so the caller can tear it down.
    pub fn remove(&mut self, handle: Handle<M>) -> Option<T> {
        let slot = handle.slot as usize;
        if slot >= self.items.len() || self.generations[slot] != handle.generation {
            return None;
        }
        let item = self.items[slot].take()?;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.empty.push(handle.slot);
        self.live -= 1;
        Some(item)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    #[test]
    fn default_handle_is_null() {
        let h = Handle::<Marker>::default();
        assert!(h.is_null());
        let pool: Pool<Marker, u32> = Pool::new(8);
        assert!(pool.get(h).is_none());
    }

    #[test]
    fn insert_get_remove() {
        let mut pool: Pool<Marker, u32> = Pool::new(8);
        let a = pool.insert(7).unwrap();
        let b = pool.insert(9).unwrap();
        assert_ne!(a, b);
        assert_eq!(pool.get(a), Some(&7));
        assert_eq!(pool.get(b), Some(&9));
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.remove(a), Some(7));
        assert_eq!(pool.len(), 1);
        assert!(pool.get(a).is_none());
    }

    #[test]
    fn stale_handle_is_rejected_after_slot_reuse() {
        let mut pool: Pool<Marker, u32> = Pool::new(2);
        let a = pool.insert(1).unwrap();
        pool.remove(a).unwrap();
        let b = pool.insert(2).unwrap();
        // Slot reused, generation bumped.
        assert_eq!(a.slot, b.slot);
        assert_ne!(a.generation, b.generation);
        assert!(pool.get(a).is_none());
        assert_eq!(pool.get(b), Some(&2));
    }

    #[test]
    fn exhaustion_returns_none() {
        let mut pool: Pool<Marker, u32> = Pool::new(2);
        assert!(pool.insert(0).is_some());
        assert!(pool.insert(1).is_none());
    }
}
