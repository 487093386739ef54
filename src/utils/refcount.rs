use std::sync::atomic::{AtomicU32, Ordering};

use super::handle::{Handle, Pool};

/// Intrusive reference count shared by every GPU resource.
///
/// The count starts at **zero**: creating a resource does not add a reference
/// on behalf of the creator. A caller that retains a handle past the call
/// that produced it is responsible for adding its own reference.
///
/// `add_ref` and `release` are lock-free and safe to call from multiple
/// threads concurrently; the resource *content* carries no such guarantee.
#[derive(Debug, Default)]
pub struct RefCount(AtomicU32);

impl RefCount {
    pub fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Increment and return the new count.
    pub fn add_ref(&self) -> u32 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Decrement and return the new count. Releasing a resource whose count
    /// is already zero is a double-free in the caller; it trips an assertion
    /// in debug builds and saturates at zero in release builds.
    pub fn release(&self) -> u32 {
        let mut current = self.0.load(Ordering::Acquire);
        loop {
            debug_assert!(current > 0, "release() without a matching add_ref()");
            if current == 0 {
                return 0;
            }
            match self.0.compare_exchange_weak(
                current,
                current - 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return current - 1,
                Err(observed) => current = observed,
            }
        }
    }

    pub fn count(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }
}

/// Result of releasing one reference on a table entry.
#[derive(Debug)]
pub enum ReleaseOutcome<T> {
    /// References remain; the new count is returned.
    Alive(u32),
    /// The count went 1 -> 0. The entry has been removed from the table and
    /// its payload is handed back so the owning backend can free any native
    /// object through its own allocator.
    Destroyed(T),
    /// The handle addressed no live entry (stale, null, or double-released).
    NotFound,
}

struct Entry<T> {
    payload: T,
    refs: RefCount,
    debug_name: Option<Box<str>>,
}

/// A pool of resources that own an intrusive [`RefCount`] each.
///
/// Destruction happens exactly on the 1 -> 0 transition of [`release`]:
/// the slot is freed (stale handles go dead) and the payload is returned to
/// the caller. Entries are never destroyed while references remain, and a
/// destroyed entry can never be destroyed again because its handle no longer
/// resolves.
///
/// [`release`]: ResourceTable::release
pub struct ResourceTable<M, T> {
    pool: Pool<M, Entry<T>>,
}

impl<M, T> Default for ResourceTable<M, T> {
    fn default() -> Self {
        Self {
            pool: Pool::default(),
        }
    }
}

impl<M, T> ResourceTable<M, T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            pool: Pool::new(capacity),
        }
    }

    /// Insert a new resource with a reference count of zero.
    pub fn insert(&mut self, payload: T, debug_name: &str) -> Option<Handle<M>> {
        let debug_name = (!debug_name.is_empty()).then(|| debug_name.into());
        self.pool.insert(Entry {
            payload,
            refs: RefCount::new(),
            debug_name,
        })
    }

    /// Add one reference. `None` when the handle addresses no live entry.
    pub fn add_ref(&self, handle: Handle<M>) -> Option<u32> {
        self.pool.get(handle).map(|e| e.refs.add_ref())
    }

    /// Release one reference, destroying the entry on the 1 -> 0 transition.
    pub fn release(&mut self, handle: Handle<M>) -> ReleaseOutcome<T> {
        let Some(entry) = self.pool.get(handle) else {
            debug_assert!(false, "release() on a dead resource handle");
            return ReleaseOutcome::NotFound;
        };
        let remaining = entry.refs.release();
        if remaining == 0 {
            let entry = self.pool.remove(handle).unwrap();
            ReleaseOutcome::Destroyed(entry.payload)
        } else {
            ReleaseOutcome::Alive(remaining)
        }
    }

    pub fn get(&self, handle: Handle<M>) -> Option<&T> {
        self.pool.get(handle).map(|e| &e.payload)
    }

    pub fn get_mut(&mut self, handle: Handle<M>) -> Option<&mut T> {
        self.pool.get_mut(handle).map(|e| &mut e.payload)
    }

    pub fn ref_count(&self, handle: Handle<M>) -> Option<u32> {
        self.pool.get(handle).map(|e| e.refs.count())
    }

    pub fn debug_name(&self, handle: Handle<M>) -> Option<&str> {
        self.pool.get(handle)?.debug_name.as_deref()
    }

    /// Number of live entries, counted or not.
    pub fn live(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Marker;

    #[test]
    fn count_starts_at_zero() {
        let refs = RefCount::new();
        assert_eq!(refs.count(), 0);
        assert_eq!(refs.add_ref(), 1);
        assert_eq!(refs.add_ref(), 2);
        assert_eq!(refs.release(), 1);
        assert_eq!(refs.release(), 0);
    }

    #[test]
    fn balanced_add_release_destroys_exactly_once() {
        let mut table: ResourceTable<Marker, &'static str> = ResourceTable::new(8);
        let h = table.insert("payload", "buffer").unwrap();
        const N: u32 = 5;
        for i in 0..N {
            assert_eq!(table.add_ref(h), Some(i + 1));
        }
        let mut destroyed = 0;
        for _ in 0..N {
            if let ReleaseOutcome::Destroyed(p) = table.release(h) {
                assert_eq!(p, "payload");
                destroyed += 1;
            }
        }
        assert_eq!(destroyed, 1);
        assert!(table.is_empty());
        assert!(table.get(h).is_none());
    }

    #[test]
    fn release_below_destruction_keeps_entry_alive() {
        let mut table: ResourceTable<Marker, u32> = ResourceTable::new(8);
        let h = table.insert(42, "").unwrap();
        table.add_ref(h);
        table.add_ref(h);
        assert!(matches!(table.release(h), ReleaseOutcome::Alive(1)));
        assert_eq!(table.get(h), Some(&42));
        assert_eq!(table.ref_count(h), Some(1));
    }

    #[test]
    fn concurrent_add_release_is_balanced() {
        let refs = Arc::new(RefCount::new());
        refs.add_ref();
        let mut joins = Vec::new();
        for _ in 0..4 {
            let refs = Arc::clone(&refs);
            joins.push(std::thread::spawn(move || {
                for _ in 0..1000 {
                    refs.add_ref();
                    refs.release();
                }
            }));
        }
        for j in joins {
            j.join().unwrap();
        }
        assert_eq!(refs.count(), 1);
    }

    #[test]
    fn debug_names_are_kept() {
        let mut table: ResourceTable<Marker, ()> = ResourceTable::new(8);
        let named = table.insert((), "shadow map").unwrap();
        let anon = table.insert((), "").unwrap();
        assert_eq!(table.debug_name(named), Some("shadow map"));
        assert_eq!(table.debug_name(anon), None);
    }
}
