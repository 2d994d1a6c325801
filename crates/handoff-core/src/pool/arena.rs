//! Slot arena with an intrusive index free list.

use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU32, Ordering};

/// Process-wide pool id counter, used to catch cross-pool handle misuse.
static NEXT_POOL_ID: AtomicU32 = AtomicU32::new(0);

/// Handle to a live slot in a [`FixedPool`].
///
/// A `PoolSlot` is deliberately neither `Clone` nor `Copy`: releasing
/// consumes the handle, so a double release of the same handle does not
/// compile. The handle records which pool issued it; presenting it to a
/// different pool panics.
#[derive(Debug)]
pub struct PoolSlot {
    index: usize,
    pool: u32,
}

impl PoolSlot {
    /// The slot index inside the owning pool, for diagnostics.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Fixed-capacity object pool with O(1) acquire and release.
///
/// Owns `N` slots of uninitialized storage. Each slot is either *free*
/// (linked into an intrusive free list via a stored index) or *live*
/// (holding a constructed `T`). Objects are constructed in place on
/// [`acquire`](Self::acquire) and dropped in place on
/// [`release`](Self::release); the pool never touches the heap after
/// construction.
///
/// On exhaustion `acquire` returns `None` — it never blocks and never
/// allocates. The caller owns the exhaustion policy (reject, retry later,
/// or displace something it controls).
///
/// # Example
///
/// ```rust
/// use handoff_core::FixedPool;
///
/// let mut pool: FixedPool<u64, 2> = FixedPool::new();
///
/// let a = pool.acquire().expect("pool is fresh");
/// let b = pool.acquire().expect("one slot left");
/// assert!(pool.acquire().is_none()); // exhausted, not an error
///
/// *pool.get_mut(&a) = 42;
/// assert_eq!(*pool.get(&a), 42);
///
/// pool.release(a);
/// pool.release(b);
/// assert_eq!(pool.available(), 2);
/// ```
///
/// # Thread Safety
///
/// Not thread-safe; all operations take `&mut self` or borrow a handle.
/// Give each execution context its own pool, or gate shared access behind
/// the caller's synchronization.
#[derive(Debug)]
pub struct FixedPool<T, const N: usize> {
    /// Slot storage; `slots[i]` is initialized exactly when `live[i]`.
    slots: [MaybeUninit<T>; N],
    /// Intrusive free-list links; `next[i]` is meaningful only while slot
    /// `i` is free. `N` is the NIL sentinel.
    next: [usize; N],
    /// Head of the free list, `N` when exhausted.
    head: usize,
    /// Per-slot live tags, checked on every handle dereference in debug.
    live: [bool; N],
    /// Number of free slots. `free_count + in_use() == N` always.
    free_count: usize,
    /// Peak simultaneous live count since construction.
    high_water: usize,
    /// This pool's id, stamped into every handle it issues.
    id: u32,
}

impl<T, const N: usize> FixedPool<T, N> {
    /// Create a pool with all `N` slots free.
    ///
    /// Links are pre-seeded so slot `i` chains to `i + 1` and the last slot
    /// carries the NIL sentinel. No `T` is constructed here.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| MaybeUninit::uninit()),
            next: std::array::from_fn(|i| i + 1),
            head: 0,
            live: [false; N],
            free_count: N,
            high_water: 0,
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Acquire a slot, default-constructing its tenant in place.
    ///
    /// Returns `None` when the pool is exhausted. The returned handle stays
    /// valid until passed back to [`release`](Self::release) or
    /// [`reclaim`](Self::reclaim).
    #[inline]
    pub fn acquire(&mut self) -> Option<PoolSlot>
    where
        T: Default,
    {
        self.acquire_with(T::default)
    }

    /// Acquire a slot, constructing its tenant from `init`.
    ///
    /// `init` runs only if a slot is available.
    #[inline]
    pub fn acquire_with(&mut self, init: impl FnOnce() -> T) -> Option<PoolSlot> {
        if self.head == N {
            return None;
        }

        let index = self.head;
        self.head = self.next[index];
        self.slots[index].write(init());
        self.live[index] = true;
        self.free_count -= 1;
        self.high_water = self.high_water.max(N - self.free_count);

        Some(PoolSlot {
            index,
            pool: self.id,
        })
    }

    /// Borrow the tenant of a live slot.
    ///
    /// # Panics
    ///
    /// Panics if the handle was issued by a different pool.
    #[inline]
    #[must_use]
    pub fn get(&self, slot: &PoolSlot) -> &T {
        let index = self.checked_index(slot);
        // SAFETY: `checked_index` verified the slot belongs to this pool,
        // and handles are linear (release consumes them), so `live[index]`
        // holds and the slot was initialized by `acquire_with`.
        #[allow(unsafe_code)]
        unsafe {
            self.slots[index].assume_init_ref()
        }
    }

    /// Mutably borrow the tenant of a live slot.
    ///
    /// # Panics
    ///
    /// Panics if the handle was issued by a different pool.
    #[inline]
    pub fn get_mut(&mut self, slot: &PoolSlot) -> &mut T {
        let index = self.checked_index(slot);
        // SAFETY: Same reasoning as `get`.
        #[allow(unsafe_code)]
        unsafe {
            self.slots[index].assume_init_mut()
        }
    }

    /// Release a slot, dropping its tenant and returning the slot to the
    /// free list.
    ///
    /// Consuming the handle makes a second release of the same handle a
    /// compile error rather than a runtime corruption.
    ///
    /// # Panics
    ///
    /// Panics if the handle was issued by a different pool.
    #[inline]
    pub fn release(&mut self, slot: PoolSlot) {
        let index = self.checked_index(&slot);
        // SAFETY: The slot is live (see `get`), so the storage holds an
        // initialized T that has not been dropped.
        #[allow(unsafe_code)]
        unsafe {
            self.slots[index].assume_init_drop();
        }
        self.free_slot(index);
    }

    /// Move the tenant out of a slot and free it in one step.
    ///
    /// Used by [`EventBus`](crate::EventBus) to hand a queued payload to
    /// the consumer without copying it through the queue.
    ///
    /// # Panics
    ///
    /// Panics if the handle was issued by a different pool.
    #[inline]
    pub fn reclaim(&mut self, slot: PoolSlot) -> T {
        let index = self.checked_index(&slot);
        // SAFETY: The slot is live (see `get`); reading moves the value out
        // and `free_slot` marks the storage dead so it is never read again.
        #[allow(unsafe_code)]
        let value = unsafe { self.slots[index].assume_init_read() };
        self.free_slot(index);
        value
    }

    /// Number of free slots.
    #[inline]
    #[must_use]
    pub fn available(&self) -> usize {
        self.free_count
    }

    /// Number of slots currently lent out.
    #[inline]
    #[must_use]
    pub fn in_use(&self) -> usize {
        N - self.free_count
    }

    /// Total slot count.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// True if no slot is available.
    #[inline]
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.head == N
    }

    /// Peak simultaneous live count since construction.
    ///
    /// Sizing diagnostic: a pool whose high-water mark never approaches `N`
    /// is over-provisioned; one that reaches `N` under normal load needs
    /// more slots or a faster consumer.
    #[inline]
    #[must_use]
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    /// Validate a handle and return its index.
    #[inline]
    fn checked_index(&self, slot: &PoolSlot) -> usize {
        assert_eq!(
            slot.pool, self.id,
            "pool handle used with a pool that did not issue it"
        );
        debug_assert!(
            slot.index < N && self.live[slot.index],
            "pool handle refers to a slot that is not live"
        );
        slot.index
    }

    /// Push a (now dead) slot back onto the free list.
    #[inline]
    fn free_slot(&mut self, index: usize) {
        self.live[index] = false;
        self.next[index] = self.head;
        self.head = index;
        self.free_count += 1;
    }

    /// Walk the free list and count its links, for invariant checks.
    #[cfg(test)]
    fn free_list_walk_len(&self) -> usize {
        let mut visited = [false; N];
        let mut len = 0;
        let mut cursor = self.head;
        while cursor != N {
            assert!(!visited[cursor], "free list contains a cycle");
            visited[cursor] = true;
            assert!(!self.live[cursor], "live slot linked into free list");
            len += 1;
            cursor = self.next[cursor];
        }
        len
    }
}

impl<T, const N: usize> Default for FixedPool<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Drop for FixedPool<T, N> {
    fn drop(&mut self) {
        // Outstanding tenants are dropped with the pool; their handles
        // become inert index wrappers.
        for index in 0..N {
            if self.live[index] {
                // SAFETY: The live tag says this slot holds an initialized
                // T that has not been dropped.
                #[allow(unsafe_code)]
                unsafe {
                    self.slots[index].assume_init_drop();
                }
            }
        }
    }
}
