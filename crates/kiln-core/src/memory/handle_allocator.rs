// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


//! A fixed-capacity index allocator with O(1) allocation and release.

use crate::renderer::api::handle::RenderHandle;
use std::marker::PhantomData;

/// Hands out unique indices in `0..N` for one resource kind.
///
/// The allocator keeps two arrays of length `N`:
///
/// - `dense[..len]` holds every live index, `dense[len..]` the free ones.
/// - `sparse[index]` is the position of `index` inside `dense`.
///
/// Allocation takes the first free entry of `dense`. Releasing swaps the released
/// index with the last live one, so both operations are O(1) and indices are reused
/// only after they have been freed.
///
/// # Type Parameters
///
/// * `H`: The handle kind produced by this allocator.
/// * `N`: The compile-time capacity. Exhaustion is a hard ceiling.
#[derive(Debug, Clone)]
pub struct HandleAllocator<H: RenderHandle, const N: usize> {
    dense: Vec<u32>,
    sparse: Vec<u32>,
    len: usize,
    _kind: PhantomData<H>,
}

impl<H: RenderHandle, const N: usize> Default for HandleAllocator<H, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: RenderHandle, const N: usize> HandleAllocator<H, N> {
    /// Creates an allocator with all `N` indices free.
    pub fn new() -> Self {
        assert!(N < u32::MAX as usize, "capacity collides with the invalid sentinel");
        let identity: Vec<u32> = (0..N as u32).collect();
        Self {
            dense: identity.clone(),
            sparse: identity,
            len: 0,
            _kind: PhantomData,
        }
    }

    /// Allocates a handle, or returns [`RenderHandle::INVALID`] when all `N` are live.
    #[must_use]
    pub fn alloc(&mut self) -> H {
        if self.len >= N {
            return H::INVALID;
        }
        let index = self.dense[self.len];
        self.sparse[index as usize] = self.len as u32;
        self.len += 1;
        H::from_index(index)
    }

    /// Releases a live handle so its index can be reused.
    ///
    /// Releasing a handle that is not currently allocated is a contract violation,
    /// caught by a debug assertion and ignored in release builds.
    pub fn free(&mut self, handle: H) {
        debug_assert!(
            self.is_allocated(handle),
            "freeing a handle that is not allocated: {handle:?}"
        );
        if !self.is_allocated(handle) {
            return;
        }

        let index = handle.index();
        let slot = self.sparse[index as usize] as usize;
        self.len -= 1;
        let last = self.dense[self.len];

        self.dense[slot] = last;
        self.sparse[last as usize] = slot as u32;
        self.dense[self.len] = index;
        self.sparse[index as usize] = self.len as u32;
    }

    /// Returns `true` if `handle` is currently live.
    pub fn is_allocated(&self, handle: H) -> bool {
        let index = handle.index() as usize;
        if index >= N {
            return false;
        }
        let slot = self.sparse[index] as usize;
        slot < self.len && self.dense[slot] as usize == index
    }

    /// Returns the number of live handles.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no handle is live.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the next [`alloc`](Self::alloc) would fail.
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Returns the fixed capacity `N`.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Iterates over the live handles in dense order.
    pub fn iter(&self) -> impl Iterator<Item = H> + '_ {
        self.dense[..self.len].iter().map(|&index| H::from_index(index))
    }

    /// Releases every handle at once.
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::handle::VertexBufferHandle;
    use std::collections::HashSet;

    type SmallAllocator = HandleAllocator<VertexBufferHandle, 4>;

    #[test]
    fn test_alloc_until_exhausted() {
        let mut allocator = SmallAllocator::new();
        let handles: Vec<_> = (0..4).map(|_| allocator.alloc()).collect();

        assert!(handles.iter().all(|h| h.is_valid()));
        assert!(allocator.is_full());
        assert_eq!(allocator.alloc(), VertexBufferHandle::INVALID);

        let unique: HashSet<_> = handles.iter().collect();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn test_free_makes_index_reusable() {
        let mut allocator = SmallAllocator::new();
        let handles: Vec<_> = (0..4).map(|_| allocator.alloc()).collect();

        allocator.free(handles[1]);
        assert!(!allocator.is_allocated(handles[1]));
        assert_eq!(allocator.len(), 3);

        let reused = allocator.alloc();
        assert_eq!(reused, handles[1]);
        assert!(allocator.is_allocated(reused));
    }

    #[test]
    fn test_free_swaps_with_last_live_entry() {
        let mut allocator = SmallAllocator::new();
        let a = allocator.alloc();
        let b = allocator.alloc();
        let c = allocator.alloc();

        allocator.free(a);

        let live: HashSet<_> = allocator.iter().collect();
        assert_eq!(live, [b, c].into_iter().collect());
        assert!(allocator.is_allocated(b));
        assert!(allocator.is_allocated(c));
    }

    #[test]
    fn test_random_sequence_keeps_live_handles_unique() {
        let mut allocator = HandleAllocator::<VertexBufferHandle, 16>::new();
        let mut live: Vec<VertexBufferHandle> = Vec::new();
        // Deterministic LCG so the sequence is reproducible.
        let mut seed: u32 = 0x1234_5678;

        for _ in 0..2_000 {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let should_alloc = live.is_empty() || (seed >> 16) % 3 != 0;
            if should_alloc {
                let handle = allocator.alloc();
                if live.len() == 16 {
                    assert_eq!(handle, VertexBufferHandle::INVALID);
                } else {
                    assert!(handle.is_valid());
                    assert!(!live.contains(&handle));
                    live.push(handle);
                }
            } else {
                let victim = live.swap_remove((seed as usize >> 8) % live.len());
                allocator.free(victim);
            }
            assert_eq!(allocator.len(), live.len());
        }
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut allocator = SmallAllocator::new();
        let first = allocator.alloc();
        let _ = allocator.alloc();
        allocator.clear();

        assert!(allocator.is_empty());
        assert!(!allocator.is_allocated(first));
    }
}
