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


//! A bump allocator over a fixed byte budget, rewound once per frame.

use std::alloc::Layout;

/// Hands out aligned byte ranges from a fixed-size block by bumping a cursor.
///
/// Allocation returns the byte offset of the new range inside the block. There is no
/// individual release: [`free`](Self::free) does nothing and the only way to reclaim
/// memory is [`reset`](Self::reset), which rewinds the cursor in O(1). The block never
/// grows, so running out is reported as `None` and the caller must treat it as
/// "buffer full" for the current epoch.
#[derive(Debug, Clone)]
pub struct LinearAllocator {
    capacity: usize,
    offset: usize,
    peak: usize,
}

impl LinearAllocator {
    /// Creates an allocator managing `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            offset: 0,
            peak: 0,
        }
    }

    /// Reserves a range matching `layout` and returns its starting offset.
    ///
    /// Returns `None` when the remaining space cannot hold the aligned request.
    pub fn allocate(&mut self, layout: Layout) -> Option<usize> {
        let start = self.offset.checked_next_multiple_of(layout.align())?;
        let end = start.checked_add(layout.size())?;
        if end > self.capacity {
            log::trace!(
                "Linear allocator exhausted: requested {} bytes, {} of {} used",
                layout.size(),
                self.offset,
                self.capacity
            );
            return None;
        }
        self.offset = end;
        self.peak = self.peak.max(end);
        Some(start)
    }

    /// Does nothing. Memory is reclaimed all at once by [`reset`](Self::reset).
    #[inline]
    pub fn free(&mut self, _offset: usize) {}

    /// Rewinds the cursor to the start of the block.
    #[inline]
    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Returns the number of bytes handed out since the last reset.
    #[inline]
    pub fn used(&self) -> usize {
        self.offset
    }

    /// Returns the number of bytes still available.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.offset
    }

    /// Returns the size of the managed block.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the highest cursor position ever reached, across resets.
    #[inline]
    pub fn peak(&self) -> usize {
        self.peak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocations_are_contiguous() {
        let mut arena = LinearAllocator::with_capacity(64);
        let layout = Layout::from_size_align(16, 8).unwrap();

        assert_eq!(arena.allocate(layout), Some(0));
        assert_eq!(arena.allocate(layout), Some(16));
        assert_eq!(arena.used(), 32);
        assert_eq!(arena.remaining(), 32);
    }

    #[test]
    fn test_alignment_padding() {
        let mut arena = LinearAllocator::with_capacity(64);
        assert_eq!(arena.allocate(Layout::from_size_align(3, 1).unwrap()), Some(0));
        assert_eq!(arena.allocate(Layout::from_size_align(8, 8).unwrap()), Some(8));
        assert_eq!(arena.used(), 16);
    }

    #[test]
    fn test_exhaustion_returns_none_without_moving_cursor() {
        let mut arena = LinearAllocator::with_capacity(24);
        let layout = Layout::from_size_align(16, 8).unwrap();

        assert!(arena.allocate(layout).is_some());
        assert!(arena.allocate(layout).is_none());
        assert_eq!(arena.used(), 16);
    }

    #[test]
    fn test_reset_rewinds_but_keeps_peak() {
        let mut arena = LinearAllocator::with_capacity(32);
        let layout = Layout::from_size_align(20, 4).unwrap();
        let offset = arena.allocate(layout).unwrap();

        arena.free(offset);
        assert_eq!(arena.used(), 20);

        arena.reset();
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.peak(), 20);
        assert_eq!(arena.allocate(layout), Some(0));
    }
}
