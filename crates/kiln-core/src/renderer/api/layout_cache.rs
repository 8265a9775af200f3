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


//! Deduplicates vertex layouts and tracks which vertex buffers use them.

use crate::renderer::api::handle::{
    RenderHandle, VertexBufferHandle, VertexLayoutHandle, MAX_VERTEX_BUFFERS, MAX_VERTEX_LAYOUTS,
};
use std::collections::HashMap;

/// Maps layout hashes to shared layout handles and reference-counts their users.
///
/// Lookup is by [`VertexLayout::hash`](crate::renderer::VertexLayout::hash) alone, so two
/// different attribute sets whose hashes collide share one entry: the first one
/// registered wins.
///
/// A layout's driver-side object may only be destroyed once no vertex buffer refers to
/// it anymore; [`release`](Self::release) reports exactly that moment.
#[derive(Debug, Clone)]
pub struct VertexLayoutCache {
    by_hash: HashMap<u32, VertexLayoutHandle>,
    layout_hashes: Vec<u32>,
    ref_counts: Vec<u32>,
    buffer_layouts: Vec<VertexLayoutHandle>,
}

impl Default for VertexLayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexLayoutCache {
    /// Creates an empty cache sized for the renderer's handle tables.
    pub fn new() -> Self {
        Self {
            by_hash: HashMap::new(),
            layout_hashes: vec![0; MAX_VERTEX_LAYOUTS],
            ref_counts: vec![0; MAX_VERTEX_LAYOUTS],
            buffer_layouts: vec![VertexLayoutHandle::INVALID; MAX_VERTEX_BUFFERS],
        }
    }

    /// Returns the layout registered for `hash`, or [`VertexLayoutHandle::INVALID`].
    pub fn find(&self, hash: u32) -> VertexLayoutHandle {
        self.by_hash
            .get(&hash)
            .copied()
            .unwrap_or(VertexLayoutHandle::INVALID)
    }

    /// Records that `vertex_buffer` uses `layout` and takes a reference on it.
    ///
    /// The first registration of a layout also binds `hash` to it.
    pub fn add(&mut self, vertex_buffer: VertexBufferHandle, hash: u32, layout: VertexLayoutHandle) {
        let (Some(slot), Some(count)) = (
            self.buffer_layouts.get_mut(vertex_buffer.index() as usize),
            self.ref_counts.get_mut(layout.index() as usize),
        ) else {
            debug_assert!(false, "handle out of range: {vertex_buffer:?} / {layout:?}");
            return;
        };

        debug_assert!(!slot.is_valid(), "{vertex_buffer:?} already holds a layout");
        *slot = layout;
        *count += 1;

        if *count == 1 {
            self.layout_hashes[layout.index() as usize] = hash;
            self.by_hash.entry(hash).or_insert(layout);
        }
    }

    /// Drops the reference `vertex_buffer` holds on its layout.
    ///
    /// Returns the layout handle when this was the last reference, meaning its
    /// driver-side object can now be destroyed. Returns
    /// [`VertexLayoutHandle::INVALID`] if the layout is still referenced or if the buffer
    /// was not registered.
    pub fn release(&mut self, vertex_buffer: VertexBufferHandle) -> VertexLayoutHandle {
        let Some(slot) = self.buffer_layouts.get_mut(vertex_buffer.index() as usize) else {
            return VertexLayoutHandle::INVALID;
        };
        let layout = std::mem::replace(slot, VertexLayoutHandle::INVALID);
        if !layout.is_valid() {
            return VertexLayoutHandle::INVALID;
        }

        let index = layout.index() as usize;
        self.ref_counts[index] -= 1;
        if self.ref_counts[index] > 0 {
            return VertexLayoutHandle::INVALID;
        }

        let hash = self.layout_hashes[index];
        if self.by_hash.get(&hash) == Some(&layout) {
            self.by_hash.remove(&hash);
        }
        layout
    }

    /// Returns the number of vertex buffers currently using `layout`.
    pub fn ref_count(&self, layout: VertexLayoutHandle) -> u32 {
        self.ref_counts
            .get(layout.index() as usize)
            .copied()
            .unwrap_or(0)
    }

    /// Returns the layout `vertex_buffer` refers to, or [`VertexLayoutHandle::INVALID`].
    pub fn layout_of(&self, vertex_buffer: VertexBufferHandle) -> VertexLayoutHandle {
        self.buffer_layouts
            .get(vertex_buffer.index() as usize)
            .copied()
            .unwrap_or(VertexLayoutHandle::INVALID)
    }

    /// Returns the number of distinct layouts currently registered.
    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    /// Returns `true` if no layout is registered.
    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VB0: VertexBufferHandle = VertexBufferHandle(0);
    const VB1: VertexBufferHandle = VertexBufferHandle(1);
    const LAYOUT: VertexLayoutHandle = VertexLayoutHandle(3);

    #[test]
    fn test_find_unknown_hash_is_invalid() {
        let cache = VertexLayoutCache::new();
        assert_eq!(cache.find(42), VertexLayoutHandle::INVALID);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_shared_layout_released_only_by_last_user() {
        let mut cache = VertexLayoutCache::new();
        cache.add(VB0, 0xabc, LAYOUT);
        cache.add(VB1, 0xabc, LAYOUT);

        assert_eq!(cache.find(0xabc), LAYOUT);
        assert_eq!(cache.ref_count(LAYOUT), 2);

        assert_eq!(cache.release(VB0), VertexLayoutHandle::INVALID);
        assert_eq!(cache.ref_count(LAYOUT), 1);
        assert_eq!(cache.find(0xabc), LAYOUT);

        assert_eq!(cache.release(VB1), LAYOUT);
        assert_eq!(cache.ref_count(LAYOUT), 0);
        assert_eq!(cache.find(0xabc), VertexLayoutHandle::INVALID);
    }

    #[test]
    fn test_release_unknown_buffer_is_invalid() {
        let mut cache = VertexLayoutCache::new();
        assert_eq!(cache.release(VB0), VertexLayoutHandle::INVALID);
        assert_eq!(
            cache.release(VertexBufferHandle::INVALID),
            VertexLayoutHandle::INVALID
        );
    }

    #[test]
    fn test_double_release_is_reported_once() {
        let mut cache = VertexLayoutCache::new();
        cache.add(VB0, 7, LAYOUT);
        assert_eq!(cache.release(VB0), LAYOUT);
        assert_eq!(cache.release(VB0), VertexLayoutHandle::INVALID);
        assert_eq!(cache.layout_of(VB0), VertexLayoutHandle::INVALID);
    }
}
