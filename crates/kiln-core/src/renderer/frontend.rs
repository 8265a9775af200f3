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


//! The application-facing side of the renderer.

use crate::collections::{IntrusiveList, Link, Linked};
use crate::math::Mat4;
use crate::memory::HandleAllocator;
use crate::renderer::api::{
    CommandBuffer, CommandBufferHandle, IndexBufferHandle, MemoryBlob, RenderHandle,
    ShaderProgramHandle, VertexBufferHandle, VertexLayout, VertexLayoutCache, VertexLayoutHandle,
    MAX_COMMAND_BUFFERS, MAX_INDEX_BUFFERS, MAX_SHADER_PROGRAMS, MAX_VERTEX_BUFFERS,
    MAX_VERTEX_LAYOUTS,
};
use crate::renderer::error::RenderError;
use crate::renderer::traits::{CommitStats, IndexFormat, RenderDriver};

/// What a call to [`Renderer::frame`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// The number of the frame that was committed.
    pub frame_number: u64,
    /// Command buffers committed.
    pub command_buffers: u32,
    /// Accumulated driver work over all committed buffers.
    pub commit: CommitStats,
}

#[derive(Debug)]
struct CommandBufferEntry {
    link: Link,
    buffer: Option<CommandBuffer>,
}

impl Linked for CommandBufferEntry {
    fn link(&self) -> &Link {
        &self.link
    }

    fn link_mut(&mut self) -> &mut Link {
        &mut self.link
    }
}

const HEAD: u32 = 0;

#[inline]
fn command_buffer_slot(handle: CommandBufferHandle) -> u32 {
    handle.index() + 1
}

/// Owns every resource handle table and drives a [`RenderDriver`].
///
/// Resources are created and destroyed immediately through the driver. Draws are
/// recorded into command buffers obtained from [`create_command_buffer`] and
/// submitted all at once by [`frame`], the single synchronisation point per frame.
///
/// Running out of handles is not an error: the `create_*` methods return the
/// invalid handle and nothing is created on the driver side.
///
/// [`create_command_buffer`]: Self::create_command_buffer
/// [`frame`]: Self::frame
#[derive(Debug)]
pub struct Renderer {
    driver: Box<dyn RenderDriver>,
    vertex_buffers: HandleAllocator<VertexBufferHandle, MAX_VERTEX_BUFFERS>,
    index_buffers: HandleAllocator<IndexBufferHandle, MAX_INDEX_BUFFERS>,
    vertex_layouts: HandleAllocator<VertexLayoutHandle, MAX_VERTEX_LAYOUTS>,
    programs: HandleAllocator<ShaderProgramHandle, MAX_SHADER_PROGRAMS>,
    command_buffer_handles: HandleAllocator<CommandBufferHandle, MAX_COMMAND_BUFFERS>,
    layout_cache: VertexLayoutCache,
    // Slot 0 heads the list of live buffers; handle `i` lives in slot `i + 1`.
    command_buffers: Vec<CommandBufferEntry>,
    view: Mat4,
    projection: Mat4,
    frame_number: u64,
    is_shut_down: bool,
}

impl Renderer {
    /// Initialises `driver` and wraps it.
    pub fn new(mut driver: Box<dyn RenderDriver>) -> Result<Self, RenderError> {
        driver.init()?;
        log::info!("Renderer initialised");

        let mut command_buffers = Vec::with_capacity(MAX_COMMAND_BUFFERS + 1);
        command_buffers.push(CommandBufferEntry {
            link: Link::head(HEAD),
            buffer: None,
        });
        for index in 0..MAX_COMMAND_BUFFERS as u32 {
            command_buffers.push(CommandBufferEntry {
                link: Link::node(index + 1, index),
                buffer: None,
            });
        }

        Ok(Self {
            driver,
            vertex_buffers: HandleAllocator::new(),
            index_buffers: HandleAllocator::new(),
            vertex_layouts: HandleAllocator::new(),
            programs: HandleAllocator::new(),
            command_buffer_handles: HandleAllocator::new(),
            layout_cache: VertexLayoutCache::new(),
            command_buffers,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            frame_number: 0,
            is_shut_down: false,
        })
    }

    /// Creates a vertex buffer holding `data`, laid out as `layout`.
    ///
    /// Buffers with an identical layout hash share a single driver-side layout object.
    pub fn create_vertex_buffer(
        &mut self,
        data: &MemoryBlob,
        layout: &VertexLayout,
    ) -> VertexBufferHandle {
        if self.is_shut_down {
            log::warn!("Vertex buffer requested after shutdown");
            return VertexBufferHandle::INVALID;
        }

        let handle = self.vertex_buffers.alloc();
        if !handle.is_valid() {
            log::warn!("Vertex buffer table exhausted ({MAX_VERTEX_BUFFERS} live)");
            return handle;
        }

        let hash = layout.hash();
        let mut layout_handle = self.layout_cache.find(hash);
        let is_new_layout = !layout_handle.is_valid();
        if is_new_layout {
            layout_handle = self.vertex_layouts.alloc();
            if !layout_handle.is_valid() {
                log::warn!("Vertex layout table exhausted ({MAX_VERTEX_LAYOUTS} live)");
                self.vertex_buffers.free(handle);
                return VertexBufferHandle::INVALID;
            }
            if let Err(e) = self.driver.create_vertex_layout(layout_handle, layout) {
                log::error!("Failed to create vertex layout {layout_handle:?}: {e}");
                self.vertex_layouts.free(layout_handle);
                self.vertex_buffers.free(handle);
                return VertexBufferHandle::INVALID;
            }
            log::debug!("Created vertex layout {layout_handle:?} (hash {hash:#010x})");
        }

        if let Err(e) = self.driver.create_vertex_buffer(handle, data, layout_handle) {
            log::error!("Failed to create vertex buffer {handle:?}: {e}");
            if is_new_layout {
                self.driver.destroy_vertex_layout(layout_handle);
                self.vertex_layouts.free(layout_handle);
            }
            self.vertex_buffers.free(handle);
            return VertexBufferHandle::INVALID;
        }

        self.layout_cache.add(handle, hash, layout_handle);
        handle
    }

    /// Destroys a vertex buffer, and its layout if no other buffer uses it.
    pub fn destroy_vertex_buffer(&mut self, handle: VertexBufferHandle) {
        if self.is_shut_down {
            return;
        }
        if !self.vertex_buffers.is_allocated(handle) {
            debug_assert!(false, "destroying a dead vertex buffer: {handle:?}");
            return;
        }

        let orphaned = self.layout_cache.release(handle);
        if orphaned.is_valid() {
            log::debug!("Vertex layout {orphaned:?} is no longer referenced");
            self.driver.destroy_vertex_layout(orphaned);
            self.vertex_layouts.free(orphaned);
        }
        self.driver.destroy_vertex_buffer(handle);
        self.vertex_buffers.free(handle);
    }

    /// Creates an index buffer holding `data`.
    pub fn create_index_buffer(&mut self, data: &MemoryBlob, format: IndexFormat) -> IndexBufferHandle {
        if self.is_shut_down {
            log::warn!("Index buffer requested after shutdown");
            return IndexBufferHandle::INVALID;
        }

        let handle = self.index_buffers.alloc();
        if !handle.is_valid() {
            log::warn!("Index buffer table exhausted ({MAX_INDEX_BUFFERS} live)");
            return handle;
        }
        if let Err(e) = self.driver.create_index_buffer(handle, data, format) {
            log::error!("Failed to create index buffer {handle:?}: {e}");
            self.index_buffers.free(handle);
            return IndexBufferHandle::INVALID;
        }
        handle
    }

    /// Destroys an index buffer.
    pub fn destroy_index_buffer(&mut self, handle: IndexBufferHandle) {
        if self.is_shut_down {
            return;
        }
        if !self.index_buffers.is_allocated(handle) {
            debug_assert!(false, "destroying a dead index buffer: {handle:?}");
            return;
        }
        self.driver.destroy_index_buffer(handle);
        self.index_buffers.free(handle);
    }

    /// Creates a shader program from vertex and fragment sources.
    ///
    /// A program that fails to compile still gets a valid handle; draws using it are
    /// skipped at commit time.
    pub fn create_program(
        &mut self,
        vertex_source: &MemoryBlob,
        fragment_source: &MemoryBlob,
    ) -> ShaderProgramHandle {
        if self.is_shut_down {
            log::warn!("Shader program requested after shutdown");
            return ShaderProgramHandle::INVALID;
        }

        let handle = self.programs.alloc();
        if !handle.is_valid() {
            log::warn!("Shader program table exhausted ({MAX_SHADER_PROGRAMS} live)");
            return handle;
        }
        if let Err(e) = self
            .driver
            .create_program(handle, vertex_source, fragment_source)
        {
            log::error!("Failed to create shader program {handle:?}: {e}");
            self.programs.free(handle);
            return ShaderProgramHandle::INVALID;
        }
        handle
    }

    /// Destroys a shader program.
    pub fn destroy_program(&mut self, handle: ShaderProgramHandle) {
        if self.is_shut_down {
            return;
        }
        if !self.programs.is_allocated(handle) {
            debug_assert!(false, "destroying a dead shader program: {handle:?}");
            return;
        }
        self.driver.destroy_program(handle);
        self.programs.free(handle);
    }

    /// Creates a command buffer with an arena of `arena_bytes` bytes and adds it to the
    /// set committed by [`frame`](Self::frame).
    pub fn create_command_buffer(&mut self, arena_bytes: usize) -> CommandBufferHandle {
        if self.is_shut_down {
            log::warn!("Command buffer requested after shutdown");
            return CommandBufferHandle::INVALID;
        }

        let handle = self.command_buffer_handles.alloc();
        if !handle.is_valid() {
            log::warn!("Command buffer table exhausted ({MAX_COMMAND_BUFFERS} live)");
            return handle;
        }

        let slot = command_buffer_slot(handle);
        self.command_buffers[slot as usize].buffer = Some(CommandBuffer::new(arena_bytes));
        self.command_buffers.link_back(HEAD, slot);
        log::debug!("Created command buffer {handle:?} with a {arena_bytes} byte arena");
        handle
    }

    /// Destroys a command buffer along with everything recorded in it.
    pub fn destroy_command_buffer(&mut self, handle: CommandBufferHandle) {
        if self.is_shut_down {
            return;
        }
        if !self.command_buffer_handles.is_allocated(handle) {
            debug_assert!(false, "destroying a dead command buffer: {handle:?}");
            return;
        }

        let slot = command_buffer_slot(handle);
        self.command_buffers.unlink(slot);
        self.command_buffers[slot as usize].buffer = None;
        self.command_buffer_handles.free(handle);
    }

    /// Returns a command buffer for recording.
    pub fn command_buffer_mut(&mut self, handle: CommandBufferHandle) -> Option<&mut CommandBuffer> {
        if !self.command_buffer_handles.is_allocated(handle) {
            return None;
        }
        self.command_buffers
            .get_mut(command_buffer_slot(handle) as usize)
            .and_then(|entry| entry.buffer.as_mut())
    }

    /// Sets the camera matrices stamped onto every command buffer at the next frame.
    pub fn set_view_transform(&mut self, view: Mat4, projection: Mat4) {
        self.view = view;
        self.projection = projection;
    }

    /// Commits every live command buffer, in creation order, then resets them.
    pub fn frame(&mut self) -> FrameStats {
        let mut stats = FrameStats {
            frame_number: self.frame_number,
            ..Default::default()
        };
        if self.is_shut_down {
            return stats;
        }

        let mut slot = self.command_buffers[HEAD as usize].link.next();
        while slot != HEAD {
            let entry = &mut self.command_buffers[slot as usize];
            let next = entry.link.next();
            if let Some(buffer) = entry.buffer.as_mut() {
                buffer.set_view_transform(self.view, self.projection);
                stats.commit += self.driver.commit(buffer);
                buffer.reset();
                stats.command_buffers += 1;
            }
            slot = next;
        }

        log::trace!(
            "Frame {} committed {} command buffer(s), {} draw(s)",
            self.frame_number,
            stats.command_buffers,
            stats.commit.draw_calls
        );
        self.frame_number += 1;
        stats
    }

    /// The number of the next frame to be committed.
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// The shared layout a vertex buffer refers to.
    pub fn vertex_layout_of(&self, handle: VertexBufferHandle) -> VertexLayoutHandle {
        self.layout_cache.layout_of(handle)
    }

    /// How many vertex buffers share `layout`.
    pub fn layout_ref_count(&self, layout: VertexLayoutHandle) -> u32 {
        self.layout_cache.ref_count(layout)
    }

    /// Number of live vertex buffers.
    pub fn vertex_buffer_count(&self) -> usize {
        self.vertex_buffers.len()
    }

    /// Number of live vertex layouts.
    pub fn vertex_layout_count(&self) -> usize {
        self.vertex_layouts.len()
    }

    /// Shuts the driver down. Calling it again does nothing.
    ///
    /// The driver releases every remaining resource; later `destroy_*` calls are
    /// ignored and `create_*` calls return the invalid handle.
    pub fn shutdown(&mut self) {
        if self.is_shut_down {
            return;
        }
        self.is_shut_down = true;

        let leaked = self.vertex_buffers.len() + self.index_buffers.len() + self.programs.len();
        if leaked > 0 {
            log::warn!("Shutting down with {leaked} live resource(s); the driver releases them");
        }

        self.command_buffers.clear_links(HEAD);
        for entry in &mut self.command_buffers {
            entry.buffer = None;
        }
        self.command_buffer_handles.clear();
        self.driver.shutdown();
        log::info!("Renderer shut down after {} frame(s)", self.frame_number);
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
