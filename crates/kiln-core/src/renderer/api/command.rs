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


//! Per-frame recording of clear settings, camera matrices and draw commands.

use crate::collections::{IntrusiveList, Link, Linked};
use crate::math::{LinearRgba, Mat4};
use crate::memory::LinearAllocator;
use crate::renderer::api::handle::{
    IndexBufferHandle, RenderHandle, ShaderProgramHandle, VertexBufferHandle,
};
use bitflags::bitflags;
use std::alloc::Layout;

bitflags! {
    /// Which framebuffer planes are cleared at the start of a commit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct ClearFlags: u8 {
        /// Clear the color plane.
        const COLOR = 1 << 0;
        /// Clear the depth plane.
        const DEPTH = 1 << 1;
        /// Clear the stencil plane.
        const STENCIL = 1 << 2;
    }
}

/// Clear operation applied by the driver before the draws of a command buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClearSettings {
    /// Planes to clear.
    pub flags: ClearFlags,
    /// Clear color.
    pub color: LinearRgba,
    /// Clear depth value.
    pub depth: f32,
    /// Clear stencil value.
    pub stencil: u8,
}

impl Default for ClearSettings {
    fn default() -> Self {
        Self {
            flags: ClearFlags::COLOR | ClearFlags::DEPTH,
            color: LinearRgba::BLACK,
            depth: 1.0,
            stencil: 0,
        }
    }
}

/// A single draw call, expressed purely in terms of resource handles.
///
/// The defaults mean "nothing bound, draw everything": every handle is invalid and
/// both counts are [`DrawCommand::USE_ALL`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    /// Number of vertices for non-indexed draws, or [`DrawCommand::USE_ALL`].
    pub vertex_count: u32,
    /// First vertex for non-indexed draws.
    pub start_vertex: u32,
    /// Number of indices, or [`DrawCommand::USE_ALL`].
    pub index_count: u32,
    /// First index.
    pub start_index: u32,
    /// Vertex buffer to draw from.
    pub vertex_buffer: VertexBufferHandle,
    /// Optional index buffer.
    pub index_buffer: IndexBufferHandle,
    /// Program to draw with.
    pub program: ShaderProgramHandle,
    /// Model matrix.
    pub transform: Mat4,
}

impl DrawCommand {
    /// Count sentinel meaning "the whole buffer".
    pub const USE_ALL: u32 = u32::MAX;

    /// Bytes of command-buffer arena consumed by one recorded command.
    pub const ARENA_FOOTPRINT: usize = std::mem::size_of::<DrawNode>();
}

impl Default for DrawCommand {
    fn default() -> Self {
        Self {
            vertex_count: Self::USE_ALL,
            start_vertex: 0,
            index_count: Self::USE_ALL,
            start_index: 0,
            vertex_buffer: VertexBufferHandle::INVALID,
            index_buffer: IndexBufferHandle::INVALID,
            program: ShaderProgramHandle::INVALID,
            transform: Mat4::IDENTITY,
        }
    }
}

/// Addresses a draw command inside its command buffer.
///
/// Only meaningful until the buffer's next [`CommandBuffer::reset`]; afterwards the id
/// may name a different command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawCommandId(u32);

impl DrawCommandId {
    /// The slot this id refers to.
    pub fn index(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct DrawNode {
    command: DrawCommand,
    link: Link,
}

impl Linked for DrawNode {
    fn link(&self) -> &Link {
        &self.link
    }

    fn link_mut(&mut self) -> &mut Link {
        &mut self.link
    }
}

const HEAD: u32 = 0;

/// A frame's worth of draw submissions.
///
/// Commands are carved out of a fixed-size arena: once it is exhausted,
/// [`allocate_draw_command`](Self::allocate_draw_command) returns `None` for the rest
/// of the frame. Submitted commands form an intrusive list and are committed in
/// submission order. [`reset`](Self::reset) rewinds the arena and empties the list.
#[derive(Debug, Clone)]
pub struct CommandBuffer {
    clear: ClearSettings,
    view: Mat4,
    projection: Mat4,
    // Slot 0 is the list head; draw commands start at slot 1.
    nodes: Vec<DrawNode>,
    arena: LinearAllocator,
    submitted: usize,
}

impl CommandBuffer {
    /// Creates a command buffer whose arena holds `arena_bytes` bytes of draw commands.
    pub fn new(arena_bytes: usize) -> Self {
        let capacity = arena_bytes / DrawCommand::ARENA_FOOTPRINT;
        let mut nodes = Vec::with_capacity(capacity + 1);
        nodes.push(DrawNode {
            command: DrawCommand::default(),
            link: Link::head(HEAD),
        });

        Self {
            clear: ClearSettings::default(),
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            nodes,
            arena: LinearAllocator::with_capacity(arena_bytes),
            submitted: 0,
        }
    }

    /// Reserves a default-initialised draw command.
    ///
    /// Returns `None` once the arena is full; the buffer is left untouched in that case.
    pub fn allocate_draw_command(&mut self) -> Option<DrawCommandId> {
        let offset = self.arena.allocate(Layout::new::<DrawNode>())?;

        // The arena offset picks the node; slots freed by a reset are reused in place.
        let slot = offset / DrawCommand::ARENA_FOOTPRINT + 1;
        let node = DrawNode {
            command: DrawCommand::default(),
            link: Link::node(slot as u32, slot as u32),
        };
        match self.nodes.get_mut(slot) {
            Some(existing) => *existing = node,
            None => self.nodes.push(node),
        }
        Some(DrawCommandId(slot as u32))
    }

    // Slots past the arena's current fill belong to an earlier frame.
    fn is_live(&self, id: DrawCommandId) -> bool {
        id.0 != HEAD && id.0 as usize <= self.arena.used() / DrawCommand::ARENA_FOOTPRINT
    }

    /// Gives access to a command for filling it in.
    pub fn draw_command_mut(&mut self, id: DrawCommandId) -> Option<&mut DrawCommand> {
        if !self.is_live(id) {
            return None;
        }
        self.nodes.get_mut(id.0 as usize).map(|node| &mut node.command)
    }

    /// Appends a command to the draw list. Submitting it again moves it to the tail.
    pub fn submit(&mut self, id: DrawCommandId) {
        if !self.is_live(id) {
            debug_assert!(false, "{id:?} does not belong to this frame");
            return;
        }
        if !self.nodes.is_linked(id.0) {
            self.submitted += 1;
        }
        self.nodes.link_back(HEAD, id.0);
    }

    /// Allocates, fills and submits a command in one step.
    pub fn record(&mut self, command: DrawCommand) -> Option<DrawCommandId> {
        let id = self.allocate_draw_command()?;
        self.nodes[id.0 as usize].command = command;
        self.submit(id);
        Some(id)
    }

    /// Iterates over the submitted commands in submission order.
    pub fn draw_commands(&self) -> impl Iterator<Item = &DrawCommand> + '_ {
        self.nodes
            .list_iter(HEAD)
            .map(move |slot| &self.nodes[slot as usize].command)
    }

    /// Number of submitted commands.
    pub fn len(&self) -> usize {
        self.submitted
    }

    /// Returns `true` if nothing has been submitted since the last reset.
    pub fn is_empty(&self) -> bool {
        self.nodes.list_is_empty(HEAD)
    }

    /// Empties the draw list and rewinds the arena.
    ///
    /// Every [`DrawCommandId`] handed out before the reset becomes stale.
    pub fn reset(&mut self) {
        self.nodes.clear_links(HEAD);
        self.arena.reset();
        self.submitted = 0;
    }

    /// Sets the clear operation for this buffer.
    pub fn set_clear(&mut self, clear: ClearSettings) {
        self.clear = clear;
    }

    /// The clear operation for this buffer.
    pub fn clear_settings(&self) -> &ClearSettings {
        &self.clear
    }

    /// Sets the camera matrices used for every draw in this buffer.
    pub fn set_view_transform(&mut self, view: Mat4, projection: Mat4) {
        self.view = view;
        self.projection = projection;
    }

    /// The view matrix.
    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    /// The projection matrix.
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// Arena bytes consumed this frame.
    pub fn arena_used(&self) -> usize {
        self.arena.used()
    }

    /// Total arena size in bytes.
    pub fn arena_capacity(&self) -> usize {
        self.arena.capacity()
    }
}
