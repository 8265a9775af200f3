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


use crate::renderer::api::{
    CommandBuffer, IndexBufferHandle, MemoryBlob, ShaderProgramHandle, VertexBufferHandle,
    VertexLayout, VertexLayoutHandle,
};
use crate::renderer::error::{RenderError, ResourceError};
use std::ops::{Add, AddAssign};

/// Element type of an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexFormat {
    /// 16-bit indices.
    #[default]
    Uint16,
    /// 32-bit indices.
    Uint32,
}

impl IndexFormat {
    /// Size of one index in bytes.
    pub const fn size(self) -> u32 {
        match self {
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }
}

/// Counters describing the native work issued by one or more commits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitStats {
    /// Clear operations issued.
    pub clears: u32,
    /// Program switches.
    pub program_binds: u32,
    /// Vertex/index buffer rebinds.
    pub buffer_binds: u32,
    /// Vertex attribute setups, one per rebind.
    pub attribute_rebinds: u32,
    /// Individual uniform uploads.
    pub uniform_uploads: u32,
    /// Draw calls issued.
    pub draw_calls: u32,
    /// Commands dropped for lack of a usable program or vertex buffer.
    pub skipped_draws: u32,
}

impl AddAssign for CommitStats {
    fn add_assign(&mut self, rhs: Self) {
        self.clears += rhs.clears;
        self.program_binds += rhs.program_binds;
        self.buffer_binds += rhs.buffer_binds;
        self.attribute_rebinds += rhs.attribute_rebinds;
        self.uniform_uploads += rhs.uniform_uploads;
        self.draw_calls += rhs.draw_calls;
        self.skipped_draws += rhs.skipped_draws;
    }
}

impl Add for CommitStats {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

/// The contract between the [`Renderer`](crate::renderer::Renderer) and a graphics backend.
///
/// The renderer owns every handle and calls `create_*` with a freshly allocated one;
/// the driver keeps its native objects in tables indexed by those handles. All
/// buffer contents and shader sources arrive as [`MemoryBlob`]s.
///
/// A shader that fails to compile or link is not an error here: the driver logs the
/// diagnostic and keeps the program without a native object, and draws using it are
/// skipped during [`commit`](Self::commit).
pub trait RenderDriver: std::fmt::Debug {
    /// Brings the backend up.
    fn init(&mut self) -> Result<(), RenderError>;

    /// Releases every native object still alive.
    fn shutdown(&mut self);

    /// Uploads a vertex buffer described by `layout`.
    fn create_vertex_buffer(
        &mut self,
        handle: VertexBufferHandle,
        data: &MemoryBlob,
        layout: VertexLayoutHandle,
    ) -> Result<(), ResourceError>;

    /// Destroys a vertex buffer.
    fn destroy_vertex_buffer(&mut self, handle: VertexBufferHandle);

    /// Uploads an index buffer.
    fn create_index_buffer(
        &mut self,
        handle: IndexBufferHandle,
        data: &MemoryBlob,
        format: IndexFormat,
    ) -> Result<(), ResourceError>;

    /// Destroys an index buffer.
    fn destroy_index_buffer(&mut self, handle: IndexBufferHandle);

    /// Registers a vertex layout shared by one or more vertex buffers.
    fn create_vertex_layout(
        &mut self,
        handle: VertexLayoutHandle,
        layout: &VertexLayout,
    ) -> Result<(), ResourceError>;

    /// Destroys a vertex layout.
    fn destroy_vertex_layout(&mut self, handle: VertexLayoutHandle);

    /// Compiles and links a program from vertex and fragment sources.
    fn create_program(
        &mut self,
        handle: ShaderProgramHandle,
        vertex_source: &MemoryBlob,
        fragment_source: &MemoryBlob,
    ) -> Result<(), ResourceError>;

    /// Destroys a program.
    fn destroy_program(&mut self, handle: ShaderProgramHandle);

    /// Clears and replays `commands`, returning what was issued.
    fn commit(&mut self, commands: &CommandBuffer) -> CommitStats;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_stats_accumulate() {
        let frame = CommitStats {
            clears: 1,
            program_binds: 2,
            draw_calls: 3,
            ..Default::default()
        };
        let mut total = CommitStats::default();
        total += frame;
        total += frame;
        assert_eq!(total.clears, 2);
        assert_eq!(total.program_binds, 4);
        assert_eq!((total + frame).draw_calls, 9);
    }

    #[test]
    fn test_index_sizes() {
        assert_eq!(IndexFormat::Uint16.size(), 2);
        assert_eq!(IndexFormat::Uint32.size(), 4);
    }
}
