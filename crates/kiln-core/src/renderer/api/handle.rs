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


//! Typed, opaque handles to renderer resources.
//!
//! A handle is a 32-bit index into a fixed-capacity table owned by the
//! [`Renderer`](crate::renderer::Renderer). It is never dereferenced directly: every
//! access goes through the owning table. Each resource kind gets its own newtype so a
//! vertex buffer handle cannot be passed where a shader program is expected.
//!
//! Exhaustion of a table is reported with the [`RenderHandle::INVALID`] sentinel, which
//! callers must check with [`RenderHandle::is_valid`] before using a handle.

use std::fmt::Debug;
use std::hash::Hash;

/// Maximum number of live vertex buffers.
pub const MAX_VERTEX_BUFFERS: usize = 4096;
/// Maximum number of live index buffers.
pub const MAX_INDEX_BUFFERS: usize = 4096;
/// Maximum number of distinct vertex layouts.
pub const MAX_VERTEX_LAYOUTS: usize = 64;
/// Maximum number of live shader programs.
pub const MAX_SHADER_PROGRAMS: usize = 512;
/// Maximum number of live command buffers.
pub const MAX_COMMAND_BUFFERS: usize = 32;

/// Common behaviour shared by every handle kind.
pub trait RenderHandle: Copy + Eq + Hash + Debug + 'static {
    /// The reserved "no resource" value.
    const INVALID: Self;

    /// Wraps a raw table index.
    fn from_index(index: u32) -> Self;

    /// Returns the raw table index.
    fn index(self) -> u32;

    /// Returns `true` unless this is the [`INVALID`](Self::INVALID) sentinel.
    #[inline]
    fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

macro_rules! render_handle {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl RenderHandle for $name {
            const INVALID: Self = Self(u32::MAX);

            #[inline]
            fn from_index(index: u32) -> Self {
                Self(index)
            }

            #[inline]
            fn index(self) -> u32 {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                <Self as RenderHandle>::INVALID
            }
        }
    };
}

render_handle!(
    /// Identifies a GPU vertex buffer.
    VertexBufferHandle
);
render_handle!(
    /// Identifies a GPU index buffer.
    IndexBufferHandle
);
render_handle!(
    /// Identifies a deduplicated vertex layout shared by vertex buffers.
    VertexLayoutHandle
);
render_handle!(
    /// Identifies a linked shader program.
    ShaderProgramHandle
);
render_handle!(
    /// Identifies a command buffer registered with the renderer.
    CommandBufferHandle
);
