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


//! The raw GL entry points the commit backend is written against.
//!
//! [`GlDevice`] mirrors the small slice of the OpenGL API that the driver needs,
//! using `glow`-style signatures: enums are plain `u32` values from [`consts`] and
//! native objects are opaque associated types.

use std::fmt::Debug;

/// GL enum values, as defined by the OpenGL headers.
pub mod consts {
    /// `GL_DEPTH_BUFFER_BIT`
    pub const DEPTH_BUFFER_BIT: u32 = 0x0000_0100;
    /// `GL_STENCIL_BUFFER_BIT`
    pub const STENCIL_BUFFER_BIT: u32 = 0x0000_0400;
    /// `GL_COLOR_BUFFER_BIT`
    pub const COLOR_BUFFER_BIT: u32 = 0x0000_4000;

    /// `GL_TRIANGLES`
    pub const TRIANGLES: u32 = 0x0004;

    /// `GL_UNSIGNED_BYTE`
    pub const UNSIGNED_BYTE: u32 = 0x1401;
    /// `GL_SHORT`
    pub const SHORT: u32 = 0x1402;
    /// `GL_UNSIGNED_SHORT`
    pub const UNSIGNED_SHORT: u32 = 0x1403;
    /// `GL_UNSIGNED_INT`
    pub const UNSIGNED_INT: u32 = 0x1405;
    /// `GL_FLOAT`
    pub const FLOAT: u32 = 0x1406;
    /// `GL_HALF_FLOAT`
    pub const HALF_FLOAT: u32 = 0x140B;
}

/// Binding point of a buffer object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// `GL_ARRAY_BUFFER`, vertex data.
    Array,
    /// `GL_ELEMENT_ARRAY_BUFFER`, index data.
    ElementArray,
}

/// Arguments of a `glVertexAttribPointer` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttribPointer {
    /// Number of components, `1..=4`.
    pub size: i32,
    /// Component type enum.
    pub data_type: u32,
    /// Whether integer data is normalized.
    pub normalized: bool,
    /// Byte distance between consecutive vertices.
    pub stride: i32,
    /// Byte offset of the attribute within a vertex.
    pub offset: i32,
}

/// A GL context the driver can issue commands to.
///
/// Implementations are expected to be thin: no state caching happens at this level,
/// every redundant-state decision is taken by the driver above.
pub trait GlDevice: Debug {
    /// A linked program object.
    type Program: Copy + Eq + Debug;
    /// A buffer object.
    type Buffer: Copy + Eq + Debug;
    /// A uniform location inside a program.
    type UniformLocation: Clone + Debug;

    /// Compiles both stages and links them. On failure returns the info log.
    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self::Program, String>;

    /// Deletes a program object.
    fn delete_program(&mut self, program: Self::Program);

    /// Names of the active uniforms of a linked program.
    fn active_uniforms(&self, program: Self::Program) -> Vec<String>;

    /// Location of a uniform, if the program uses it.
    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation>;

    /// Location of a vertex input, if the program uses it.
    fn attribute_location(&self, program: Self::Program, name: &str) -> Option<u32>;

    /// Creates a buffer object and uploads `data` into it.
    fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> Result<Self::Buffer, String>;

    /// Deletes a buffer object.
    fn delete_buffer(&mut self, buffer: Self::Buffer);

    /// `glUseProgram`. `None` unbinds.
    fn use_program(&mut self, program: Option<Self::Program>);

    /// `glBindBuffer`. `None` unbinds.
    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<Self::Buffer>);

    /// Enables a vertex attribute array and points it into the bound array buffer.
    fn enable_vertex_attrib(&mut self, location: u32, pointer: AttribPointer);

    /// Disables a vertex attribute array.
    fn disable_vertex_attrib(&mut self, location: u32);

    /// Uploads a column-major 4x4 matrix.
    fn set_uniform_mat4(&mut self, location: &Self::UniformLocation, value: &[f32; 16]);

    /// Clears the planes named by `mask`.
    fn clear(&mut self, mask: u32, color: [f32; 4], depth: f32, stencil: i32);

    /// `glDrawElements` with `offset` in bytes into the bound index buffer.
    fn draw_elements(&mut self, mode: u32, count: i32, index_type: u32, offset: i32);

    /// `glDrawArrays`.
    fn draw_arrays(&mut self, mode: u32, first: i32, count: i32);
}
