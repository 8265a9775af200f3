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


//! A headless [`GlDevice`] that records every call instead of talking to a GPU.

use super::device::{AttribPointer, BufferTarget, GlDevice};
use std::collections::HashMap;

/// One call received by a [`RecordingGlDevice`].
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    /// A program was compiled and linked.
    CompileProgram(u32),
    /// A program was deleted.
    DeleteProgram(u32),
    /// A buffer was created with `size` bytes.
    CreateBuffer {
        /// The new buffer.
        buffer: u32,
        /// Its binding point.
        target: BufferTarget,
        /// Uploaded bytes.
        size: usize,
    },
    /// A buffer was deleted.
    DeleteBuffer(u32),
    /// `glUseProgram`.
    UseProgram(Option<u32>),
    /// `glBindBuffer`.
    BindBuffer(BufferTarget, Option<u32>),
    /// `glEnableVertexAttribArray` + `glVertexAttribPointer`.
    EnableVertexAttrib(u32, AttribPointer),
    /// `glDisableVertexAttribArray`.
    DisableVertexAttrib(u32),
    /// `glUniformMatrix4fv`.
    SetUniformMat4(u32, [f32; 16]),
    /// `glClear` with its clear values.
    Clear {
        /// Buffer bit mask.
        mask: u32,
        /// Clear color.
        color: [f32; 4],
        /// Clear depth.
        depth: f32,
        /// Clear stencil.
        stencil: i32,
    },
    /// `glDrawElements`.
    DrawElements {
        /// Primitive mode.
        mode: u32,
        /// Number of indices.
        count: i32,
        /// Index type enum.
        index_type: u32,
        /// Byte offset into the index buffer.
        offset: i32,
    },
    /// `glDrawArrays`.
    DrawArrays {
        /// Primitive mode.
        mode: u32,
        /// First vertex.
        first: i32,
        /// Number of vertices.
        count: i32,
    },
}

#[derive(Debug, Default)]
struct Reflection {
    uniforms: Vec<String>,
    attributes: Vec<String>,
}

/// Collects the names declared after one of `keywords`, e.g. `uniform mat4 u_model;`.
///
/// This is a plain token scan, not a GLSL parser: it only understands one
/// declaration per statement and ignores block syntax.
fn scan_declarations(source: &str, keywords: &[&str], into: &mut Vec<String>) {
    for statement in source.split(';') {
        let tokens: Vec<&str> = statement.split_whitespace().collect();
        let Some(at) = tokens.iter().position(|t| keywords.contains(t)) else {
            continue;
        };
        if tokens.len() < at + 3 {
            continue;
        }
        let Some(name) = tokens.last().and_then(|t| t.split('[').next()) else {
            continue;
        };
        if !name.is_empty() && !into.iter().any(|n| n == name) {
            into.push(name.to_owned());
        }
    }
}

/// A [`GlDevice`] that hands out sequential object ids and records every call.
///
/// Reflection comes from scanning the shader sources for `uniform` and
/// `in`/`attribute` declarations. Locations are the declaration order. Compilation
/// fails when a stage has no `main`.
#[derive(Debug, Default)]
pub struct RecordingGlDevice {
    next_id: u32,
    programs: HashMap<u32, Reflection>,
    buffers: HashMap<u32, usize>,
    calls: Vec<GlCall>,
}

impl RecordingGlDevice {
    /// Creates a device with no objects and an empty call log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call recorded since creation or the last [`take_calls`](Self::take_calls).
    pub fn calls(&self) -> &[GlCall] {
        &self.calls
    }

    /// Drains the call log.
    pub fn take_calls(&mut self) -> Vec<GlCall> {
        std::mem::take(&mut self.calls)
    }

    /// Number of programs that have not been deleted.
    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    /// Number of buffers that have not been deleted.
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    fn record(&mut self, call: GlCall) {
        log::trace!("gl: {call:?}");
        self.calls.push(call);
    }

    fn next_object(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

impl GlDevice for RecordingGlDevice {
    type Program = u32;
    type Buffer = u32;
    type UniformLocation = u32;

    fn compile_program(&mut self, vertex_source: &str, fragment_source: &str) -> Result<u32, String> {
        if !vertex_source.contains("main") {
            return Err("vertex stage: no entry point".to_owned());
        }
        if !fragment_source.contains("main") {
            return Err("fragment stage: no entry point".to_owned());
        }

        let mut reflection = Reflection::default();
        scan_declarations(vertex_source, &["uniform"], &mut reflection.uniforms);
        scan_declarations(fragment_source, &["uniform"], &mut reflection.uniforms);
        scan_declarations(vertex_source, &["in", "attribute"], &mut reflection.attributes);

        let program = self.next_object();
        self.programs.insert(program, reflection);
        self.record(GlCall::CompileProgram(program));
        Ok(program)
    }

    fn delete_program(&mut self, program: u32) {
        self.programs.remove(&program);
        self.record(GlCall::DeleteProgram(program));
    }

    fn active_uniforms(&self, program: u32) -> Vec<String> {
        self.programs
            .get(&program)
            .map(|r| r.uniforms.clone())
            .unwrap_or_default()
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        let reflection = self.programs.get(&program)?;
        reflection
            .uniforms
            .iter()
            .position(|n| n == name)
            .map(|i| i as u32)
    }

    fn attribute_location(&self, program: u32, name: &str) -> Option<u32> {
        let reflection = self.programs.get(&program)?;
        reflection
            .attributes
            .iter()
            .position(|n| n == name)
            .map(|i| i as u32)
    }

    fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> Result<u32, String> {
        let buffer = self.next_object();
        self.buffers.insert(buffer, data.len());
        self.record(GlCall::CreateBuffer {
            buffer,
            target,
            size: data.len(),
        });
        Ok(buffer)
    }

    fn delete_buffer(&mut self, buffer: u32) {
        self.buffers.remove(&buffer);
        self.record(GlCall::DeleteBuffer(buffer));
    }

    fn use_program(&mut self, program: Option<u32>) {
        self.record(GlCall::UseProgram(program));
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<u32>) {
        self.record(GlCall::BindBuffer(target, buffer));
    }

    fn enable_vertex_attrib(&mut self, location: u32, pointer: AttribPointer) {
        self.record(GlCall::EnableVertexAttrib(location, pointer));
    }

    fn disable_vertex_attrib(&mut self, location: u32) {
        self.record(GlCall::DisableVertexAttrib(location));
    }

    fn set_uniform_mat4(&mut self, location: &u32, value: &[f32; 16]) {
        self.record(GlCall::SetUniformMat4(*location, *value));
    }

    fn clear(&mut self, mask: u32, color: [f32; 4], depth: f32, stencil: i32) {
        self.record(GlCall::Clear {
            mask,
            color,
            depth,
            stencil,
        });
    }

    fn draw_elements(&mut self, mode: u32, count: i32, index_type: u32, offset: i32) {
        self.record(GlCall::DrawElements {
            mode,
            count,
            index_type,
            offset,
        });
    }

    fn draw_arrays(&mut self, mode: u32, first: i32, count: i32) {
        self.record(GlCall::DrawArrays { mode, first, count });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = "#version 330 core
        layout(location = 0) in vec3 a_position;
        in vec2 a_texcoord0;
        uniform mat4 u_modelViewProj;
        uniform float u_time;
        void main() { gl_Position = u_modelViewProj * vec4(a_position, 1.0); }";

    const FRAGMENT: &str = "#version 330 core
        uniform vec4 u_tint[2];
        out vec4 frag;
        void main() { frag = u_tint[0]; }";

    #[test]
    fn test_reflection_scans_declarations() {
        let mut device = RecordingGlDevice::new();
        let program = device.compile_program(VERTEX, FRAGMENT).unwrap();

        assert_eq!(
            device.active_uniforms(program),
            vec!["u_modelViewProj", "u_time", "u_tint"]
        );
        assert_eq!(device.attribute_location(program, "a_position"), Some(0));
        assert_eq!(device.attribute_location(program, "a_texcoord0"), Some(1));
        assert_eq!(device.attribute_location(program, "a_normal"), None);
        assert_eq!(device.uniform_location(program, "u_time"), Some(1));
    }

    #[test]
    fn test_missing_entry_point_fails_to_compile() {
        let mut device = RecordingGlDevice::new();
        assert!(device.compile_program("uniform mat4 u_view;", FRAGMENT).is_err());
        assert!(device.compile_program(VERTEX, "").is_err());
        assert_eq!(device.live_programs(), 0);
        assert!(device.calls().is_empty());
    }

    #[test]
    fn test_objects_are_tracked_until_deleted() {
        let mut device = RecordingGlDevice::new();
        let a = device.create_buffer(BufferTarget::Array, &[0; 12]).unwrap();
        let b = device.create_buffer(BufferTarget::ElementArray, &[0; 6]).unwrap();
        assert_ne!(a, b);
        assert_eq!(device.live_buffers(), 2);

        device.delete_buffer(a);
        assert_eq!(device.live_buffers(), 1);
        assert_eq!(device.take_calls().len(), 3);
        assert!(device.calls().is_empty());
    }
}
