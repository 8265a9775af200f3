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


//! The OpenGL implementation of [`RenderDriver`].

use super::conversions::IntoGl;
use super::device::{consts, AttribPointer, BufferTarget, GlDevice};
use kiln_core::math::Mat4;
use kiln_core::renderer::{
    Attribute, CommandBuffer, CommitStats, DrawCommand, IndexBufferHandle, IndexFormat,
    MemoryBlob, PredefinedUniform, RenderDriver, RenderError, RenderHandle, ResourceError,
    ShaderProgramHandle, VertexBufferHandle, VertexLayout, VertexLayoutHandle, MAX_ATTRIBUTES,
    MAX_INDEX_BUFFERS, MAX_SHADER_PROGRAMS, MAX_VERTEX_BUFFERS, MAX_VERTEX_LAYOUTS,
};
use std::fmt;

#[derive(Debug)]
struct ShaderProgram<P, L> {
    // `None` when compilation or linking failed.
    native: Option<P>,
    predefined: Vec<(PredefinedUniform, L)>,
    attributes: [Option<u32>; MAX_ATTRIBUTES],
    custom_uniforms: Vec<String>,
}

#[derive(Debug)]
struct VertexBufferGl<B> {
    native: B,
    size: u32,
    layout: VertexLayoutHandle,
}

#[derive(Debug)]
struct IndexBufferGl<B> {
    native: B,
    size: u32,
    format: IndexFormat,
}

fn table<T>(capacity: usize) -> Vec<Option<T>> {
    std::iter::repeat_with(|| None).take(capacity).collect()
}

fn slot_mut<H: RenderHandle, T>(
    table: &mut [Option<T>],
    handle: H,
) -> Result<&mut Option<T>, ResourceError> {
    table
        .get_mut(handle.index() as usize)
        .ok_or(ResourceError::InvalidHandle)
}

fn entry<H: RenderHandle, T>(table: &[Option<T>], handle: H) -> Option<&T> {
    table.get(handle.index() as usize)?.as_ref()
}

// GL arguments of one draw, already range-checked.
#[derive(Debug, Clone, Copy)]
enum DrawCall {
    Elements { count: i32, index_type: u32, offset: i32 },
    Arrays { first: i32, count: i32 },
}

/// Camera-derived matrices, each computed at most once per commit.
#[derive(Debug)]
pub(crate) struct MatrixCache {
    view: Mat4,
    projection: Mat4,
    inv_view: Option<Mat4>,
    inv_projection: Option<Mat4>,
    view_projection: Option<Mat4>,
    inv_view_projection: Option<Mat4>,
    inversions: u32,
}

impl MatrixCache {
    pub(crate) fn new(view: Mat4, projection: Mat4) -> Self {
        Self {
            view,
            projection,
            inv_view: None,
            inv_projection: None,
            view_projection: None,
            inv_view_projection: None,
            inversions: 0,
        }
    }

    fn invert(matrix: Mat4, inversions: &mut u32) -> Mat4 {
        *inversions += 1;
        matrix.inverse().unwrap_or_else(|| {
            log::warn!("Singular camera matrix, using identity for its inverse");
            Mat4::IDENTITY
        })
    }

    fn view_projection(&mut self) -> Mat4 {
        let (view, projection) = (self.view, self.projection);
        *self
            .view_projection
            .get_or_insert_with(|| projection * view)
    }

    /// Returns the value of `uniform` for a draw with the given model matrix.
    pub(crate) fn get(&mut self, uniform: PredefinedUniform, model: &Mat4) -> Mat4 {
        match uniform {
            PredefinedUniform::View => self.view,
            PredefinedUniform::Proj => self.projection,
            PredefinedUniform::InvView => {
                let view = self.view;
                let inversions = &mut self.inversions;
                *self
                    .inv_view
                    .get_or_insert_with(|| Self::invert(view, inversions))
            }
            PredefinedUniform::InvProj => {
                let projection = self.projection;
                let inversions = &mut self.inversions;
                *self
                    .inv_projection
                    .get_or_insert_with(|| Self::invert(projection, inversions))
            }
            PredefinedUniform::ViewProj => self.view_projection(),
            PredefinedUniform::InvViewProj => {
                if let Some(inverse) = self.inv_view_projection {
                    return inverse;
                }
                let inverse = Self::invert(self.view_projection(), &mut self.inversions);
                self.inv_view_projection = Some(inverse);
                inverse
            }
            PredefinedUniform::Model => *model,
            PredefinedUniform::ModelView => self.view * *model,
            PredefinedUniform::ModelViewProj => self.view_projection() * *model,
        }
    }

    pub(crate) fn inversions(&self) -> u32 {
        self.inversions
    }
}

/// A [`RenderDriver`] issuing OpenGL calls through a [`GlDevice`].
///
/// Native objects live in tables indexed by renderer handles. [`commit`] replays a
/// command buffer in submission order and only touches GL state that differs from
/// the previous draw:
///
/// - a new program handle rebinds the program and, since attribute locations are
///   per program, the buffers and attribute arrays too;
/// - a new vertex or index buffer handle rebinds buffers and attribute arrays;
/// - draws without a compiled program or a live vertex buffer are skipped.
///
/// [`commit`]: RenderDriver::commit
pub struct GlDriver<D: GlDevice> {
    device: D,
    programs: Vec<Option<ShaderProgram<D::Program, D::UniformLocation>>>,
    vertex_buffers: Vec<Option<VertexBufferGl<D::Buffer>>>,
    index_buffers: Vec<Option<IndexBufferGl<D::Buffer>>>,
    layouts: Vec<Option<VertexLayout>>,
    enabled_attributes: Vec<u32>,
    is_initialized: bool,
}

impl<D: GlDevice> fmt::Debug for GlDriver<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlDriver")
            .field("device", &self.device)
            .field("programs", &self.programs.iter().flatten().count())
            .field("vertex_buffers", &self.vertex_buffers.iter().flatten().count())
            .field("index_buffers", &self.index_buffers.iter().flatten().count())
            .field("layouts", &self.layouts.iter().flatten().count())
            .finish()
    }
}

impl<D: GlDevice> GlDriver<D> {
    /// Wraps a device. Call [`RenderDriver::init`] before use.
    pub fn new(device: D) -> Self {
        Self {
            device,
            programs: table(MAX_SHADER_PROGRAMS),
            vertex_buffers: table(MAX_VERTEX_BUFFERS),
            index_buffers: table(MAX_INDEX_BUFFERS),
            layouts: table(MAX_VERTEX_LAYOUTS),
            enabled_attributes: Vec::with_capacity(MAX_ATTRIBUTES),
            is_initialized: false,
        }
    }

    /// The underlying device.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// The underlying device, mutably.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Names of the uniforms of `program` that the engine does not fill in.
    ///
    /// They are collected during reflection but never updated per draw.
    pub fn custom_uniforms(&self, program: ShaderProgramHandle) -> &[String] {
        entry(&self.programs, program)
            .map(|p| p.custom_uniforms.as_slice())
            .unwrap_or_default()
    }

    /// Returns `true` if `program` exists and compiled.
    pub fn is_program_linked(&self, program: ShaderProgramHandle) -> bool {
        entry(&self.programs, program).is_some_and(|p| p.native.is_some())
    }

    fn reflect(&self, handle: ShaderProgramHandle, native: D::Program) -> ShaderProgram<D::Program, D::UniformLocation> {
        let mut predefined = Vec::new();
        let mut custom_uniforms = Vec::new();
        for name in self.device.active_uniforms(native) {
            match PredefinedUniform::from_name(&name) {
                Some(uniform) => {
                    if let Some(location) = self.device.uniform_location(native, &name) {
                        predefined.push((uniform, location));
                    }
                }
                None => {
                    log::debug!("Program {handle:?}: uniform '{name}' is not engine-provided");
                    custom_uniforms.push(name);
                }
            }
        }

        let mut attributes = [None; MAX_ATTRIBUTES];
        for attribute in Attribute::ALL {
            attributes[attribute.slot()] =
                self.device.attribute_location(native, attribute.shader_name());
        }

        ShaderProgram {
            native: Some(native),
            predefined,
            attributes,
            custom_uniforms,
        }
    }

    /// Binds the buffers of `command` and points the program's attributes into them.
    fn bind_buffers(&mut self, command: &DrawCommand, stats: &mut CommitStats) {
        let vertex_buffer = entry(&self.vertex_buffers, command.vertex_buffer);
        let index_buffer = entry(&self.index_buffers, command.index_buffer);
        self.device
            .bind_buffer(BufferTarget::Array, vertex_buffer.map(|vb| vb.native));
        self.device
            .bind_buffer(BufferTarget::ElementArray, index_buffer.map(|ib| ib.native));
        stats.buffer_binds += 1;

        for location in self.enabled_attributes.drain(..) {
            self.device.disable_vertex_attrib(location);
        }

        let program = entry(&self.programs, command.program);
        let layout = vertex_buffer.and_then(|vb| entry(&self.layouts, vb.layout));
        if let (Some(program), Some(layout)) = (program, layout) {
            let stride = i32::from(layout.stride());
            for (layout_entry, offset) in layout.iter() {
                let Some(location) = program.attributes[layout_entry.attribute.slot()] else {
                    continue;
                };
                self.device.enable_vertex_attrib(
                    location,
                    AttribPointer {
                        size: i32::from(layout_entry.component_count),
                        data_type: layout_entry.component_type.into_gl(),
                        normalized: layout_entry.normalized,
                        stride,
                        offset: i32::from(offset),
                    },
                );
                self.enabled_attributes.push(location);
            }
        }
        stats.attribute_rebinds += 1;
    }

    /// Resolves the GL arguments of `command`, or `None` when they do not fit in a
    /// GL draw call.
    fn draw_call(&self, command: &DrawCommand, vertex_buffer: &VertexBufferGl<D::Buffer>) -> Option<DrawCall> {
        if let Some(index_buffer) = entry(&self.index_buffers, command.index_buffer) {
            let index_size = index_buffer.format.size();
            let count = if command.index_count == DrawCommand::USE_ALL {
                (index_buffer.size / index_size).saturating_sub(command.start_index)
            } else {
                command.index_count
            };
            let offset = command.start_index.checked_mul(index_size)?;
            return Some(DrawCall::Elements {
                count: i32::try_from(count).ok()?,
                index_type: index_buffer.format.into_gl(),
                offset: i32::try_from(offset).ok()?,
            });
        }

        let count = if command.vertex_count == DrawCommand::USE_ALL {
            let stride = entry(&self.layouts, vertex_buffer.layout)
                .map(|layout| u32::from(layout.stride()))
                .filter(|&stride| stride > 0)
                .unwrap_or(1);
            (vertex_buffer.size / stride).saturating_sub(command.start_vertex)
        } else {
            command.vertex_count
        };
        Some(DrawCall::Arrays {
            first: i32::try_from(command.start_vertex).ok()?,
            count: i32::try_from(count).ok()?,
        })
    }

    /// Uploads uniforms and issues the draw call. Returns `false` if the draw was skipped.
    fn draw(&mut self, command: &DrawCommand, matrices: &mut MatrixCache, stats: &mut CommitStats) -> bool {
        let Some(program) = entry(&self.programs, command.program) else {
            return false;
        };
        let Some(vertex_buffer) = entry(&self.vertex_buffers, command.vertex_buffer) else {
            return false;
        };
        if program.native.is_none() {
            return false;
        }
        let Some(call) = self.draw_call(command, vertex_buffer) else {
            log::warn!(
                "Skipping draw with out-of-range arguments (start index {}, index count {}, start vertex {}, vertex count {})",
                command.start_index,
                command.index_count,
                command.start_vertex,
                command.vertex_count
            );
            return false;
        };

        for (uniform, location) in &program.predefined {
            let value = matrices.get(*uniform, &command.transform);
            self.device
                .set_uniform_mat4(location, &value.to_cols_array());
            stats.uniform_uploads += 1;
        }

        match call {
            DrawCall::Elements {
                count,
                index_type,
                offset,
            } => self
                .device
                .draw_elements(consts::TRIANGLES, count, index_type, offset),
            DrawCall::Arrays { first, count } => {
                self.device.draw_arrays(consts::TRIANGLES, first, count)
            }
        }
        stats.draw_calls += 1;
        true
    }
}

impl<D: GlDevice> RenderDriver for GlDriver<D> {
    fn init(&mut self) -> Result<(), RenderError> {
        if self.is_initialized {
            return Err(RenderError::InitializationFailed(
                "GL driver is already initialised".to_owned(),
            ));
        }
        self.is_initialized = true;
        log::info!("GL driver initialised");
        Ok(())
    }

    fn shutdown(&mut self) {
        if !self.is_initialized {
            return;
        }
        let mut released = 0;
        for program in self.programs.iter_mut().filter_map(Option::take) {
            if let Some(native) = program.native {
                self.device.delete_program(native);
            }
            released += 1;
        }
        for buffer in self.vertex_buffers.iter_mut().filter_map(Option::take) {
            self.device.delete_buffer(buffer.native);
            released += 1;
        }
        for buffer in self.index_buffers.iter_mut().filter_map(Option::take) {
            self.device.delete_buffer(buffer.native);
            released += 1;
        }
        self.layouts.iter_mut().for_each(|layout| *layout = None);
        self.enabled_attributes.clear();
        self.is_initialized = false;
        log::info!("GL driver shut down, released {released} object(s)");
    }

    fn create_vertex_buffer(
        &mut self,
        handle: VertexBufferHandle,
        data: &MemoryBlob,
        layout: VertexLayoutHandle,
    ) -> Result<(), ResourceError> {
        if entry(&self.layouts, layout).is_none() {
            return Err(ResourceError::NotFound);
        }
        let native = self
            .device
            .create_buffer(BufferTarget::Array, data.as_bytes())
            .map_err(ResourceError::BackendError)?;
        *slot_mut(&mut self.vertex_buffers, handle)? = Some(VertexBufferGl {
            native,
            size: data.len() as u32,
            layout,
        });
        Ok(())
    }

    fn destroy_vertex_buffer(&mut self, handle: VertexBufferHandle) {
        match self
            .vertex_buffers
            .get_mut(handle.index() as usize)
            .and_then(Option::take)
        {
            Some(buffer) => self.device.delete_buffer(buffer.native),
            None => log::warn!("Destroying unknown vertex buffer {handle:?}"),
        }
    }

    fn create_index_buffer(
        &mut self,
        handle: IndexBufferHandle,
        data: &MemoryBlob,
        format: IndexFormat,
    ) -> Result<(), ResourceError> {
        let native = self
            .device
            .create_buffer(BufferTarget::ElementArray, data.as_bytes())
            .map_err(ResourceError::BackendError)?;
        *slot_mut(&mut self.index_buffers, handle)? = Some(IndexBufferGl {
            native,
            size: data.len() as u32,
            format,
        });
        Ok(())
    }

    fn destroy_index_buffer(&mut self, handle: IndexBufferHandle) {
        match self
            .index_buffers
            .get_mut(handle.index() as usize)
            .and_then(Option::take)
        {
            Some(buffer) => self.device.delete_buffer(buffer.native),
            None => log::warn!("Destroying unknown index buffer {handle:?}"),
        }
    }

    fn create_vertex_layout(
        &mut self,
        handle: VertexLayoutHandle,
        layout: &VertexLayout,
    ) -> Result<(), ResourceError> {
        *slot_mut(&mut self.layouts, handle)? = Some(layout.clone());
        Ok(())
    }

    fn destroy_vertex_layout(&mut self, handle: VertexLayoutHandle) {
        if let Some(layout) = self.layouts.get_mut(handle.index() as usize) {
            *layout = None;
        }
    }

    fn create_program(
        &mut self,
        handle: ShaderProgramHandle,
        vertex_source: &MemoryBlob,
        fragment_source: &MemoryBlob,
    ) -> Result<(), ResourceError> {
        slot_mut(&mut self.programs, handle)?;

        let compiled = match (vertex_source.as_str(), fragment_source.as_str()) {
            (Some(vs), Some(fs)) => self.device.compile_program(vs, fs),
            _ => Err("shader source is not valid UTF-8".to_owned()),
        };

        let program = match compiled {
            Ok(native) => self.reflect(handle, native),
            Err(info_log) => {
                log::error!("Shader program {handle:?} failed to build: {info_log}");
                ShaderProgram {
                    native: None,
                    predefined: Vec::new(),
                    attributes: [None; MAX_ATTRIBUTES],
                    custom_uniforms: Vec::new(),
                }
            }
        };
        *slot_mut(&mut self.programs, handle)? = Some(program);
        Ok(())
    }

    fn destroy_program(&mut self, handle: ShaderProgramHandle) {
        match self
            .programs
            .get_mut(handle.index() as usize)
            .and_then(Option::take)
        {
            Some(program) => {
                if let Some(native) = program.native {
                    self.device.delete_program(native);
                }
            }
            None => log::warn!("Destroying unknown shader program {handle:?}"),
        }
    }

    fn commit(&mut self, commands: &CommandBuffer) -> CommitStats {
        let mut stats = CommitStats::default();

        let clear = commands.clear_settings();
        if !clear.flags.is_empty() {
            self.device.clear(
                clear.flags.into_gl(),
                clear.color.to_array(),
                clear.depth,
                i32::from(clear.stencil),
            );
            stats.clears += 1;
        }

        let mut matrices = MatrixCache::new(*commands.view(), *commands.projection());
        let mut program = ShaderProgramHandle::INVALID;
        let mut vertex_buffer = VertexBufferHandle::INVALID;
        let mut index_buffer = IndexBufferHandle::INVALID;

        for command in commands.draw_commands() {
            let program_changed = command.program != program;
            if program_changed {
                program = command.program;
                let native = entry(&self.programs, program).and_then(|p| p.native);
                self.device.use_program(native);
                stats.program_binds += 1;
            }

            if program_changed
                || command.vertex_buffer != vertex_buffer
                || command.index_buffer != index_buffer
            {
                vertex_buffer = command.vertex_buffer;
                index_buffer = command.index_buffer;
                self.bind_buffers(command, &mut stats);
            }

            if !self.draw(command, &mut matrices, &mut stats) {
                stats.skipped_draws += 1;
            }
        }

        log::trace!(
            "Committed {} draw(s), skipped {}, {} matrix inversion(s)",
            stats.draw_calls,
            stats.skipped_draws,
            matrices.inversions()
        );
        stats
    }
}
