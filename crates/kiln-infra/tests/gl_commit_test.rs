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


use kiln_core::math::{Mat4, Vec3};
use kiln_core::renderer::{
    Attribute, ClearFlags, ClearSettings, CommandBuffer, ComponentType, DrawCommand,
    IndexBufferHandle, IndexFormat, MemoryBlob, RenderDriver, RenderHandle, ResourceError,
    ShaderProgramHandle, VertexBufferHandle, VertexLayout, VertexLayoutEntry, VertexLayoutHandle,
};
use kiln_infra::graphics::gl::{consts, GlCall, GlDriver, RecordingGlDevice};

const VERTEX_SHADER: &str = "#version 330 core
in vec3 a_position;
uniform mat4 u_modelViewProj;
void main() { gl_Position = u_modelViewProj * vec4(a_position, 1.0); }";

const FRAGMENT_SHADER: &str = "#version 330 core
uniform vec4 u_color;
out vec4 frag_color;
void main() { frag_color = u_color; }";

const P1: ShaderProgramHandle = ShaderProgramHandle(0);
const P2: ShaderProgramHandle = ShaderProgramHandle(1);
const V1: VertexBufferHandle = VertexBufferHandle(0);
const I1: IndexBufferHandle = IndexBufferHandle(0);
const LAYOUT: VertexLayoutHandle = VertexLayoutHandle(0);

/// A driver holding two programs, a 4-vertex quad and its 6 16-bit indices.
fn driver() -> GlDriver<RecordingGlDevice> {
    let mut driver = GlDriver::new(RecordingGlDevice::new());
    driver.init().unwrap();

    let layout = VertexLayout::new(&[VertexLayoutEntry::new(
        Attribute::Position,
        ComponentType::Float32,
        3,
    )])
    .unwrap();
    let vs = MemoryBlob::from_static(VERTEX_SHADER.as_bytes());
    let fs = MemoryBlob::from_static(FRAGMENT_SHADER.as_bytes());

    driver.create_program(P1, &vs, &fs).unwrap();
    driver.create_program(P2, &vs, &fs).unwrap();
    driver.create_vertex_layout(LAYOUT, &layout).unwrap();
    driver
        .create_vertex_buffer(V1, &MemoryBlob::from_pod_slice(&[0.0f32; 12]), LAYOUT)
        .unwrap();
    driver
        .create_index_buffer(
            I1,
            &MemoryBlob::from_pod_slice(&[0u16, 1, 2, 2, 3, 0]),
            IndexFormat::Uint16,
        )
        .unwrap();
    driver.device_mut().take_calls();
    driver
}

fn draw(program: ShaderProgramHandle, vertex_buffer: VertexBufferHandle, index_buffer: IndexBufferHandle) -> DrawCommand {
    DrawCommand {
        program,
        vertex_buffer,
        index_buffer,
        ..Default::default()
    }
}

fn summarize(calls: &[GlCall]) -> Vec<&'static str> {
    calls
        .iter()
        .map(|call| match call {
            GlCall::Clear { .. } => "clear",
            GlCall::UseProgram(_) => "use_program",
            GlCall::BindBuffer(..) => "bind_buffer",
            GlCall::EnableVertexAttrib(..) => "enable_attrib",
            GlCall::DisableVertexAttrib(_) => "disable_attrib",
            GlCall::SetUniformMat4(..) => "uniform",
            GlCall::DrawElements { .. } => "draw_elements",
            GlCall::DrawArrays { .. } => "draw_arrays",
            _ => "other",
        })
        .collect()
}

#[test]
fn test_commit_only_rebinds_changed_state() {
    // --- 1. ARRANGE ---
    let mut driver = driver();
    let mut commands = CommandBuffer::new(DrawCommand::ARENA_FOOTPRINT * 8);
    commands.record(draw(P1, V1, I1)).unwrap();
    commands.record(draw(P1, V1, I1)).unwrap();
    commands.record(draw(P2, V1, I1)).unwrap();

    // --- 2. ACT ---
    let stats = driver.commit(&commands);

    // --- 3. ASSERT ---
    assert_eq!(stats.program_binds, 2);
    assert_eq!(stats.buffer_binds, 2);
    assert_eq!(
        stats.attribute_rebinds, 2,
        "Switching programs must rebind attributes even with unchanged buffers"
    );
    assert_eq!(stats.draw_calls, 3);
    assert_eq!(stats.skipped_draws, 0);
    assert_eq!(stats.clears, 1);
    assert_eq!(stats.uniform_uploads, 3);

    assert_eq!(
        summarize(driver.device().calls()),
        vec![
            "clear",
            // {P1, V1, I1}
            "use_program",
            "bind_buffer",
            "bind_buffer",
            "enable_attrib",
            "uniform",
            "draw_elements",
            // {P1, V1, I1} again: nothing to rebind
            "uniform",
            "draw_elements",
            // {P2, V1, I1}
            "use_program",
            "bind_buffer",
            "bind_buffer",
            "disable_attrib",
            "enable_attrib",
            "uniform",
            "draw_elements",
        ]
    );
}

#[test]
fn test_each_commit_starts_from_unbound_state() {
    let mut driver = driver();
    let mut commands = CommandBuffer::new(DrawCommand::ARENA_FOOTPRINT * 2);
    commands.record(draw(P1, V1, I1)).unwrap();

    let first = driver.commit(&commands);
    let second = driver.commit(&commands);

    assert_eq!(first, second);
    assert_eq!(second.program_binds, 1);
}

#[test]
fn test_attribute_pointer_follows_layout() {
    let mut driver = driver();
    let mut commands = CommandBuffer::new(DrawCommand::ARENA_FOOTPRINT);
    commands.record(draw(P1, V1, I1)).unwrap();
    driver.commit(&commands);

    let pointer = driver
        .device()
        .calls()
        .iter()
        .find_map(|call| match call {
            GlCall::EnableVertexAttrib(location, pointer) => Some((*location, *pointer)),
            _ => None,
        })
        .expect("a_position is bound");
    assert_eq!(pointer.0, 0);
    assert_eq!(pointer.1.size, 3);
    assert_eq!(pointer.1.data_type, consts::FLOAT);
    assert_eq!(pointer.1.stride, 12);
    assert_eq!(pointer.1.offset, 0);
}

#[test]
fn test_draws_without_program_or_vertex_buffer_are_skipped() {
    let mut driver = driver();
    let mut commands = CommandBuffer::new(DrawCommand::ARENA_FOOTPRINT * 4);
    commands
        .record(draw(ShaderProgramHandle::INVALID, V1, I1))
        .unwrap();
    commands
        .record(draw(P1, VertexBufferHandle::INVALID, I1))
        .unwrap();
    commands.record(draw(P1, VertexBufferHandle(7), I1)).unwrap();

    let stats = driver.commit(&commands);

    assert_eq!(stats.skipped_draws, 3);
    assert_eq!(stats.draw_calls, 0);
    assert_eq!(stats.uniform_uploads, 0);
    assert!(!summarize(driver.device().calls()).contains(&"draw_elements"));
}

#[test]
fn test_failed_program_is_kept_but_never_drawn() {
    let mut driver = driver();
    let broken = ShaderProgramHandle(5);
    let result = driver.create_program(
        broken,
        &MemoryBlob::from_source("in vec3 a_position;"),
        &MemoryBlob::from_source(FRAGMENT_SHADER),
    );
    assert!(result.is_ok(), "Compile failures are logged, not returned");
    assert!(!driver.is_program_linked(broken));
    assert!(driver.is_program_linked(P1));

    let mut commands = CommandBuffer::new(DrawCommand::ARENA_FOOTPRINT);
    commands.record(draw(broken, V1, I1)).unwrap();
    let stats = driver.commit(&commands);

    assert_eq!(stats.program_binds, 1);
    assert_eq!(stats.skipped_draws, 1);
    assert!(driver.device().calls().contains(&GlCall::UseProgram(None)));
}

#[test]
fn test_unrecognised_uniforms_are_collected() {
    let driver = driver();
    assert_eq!(driver.custom_uniforms(P1), ["u_color".to_owned()]);
    assert!(driver.custom_uniforms(ShaderProgramHandle(9)).is_empty());
}

#[test]
fn test_index_counts_and_offsets() {
    let mut driver = driver();
    let mut commands = CommandBuffer::new(DrawCommand::ARENA_FOOTPRINT * 4);
    commands
        .record(DrawCommand {
            start_index: 2,
            ..draw(P1, V1, I1)
        })
        .unwrap();
    commands
        .record(DrawCommand {
            index_count: 3,
            start_index: 3,
            ..draw(P1, V1, I1)
        })
        .unwrap();
    driver.commit(&commands);

    let draws: Vec<(i32, u32, i32)> = driver
        .device()
        .calls()
        .iter()
        .filter_map(|call| match *call {
            GlCall::DrawElements {
                count,
                index_type,
                offset,
                ..
            } => Some((count, index_type, offset)),
            _ => None,
        })
        .collect();
    assert_eq!(
        draws,
        vec![(4, consts::UNSIGNED_SHORT, 4), (3, consts::UNSIGNED_SHORT, 6)]
    );
}

#[test]
fn test_non_indexed_draw_uses_vertex_count() {
    let mut driver = driver();
    let mut commands = CommandBuffer::new(DrawCommand::ARENA_FOOTPRINT * 2);
    commands
        .record(draw(P1, V1, IndexBufferHandle::INVALID))
        .unwrap();
    commands
        .record(DrawCommand {
            start_vertex: 1,
            ..draw(P1, V1, IndexBufferHandle::INVALID)
        })
        .unwrap();
    driver.commit(&commands);

    let draws: Vec<GlCall> = driver
        .device()
        .calls()
        .iter()
        .filter(|call| matches!(call, GlCall::DrawArrays { .. }))
        .cloned()
        .collect();
    assert_eq!(
        draws,
        vec![
            GlCall::DrawArrays {
                mode: consts::TRIANGLES,
                first: 0,
                count: 4
            },
            GlCall::DrawArrays {
                mode: consts::TRIANGLES,
                first: 1,
                count: 3
            },
        ]
    );
}

#[test]
fn test_out_of_range_draw_arguments_skip_only_that_draw() {
    // --- 1. ARRANGE ---
    let mut driver = driver();
    let wide_indices = IndexBufferHandle(1);
    driver
        .create_index_buffer(
            wide_indices,
            &MemoryBlob::from_pod_slice(&[0u32, 1, 2]),
            IndexFormat::Uint32,
        )
        .unwrap();
    let mut commands = CommandBuffer::new(DrawCommand::ARENA_FOOTPRINT * 4);
    // Byte offset overflows u32.
    commands
        .record(DrawCommand {
            start_index: 0x4000_0000,
            index_count: 3,
            ..draw(P1, V1, wide_indices)
        })
        .unwrap();
    // Count does not fit a GLsizei.
    commands
        .record(DrawCommand {
            index_count: 0x8000_0001,
            ..draw(P1, V1, wide_indices)
        })
        .unwrap();
    commands
        .record(DrawCommand {
            vertex_count: 0x8000_0001,
            ..draw(P1, V1, IndexBufferHandle::INVALID)
        })
        .unwrap();
    commands.record(draw(P1, V1, wide_indices)).unwrap();

    // --- 2. ACT ---
    let stats = driver.commit(&commands);

    // --- 3. ASSERT ---
    assert_eq!(stats.skipped_draws, 3);
    assert_eq!(stats.draw_calls, 1);
    assert_eq!(stats.uniform_uploads, 1, "Skipped draws upload nothing");
    let draws: Vec<GlCall> = driver
        .device()
        .calls()
        .iter()
        .filter(|call| matches!(call, GlCall::DrawElements { .. } | GlCall::DrawArrays { .. }))
        .cloned()
        .collect();
    assert_eq!(
        draws,
        vec![GlCall::DrawElements {
            mode: consts::TRIANGLES,
            count: 3,
            index_type: consts::UNSIGNED_INT,
            offset: 0,
        }]
    );
}

#[test]
fn test_model_view_projection_upload() {
    let mut driver = driver();
    let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -4.0));
    let projection = Mat4::from_scale(Vec3::new(0.5, 0.5, 1.0));
    let model = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));

    let mut commands = CommandBuffer::new(DrawCommand::ARENA_FOOTPRINT);
    commands.set_view_transform(view, projection);
    commands
        .record(DrawCommand {
            transform: model,
            ..draw(P1, V1, I1)
        })
        .unwrap();
    driver.commit(&commands);

    let expected = (projection * view * model).to_cols_array();
    assert!(driver
        .device()
        .calls()
        .contains(&GlCall::SetUniformMat4(0, expected)));
}

#[test]
fn test_clear_follows_settings() {
    let mut driver = driver();
    let mut commands = CommandBuffer::new(0);
    commands.set_clear(ClearSettings {
        flags: ClearFlags::COLOR | ClearFlags::STENCIL,
        stencil: 3,
        ..Default::default()
    });
    driver.commit(&commands);
    commands.set_clear(ClearSettings {
        flags: ClearFlags::empty(),
        ..Default::default()
    });
    let stats = driver.commit(&commands);

    assert_eq!(stats.clears, 0);
    assert_eq!(
        driver.device().calls(),
        [GlCall::Clear {
            mask: consts::COLOR_BUFFER_BIT | consts::STENCIL_BUFFER_BIT,
            color: [0.0, 0.0, 0.0, 1.0],
            depth: 1.0,
            stencil: 3,
        }]
    );
}

#[test]
fn test_vertex_buffer_requires_known_layout() {
    let mut driver = driver();
    let result = driver.create_vertex_buffer(
        VertexBufferHandle(1),
        &MemoryBlob::from_vec(vec![0; 12]),
        VertexLayoutHandle(3),
    );
    assert!(matches!(result, Err(ResourceError::NotFound)));
}

#[test]
fn test_shutdown_releases_native_objects() {
    let mut driver = driver();
    assert_eq!(driver.device().live_buffers(), 2);
    assert_eq!(driver.device().live_programs(), 2);

    driver.shutdown();
    driver.shutdown();

    assert_eq!(driver.device().live_buffers(), 0);
    assert_eq!(driver.device().live_programs(), 0);
}
