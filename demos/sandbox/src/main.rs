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


// Sandbox binary: spins a few quads against the headless GL device and logs what the
// commit backend issued.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use kiln_sdk::prelude::*;

#[derive(Parser)]
#[command(name = "sandbox", version, about = "Kiln renderer sandbox")]
struct Args {
    /// Number of frames to run (overrides the config file)
    #[arg(long, short = 'n')]
    frames: Option<u64>,

    /// RON engine config to load
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    color: [f32; 4],
}

const VERTICES: &[Vertex] = &[
    Vertex {
        position: [-0.5, -0.5, 0.0],
        color: [1.0, 0.0, 0.0, 1.0],
    },
    Vertex {
        position: [0.5, -0.5, 0.0],
        color: [0.0, 1.0, 0.0, 1.0],
    },
    Vertex {
        position: [0.5, 0.5, 0.0],
        color: [0.0, 0.0, 1.0, 1.0],
    },
    Vertex {
        position: [-0.5, 0.5, 0.0],
        color: [1.0, 1.0, 1.0, 1.0],
    },
];

const INDICES: &[u16] = &[0, 1, 2, 2, 3, 0];

const VERTEX_SHADER: &str = "#version 330 core
in vec3 a_position;
in vec4 a_color0;
uniform mat4 u_modelViewProj;
out vec4 v_color;
void main() {
    v_color = a_color0;
    gl_Position = u_modelViewProj * vec4(a_position, 1.0);
}";

const FRAGMENT_SHADER: &str = "#version 330 core
in vec4 v_color;
out vec4 frag_color;
void main() { frag_color = v_color; }";

const TINTED_FRAGMENT_SHADER: &str = "#version 330 core
in vec4 v_color;
uniform vec4 u_tint;
out vec4 frag_color;
void main() { frag_color = v_color * u_tint; }";

struct SandboxApp {
    vertex_buffer: VertexBufferHandle,
    index_buffer: IndexBufferHandle,
    programs: [ShaderProgramHandle; 2],
    angle: f32,
}

impl Application for SandboxApp {
    fn new(context: &mut EngineContext) -> Result<Self> {
        log::info!("SandboxApp: creating GPU resources...");

        let layout = VertexLayout::new(&[
            VertexLayoutEntry::new(Attribute::Position, ComponentType::Float32, 3),
            VertexLayoutEntry::new(Attribute::Color0, ComponentType::Float32, 4),
        ])?;
        let renderer = &mut context.renderer;

        let vertex_buffer =
            renderer.create_vertex_buffer(&MemoryBlob::from_pod_slice(VERTICES), &layout);
        let index_buffer =
            renderer.create_index_buffer(&MemoryBlob::from_pod_slice(INDICES), IndexFormat::Uint16);

        let vertex_source = MemoryBlob::from_static(VERTEX_SHADER.as_bytes());
        let programs = [
            renderer.create_program(
                &vertex_source,
                &MemoryBlob::from_static(FRAGMENT_SHADER.as_bytes()),
            ),
            renderer.create_program(
                &vertex_source,
                &MemoryBlob::from_static(TINTED_FRAGMENT_SHADER.as_bytes()),
            ),
        ];

        if !vertex_buffer.is_valid() || !index_buffer.is_valid() {
            anyhow::bail!("Failed to create the quad buffers");
        }
        log::info!(" -> Quad: {vertex_buffer:?} / {index_buffer:?}, programs {programs:?}");

        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y)
            .unwrap_or(Mat4::IDENTITY);
        let projection = Mat4::perspective_rh_gl(60f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
        context.renderer.set_view_transform(view, projection);

        Ok(Self {
            vertex_buffer,
            index_buffer,
            programs,
            angle: 0.0,
        })
    }

    fn update(&mut self, context: &mut EngineContext) -> Result<()> {
        self.angle += context.delta_time.as_secs_f32() * std::f32::consts::FRAC_PI_2;
        Ok(())
    }

    fn render(&mut self, context: &mut EngineContext) -> Result<()> {
        let Some(commands) = context.commands() else {
            anyhow::bail!("Main command buffer is missing");
        };

        // Sorted by program so the second and third quads share bindings.
        let quads = [(-1.2, 0), (0.0, 1), (1.2, 1)];
        for (x, program) in quads {
            let transform = Mat4::from_translation(Vec3::new(x, 0.0, 0.0))
                * Mat4::from_rotation_z(self.angle);
            let recorded = commands.record(DrawCommand {
                program: self.programs[program],
                vertex_buffer: self.vertex_buffer,
                index_buffer: self.index_buffer,
                transform,
                ..Default::default()
            });
            if recorded.is_none() {
                log::warn!("Command buffer full, dropping the remaining quads this frame");
                break;
            }
        }
        Ok(())
    }

    fn shutdown(&mut self, context: &mut EngineContext) {
        log::info!("SandboxApp: releasing GPU resources");
        context.renderer.destroy_vertex_buffer(self.vertex_buffer);
        context.renderer.destroy_index_buffer(self.index_buffer);
        for program in self.programs {
            context.renderer.destroy_program(program);
        }
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    config.frame_limit = args.frames.or(config.frame_limit).or(Some(120));

    let driver = Box::new(GlDriver::new(RecordingGlDevice::new()));
    let report = Engine::run::<SandboxApp>(config, driver)?;

    let totals = report.totals;
    log::info!(
        "{} frames in {:.2?}: {} draws, {} program binds, {} buffer binds, {} uniform uploads",
        report.frames,
        report.elapsed,
        totals.draw_calls,
        totals.program_binds,
        totals.buffer_binds,
        totals.uniform_uploads
    );
    Ok(())
}
