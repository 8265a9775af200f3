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


use anyhow::Result;
use kiln_sdk::prelude::*;
use kiln_sdk::ConfigError;
use std::io::Write;

const VERTEX_SHADER: &str = "in vec3 a_position;
uniform mat4 u_modelViewProj;
void main() {}";
const FRAGMENT_SHADER: &str = "void main() {}";

/// Draws one triangle per frame and asks to exit after `EXIT_AFTER` updates.
struct Triangle {
    program: ShaderProgramHandle,
    vertices: VertexBufferHandle,
    updates: u64,
}

const EXIT_AFTER: u64 = 5;

impl Application for Triangle {
    fn new(context: &mut EngineContext) -> Result<Self> {
        let layout = VertexLayout::new(&[VertexLayoutEntry::new(
            Attribute::Position,
            ComponentType::Float32,
            3,
        )])?;
        let vertices = context.renderer.create_vertex_buffer(
            &MemoryBlob::from_pod_slice(&[0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]),
            &layout,
        );
        let program = context.renderer.create_program(
            &MemoryBlob::from_static(VERTEX_SHADER.as_bytes()),
            &MemoryBlob::from_static(FRAGMENT_SHADER.as_bytes()),
        );
        Ok(Self {
            program,
            vertices,
            updates: 0,
        })
    }

    fn update(&mut self, _context: &mut EngineContext) -> Result<()> {
        self.updates += 1;
        Ok(())
    }

    fn render(&mut self, context: &mut EngineContext) -> Result<()> {
        let commands = context
            .commands()
            .ok_or_else(|| anyhow::anyhow!("main command buffer is gone"))?;
        commands.record(DrawCommand {
            program: self.program,
            vertex_buffer: self.vertices,
            ..Default::default()
        });
        Ok(())
    }

    fn should_exit(&self, _context: &EngineContext) -> bool {
        self.updates >= EXIT_AFTER
    }

    fn shutdown(&mut self, context: &mut EngineContext) {
        context.renderer.destroy_vertex_buffer(self.vertices);
        context.renderer.destroy_program(self.program);
    }
}

fn gl_driver() -> Box<dyn RenderDriver> {
    Box::new(GlDriver::new(RecordingGlDevice::new()))
}

#[test]
fn test_engine_runs_until_application_exits() {
    // --- 1. ARRANGE ---
    let config = EngineConfig {
        stats_interval: 2,
        ..Default::default()
    };

    // --- 2. ACT ---
    let report = Engine::run::<Triangle>(config, gl_driver()).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(report.frames, EXIT_AFTER);
    assert_eq!(report.totals.draw_calls as u64, EXIT_AFTER);
    assert_eq!(report.totals.clears as u64, EXIT_AFTER);
    assert_eq!(
        report.totals.program_binds as u64, EXIT_AFTER,
        "Every commit starts from unbound state"
    );
    assert_eq!(report.totals.skipped_draws, 0);
}

#[test]
fn test_frame_limit_stops_the_loop() {
    let config = EngineConfig {
        frame_limit: Some(2),
        ..Default::default()
    };
    let report = Engine::run::<Triangle>(config, gl_driver()).unwrap();
    assert_eq!(report.frames, 2);
}

#[test]
fn test_invalid_config_is_refused_before_start() {
    let config = EngineConfig {
        command_buffer_arena_bytes: 0,
        ..Default::default()
    };
    assert!(Engine::run::<Triangle>(config, gl_driver()).is_err());
}

#[test]
fn test_config_loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "(frame_limit: Some(3), stats_interval: 0)").unwrap();

    let config = EngineConfig::load(file.path()).unwrap();

    assert_eq!(config.frame_limit, Some(3));
    assert_eq!(config.stats_interval, 0);
    assert_eq!(config.clear, ClearSettings::default());
}

#[test]
fn test_missing_config_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.ron");

    let err = EngineConfig::load(&path).unwrap_err();

    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("missing.ron"));
}
