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


//! The public-facing SDK of the Kiln renderer.
//!
//! Implement [`Application`] and hand it to [`Engine::run`] together with a
//! [`RenderDriver`]: the engine owns the [`Renderer`], drives the
//! update/render/frame loop and shuts everything down in order.

use anyhow::{bail, Context, Result};
use kiln_core::renderer::{
    CommandBuffer, CommandBufferHandle, CommitStats, RenderDriver, RenderHandle, Renderer,
};
use std::time::{Duration, Instant};

mod config;

pub use config::{ConfigError, EngineConfig};

/// Everything an application needs to get started.
pub mod prelude {
    pub use crate::{Application, Engine, EngineConfig, EngineContext, EngineReport};
    pub use kiln_core::math::{LinearRgba, Mat4, Vec3, Vec4};
    pub use kiln_core::renderer::{
        Attribute, ClearFlags, ClearSettings, CommandBuffer, ComponentType, DrawCommand,
        IndexBufferHandle, IndexFormat, MemoryBlob, RenderDriver, RenderHandle,
        ShaderProgramHandle, VertexBufferHandle, VertexLayout, VertexLayoutEntry,
    };
    pub use kiln_infra::{GlDriver, RecordingGlDevice};
}

/// State shared between the engine and the application.
#[derive(Debug)]
pub struct EngineContext {
    /// The renderer, for creating resources.
    pub renderer: Renderer,
    /// The command buffer the engine creates from the config and commits every frame.
    pub main_command_buffer: CommandBufferHandle,
    /// Time elapsed since the previous frame.
    pub delta_time: Duration,
}

impl EngineContext {
    /// The main command buffer, for recording this frame's draws.
    pub fn commands(&mut self) -> Option<&mut CommandBuffer> {
        self.renderer.command_buffer_mut(self.main_command_buffer)
    }
}

/// A program driven by the [`Engine`].
pub trait Application: Sized {
    /// Called once, after the renderer is up, to create the initial state.
    fn new(context: &mut EngineContext) -> Result<Self>;

    /// Called every frame for game logic.
    fn update(&mut self, context: &mut EngineContext) -> Result<()>;

    /// Called every frame, after `update`, to record draws.
    fn render(&mut self, context: &mut EngineContext) -> Result<()>;

    /// Checked before each frame; returning `true` ends the run.
    fn should_exit(&self, _context: &EngineContext) -> bool {
        false
    }

    /// Called once before the renderer shuts down, to release resources.
    fn shutdown(&mut self, _context: &mut EngineContext) {}
}

/// Summary of a finished [`Engine::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineReport {
    /// Frames committed.
    pub frames: u64,
    /// Driver work summed over all frames.
    pub totals: CommitStats,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

/// The game loop harness.
pub struct Engine;

impl Engine {
    /// Runs `A` on top of `driver` until the frame limit is reached or the
    /// application asks to exit.
    pub fn run<A: Application>(config: EngineConfig, driver: Box<dyn RenderDriver>) -> Result<EngineReport> {
        config.validate()?;
        let started = Instant::now();

        let renderer = Renderer::new(driver).context("Failed to initialise the renderer")?;
        let mut context = EngineContext {
            renderer,
            main_command_buffer: CommandBufferHandle::INVALID,
            delta_time: Duration::ZERO,
        };
        context.main_command_buffer = context
            .renderer
            .create_command_buffer(config.command_buffer_arena_bytes);
        match context.commands() {
            Some(commands) => commands.set_clear(config.clear),
            None => bail!("Failed to create the main command buffer"),
        }

        let mut app = A::new(&mut context).context("Application failed to start")?;
        log::info!("Engine started");

        let mut report = EngineReport::default();
        let mut interval = CommitStats::default();
        let mut last_frame = Instant::now();
        loop {
            if config.frame_limit.is_some_and(|limit| report.frames >= limit) {
                log::info!("Frame limit of {} reached", report.frames);
                break;
            }
            if app.should_exit(&context) {
                log::info!("Application requested exit");
                break;
            }

            let now = Instant::now();
            context.delta_time = now - last_frame;
            last_frame = now;

            app.update(&mut context)?;
            app.render(&mut context)?;
            let stats = context.renderer.frame();

            report.frames += 1;
            report.totals += stats.commit;
            interval += stats.commit;
            if config.stats_interval > 0 && report.frames % config.stats_interval == 0 {
                log::info!(
                    "Frames {}..{}: {} draws, {} skipped, {} program binds, {} buffer binds",
                    report.frames - config.stats_interval,
                    report.frames,
                    interval.draw_calls,
                    interval.skipped_draws,
                    interval.program_binds,
                    interval.buffer_binds
                );
                interval = CommitStats::default();
            }
        }

        app.shutdown(&mut context);
        context.renderer.shutdown();

        report.elapsed = started.elapsed();
        log::info!(
            "Engine stopped after {} frame(s) in {:.2?}",
            report.frames,
            report.elapsed
        );
        Ok(report)
    }
}
