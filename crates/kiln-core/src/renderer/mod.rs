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


//! The rendering core of Kiln.
//!
//! Applications talk to the [`Renderer`], which hands out typed handles and forwards
//! resource creation to a [`RenderDriver`]. Draws are recorded into a
//! [`CommandBuffer`] as [`DrawCommand`]s and committed once per frame; the driver
//! turns each command buffer into native calls while skipping redundant state
//! changes.

pub mod api;
pub mod error;
pub mod frontend;
pub mod traits;

pub use self::api::*;
pub use self::error::{RenderError, ResourceError, VertexLayoutError};
pub use self::frontend::{FrameStats, Renderer};
pub use self::traits::{CommitStats, IndexFormat, RenderDriver};
