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


//! Backend-agnostic rendering types.
//!
//! - **[`handle`]**: typed resource handles and table capacities.
//! - **[`vertex`]**: vertex attributes and layouts.
//! - **[`layout_cache`]**: layout deduplication and reference counting.
//! - **[`blob`]**: shared byte blobs for buffer data and shader sources.
//! - **[`uniform`]**: engine-populated shader uniforms.
//! - **[`command`]**: command buffers and draw commands.

pub mod blob;
pub mod command;
pub mod handle;
pub mod layout_cache;
pub mod uniform;
pub mod vertex;

pub use self::blob::MemoryBlob;
pub use self::command::{ClearFlags, ClearSettings, CommandBuffer, DrawCommand, DrawCommandId};
pub use self::handle::*;
pub use self::layout_cache::VertexLayoutCache;
pub use self::uniform::PredefinedUniform;
pub use self::vertex::{
    Attribute, ComponentType, VertexLayout, VertexLayoutEntry, MAX_ATTRIBUTES,
};
