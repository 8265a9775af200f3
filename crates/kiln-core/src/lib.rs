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


//! # Kiln Core
//!
//! Foundational crate of the Kiln renderer: typed resource handles, the allocators
//! and intrusive list they are built on, vertex layouts, command buffers, the
//! [`RenderDriver`](renderer::RenderDriver) contract and the
//! [`Renderer`](renderer::Renderer) front end.

#![warn(missing_docs)]

pub mod collections;
pub mod math;
pub mod memory;
pub mod renderer;

pub use renderer::Renderer;
