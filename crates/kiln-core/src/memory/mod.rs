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


//! Allocators backing the renderer's resource tables and per-frame command storage.
//!
//! - [`HandleAllocator`]: fixed-capacity index allocator with O(1) alloc/free.
//! - [`LinearAllocator`]: bump allocator over a fixed budget, reset once per frame.

mod handle_allocator;
mod linear_allocator;

pub use self::handle_allocator::HandleAllocator;
pub use self::linear_allocator::LinearAllocator;
