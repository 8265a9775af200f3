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


//! OpenGL backend.
//!
//! [`GlDriver`] implements the renderer's driver contract on top of a [`GlDevice`].
//! [`RecordingGlDevice`] is a headless device that logs calls instead of issuing them.

mod conversions;
mod device;
mod driver;
mod recording;

pub use self::conversions::IntoGl;
pub use self::device::{consts, AttribPointer, BufferTarget, GlDevice};
pub use self::driver::GlDriver;
pub use self::recording::{GlCall, RecordingGlDevice};
