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


//! Small linear algebra toolkit used by the renderer.
//!
//! Only what the draw-submission pipeline needs lives here: 3 and 4 component
//! vectors, a column-major [`Mat4`] with inversion, and a linear-space color.
//! All angular functions operate in **radians**.

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;

pub mod color;
pub mod matrix;
pub mod vector;

pub use self::color::LinearRgba;
pub use self::matrix::Mat4;
pub use self::vector::{Vec3, Vec4};
