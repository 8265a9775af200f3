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


use super::device::consts;
use kiln_core::renderer::{ClearFlags, ComponentType, IndexFormat};

/// A local extension trait to convert engine types into GL enum values.
pub trait IntoGl {
    /// Converts self into the matching GL enum value.
    fn into_gl(self) -> u32;
}

impl IntoGl for ComponentType {
    fn into_gl(self) -> u32 {
        match self {
            ComponentType::Uint8 => consts::UNSIGNED_BYTE,
            ComponentType::Int16 => consts::SHORT,
            ComponentType::Uint16 => consts::UNSIGNED_SHORT,
            ComponentType::Float16 => consts::HALF_FLOAT,
            ComponentType::Float32 => consts::FLOAT,
        }
    }
}

impl IntoGl for IndexFormat {
    fn into_gl(self) -> u32 {
        match self {
            IndexFormat::Uint16 => consts::UNSIGNED_SHORT,
            IndexFormat::Uint32 => consts::UNSIGNED_INT,
        }
    }
}

impl IntoGl for ClearFlags {
    fn into_gl(self) -> u32 {
        let mut mask = 0;
        if self.contains(ClearFlags::COLOR) {
            mask |= consts::COLOR_BUFFER_BIT;
        }
        if self.contains(ClearFlags::DEPTH) {
            mask |= consts::DEPTH_BUFFER_BIT;
        }
        if self.contains(ClearFlags::STENCIL) {
            mask |= consts::STENCIL_BUFFER_BIT;
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_mask() {
        assert_eq!(ClearFlags::empty().into_gl(), 0);
        assert_eq!(
            (ClearFlags::COLOR | ClearFlags::DEPTH).into_gl(),
            consts::COLOR_BUFFER_BIT | consts::DEPTH_BUFFER_BIT
        );
        assert_eq!(ClearFlags::all().into_gl(), 0x4500);
    }

    #[test]
    fn test_index_types() {
        assert_eq!(IndexFormat::Uint16.into_gl(), consts::UNSIGNED_SHORT);
        assert_eq!(IndexFormat::Uint32.into_gl(), consts::UNSIGNED_INT);
    }
}
