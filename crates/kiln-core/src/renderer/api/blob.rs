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


//! Reference-counted byte blobs passed across the driver boundary.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

#[derive(Clone)]
enum Storage {
    Static(&'static [u8]),
    Shared(Arc<[u8]>),
}

/// An immutable `{ buffer, size }` pair with shared ownership.
///
/// Cloning is cheap and never copies the bytes: the data lives as long as the
/// longest-lived clone. Data borrowed from a `'static` slice is never copied at all.
/// This is the only format in which vertex data, index data and shader sources reach
/// a [`RenderDriver`](crate::renderer::RenderDriver).
#[derive(Clone)]
pub struct MemoryBlob {
    storage: Storage,
}

impl MemoryBlob {
    /// Wraps static data without copying it.
    pub const fn from_static(bytes: &'static [u8]) -> Self {
        Self {
            storage: Storage::Static(bytes),
        }
    }

    /// Copies `bytes` into a new shared allocation.
    pub fn copy_from_slice(bytes: &[u8]) -> Self {
        Self {
            storage: Storage::Shared(Arc::from(bytes)),
        }
    }

    /// Takes ownership of `bytes`.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self {
            storage: Storage::Shared(Arc::from(bytes)),
        }
    }

    /// Copies a slice of plain-old-data values (vertices, indices) into a blob.
    pub fn from_pod_slice<T: bytemuck::Pod>(values: &[T]) -> Self {
        Self::copy_from_slice(bytemuck::cast_slice(values))
    }

    /// Copies shader source text into a blob.
    pub fn from_source(source: &str) -> Self {
        Self::copy_from_slice(source.as_bytes())
    }

    /// Returns the bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.storage {
            Storage::Static(bytes) => bytes,
            Storage::Shared(bytes) => bytes,
        }
    }

    /// Returns the size in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Returns `true` if the blob holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Interprets the blob as UTF-8 text, as needed for shader sources.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_bytes()).ok()
    }
}

impl Deref for MemoryBlob {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_bytes()
    }
}

impl fmt::Debug for MemoryBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.storage {
            Storage::Static(_) => "static",
            Storage::Shared(_) => "shared",
        };
        f.debug_struct("MemoryBlob")
            .field("storage", &kind)
            .field("size", &self.len())
            .finish()
    }
}
