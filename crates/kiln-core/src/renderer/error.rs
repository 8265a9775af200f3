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

//! Defines the hierarchy of error types for the rendering subsystem.
//!
//! Capacity exhaustion (handle tables, arenas) is not represented here; it is
//! reported through sentinel values. These errors cover invalid descriptions and
//! failures reported by a backend.

use crate::renderer::api::vertex::Attribute;
use std::fmt;

/// An error raised while building a [`VertexLayout`](crate::renderer::VertexLayout).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VertexLayoutError {
    /// More entries were supplied than there are attribute kinds.
    TooManyEntries {
        /// The number of entries supplied.
        count: usize,
        /// The maximum number of entries.
        max: usize,
    },
    /// An entry's component count is outside `1..=4`.
    InvalidComponentCount {
        /// The offending attribute.
        attribute: Attribute,
        /// The component count supplied.
        count: u8,
    },
    /// The same attribute was supplied more than once.
    DuplicateAttribute(Attribute),
}

impl fmt::Display for VertexLayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VertexLayoutError::TooManyEntries { count, max } => {
                write!(f, "Vertex layout has {count} entries, at most {max} are supported")
            }
            VertexLayoutError::InvalidComponentCount { attribute, count } => {
                write!(
                    f,
                    "Attribute {attribute:?} has {count} components, expected 1 to 4"
                )
            }
            VertexLayoutError::DuplicateAttribute(attribute) => {
                write!(f, "Attribute {attribute:?} appears more than once")
            }
        }
    }
}

impl std::error::Error for VertexLayoutError {}

/// A driver-side failure while creating a resource for a renderer handle.
#[derive(Debug)]
pub enum ResourceError {
    /// The handle does not fit the driver's table.
    InvalidHandle,
    /// The vertex layout description was rejected.
    InvalidLayout(VertexLayoutError),
    /// The request names a resource the driver does not know, such as a vertex
    /// buffer pointing at an unregistered layout.
    NotFound,
    /// The native API refused the request.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::InvalidHandle => write!(f, "Handle is out of the driver's range"),
            ResourceError::InvalidLayout(err) => write!(f, "Invalid vertex layout: {err}"),
            ResourceError::NotFound => write!(f, "Dependent resource is not registered"),
            ResourceError::BackendError(msg) => write!(f, "Native API error: {msg}"),
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::InvalidLayout(err) => Some(err),
            _ => None,
        }
    }
}

impl From<VertexLayoutError> for ResourceError {
    fn from(err: VertexLayoutError) -> Self {
        ResourceError::InvalidLayout(err)
    }
}

/// An error raised while bringing up the renderer or its driver.
#[derive(Debug)]
pub enum RenderError {
    /// The driver could not be initialised.
    InitializationFailed(String),
    /// A resource operation failed.
    ResourceError(ResourceError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InitializationFailed(msg) => write!(f, "Driver initialisation failed: {msg}"),
            RenderError::ResourceError(err) => write!(f, "Resource operation failed: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceError(err) => Some(err),
            RenderError::InitializationFailed(_) => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn vertex_layout_error_display() {
        let err = VertexLayoutError::InvalidComponentCount {
            attribute: Attribute::Normal,
            count: 7,
        };
        assert_eq!(
            format!("{err}"),
            "Attribute Normal has 7 components, expected 1 to 4"
        );
    }

    #[test]
    fn render_error_wraps_resource_error_chain() {
        let layout_err = VertexLayoutError::DuplicateAttribute(Attribute::Position);
        let res_err: ResourceError = layout_err.into();
        let render_err: RenderError = res_err.into();

        assert_eq!(
            format!("{render_err}"),
            "Resource operation failed: Invalid vertex layout: Attribute Position appears more than once"
        );
        assert!(render_err.source().is_some());
        assert!(render_err.source().unwrap().source().is_some());
    }
}
