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


//! Shader uniforms the engine recognises by name and fills in automatically.

/// A uniform with a reserved name, populated by the driver at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredefinedUniform {
    /// The view matrix.
    View,
    /// The inverse view matrix.
    InvView,
    /// The projection matrix.
    Proj,
    /// The inverse projection matrix.
    InvProj,
    /// `proj * view`.
    ViewProj,
    /// The inverse of `proj * view`.
    InvViewProj,
    /// The draw's model matrix.
    Model,
    /// `view * model`.
    ModelView,
    /// `proj * view * model`.
    ModelViewProj,
}

impl PredefinedUniform {
    /// Number of predefined uniforms.
    pub const COUNT: usize = 9;

    /// Every predefined uniform.
    pub const ALL: [PredefinedUniform; Self::COUNT] = [
        PredefinedUniform::View,
        PredefinedUniform::InvView,
        PredefinedUniform::Proj,
        PredefinedUniform::InvProj,
        PredefinedUniform::ViewProj,
        PredefinedUniform::InvViewProj,
        PredefinedUniform::Model,
        PredefinedUniform::ModelView,
        PredefinedUniform::ModelViewProj,
    ];

    /// The GLSL name of the uniform.
    pub const fn name(self) -> &'static str {
        match self {
            PredefinedUniform::View => "u_view",
            PredefinedUniform::InvView => "u_invView",
            PredefinedUniform::Proj => "u_proj",
            PredefinedUniform::InvProj => "u_invProj",
            PredefinedUniform::ViewProj => "u_viewProj",
            PredefinedUniform::InvViewProj => "u_invViewProj",
            PredefinedUniform::Model => "u_model",
            PredefinedUniform::ModelView => "u_modelView",
            PredefinedUniform::ModelViewProj => "u_modelViewProj",
        }
    }

    /// Looks a uniform up by its GLSL name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.name() == name)
    }
}
