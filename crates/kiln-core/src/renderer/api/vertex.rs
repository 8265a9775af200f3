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


//! Describes how vertex attributes are packed inside a vertex buffer.

use crate::renderer::error::VertexLayoutError;

/// The number of distinct [`Attribute`] kinds, and therefore the maximum number of
/// entries in a [`VertexLayout`].
pub const MAX_ATTRIBUTES: usize = 12;

/// A semantic vertex attribute.
///
/// The discriminant doubles as the storage slot inside a [`VertexLayout`], which is why
/// iteration over a layout follows this declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Attribute {
    /// Object-space position.
    Position = 0,
    /// Surface normal.
    Normal,
    /// Surface tangent.
    Tangent,
    /// Surface bitangent.
    Bitangent,
    /// Primary vertex color.
    Color0,
    /// Secondary vertex color.
    Color1,
    /// Skinning joint indices.
    Indices,
    /// Skinning joint weights.
    Weight,
    /// First texture coordinate set.
    TexCoord0,
    /// Second texture coordinate set.
    TexCoord1,
    /// Third texture coordinate set.
    TexCoord2,
    /// Fourth texture coordinate set.
    TexCoord3,
}

impl Attribute {
    /// Every attribute, in slot order.
    pub const ALL: [Attribute; MAX_ATTRIBUTES] = [
        Attribute::Position,
        Attribute::Normal,
        Attribute::Tangent,
        Attribute::Bitangent,
        Attribute::Color0,
        Attribute::Color1,
        Attribute::Indices,
        Attribute::Weight,
        Attribute::TexCoord0,
        Attribute::TexCoord1,
        Attribute::TexCoord2,
        Attribute::TexCoord3,
    ];

    /// The vertex shader input name a program must declare to receive this attribute.
    pub const fn shader_name(self) -> &'static str {
        match self {
            Attribute::Position => "a_position",
            Attribute::Normal => "a_normal",
            Attribute::Tangent => "a_tangent",
            Attribute::Bitangent => "a_bitangent",
            Attribute::Color0 => "a_color0",
            Attribute::Color1 => "a_color1",
            Attribute::Indices => "a_indices",
            Attribute::Weight => "a_weight",
            Attribute::TexCoord0 => "a_texcoord0",
            Attribute::TexCoord1 => "a_texcoord1",
            Attribute::TexCoord2 => "a_texcoord2",
            Attribute::TexCoord3 => "a_texcoord3",
        }
    }

    /// Returns the storage slot of this attribute.
    #[inline]
    pub const fn slot(self) -> usize {
        self as usize
    }
}

/// The scalar type of each component of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ComponentType {
    /// Unsigned 8-bit integer.
    Uint8 = 0,
    /// Signed 16-bit integer.
    Int16,
    /// Unsigned 16-bit integer.
    Uint16,
    /// IEEE half-precision float.
    Float16,
    /// IEEE single-precision float.
    Float32,
}

impl ComponentType {
    /// Size of one component in bytes.
    #[inline]
    pub const fn size(self) -> u16 {
        match self {
            ComponentType::Uint8 => 1,
            ComponentType::Int16 | ComponentType::Uint16 | ComponentType::Float16 => 2,
            ComponentType::Float32 => 4,
        }
    }
}

/// One attribute of a vertex layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexLayoutEntry {
    /// The semantic attribute.
    pub attribute: Attribute,
    /// The scalar type of each component.
    pub component_type: ComponentType,
    /// The number of components, in `1..=4`.
    pub component_count: u8,
    /// Whether integer data is normalized to `[0, 1]` / `[-1, 1]` when fetched.
    pub normalized: bool,
}

impl VertexLayoutEntry {
    /// Creates a non-normalized entry.
    pub const fn new(attribute: Attribute, component_type: ComponentType, component_count: u8) -> Self {
        Self {
            attribute,
            component_type,
            component_count,
            normalized: false,
        }
    }

    /// Returns a copy of this entry with normalization enabled.
    pub const fn normalized(mut self) -> Self {
        self.normalized = true;
        self
    }

    /// Size of the attribute in bytes.
    #[inline]
    pub const fn size(&self) -> u16 {
        self.component_type.size() * self.component_count as u16
    }

    /// The packed descriptor that feeds the layout hash.
    #[inline]
    fn packed(&self) -> u32 {
        (self.attribute as u32)
            | (self.component_type as u32) << 8
            | (self.component_count as u32) << 16
            | (self.normalized as u32) << 24
    }
}

/// An ordered set of vertex attributes with computed offsets, stride and hash.
///
/// Entries are stored by [`Attribute`] slot, but byte offsets are assigned in the
/// order the entries were supplied: two layouts with the same entries given in a
/// different order have different offsets. The hash is the XOR of the packed entry
/// descriptors, so it ignores order and distinct sets can collide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    entries: [Option<VertexLayoutEntry>; MAX_ATTRIBUTES],
    offsets: [u16; MAX_ATTRIBUTES],
    stride: u16,
    hash: u32,
}

impl VertexLayout {
    /// Builds a layout from `entries`, assigning offsets in the given order.
    ///
    /// # Errors
    ///
    /// Returns a [`VertexLayoutError`] if more than [`MAX_ATTRIBUTES`] entries are given,
    /// if a component count is outside `1..=4`, or if an attribute appears twice.
    pub fn new(entries: &[VertexLayoutEntry]) -> Result<Self, VertexLayoutError> {
        if entries.len() > MAX_ATTRIBUTES {
            return Err(VertexLayoutError::TooManyEntries {
                count: entries.len(),
                max: MAX_ATTRIBUTES,
            });
        }

        let mut layout = Self {
            entries: [None; MAX_ATTRIBUTES],
            offsets: [0; MAX_ATTRIBUTES],
            stride: 0,
            hash: 0,
        };

        for entry in entries {
            if !(1..=4).contains(&entry.component_count) {
                return Err(VertexLayoutError::InvalidComponentCount {
                    attribute: entry.attribute,
                    count: entry.component_count,
                });
            }
            let slot = entry.attribute.slot();
            if layout.entries[slot].is_some() {
                return Err(VertexLayoutError::DuplicateAttribute(entry.attribute));
            }

            layout.entries[slot] = Some(*entry);
            layout.offsets[slot] = layout.stride;
            layout.stride += entry.size();
            layout.hash ^= entry.packed();
        }

        Ok(layout)
    }

    /// The size of one vertex in bytes.
    #[inline]
    pub fn stride(&self) -> u16 {
        self.stride
    }

    /// The order-independent hash used to deduplicate layouts.
    #[inline]
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// The byte offset of `attribute` within a vertex, if present.
    #[inline]
    pub fn offset(&self, attribute: Attribute) -> Option<u16> {
        self.entries[attribute.slot()].map(|_| self.offsets[attribute.slot()])
    }

    /// The entry describing `attribute`, if present.
    #[inline]
    pub fn entry(&self, attribute: Attribute) -> Option<&VertexLayoutEntry> {
        self.entries[attribute.slot()].as_ref()
    }

    /// Returns `true` if the layout contains `attribute`.
    #[inline]
    pub fn has(&self, attribute: Attribute) -> bool {
        self.entries[attribute.slot()].is_some()
    }

    /// The number of attributes in the layout.
    pub fn len(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    /// Returns `true` if the layout has no attributes.
    pub fn is_empty(&self) -> bool {
        self.stride == 0
    }

    /// Iterates over `(entry, offset)` pairs in [`Attribute`] order.
    pub fn iter(&self) -> impl Iterator<Item = (&VertexLayoutEntry, u16)> + '_ {
        self.entries
            .iter()
            .zip(self.offsets.iter())
            .filter_map(|(entry, &offset)| entry.as_ref().map(|e| (e, offset)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos_normal_uv() -> Vec<VertexLayoutEntry> {
        vec![
            VertexLayoutEntry::new(Attribute::Position, ComponentType::Float32, 3),
            VertexLayoutEntry::new(Attribute::Normal, ComponentType::Float32, 3),
            VertexLayoutEntry::new(Attribute::TexCoord0, ComponentType::Float32, 2),
        ]
    }

    #[test]
    fn test_stride_is_sum_of_entry_sizes() {
        let layout = VertexLayout::new(&pos_normal_uv()).unwrap();
        assert_eq!(layout.stride(), 32);
        assert_eq!(layout.len(), 3);
    }

    #[test]
    fn test_offsets_follow_call_order_not_enum_order() {
        let layout = VertexLayout::new(&[
            VertexLayoutEntry::new(Attribute::TexCoord0, ComponentType::Float32, 2),
            VertexLayoutEntry::new(Attribute::Color0, ComponentType::Uint8, 4).normalized(),
            VertexLayoutEntry::new(Attribute::Position, ComponentType::Float32, 3),
        ])
        .unwrap();

        assert_eq!(layout.offset(Attribute::TexCoord0), Some(0));
        assert_eq!(layout.offset(Attribute::Color0), Some(8));
        assert_eq!(layout.offset(Attribute::Position), Some(12));
        assert_eq!(layout.offset(Attribute::Normal), None);
        assert_eq!(layout.stride(), 24);

        // Iteration is in attribute order.
        let order: Vec<_> = layout.iter().map(|(e, _)| e.attribute).collect();
        assert_eq!(
            order,
            vec![Attribute::Position, Attribute::Color0, Attribute::TexCoord0]
        );
    }

    #[test]
    fn test_hash_ignores_order_but_offsets_do_not() {
        let mut entries = pos_normal_uv();
        let a = VertexLayout::new(&entries).unwrap();
        entries.reverse();
        let b = VertexLayout::new(&entries).unwrap();

        assert_eq!(a.hash(), b.hash());
        assert_ne!(a.offset(Attribute::Position), b.offset(Attribute::Position));
    }

    #[test]
    fn test_rejects_invalid_component_count() {
        for count in [0u8, 5] {
            let err = VertexLayout::new(&[VertexLayoutEntry::new(
                Attribute::Position,
                ComponentType::Float32,
                count,
            )])
            .unwrap_err();
            assert_eq!(
                err,
                VertexLayoutError::InvalidComponentCount {
                    attribute: Attribute::Position,
                    count
                }
            );
        }
    }

    #[test]
    fn test_rejects_too_many_entries() {
        let entries = vec![
            VertexLayoutEntry::new(Attribute::Position, ComponentType::Float32, 3);
            MAX_ATTRIBUTES + 1
        ];
        assert!(matches!(
            VertexLayout::new(&entries),
            Err(VertexLayoutError::TooManyEntries { count: 13, max: 12 })
        ));
    }

    #[test]
    fn test_rejects_duplicate_attribute() {
        let entries = [
            VertexLayoutEntry::new(Attribute::Normal, ComponentType::Float32, 3),
            VertexLayoutEntry::new(Attribute::Normal, ComponentType::Int16, 3),
        ];
        assert_eq!(
            VertexLayout::new(&entries),
            Err(VertexLayoutError::DuplicateAttribute(Attribute::Normal))
        );
    }

    #[test]
    fn test_every_attribute_fits() {
        let entries: Vec<_> = Attribute::ALL
            .iter()
            .map(|&a| VertexLayoutEntry::new(a, ComponentType::Float16, 4))
            .collect();
        let layout = VertexLayout::new(&entries).unwrap();
        assert_eq!(layout.stride(), 8 * MAX_ATTRIBUTES as u16);
    }
}
