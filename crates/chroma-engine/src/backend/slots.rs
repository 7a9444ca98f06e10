//! Draw-time vertex input checks, independent of any device.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use wgpu::naga::ScalarKind;

use crate::shader::reflect::Varying;

use super::{AttributeLayout, BufferHandle, ComponentType};

/// Vertex buffer offsets must be a multiple of this many bytes.
pub(crate) const VERTEX_OFFSET_ALIGNMENT: u64 = 4;

/// One bound buffer per vertex input, in pipeline slot order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VertexSlots {
    /// `(buffer index, byte offset)` per slot.
    pub bound: Vec<(usize, u64)>,
    /// Vertices every bound buffer can supply.
    pub capacity: u64,
}

impl VertexSlots {
    /// Vertex range of a draw, or why it cannot be issued.
    pub fn draw_range(&self, first: u32, count: u32) -> Result<Range<u32>, String> {
        let Some(end) = first.checked_add(count) else {
            return Err(format!("vertex range {first} + {count} overflows"));
        };
        if u64::from(end) > self.capacity {
            let capacity = self.capacity;
            return Err(format!("vertices {first}..{end} exceed the {capacity} available"));
        }
        Ok(first..end)
    }
}

/// Resolves the buffer feeding each of `attributes`.
///
/// `buffer_sizes` is indexed by [`BufferHandle`]. The error names the first
/// input that is not enabled, has no pointer, points at an unknown buffer, or
/// whose layout does not match its reflected type.
pub(crate) fn resolve_vertex_slots(
    attributes: &[Varying],
    enabled: &BTreeSet<u32>,
    pointers: &BTreeMap<u32, (BufferHandle, AttributeLayout)>,
    buffer_sizes: &[u64],
) -> Result<VertexSlots, String> {
    let mut bound = Vec::with_capacity(attributes.len());
    let mut capacity = u64::MAX;

    for attr in attributes {
        let name = attr.name.as_deref().unwrap_or("<unnamed>");

        if !enabled.contains(&attr.location) {
            let location = attr.location;
            return Err(format!("attribute `{name}` (location {location}) is not enabled"));
        }
        let Some((buffer, layout)) = pointers.get(&attr.location) else {
            let location = attr.location;
            return Err(format!("attribute `{name}` (location {location}) has no buffer"));
        };
        let index = buffer.0 as usize;
        let Some(&size) = buffer_sizes.get(index) else {
            return Err(format!("attribute `{name}` points at unknown buffer {buffer:?}"));
        };

        let expected = attr.ty.components;
        let tight = layout.components * layout.component_type.byte_size();
        let float_input = attr.ty.scalar.kind == ScalarKind::Float;
        if layout.components != expected
            || layout.normalized
            || (!float_input && layout.component_type == ComponentType::Float32)
            || (layout.stride != 0 && layout.stride != tight)
            || layout.offset % VERTEX_OFFSET_ALIGNMENT != 0
        {
            return Err(format!(
                "attribute `{name}` layout {layout:?} does not match its \
                 {expected}-component input"
            ));
        }
        if layout.offset >= size {
            return Err(format!(
                "attribute `{name}` offset {} is past the end of {buffer:?}",
                layout.offset
            ));
        }

        let stride = u64::from(layout.effective_stride());
        capacity = capacity.min((size - layout.offset) / stride);
        bound.push((index, layout.offset));
    }

    Ok(VertexSlots { bound, capacity })
}
