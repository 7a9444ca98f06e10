use std::fmt;

/// Pipeline stage a shader is compiled for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum StageKind {
    Vertex,
    Fragment,
}

impl StageKind {
    pub(crate) fn to_naga(self) -> ::wgpu::naga::ShaderStage {
        match self {
            StageKind::Vertex => ::wgpu::naga::ShaderStage::Vertex,
            StageKind::Fragment => ::wgpu::naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Vertex => f.write_str("vertex"),
            StageKind::Fragment => f.write_str("fragment"),
        }
    }
}

/// Handle to a compiled stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct StageHandle(pub u32);

/// Handle to a linked program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramHandle(pub u32);

/// Handle to an uploaded vertex buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BufferHandle(pub u32);

/// Upload usage hint.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferUsage {
    /// Written once, read by the GPU many times.
    StaticDraw,
    /// Rewritten occasionally.
    DynamicDraw,
}

/// Scalar type of one attribute component.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ComponentType {
    Float32,
}

impl ComponentType {
    pub const fn byte_size(self) -> u32 {
        match self {
            ComponentType::Float32 => 4,
        }
    }
}

/// How one attribute reads vertices out of a buffer.
///
/// `stride == 0` means tightly packed (`components * component size`).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AttributeLayout {
    pub components: u32,
    pub component_type: ComponentType,
    pub normalized: bool,
    pub stride: u32,
    pub offset: u64,
}

impl AttributeLayout {
    /// Tightly packed, unnormalized `f32` components starting at offset 0.
    pub const fn packed_f32(components: u32) -> Self {
        Self {
            components,
            component_type: ComponentType::Float32,
            normalized: false,
            stride: 0,
            offset: 0,
        }
    }

    /// Distance in bytes between consecutive vertices.
    pub const fn effective_stride(&self) -> u32 {
        if self.stride == 0 {
            self.components * self.component_type.byte_size()
        } else {
            self.stride
        }
    }
}

/// Resolved uniform location: resource slot plus byte offset inside the block.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformLocation {
    pub group: u32,
    pub binding: u32,
    pub offset: u32,
}

/// Viewport rectangle in physical pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ViewportRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ViewportRect {
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }
}

/// Straight-alpha RGBA clear color.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ClearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ClearColor {
    #[inline]
    pub const fn transparent() -> Self {
        Self { r: 0.0, g: 0.0, b: 0.0, a: 0.0 }
    }

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub(crate) fn to_wgpu(self) -> ::wgpu::Color {
        ::wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

/// Primitive topology for `draw_arrays`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Topology {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
}

impl Topology {
    pub(crate) fn to_wgpu(self) -> ::wgpu::PrimitiveTopology {
        match self {
            Topology::PointList => ::wgpu::PrimitiveTopology::PointList,
            Topology::LineList => ::wgpu::PrimitiveTopology::LineList,
            Topology::LineStrip => ::wgpu::PrimitiveTopology::LineStrip,
            Topology::TriangleList => ::wgpu::PrimitiveTopology::TriangleList,
            Topology::TriangleStrip => ::wgpu::PrimitiveTopology::TriangleStrip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_stride_is_component_bytes() {
        assert_eq!(AttributeLayout::packed_f32(2).effective_stride(), 8);
        assert_eq!(AttributeLayout::packed_f32(4).effective_stride(), 16);
    }

    #[test]
    fn explicit_stride_wins() {
        let layout = AttributeLayout { stride: 24, ..AttributeLayout::packed_f32(2) };
        assert_eq!(layout.effective_stride(), 24);
    }

    #[test]
    fn stage_kind_display() {
        assert_eq!(StageKind::Vertex.to_string(), "vertex");
        assert_eq!(StageKind::Fragment.to_string(), "fragment");
    }
}
