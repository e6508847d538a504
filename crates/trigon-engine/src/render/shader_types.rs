//! Types shared bit-for-bit between the CPU encode step and the WGSL program.
//!
//! Every binding number used by the render core comes from [`BufferIndex`].
//! The bundled shader declares the same numbers, and
//! [`ShaderArtifact::check_interface`](super::ShaderArtifact::check_interface)
//! rejects any artifact that disagrees before a pipeline is built.

use bytemuck::{Pod, Zeroable};

use crate::coords::{ColorRgba, Vec2, ViewportSize};

/// Binding slots in bind group 0.
///
/// Renumbering a variant requires the same change in every WGSL artifact.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BufferIndex {
    /// Read-only storage buffer holding `array<Vertex>`.
    Vertices = 0,
    /// Uniform buffer holding [`ViewportUniform`].
    ViewportSize = 1,
}

impl BufferIndex {
    pub const ALL: [BufferIndex; 2] = [BufferIndex::Vertices, BufferIndex::ViewportSize];

    /// Binding number as used by wgpu and `@binding(n)`.
    #[inline]
    pub const fn binding(self) -> u32 {
        self as u32
    }

    /// Name of the WGSL variable expected at this slot.
    #[inline]
    pub const fn shader_name(self) -> &'static str {
        match self {
            BufferIndex::Vertices => "vertices",
            BufferIndex::ViewportSize => "viewport",
        }
    }
}

impl TryFrom<u32> for BufferIndex {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        BufferIndex::ALL
            .into_iter()
            .find(|idx| idx.binding() == value)
            .ok_or(value)
    }
}

/// One vertex as read by the vertex stage.
///
/// Mirrors the WGSL storage layout of
/// `struct Vertex { position: vec2<f32>, color: vec4<f32> }`:
/// `vec4` is 16-byte aligned, so `color` starts at byte 16 and the stride is 32.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub _pad: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    /// Size of one record in the vertex storage buffer.
    pub const STRIDE: u64 = std::mem::size_of::<Vertex>() as u64;

    #[inline]
    pub const fn new(position: Vec2, color: ColorRgba) -> Self {
        Self {
            position: position.to_array(),
            _pad: [0.0; 2],
            color: color.to_array(),
        }
    }
}

/// Viewport uniform as read by the vertex stage.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ViewportUniform {
    pub size: [f32; 2],
    pub _pad: [f32; 2], // 16-byte alignment
}

impl ViewportUniform {
    pub const SIZE: u64 = std::mem::size_of::<ViewportUniform>() as u64;
}

impl From<ViewportSize> for ViewportUniform {
    #[inline]
    fn from(v: ViewportSize) -> Self {
        Self {
            size: v.to_f32(),
            _pad: [0.0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn buffer_indices_are_fixed() {
        assert_eq!(BufferIndex::Vertices as u32, 0);
        assert_eq!(BufferIndex::ViewportSize as u32, 1);
        assert_ne!(BufferIndex::Vertices.binding(), BufferIndex::ViewportSize.binding());
    }

    #[test]
    fn buffer_index_round_trips_through_binding() {
        for idx in BufferIndex::ALL {
            assert_eq!(BufferIndex::try_from(idx.binding()), Ok(idx));
        }
        assert_eq!(BufferIndex::try_from(2), Err(2));
    }

    #[test]
    fn vertex_matches_wgsl_storage_layout() {
        assert_eq!(size_of::<Vertex>(), 32);
        assert_eq!(offset_of!(Vertex, position), 0);
        assert_eq!(offset_of!(Vertex, color), 16);
        assert_eq!(Vertex::STRIDE, 32);
    }

    #[test]
    fn viewport_uniform_is_sixteen_bytes() {
        assert_eq!(ViewportUniform::SIZE, 16);
        let u = ViewportUniform::from(ViewportSize::new(800, 600));
        assert_eq!(u.size, [800.0, 600.0]);
    }

    #[test]
    fn vertex_bytes_keep_position_and_color() {
        let v = Vertex::new(Vec2::new(250.0, -250.0), ColorRgba::RED);
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&v));
        assert_eq!(floats, &[250.0, -250.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    }
}
