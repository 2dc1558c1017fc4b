//! # Mesh Synthesis
//!
//! Vertex format, material keys, primitive emitters and the
//! material-deduplicated batch store. This is where furniture assemblers
//! write their geometry.

pub mod batch;
pub mod emitter;
pub mod material;
pub mod upload;

pub use batch::{BatchError, BatchId, BatchStore, Category, MaterialBatch};
pub use material::{MaterialKey, TextureId, NO_TEXTURE};

use cgmath::{InnerSpace, Point3, Vector3};

/// Default polygon count for cylinder sides.
pub const CYL_NDIV: u32 = 24;
/// Sphere subdivision for full-detail spheres.
pub const SPHERE_NDIV: u32 = 32;
/// Sphere subdivision for small or distant spheres.
pub const SPHERE_NDIV_LOW: u32 = 16;

/// Sphere subdivision count for the requested detail level.
#[inline]
pub fn sphere_ndiv(low_detail: bool) -> u32 {
    if low_detail {
        SPHERE_NDIV_LOW
    } else {
        SPHERE_NDIV
    }
}

/// RGBA color with float channels in `[0, 1]`.
pub type Color = [f32; 4];

/// Opaque white, the default modulation color.
pub const WHITE: Color = [1.0, 1.0, 1.0, 1.0];

/// Pack a float color into the byte format stored per vertex.
#[inline]
pub fn pack_color(c: Color) -> [u8; 4] {
    let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    [q(c[0]), q(c[1]), q(c[2]), q(c[3])]
}

/// A single mesh vertex as produced by the primitive emitters.
///
/// Matches the GPU-side layout byte for byte: position, a normal compressed
/// to signed bytes (the fourth component is padding), a 2D texture
/// coordinate and a packed RGBA color. `#[repr(C)]` plus `bytemuck::Pod`
/// make the vertex vectors directly uploadable with `cast_slice`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// World-space position [x, y, z].
    pub position: [f32; 3],
    /// Unit normal compressed to snorm bytes; `normal[3]` is unused padding.
    pub normal: [i8; 4],
    /// Texture coordinate [s, t].
    pub tex_coord: [f32; 2],
    /// Packed RGBA color.
    pub color: [u8; 4],
}

impl Vertex {
    /// Build a vertex, compressing the normal.
    pub fn new(position: Point3<f32>, normal: Vector3<f32>, tex_coord: [f32; 2], color: [u8; 4]) -> Self {
        let mut v = Vertex {
            position: [position.x, position.y, position.z],
            normal: [0; 4],
            tex_coord,
            color,
        };
        v.set_normal(normal);
        v
    }

    /// Compress and store a unit normal.
    #[inline]
    pub fn set_normal(&mut self, n: Vector3<f32>) {
        let q = |v: f32| (v.clamp(-1.0, 1.0) * 127.0).round() as i8;
        self.normal = [q(n.x), q(n.y), q(n.z), 0];
    }

    /// Decompress the stored normal back to floats (not re-normalized).
    #[inline]
    pub fn normal_vector(&self) -> Vector3<f32> {
        Vector3::new(
            self.normal[0] as f32 / 127.0,
            self.normal[1] as f32 / 127.0,
            self.normal[2] as f32 / 127.0,
        )
    }

    /// Position as a cgmath point.
    #[inline]
    pub fn position_point(&self) -> Point3<f32> {
        Point3::new(self.position[0], self.position[1], self.position[2])
    }

    /// Flip the stored normal in place (two-sided/inverted geometry).
    #[inline]
    pub fn invert_normal(&mut self) {
        for c in &mut self.normal[..3] {
            *c = -*c;
        }
    }

    /// Returns the vertex buffer layout for wgpu rendering.
    ///
    /// - Attribute 0: position (Float32x3)
    /// - Attribute 1: normal (Snorm8x4)
    /// - Attribute 2: texture coordinate (Float32x2)
    /// - Attribute 3: color (Unorm8x4)
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Snorm8x4,
                },
                wgpu::VertexAttribute {
                    offset: (mem::size_of::<[f32; 3]>() + mem::size_of::<[i8; 4]>()) as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: (mem::size_of::<[f32; 3]>()
                        + mem::size_of::<[i8; 4]>()
                        + mem::size_of::<[f32; 2]>()) as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Unorm8x4,
                },
            ],
        }
    }
}

/// Compress/decompress helper for tests and the rotation post-processor:
/// re-normalizes a decoded normal so round trips stay unit length.
#[inline]
pub(crate) fn renormalize(n: Vector3<f32>) -> Vector3<f32> {
    let mag2 = n.magnitude2();
    if mag2 > 1e-12 {
        n / mag2.sqrt()
    } else {
        n
    }
}
