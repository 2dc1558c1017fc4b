//! Rotation post-processing for already-emitted vertex ranges.
//!
//! Primitives are emitted in canonical axis-aligned form and then tilted,
//! swung or misaligned by rotating the vertices they just appended. This
//! avoids threading trigonometry through every emitter.

use crate::mesh::{renormalize, Vertex};
use cgmath::{InnerSpace, Matrix3, Point3, Rad, Vector3};

/// Rotate `verts[start..]` by `angle` about `axis` through `pivot`.
///
/// Both positions and normals are transformed; normals are re-normalized
/// after decompression so repeated rotations do not accumulate quantization
/// drift. Rotating by `angle` and then `-angle` about the same axis and
/// pivot restores the original positions within floating-point tolerance.
///
/// `start` is typically the vertex count captured just before emitting the
/// primitive to be rotated (the original's `qv_start` pattern).
pub fn rotate_verts(
    verts: &mut [Vertex],
    axis: Vector3<f32>,
    angle: Rad<f32>,
    pivot: Point3<f32>,
    start: usize,
) {
    debug_assert!(start <= verts.len());
    debug_assert!(axis.magnitude2() > 0.0, "rotation axis must be non-zero");
    if angle.0 == 0.0 {
        return;
    }
    let m = Matrix3::from_axis_angle(axis.normalize(), angle);

    for v in &mut verts[start..] {
        let p = v.position_point();
        let rotated = pivot + m * (p - pivot);
        v.position = [rotated.x, rotated.y, rotated.z];
        v.set_normal(renormalize(m * v.normal_vector()));
    }
}
