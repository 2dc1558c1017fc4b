//! GPU hand-off for finalized batches.
//!
//! Once a category's batches are finalized they are flattened into one
//! (vertex, index) buffer pair per material and handed to the render thread
//! as read-only data. Quad lists are expanded to triangle indices here;
//! the merge logic is separate from the device calls so it stays testable
//! without a GPU.

use log::debug;
use wgpu::util::DeviceExt;

use super::batch::{BatchStore, Category, MaterialBatch};
use super::material::MaterialKey;
use super::Vertex;

/// Triangle indices for a run of independent quads starting at vertex
/// `base`: two triangles `(0,1,2)`/`(2,3,0)` per quad.
pub fn quad_triangle_indices(num_quads: usize, base: u32) -> Vec<u32> {
    let mut out = Vec::with_capacity(6 * num_quads);
    for q in 0..num_quads as u32 {
        let v = base + 4 * q;
        out.extend_from_slice(&[v, v + 1, v + 2, v + 2, v + 3, v]);
    }
    out
}

/// A batch flattened to a single indexed triangle list, ready for upload.
#[derive(Debug, Default)]
pub struct MergedGeometry {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// Flatten a batch: quad vertices first (with generated indices), then the
/// indexed-triangle pool with its indices rebased past the quads.
pub fn merge_batch(batch: &MaterialBatch) -> MergedGeometry {
    debug_assert!(batch.quad_verts.len() % 4 == 0, "quad list not a multiple of 4");
    let num_quads = batch.quad_verts.len() / 4;
    let mut out = MergedGeometry {
        vertices: Vec::with_capacity(batch.num_verts()),
        indices: quad_triangle_indices(num_quads, 0),
    };
    out.vertices.extend_from_slice(&batch.quad_verts);
    let tri_base = out.vertices.len() as u32;
    out.vertices.extend_from_slice(&batch.itri_verts);
    out.indices.extend(batch.indices.iter().map(|&ix| ix + tri_base));
    out
}

/// GPU buffers for one material batch, plus the state the render dispatcher
/// needs to bind it.
pub struct BatchBuffers {
    pub key: MaterialKey,
    pub shadows_enabled: bool,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

/// Upload one batch; returns `None` for empty batches (nothing to draw).
pub fn create_batch_buffers(device: &wgpu::Device, batch: &MaterialBatch) -> Option<BatchBuffers> {
    if batch.is_empty() {
        return None;
    }
    let merged = merge_batch(batch);
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("roomgeom batch vertices"),
        contents: bytemuck::cast_slice(&merged.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("roomgeom batch indices"),
        contents: bytemuck::cast_slice(&merged.indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    Some(BatchBuffers {
        key: batch.key,
        shadows_enabled: batch.shadows_enabled,
        vertex_buffer,
        index_buffer,
        index_count: merged.indices.len() as u32,
    })
}

/// Upload every non-empty batch in a category. The result is the
/// per-category draw list; batches are always uploaded and drawn whole.
pub fn upload_category(
    device: &wgpu::Device,
    store: &BatchStore,
    category: Category,
) -> Vec<BatchBuffers> {
    let buffers: Vec<BatchBuffers> = store
        .batches(category)
        .filter_map(|b| create_batch_buffers(device, b))
        .collect();
    debug!(
        "uploaded {} batches ({} verts) for {:?}",
        buffers.len(),
        store.count_verts(category),
        category
    );
    buffers
}
