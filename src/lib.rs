// src/lib.rs
//! Roomgeom
//!
//! Procedural mesh synthesis for building interiors: primitive emitters
//! (boxes, cylinders, spheres, disks, tori), a material-deduplicated batch
//! store that minimizes draw calls, axis-aligned box CSG for cutting
//! drawer/sink hollows, deterministic per-object variation streams and a
//! vertex-range rotation post-processor.
//!
//! Generation is single-threaded per building: one pass walks the placed
//! furniture, each object appending into the [`mesh::BatchStore`] through
//! the primitive emitters. Finalized categories are handed to the render
//! thread as read-only buffers via [`mesh::upload`]; no mutation may occur
//! until the next invalidation cycle. Multiple buildings may generate
//! concurrently as long as each store has a single writer.

pub mod geom;
pub mod mesh;
pub mod object;
pub mod style;
pub mod variation;

// Re-export main types for convenience
pub use geom::{subtract_box, subtract_box_xy, Aabb, Axis};
pub use mesh::{BatchStore, Category, MaterialBatch, MaterialKey, Vertex};
pub use object::{EmitGeometry, ObjectSpec, ShapeKind};
pub use style::Style;
pub use variation::ObjectRng;
