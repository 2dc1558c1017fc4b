//! # Box CSG Difference
//!
//! Decomposes `container - hole` into non-overlapping axis-aligned
//! fragments. Open drawers, sink cutouts and hollow cabinet interiors are
//! all carved with this one routine instead of per-call-site subtraction
//! logic.
//!
//! Fragments are appended to a caller-provided scratch vector so per-object
//! generation can reuse one allocation across thousands of calls.

use super::Aabb;

/// Append the fragments of `container` minus `hole` to `out`.
///
/// Slices sequentially: the -X and +X slabs are emitted first, then -Y/+Y
/// within the X-clipped band, then -Z/+Z within the remaining XY-clipped
/// column. This yields at most 6 fragments which are pairwise
/// non-overlapping and whose union is exactly
/// `container - (container ∩ hole)`. Zero-volume fragments are discarded.
///
/// If the boxes are disjoint the container is appended unchanged; if the
/// hole covers the container nothing is appended.
pub fn subtract_box(container: &Aabb, hole: &Aabb, out: &mut Vec<Aabb>) {
    subtract_box_impl(container, hole, 3, out);
}

/// Variant of [`subtract_box`] restricted to the horizontal plane.
///
/// The hole's vertical extent is ignored: fragments span the container's
/// full Z range, and only -X/+X/-Y/+Y slabs (at most 4 fragments) are
/// produced. Used for counter cutouts around sink basins, where the basin
/// does not reach the counter's full height but the cut must.
pub fn subtract_box_xy(container: &Aabb, hole: &Aabb, out: &mut Vec<Aabb>) {
    subtract_box_impl(container, hole, 2, out);
}

fn subtract_box_impl(container: &Aabb, hole: &Aabb, num_dims: usize, out: &mut Vec<Aabb>) {
    debug_assert!(container.is_normalized());
    debug_assert!(hole.is_normalized());
    let intersects = if num_dims == 2 {
        container.intersects_xy(hole)
    } else {
        container.intersects(hole)
    };
    if !intersects {
        out.push(*container);
        return;
    }
    // Clip the hole to the container so partial overlaps behave like
    // contained holes. In XY mode the hole takes the container's Z range.
    let mut clipped = container.intersection(hole);
    if num_dims == 2 {
        clipped.d[2] = container.d[2];
    }
    let mut remaining = *container;

    for n in 0..num_dims {
        // Slab below the hole along this axis.
        if remaining.d[n][0] < clipped.d[n][0] {
            let mut frag = remaining;
            frag.d[n][1] = clipped.d[n][0];
            push_fragment(frag, out);
        }
        // Slab above the hole along this axis.
        if clipped.d[n][1] < remaining.d[n][1] {
            let mut frag = remaining;
            frag.d[n][0] = clipped.d[n][1];
            push_fragment(frag, out);
        }
        // Later axes slice only within the band already clipped to the hole.
        remaining.d[n] = clipped.d[n];
    }
    // What's left of `remaining` is exactly the clipped hole; dropped.
}

fn push_fragment(frag: Aabb, out: &mut Vec<Aabb>) {
    if frag.is_strictly_normalized() {
        out.push(frag);
    }
}
