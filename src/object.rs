//! Input descriptors handed to furniture assemblers.
//!
//! An [`ObjectSpec`] is the full per-object contract from the placement
//! layer: bounds, orientation, stable identity, color and state flags.
//! The per-furniture recipes that interpret it live outside this crate and
//! plug in through [`EmitGeometry`].

use cgmath::Vector3;

use crate::geom::{Aabb, Axis};
use crate::mesh::{BatchStore, Color};
use crate::style::Style;
use crate::variation::ObjectRng;

/// Geometric archetype of an object, used by assemblers to pick an emitter.
///
/// A closed enum (rather than an integer tag) so shape dispatch is
/// exhaustively checked at compile time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Cube,
    Cylinder,
    Sphere,
    /// Cube-shaped but taller than wide (e.g. standing lamps).
    Tall,
    /// Cube-shaped but flatter than wide (e.g. rugs, papers).
    Short,
    /// Sloped (ramps, open book covers).
    Angled,
}

/// Object state flags; a bitfield matching the placement layer's encoding.
pub mod flags {
    /// Door/drawer/lid is open.
    pub const OPEN: u32 = 1 << 0;
    /// Light-emitting object is lit.
    pub const LIT: u32 = 1 << 1;
    /// Object is broken (cracked mirror, dead light).
    pub const BROKEN: u32 = 1 << 2;
    /// Regenerated per frame/state change; routes to the dynamic category.
    pub const DYNAMIC: u32 = 1 << 3;
    /// Contents have been expanded into child objects.
    pub const EXPANDED: u32 = 1 << 4;
    /// Mounted on a wall or ceiling rather than resting on the floor.
    pub const HANGING: u32 = 1 << 5;
    /// Interior-only geometry (skipped for exterior views).
    pub const INTERIOR: u32 = 1 << 6;
    /// Inside an elevator car; moves with it.
    pub const IN_ELEVATOR: u32 = 1 << 7;
}

/// Maximum per-object drawer/door count; one bit of open-state each.
pub const MAX_DRAWERS: usize = 16;

/// Everything the placement layer says about one object.
///
/// The bounds plus `dim`/`dir` form the oriented box of the data model:
/// `dim` is the principal axis the object faces along and `dir` selects
/// which side of that axis is the front.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ObjectSpec {
    /// Strictly normalized bounds.
    pub bounds: Aabb,
    pub shape: ShapeKind,
    /// Facing axis.
    pub dim: Axis,
    /// Front side along `dim`.
    pub dir: bool,
    /// Stable object id; seeds deterministic variation.
    pub obj_id: u32,
    /// Owning container (room) id.
    pub room_id: u32,
    pub color: Color,
    /// State bitfield; see [`flags`].
    pub flags: u32,
    /// One open/closed bit per drawer or cabinet door.
    pub drawer_flags: u16,
    /// Auxiliary per-type count field (books on a shelf, bottles in a rack).
    pub item_flags: u16,
}

impl ObjectSpec {
    pub fn new(bounds: Aabb, shape: ShapeKind, dim: Axis, dir: bool) -> Self {
        debug_assert!(
            bounds.is_strictly_normalized(),
            "object bounds must be strictly normalized: {bounds:?}"
        );
        ObjectSpec {
            bounds,
            shape,
            dim,
            dir,
            obj_id: 0,
            room_id: 0,
            color: crate::mesh::WHITE,
            flags: 0,
            drawer_flags: 0,
            item_flags: 0,
        }
    }

    /// Extent along the facing axis.
    pub fn length(&self) -> f32 {
        self.bounds.size_dim(self.dim.index())
    }

    /// Extent along the horizontal axis perpendicular to the facing axis.
    pub fn width(&self) -> f32 {
        let w_dim = if self.dim == Axis::X { 1 } else { 0 };
        self.bounds.size_dim(w_dim)
    }

    /// Vertical extent.
    pub fn height(&self) -> f32 {
        self.bounds.size_dim(2)
    }

    /// Unit vector pointing out of the object's front face.
    pub fn front_dir(&self) -> Vector3<f32> {
        let mut v = Vector3::new(0.0, 0.0, 0.0);
        v[self.dim.index()] = if self.dir { 1.0 } else { -1.0 };
        v
    }

    pub fn is_open(&self) -> bool {
        self.flags & flags::OPEN != 0
    }

    pub fn is_lit(&self) -> bool {
        self.flags & flags::LIT != 0
    }

    pub fn is_broken(&self) -> bool {
        self.flags & flags::BROKEN != 0
    }

    pub fn is_dynamic(&self) -> bool {
        self.flags & flags::DYNAMIC != 0
    }

    pub fn is_hanging(&self) -> bool {
        self.flags & flags::HANGING != 0
    }

    pub fn in_elevator(&self) -> bool {
        self.flags & flags::IN_ELEVATOR != 0
    }

    /// Open state of one drawer. Indices beyond [`MAX_DRAWERS`] indicate an
    /// assembler bug (the flag word has no room for them) and fail fast.
    pub fn drawer_open(&self, drawer_ix: usize) -> bool {
        assert!(drawer_ix < MAX_DRAWERS, "drawer index {drawer_ix} out of range");
        self.drawer_flags & (1 << drawer_ix) != 0
    }

    /// The variation stream for this object's identity; re-deriving it
    /// always replays the same choices.
    pub fn rng(&self) -> ObjectRng {
        ObjectRng::for_object(self.obj_id, self.room_id)
    }
}

/// The contract each furniture kind implements: interpret an
/// [`ObjectSpec`] and append geometry through the store. Implementations
/// must be pure given `(spec, rng, style)` so regeneration after
/// invalidation is idempotent.
///
/// Data-dependent degenerate cases (a cabinet too narrow for any door)
/// must emit nothing for that sub-feature and continue; only contract
/// violations (malformed bounds) may panic.
pub trait EmitGeometry {
    fn emit(&self, spec: &ObjectSpec, store: &mut BatchStore, rng: &mut ObjectRng, style: &Style);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ObjectSpec {
        let bounds = Aabb::new(0.0, 2.0, 0.0, 1.0, 0.0, 0.75);
        ObjectSpec::new(bounds, ShapeKind::Cube, Axis::X, true)
    }

    #[test]
    fn oriented_dimensions() {
        let s = spec();
        assert_eq!(s.length(), 2.0);
        assert_eq!(s.width(), 1.0);
        assert_eq!(s.height(), 0.75);
        assert_eq!(s.front_dir(), Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn flag_accessors() {
        let mut s = spec();
        assert!(!s.is_open());
        s.flags |= flags::OPEN | flags::LIT;
        assert!(s.is_open());
        assert!(s.is_lit());
        assert!(!s.is_broken());
    }

    #[test]
    fn drawer_bits() {
        let mut s = spec();
        s.drawer_flags = 0b101;
        assert!(s.drawer_open(0));
        assert!(!s.drawer_open(1));
        assert!(s.drawer_open(2));
        assert!(!s.drawer_open(15));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn drawer_index_out_of_range_panics() {
        spec().drawer_open(16);
    }

    #[test]
    fn rng_is_tied_to_identity() {
        let mut a = spec();
        a.obj_id = 5;
        a.room_id = 9;
        let x = a.rng().uniform(0.0, 1.0);
        let y = a.rng().uniform(0.0, 1.0);
        assert_eq!(x.to_bits(), y.to_bits());
    }
}
