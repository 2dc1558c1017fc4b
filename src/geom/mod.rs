//! # Geometric Foundations
//!
//! Axis-aligned bounding boxes, principal axes, box CSG and vertex-range
//! rotation. Everything in this module is pure math with no material or
//! batching awareness.

pub mod csg;
pub mod rotate;

pub use csg::{subtract_box, subtract_box_xy};
pub use rotate::rotate_verts;

use cgmath::{Point3, Vector3};

/// One of the three principal axes.
///
/// Stored as a plain discriminant so it can index per-dimension arrays the
/// same way the emitter does internally.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    /// All three axes in index order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Numeric dimension index (0, 1, or 2).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Construct from a dimension index; panics on values other than 0..3.
    #[inline]
    pub fn from_index(dim: usize) -> Axis {
        match dim {
            0 => Axis::X,
            1 => Axis::Y,
            2 => Axis::Z,
            _ => panic!("invalid axis index {dim}"),
        }
    }

    /// The other two axes, in cyclic order (X -> (Y, Z), Y -> (Z, X), Z -> (X, Y)).
    #[inline]
    pub fn tangents(self) -> (usize, usize) {
        let n = self.index();
        ((n + 1) % 3, (n + 2) % 3)
    }

    /// Unit vector along this axis.
    pub fn unit_vector(self) -> Vector3<f32> {
        match self {
            Axis::X => Vector3::unit_x(),
            Axis::Y => Vector3::unit_y(),
            Axis::Z => Vector3::unit_z(),
        }
    }
}

/// An axis-aligned box stored as per-dimension `[low, high]` bound pairs.
///
/// The `[[f32; 2]; 3]` layout keeps dimension-generic code (face loops, CSG
/// slab slicing) free of x/y/z special cases: `d[dim][side]` addresses any
/// bound directly.
///
/// Boxes fed to the primitive emitter must be *strictly normalized*
/// (`low < high` on every axis). Passing a degenerate or inverted box is a
/// caller bug and fails a debug assertion rather than producing broken
/// geometry. CSG intermediates may be degenerate; those are filtered before
/// they escape.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Aabb {
    /// Bounds indexed as `d[dimension][0 = low, 1 = high]`.
    pub d: [[f32; 2]; 3],
}

impl Aabb {
    /// Build a box from low/high corner points.
    pub fn from_extents(lo: Point3<f32>, hi: Point3<f32>) -> Self {
        Aabb {
            d: [[lo.x, hi.x], [lo.y, hi.y], [lo.z, hi.z]],
        }
    }

    /// Build a box from per-axis bounds `(x1, x2, y1, y2, z1, z2)`.
    pub fn new(x1: f32, x2: f32, y1: f32, y2: f32, z1: f32, z2: f32) -> Self {
        Aabb {
            d: [[x1, x2], [y1, y2], [z1, z2]],
        }
    }

    /// Zero-size box at a single point.
    pub fn from_point(p: Point3<f32>) -> Self {
        Aabb::from_extents(p, p)
    }

    /// Low bound along `dim`.
    #[inline]
    pub fn lo(&self, dim: usize) -> f32 {
        self.d[dim][0]
    }

    /// High bound along `dim`.
    #[inline]
    pub fn hi(&self, dim: usize) -> f32 {
        self.d[dim][1]
    }

    /// Extent along `dim`.
    #[inline]
    pub fn size_dim(&self, dim: usize) -> f32 {
        self.d[dim][1] - self.d[dim][0]
    }

    /// Extents along all three axes.
    pub fn size(&self) -> Vector3<f32> {
        Vector3::new(self.size_dim(0), self.size_dim(1), self.size_dim(2))
    }

    /// Center point.
    pub fn center(&self) -> Point3<f32> {
        Point3::new(
            0.5 * (self.d[0][0] + self.d[0][1]),
            0.5 * (self.d[1][0] + self.d[1][1]),
            0.5 * (self.d[2][0] + self.d[2][1]),
        )
    }

    /// Lower corner (minimum on all axes). Commonly used as a shared texture
    /// origin so adjacent boxes tile seamlessly.
    pub fn llc(&self) -> Point3<f32> {
        Point3::new(self.d[0][0], self.d[1][0], self.d[2][0])
    }

    /// Upper corner (maximum on all axes).
    pub fn urc(&self) -> Point3<f32> {
        Point3::new(self.d[0][1], self.d[1][1], self.d[2][1])
    }

    /// True when `low < high` strictly on every axis.
    pub fn is_strictly_normalized(&self) -> bool {
        (0..3).all(|n| self.d[n][0] < self.d[n][1])
    }

    /// True when `low <= high` on every axis (zero-volume allowed).
    pub fn is_normalized(&self) -> bool {
        (0..3).all(|n| self.d[n][0] <= self.d[n][1])
    }

    /// Signed volume; zero or negative for degenerate boxes.
    pub fn volume(&self) -> f32 {
        self.size_dim(0) * self.size_dim(1) * self.size_dim(2)
    }

    /// Footprint area in the XY plane.
    pub fn area_xy(&self) -> f32 {
        self.size_dim(0) * self.size_dim(1)
    }

    /// Grow (or shrink, with a negative amount) along one axis on both sides.
    pub fn expand_in_dim(&mut self, dim: usize, amount: f32) {
        self.d[dim][0] -= amount;
        self.d[dim][1] += amount;
    }

    /// Grow (or shrink) uniformly on all axes.
    pub fn expand_by(&mut self, amount: f32) {
        for n in 0..3 {
            self.expand_in_dim(n, amount);
        }
    }

    /// Translate along one axis.
    pub fn translate_dim(&mut self, dim: usize, amount: f32) {
        self.d[dim][0] += amount;
        self.d[dim][1] += amount;
    }

    /// Overlap test on the horizontal plane only.
    pub fn intersects_xy(&self, other: &Aabb) -> bool {
        (0..2).all(|n| self.d[n][0] < other.d[n][1] && other.d[n][0] < self.d[n][1])
    }

    /// Strict overlap test (shared faces do not count as intersection).
    pub fn intersects(&self, other: &Aabb) -> bool {
        (0..3).all(|n| self.d[n][0] < other.d[n][1] && other.d[n][0] < self.d[n][1])
    }

    /// True when `other` lies entirely within this box (boundaries allowed).
    pub fn contains_box(&self, other: &Aabb) -> bool {
        (0..3).all(|n| self.d[n][0] <= other.d[n][0] && other.d[n][1] <= self.d[n][1])
    }

    /// Clip this box to another, returning the (possibly degenerate)
    /// intersection region.
    pub fn intersection(&self, other: &Aabb) -> Aabb {
        let mut out = *self;
        for n in 0..3 {
            out.d[n][0] = self.d[n][0].max(other.d[n][0]);
            out.d[n][1] = self.d[n][1].min(other.d[n][1]);
        }
        out
    }
}
