//! # Primitive Emitters
//!
//! Append-only mesh generation into a [`MaterialBatch`]: boxes with
//! selective face suppression, cylinders/cones, spheres, disks, tori and
//! single triangles. None of these read prior buffer state; callers capture
//! `quad_verts.len()` / `itri_verts.len()` before emitting when they intend
//! to post-process the new range (see [`crate::geom::rotate_verts`]).
//!
//! Boxes emit independent quads into `quad_verts`; curved primitives emit
//! shared vertices plus triangle indices into `itri_verts`/`indices`.
//!
//! All emitters require strictly normalized boxes and non-degenerate radii.
//! Violations are caller bugs and fail debug assertions.

use std::f32::consts::{PI, TAU};

use cgmath::{InnerSpace, Matrix3, Point3, Vector3};

use crate::geom::{Aabb, Axis};

use super::batch::MaterialBatch;
use super::{pack_color, sphere_ndiv, Color, Vertex, CYL_NDIV};

// Skip-face bits: 1 << (2*(2-dim) + dir), so Z faces occupy the low bits.
/// Skip the -Z (bottom) face.
pub const EF_Z1: u32 = 0x01;
/// Skip the +Z (top) face.
pub const EF_Z2: u32 = 0x02;
/// Skip the -Y face.
pub const EF_Y1: u32 = 0x04;
/// Skip the +Y face.
pub const EF_Y2: u32 = 0x08;
/// Skip the -X face.
pub const EF_X1: u32 = 0x10;
/// Skip the +X face.
pub const EF_X2: u32 = 0x20;
/// Skip both Z faces.
pub const EF_Z12: u32 = EF_Z1 | EF_Z2;
/// Skip both Y faces.
pub const EF_Y12: u32 = EF_Y1 | EF_Y2;
/// Skip both X faces.
pub const EF_X12: u32 = EF_X1 | EF_X2;
/// All six faces.
pub const EF_ALL: u32 = 0x3F;

/// Bit for one face of a box.
#[inline]
pub fn face_bit(dim: usize, dir: usize) -> u32 {
    debug_assert!(dim < 3 && dir < 2);
    1 << (2 * (2 - dim) + dir)
}

/// Skip mask that draws *only* the given face.
#[inline]
pub fn face_mask(dim: usize, dir: bool) -> u32 {
    EF_ALL & !face_bit(dim, dir as usize)
}

/// Skip mask for the two faces perpendicular to a horizontal dim.
#[inline]
pub fn skip_mask_xy(dim: usize) -> u32 {
    debug_assert!(dim < 2);
    if dim == 1 {
        EF_Y12
    } else {
        EF_X12
    }
}

/// Optional parameters for the cylinder emitters. `Default` gives a closed,
/// single-sided cylinder at the standard polygon count.
#[derive(Copy, Clone, Debug)]
pub struct CylinderOpts {
    /// Emit the cap at the low end of the axis.
    pub draw_bot: bool,
    /// Emit the cap at the high end of the axis.
    pub draw_top: bool,
    /// Also emit inward-facing side geometry (open pipes, lamp shades).
    pub two_sided: bool,
    /// Flip cap normals/winding (caps seen from inside).
    pub invert_caps: bool,
    /// Radius multiplier at the low end; <1 truncates into a cone.
    pub radius_scale_bot: f32,
    /// Radius multiplier at the high end.
    pub radius_scale_top: f32,
    /// Texture repeats around the circumference.
    pub side_tscale: f32,
    /// Texture scale across the end caps.
    pub end_tscale: f32,
    /// Suppress the side surface entirely (caps only).
    pub skip_sides: bool,
    /// Polygon count around the circumference.
    pub ndiv: u32,
    /// Texture seam offset around the circumference.
    pub side_tscale_add: f32,
    /// Swap side texture axes.
    pub swap_txy: bool,
    /// Texture repeats along the axis.
    pub len_tscale: f32,
}

impl Default for CylinderOpts {
    fn default() -> Self {
        CylinderOpts {
            draw_bot: true,
            draw_top: true,
            two_sided: false,
            invert_caps: false,
            radius_scale_bot: 1.0,
            radius_scale_top: 1.0,
            side_tscale: 1.0,
            end_tscale: 1.0,
            skip_sides: false,
            ndiv: CYL_NDIV,
            side_tscale_add: 0.0,
            swap_txy: false,
            len_tscale: 1.0,
        }
    }
}

impl CylinderOpts {
    /// Caps-only selection, everything else default.
    pub fn caps(draw_bot: bool, draw_top: bool) -> Self {
        CylinderOpts {
            draw_bot,
            draw_top,
            ..CylinderOpts::default()
        }
    }
}

impl MaterialBatch {
    /// Emit up to six quads for an axis-aligned box.
    ///
    /// Faces whose bit is set in `skip_faces` (see [`EF_Z1`] and friends)
    /// are omitted; the emitted quad count is `6 - popcount(skip_faces)`.
    /// Texture coordinates derive from world position minus `tex_origin`
    /// scaled by the material's UV transform, so adjacent boxes sharing a
    /// `tex_origin` tile seamlessly. `swap_tex_st` exchanges the texture
    /// axes (grain direction), `mirror_x`/`mirror_y` flip them, and
    /// `inverted` reverses winding and normals to draw the box interior.
    #[allow(clippy::too_many_arguments)]
    pub fn add_box(
        &mut self,
        c: &Aabb,
        color: Color,
        tex_origin: Point3<f32>,
        skip_faces: u32,
        swap_tex_st: bool,
        mirror_x: bool,
        mirror_y: bool,
        inverted: bool,
    ) {
        self.add_box_inner(
            c,
            color,
            tex_origin,
            skip_faces,
            swap_tex_st,
            mirror_x,
            mirror_y,
            inverted,
            true,
        );
    }

    /// [`MaterialBatch::add_box`] for untextured materials: zero texture
    /// coordinates, no mirroring or axis swap.
    pub fn add_box_untextured(&mut self, c: &Aabb, color: Color, skip_faces: u32) {
        self.add_box_inner(
            c,
            color,
            Point3::new(0.0, 0.0, 0.0),
            skip_faces,
            false,
            false,
            false,
            false,
            false,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn add_box_inner(
        &mut self,
        c: &Aabb,
        color: Color,
        tex_origin: Point3<f32>,
        skip_faces: u32,
        swap_tex_st: bool,
        mirror_x: bool,
        mirror_y: bool,
        inverted: bool,
        textured: bool,
    ) {
        debug_assert!(
            c.is_strictly_normalized(),
            "add_box requires a strictly normalized box: {c:?}"
        );
        let cw = pack_color(color);
        let origin = [tex_origin.x, tex_origin.y, tex_origin.z];
        // Corner order traces the (d0, d1) plane counterclockwise as seen
        // from the +n side.
        const CORNERS: [(usize, usize); 4] = [(0, 0), (1, 0), (1, 1), (0, 1)];

        for n in 0..3 {
            let (d0, d1) = ((n + 1) % 3, (n + 2) % 3);
            for j in 0..2 {
                if skip_faces & face_bit(n, j) != 0 {
                    continue;
                }
                let outward = if (j == 1) != inverted { 1.0 } else { -1.0 };
                let mut normal = Vector3::new(0.0, 0.0, 0.0);
                normal[n] = outward;

                let mut quad = [Vertex::new(
                    Point3::new(0.0, 0.0, 0.0),
                    normal,
                    [0.0, 0.0],
                    cw,
                ); 4];
                for (k, &(a, b)) in CORNERS.iter().enumerate() {
                    let mut pos = [0.0f32; 3];
                    pos[n] = c.d[n][j];
                    pos[d0] = c.d[d0][a];
                    pos[d1] = c.d[d1][b];

                    let mut tc = [0.0f32; 2];
                    if textured {
                        let (sd, td) = if swap_tex_st { (d1, d0) } else { (d0, d1) };
                        let mut s =
                            (pos[sd] - origin[sd]) * self.key.tscale_x + self.key.txoff;
                        let mut t =
                            (pos[td] - origin[td]) * self.key.tscale_y + self.key.tyoff;
                        if mirror_x {
                            s = -s;
                        }
                        if mirror_y {
                            t = -t;
                        }
                        tc = [s, t];
                    }
                    quad[k] = Vertex {
                        position: pos,
                        normal: quad[k].normal,
                        tex_coord: tc,
                        color: cw,
                    };
                }
                // Base order winds CCW for the +n face; reverse for -n.
                if (j == 0) != inverted {
                    quad.swap(1, 3);
                }
                self.quad_verts.extend_from_slice(&quad);
            }
        }
    }

    /// Emit one externally-computed quad with explicit per-vertex texture
    /// coordinates. The normal is derived from the first three points.
    /// Used for sloped surfaces (ramps, stair stringers, pillows) that no
    /// box face covers.
    pub fn add_quad(&mut self, pts: &[Point3<f32>; 4], ts: &[f32; 4], tt: &[f32; 4], color: Color) {
        let cw = pack_color(color);
        let normal = (pts[1] - pts[0]).cross(pts[3] - pts[0]);
        debug_assert!(normal.magnitude2() > 0.0, "degenerate quad");
        let normal = normal.normalize();
        for i in 0..4 {
            self.quad_verts
                .push(Vertex::new(pts[i], normal, [ts[i], tt[i]], cw));
        }
    }

    /// Emit a cylinder/cone whose axis is a principal axis and whose
    /// (possibly elliptical) footprint is the box's cross-section in the
    /// other two axes.
    ///
    /// The side surface is `ndiv` quads emitted as `2*ndiv` indexed
    /// triangles; each requested cap is an `ndiv`-gon fan.
    pub fn add_ortho_cylinder(&mut self, c: &Aabb, color: Color, axis: Axis, opts: &CylinderOpts) {
        debug_assert!(c.is_strictly_normalized());
        let n = axis.index();
        let (d0, d1) = axis.tangents();
        let center = c.center();
        let center = [center.x, center.y, center.z];
        let rx = 0.5 * c.size_dim(d0);
        let ry = 0.5 * c.size_dim(d1);
        self.add_cylinder_frame(
            center,
            n,
            d0,
            d1,
            c.lo(n),
            c.hi(n),
            rx,
            ry,
            color,
            opts,
        );
    }

    /// Vertical-axis convenience wrapper for [`MaterialBatch::add_ortho_cylinder`].
    pub fn add_vert_cylinder(&mut self, c: &Aabb, color: Color, draw_bot: bool, draw_top: bool) {
        self.add_ortho_cylinder(c, color, Axis::Z, &CylinderOpts::caps(draw_bot, draw_top));
    }

    /// Emit a cylinder/cone between two arbitrary points (pipes, railings,
    /// chair legs on a slope). Radii apply at the respective endpoints.
    pub fn add_cylinder(
        &mut self,
        bot: Point3<f32>,
        top: Point3<f32>,
        r_bot: f32,
        r_top: f32,
        color: Color,
        opts: &CylinderOpts,
    ) {
        let axis = top - bot;
        let len = axis.magnitude();
        debug_assert!(len > 0.0, "cylinder endpoints coincide");
        debug_assert!(r_bot > 0.0 || r_top > 0.0, "cylinder needs a positive radius");
        let v = axis / len;
        // Build an orthonormal frame perpendicular to the axis.
        let pick = if v.x.abs() < 0.9 {
            Vector3::unit_x()
        } else {
            Vector3::unit_y()
        };
        let t0 = pick.cross(v).normalize();
        let t1 = v.cross(t0);

        let ndiv = opts.ndiv.max(3);
        let cw = pack_color(color);
        let slope = r_bot - r_top; // normal tilt for cones

        if !opts.skip_sides {
            let base = self.itri_verts.len() as u32;
            for i in 0..=ndiv {
                let theta = TAU * (i as f32) / (ndiv as f32);
                let (sin_t, cos_t) = theta.sin_cos();
                let radial = cos_t * t0 + sin_t * t1;
                let normal = (len * radial + slope * v).normalize();
                let u = opts.side_tscale * (i as f32) / (ndiv as f32) + opts.side_tscale_add;
                for (end, r, vc) in [(bot, r_bot, 0.0), (top, r_top, opts.len_tscale)] {
                    let tc = if opts.swap_txy { [vc, u] } else { [u, vc] };
                    self.itri_verts
                        .push(Vertex::new(end + r * radial, normal, tc, cw));
                }
            }
            for i in 0..ndiv {
                let b0 = base + 2 * i;
                let (t0i, b1, t1i) = (b0 + 1, b0 + 2, b0 + 3);
                self.indices.extend_from_slice(&[b0, b1, t1i, b0, t1i, t0i]);
            }
            if opts.two_sided {
                self.mirror_itri_range(base as usize, self.indices.len() - 6 * ndiv as usize);
            }
        }
        for (enabled, end, r, sign) in [
            (opts.draw_bot, bot, r_bot, -1.0f32),
            (opts.draw_top, top, r_top, 1.0f32),
        ] {
            if !enabled || r <= 0.0 {
                continue;
            }
            let invert = opts.invert_caps;
            let normal = if invert { -sign * v } else { sign * v };
            let base = self.itri_verts.len() as u32;
            self.itri_verts
                .push(Vertex::new(end, normal, [0.5, 0.5], cw));
            for i in 0..ndiv {
                let theta = TAU * (i as f32) / (ndiv as f32);
                let (sin_t, cos_t) = theta.sin_cos();
                let radial = cos_t * t0 + sin_t * t1;
                let tc = [
                    0.5 + 0.5 * opts.end_tscale * cos_t,
                    0.5 + 0.5 * opts.end_tscale * sin_t,
                ];
                self.itri_verts.push(Vertex::new(end + r * radial, normal, tc, cw));
            }
            // Wind fans so the face is CCW from the side its normal points to.
            let flip = (sign < 0.0) != invert;
            for i in 0..ndiv {
                let a = base + 1 + i;
                let b = base + 1 + (i + 1) % ndiv;
                if flip {
                    self.indices.extend_from_slice(&[base, b, a]);
                } else {
                    self.indices.extend_from_slice(&[base, a, b]);
                }
            }
        }
    }

    // Shared dim-indexed construction for ortho cylinders; supports
    // elliptical cross-sections which the point-to-point form does not.
    #[allow(clippy::too_many_arguments)]
    fn add_cylinder_frame(
        &mut self,
        center: [f32; 3],
        n: usize,
        d0: usize,
        d1: usize,
        lo: f32,
        hi: f32,
        rx: f32,
        ry: f32,
        color: Color,
        opts: &CylinderOpts,
    ) {
        debug_assert!(rx > 0.0 && ry > 0.0, "degenerate cylinder cross-section");
        let ndiv = opts.ndiv.max(3);
        let cw = pack_color(color);
        let len = hi - lo;
        let (rs_b, rs_t) = (opts.radius_scale_bot, opts.radius_scale_top);
        let slope = 0.5 * (rx + ry) * (rs_b - rs_t);

        if !opts.skip_sides {
            let base = self.itri_verts.len() as u32;
            for i in 0..=ndiv {
                let theta = TAU * (i as f32) / (ndiv as f32);
                let (sin_t, cos_t) = theta.sin_cos();
                let mut normal = Vector3::new(0.0, 0.0, 0.0);
                normal[d0] = cos_t * len;
                normal[d1] = sin_t * len;
                normal[n] = slope;
                let normal = normal.normalize();
                let u = opts.side_tscale * (i as f32) / (ndiv as f32) + opts.side_tscale_add;
                for (end, rs, vc) in [(lo, rs_b, 0.0), (hi, rs_t, opts.len_tscale)] {
                    let mut pos = [0.0f32; 3];
                    pos[n] = end;
                    pos[d0] = center[d0] + rs * rx * cos_t;
                    pos[d1] = center[d1] + rs * ry * sin_t;
                    let tc = if opts.swap_txy { [vc, u] } else { [u, vc] };
                    let mut vert = Vertex {
                        position: pos,
                        normal: [0; 4],
                        tex_coord: tc,
                        color: cw,
                    };
                    vert.set_normal(normal);
                    self.itri_verts.push(vert);
                }
            }
            for i in 0..ndiv {
                let b0 = base + 2 * i;
                let (t0i, b1, t1i) = (b0 + 1, b0 + 2, b0 + 3);
                self.indices.extend_from_slice(&[b0, b1, t1i, b0, t1i, t0i]);
            }
            if opts.two_sided {
                self.mirror_itri_range(base as usize, self.indices.len() - 6 * ndiv as usize);
            }
        }
        for (enabled, end, rs, sign) in [
            (opts.draw_bot, lo, rs_b, -1.0f32),
            (opts.draw_top, hi, rs_t, 1.0f32),
        ] {
            if !enabled || rs <= 0.0 {
                continue;
            }
            let invert = opts.invert_caps;
            let mut normal = Vector3::new(0.0, 0.0, 0.0);
            normal[n] = if invert { -sign } else { sign };
            let base = self.itri_verts.len() as u32;
            let mut cpos = center;
            cpos[n] = end;
            let mut cvert = Vertex {
                position: cpos,
                normal: [0; 4],
                tex_coord: [0.5, 0.5],
                color: cw,
            };
            cvert.set_normal(normal);
            self.itri_verts.push(cvert);
            for i in 0..ndiv {
                let theta = TAU * (i as f32) / (ndiv as f32);
                let (sin_t, cos_t) = theta.sin_cos();
                let mut pos = cpos;
                pos[d0] = center[d0] + rs * rx * cos_t;
                pos[d1] = center[d1] + rs * ry * sin_t;
                let tc = [
                    0.5 + 0.5 * opts.end_tscale * cos_t,
                    0.5 + 0.5 * opts.end_tscale * sin_t,
                ];
                let mut vert = Vertex {
                    position: pos,
                    normal: [0; 4],
                    tex_coord: tc,
                    color: cw,
                };
                vert.set_normal(normal);
                self.itri_verts.push(vert);
            }
            let flip = (sign < 0.0) != invert;
            for i in 0..ndiv {
                let a = base + 1 + i;
                let b = base + 1 + (i + 1) % ndiv;
                if flip {
                    self.indices.extend_from_slice(&[base, b, a]);
                } else {
                    self.indices.extend_from_slice(&[base, a, b]);
                }
            }
        }
    }

    // Duplicate an indexed-triangle range with inverted normals and
    // reversed winding (the back side of two-sided geometry).
    fn mirror_itri_range(&mut self, vert_start: usize, index_start: usize) {
        let vert_base = self.itri_verts.len();
        let offset = (vert_base - vert_start) as u32;
        let copied: Vec<Vertex> = self.itri_verts[vert_start..]
            .iter()
            .map(|v| {
                let mut v = *v;
                v.invert_normal();
                v
            })
            .collect();
        self.itri_verts.extend(copied);
        let reversed: Vec<u32> = self.indices[index_start..]
            .chunks(3)
            .flat_map(|t| [t[0] + offset, t[2] + offset, t[1] + offset])
            .collect();
        self.indices.extend(reversed);
    }

    /// Emit a UV sphere (or ellipsoid, via per-axis `radii`).
    ///
    /// `skip_hemi_dir` omits every quad on the far side of the plane
    /// through the center perpendicular to that direction, used to embed a
    /// sphere partially inside another shape. `rotation`, when given, is
    /// applied to positions (about the center) and normals after
    /// construction, e.g. to show a rolling ball's accumulated rotation.
    pub fn add_sphere(
        &mut self,
        center: Point3<f32>,
        radii: Vector3<f32>,
        color: Color,
        low_detail: bool,
        skip_hemi_dir: Option<Vector3<f32>>,
        rotation: Option<&Matrix3<f32>>,
    ) {
        debug_assert!(
            radii.x > 0.0 && radii.y > 0.0 && radii.z > 0.0,
            "sphere radii must be positive: {radii:?}"
        );
        let ndiv = sphere_ndiv(low_detail);
        let stacks = ndiv / 2;
        let cw = pack_color(color);
        let base = self.itri_verts.len() as u32;

        for s in 0..=stacks {
            let theta = PI * (s as f32) / (stacks as f32);
            let (sin_p, cos_p) = theta.sin_cos();
            for i in 0..=ndiv {
                let phi = TAU * (i as f32) / (ndiv as f32);
                let (sin_t, cos_t) = phi.sin_cos();
                let dir = Vector3::new(sin_p * cos_t, sin_p * sin_t, cos_p);
                let mut offset = Vector3::new(dir.x * radii.x, dir.y * radii.y, dir.z * radii.z);
                // Ellipsoid normal: direction scaled by inverse radii.
                let mut normal =
                    Vector3::new(dir.x / radii.x, dir.y / radii.y, dir.z / radii.z).normalize();
                if let Some(m) = rotation {
                    offset = m * offset;
                    normal = m * normal;
                }
                let tc = [(i as f32) / (ndiv as f32), (s as f32) / (stacks as f32)];
                self.itri_verts
                    .push(Vertex::new(center + offset, normal, tc, cw));
            }
        }
        let row = ndiv + 1;
        for s in 0..stacks {
            let theta_mid = PI * (s as f32 + 0.5) / (stacks as f32);
            for i in 0..ndiv {
                if let Some(skip_dir) = skip_hemi_dir {
                    // Cull quads whose center direction lies in the skipped
                    // hemisphere (before any external rotation).
                    let phi_mid = TAU * (i as f32 + 0.5) / (ndiv as f32);
                    let dir = Vector3::new(
                        theta_mid.sin() * phi_mid.cos(),
                        theta_mid.sin() * phi_mid.sin(),
                        theta_mid.cos(),
                    );
                    if dir.dot(skip_dir) > 0.0 {
                        continue;
                    }
                }
                let a = base + s * row + i;
                let b = a + row;
                // Degenerate pole triangles are harmless and kept, matching
                // the simple UV-sphere grid.
                self.indices.extend_from_slice(&[a, b, b + 1, a, b + 1, a + 1]);
            }
        }
    }

    /// [`MaterialBatch::add_sphere`] with center and radii taken from a
    /// bounding box.
    pub fn add_sphere_from_box(
        &mut self,
        c: &Aabb,
        color: Color,
        low_detail: bool,
        skip_hemi_dir: Option<Vector3<f32>>,
        rotation: Option<&Matrix3<f32>>,
    ) {
        self.add_sphere(c.center(), 0.5 * c.size(), color, low_detail, skip_hemi_dir, rotation);
    }

    /// Emit a flat horizontal disk (an `ndiv`-gon fan) at `pos`, facing +Z
    /// or -Z.
    pub fn add_disk(&mut self, pos: Point3<f32>, radius: f32, normal_z_neg: bool, color: Color) {
        debug_assert!(radius > 0.0);
        let ndiv = CYL_NDIV;
        let cw = pack_color(color);
        let normal = if normal_z_neg {
            -Vector3::unit_z()
        } else {
            Vector3::unit_z()
        };
        let base = self.itri_verts.len() as u32;
        self.itri_verts.push(Vertex::new(pos, normal, [0.5, 0.5], cw));
        for i in 0..ndiv {
            let theta = TAU * (i as f32) / (ndiv as f32);
            let (sin_t, cos_t) = theta.sin_cos();
            let p = pos + Vector3::new(radius * cos_t, radius * sin_t, 0.0);
            self.itri_verts
                .push(Vertex::new(p, normal, [0.5 + 0.5 * cos_t, 0.5 + 0.5 * sin_t], cw));
        }
        for i in 0..ndiv {
            let a = base + 1 + i;
            let b = base + 1 + (i + 1) % ndiv;
            if normal_z_neg {
                self.indices.extend_from_slice(&[base, b, a]);
            } else {
                self.indices.extend_from_slice(&[base, a, b]);
            }
        }
    }

    /// Emit a vertical-axis torus. `r_inner` is the tube (minor) radius and
    /// `r_outer` the radius of the tube's center ring.
    pub fn add_vert_torus(
        &mut self,
        center: Point3<f32>,
        r_inner: f32,
        r_outer: f32,
        color: Color,
        tscale: f32,
        low_detail: bool,
    ) {
        debug_assert!(r_inner > 0.0 && r_outer > 0.0);
        let ndiv = sphere_ndiv(low_detail);
        let cw = pack_color(color);
        let base = self.itri_verts.len() as u32;

        for s in 0..=ndiv {
            let psi = TAU * (s as f32) / (ndiv as f32); // around the tube
            let (sin_p, cos_p) = psi.sin_cos();
            for i in 0..=ndiv {
                let phi = TAU * (i as f32) / (ndiv as f32); // around the ring
                let (sin_t, cos_t) = phi.sin_cos();
                let ring = r_outer + r_inner * cos_p;
                let pos = center + Vector3::new(ring * cos_t, ring * sin_t, r_inner * sin_p);
                let normal = Vector3::new(cos_p * cos_t, cos_p * sin_t, sin_p);
                let tc = [
                    tscale * (i as f32) / (ndiv as f32),
                    tscale * (s as f32) / (ndiv as f32),
                ];
                self.itri_verts.push(Vertex::new(pos, normal, tc, cw));
            }
        }
        let row = ndiv + 1;
        for s in 0..ndiv {
            for i in 0..ndiv {
                let a = base + s * row + i;
                let b = a + row;
                self.indices.extend_from_slice(&[a, a + 1, b + 1, a, b + 1, b]);
            }
        }
    }

    /// Torus sized to fit inside a box: the tube diameter matches the box
    /// height and the outer extent matches the smaller horizontal half-size.
    pub fn add_contained_vert_torus(&mut self, c: &Aabb, color: Color, tscale: f32, low_detail: bool) {
        let r_inner = 0.5 * c.size_dim(2);
        let half_w = 0.5 * c.size_dim(0).min(c.size_dim(1));
        let r_outer = half_w - r_inner;
        debug_assert!(r_outer > 0.0, "box too flat to contain a torus: {c:?}");
        self.add_vert_torus(c.center(), r_inner, r_outer, color, tscale, low_detail);
    }

    /// Emit a single flat triangle with a planar UV mapping; `two_sided`
    /// adds a reversed-winding back face.
    pub fn add_triangle(&mut self, pts: &[Point3<f32>; 3], color: Color, two_sided: bool, tscale: f32) {
        let normal = (pts[1] - pts[0]).cross(pts[2] - pts[0]);
        debug_assert!(normal.magnitude2() > 0.0, "degenerate triangle");
        let normal = normal.normalize();
        let cw = pack_color(color);
        let ts = [[0.0, 0.0], [tscale, 0.0], [0.0, tscale]];
        let base = self.itri_verts.len() as u32;
        for i in 0..3 {
            self.itri_verts.push(Vertex::new(pts[i], normal, ts[i], cw));
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
        if two_sided {
            for i in 0..3 {
                let mut v = self.itri_verts[(base + i) as usize];
                v.invert_normal();
                self.itri_verts.push(v);
            }
            self.indices
                .extend_from_slice(&[base + 3, base + 5, base + 4]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{MaterialKey, SPHERE_NDIV, WHITE};
    use approx::assert_relative_eq;

    fn unit_box() -> Aabb {
        Aabb::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0)
    }

    fn test_batch() -> MaterialBatch {
        MaterialBatch::new(MaterialKey::textured(5, 2.0, true))
    }

    fn quad_normal(quad: &[Vertex]) -> Vector3<f32> {
        let p0 = quad[0].position_point();
        (quad[1].position_point() - p0)
            .cross(quad[3].position_point() - p0)
            .normalize()
    }

    #[test]
    fn full_box_emits_six_quads() {
        let mut m = test_batch();
        m.add_box_untextured(&unit_box(), WHITE, 0);
        assert_eq!(m.quad_verts.len(), 24);
    }

    #[test]
    fn skip_mask_suppresses_faces() {
        // Scenario: skipping both Z faces leaves 4 quads, normals +-X/+-Y.
        let mut m = test_batch();
        m.add_box_untextured(&unit_box(), WHITE, EF_Z12);
        assert_eq!(m.quad_verts.len(), 16);
        for quad in m.quad_verts.chunks(4) {
            let n = quad[0].normal_vector();
            assert!(n.z.abs() < 0.01, "unexpected Z-facing quad: {n:?}");
            assert!(n.x.abs() > 0.95 || n.y.abs() > 0.95);
        }
    }

    #[test]
    fn box_quads_are_planar_and_outward() {
        let mut m = test_batch();
        let c = Aabb::new(-1.0, 2.0, 0.5, 1.5, 0.0, 3.0);
        m.add_box_untextured(&c, WHITE, 0);
        let center = c.center();
        for quad in m.quad_verts.chunks(4) {
            let geo_n = quad_normal(quad);
            let stored = quad[0].normal_vector().normalize();
            assert_relative_eq!(geo_n.dot(stored), 1.0, epsilon = 1e-3);
            // Planarity: all four points share the face coordinate.
            let face_center = quad
                .iter()
                .fold(Vector3::new(0.0, 0.0, 0.0), |acc, v| {
                    acc + (v.position_point() - Point3::new(0.0, 0.0, 0.0))
                })
                / 4.0;
            let outward = Point3::new(face_center.x, face_center.y, face_center.z) - center;
            assert!(outward.dot(stored) > 0.0, "normal points inward");
        }
    }

    #[test]
    fn inverted_box_faces_inward() {
        let mut m = test_batch();
        m.add_box(
            &unit_box(),
            WHITE,
            Point3::new(0.0, 0.0, 0.0),
            0,
            false,
            false,
            false,
            true,
        );
        let center = unit_box().center();
        for quad in m.quad_verts.chunks(4) {
            let stored = quad[0].normal_vector().normalize();
            let geo_n = quad_normal(quad);
            assert_relative_eq!(geo_n.dot(stored), 1.0, epsilon = 1e-3);
            let p0 = quad[0].position_point();
            assert!((center - p0).dot(stored) > 0.0, "inverted normal points outward");
        }
    }

    #[test]
    fn shared_tex_origin_tiles_seamlessly() {
        // Two boxes stacked in Z sharing a tex origin: the top face of the
        // lower box and bottom face of the upper box agree on UVs at the
        // shared corner.
        let origin = Point3::new(0.0, 0.0, 0.0);
        let mut m = test_batch();
        let lower = Aabb::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0);
        let upper = Aabb::new(0.0, 1.0, 0.0, 1.0, 1.0, 2.0);
        m.add_box(&lower, WHITE, origin, face_mask(0, true), false, false, false, false);
        m.add_box(&upper, WHITE, origin, face_mask(0, true), false, false, false, false);
        // Both emitted only their +X face; matching (y, z) positions must
        // produce matching UVs.
        let (a, b) = m.quad_verts.split_at(4);
        for va in a {
            for vb in b {
                if va.position == vb.position {
                    assert_eq!(va.tex_coord, vb.tex_coord);
                }
            }
        }
    }

    #[test]
    fn cylinder_counts_match_caps_selection() {
        // Scenario: ndiv=16 with only a bottom cap -> 32 side triangles
        // plus a 16-triangle fan, no top cap.
        let mut m = test_batch();
        let opts = CylinderOpts {
            draw_top: false,
            ndiv: 16,
            ..CylinderOpts::default()
        };
        m.add_ortho_cylinder(&unit_box(), WHITE, Axis::Z, &opts);
        assert_eq!(m.indices.len(), 3 * (2 * 16 + 16));
        // 2*(ndiv+1) side verts plus ndiv+1 cap verts (ring + center).
        assert_eq!(m.itri_verts.len(), 2 * 17 + 16 + 1);
    }

    #[test]
    fn cone_normals_tilt_toward_apex() {
        let mut m = test_batch();
        let opts = CylinderOpts {
            draw_bot: false,
            draw_top: false,
            radius_scale_top: 0.0, // full cone
            ..CylinderOpts::default()
        };
        m.add_ortho_cylinder(&unit_box(), WHITE, Axis::Z, &opts);
        for v in &m.itri_verts {
            let n = v.normal_vector();
            assert!(n.z > 0.1, "cone side normal should tilt upward: {n:?}");
        }
    }

    #[test]
    fn general_cylinder_between_points() {
        let mut m = test_batch();
        let bot = Point3::new(1.0, 2.0, 3.0);
        let top = Point3::new(4.0, 2.0, 3.0);
        m.add_cylinder(bot, top, 0.5, 0.5, WHITE, &CylinderOpts::caps(true, true));
        // Every side vertex lies at distance 0.5 from the axis.
        let n_side = 2 * (CYL_NDIV as usize + 1);
        for v in &m.itri_verts[..n_side] {
            let p = v.position_point();
            let d = ((p.y - 2.0).powi(2) + (p.z - 3.0).powi(2)).sqrt();
            assert_relative_eq!(d, 0.5, epsilon = 1e-4);
        }
    }

    #[test]
    fn two_sided_doubles_side_geometry() {
        let mut single = test_batch();
        let mut double = test_batch();
        let opts = CylinderOpts {
            draw_bot: false,
            draw_top: false,
            ..CylinderOpts::default()
        };
        single.add_ortho_cylinder(&unit_box(), WHITE, Axis::Z, &opts);
        let opts2 = CylinderOpts { two_sided: true, ..opts };
        double.add_ortho_cylinder(&unit_box(), WHITE, Axis::Z, &opts2);
        assert_eq!(double.indices.len(), 2 * single.indices.len());
        assert_eq!(double.itri_verts.len(), 2 * single.itri_verts.len());
    }

    #[test]
    fn sphere_vertices_lie_on_ellipsoid() {
        let mut m = test_batch();
        let radii = Vector3::new(1.0, 2.0, 0.5);
        let center = Point3::new(1.0, 1.0, 1.0);
        m.add_sphere(center, radii, WHITE, false, None, None);
        for v in &m.itri_verts {
            let p = v.position_point();
            let e = ((p.x - 1.0) / radii.x).powi(2)
                + ((p.y - 1.0) / radii.y).powi(2)
                + ((p.z - 1.0) / radii.z).powi(2);
            assert_relative_eq!(e, 1.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn hemisphere_skip_halves_quads() {
        let mut full = test_batch();
        let mut half = test_batch();
        let center = Point3::new(0.0, 0.0, 0.0);
        let radii = Vector3::new(1.0, 1.0, 1.0);
        full.add_sphere(center, radii, WHITE, true, None, None);
        half.add_sphere(center, radii, WHITE, true, Some(Vector3::unit_z()), None);
        assert_eq!(half.indices.len() * 2, full.indices.len());
        // Kept quads reference only lower-hemisphere-ish vertices.
        for &ix in &half.indices {
            assert!(half.itri_verts[ix as usize].position[2] < 0.5);
        }
    }

    #[test]
    fn sphere_rotation_matrix_is_applied() {
        use cgmath::Rad;
        let mut plain = test_batch();
        let mut rotated = test_batch();
        let center = Point3::new(2.0, 0.0, 0.0);
        let radii = Vector3::new(1.0, 1.0, 1.0);
        let m = Matrix3::from_axis_angle(Vector3::unit_z(), Rad(std::f32::consts::FRAC_PI_2));
        plain.add_sphere(center, radii, WHITE, true, None, None);
        rotated.add_sphere(center, radii, WHITE, true, None, Some(&m));
        // Same vertex count; rotation about the center keeps all points on
        // the sphere but moves individual vertices.
        assert_eq!(plain.itri_verts.len(), rotated.itri_verts.len());
        let moved = plain
            .itri_verts
            .iter()
            .zip(&rotated.itri_verts)
            .filter(|(a, b)| a.position != b.position)
            .count();
        assert!(moved > 0);
        for v in &rotated.itri_verts {
            let p = v.position_point();
            let d = (p - center).magnitude();
            assert_relative_eq!(d, 1.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn disk_fan_counts() {
        let mut m = test_batch();
        m.add_disk(Point3::new(0.0, 0.0, 1.0), 0.5, false, WHITE);
        assert_eq!(m.itri_verts.len(), CYL_NDIV as usize + 1);
        assert_eq!(m.indices.len(), 3 * CYL_NDIV as usize);
    }

    #[test]
    fn torus_grid_counts() {
        let mut m = test_batch();
        m.add_vert_torus(Point3::new(0.0, 0.0, 0.0), 0.25, 1.0, WHITE, 1.0, false);
        let nd = SPHERE_NDIV as usize;
        assert_eq!(m.itri_verts.len(), (nd + 1) * (nd + 1));
        assert_eq!(m.indices.len(), 6 * nd * nd);
    }

    #[test]
    fn contained_torus_fits_box() {
        let mut m = test_batch();
        let c = Aabb::new(-1.0, 1.0, -1.0, 1.0, -0.2, 0.2);
        m.add_contained_vert_torus(&c, WHITE, 1.0, true);
        for v in &m.itri_verts {
            let p = v.position;
            assert!(p[0].abs() <= 1.0 + 1e-4 && p[1].abs() <= 1.0 + 1e-4);
            assert!(p[2].abs() <= 0.2 + 1e-4);
        }
    }

    #[test]
    fn triangle_two_sided() {
        let mut m = test_batch();
        let pts = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        m.add_triangle(&pts, WHITE, true, 1.0);
        assert_eq!(m.itri_verts.len(), 6);
        assert_eq!(m.indices.len(), 6);
        let front = m.itri_verts[0].normal_vector();
        let back = m.itri_verts[3].normal_vector();
        assert_relative_eq!(front.dot(back), -1.0, epsilon = 0.02);
    }

    #[test]
    fn face_mask_helpers() {
        assert_eq!(face_bit(2, 0), EF_Z1);
        assert_eq!(face_bit(2, 1), EF_Z2);
        assert_eq!(face_bit(1, 0), EF_Y1);
        assert_eq!(face_bit(0, 1), EF_X2);
        assert_eq!(face_mask(2, true), EF_ALL & !EF_Z2);
        assert_eq!(skip_mask_xy(0), EF_X12);
        assert_eq!(skip_mask_xy(1), EF_Y12);
    }
}
