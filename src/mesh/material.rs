//! Material keys: the shading/texturing configuration that identifies a
//! batch. Two objects whose keys compare equal share one draw call.

use super::{pack_color, Color};

/// Integer texture handle produced by the (external) texture-name resolver.
pub type TextureId = i32;

/// Sentinel id for untextured geometry. Untextured materials still
/// deduplicate like any other key; their UV scale is fixed to 1.0.
pub const NO_TEXTURE: TextureId = -1;

/// Identifies one rendering material: texture, normal map, UV transform,
/// emissive/specular parameters and the shadow/transparency flags.
///
/// Two notions of sameness exist and must not be conflated:
///
/// - *Equality* (`==`): every field matches. This governs batch identity in
///   the [`BatchStore`](super::BatchStore).
/// - *Compatibility* ([`MaterialKey::is_compatible`]): everything matches
///   except the UV scale/offset. Used for same-texture merge decisions
///   (e.g. whether two draw blocks can share shader state), never for
///   deduplication.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MaterialKey {
    /// Diffuse texture id, or [`NO_TEXTURE`].
    pub tid: TextureId,
    /// Normal map id, or [`NO_TEXTURE`] for a flat normal map.
    pub nm_tid: TextureId,
    /// Texture coordinate scale.
    pub tscale_x: f32,
    pub tscale_y: f32,
    /// Texture coordinate offset.
    pub txoff: f32,
    pub tyoff: f32,
    /// Emissive intensity in `[0, 1]`.
    pub emissive: f32,
    /// Specular color, packed.
    pub spec_color: [u8; 3],
    /// Specular magnitude, packed (0-255 maps to 0.0-1.0).
    pub spec_mag: u8,
    /// Specular exponent, packed.
    pub shininess: u8,
    /// Whether geometry in this batch casts shadows. Part of key equality
    /// so shadow-casting state is never shared across materials.
    pub shadowed: bool,
    /// Alpha-blended material, drawn last.
    pub transparent: bool,
}

impl Default for MaterialKey {
    fn default() -> Self {
        MaterialKey::untextured(false, false)
    }
}

impl MaterialKey {
    /// Untextured material with unit UV scale.
    pub fn untextured(shadowed: bool, transparent: bool) -> Self {
        MaterialKey {
            tid: NO_TEXTURE,
            nm_tid: NO_TEXTURE,
            tscale_x: 1.0,
            tscale_y: 1.0,
            txoff: 0.0,
            tyoff: 0.0,
            emissive: 0.0,
            spec_color: [0; 3],
            spec_mag: 0,
            shininess: 0,
            shadowed,
            transparent,
        }
    }

    /// Textured material with a square (1:1 aspect) UV scale and no normal map.
    pub fn textured(tid: TextureId, tscale: f32, shadowed: bool) -> Self {
        MaterialKey {
            tid,
            tscale_x: tscale,
            tscale_y: tscale,
            ..MaterialKey::untextured(shadowed, false)
        }
    }

    /// Textured material with an associated normal map and full UV transform.
    pub fn with_normal_map(
        tid: TextureId,
        nm_tid: TextureId,
        tscale_x: f32,
        tscale_y: f32,
        txoff: f32,
        tyoff: f32,
        shadowed: bool,
    ) -> Self {
        MaterialKey {
            tid,
            nm_tid,
            tscale_x,
            tscale_y,
            txoff,
            tyoff,
            ..MaterialKey::untextured(shadowed, false)
        }
    }

    /// True when any texture is attached.
    pub fn enabled(&self) -> bool {
        self.tid >= 0 || self.nm_tid >= 0
    }

    /// Set specular response with a white highlight color.
    pub fn set_specular(&mut self, mag: f32, shine: f32) {
        self.set_specular_color([1.0, 1.0, 1.0, 1.0], mag, shine);
    }

    /// Set specular color, magnitude and exponent.
    pub fn set_specular_color(&mut self, color: Color, mag: f32, shine: f32) {
        let packed = pack_color(color);
        self.spec_color = [packed[0], packed[1], packed[2]];
        self.spec_mag = (mag.clamp(0.0, 1.0) * 255.0).round() as u8;
        self.shininess = shine.round().clamp(1.0, 255.0) as u8;
    }

    /// Relaxed match ignoring both UV transform and the shadow flag.
    pub fn is_compat_ignore_shadowed(&self, other: &MaterialKey) -> bool {
        self.tid == other.tid
            && self.nm_tid == other.nm_tid
            && self.emissive == other.emissive
            && self.spec_color == other.spec_color
            && self.spec_mag == other.spec_mag
            && self.shininess == other.shininess
            && self.transparent == other.transparent
    }

    /// Relaxed match ignoring only the UV scale/offset.
    ///
    /// Not sufficient for batch identity; see the type-level docs.
    pub fn is_compatible(&self, other: &MaterialKey) -> bool {
        self.is_compat_ignore_shadowed(other) && self.shadowed == other.shadowed
    }
}
