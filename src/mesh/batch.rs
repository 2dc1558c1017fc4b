//! # Material Batch Store
//!
//! Accumulates emitted geometry into per-material, per-category vertex
//! batches so that every object sharing a material shares one draw call.
//!
//! ## Handle stability
//!
//! [`BatchStore::get_or_create`] returns a [`BatchId`] (category + slot
//! index) instead of a reference. Slots are append-only, so a `BatchId`
//! stays valid across any number of later `get_or_create` calls; the
//! "pre-touch a material to keep a reference alive" workaround the original
//! needed is structurally unnecessary here. Ids are invalidated only when
//! their whole category is discarded for a rebuild; [`BatchStore::try_batch`]
//! reports that case instead of panicking.

use log::{debug, trace};
use thiserror::Error;

use super::material::MaterialKey;
use super::Vertex;

/// Which buffer set an object's geometry belongs to, independent of
/// material. The same [`MaterialKey`] legitimately produces distinct
/// batches in different categories.
///
/// Categories partition geometry by update frequency and draw pass:
/// static furniture is rebuilt only when placement changes, dynamic
/// geometry (elevator cars, rolling balls) every state change.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// Large fixed furniture; rebuilt rarely.
    Static = 0,
    /// Small objects, drawn only up close.
    Small = 1,
    /// Per-frame or per-state-change geometry.
    Dynamic = 2,
    /// Trim and other fine static detail.
    Detail = 3,
    /// Generated text (book titles, signs).
    Text = 4,
    /// Light fixtures.
    Lights = 5,
    /// Alpha-masked cutout geometry.
    AlphaMask = 6,
    /// Alpha-blended geometry, drawn last.
    Transparent = 7,
    /// Doors, drawn with their own pass.
    Doors = 8,
}

impl Category {
    /// Number of categories.
    pub const COUNT: usize = 9;

    /// All categories in index order.
    pub const ALL: [Category; Self::COUNT] = [
        Category::Static,
        Category::Small,
        Category::Dynamic,
        Category::Detail,
        Category::Text,
        Category::Lights,
        Category::AlphaMask,
        Category::Transparent,
        Category::Doors,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Routing shorthand matching the original material getter's argument
    /// order: dynamic wins, then transparent, then the small/detail level
    /// (0 = static, 1 = small, 2 = detail).
    pub fn select(dynamic: bool, small: u8, transparent: bool) -> Category {
        if dynamic {
            Category::Dynamic
        } else if transparent {
            Category::Transparent
        } else {
            match small {
                0 => Category::Static,
                1 => Category::Small,
                _ => Category::Detail,
            }
        }
    }
}

/// Stable handle to one batch: category plus append-only slot index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BatchId {
    pub category: Category,
    pub index: u32,
}

/// Errors from fallible batch-handle revalidation.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The handle's slot no longer exists; its category was discarded and
    /// rebuilt since the handle was obtained.
    #[error("stale batch handle: slot {index} out of range for category {category:?} ({len} batches)")]
    StaleHandle {
        category: Category,
        index: u32,
        len: usize,
    },
}

/// One growable vertex(+index) buffer holding all geometry that shares a
/// material within one category.
///
/// Two vertex lists coexist: `quad_verts` holds independent quads (4
/// vertices per face, expanded to triangles at upload) written by the box
/// emitter, while `itri_verts`/`indices` hold shared-vertex indexed
/// triangles written by the curved-surface emitters. Emission is
/// append-only; there is no per-object removal.
#[derive(Debug, Default)]
pub struct MaterialBatch {
    /// The material all geometry in this batch is drawn with.
    pub key: MaterialKey,
    /// Non-indexed quad vertices (4 per quad).
    pub quad_verts: Vec<Vertex>,
    /// Indexed-triangle vertex pool.
    pub itri_verts: Vec<Vertex>,
    /// Triangle indices into `itri_verts`.
    pub indices: Vec<u32>,
    /// Whether this batch is included in shadow-map passes.
    pub shadows_enabled: bool,
}

impl MaterialBatch {
    pub fn new(key: MaterialKey) -> Self {
        MaterialBatch {
            key,
            ..MaterialBatch::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.quad_verts.is_empty() && self.itri_verts.is_empty()
    }

    /// Total vertex count across both lists.
    pub fn num_verts(&self) -> usize {
        self.quad_verts.len() + self.itri_verts.len()
    }

    /// Opt this batch into shadow-map passes.
    pub fn enable_shadows(&mut self) {
        self.shadows_enabled = true;
    }

    /// Drop all geometry but keep the key, retaining allocations.
    pub fn clear_vectors(&mut self) {
        self.quad_verts.clear();
        self.itri_verts.clear();
        self.indices.clear();
    }
}

#[derive(Debug, Default)]
struct CategoryBatches {
    batches: Vec<MaterialBatch>,
}

impl CategoryBatches {
    fn find(&self, key: &MaterialKey) -> Option<usize> {
        // Linear scan; category material counts are small (tens).
        self.batches.iter().position(|b| b.key == *key)
    }
}

/// Owns every [`MaterialBatch`], keyed by (category, material key).
///
/// The store is the only mutable shared structure in a building's
/// generation pass and must be confined to one writer at a time; see the
/// crate docs for the hand-off contract.
#[derive(Debug, Default)]
pub struct BatchStore {
    categories: [CategoryBatches; Category::COUNT],
    invalidate_mask: u16,
}

impl BatchStore {
    pub fn new() -> Self {
        BatchStore::default()
    }

    /// Look up the batch whose stored key equals `key` in `category`,
    /// creating it on first use. Deduplication uses exact key equality,
    /// never [`MaterialKey::is_compatible`], so shadow state and UV
    /// transforms are never silently shared.
    pub fn get_or_create(&mut self, key: &MaterialKey, category: Category) -> BatchId {
        let cat = &mut self.categories[category.index()];
        let index = match cat.find(key) {
            Some(ix) => ix,
            None => {
                debug!(
                    "new batch in {:?} for tid={} nm={} (now {} batches)",
                    category,
                    key.tid,
                    key.nm_tid,
                    cat.batches.len() + 1
                );
                cat.batches.push(MaterialBatch::new(*key));
                cat.batches.len() - 1
            }
        };
        BatchId {
            category,
            index: index as u32,
        }
    }

    /// Mutable access through a handle; panics on a stale handle.
    pub fn batch(&mut self, id: BatchId) -> &mut MaterialBatch {
        &mut self.categories[id.category.index()].batches[id.index as usize]
    }

    /// Mutable access through a handle, reporting staleness instead of
    /// panicking. Handles go stale only when their category is discarded by
    /// [`BatchStore::apply_invalidations`].
    pub fn try_batch(&mut self, id: BatchId) -> Result<&mut MaterialBatch, BatchError> {
        let len = self.categories[id.category.index()].batches.len();
        if (id.index as usize) < len {
            Ok(self.batch(id))
        } else {
            Err(BatchError::StaleHandle {
                category: id.category,
                index: id.index,
                len,
            })
        }
    }

    /// Get-or-create and borrow in one step; the common emit call shape:
    /// `store.material(&key, cat).add_box(...)`.
    pub fn material(&mut self, key: &MaterialKey, category: Category) -> &mut MaterialBatch {
        let id = self.get_or_create(key, category);
        let shadowed = key.shadowed;
        let batch = self.batch(id);
        if shadowed {
            batch.enable_shadows();
        }
        batch
    }

    /// Untextured material batch (sentinel key).
    pub fn untextured_material(
        &mut self,
        shadowed: bool,
        transparent: bool,
        category: Category,
    ) -> &mut MaterialBatch {
        self.material(&MaterialKey::untextured(shadowed, transparent), category)
    }

    /// Wood-grain batch: resolved texture plus its derived normal map at a
    /// shared scale. Texture-name resolution happens outside this crate.
    pub fn wood_material(
        &mut self,
        wood_tid: super::TextureId,
        wood_nm_tid: super::TextureId,
        tscale: f32,
        shadowed: bool,
        category: Category,
    ) -> &mut MaterialBatch {
        let key =
            MaterialKey::with_normal_map(wood_tid, wood_nm_tid, tscale, tscale, 0.0, 0.0, shadowed);
        self.material(&key, category)
    }

    /// Untextured metal batch with a specular highlight color.
    pub fn metal_material(
        &mut self,
        spec_color: super::Color,
        shadowed: bool,
        category: Category,
    ) -> &mut MaterialBatch {
        let mut key = MaterialKey::untextured(shadowed, false);
        key.set_specular_color(spec_color, 0.8, 60.0);
        self.material(&key, category)
    }

    /// Number of batches currently held for a category.
    pub fn num_batches(&self, category: Category) -> usize {
        self.categories[category.index()].batches.len()
    }

    /// Total vertex count for one category.
    pub fn count_verts(&self, category: Category) -> usize {
        self.categories[category.index()]
            .batches
            .iter()
            .map(MaterialBatch::num_verts)
            .sum()
    }

    /// Total vertex count across all categories.
    pub fn count_all_verts(&self) -> usize {
        Category::ALL.iter().map(|&c| self.count_verts(c)).sum()
    }

    /// Iterate a category's batches for upload/draw.
    pub fn batches(&self, category: Category) -> impl Iterator<Item = &MaterialBatch> {
        self.categories[category.index()].batches.iter()
    }

    /// Flag a category for full discard and regeneration. May be latched
    /// from state-change notifications and applied later with
    /// [`BatchStore::apply_invalidations`].
    pub fn invalidate(&mut self, category: Category) {
        trace!("invalidating {:?} geometry", category);
        self.invalidate_mask |= 1 << category.index();
    }

    /// True when a category has been flagged since the last sweep.
    pub fn is_invalidated(&self, category: Category) -> bool {
        self.invalidate_mask & (1 << category.index()) != 0
    }

    /// Discard every batch in each flagged category and clear the flags.
    /// Returns the categories that were discarded; the caller regenerates
    /// them from the current furniture set. All [`BatchId`]s into discarded
    /// categories become stale.
    pub fn apply_invalidations(&mut self) -> Vec<Category> {
        let mut cleared = Vec::new();
        for &cat in &Category::ALL {
            if self.invalidate_mask & (1 << cat.index()) == 0 {
                continue;
            }
            let n = self.categories[cat.index()].batches.len();
            self.categories[cat.index()].batches.clear();
            debug!("discarded {} batches in {:?} for rebuild", n, cat);
            cleared.push(cat);
        }
        self.invalidate_mask = 0;
        cleared
    }
}
