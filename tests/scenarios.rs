//! End-to-end scenarios combining the emitters, the batch store, CSG and
//! the variation/rotation layers the way a furniture assembler does.

use cgmath::{Point3, Rad, Vector3};

use roomgeom::geom::{rotate_verts, subtract_box};
use roomgeom::mesh::emitter::{CylinderOpts, EF_X2, EF_Z12};
use roomgeom::mesh::WHITE;
use roomgeom::{
    Aabb, Axis, BatchStore, Category, EmitGeometry, MaterialKey, ObjectRng, ObjectSpec, ShapeKind,
    Style,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn shared_material_accumulates_into_one_batch() {
    // Two full boxes through the same key land in one static batch whose
    // vertex count is the sum of both emissions (24 + 24).
    init_logger();
    let mut store = BatchStore::new();
    let key = MaterialKey::textured(5, 2.0, true);
    let origin = Point3::new(0.0, 0.0, 0.0);

    let a = Aabb::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0);
    let b = Aabb::new(2.0, 3.0, 0.0, 1.0, 0.0, 1.0);
    store
        .material(&key, Category::Static)
        .add_box(&a, WHITE, origin, 0, false, false, false, false);
    store
        .material(&key, Category::Static)
        .add_box(&b, WHITE, origin, 0, false, false, false, false);

    assert_eq!(store.num_batches(Category::Static), 1);
    assert_eq!(store.count_verts(Category::Static), 48);
}

#[test]
fn open_drawer_reconstructs_original_volume() {
    // An open drawer: the interior hollow is carved with subtract_box and
    // the hole itself is the cavity. Fragments plus cavity must tile the
    // drawer bounds exactly: volumes sum and nothing overlaps.
    let drawer = Aabb::new(0.0, 1.0, 0.0, 0.6, 0.0, 0.3);
    let mut cavity = drawer;
    // Walls on all sides except the open front (+X).
    cavity.d[0][0] += 0.05;
    cavity.d[1][0] += 0.05;
    cavity.d[1][1] -= 0.05;
    cavity.d[2][0] += 0.05;
    cavity.d[2][1] -= 0.05;

    let mut walls = Vec::new();
    subtract_box(&drawer, &cavity, &mut walls);
    let wall_vol: f32 = walls.iter().map(Aabb::volume).sum();
    assert!((wall_vol + cavity.volume() - drawer.volume()).abs() < 1e-4);
    for (i, a) in walls.iter().enumerate() {
        assert!(!a.intersects(&cavity));
        for b in &walls[i + 1..] {
            assert!(!a.intersects(b));
        }
    }

    // Emitting the walls plus the inverted cavity interior produces a
    // drawable drawer; every wall is a valid emitter input.
    let mut store = BatchStore::new();
    let key = MaterialKey::textured(7, 1.0, true);
    let origin = drawer.llc();
    for w in &walls {
        store
            .material(&key, Category::Small)
            .add_box(w, WHITE, origin, 0, false, false, false, false);
    }
    store.material(&key, Category::Small).add_box(
        &cavity,
        WHITE,
        origin,
        EF_X2, // interior drawn without the open front face
        false,
        false,
        false,
        true,
    );
    assert_eq!(store.count_verts(Category::Small), 24 * walls.len() + 20);
}

#[test]
fn regeneration_is_bit_identical() {
    // Rebuilding the same object after invalidation must reproduce the
    // exact vertex stream: same seeded choices, same geometry.
    init_logger();

    struct TiltedCrate;

    impl EmitGeometry for TiltedCrate {
        fn emit(
            &self,
            spec: &ObjectSpec,
            store: &mut BatchStore,
            rng: &mut ObjectRng,
            style: &Style,
        ) {
            let key = MaterialKey::textured(3, 1.0, true);
            let batch = store.material(&key, Category::Static);
            let start = batch.quad_verts.len();
            batch.add_box(
                &spec.bounds,
                spec.color,
                spec.bounds.llc(),
                EF_Z12,
                false,
                false,
                false,
                false,
            );
            if rng.chance(style.tilt_probability) {
                let angle = rng.jitter(style.max_tilt_angle);
                rotate_verts(
                    &mut batch.quad_verts,
                    Vector3::unit_z(),
                    Rad(angle),
                    spec.bounds.center(),
                    start,
                );
            }
        }
    }

    let bounds = Aabb::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0);
    let mut spec = ObjectSpec::new(bounds, ShapeKind::Cube, Axis::X, true);
    spec.obj_id = 17;
    spec.room_id = 4;
    let style = Style::default();

    let run = |spec: &ObjectSpec| {
        let mut store = BatchStore::new();
        let mut rng = spec.rng();
        TiltedCrate.emit(spec, &mut store, &mut rng, &style);
        store
            .batches(Category::Static)
            .flat_map(|b| b.quad_verts.iter().copied())
            .collect::<Vec<_>>()
    };

    let first = run(&spec);
    let second = run(&spec);
    assert_eq!(first, second);
    // A different identity makes different choices somewhere across a
    // population of objects.
    let mut any_diff = false;
    for obj_id in 0..32 {
        let mut other = spec;
        other.obj_id = obj_id;
        if run(&other) != first {
            any_diff = true;
            break;
        }
    }
    assert!(any_diff);
}

#[test]
fn mixed_primitives_share_batches_by_key_only() {
    init_logger();
    let mut store = BatchStore::new();
    let wood = MaterialKey::with_normal_map(10, 11, 2.0, 2.0, 0.0, 0.0, true);
    let metal = MaterialKey::untextured(true, false);

    let top = Aabb::new(0.0, 1.0, 0.0, 1.0, 0.7, 0.8);
    store
        .material(&wood, Category::Static)
        .add_box(&top, WHITE, top.llc(), 0, false, false, false, false);
    // A metal leg as a thin cylinder.
    let leg = Aabb::new(0.1, 0.2, 0.1, 0.2, 0.0, 0.7);
    store
        .material(&metal, Category::Static)
        .add_ortho_cylinder(&leg, WHITE, Axis::Z, &CylinderOpts::caps(false, false));
    // More wood through the same key accumulates in the wood batch.
    let shelf = Aabb::new(0.0, 1.0, 0.0, 1.0, 0.3, 0.35);
    store
        .material(&wood, Category::Static)
        .add_box(&shelf, WHITE, top.llc(), 0, false, false, false, false);

    assert_eq!(store.num_batches(Category::Static), 2);
    let wood_batch = store.material(&wood, Category::Static);
    assert_eq!(wood_batch.quad_verts.len(), 48);
    assert!(wood_batch.itri_verts.is_empty());
    let metal_batch = store.material(&metal, Category::Static);
    assert!(metal_batch.quad_verts.is_empty());
    assert!(!metal_batch.itri_verts.is_empty());
}

#[test]
fn invalidation_cycle_rebuilds_cleanly() {
    init_logger();
    let mut store = BatchStore::new();
    let key = MaterialKey::textured(2, 1.0, false);
    let c = Aabb::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0);
    store
        .material(&key, Category::Dynamic)
        .add_box_untextured(&c, WHITE, 0);
    assert_eq!(store.count_verts(Category::Dynamic), 24);

    // Furniture state changed: category is flagged, discarded, rebuilt.
    store.invalidate(Category::Dynamic);
    let cleared = store.apply_invalidations();
    assert_eq!(cleared, vec![Category::Dynamic]);
    assert_eq!(store.count_verts(Category::Dynamic), 0);

    store
        .material(&key, Category::Dynamic)
        .add_box_untextured(&c, WHITE, 0);
    assert_eq!(store.count_verts(Category::Dynamic), 24);
    // Untouched categories are unaffected throughout.
    assert_eq!(store.count_verts(Category::Static), 0);
}
