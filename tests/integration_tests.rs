//! Integration Tests
//!
//! End-to-end tests for the layout store: editing, persistence and the
//! geometry guarantees every edit path must keep.

use approx::assert_relative_eq;
use pretty_assertions::assert_eq;

use mosaic::geometry::{apply_drag, apply_resize, Rect, StageSize, MIN_ZONE_SIZE};
use mosaic::layout::{
    DropPayload, MediaAsset, MediaCatalog, MediaKind, MediaRef, Resolution, ZonePatch,
    DEFAULT_ITEM_SECONDS,
};
use mosaic::state::{LayoutStore, WorkspaceDocument};
use mosaic::EditorConfig;

/// Small deterministic generator so geometry sweeps are reproducible
struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self, lo: f64, hi: f64) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let unit = (self.0 >> 11) as f64 / (1u64 << 53) as f64;
        lo + unit * (hi - lo)
    }
}

fn assert_on_stage(rect: &Rect, stage: StageSize) {
    assert!(rect.x >= 0.0, "x < 0: {}", rect);
    assert!(rect.y >= 0.0, "y < 0: {}", rect);
    assert!(rect.right() <= stage.width() + 1e-9, "past right edge: {}", rect);
    assert!(rect.bottom() <= stage.height() + 1e-9, "past bottom edge: {}", rect);
}

// === Geometry Guarantees ===

#[test]
fn test_drag_always_lands_on_stage() {
    let stage = StageSize::EDIT;
    let mut rng = Lcg(7);
    for _ in 0..500 {
        let w = rng.next_f64(MIN_ZONE_SIZE, stage.width());
        let h = rng.next_f64(MIN_ZONE_SIZE, stage.height());
        let zone = Rect::new(0.0, 0.0, w, h);
        let target = apply_drag(&zone, rng.next_f64(-2000.0, 2000.0), rng.next_f64(-2000.0, 2000.0), stage);
        assert_on_stage(&zone.moved_to(target), stage);
    }
}

#[test]
fn test_resize_never_goes_below_minimum_or_off_stage() {
    let stage = StageSize::EDIT;
    let prior = Rect::new(100.0, 100.0, 200.0, 100.0);
    let mut rng = Lcg(42);
    for _ in 0..500 {
        let outcome = apply_resize(
            &prior,
            rng.next_f64(-50.0, 900.0),
            rng.next_f64(-50.0, 500.0),
            rng.next_f64(-300.0, 900.0),
            rng.next_f64(-300.0, 500.0),
            stage,
        );
        let rect = outcome.rect();
        assert!(rect.width >= MIN_ZONE_SIZE);
        assert!(rect.height >= MIN_ZONE_SIZE);
        assert_on_stage(&rect, stage);
        if !outcome.is_applied() {
            assert_eq!(rect, prior);
        }
    }
}

#[test]
fn test_store_edits_keep_zones_legal() {
    let mut store = LayoutStore::default();
    let stage = store.stage();
    let zone = store.add_seed_zone().unwrap();
    let mut rng = Lcg(3);

    for _ in 0..200 {
        store
            .drag_zone(zone, rng.next_f64(-500.0, 1500.0), rng.next_f64(-500.0, 900.0))
            .unwrap();
        store
            .resize_zone(
                zone,
                rng.next_f64(0.0, 800.0),
                rng.next_f64(0.0, 450.0),
                rng.next_f64(-100.0, 800.0),
                rng.next_f64(-100.0, 450.0),
            )
            .unwrap();
        let rect = store.current().zone(&zone).unwrap().rect;
        assert!(rect.is_legal(stage), "illegal zone {}", rect);
    }
}

#[test]
fn test_illegal_update_is_rejected_without_change() {
    let mut store = LayoutStore::default();
    let zone = store.add_seed_zone().unwrap();
    let before = store.current().clone();

    let result = store.update_zone(
        zone,
        ZonePatch {
            width: Some(5.0),
            ..ZonePatch::default()
        },
    );
    assert!(result.is_err());
    assert_eq!(store.current(), &before);
}

// === Timeline Pairing ===

#[test]
fn test_attach_detach_keeps_media_and_durations_paired() {
    let mut store = LayoutStore::default();
    let zone = store.add_seed_zone().unwrap();

    // Same media twice with different durations
    store.attach_media(zone, "a.png", Some(1.0)).unwrap();
    store.attach_media(zone, "b.mp4", Some(2.0)).unwrap();
    store.attach_media(zone, "a.png", Some(3.0)).unwrap();
    store.attach_media(zone, "c.png", Some(4.0)).unwrap();

    store.detach_media(zone, 2).unwrap();
    store.detach_media(zone, 0).unwrap();

    let items: Vec<(String, f64)> = store
        .current()
        .zone(&zone)
        .unwrap()
        .items
        .iter()
        .map(|i| (i.media_ref.as_str().to_string(), i.duration_seconds))
        .collect();
    assert_eq!(items, vec![("b.mp4".to_string(), 2.0), ("c.png".to_string(), 4.0)]);
}

#[test]
fn test_attach_zero_duration_coerces_to_default() {
    let mut store = LayoutStore::default();
    let zone = store.add_seed_zone().unwrap();
    store.attach_media(zone, "a.png", Some(0.0)).unwrap();

    let item = store.current().zone(&zone).unwrap().items.get(0).unwrap().clone();
    assert_relative_eq!(item.duration_seconds, DEFAULT_ITEM_SECONDS);
    assert_eq!(item.duration_ms(), 4000);
}

#[test]
fn test_drop_from_catalog() {
    let mut catalog = MediaCatalog::new();
    catalog.add(
        MediaKind::Video,
        MediaAsset {
            id: "intro".into(),
            src: MediaRef::new("media/intro.mp4"),
            duration_seconds: Some(12.0),
        },
    );

    let mut store = LayoutStore::default();
    let zone = store.add_seed_zone().unwrap();
    assert!(store
        .drop_media(zone, &DropPayload::new("intro", MediaKind::Video), &catalog)
        .unwrap());
    assert!(!store
        .drop_media(zone, &DropPayload::new("intro", MediaKind::Image), &catalog)
        .unwrap());

    let items = &store.current().zone(&zone).unwrap().items;
    assert_eq!(items.len(), 1);
    assert_eq!(items.total_duration_ms(), 12_000);
}

// === Collection ===

#[test]
fn test_save_then_load_round_trip() {
    let mut store = LayoutStore::default();
    let a = store.add_zone(Rect::new(10.0, 10.0, 200.0, 150.0)).unwrap();
    let b = store.add_zone(Rect::new(300.0, 50.0, 100.0, 100.0)).unwrap();
    store.attach_media(a, "a.png", Some(2.0)).unwrap();
    store.attach_media(b, "b.mp4", None).unwrap();
    store.set_resolution(Resolution::Uhd4k).unwrap();
    let edited = store.current().zones.clone();

    let id = store.save("Lobby").unwrap();
    assert!(store.current().zones.is_empty());
    assert_eq!(store.current().resolution, Resolution::Uhd4k);

    assert!(store.load(&id).unwrap());
    assert_eq!(store.current().zones, edited);
    assert_eq!(store.current().id, Some(id));
}

#[test]
fn test_delete_does_not_touch_loaded_buffer() {
    let mut store = LayoutStore::default();
    let zone = store.add_seed_zone().unwrap();
    store.attach_media(zone, "a.png", None).unwrap();
    let id = store.save("Menu").unwrap();

    store.load(&id).unwrap();
    let buffer = store.current().clone();

    assert!(store.delete(&id));
    assert!(store.layout(&id).is_none());
    assert_eq!(store.current(), &buffer);

    // Editing the orphaned buffer still works
    store.attach_media(zone, "b.png", None).unwrap();
    assert_eq!(store.current().zone(&zone).unwrap().items.len(), 2);
}

#[test]
fn test_loaded_copy_is_independent_of_saved_record() {
    let mut store = LayoutStore::default();
    let zone = store.add_seed_zone().unwrap();
    let id = store.save("Shared").unwrap();

    store.load(&id).unwrap();
    store.drag_zone(zone, 100.0, 100.0).unwrap();

    assert_eq!(store.layout(&id).unwrap().zones[0].rect.origin().x, 0.0);
    assert_eq!(store.current().zones[0].rect.origin().x, 100.0);
}

#[test]
fn test_empty_name_is_rejected() {
    let mut store = LayoutStore::default();
    store.add_seed_zone().unwrap();
    let err = store.save("   ").unwrap_err();
    assert_eq!(err.error_code(), "EMPTY_NAME");
    assert_eq!(store.current().zones.len(), 1);
}

#[test]
fn test_thumbnail_scaling() {
    let mut store = LayoutStore::default();
    store.add_zone(Rect::new(360.0, 190.0, 360.0, 190.0)).unwrap();
    let id = store.save("Quarter").unwrap();

    let rects = store.thumbnail(&id).unwrap();
    assert_relative_eq!(rects[0].x, 75.0);
    assert_relative_eq!(rects[0].y, 40.0);
    assert_relative_eq!(rects[0].width, 75.0);
    assert_relative_eq!(rects[0].height, 40.0);
}

// === Workspace Persistence ===

#[test]
fn test_workspace_file_preserves_everything() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("nested").join("mosaic.json");

    let config = EditorConfig::from_json(r#"{"seed_zone":{"x":10,"y":10,"width":100,"height":50}}"#).unwrap();
    let mut store = LayoutStore::new(config);
    let zone = store.add_seed_zone().unwrap();
    store.attach_media(zone, "a.png", Some(1.5)).unwrap();
    store.save("Kiosk").unwrap();
    store.add_seed_zone().unwrap();

    WorkspaceDocument::from_store(&store).save(&path).unwrap();
    let restored = WorkspaceDocument::load(&path).unwrap().into_store();

    assert_eq!(restored.config(), store.config());
    assert_eq!(restored.layouts(), store.layouts());
    assert_eq!(restored.current(), store.current());
    assert_eq!(restored.history().undo_count(), store.history().undo_count());
}
