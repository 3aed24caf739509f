//! CLI Command Implementations
//!
//! Each command opens the workspace, runs one store operation and writes the
//! workspace back when something changed.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use log::{info, warn};

use crate::config::EditorConfig;
use crate::geometry::Resize;
use crate::layout::{DropPayload, Layout, LayoutId, MediaCatalog, MediaKind, Resolution, ZoneId, ZonePatch};
use crate::preview::{CursorEvent, HeadlessSurface, LoopPolicy, PlaybackScheduler};
use crate::state::{LayoutStore, WorkspaceDocument};

type CliResult = anyhow::Result<()>;

// ============================================================================
// Workspace helpers
// ============================================================================

fn open(path: &Path) -> anyhow::Result<LayoutStore> {
    let document = WorkspaceDocument::load(path)
        .with_context(|| format!("failed to open workspace {}", path.display()))?;
    Ok(document.into_store())
}

fn commit(path: &Path, store: &LayoutStore) -> CliResult {
    WorkspaceDocument::from_store(store)
        .save(path)
        .with_context(|| format!("failed to write workspace {}", path.display()))
}

/// Z-index first, then zone id.
fn resolve_zone(store: &LayoutStore, zone: &str) -> anyhow::Result<ZoneId> {
    let layout = store.current();
    if let Ok(index) = zone.parse::<usize>() {
        return layout
            .zones
            .get(index)
            .map(|z| z.id)
            .ok_or_else(|| anyhow!("no zone at index {} ({} zones)", index, layout.zones.len()));
    }
    let id: ZoneId = zone
        .parse()
        .with_context(|| format!("'{}' is neither a zone index nor a zone id", zone))?;
    if layout.zone(&id).is_none() {
        bail!("zone {} is not in the edit buffer", id);
    }
    Ok(id)
}

/// Layout id first, then the first saved layout with that name.
fn resolve_layout(store: &LayoutStore, layout: &str) -> anyhow::Result<LayoutId> {
    if let Ok(id) = layout.parse::<LayoutId>() {
        if store.layout(&id).is_some() {
            return Ok(id);
        }
    }
    store
        .layouts()
        .iter()
        .find(|l| l.name == layout)
        .and_then(|l| l.id)
        .ok_or_else(|| anyhow!("no saved layout '{}'", layout))
}

fn report(changed: bool, done: &str) {
    if changed {
        println!("{}", done);
    } else {
        println!("Nothing changed.");
    }
}

fn seconds(ms: u64) -> f64 {
    ms as f64 / 1000.0
}

// ============================================================================
// Workspace
// ============================================================================

/// Create a new workspace file.
pub fn init(path: &Path, config: Option<&Path>, force: bool) -> CliResult {
    info!("Creating workspace at: {}", path.display());

    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let config = match config {
        Some(config_path) => EditorConfig::load(config_path)
            .with_context(|| format!("failed to load config {}", config_path.display()))?,
        None => EditorConfig::default(),
    };
    let store = LayoutStore::new(config);
    commit(path, &store)?;

    println!("Workspace created: {}", path.display());
    Ok(())
}

// ============================================================================
// Zones
// ============================================================================

/// Add a zone; unspecified values come from the configured seed zone.
pub fn add_zone(path: &Path, patch: ZonePatch) -> CliResult {
    info!("Adding zone in: {}", path.display());

    let mut store = open(path)?;
    let rect = patch.apply(&store.config().seed_zone);
    let id = store.add_zone(rect).context("zone rejected")?;
    commit(path, &store)?;

    let index = store.current().z_index(&id).unwrap_or_default();
    println!("Added zone {} [{}]: {}", index, id, rect);
    Ok(())
}

pub fn remove_zone(path: &Path, zone: &str) -> CliResult {
    info!("Removing zone {} in: {}", zone, path.display());

    let mut store = open(path)?;
    let id = resolve_zone(&store, zone)?;
    let changed = store.remove_zone(id)?;
    commit(path, &store)?;

    report(changed, &format!("Removed zone {}", id));
    Ok(())
}

pub fn drag(path: &Path, zone: &str, x: f64, y: f64) -> CliResult {
    info!("Dragging zone {} to ({}, {})", zone, x, y);

    let mut store = open(path)?;
    let id = resolve_zone(&store, zone)?;
    let rect = store
        .drag_zone(id, x, y)?
        .ok_or_else(|| anyhow!("zone {} vanished", id))?;
    commit(path, &store)?;

    println!("Zone now at {}", rect);
    Ok(())
}

pub fn resize(
    path: &Path,
    zone: &str,
    width: f64,
    height: f64,
    x: Option<f64>,
    y: Option<f64>,
) -> CliResult {
    info!("Resizing zone {} to {}x{}", zone, width, height);

    let mut store = open(path)?;
    let id = resolve_zone(&store, zone)?;
    let origin = store
        .current()
        .zone(&id)
        .map(|z| z.rect.origin())
        .ok_or_else(|| anyhow!("zone {} vanished", id))?;

    let outcome = store.resize_zone(id, width, height, x.unwrap_or(origin.x), y.unwrap_or(origin.y))?;
    match outcome {
        Some(Resize::Applied(rect)) => {
            commit(path, &store)?;
            println!("Zone now {}", rect);
        }
        Some(Resize::Rejected(rect)) => {
            warn!("Resize of zone {} rejected", id);
            println!("Resize rejected, zone stays {}", rect);
        }
        None => bail!("zone {} vanished", id),
    }
    Ok(())
}

// ============================================================================
// Media
// ============================================================================

pub fn attach(path: &Path, zone: &str, media: &str, duration: Option<f64>) -> CliResult {
    info!("Attaching {} to zone {}", media, zone);

    let mut store = open(path)?;
    let id = resolve_zone(&store, zone)?;
    let changed = store.attach_media(id, media, duration)?;
    commit(path, &store)?;

    if let Some(item) = store.current().zone(&id).and_then(|z| z.items.iter().last()) {
        report(
            changed,
            &format!("Attached {} for {:.1}s", item.media_ref, item.duration_seconds),
        );
    }
    Ok(())
}

pub fn drop_media(
    path: &Path,
    zone: &str,
    media_id: &str,
    media_type: MediaKind,
    catalog: &Path,
) -> CliResult {
    info!("Dropping {} '{}' onto zone {}", media_type, media_id, zone);

    let catalog = MediaCatalog::load(catalog)
        .with_context(|| format!("failed to load catalog {}", catalog.display()))?;
    let mut store = open(path)?;
    let id = resolve_zone(&store, zone)?;

    let payload = DropPayload::new(media_id, media_type);
    let changed = store.drop_media(id, &payload, &catalog)?;
    if changed {
        commit(path, &store)?;
        println!("Dropped {} '{}' onto zone {}", media_type, media_id, id);
    } else {
        println!("No {} '{}' in the catalog.", media_type, media_id);
    }
    Ok(())
}

pub fn detach(path: &Path, zone: &str, index: usize) -> CliResult {
    info!("Detaching item {} from zone {}", index, zone);

    let mut store = open(path)?;
    let id = resolve_zone(&store, zone)?;
    let changed = store.detach_media(id, index)?;
    commit(path, &store)?;

    report(changed, &format!("Removed item {} from zone {}", index, id));
    Ok(())
}

pub fn set_duration(path: &Path, zone: &str, index: usize, seconds: f64) -> CliResult {
    info!("Setting item {} of zone {} to {}s", index, zone, seconds);

    let mut store = open(path)?;
    let id = resolve_zone(&store, zone)?;
    let changed = store.set_zone_duration(id, index, seconds)?;
    commit(path, &store)?;

    report(changed, &format!("Item {} now lasts {}s", index, seconds));
    Ok(())
}

pub fn set_resolution(path: &Path, resolution: Resolution) -> CliResult {
    info!("Setting resolution to {}", resolution);

    let mut store = open(path)?;
    let changed = store.set_resolution(resolution)?;
    commit(path, &store)?;

    let (w, h) = resolution.dimensions();
    report(changed, &format!("Resolution set to {} ({}x{})", resolution, w, h));
    Ok(())
}

// ============================================================================
// Saved layouts
// ============================================================================

pub fn save(path: &Path, name: &str) -> CliResult {
    info!("Saving edit buffer as '{}'", name);

    let mut store = open(path)?;
    let id = store.save(name)?;
    commit(path, &store)?;

    println!("Saved layout '{}' as {}", name, id);
    Ok(())
}

pub fn load(path: &Path, layout: &str) -> CliResult {
    info!("Loading layout '{}' into the edit buffer", layout);

    let mut store = open(path)?;
    let id = resolve_layout(&store, layout)?;
    store.load(&id)?;
    commit(path, &store)?;

    println!(
        "Loaded '{}' ({} zones)",
        store.current().name,
        store.current().zones.len()
    );
    Ok(())
}

pub fn delete(path: &Path, layout: &str) -> CliResult {
    info!("Deleting layout '{}'", layout);

    let mut store = open(path)?;
    let id = resolve_layout(&store, layout)?;
    let changed = store.delete(&id);
    commit(path, &store)?;

    report(changed, &format!("Deleted layout {}", id));
    Ok(())
}

pub fn list(path: &Path) -> CliResult {
    let store = open(path)?;

    if store.layouts().is_empty() {
        println!("No saved layouts.");
        return Ok(());
    }

    println!("Saved Layouts:");
    println!("{:-<72}", "");
    for layout in store.layouts() {
        let id = layout.id.map(|id| id.to_string()).unwrap_or_default();
        let overall = layout
            .zones
            .iter()
            .map(|z| z.items.total_duration_ms())
            .max()
            .unwrap_or(0);
        println!(
            "{}  {:<20} {:<14} {:>2} zones  {:>6.1}s",
            id,
            layout.name,
            layout.resolution,
            layout.zones.len(),
            seconds(overall)
        );
    }
    println!("{:-<72}", "");
    Ok(())
}

pub fn show(path: &Path, layout: Option<&str>) -> CliResult {
    let store = open(path)?;
    let layout = match layout {
        Some(name) => {
            let id = resolve_layout(&store, name)?;
            store.layout(&id).ok_or_else(|| anyhow!("no saved layout '{}'", name))?
        }
        None => store.current(),
    };
    println!("{}", serde_json::to_string_pretty(layout)?);
    Ok(())
}

pub fn thumbnail(path: &Path, layout: &str) -> CliResult {
    let store = open(path)?;
    let id = resolve_layout(&store, layout)?;
    let rects = store
        .thumbnail(&id)
        .ok_or_else(|| anyhow!("no saved layout '{}'", layout))?;

    let stage = store.config().thumbnail_stage;
    println!("Thumbnail {}x{}:", stage.width(), stage.height());
    for (index, rect) in rects.iter().enumerate() {
        println!("  zone {}: {}", index, rect);
    }
    Ok(())
}

// ============================================================================
// History
// ============================================================================

pub fn undo(path: &Path) -> CliResult {
    info!("Undoing last edit in: {}", path.display());

    let mut store = open(path)?;
    let action = store.undo()?;
    commit(path, &store)?;

    println!("Undone: {}", action.description);
    Ok(())
}

pub fn redo(path: &Path) -> CliResult {
    info!("Redoing last undone edit in: {}", path.display());

    let mut store = open(path)?;
    let action = store.redo()?;
    commit(path, &store)?;

    println!("Redone: {}", action.description);
    Ok(())
}

pub fn history(path: &Path) -> CliResult {
    let store = open(path)?;
    let summary = store.history().undo_stack_summary();

    if summary.is_empty() {
        println!("No edits in history.");
        return Ok(());
    }

    println!("Edit History (most recent first):");
    println!("{:-<60}", "");
    for (id, action_type, description) in summary {
        println!("{}  {:<14} {}", &id[..8.min(id.len())], action_type, description);
    }
    println!("{:-<60}", "");
    println!(
        "Undo stack: {} | Redo stack: {}",
        store.history().undo_count(),
        store.history().redo_count()
    );
    Ok(())
}

// ============================================================================
// Preview
// ============================================================================

/// Play a layout on a headless surface and print each zone transition.
pub fn preview(
    path: &Path,
    layout: Option<&str>,
    until_seconds: f64,
    loop_policy: Option<LoopPolicy>,
    realtime: bool,
) -> CliResult {
    let horizon = Duration::try_from_secs_f64(until_seconds).with_context(|| {
        format!(
            "--until must be a non-negative number of seconds, got {}",
            until_seconds
        )
    })?;

    let store = open(path)?;
    let show: Layout = match layout {
        Some(name) => {
            let id = resolve_layout(&store, name)?;
            store
                .layout(&id)
                .cloned()
                .ok_or_else(|| anyhow!("no saved layout '{}'", name))?
        }
        None => store.current().clone(),
    };
    let policy = loop_policy.unwrap_or(store.config().loop_policy);
    info!("Previewing '{}' with policy {}", show.name, policy);

    let z_index: HashMap<ZoneId, usize> = show
        .zones
        .iter()
        .enumerate()
        .map(|(i, z)| (z.id, i))
        .collect();
    let print_event = |event: &CursorEvent| {
        println!(
            "{:>8.3}s  zone {}  {} -> {}",
            seconds(event.at_ms),
            z_index.get(&event.zone).copied().unwrap_or_default(),
            event.from,
            event.to
        );
    };

    let mut scheduler = PlaybackScheduler::new(HeadlessSurface::new(), policy);
    scheduler.start(&show);
    println!(
        "Preview '{}': {} zones, overall {:.1}s, policy {}",
        show.name,
        show.zones.len(),
        seconds(scheduler.overall_duration_ms()),
        policy
    );

    if realtime {
        run_realtime(&mut scheduler, horizon, print_event)?;
    } else {
        let horizon_ms = u64::try_from(horizon.as_millis()).unwrap_or(u64::MAX);
        for event in scheduler.advance_to(horizon_ms) {
            print_event(&event);
        }
        for frame in scheduler.frame() {
            let item = frame
                .item
                .map(|i| i.media_ref.to_string())
                .unwrap_or_else(|| "(empty)".to_string());
            println!("  zone {} {}: {}", frame.z_index, frame.state, item);
        }
        scheduler.stop();
    }

    for warning in scheduler.warnings() {
        println!("warning: zone {} {}: {}", warning.zone, warning.media, warning.reason);
    }
    Ok(())
}

#[cfg(feature = "realtime")]
fn run_realtime<F>(
    scheduler: &mut PlaybackScheduler<HeadlessSurface>,
    horizon: Duration,
    on_event: F,
) -> CliResult
where
    F: FnMut(&CursorEvent),
{
    let runtime = tokio::runtime::Runtime::new().context("failed to start the tokio runtime")?;
    runtime.block_on(crate::preview::realtime::run_for(scheduler, horizon, on_event));
    Ok(())
}

#[cfg(not(feature = "realtime"))]
fn run_realtime<F>(
    _scheduler: &mut PlaybackScheduler<HeadlessSurface>,
    _horizon: Duration,
    _on_event: F,
) -> CliResult
where
    F: FnMut(&CursorEvent),
{
    bail!("real-time preview needs the `realtime` feature")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mosaic.json");
        init(&path, None, false).unwrap();
        (dir, path)
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let (_dir, path) = workspace();
        assert!(init(&path, None, false).is_err());
        assert!(init(&path, None, true).is_ok());
    }

    #[test]
    fn test_edit_save_and_load_by_name() {
        let (_dir, path) = workspace();
        add_zone(&path, ZonePatch::default()).unwrap();
        attach(&path, "0", "a.png", Some(2.0)).unwrap();
        drag(&path, "0", 1000.0, -5.0).unwrap();
        save(&path, "Lobby").unwrap();

        let store = open(&path).unwrap();
        assert!(store.current().is_empty());
        assert_eq!(store.layouts()[0].zones[0].rect.x, 420.0);

        load(&path, "Lobby").unwrap();
        let store = open(&path).unwrap();
        assert_eq!(store.current().zones.len(), 1);
        assert_eq!(store.current().name, "Lobby");
    }

    #[test]
    fn test_unknown_zone_is_an_error() {
        let (_dir, path) = workspace();
        assert!(attach(&path, "3", "a.png", None).is_err());
        assert!(remove_zone(&path, "not-a-zone").is_err());
    }

    #[test]
    fn test_undo_round_trip_through_file() {
        let (_dir, path) = workspace();
        add_zone(&path, ZonePatch::default()).unwrap();
        undo(&path).unwrap();
        assert!(open(&path).unwrap().current().zones.is_empty());
        redo(&path).unwrap();
        assert_eq!(open(&path).unwrap().current().zones.len(), 1);
    }

    #[test]
    fn test_preview_rejects_negative_horizon() {
        let (_dir, path) = workspace();
        assert!(preview(&path, None, -1.0, None, false).is_err());
        assert!(preview(&path, None, f64::NAN, None, false).is_err());
        assert!(preview(&path, None, 1e30, None, false).is_err());
        assert!(preview(&path, None, 5.0, None, false).is_ok());
    }
}
