//! Layout Store
//!
//! Owns the edit buffer (the current layout) and the collection of saved
//! layouts. Every buffer mutation goes through [`reduce`], a pure transform
//! from the prior layout and an [`EditCommand`] to the next layout, and is
//! recorded in the undo history.
//!
//! Lookups by a stale zone or layout id are benign no-ops: UI callbacks
//! arrive asynchronously and may refer to things that are already gone.

use log::{debug, info};

use super::undo::{ActionType, UndoAction, UndoManager};
use crate::config::EditorConfig;
use crate::error::{MosaicError, Result};
use crate::geometry::{apply_drag, apply_resize, scale_for_thumbnail, Rect, Resize, StageSize};
use crate::layout::{
    DropPayload, Layout, LayoutId, MediaCatalog, MediaRef, Resolution, TimelineItem, Zone, ZoneId,
    ZonePatch,
};

/// A single edit of the buffer
#[derive(Debug, Clone, PartialEq)]
pub enum EditCommand {
    AddZone(Zone),
    UpdateZone { id: ZoneId, patch: ZonePatch },
    RemoveZone(ZoneId),
    AttachMedia { zone: ZoneId, item: TimelineItem },
    DetachMedia { zone: ZoneId, index: usize },
    SetDuration { zone: ZoneId, index: usize, seconds: f64 },
    SetResolution(Resolution),
    Replace(Layout),
}

impl EditCommand {
    fn action_type(&self) -> ActionType {
        match self {
            EditCommand::AddZone(_) => ActionType::AddZone,
            EditCommand::UpdateZone { .. } => ActionType::UpdateZone,
            EditCommand::RemoveZone(_) => ActionType::RemoveZone,
            EditCommand::AttachMedia { .. } => ActionType::AttachMedia,
            EditCommand::DetachMedia { .. } => ActionType::DetachMedia,
            EditCommand::SetDuration { .. } => ActionType::SetDuration,
            EditCommand::SetResolution(_) => ActionType::SetResolution,
            EditCommand::Replace(_) => ActionType::Load,
        }
    }

    fn describe(&self) -> String {
        match self {
            EditCommand::AddZone(zone) => format!("Add zone {} at {}", zone.id, zone.rect),
            EditCommand::UpdateZone { id, .. } => format!("Update zone {}", id),
            EditCommand::RemoveZone(id) => format!("Remove zone {}", id),
            EditCommand::AttachMedia { zone, item } => {
                format!("Attach {} to zone {}", item.media_ref, zone)
            }
            EditCommand::DetachMedia { zone, index } => {
                format!("Detach item {} from zone {}", index, zone)
            }
            EditCommand::SetDuration {
                zone,
                index,
                seconds,
            } => format!("Set item {} of zone {} to {}s", index, zone, seconds),
            EditCommand::SetResolution(res) => format!("Set resolution to {}", res),
            EditCommand::Replace(layout) => format!("Load layout '{}'", layout.name),
        }
    }
}

fn check_geometry(rect: &Rect, stage: StageSize) -> Result<()> {
    if rect.is_legal(stage) {
        Ok(())
    } else {
        Err(MosaicError::GeometryViolation {
            reason: format!(
                "{} is not a legal zone on the {}x{} stage",
                rect,
                stage.width(),
                stage.height()
            ),
        })
    }
}

/// Apply `command` to `prior`.
///
/// Returns `Ok(None)` when the command names something that no longer
/// exists, `Err` when it would break a validation rule, and the new layout
/// otherwise. `prior` is never modified.
pub fn reduce(prior: &Layout, command: &EditCommand, stage: StageSize) -> Result<Option<Layout>> {
    let mut next = prior.clone();

    match command {
        EditCommand::AddZone(zone) => {
            check_geometry(&zone.rect, stage)?;
            next.zones.push(zone.clone());
        }
        EditCommand::UpdateZone { id, patch } => {
            let Some(zone) = next.zone_mut(id) else {
                return Ok(None);
            };
            let merged = patch.apply(&zone.rect);
            check_geometry(&merged, stage)?;
            zone.rect = merged;
        }
        EditCommand::RemoveZone(id) => {
            let before = next.zones.len();
            next.zones.retain(|z| z.id != *id);
            if next.zones.len() == before {
                return Ok(None);
            }
        }
        EditCommand::AttachMedia { zone, item } => {
            let Some(target) = next.zone_mut(zone) else {
                return Ok(None);
            };
            target
                .items
                .append(item.media_ref.clone(), Some(item.duration_seconds));
        }
        EditCommand::DetachMedia { zone, index } => {
            let Some(target) = next.zone_mut(zone) else {
                return Ok(None);
            };
            if target.items.remove_at(*index).is_none() {
                return Ok(None);
            }
        }
        EditCommand::SetDuration {
            zone,
            index,
            seconds,
        } => {
            if !(seconds.is_finite() && *seconds > 0.0) {
                return Err(MosaicError::InvalidDuration { seconds: *seconds });
            }
            let Some(target) = next.zone_mut(zone) else {
                return Ok(None);
            };
            if !target.items.set_duration(*index, *seconds)? {
                return Ok(None);
            }
        }
        EditCommand::SetResolution(resolution) => {
            next.resolution = *resolution;
        }
        EditCommand::Replace(layout) => {
            next = layout.clone();
        }
    }

    Ok(Some(next))
}

/// The edit buffer plus the saved layout collection.
#[derive(Debug, Clone)]
pub struct LayoutStore {
    config: EditorConfig,
    current: Layout,
    layouts: Vec<Layout>,
    history: UndoManager,
}

impl Default for LayoutStore {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl LayoutStore {
    pub fn new(config: EditorConfig) -> Self {
        let history = UndoManager::new(config.max_undo_levels);
        Self {
            config,
            current: Layout::empty(Resolution::default()),
            layouts: Vec::new(),
            history,
        }
    }

    /// Rebuild a store from previously persisted parts.
    pub fn from_parts(
        config: EditorConfig,
        current: Layout,
        layouts: Vec<Layout>,
        mut history: UndoManager,
    ) -> Self {
        history.set_max_undo_levels(config.max_undo_levels);
        Self {
            config,
            current,
            layouts,
            history,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn stage(&self) -> StageSize {
        self.config.edit_stage
    }

    /// The edit buffer
    pub fn current(&self) -> &Layout {
        &self.current
    }

    /// Saved layouts in save order
    pub fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    pub fn layout(&self, id: &LayoutId) -> Option<&Layout> {
        self.layouts.iter().find(|l| l.id.as_ref() == Some(id))
    }

    pub fn history(&self) -> &UndoManager {
        &self.history
    }

    /// Run `command` against the buffer and record it.
    ///
    /// Returns `Ok(false)` for a benign no-op.
    pub fn dispatch(&mut self, command: EditCommand) -> Result<bool> {
        match reduce(&self.current, &command, self.stage())? {
            Some(next) => {
                let action = UndoAction::new(
                    command.action_type(),
                    command.describe(),
                    self.current.clone(),
                    next.clone(),
                );
                debug!("[STORE] {}", action.description);
                self.history.push(action);
                self.current = next;
                Ok(true)
            }
            None => {
                debug!("[STORE] Ignored stale edit: {}", command.describe());
                Ok(false)
            }
        }
    }

    // ========================================================================
    // Zone Operations
    // ========================================================================

    /// Append a new zone with a fresh id.
    pub fn add_zone(&mut self, rect: Rect) -> Result<ZoneId> {
        let zone = Zone::new(rect);
        let id = zone.id;
        self.dispatch(EditCommand::AddZone(zone))?;
        Ok(id)
    }

    /// Append a zone at the configured seed rectangle.
    pub fn add_seed_zone(&mut self) -> Result<ZoneId> {
        self.add_zone(self.config.seed_zone)
    }

    /// Merge `patch` into a zone's geometry.
    pub fn update_zone(&mut self, id: ZoneId, patch: ZonePatch) -> Result<bool> {
        self.dispatch(EditCommand::UpdateZone { id, patch })
    }

    pub fn remove_zone(&mut self, id: ZoneId) -> Result<bool> {
        self.dispatch(EditCommand::RemoveZone(id))
    }

    /// Move a zone, clamping it into the stage. Returns the final rectangle.
    pub fn drag_zone(&mut self, id: ZoneId, proposed_x: f64, proposed_y: f64) -> Result<Option<Rect>> {
        let Some(zone) = self.current.zone(&id) else {
            return Ok(None);
        };
        let rect = zone.rect.moved_to(apply_drag(&zone.rect, proposed_x, proposed_y, self.stage()));
        self.update_zone(id, ZonePatch::position(rect.x, rect.y))?;
        Ok(Some(rect))
    }

    /// Resize a zone through the geometry engine.
    ///
    /// A rejected resize leaves the buffer untouched and is reported as
    /// `Resize::Rejected`.
    pub fn resize_zone(
        &mut self,
        id: ZoneId,
        raw_width: f64,
        raw_height: f64,
        proposed_x: f64,
        proposed_y: f64,
    ) -> Result<Option<Resize>> {
        let Some(zone) = self.current.zone(&id) else {
            return Ok(None);
        };
        let outcome = apply_resize(
            &zone.rect,
            raw_width,
            raw_height,
            proposed_x,
            proposed_y,
            self.stage(),
        );
        if let Resize::Applied(rect) = outcome {
            self.update_zone(id, ZonePatch::from(rect))?;
        }
        Ok(Some(outcome))
    }

    // ========================================================================
    // Media Operations
    // ========================================================================

    /// Append one `{media, duration}` entry to a zone.
    pub fn attach_media(
        &mut self,
        zone: ZoneId,
        media: impl Into<MediaRef>,
        duration_seconds: Option<f64>,
    ) -> Result<bool> {
        let item = TimelineItem::new(media, duration_seconds);
        self.dispatch(EditCommand::AttachMedia { zone, item })
    }

    /// Remove the item at `index`, never by media equality.
    pub fn detach_media(&mut self, zone: ZoneId, index: usize) -> Result<bool> {
        self.dispatch(EditCommand::DetachMedia { zone, index })
    }

    pub fn set_zone_duration(&mut self, zone: ZoneId, index: usize, seconds: f64) -> Result<bool> {
        self.dispatch(EditCommand::SetDuration {
            zone,
            index,
            seconds,
        })
    }

    /// Resolve a drag-and-drop payload against `catalog` and attach it.
    ///
    /// Unknown media is ignored like any other stale reference.
    pub fn drop_media(
        &mut self,
        zone: ZoneId,
        payload: &DropPayload,
        catalog: &MediaCatalog,
    ) -> Result<bool> {
        match catalog.resolve(payload) {
            Some(asset) => {
                self.attach_media(zone, asset.src.clone(), asset.duration_seconds)
            }
            None => {
                debug!(
                    "[STORE] Dropped {} '{}' is not in the catalog",
                    payload.media_type, payload.media_id
                );
                Ok(false)
            }
        }
    }

    /// Change the buffer's device resolution. Geometry is left as is.
    pub fn set_resolution(&mut self, resolution: Resolution) -> Result<bool> {
        self.dispatch(EditCommand::SetResolution(resolution))
    }

    // ========================================================================
    // Collection Operations
    // ========================================================================

    /// Persist a deep copy of the buffer under a fresh id.
    ///
    /// The buffer is then reset to an empty layout that keeps the
    /// resolution just used, and the edit history is cleared.
    pub fn save(&mut self, name: &str) -> Result<LayoutId> {
        if name.trim().is_empty() {
            return Err(MosaicError::EmptyName);
        }

        let id = LayoutId::new();
        let resolution = self.current.resolution;
        let layout = Layout {
            id: Some(id),
            name: name.to_string(),
            resolution,
            zones: self.current.zones.clone(),
        };
        info!(
            "[STORE] Saved layout '{}' ({}) with {} zones",
            layout.name,
            id,
            layout.zones.len()
        );

        self.layouts.push(layout);
        self.current = Layout::empty(resolution);
        self.history.clear();
        Ok(id)
    }

    /// Copy a saved layout into the buffer. Later edits do not touch the
    /// saved copy.
    pub fn load(&mut self, id: &LayoutId) -> Result<bool> {
        let Some(layout) = self.layout(id).cloned() else {
            debug!("[STORE] Load of unknown layout {} ignored", id);
            return Ok(false);
        };
        info!("[STORE] Loaded layout '{}' into the buffer", layout.name);
        self.dispatch(EditCommand::Replace(layout))
    }

    /// Remove a saved layout. A buffer loaded from it stays as it is.
    pub fn delete(&mut self, id: &LayoutId) -> bool {
        let before = self.layouts.len();
        self.layouts.retain(|l| l.id.as_ref() != Some(id));
        let removed = self.layouts.len() != before;
        if removed {
            info!("[STORE] Deleted layout {}", id);
        }
        removed
    }

    /// Zone rectangles of a saved layout scaled to the thumbnail stage, in
    /// z-order.
    pub fn thumbnail(&self, id: &LayoutId) -> Option<Vec<Rect>> {
        self.layout(id).map(|layout| {
            layout
                .zones
                .iter()
                .map(|z| scale_for_thumbnail(&z.rect, self.stage(), self.config.thumbnail_stage))
                .collect()
        })
    }

    // ========================================================================
    // History
    // ========================================================================

    pub fn undo(&mut self) -> Result<UndoAction> {
        self.history.undo(&mut self.current)
    }

    pub fn redo(&mut self) -> Result<UndoAction> {
        self.history.redo(&mut self.current)
    }
}
