//! Workspace Document
//!
//! JSON file carrying a whole editing session: config, edit buffer, saved
//! layouts and undo history. Used by the CLI between invocations; the
//! layouts inside use the same record shape the export pipeline consumes.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::migration::{migrate_document, CURRENT_SCHEMA_VERSION};
use super::store::LayoutStore;
use super::undo::UndoManager;
use crate::config::EditorConfig;
use crate::error::{MosaicError, Result};
use crate::layout::Layout;

fn default_schema_version() -> String {
    CURRENT_SCHEMA_VERSION.to_string()
}

/// Serialized editing session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceDocument {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    pub modified_at: DateTime<Utc>,

    #[serde(default)]
    pub config: EditorConfig,

    #[serde(default)]
    pub current_layout: Layout,

    #[serde(default)]
    pub layouts: Vec<Layout>,

    #[serde(default)]
    pub history: UndoManager,
}

impl WorkspaceDocument {
    /// Snapshot a store
    pub fn from_store(store: &LayoutStore) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION.to_string(),
            modified_at: Utc::now(),
            config: store.config().clone(),
            current_layout: store.current().clone(),
            layouts: store.layouts().to_vec(),
            history: store.history().clone(),
        }
    }

    pub fn into_store(self) -> LayoutStore {
        LayoutStore::from_parts(self.config, self.current_layout, self.layouts, self.history)
    }

    /// Load a document, upgrading older schema versions.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MosaicError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| MosaicError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let data: serde_json::Value = serde_json::from_str(&content)?;
        let data = migrate_document(data)?;
        let document: WorkspaceDocument = serde_json::from_value(data)?;
        document.config.validate()?;
        document.validate_geometry()?;
        Ok(document)
    }

    /// Every zone, in the buffer and in saved layouts, must be legal on the
    /// edit stage.
    fn validate_geometry(&self) -> Result<()> {
        let stage = self.config.edit_stage;
        for layout in std::iter::once(&self.current_layout).chain(&self.layouts) {
            if let Some(zone) = layout.zones.iter().find(|z| !z.rect.is_legal(stage)) {
                let name = if layout.name.is_empty() { "<edit buffer>" } else { layout.name.as_str() };
                return Err(MosaicError::GeometryViolation {
                    reason: format!(
                        "zone {} of layout '{}' is {:?}, not legal on a {}x{} stage",
                        zone.id,
                        name,
                        zone.rect,
                        stage.width(),
                        stage.height()
                    ),
                });
            }
        }
        Ok(())
    }

    /// Write the document as pretty JSON, stamping `modified_at`.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.modified_at = Utc::now();
        self.schema_version = CURRENT_SCHEMA_VERSION.to_string();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| MosaicError::FileWriteError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| MosaicError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("workspace.json");

        let mut store = LayoutStore::default();
        let zone = store.add_zone(Rect::new(10.0, 20.0, 200.0, 100.0)).unwrap();
        store.attach_media(zone, "a.png", Some(3.0)).unwrap();
        let saved = store.save("Lobby").unwrap();
        store.add_seed_zone().unwrap();

        WorkspaceDocument::from_store(&store).save(&path).unwrap();
        let restored = WorkspaceDocument::load(&path).unwrap().into_store();

        assert_eq!(restored.layouts(), store.layouts());
        assert_eq!(restored.current(), store.current());
        assert_eq!(restored.history().undo_count(), 1);
        assert_eq!(restored.layout(&saved).unwrap().zones[0].items.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = WorkspaceDocument::load(&dir.path().join("nope.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }

    #[test]
    fn test_load_legacy_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy.json");
        fs::write(
            &path,
            r#"{
                "layouts": [{
                    "id": 42, "name": "Old", "deviceResolution": "Ultra HD 4K",
                    "divisions": [{"id": 7, "x": 5, "y": 5, "width": 100, "height": 80,
                                   "imageSrcs": ["x.png"], "durations": [2]}]
                }],
                "currentLayout": {"id": null, "name": "", "divisions": []}
            }"#,
        )
        .unwrap();

        let store = WorkspaceDocument::load(&path).unwrap().into_store();
        assert_eq!(store.layouts().len(), 1);
        let layout = &store.layouts()[0];
        assert_eq!(layout.resolution, crate::layout::Resolution::Uhd4k);
        assert_eq!(layout.zones[0].items.total_duration_ms(), 2000);
        assert!(store.current().is_empty());
    }

    #[test]
    fn test_load_rejects_illegal_zone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy.json");
        fs::write(
            &path,
            r#"{
                "layouts": [{
                    "id": 42, "name": "Old", "deviceResolution": "Ultra HD 4K",
                    "divisions": [{"id": 7, "x": 5, "y": 5, "width": 10, "height": 80,
                                   "imageSrcs": ["x.png"], "durations": [2]}]
                }],
                "currentLayout": {"id": null, "name": "", "divisions": []}
            }"#,
        )
        .unwrap();

        let err = WorkspaceDocument::load(&path).unwrap_err();
        assert_eq!(err.error_code(), "GEOMETRY_VIOLATION");
        assert!(err.to_string().contains("Old"));
    }

    #[test]
    fn test_load_rejects_zone_off_stage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("workspace.json");

        let mut store = LayoutStore::default();
        store.add_zone(Rect::new(10.0, 20.0, 200.0, 100.0)).unwrap();
        let mut document = WorkspaceDocument::from_store(&store);
        document.current_layout.zones[0].rect.x = 10_000.0;
        document.save(&path).unwrap();

        let err = WorkspaceDocument::load(&path).unwrap_err();
        assert_eq!(err.error_code(), "GEOMETRY_VIOLATION");
    }
}
