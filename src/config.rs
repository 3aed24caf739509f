//! Editor configuration
//!
//! Every field has a default, so a config file only needs the values it
//! overrides.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MosaicError, Result};
use crate::geometry::{Rect, StageSize};
use crate::preview::LoopPolicy;
use crate::state::DEFAULT_MAX_UNDO_LEVELS;

/// Top-level editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Logical editing canvas. Device resolution never changes it.
    pub edit_stage: StageSize,
    /// Canvas used for saved-layout thumbnails.
    pub thumbnail_stage: StageSize,
    /// Rectangle used by "add zone" when no geometry is given.
    pub seed_zone: Rect,
    /// What preview does once a zone runs out of items.
    pub loop_policy: LoopPolicy,
    pub max_undo_levels: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            edit_stage: StageSize::EDIT,
            thumbnail_stage: StageSize::THUMBNAIL,
            seed_zone: Rect::new(0.0, 0.0, 300.0, 200.0),
            loop_policy: LoopPolicy::Once,
            max_undo_levels: DEFAULT_MAX_UNDO_LEVELS,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EditorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file.
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
        Self::from_json(&content)
    }

    /// The seed zone must itself be a legal zone on the edit stage.
    pub fn validate(&self) -> Result<()> {
        if !self.seed_zone.is_legal(self.edit_stage) {
            return Err(MosaicError::GeometryViolation {
                reason: format!(
                    "seed zone {} does not fit the {}x{} edit stage",
                    self.seed_zone,
                    self.edit_stage.width(),
                    self.edit_stage.height()
                ),
            });
        }
        Ok(())
    }
}
