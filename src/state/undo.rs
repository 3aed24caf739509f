//! Undo/Redo System
//!
//! Snapshot-based history for the edit buffer. Each entry stores the
//! complete layout before and after the edit, so restoring never depends on
//! replaying commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MosaicError, Result};
use crate::layout::Layout;

/// Default maximum number of undo levels to keep.
pub const DEFAULT_MAX_UNDO_LEVELS: usize = 50;

/// Kinds of edit that can be undone/redone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    AddZone,
    UpdateZone,
    RemoveZone,
    AttachMedia,
    DetachMedia,
    SetDuration,
    SetResolution,
    /// Buffer replaced by a persisted layout.
    Load,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::AddZone => write!(f, "Add Zone"),
            ActionType::UpdateZone => write!(f, "Update Zone"),
            ActionType::RemoveZone => write!(f, "Remove Zone"),
            ActionType::AttachMedia => write!(f, "Attach Media"),
            ActionType::DetachMedia => write!(f, "Detach Media"),
            ActionType::SetDuration => write!(f, "Set Duration"),
            ActionType::SetResolution => write!(f, "Set Resolution"),
            ActionType::Load => write!(f, "Load Layout"),
        }
    }
}

/// A single undoable edit with complete buffer snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoAction {
    /// Unique identifier for this action.
    pub id: String,

    pub action_type: ActionType,

    /// Human-readable description of the edit.
    pub description: String,

    pub timestamp: DateTime<Utc>,

    pub state_before: Layout,

    pub state_after: Layout,
}

impl UndoAction {
    /// Create a new undo action with a generated UUID.
    pub fn new(
        action_type: ActionType,
        description: impl Into<String>,
        state_before: Layout,
        state_after: Layout,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            action_type,
            description: description.into(),
            timestamp: Utc::now(),
            state_before,
            state_after,
        }
    }
}

/// Manages undo/redo for the edit buffer.
///
/// Pushing a new action clears the redo stack; the undo stack is bounded by
/// `max_undo_levels` and drops its oldest entries first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UndoManager {
    undo_stack: Vec<UndoAction>,
    redo_stack: Vec<UndoAction>,
    max_undo_levels: usize,
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO_LEVELS)
    }
}

impl UndoManager {
    /// Create a new undo manager with the specified maximum undo levels.
    pub fn new(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo_levels: max_levels,
        }
    }

    /// Push a new action onto the undo stack.
    pub fn push(&mut self, action: UndoAction) {
        // History has diverged
        self.redo_stack.clear();
        self.undo_stack.push(action);
        self.trim_history();
    }

    /// Undo the last action, restoring `layout` to its previous state.
    pub fn undo(&mut self, layout: &mut Layout) -> Result<UndoAction> {
        let action = self.undo_stack.pop().ok_or(MosaicError::NothingToUndo)?;
        *layout = action.state_before.clone();
        self.redo_stack.push(action.clone());
        Ok(action)
    }

    /// Redo the last undone action.
    pub fn redo(&mut self, layout: &mut Layout) -> Result<UndoAction> {
        let action = self.redo_stack.pop().ok_or(MosaicError::NothingToRedo)?;
        *layout = action.state_after.clone();
        self.undo_stack.push(action.clone());
        Ok(action)
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn peek_undo(&self) -> Option<&UndoAction> {
        self.undo_stack.last()
    }

    pub fn peek_redo(&self) -> Option<&UndoAction> {
        self.redo_stack.last()
    }

    /// Drop the oldest undo entries beyond `max_undo_levels`.
    pub fn trim_history(&mut self) {
        if self.undo_stack.len() > self.max_undo_levels {
            let excess = self.undo_stack.len() - self.max_undo_levels;
            self.undo_stack.drain(..excess);
        }
    }

    pub fn max_undo_levels(&self) -> usize {
        self.max_undo_levels
    }

    /// Set the maximum number of undo levels, trimming if needed.
    pub fn set_max_undo_levels(&mut self, max_levels: usize) {
        self.max_undo_levels = max_levels;
        self.trim_history();
    }

    /// Clear all undo/redo history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// `(id, type, description)` of undoable actions, most recent first.
    pub fn undo_stack_summary(&self) -> Vec<(String, ActionType, String)> {
        self.undo_stack
            .iter()
            .rev()
            .map(|a| (a.id.clone(), a.action_type, a.description.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Resolution;

    fn named(name: &str) -> Layout {
        Layout {
            name: name.to_string(),
            ..Layout::empty(Resolution::default())
        }
    }

    fn action(before: &str, after: &str) -> UndoAction {
        UndoAction::new(ActionType::UpdateZone, "edit", named(before), named(after))
    }

    #[test]
    fn test_undo_redo_restores_snapshots() {
        let mut manager = UndoManager::new(10);
        let mut layout = named("after");
        manager.push(action("before", "after"));

        let undone = manager.undo(&mut layout).unwrap();
        assert_eq!(undone.action_type, ActionType::UpdateZone);
        assert_eq!(layout.name, "before");
        assert!(manager.can_redo());

        manager.redo(&mut layout).unwrap();
        assert_eq!(layout.name, "after");
        assert_eq!(manager.undo_count(), 1);
        assert_eq!(manager.redo_count(), 0);
    }

    #[test]
    fn test_empty_stacks_error() {
        let mut manager = UndoManager::default();
        let mut layout = named("x");
        assert!(matches!(manager.undo(&mut layout), Err(MosaicError::NothingToUndo)));
        assert!(matches!(manager.redo(&mut layout), Err(MosaicError::NothingToRedo)));
        assert_eq!(layout.name, "x");
    }

    #[test]
    fn test_push_clears_redo() {
        let mut manager = UndoManager::new(10);
        let mut layout = named("b");
        manager.push(action("a", "b"));
        manager.undo(&mut layout).unwrap();
        assert_eq!(manager.redo_count(), 1);

        manager.push(action("a", "c"));
        assert_eq!(manager.redo_count(), 0);
    }

    #[test]
    fn test_trim_to_max_levels() {
        let mut manager = UndoManager::new(3);
        for i in 0..5 {
            manager.push(action(&i.to_string(), &(i + 1).to_string()));
        }
        assert_eq!(manager.undo_count(), 3);
        assert_eq!(manager.peek_undo().unwrap().state_after.name, "5");

        manager.set_max_undo_levels(1);
        assert_eq!(manager.undo_count(), 1);
        assert_eq!(manager.undo_stack_summary()[0].2, "edit");
    }

    #[test]
    fn test_clear() {
        let mut manager = UndoManager::new(10);
        let mut layout = named("b");
        manager.push(action("a", "b"));
        manager.push(action("b", "c"));
        manager.undo(&mut layout).unwrap();
        manager.clear();
        assert!(!manager.can_undo());
        assert!(!manager.can_redo());
    }
}
