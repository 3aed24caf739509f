//! State Management Module
//!
//! The layout store, its undo history, and the workspace document used to
//! carry a session between CLI invocations.

pub mod document;
pub mod migration;
pub mod store;
pub mod undo;

pub use document::WorkspaceDocument;
pub use migration::{migrate_document, CURRENT_SCHEMA_VERSION};
pub use store::{reduce, EditCommand, LayoutStore};
pub use undo::{ActionType, UndoAction, UndoManager, DEFAULT_MAX_UNDO_LEVELS};
