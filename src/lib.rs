//! Mosaic - Multi-Zone Signage Layout Core
//!
//! Mosaic is the editing and preview core of a digital-signage layout tool.
//! A layout is a set of rectangular zones on a fixed logical stage; each zone
//! carries an ordered timeline of images and videos.
//!
//! # Architecture
//!
//! - `geometry`: drag and resize rules that keep every zone on the stage
//! - `layout`: zones, timelines and the persisted layout record
//! - `state`: the layout store (edit buffer, saved layouts, undo history)
//! - `preview`: per-zone playback scheduling for a layout
//! - `cli`: the `mosaic-cli` command surface over a workspace file

pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod preview;
pub mod state;

pub use config::EditorConfig;
pub use error::{MosaicError, Result};
