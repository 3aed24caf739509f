//! CLI Module
//!
//! Command-line interface over a workspace file. Each invocation loads the
//! workspace, applies one command and writes it back.

pub mod commands;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::layout::{MediaKind, Resolution};
use crate::preview::LoopPolicy;

/// Mosaic - multi-zone signage layout editor
#[derive(Parser, Debug)]
#[command(name = "mosaic")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also emit structured tracing events (playback warnings)
    #[arg(long, global = true)]
    pub trace: bool,

    /// Workspace file holding the edit buffer and saved layouts
    #[arg(short, long, global = true, default_value = "mosaic.json")]
    pub workspace: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Zones are addressed by z-index (`0` is the bottom) or by id.
/// Saved layouts are addressed by id or by name.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new workspace file
    #[command(name = "init")]
    Init {
        /// Editor config (JSON) to embed in the workspace
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Overwrite an existing workspace
        #[arg(long)]
        force: bool,
    },

    /// Add a zone to the edit buffer; missing values come from the seed zone
    #[command(name = "add-zone")]
    AddZone {
        #[arg(long)]
        x: Option<f64>,
        #[arg(long)]
        y: Option<f64>,
        #[arg(long)]
        width: Option<f64>,
        #[arg(long)]
        height: Option<f64>,
    },

    /// Remove a zone from the edit buffer
    #[command(name = "remove-zone")]
    RemoveZone { zone: String },

    /// Move a zone, clamped to the stage
    #[command(name = "drag")]
    Drag { zone: String, x: f64, y: f64 },

    /// Resize a zone
    #[command(name = "resize")]
    Resize {
        zone: String,
        width: f64,
        height: f64,

        /// New left edge (defaults to the current one)
        #[arg(long)]
        x: Option<f64>,

        /// New top edge (defaults to the current one)
        #[arg(long)]
        y: Option<f64>,
    },

    /// Append a media item to a zone's timeline
    #[command(name = "attach")]
    Attach {
        zone: String,
        media: String,

        /// Seconds on screen (default 4)
        #[arg(short, long)]
        duration: Option<f64>,
    },

    /// Append an asset from a media catalog by id
    #[command(name = "drop")]
    Drop {
        zone: String,
        media_id: String,

        /// image or video
        #[arg(short = 't', long = "type", default_value = "image")]
        media_type: MediaKind,

        /// Catalog file (JSON)
        #[arg(short, long)]
        catalog: PathBuf,
    },

    /// Remove the item at an index from a zone's timeline
    #[command(name = "detach")]
    Detach { zone: String, index: usize },

    /// Change how long an item stays on screen
    #[command(name = "set-duration")]
    SetDuration {
        zone: String,
        index: usize,
        seconds: f64,
    },

    /// Set the device resolution of the edit buffer (720p, 1080p, 4k)
    #[command(name = "resolution")]
    Resolution { resolution: Resolution },

    /// Save the edit buffer as a named layout and clear it
    #[command(name = "save")]
    Save { name: String },

    /// Copy a saved layout into the edit buffer
    #[command(name = "load")]
    Load { layout: String },

    /// Delete a saved layout
    #[command(name = "delete")]
    Delete { layout: String },

    /// List saved layouts
    #[command(name = "list")]
    List,

    /// Print the edit buffer, or a saved layout, as JSON
    #[command(name = "show")]
    Show { layout: Option<String> },

    /// Print a saved layout's zones scaled to the thumbnail stage
    #[command(name = "thumbnail")]
    Thumbnail { layout: String },

    /// Undo the last edit
    #[command(name = "undo")]
    Undo,

    /// Redo the last undone edit
    #[command(name = "redo")]
    Redo,

    /// Show edit history
    #[command(name = "history")]
    History,

    /// Play a layout and print every zone transition
    #[command(name = "preview")]
    Preview {
        /// Saved layout to play (defaults to the edit buffer)
        #[arg(short, long)]
        layout: Option<String>,

        /// Stop after this many seconds
        #[arg(short, long, default_value_t = 60.0)]
        until: f64,

        /// once, loop-zone or loop-show (defaults to the workspace config)
        #[arg(long)]
        loop_policy: Option<LoopPolicy>,

        /// Play on the wall clock (needs the `realtime` feature)
        #[arg(long)]
        realtime: bool,
    },
}

/// Install `env_logger` for the `log` macros and, with `trace`, a tracing
/// subscriber for structured events. Fails if either is already installed.
pub fn init_logging(verbose: bool, trace: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .try_init()
        .map_err(|e| anyhow!("failed to install the logger: {}", e))?;

    if trace {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .map_err(|e| anyhow!("failed to install the tracing subscriber: {}", e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_preview() {
        let cli = Cli::try_parse_from([
            "mosaic",
            "-w",
            "show.json",
            "preview",
            "--until",
            "12.5",
            "--loop-policy",
            "loop-show",
        ])
        .unwrap();

        assert_eq!(cli.workspace, PathBuf::from("show.json"));
        match cli.command {
            Some(Commands::Preview {
                until, loop_policy, ..
            }) => {
                assert_eq!(until, 12.5);
                assert_eq!(loop_policy, Some(LoopPolicy::LoopShow));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_logger_and_tracing_subscriber_coexist() {
        init_logging(true, true).unwrap();
        log::debug!("log facade still works");
        tracing::warn!(zone = 0, "tracing still works");

        // Both are global; a second install is refused instead of panicking
        assert!(init_logging(false, true).is_err());
    }

    #[test]
    fn test_parse_resolution() {
        let cli = Cli::try_parse_from(["mosaic", "resolution", "4k"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Resolution {
                resolution: Resolution::Uhd4k
            })
        ));
    }
}
