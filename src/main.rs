//! Mosaic CLI - Signage Layout Editor
//!
//! Command-line interface for editing and previewing multi-zone layouts.

use clap::Parser;
use log::info;

use mosaic::cli::commands;
use mosaic::cli::{init_logging, Cli, Commands};
use mosaic::layout::ZonePatch;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.trace)?;

    info!("Mosaic Layout Editor v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(&cli.workspace, cmd),
        None => {
            println!("Mosaic Layout Editor v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(workspace: &std::path::Path, cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Init { config, force } => commands::init(workspace, config.as_deref(), force),
        Commands::AddZone {
            x,
            y,
            width,
            height,
        } => commands::add_zone(
            workspace,
            ZonePatch {
                x,
                y,
                width,
                height,
            },
        ),
        Commands::RemoveZone { zone } => commands::remove_zone(workspace, &zone),
        Commands::Drag { zone, x, y } => commands::drag(workspace, &zone, x, y),
        Commands::Resize {
            zone,
            width,
            height,
            x,
            y,
        } => commands::resize(workspace, &zone, width, height, x, y),
        Commands::Attach {
            zone,
            media,
            duration,
        } => commands::attach(workspace, &zone, &media, duration),
        Commands::Drop {
            zone,
            media_id,
            media_type,
            catalog,
        } => commands::drop_media(workspace, &zone, &media_id, media_type, &catalog),
        Commands::Detach { zone, index } => commands::detach(workspace, &zone, index),
        Commands::SetDuration {
            zone,
            index,
            seconds,
        } => commands::set_duration(workspace, &zone, index, seconds),
        Commands::Resolution { resolution } => commands::set_resolution(workspace, resolution),
        Commands::Save { name } => commands::save(workspace, &name),
        Commands::Load { layout } => commands::load(workspace, &layout),
        Commands::Delete { layout } => commands::delete(workspace, &layout),
        Commands::List => commands::list(workspace),
        Commands::Show { layout } => commands::show(workspace, layout.as_deref()),
        Commands::Thumbnail { layout } => commands::thumbnail(workspace, &layout),
        Commands::Undo => commands::undo(workspace),
        Commands::Redo => commands::redo(workspace),
        Commands::History => commands::history(workspace),
        Commands::Preview {
            layout,
            until,
            loop_policy,
            realtime,
        } => commands::preview(workspace, layout.as_deref(), until, loop_policy, realtime),
    }
}
