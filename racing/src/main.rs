use std::path::PathBuf;

use bevy::{
    diagnostic::FrameTimeDiagnosticsPlugin,
    prelude::*,
    window::WindowResolution,
};
use color_eyre::eyre::WrapErr;

use race_core::track_format::TrackFile;
use racing::debug_overlay::DebugOverlayPlugin;
use racing::race_runtime::RaceRuntimePlugin;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let track_path = PathBuf::from(
        std::env::args()
            .nth(1)
            .unwrap_or_else(|| "racing/assets/classic.toml".to_string()),
    );

    let track = TrackFile::load(&track_path)?;
    // Every image must exist before the window opens.
    track.check_assets(&track_path)?;
    let asset_dir = std::path::absolute(track.asset_dir(&track_path))
        .wrap_err("Failed to resolve the asset directory")?;

    let window = Window {
        title: track.window.title.clone(),
        resolution: WindowResolution::from((track.window.width, track.window.height))
            .with_scale_factor_override(1.0),
        resizable: false,
        ..default()
    };

    let exit = App::new()
        .add_plugins((
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(window),
                    ..default()
                })
                .set(AssetPlugin {
                    file_path: asset_dir.to_string_lossy().into_owned(),
                    ..default()
                }),
            FrameTimeDiagnosticsPlugin::default(),
            RaceRuntimePlugin { track },
            DebugOverlayPlugin,
        ))
        .run();

    if let AppExit::Error(code) = exit {
        std::process::exit(i32::from(code.get()));
    }
    Ok(())
}
