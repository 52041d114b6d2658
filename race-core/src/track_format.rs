use bevy_math::{IVec2, UVec2, Vec2};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::car::CarParams;
use crate::collision::ZoneEffect;
use crate::error::TrackError;

/// A playable track: window, physics, assets, boundaries and checkpoints.
///
/// Every field has a default, so an empty file describes the classic
/// 1600x900 grass-and-ribbon track.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TrackFile {
    /// Simulation and frame-cap frequency, ticks per second.
    #[serde(default = "default_tick_rate")]
    pub tick_rate: f32,
    /// Checkpoint centres in world pixels. Empty means no checkpoints.
    #[serde(default)]
    pub checkpoints: Vec<[f32; 2]>,
    #[serde(default)]
    pub metadata: TrackMetadata,
    #[serde(default)]
    pub window: WindowSettings,
    #[serde(default)]
    pub assets: AssetSettings,
    #[serde(default)]
    pub start: StartSettings,
    #[serde(default)]
    pub car: CarParams,
    #[serde(default = "default_boundaries")]
    pub boundaries: Vec<BoundarySpec>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TrackMetadata {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub author: String,
}

impl Default for TrackMetadata {
    fn default() -> Self {
        Self {
            name: default_name(),
            author: String::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 900,
            title: "Racing".to_string(),
        }
    }
}

impl WindowSettings {
    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct AssetSettings {
    /// Image directory, relative to the track file.
    pub dir: String,
    pub car: String,
    pub checkpoint: String,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            dir: "data".to_string(),
            car: "car.png".to_string(),
            checkpoint: "checkpoint.png".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct StartSettings {
    /// Centre of the car at spawn, world pixels.
    pub position: [f32; 2],
    /// Initial heading in degrees.
    pub angle: f32,
}

impl Default for StartSettings {
    fn default() -> Self {
        Self {
            position: [1600.0, 300.0],
            angle: 90.0,
        }
    }
}

/// One static track image drawn at `position` and stretched to `size`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BoundarySpec {
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub position: [i32; 2],
    #[serde(default = "default_boundary_size")]
    pub size: [u32; 2],
    /// Collide with the transparent part of the image instead of the opaque one.
    #[serde(default = "default_invert")]
    pub invert: bool,
    pub effect: ZoneEffect,
}

impl BoundarySpec {
    pub fn position(&self) -> IVec2 {
        IVec2::from_array(self.position)
    }

    pub fn size(&self) -> UVec2 {
        UVec2::from_array(self.size)
    }
}

impl Default for TrackFile {
    fn default() -> Self {
        Self {
            tick_rate: default_tick_rate(),
            checkpoints: Vec::new(),
            metadata: TrackMetadata::default(),
            window: WindowSettings::default(),
            assets: AssetSettings::default(),
            start: StartSettings::default(),
            car: CarParams::default(),
            boundaries: default_boundaries(),
        }
    }
}

fn default_tick_rate() -> f32 {
    60.0
}

fn default_name() -> String {
    "Untitled".to_string()
}

fn default_boundary_size() -> [u32; 2] {
    [3200, 3200]
}

fn default_invert() -> bool {
    true
}

fn default_boundaries() -> Vec<BoundarySpec> {
    vec![
        BoundarySpec {
            name: "grass".to_string(),
            image: "grass.png".to_string(),
            position: [0, 0],
            size: default_boundary_size(),
            invert: true,
            effect: ZoneEffect::Bounce,
        },
        BoundarySpec {
            name: "track".to_string(),
            image: "tr.png".to_string(),
            position: [0, 0],
            size: default_boundary_size(),
            invert: true,
            effect: ZoneEffect::Damp(0.5),
        },
    ]
}

impl TrackFile {
    /// Load and validate a track from a TOML file.
    pub fn load(path: &Path) -> Result<Self, TrackError> {
        let text = std::fs::read_to_string(path).map_err(|source| TrackError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let track: Self = toml::from_str(&text).map_err(|source| TrackError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        track.validate()?;
        Ok(track)
    }

    pub fn validate(&self) -> Result<(), TrackError> {
        if !(self.tick_rate.is_finite() && self.tick_rate > 0.0) {
            return Err(TrackError::Invalid(format!(
                "tick_rate must be positive, got {}",
                self.tick_rate
            )));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(TrackError::Invalid("window size must be non-zero".to_string()));
        }
        if self.car.max_speed.is_nan() || self.car.max_speed < 0.0 {
            return Err(TrackError::Invalid(format!(
                "car.max_speed must not be negative, got {}",
                self.car.max_speed
            )));
        }
        for boundary in &self.boundaries {
            if boundary.size.contains(&0) {
                return Err(TrackError::Invalid(format!(
                    "boundary '{}' has an empty size",
                    boundary.name
                )));
            }
            if let ZoneEffect::Damp(factor) = boundary.effect {
                if !(factor.is_finite() && factor >= 0.0) {
                    return Err(TrackError::Invalid(format!(
                        "boundary '{}' has damping factor {factor}",
                        boundary.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Image directory, resolved against the directory holding the track file.
    pub fn asset_dir(&self, track_path: &Path) -> PathBuf {
        track_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(&self.assets.dir)
    }

    /// File names of every image this track needs, relative to [`Self::asset_dir`].
    pub fn image_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.boundaries.iter().map(|b| b.image.as_str()).collect();
        if !self.checkpoints.is_empty() {
            names.push(&self.assets.checkpoint);
        }
        names.push(&self.assets.car);
        names
    }

    /// Fail with [`TrackError::MissingAsset`] on the first image that is not a file.
    pub fn check_assets(&self, track_path: &Path) -> Result<(), TrackError> {
        let dir = self.asset_dir(track_path);
        for name in self.image_names() {
            let path = dir.join(name);
            if !path.is_file() {
                return Err(TrackError::MissingAsset(path));
            }
        }
        Ok(())
    }

    pub fn start_position(&self) -> Vec2 {
        Vec2::from_array(self.start.position)
    }

    pub fn checkpoint_positions(&self) -> Vec<Vec2> {
        self.checkpoints.iter().map(|&p| Vec2::from_array(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::TrackFile;
    use crate::car::Drag;
    use crate::collision::ZoneEffect;
    use crate::error::TrackError;

    #[test]
    fn empty_file_is_the_classic_track() {
        let track: TrackFile = toml::from_str("").unwrap();
        assert_eq!(track.tick_rate, 60.0);
        assert_eq!((track.window.width, track.window.height), (1600, 900));
        assert_eq!(track.boundaries.len(), 2);
        assert_eq!(track.boundaries[0].effect, ZoneEffect::Bounce);
        assert_eq!(track.boundaries[1].effect, ZoneEffect::Damp(0.5));
        assert!(track.checkpoints.is_empty());
        assert_eq!(track.image_names(), vec!["grass.png", "tr.png", "car.png"]);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let track: TrackFile = toml::from_str(
            r#"
            checkpoints = [[10.0, 20.0], [30.0, 40.0]]

            [window]
            width = 800
            height = 600

            [car]
            max_speed = 12.0
            drag = { weight = 1000.0 }

            [[boundaries]]
            name = "track"
            image = "tr.png"
            effect = { damp = 0.9 }
            "#,
        )
        .unwrap();

        assert_eq!(track.window.title, "Racing");
        assert_eq!(track.car.acceleration, 60.0);
        assert_eq!(track.car.drag, Drag::Weight(1000.0));
        assert_eq!(track.car.drag.inertia(), 20.0);
        assert_eq!(track.boundaries.len(), 1);
        assert!(track.boundaries[0].invert);
        assert_eq!(track.boundaries[0].size, [3200, 3200]);
        assert_eq!(track.checkpoint_positions().len(), 2);
        assert_eq!(
            track.image_names(),
            vec!["tr.png", "checkpoint.png", "car.png"]
        );
    }

    #[test]
    fn rejects_non_positive_tick_rate() {
        let track: TrackFile = toml::from_str("tick_rate = 0.0").unwrap();
        assert!(matches!(track.validate(), Err(TrackError::Invalid(_))));
    }

    #[test]
    fn rejects_negative_damping() {
        let track: TrackFile = toml::from_str(
            r#"
            [[boundaries]]
            name = "track"
            image = "tr.png"
            effect = { damp = -1.0 }
            "#,
        )
        .unwrap();
        assert!(track.validate().is_err());
    }

    #[test]
    fn asset_dir_is_relative_to_the_track_file() {
        let track = TrackFile::default();
        assert_eq!(
            track.asset_dir(Path::new("racing/assets/classic.toml")),
            Path::new("racing/assets/data")
        );
    }

    #[test]
    fn missing_images_are_reported_by_path() {
        let track = TrackFile::default();
        let err = track
            .check_assets(Path::new("/nonexistent/track.toml"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "image file '/nonexistent/data/grass.png' not found"
        );
    }

    #[test]
    fn shipped_tracks_parse() {
        let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
        for name in ["classic.toml", "circuit.toml"] {
            let path = manifest.join("../racing/assets").join(name);
            let track = TrackFile::load(&path).unwrap_or_else(|e| panic!("{e}"));
            assert!(!track.boundaries.is_empty(), "{name}");
        }
    }
}
