use crate::error::{AppError, Result};
use crate::surface::{ColorMode, RenderMode};
use crate::transport::DEFAULT_PHOTO_INTERVAL;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One layer of settings: the config file or the command line.
/// All fields are optional. CLI flags override config, config overrides defaults.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Photo files, in display order
    pub photos: Option<Vec<String>>,
    /// Base directory for photos; scanned when no list is given
    pub photos_dir: Option<PathBuf>,
    /// Track length in seconds
    pub duration: Option<f64>,
    /// Seconds between photo changes while playing
    pub interval: Option<f64>,
    /// Render mode
    pub render: Option<RenderMode>,
    /// Color mode
    pub color: Option<ColorMode>,
    /// Target FPS (1-120)
    pub fps: Option<u32>,
    /// Hide status bar
    pub clean: Option<bool>,
    /// Start playing immediately
    pub autoplay: Option<bool>,
    /// Seed for the particle field (random when unset)
    pub seed: Option<u64>,
}

impl Config {
    /// Fill every unset field of `self` from `fallback`.
    pub fn or(self, fallback: Config) -> Config {
        Config {
            photos: self.photos.or(fallback.photos),
            photos_dir: self.photos_dir.or(fallback.photos_dir),
            duration: self.duration.or(fallback.duration),
            interval: self.interval.or(fallback.interval),
            render: self.render.or(fallback.render),
            color: self.color.or(fallback.color),
            fps: self.fps.or(fallback.fps),
            clean: self.clean.or(fallback.clean),
            autoplay: self.autoplay.or(fallback.autoplay),
            seed: self.seed.or(fallback.seed),
        }
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub photos: Vec<String>,
    pub photos_dir: Option<PathBuf>,
    pub duration: f64,
    pub interval: f64,
    pub render: RenderMode,
    pub color: ColorMode,
    pub fps: u32,
    pub clean: bool,
    pub autoplay: bool,
    pub seed: Option<u64>,
}

/// Track length used when none is configured: 3:40.
pub const DEFAULT_DURATION: f64 = 220.0;
pub const DEFAULT_FPS: u32 = 30;

impl Settings {
    /// Layer CLI over file over defaults.
    pub fn resolve(cli: Config, file: Config) -> Settings {
        let c = cli.or(file);
        Settings {
            photos: c.photos.unwrap_or_default(),
            photos_dir: c.photos_dir,
            duration: c.duration.unwrap_or(DEFAULT_DURATION),
            interval: c.interval.unwrap_or(DEFAULT_PHOTO_INTERVAL),
            render: c.render.unwrap_or(RenderMode::HalfBlock),
            color: c.color.unwrap_or(ColorMode::TrueColor),
            fps: c.fps.unwrap_or(DEFAULT_FPS).clamp(1, 120),
            clean: c.clean.unwrap_or(false),
            autoplay: c.autoplay.unwrap_or(false),
            seed: c.seed,
        }
    }
}

/// Get the config file path: ~/.config/heartreel/config.toml
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("heartreel").join("config.toml"))
}

/// Parse config text read from `path`.
pub fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    toml::from_str(contents).map_err(|source| AppError::Config {
        path: path.to_path_buf(),
        source,
    })
}

/// Load config from file. A missing file gives the defaults; a broken one
/// is reported and ignored.
pub fn load_config() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let Ok(contents) = std::fs::read_to_string(&path) else {
        return Config::default();
    };
    match parse_config(&contents, &path) {
        Ok(config) => config,
        Err(e) => {
            warn!("{e}");
            eprintln!("Warning: {e}");
            Config::default()
        }
    }
}

/// Generate a default config file with all options commented out
pub fn default_config_string() -> String {
    r#"# heartreel configuration
# Use --show-config to see the active config file path.
# CLI flags override these settings.

# Photo files, in display order (relative to photos_dir when it is set)
# photos = ["beach.png", "dinner.png", "sunset.png"]

# Directory holding the photos, scanned for .png/.jpg/.jpeg/.gif/.bmp files
# when no list is given
# photos_dir = "/home/me/Pictures/trip"

# Track length in seconds
# duration = 220

# Seconds between photo changes while playing
# interval = 4

# Render mode: half-block, braille
# render = "half-block"

# Color mode: mono, ansi16, ansi256, true-color
# color = "true-color"

# Target FPS (1-120)
# fps = 30

# Hide status bar
# clean = false

# Start playing immediately
# autoplay = false

# Fixed seed for the heart field
# seed = 42
"#
    .to_string()
}
