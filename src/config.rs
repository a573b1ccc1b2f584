use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// What happens to live streams when their category is switched off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisablePolicy {
    /// Stop and release every active stream of the category
    #[default]
    Stop,

    /// Keep streams running but muted
    Mute,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Folder containing `Audio/Sound` and `Audio/Music`
    pub resource_root: PathBuf,

    /// Preferences file; `None` uses the platform config directory
    pub preferences_path: Option<PathBuf>,

    /// Behaviour of `turn_off_sound` / `turn_off_music`
    pub disable_policy: DisablePolicy,

    /// Initial sound volume (0.0-1.0)
    pub sound_volume: f32,

    /// Initial music volume (0.0-1.0)
    pub music_volume: f32,

    /// How often the CLI ticks the controller
    pub tick_rate_hz: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resource_root: PathBuf::from("Resources"),
            preferences_path: None,
            disable_policy: DisablePolicy::Stop,
            sound_volume: 1.0,
            music_volume: 1.0,
            tick_rate_hz: 60,
        }
    }
}

impl Config {
    /// Load configuration from the platform-specific config directory.
    /// Creates default config if file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoConfigDir)?;
        Self::load_or_create(&path)
    }

    /// Load configuration from `path`, writing defaults there if it is missing
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load_from(path)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            tracing::info!("Created default config at: {}", path.display());
            Ok(config)
        }
    }

    /// Load configuration from an existing file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let load_err = |e: Box<dyn std::error::Error + Send + Sync>| ConfigError::LoadFailed {
            path: path.display().to_string(),
            source: e,
        };

        let content = fs::read_to_string(path).map_err(|e| load_err(Box::new(e)))?;
        let mut config: Config = serde_json::from_str(&content).map_err(|e| load_err(Box::new(e)))?;
        config.normalize()?;

        tracing::info!("Loaded config from: {}", path.display());
        Ok(config)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_err = |e: Box<dyn std::error::Error + Send + Sync>| ConfigError::SaveFailed {
            path: path.display().to_string(),
            source: e,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| save_err(Box::new(e)))?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| save_err(Box::new(e)))?;
        fs::write(path, json).map_err(|e| save_err(Box::new(e)))?;

        Ok(())
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("AudioController").join("config.json"))
    }

    /// Resolve the preferences file, falling back to the platform config directory
    pub fn preferences_file(&self) -> Option<PathBuf> {
        self.preferences_path
            .clone()
            .or_else(|| dirs::config_dir().map(|dir| dir.join("AudioController").join("preferences.json")))
    }

    /// Interval between controller ticks
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate_hz.max(1)))
    }

    fn normalize(&mut self) -> Result<(), ConfigError> {
        if self.tick_rate_hz == 0 || self.tick_rate_hz > 1000 {
            return Err(ConfigError::Invalid(format!(
                "tick_rate_hz must be 1-1000, got {}",
                self.tick_rate_hz
            )));
        }

        if !(0.0..=1.0).contains(&self.sound_volume) || !(0.0..=1.0).contains(&self.music_volume) {
            tracing::warn!(
                "Clamping configured volumes (sound={}, music={}) to 0.0-1.0",
                self.sound_volume,
                self.music_volume
            );
        }
        self.sound_volume = clamp_volume(self.sound_volume);
        self.music_volume = clamp_volume(self.music_volume);

        Ok(())
    }
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        1.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}
