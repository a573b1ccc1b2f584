/// Sound and music preferences
///
/// Two booleans stored as strings in a key/value settings store. They are
/// read once when the controller starts and written back on every toggle.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::audio_system::AudioCategory;
use crate::error::PreferencesError;

pub const AUDIO_SETTING_SOUND: &str = "Audio_Sound";
pub const AUDIO_SETTING_MUSIC: &str = "Audio_Music";

/// Key/value persistence for string settings
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferencesError>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Settings kept in memory only
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    values: BTreeMap<String, String>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferencesError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Settings persisted as a flat JSON object, rewritten on every change
#[derive(Debug)]
pub struct JsonSettingsStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonSettingsStore {
    /// Open the store at `path`. A missing file starts an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PreferencesError> {
        let path = path.into();

        let values = if path.exists() {
            let read_err = |e: Box<dyn std::error::Error + Send + Sync>| PreferencesError::ReadFailed {
                path: path.display().to_string(),
                source: e,
            };
            let json = std::fs::read_to_string(&path).map_err(|e| read_err(Box::new(e)))?;
            let values: BTreeMap<String, String> =
                serde_json::from_str(&json).map_err(|e| read_err(Box::new(e)))?;
            tracing::debug!("Loaded {} setting(s) from: {}", values.len(), path.display());
            values
        } else {
            tracing::debug!("No settings file at {}, starting fresh", path.display());
            BTreeMap::new()
        };

        Ok(Self { path, values })
    }

    /// Default location in the platform config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("AudioController").join("preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), PreferencesError> {
        let write_err = |e: Box<dyn std::error::Error + Send + Sync>| PreferencesError::WriteFailed {
            path: self.path.display().to_string(),
            source: e,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_err(Box::new(e)))?;
        }

        let json = serde_json::to_string_pretty(&self.values).map_err(|e| write_err(Box::new(e)))?;
        std::fs::write(&self.path, json).map_err(|e| write_err(Box::new(e)))?;

        Ok(())
    }
}

impl SettingsStore for JsonSettingsStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferencesError> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }
}

/// Encode a boolean the way the settings file stores it
pub fn encode_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Decode a stored boolean, ignoring case and surrounding whitespace
pub fn decode_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Whether each category is switched on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub sound_enabled: bool,
    pub music_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            music_enabled: true,
        }
    }
}

impl Preferences {
    /// Load both flags. Missing keys are written back as enabled.
    pub fn load(store: &mut dyn SettingsStore) -> Self {
        Self {
            sound_enabled: load_flag(store, AUDIO_SETTING_SOUND),
            music_enabled: load_flag(store, AUDIO_SETTING_MUSIC),
        }
    }

    /// Write both flags
    pub fn save(&self, store: &mut dyn SettingsStore) -> Result<(), PreferencesError> {
        store.set(AUDIO_SETTING_SOUND, encode_bool(self.sound_enabled))?;
        store.set(AUDIO_SETTING_MUSIC, encode_bool(self.music_enabled))?;
        Ok(())
    }

    pub fn is_enabled(&self, category: AudioCategory) -> bool {
        match category {
            AudioCategory::Sound => self.sound_enabled,
            AudioCategory::Music => self.music_enabled,
        }
    }

    pub fn set_enabled(&mut self, category: AudioCategory, enabled: bool) {
        match category {
            AudioCategory::Sound => self.sound_enabled = enabled,
            AudioCategory::Music => self.music_enabled = enabled,
        }
    }
}

fn load_flag(store: &mut dyn SettingsStore, key: &str) -> bool {
    match store.get(key) {
        Some(raw) => decode_bool(&raw).unwrap_or_else(|| {
            tracing::warn!("Unreadable value {:?} for {}, assuming enabled", raw, key);
            true
        }),
        None => {
            if let Err(e) = store.set(key, encode_bool(true)) {
                tracing::warn!("Failed to store default for {}: {}", key, e);
            }
            true
        }
    }
}
