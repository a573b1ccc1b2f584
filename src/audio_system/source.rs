/// Audio categories
///
/// Every clip and every playback handle belongs to exactly one category,
/// which drives its default playback settings.
use std::fmt;

use serde::{Deserialize, Serialize};

/// Audio categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCategory {
    /// One-shot sound effects
    Sound,

    /// Looping music tracks
    Music,
}

impl fmt::Display for AudioCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioCategory::Sound => write!(f, "Sound"),
            AudioCategory::Music => write!(f, "Music"),
        }
    }
}

impl AudioCategory {
    pub const ALL: [AudioCategory; 2] = [AudioCategory::Sound, AudioCategory::Music];

    /// Whether handles of this category loop by default
    pub fn loops(&self) -> bool {
        match self {
            AudioCategory::Sound => false,
            AudioCategory::Music => true,
        }
    }

    /// Resource folder relative to the resource root
    pub fn folder(&self) -> &'static str {
        match self {
            AudioCategory::Sound => "Audio/Sound",
            AudioCategory::Music => "Audio/Music",
        }
    }

    /// Parse a category from user input ("sound", "sounds", "music")
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "sound" | "sounds" | "sfx" => Some(AudioCategory::Sound),
            "music" => Some(AudioCategory::Music),
            _ => None,
        }
    }
}
