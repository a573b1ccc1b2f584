/// Category volume levels
///
/// Each category has one absolute level; per-call gains multiply into it.
use crate::audio_system::source::AudioCategory;

/// Volume level clamped to 0.0-1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeEffect {
    level: f32,
}

impl VolumeEffect {
    pub fn new(level: f32) -> Self {
        Self {
            level: clamp_level(level),
        }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn set_level(&mut self, level: f32) {
        self.level = clamp_level(level);
    }

    pub fn is_silent(&self) -> bool {
        self.level == 0.0
    }
}

impl Default for VolumeEffect {
    fn default() -> Self {
        Self { level: 1.0 }
    }
}

fn clamp_level(level: f32) -> f32 {
    // NaN compares false everywhere; treat it as silence
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

/// Levels for both categories
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CategoryVolumes {
    sound: VolumeEffect,
    music: VolumeEffect,
}

impl CategoryVolumes {
    pub fn new(sound: f32, music: f32) -> Self {
        Self {
            sound: VolumeEffect::new(sound),
            music: VolumeEffect::new(music),
        }
    }

    pub fn get(&self, category: AudioCategory) -> f32 {
        match category {
            AudioCategory::Sound => self.sound.level(),
            AudioCategory::Music => self.music.level(),
        }
    }

    /// Store a new level and return the clamped value
    pub fn set(&mut self, category: AudioCategory, level: f32) -> f32 {
        let volume = match category {
            AudioCategory::Sound => &mut self.sound,
            AudioCategory::Music => &mut self.music,
        };
        volume.set_level(level);
        volume.level()
    }
}
