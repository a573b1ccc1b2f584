//! Audio controller for games and tools.
//!
//! Plays sound effects and music through a pool of reusable playback
//! handles, keeps per-category volume and on/off preferences, and fades
//! streams out from the caller's frame loop.
//!
//! ```rust,ignore
//! use audio_controller::{AudioController, ClipLibrary, Config, JsonSettingsStore, RodioBackend};
//!
//! let config = Config::load()?;
//! let library = ClipLibrary::scan(&config.resource_root);
//! let settings = JsonSettingsStore::open(config.preferences_file().unwrap())?;
//! let mut audio = AudioController::new(&config, RodioBackend::new()?, library, settings);
//!
//! audio.play_music("theme", 1.0);
//! loop {
//!     audio.tick(frame_time);
//! }
//! ```

pub mod audio_system;
pub mod config;
pub mod error;
pub mod library;
pub mod messaging;
pub mod preferences;
pub mod slug;

pub use audio_system::{
    AudioBackend, AudioCategory, AudioController, HandleId, HeadlessBackend, StreamHandle,
};
#[cfg(feature = "rodio-output")]
pub use audio_system::RodioBackend;
pub use config::{Config, DisablePolicy};
pub use error::{AudioError, ConfigError, PreferencesError};
pub use library::{Clip, ClipLibrary, ClipResolver, MemoryClipLibrary};
pub use messaging::{AudioEvent, EventBus};
pub use preferences::{JsonSettingsStore, MemorySettingsStore, Preferences, SettingsStore};
