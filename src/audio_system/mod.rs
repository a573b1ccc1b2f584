//! Audio system module
//!
//! Coordinates a growable pool of playback handles on top of an output
//! backend:
//! - Sound effects (one-shot) and music (looping) categories
//! - Fire-and-forget and handle-returning ("smart") playback
//! - Tick-driven linear fade-outs
//! - Per-category volume and on/off switches
//!
//! ## Architecture
//!
//! ```text
//! AudioController
//!   ├── HandlePool        reusable PlaybackHandles, grows on demand
//!   ├── StreamRegistry    active sounds / active music
//!   ├── FadeScheduler     fade-outs keyed by handle
//!   ├── CategoryVolumes   sound level, music level
//!   └── AudioBackend      rodio output, or headless
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use audio_system::{AudioController, AudioCategory};
//!
//! let mut controller = AudioController::new(&config, backend, library, settings);
//!
//! controller.play_sound("click", 1.0, 1.0);
//! let theme = controller.play_smart_music("theme", 0.8, 1.0);
//!
//! // Every frame
//! controller.tick(frame_time);
//!
//! // Fade the theme out over two seconds
//! controller.stop_stream(theme, Duration::from_secs(2));
//! ```

pub mod backend;
pub mod effects;
pub mod handle;
pub mod manager;
#[cfg(feature = "rodio-output")]
pub mod player;
pub mod pool;
pub mod registry;
pub mod source;

// Re-export commonly used types
pub use backend::{AudioBackend, ChannelSettings, HeadlessBackend};
pub use effects::{CategoryVolumes, FadeEffect, FadeScheduler, VolumeEffect};
pub use handle::{HandleId, HandleState, PlaybackHandle, StreamHandle};
pub use manager::AudioController;
#[cfg(feature = "rodio-output")]
pub use player::RodioBackend;
pub use pool::HandlePool;
pub use registry::StreamRegistry;
pub use source::AudioCategory;
