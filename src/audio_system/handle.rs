/// Playback handles
///
/// A handle is one reusable output channel. The pool owns every handle;
/// callers only ever see a [`StreamHandle`], which names a handle together
/// with the acquisition it belongs to.
use std::fmt;

use super::source::AudioCategory;
use crate::library::Clip;

/// Index of a handle inside the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(usize);

impl HandleId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// Free for the next acquisition
    Idle,

    /// Borrowed by a stream
    Playing,

    /// Borrowed by a stream that is ramping down to silence
    Fading,
}

/// Caller-controlled reference to a playing stream
///
/// Stays valid until the stream ends. Once the underlying handle is reused
/// the generation no longer matches and every operation through this value
/// becomes a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamHandle {
    id: HandleId,
    category: AudioCategory,
    generation: u64,
}

impl StreamHandle {
    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn category(&self) -> AudioCategory {
        self.category
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Display for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stream {}/{}", self.category, self.id, self.generation)
    }
}

/// One reusable output channel
#[derive(Debug, Clone)]
pub struct PlaybackHandle {
    id: HandleId,
    generation: u64,
    state: HandleState,
    category: AudioCategory,
    clip: Option<Clip>,
    looping: bool,
    muted: bool,
    gain: f32,
    level: f32,
    fade: f32,
    pitch: f32,
}

impl PlaybackHandle {
    pub(crate) fn new(id: HandleId) -> Self {
        Self {
            id,
            generation: 0,
            state: HandleState::Idle,
            category: AudioCategory::Sound,
            clip: None,
            looping: false,
            muted: false,
            gain: 1.0,
            level: 1.0,
            fade: 1.0,
            pitch: 1.0,
        }
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> HandleState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == HandleState::Idle
    }

    pub fn category(&self) -> AudioCategory {
        self.category
    }

    pub fn clip(&self) -> Option<&Clip> {
        self.clip.as_ref()
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Per-call volume multiplier
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Remaining fraction of the fade-out ramp (1.0 when not fading)
    pub fn fade(&self) -> f32 {
        self.fade
    }

    /// Effective output volume: category level x gain x fade
    pub fn volume(&self) -> f32 {
        (self.level * self.gain * self.fade).clamp(0.0, 1.0)
    }

    pub fn stream(&self) -> StreamHandle {
        StreamHandle {
            id: self.id,
            category: self.category,
            generation: self.generation,
        }
    }

    /// Whether `stream` refers to the current, still active use of this handle
    pub fn matches(&self, stream: &StreamHandle) -> bool {
        !self.is_idle()
            && self.generation == stream.generation
            && self.category == stream.category
    }

    pub(crate) fn begin(&mut self) {
        self.generation += 1;
        self.state = HandleState::Playing;
        self.clip = None;
        self.fade = 1.0;
    }

    /// Category defaults applied right after acquisition
    pub(crate) fn apply_defaults(&mut self, category: AudioCategory, level: f32, muted: bool) {
        self.category = category;
        self.looping = category.loops();
        self.muted = muted;
        self.clip = None;
        self.gain = 1.0;
        self.level = level;
        self.fade = 1.0;
        self.pitch = 1.0;
    }

    pub(crate) fn set_clip(&mut self, clip: Option<Clip>) {
        self.clip = clip;
    }

    pub(crate) fn set_gain(&mut self, gain: f32) {
        self.gain = if gain.is_nan() { 1.0 } else { gain.clamp(0.0, 1.0) };
    }

    pub(crate) fn set_pitch(&mut self, pitch: f32) {
        self.pitch = if pitch.is_finite() && pitch > 0.0 { pitch } else { 1.0 };
    }

    pub(crate) fn set_level(&mut self, level: f32) {
        self.level = level;
    }

    pub(crate) fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub(crate) fn set_fade(&mut self, fade: f32) {
        self.fade = fade.clamp(0.0, 1.0);
        if self.state != HandleState::Idle {
            self.state = HandleState::Fading;
        }
    }

    pub(crate) fn reset(&mut self) {
        self.state = HandleState::Idle;
        self.clip = None;
        self.fade = 1.0;
    }
}
