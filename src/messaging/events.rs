/// Audio events
///
/// Events describe things that have already happened to a stream or a
/// category. They are broadcast to all subscribers.
use crate::audio_system::{AudioCategory, StreamHandle};

#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    /// A stream started playing (clip is `None` when it could not be resolved)
    StreamStarted {
        stream: StreamHandle,
        clip: Option<String>,
    },

    /// A stream was stopped by a caller or by a finished fade-out
    StreamStopped { stream: StreamHandle, faded: bool },

    /// A stream's clip ran out on its own
    StreamEnded { stream: StreamHandle },

    /// A clip name could not be resolved
    ClipMissing {
        name: String,
        category: AudioCategory,
    },

    /// A category was switched on or off
    CategoryToggled {
        category: AudioCategory,
        enabled: bool,
    },

    /// A category volume changed
    VolumeChanged { category: AudioCategory, volume: f32 },
}

impl AudioEvent {
    /// The stream this event is about, if any
    pub fn stream(&self) -> Option<&StreamHandle> {
        match self {
            AudioEvent::StreamStarted { stream, .. }
            | AudioEvent::StreamStopped { stream, .. }
            | AudioEvent::StreamEnded { stream } => Some(stream),
            _ => None,
        }
    }

    pub fn category(&self) -> AudioCategory {
        match self {
            AudioEvent::StreamStarted { stream, .. }
            | AudioEvent::StreamStopped { stream, .. }
            | AudioEvent::StreamEnded { stream } => stream.category(),
            AudioEvent::ClipMissing { category, .. }
            | AudioEvent::CategoryToggled { category, .. }
            | AudioEvent::VolumeChanged { category, .. } => *category,
        }
    }
}
