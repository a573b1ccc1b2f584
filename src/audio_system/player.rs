/// rodio output backend
///
/// One `Sink` per playback handle on a shared output stream.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use super::backend::{AudioBackend, ChannelSettings};
use super::handle::HandleId;
use crate::error::AudioError;
use crate::library::Clip;

struct Channel {
    sink: Sink,
    volume: f32,
    muted: bool,
}

impl Channel {
    fn apply_volume(&self) {
        self.sink
            .set_volume(if self.muted { 0.0 } else { self.volume });
    }
}

/// Plays clips on the default output device
pub struct RodioBackend {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    channels: HashMap<HandleId, Channel>,
}

impl RodioBackend {
    /// Open the default output device
    pub fn new() -> Result<Self, AudioError> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| AudioError::StreamInitFailed(Box::new(e)))?;

        tracing::info!("Opened default audio output");

        Ok(Self {
            _stream: stream,
            stream_handle,
            channels: HashMap::new(),
        })
    }

    /// Number of channels holding a sink
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

impl AudioBackend for RodioBackend {
    fn start(
        &mut self,
        id: HandleId,
        clip: Option<&Clip>,
        settings: ChannelSettings,
    ) -> Result<(), AudioError> {
        // A fresh sink per start drops anything still queued on the old one
        if let Some(old) = self.channels.remove(&id) {
            old.sink.stop();
        }

        let Some(clip) = clip else {
            return Ok(());
        };

        let cursor = Cursor::new(Arc::clone(clip.data()));
        let decode_err = |e: rodio::decoder::DecoderError| AudioError::DecodeFailed {
            name: clip.name().to_string(),
            source: Box::new(e),
        };

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| AudioError::PlaybackFailed(Box::new(e)))?;

        if settings.looping {
            sink.append(Decoder::new_looped(cursor).map_err(decode_err)?);
        } else {
            sink.append(Decoder::new(cursor).map_err(decode_err)?);
        }

        let channel = Channel {
            sink,
            volume: settings.volume,
            muted: settings.muted,
        };
        channel.apply_volume();
        channel.sink.set_speed(settings.pitch);
        channel.sink.play();

        tracing::debug!(
            "Started {} on channel {} (volume={}, pitch={}, loop={}, muted={})",
            clip.name(),
            id,
            settings.volume,
            settings.pitch,
            settings.looping,
            settings.muted
        );

        self.channels.insert(id, channel);
        Ok(())
    }

    fn stop(&mut self, id: HandleId) {
        if let Some(channel) = self.channels.remove(&id) {
            channel.sink.stop();
            tracing::debug!("Stopped channel {}", id);
        }
    }

    fn set_volume(&mut self, id: HandleId, volume: f32) {
        if let Some(channel) = self.channels.get_mut(&id) {
            channel.volume = volume.clamp(0.0, 1.0);
            channel.apply_volume();
        }
    }

    fn set_muted(&mut self, id: HandleId, muted: bool) {
        if let Some(channel) = self.channels.get_mut(&id) {
            channel.muted = muted;
            channel.apply_volume();
        }
    }

    fn is_playing(&self, id: HandleId) -> bool {
        self.channels
            .get(&id)
            .map(|channel| !channel.sink.empty())
            .unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "rodio"
    }
}
