/// Output backends
///
/// The controller decides what plays where; a backend turns that into
/// sound. Channels are keyed by handle id and created on first use.
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::handle::HandleId;
use crate::error::AudioError;
use crate::library::Clip;

/// Settings a channel is started with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSettings {
    pub volume: f32,
    pub pitch: f32,
    pub looping: bool,
    pub muted: bool,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            pitch: 1.0,
            looping: false,
            muted: false,
        }
    }
}

/// The contract between the controller and the host audio subsystem.
pub trait AudioBackend {
    /// Start `clip` on the channel, replacing whatever it was playing.
    /// A `None` clip leaves the channel silent and not playing.
    fn start(
        &mut self,
        id: HandleId,
        clip: Option<&Clip>,
        settings: ChannelSettings,
    ) -> Result<(), AudioError>;

    /// Stop the channel. Stopping an idle channel does nothing.
    fn stop(&mut self, id: HandleId);

    fn set_volume(&mut self, id: HandleId, volume: f32);

    fn set_muted(&mut self, id: HandleId, muted: bool);

    /// Whether the channel still has audio to play
    fn is_playing(&self, id: HandleId) -> bool;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

impl<B: AudioBackend + ?Sized> AudioBackend for Box<B> {
    fn start(
        &mut self,
        id: HandleId,
        clip: Option<&Clip>,
        settings: ChannelSettings,
    ) -> Result<(), AudioError> {
        (**self).start(id, clip, settings)
    }

    fn stop(&mut self, id: HandleId) {
        (**self).stop(id)
    }

    fn set_volume(&mut self, id: HandleId, volume: f32) {
        (**self).set_volume(id, volume)
    }

    fn set_muted(&mut self, id: HandleId, muted: bool) {
        (**self).set_muted(id, muted)
    }

    fn is_playing(&self, id: HandleId) -> bool {
        (**self).is_playing(id)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// What the headless backend knows about one channel
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRecord {
    pub clip: Option<String>,
    pub settings: ChannelSettings,
    pub playing: bool,
    pub starts: u32,
}

#[derive(Debug, Default)]
struct HeadlessState {
    channels: HashMap<HandleId, ChannelRecord>,
    fail_starts: bool,
}

/// Backend without audio output
///
/// Records channel state so headless hosts and tests can observe what would
/// be playing. Clones share state: keep one clone to inspect channels or to
/// end playback with [`HeadlessBackend::finish`].
#[derive(Debug, Clone, Default)]
pub struct HeadlessBackend {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel(&self, id: HandleId) -> Option<ChannelRecord> {
        self.state.lock().channels.get(&id).cloned()
    }

    /// End playback on a channel as if its clip ran out
    pub fn finish(&self, id: HandleId) {
        if let Some(channel) = self.state.lock().channels.get_mut(&id) {
            channel.playing = false;
        }
    }

    /// End playback on every channel
    pub fn finish_all(&self) {
        for channel in self.state.lock().channels.values_mut() {
            channel.playing = false;
        }
    }

    pub fn playing_count(&self) -> usize {
        self.state
            .lock()
            .channels
            .values()
            .filter(|c| c.playing)
            .count()
    }

    /// Make every following `start` fail, to exercise degraded paths
    pub fn set_fail_starts(&self, fail: bool) {
        self.state.lock().fail_starts = fail;
    }
}

impl AudioBackend for HeadlessBackend {
    fn start(
        &mut self,
        id: HandleId,
        clip: Option<&Clip>,
        settings: ChannelSettings,
    ) -> Result<(), AudioError> {
        let mut state = self.state.lock();
        let failing = state.fail_starts;

        let channel = state.channels.entry(id).or_insert_with(|| ChannelRecord {
            clip: None,
            settings,
            playing: false,
            starts: 0,
        });
        channel.clip = clip.map(|c| c.name().to_string());
        channel.settings = settings;
        channel.starts += 1;
        channel.playing = !failing && clip.is_some();

        if failing {
            return Err(AudioError::PlaybackFailed(
                format!("headless start refused for channel {id}").into(),
            ));
        }
        Ok(())
    }

    fn stop(&mut self, id: HandleId) {
        if let Some(channel) = self.state.lock().channels.get_mut(&id) {
            channel.playing = false;
        }
    }

    fn set_volume(&mut self, id: HandleId, volume: f32) {
        if let Some(channel) = self.state.lock().channels.get_mut(&id) {
            channel.settings.volume = volume;
        }
    }

    fn set_muted(&mut self, id: HandleId, muted: bool) {
        if let Some(channel) = self.state.lock().channels.get_mut(&id) {
            channel.settings.muted = muted;
        }
    }

    fn is_playing(&self, id: HandleId) -> bool {
        self.state
            .lock()
            .channels
            .get(&id)
            .map(|c| c.playing)
            .unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "headless"
    }
}
