/// Audio controller
///
/// The single entry point for playback. Combines the handle pool, the
/// active-stream registry, fade scheduling, category volumes and the stored
/// sound/music preferences into named operations.
///
/// The controller is driven from the caller's frame loop: everything
/// happens synchronously on `&mut self`, and [`AudioController::tick`]
/// advances fades and reclaims streams whose clip ran out.
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::backend::{AudioBackend, ChannelSettings};
use super::effects::{CategoryVolumes, FadeScheduler};
use super::handle::{HandleId, PlaybackHandle, StreamHandle};
use super::pool::HandlePool;
use super::registry::StreamRegistry;
use super::source::AudioCategory;
use crate::config::{Config, DisablePolicy};
use crate::error::AudioError;
use crate::library::ClipResolver;
use crate::messaging::{AudioEvent, EventBus};
use crate::preferences::{Preferences, SettingsStore};

pub struct AudioController {
    backend: Box<dyn AudioBackend>,
    resolver: Box<dyn ClipResolver>,
    settings: Box<dyn SettingsStore>,
    pool: HandlePool,
    registry: StreamRegistry,
    fades: FadeScheduler,
    volumes: CategoryVolumes,
    preferences: Preferences,
    disable_policy: DisablePolicy,
    events: EventBus,
    rng: StdRng,
}

impl AudioController {
    /// Build a controller and load the stored preferences
    pub fn new(
        config: &Config,
        backend: impl AudioBackend + 'static,
        resolver: impl ClipResolver + 'static,
        settings: impl SettingsStore + 'static,
    ) -> Self {
        let mut settings: Box<dyn SettingsStore> = Box::new(settings);
        let preferences = Preferences::load(settings.as_mut());

        tracing::info!(
            "Audio controller ready on {} backend (sound={}, music={}, disable policy={:?})",
            backend.name(),
            preferences.sound_enabled,
            preferences.music_enabled,
            config.disable_policy
        );

        Self {
            backend: Box::new(backend),
            resolver: Box::new(resolver),
            settings,
            pool: HandlePool::new(),
            registry: StreamRegistry::new(),
            fades: FadeScheduler::new(),
            volumes: CategoryVolumes::new(config.sound_volume, config.music_volume),
            preferences,
            disable_policy: config.disable_policy,
            events: EventBus::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Use a fixed seed for random music selection
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    //------------------------------------------------------------------
    // Queries
    //------------------------------------------------------------------

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    pub fn is_enabled(&self, category: AudioCategory) -> bool {
        self.preferences.is_enabled(category)
    }

    pub fn volume(&self, category: AudioCategory) -> f32 {
        self.volumes.get(category)
    }

    pub fn disable_policy(&self) -> DisablePolicy {
        self.disable_policy
    }

    pub fn pool(&self) -> &HandlePool {
        &self.pool
    }

    pub fn registry(&self) -> &StreamRegistry {
        &self.registry
    }

    pub fn active_count(&self, category: AudioCategory) -> usize {
        self.registry.len(category)
    }

    /// Clip names available in a category
    pub fn clip_names(&self, category: AudioCategory) -> Vec<String> {
        self.resolver.names(category)
    }

    /// The handle behind a stream, while the stream is current
    pub fn handle(&self, stream: &StreamHandle) -> Option<&PlaybackHandle> {
        self.pool.resolve(stream)
    }

    /// Whether the stream is still registered and producing audio
    pub fn is_playing(&self, stream: &StreamHandle) -> bool {
        self.pool.resolve(stream).is_some()
            && self.registry.contains(stream.id(), stream.category())
            && self.backend.is_playing(stream.id())
    }

    pub fn is_fading(&self, stream: &StreamHandle) -> bool {
        self.pool.resolve(stream).is_some() && self.fades.is_fading(stream.id())
    }

    //------------------------------------------------------------------
    // Playback
    //------------------------------------------------------------------

    /// Play a one-shot sound effect
    pub fn play_sound(&mut self, clip: &str, volume_percentage: f32, pitch: f32) {
        self.play(clip, AudioCategory::Sound, volume_percentage, pitch);
    }

    /// Play a looping music track
    pub fn play_music(&mut self, clip: &str, volume_percentage: f32) {
        self.play(clip, AudioCategory::Music, volume_percentage, 1.0);
    }

    /// Play a sound effect and keep a handle to stop it later
    pub fn play_smart_sound(&mut self, clip: &str, volume_percentage: f32, pitch: f32) -> StreamHandle {
        self.play(clip, AudioCategory::Sound, volume_percentage, pitch)
    }

    /// Play a music track and keep a handle to stop it later
    pub fn play_smart_music(&mut self, clip: &str, volume_percentage: f32, pitch: f32) -> StreamHandle {
        self.play(clip, AudioCategory::Music, volume_percentage, pitch)
    }

    /// Play a music track chosen uniformly at random from the library
    pub fn play_random_music(&mut self) -> Result<StreamHandle, AudioError> {
        let names = self.resolver.names(AudioCategory::Music);
        let Some(name) = names.choose(&mut self.rng).cloned() else {
            tracing::warn!("Random music requested but no music clips are available");
            return Err(AudioError::NoMusicAvailable {
                folder: AudioCategory::Music.folder().to_string(),
            });
        };

        tracing::info!("Picked random music: {} (of {})", name, names.len());
        Ok(self.play(&name, AudioCategory::Music, 1.0, 1.0))
    }

    fn play(&mut self, name: &str, category: AudioCategory, gain: f32, pitch: f32) -> StreamHandle {
        let clip = self.resolver.resolve(name, category);
        if clip.is_none() {
            tracing::error!("[AudioController]: {} clip not found: {}", category, name);
            self.events.publish(AudioEvent::ClipMissing {
                name: name.to_string(),
                category,
            });
        }

        self.collect_finished();

        let level = self.volumes.get(category);
        let muted = !self.preferences.is_enabled(category);

        let handle = self.pool.acquire_handle();
        handle.apply_defaults(category, level, muted);
        handle.set_clip(clip);
        handle.set_gain(gain);
        handle.set_pitch(pitch);

        let id = handle.id();
        let stream = handle.stream();
        let settings = ChannelSettings {
            volume: handle.volume(),
            pitch: handle.pitch(),
            looping: handle.is_looping(),
            muted: handle.is_muted(),
        };

        if let Err(e) = self.backend.start(id, handle.clip(), settings) {
            tracing::warn!("Failed to start {} on {}: {}", name, id, e);
        }

        let clip_name = handle.clip().map(|c| c.name().to_string());
        self.registry.add(id, category);

        tracing::debug!(
            "Playing {} as {} (volume={:.2}, pitch={:.2}, muted={})",
            name,
            stream,
            settings.volume,
            settings.pitch,
            settings.muted
        );
        self.events.publish(AudioEvent::StreamStarted {
            stream,
            clip: clip_name,
        });

        stream
    }

    //------------------------------------------------------------------
    // Stopping
    //------------------------------------------------------------------

    /// Stop a stream, immediately or with a linear fade-out.
    ///
    /// Stopping a stream that already ended (or whose handle has been
    /// reused) does nothing. Stopping a fading stream again restarts the
    /// fade from its current level; a zero fade stops it on the spot.
    pub fn stop_stream(&mut self, stream: StreamHandle, fade: Duration) {
        let id = stream.id();
        let category = stream.category();

        let Some(handle) = self.pool.resolve(&stream) else {
            tracing::debug!("Ignoring stop for stale {}", stream);
            return;
        };
        if !self.registry.contains(id, category) {
            return;
        }

        if fade.is_zero() {
            self.stop_now(id, category, false);
            return;
        }

        let start = handle.fade();
        if self.fades.schedule(id, fade, start) {
            tracing::debug!("Restarted fade-out of {} over {:?}", stream, fade);
        } else {
            tracing::debug!("Fading out {} over {:?}", stream, fade);
        }
        if let Some(handle) = self.pool.get_mut(id) {
            handle.set_fade(start);
        }
    }

    /// Stop every active sound immediately
    pub fn release_sounds(&mut self) -> usize {
        self.release_all(AudioCategory::Sound)
    }

    /// Stop every active music track immediately
    pub fn release_music(&mut self) -> usize {
        self.release_all(AudioCategory::Music)
    }

    /// Stop every active stream of a category immediately, cancelling fades
    pub fn release_all(&mut self, category: AudioCategory) -> usize {
        let ids = self.registry.take_all(category);
        for id in &ids {
            self.fades.cancel(*id);
            self.backend.stop(*id);
            let stream = self.pool.get(*id).map(PlaybackHandle::stream);
            self.pool.release(*id);
            if let Some(stream) = stream {
                self.events.publish(AudioEvent::StreamStopped {
                    stream,
                    faded: false,
                });
            }
        }

        if !ids.is_empty() {
            tracing::debug!("Released {} {} stream(s)", ids.len(), category);
        }
        ids.len()
    }

    /// Stop everything
    pub fn stop_all(&mut self) {
        for category in AudioCategory::ALL {
            self.release_all(category);
        }
    }

    fn stop_now(&mut self, id: HandleId, category: AudioCategory, faded: bool) {
        self.fades.cancel(id);
        self.backend.stop(id);
        self.registry.remove(id, category);

        let stream = self.pool.get(id).map(PlaybackHandle::stream);
        self.pool.release(id);

        if let Some(stream) = stream {
            self.events.publish(AudioEvent::StreamStopped { stream, faded });
        }
    }

    //------------------------------------------------------------------
    // Preferences and volume
    //------------------------------------------------------------------

    pub fn turn_on_sound(&mut self) {
        self.set_enabled(AudioCategory::Sound, true);
    }

    pub fn turn_off_sound(&mut self) {
        self.set_enabled(AudioCategory::Sound, false);
    }

    pub fn turn_on_music(&mut self) {
        self.set_enabled(AudioCategory::Music, true);
    }

    pub fn turn_off_music(&mut self) {
        self.set_enabled(AudioCategory::Music, false);
    }

    /// Switch a category on or off and persist the choice.
    ///
    /// Switching on unmutes the category's live streams. Switching off
    /// stops or mutes them according to the configured [`DisablePolicy`].
    pub fn set_enabled(&mut self, category: AudioCategory, enabled: bool) {
        self.preferences.set_enabled(category, enabled);
        if let Err(e) = self.preferences.save(self.settings.as_mut()) {
            tracing::warn!("Failed to save audio preferences: {}", e);
        }

        if enabled {
            self.set_category_muted(category, false);
        } else {
            match self.disable_policy {
                DisablePolicy::Stop => {
                    self.release_all(category);
                }
                DisablePolicy::Mute => self.set_category_muted(category, true),
            }
        }

        tracing::info!(
            "{} turned {}",
            category,
            if enabled { "on" } else { "off" }
        );
        self.events
            .publish(AudioEvent::CategoryToggled { category, enabled });
    }

    fn set_category_muted(&mut self, category: AudioCategory, muted: bool) {
        for id in self.registry.active(category) {
            if let Some(handle) = self.pool.get_mut(*id) {
                handle.set_muted(muted);
            }
            self.backend.set_muted(*id, muted);
        }
    }

    /// Set a category's volume (clamped to 0.0-1.0) and apply it to every
    /// active stream of that category. Returns the stored level.
    pub fn set_volume(&mut self, category: AudioCategory, volume: f32) -> f32 {
        let level = self.volumes.set(category, volume);

        for id in self.registry.active(category) {
            if let Some(handle) = self.pool.get_mut(*id) {
                handle.set_level(level);
                self.backend.set_volume(*id, handle.volume());
            }
        }

        tracing::debug!("{} volume set to {:.2}", category, level);
        self.events.publish(AudioEvent::VolumeChanged {
            category,
            volume: level,
        });
        level
    }

    //------------------------------------------------------------------
    // Frame update
    //------------------------------------------------------------------

    /// Advance fades by `dt` and reclaim streams that ended on their own
    pub fn tick(&mut self, dt: Duration) {
        let step = self.fades.advance(dt);

        for (id, level) in step.updated {
            if let Some(handle) = self.pool.get_mut(id) {
                handle.set_fade(level);
                self.backend.set_volume(id, handle.volume());
            }
        }

        for id in step.finished {
            if let Some(handle) = self.pool.get_mut(id) {
                handle.set_fade(0.0);
            }
            self.backend.set_volume(id, 0.0);

            match self.registry.category_of(id) {
                Some(category) => self.stop_now(id, category, true),
                None => {
                    self.backend.stop(id);
                    self.pool.release(id);
                }
            }
        }

        self.collect_finished();
    }

    /// Reclaim registered streams whose backend channel has gone quiet
    fn collect_finished(&mut self) -> usize {
        let mut finished = Vec::new();
        for category in AudioCategory::ALL {
            for id in self.registry.active(category) {
                if !self.backend.is_playing(*id) {
                    finished.push((*id, category));
                }
            }
        }

        for (id, category) in &finished {
            self.fades.cancel(*id);
            self.registry.remove(*id, *category);
            let stream = self.pool.get(*id).map(PlaybackHandle::stream);
            self.pool.release(*id);
            if let Some(stream) = stream {
                tracing::debug!("{} ended", stream);
                self.events.publish(AudioEvent::StreamEnded { stream });
            }
        }

        finished.len()
    }
}

impl std::fmt::Debug for AudioController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioController")
            .field("backend", &self.backend.name())
            .field("pool", &self.pool.len())
            .field("sounds", &self.registry.len(AudioCategory::Sound))
            .field("music", &self.registry.len(AudioCategory::Music))
            .field("preferences", &self.preferences)
            .finish()
    }
}
