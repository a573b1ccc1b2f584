// Integration tests for the audio controller
// These drive the public API end to end on the headless backend

use std::fs;
use std::path::Path;
use std::time::Duration;

use audio_controller::preferences::{AUDIO_SETTING_MUSIC, AUDIO_SETTING_SOUND};
use audio_controller::{
    AudioCategory, AudioController, AudioError, AudioEvent, ClipLibrary, Config, DisablePolicy,
    HeadlessBackend, JsonSettingsStore, MemoryClipLibrary, MemorySettingsStore, Preferences,
    SettingsStore,
};
use tempfile::TempDir;

/// Helper to build a controller over in-memory clips
fn create_controller(config: &Config) -> (AudioController, HeadlessBackend) {
    let backend = HeadlessBackend::new();
    let library = MemoryClipLibrary::new()
        .with_clip(AudioCategory::Sound, "click")
        .with_clip(AudioCategory::Sound, "explosion")
        .with_clip(AudioCategory::Music, "theme")
        .with_clip(AudioCategory::Music, "credits");

    let controller = AudioController::new(
        config,
        backend.clone(),
        library,
        MemorySettingsStore::new(),
    );
    (controller, backend)
}

fn write_clip(root: &Path, category: AudioCategory, file: &str) {
    let folder = root.join(category.folder());
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join(file), file.as_bytes()).unwrap();
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

#[test]
fn test_handles_are_reused_after_release() {
    let (mut controller, backend) = create_controller(&Config::default());

    let first = controller.play_smart_sound("click", 1.0, 1.0);
    let second = controller.play_smart_sound("click", 1.0, 1.0);
    let third = controller.play_smart_sound("click", 1.0, 1.0);
    assert_eq!(controller.pool().len(), 3);

    controller.stop_stream(second, Duration::ZERO);
    assert_eq!(controller.pool().idle_count(), 1);
    assert!(!backend.channel(second.id()).unwrap().playing);

    // Next acquisition takes the freed handle without growing the pool
    let fourth = controller.play_smart_sound("explosion", 1.0, 1.0);
    assert_eq!(fourth.id(), second.id());
    assert_ne!(fourth, second);
    assert_eq!(controller.pool().len(), 3);

    assert!(controller.is_playing(&first));
    assert!(controller.is_playing(&third));
    assert!(controller.is_playing(&fourth));
    assert!(!controller.is_playing(&second));
}

#[test]
fn test_pool_never_exceeds_concurrent_peak() {
    let (mut controller, backend) = create_controller(&Config::default());

    for _ in 0..5 {
        for _ in 0..4 {
            controller.play_sound("click", 1.0, 1.0);
        }
        backend.finish_all();
        controller.tick(Duration::from_millis(16));
    }

    assert_eq!(controller.pool().len(), 4);
    assert!(controller.registry().is_empty());
}

#[test]
fn test_zero_fade_stops_synchronously() {
    let (mut controller, backend) = create_controller(&Config::default());
    let (events, _id) = controller.events().subscribe();

    let stream = controller.play_smart_music("theme", 1.0, 1.0);
    controller.stop_stream(stream, Duration::ZERO);

    assert!(!controller.is_playing(&stream));
    assert_eq!(controller.active_count(AudioCategory::Music), 0);
    assert_eq!(backend.playing_count(), 0);

    let received: Vec<_> = events.try_iter().collect();
    assert!(received.contains(&AudioEvent::StreamStopped {
        stream,
        faded: false
    }));
}

#[test]
fn test_fade_ramps_down_and_releases() {
    let (mut controller, backend) = create_controller(&Config::default());
    let (events, _id) = controller.events().subscribe();

    let stream = controller.play_smart_music("theme", 0.8, 1.0);
    controller.stop_stream(stream, Duration::from_secs(1));
    assert!(controller.is_fading(&stream));
    assert!(controller.is_playing(&stream));

    controller.tick(Duration::from_millis(500));
    let handle = controller.handle(&stream).unwrap();
    assert!(approx(handle.fade(), 0.5));
    assert!(approx(backend.channel(stream.id()).unwrap().settings.volume, 0.4));

    // Overshooting the fade finishes it within a single tick
    controller.tick(Duration::from_millis(600));
    assert!(!controller.is_playing(&stream));
    assert!(!controller.is_fading(&stream));
    assert!(controller.handle(&stream).is_none());
    assert_eq!(controller.pool().idle_count(), 1);

    let channel = backend.channel(stream.id()).unwrap();
    assert!(!channel.playing);
    assert_eq!(channel.settings.volume, 0.0);

    let received: Vec<_> = events.try_iter().collect();
    assert!(received.contains(&AudioEvent::StreamStopped {
        stream,
        faded: true
    }));
}

#[test]
fn test_restopping_a_fading_stream_restarts_the_fade() {
    let (mut controller, _backend) = create_controller(&Config::default());

    let stream = controller.play_smart_music("theme", 1.0, 1.0);
    controller.stop_stream(stream, Duration::from_secs(1));
    controller.tick(Duration::from_millis(500));

    // Restart from the current level (0.5) over two seconds
    controller.stop_stream(stream, Duration::from_secs(2));
    controller.tick(Duration::from_secs(1));
    assert!(approx(controller.handle(&stream).unwrap().fade(), 0.25));

    controller.tick(Duration::from_secs(1));
    assert!(!controller.is_playing(&stream));
}

#[test]
fn test_stale_handles_are_ignored() {
    let (mut controller, _backend) = create_controller(&Config::default());

    let old = controller.play_smart_sound("click", 1.0, 1.0);
    controller.stop_stream(old, Duration::ZERO);
    let new = controller.play_smart_sound("explosion", 1.0, 1.0);
    assert_eq!(old.id(), new.id());

    // Stopping the old stream again must not touch the new one
    controller.stop_stream(old, Duration::ZERO);
    controller.stop_stream(old, Duration::from_secs(1));
    assert!(controller.is_playing(&new));
    assert!(!controller.is_fading(&new));
}

#[test]
fn test_stream_end_is_collected_on_tick() {
    let (mut controller, backend) = create_controller(&Config::default());
    let (events, _id) = controller.events().subscribe();

    let stream = controller.play_smart_sound("explosion", 1.0, 1.0);
    backend.finish(stream.id());
    controller.tick(Duration::from_millis(16));

    assert_eq!(controller.active_count(AudioCategory::Sound), 0);
    assert!(events
        .try_iter()
        .any(|e| e == AudioEvent::StreamEnded { stream }));
}

#[test]
fn test_missing_clip_is_reported_and_reclaimed() {
    let (mut controller, _backend) = create_controller(&Config::default());
    let (events, _id) = controller.events().subscribe();

    let stream = controller.play_smart_sound("does_not_exist", 1.0, 1.0);
    assert!(controller.handle(&stream).unwrap().clip().is_none());

    let received: Vec<_> = events.try_iter().collect();
    assert!(received.contains(&AudioEvent::ClipMissing {
        name: "does_not_exist".to_string(),
        category: AudioCategory::Sound,
    }));
    assert!(received.contains(&AudioEvent::StreamStarted { stream, clip: None }));

    controller.tick(Duration::from_millis(16));
    assert!(controller.registry().is_empty());
    assert_eq!(controller.pool().idle_count(), 1);
}

#[test]
fn test_turn_off_stops_only_that_category() {
    let (mut controller, backend) = create_controller(&Config::default());

    let sound = controller.play_smart_sound("click", 1.0, 1.0);
    let music = controller.play_smart_music("theme", 1.0, 1.0);

    controller.turn_off_music();
    assert!(!controller.is_enabled(AudioCategory::Music));
    assert!(!controller.is_playing(&music));
    assert!(!backend.channel(music.id()).unwrap().playing);
    assert!(controller.is_playing(&sound));

    // Started while off: plays muted so it can be heard once switched on
    let late = controller.play_smart_music("credits", 1.0, 1.0);
    assert!(backend.channel(late.id()).unwrap().settings.muted);
    assert!(!backend.channel(sound.id()).unwrap().settings.muted);

    controller.turn_on_music();
    assert!(!backend.channel(late.id()).unwrap().settings.muted);
}

#[test]
fn test_turn_off_mutes_with_mute_policy() {
    let config = Config {
        disable_policy: DisablePolicy::Mute,
        ..Config::default()
    };
    let (mut controller, backend) = create_controller(&config);

    let sound = controller.play_smart_sound("click", 1.0, 1.0);
    let music = controller.play_smart_music("theme", 1.0, 1.0);

    controller.turn_off_sound();
    assert!(controller.is_playing(&sound));
    assert!(controller.handle(&sound).unwrap().is_muted());
    assert!(backend.channel(sound.id()).unwrap().settings.muted);
    assert!(!backend.channel(music.id()).unwrap().settings.muted);

    controller.turn_on_sound();
    assert!(!controller.handle(&sound).unwrap().is_muted());
    assert!(!backend.channel(sound.id()).unwrap().settings.muted);
}

#[test]
fn test_volume_is_clamped_and_applied() {
    let (mut controller, backend) = create_controller(&Config::default());

    let before = controller.play_smart_sound("click", 0.5, 1.0);
    assert_eq!(controller.set_volume(AudioCategory::Sound, 1.5), 1.0);
    assert_eq!(controller.set_volume(AudioCategory::Sound, -0.2), 0.0);
    assert_eq!(controller.set_volume(AudioCategory::Sound, 0.6), 0.6);

    assert!(approx(backend.channel(before.id()).unwrap().settings.volume, 0.3));

    let after = controller.play_smart_sound("click", 1.0, 1.0);
    assert!(approx(backend.channel(after.id()).unwrap().settings.volume, 0.6));

    // Music is independent
    let music = controller.play_smart_music("theme", 1.0, 1.0);
    assert!(approx(backend.channel(music.id()).unwrap().settings.volume, 1.0));
}

#[test]
fn test_sound_pitch_and_music_looping() {
    let (mut controller, backend) = create_controller(&Config::default());

    let sound = controller.play_smart_sound("click", 1.0, 1.5);
    let music = controller.play_smart_music("theme", 1.0, 1.0);

    let sound_channel = backend.channel(sound.id()).unwrap();
    assert!(approx(sound_channel.settings.pitch, 1.5));
    assert!(!sound_channel.settings.looping);
    assert!(backend.channel(music.id()).unwrap().settings.looping);
}

#[test]
fn test_random_music_requires_clips() {
    let mut controller = AudioController::new(
        &Config::default(),
        HeadlessBackend::new(),
        MemoryClipLibrary::new().with_clip(AudioCategory::Sound, "click"),
        MemorySettingsStore::new(),
    );

    let result = controller.play_random_music();
    assert!(matches!(result, Err(AudioError::NoMusicAvailable { .. })));
    assert!(controller.registry().is_empty());
}

#[test]
fn test_random_music_picks_from_library() {
    let (controller, _backend) = create_controller(&Config::default());
    let mut controller = controller.with_seed(7);

    for _ in 0..10 {
        let stream = controller.play_random_music().unwrap();
        assert_eq!(stream.category(), AudioCategory::Music);
        let name = controller.handle(&stream).unwrap().clip().unwrap().name().to_string();
        assert!(name == "theme" || name == "credits");
    }
    assert_eq!(controller.active_count(AudioCategory::Music), 10);
}

#[test]
fn test_release_all_clears_category() {
    let (mut controller, _backend) = create_controller(&Config::default());

    controller.play_sound("click", 1.0, 1.0);
    controller.play_sound("explosion", 1.0, 1.0);
    let music = controller.play_smart_music("theme", 1.0, 1.0);
    controller.stop_stream(music, Duration::from_secs(3));

    assert_eq!(controller.release_sounds(), 2);
    assert_eq!(controller.active_count(AudioCategory::Music), 1);

    assert_eq!(controller.release_music(), 1);
    assert!(!controller.is_fading(&music));
    assert!(controller.registry().is_empty());
    assert_eq!(controller.pool().idle_count(), controller.pool().len());
}

#[test]
fn test_preferences_survive_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("preferences.json");

    {
        let settings = JsonSettingsStore::open(&path).unwrap();
        let mut controller = AudioController::new(
            &Config::default(),
            HeadlessBackend::new(),
            MemoryClipLibrary::new(),
            settings,
        );
        assert!(controller.is_enabled(AudioCategory::Sound));
        controller.turn_off_sound();
    }

    let mut store = JsonSettingsStore::open(&path).unwrap();
    assert_eq!(store.get(AUDIO_SETTING_SOUND).as_deref(), Some("False"));
    assert_eq!(store.get(AUDIO_SETTING_MUSIC).as_deref(), Some("True"));

    let preferences = Preferences::load(&mut store);
    assert!(!preferences.sound_enabled);
    assert!(preferences.music_enabled);

    let controller = AudioController::new(
        &Config::default(),
        HeadlessBackend::new(),
        MemoryClipLibrary::new(),
        store,
    );
    assert!(!controller.is_enabled(AudioCategory::Sound));
}

#[test]
fn test_clip_library_from_folders() {
    let dir = TempDir::new().unwrap();
    write_clip(dir.path(), AudioCategory::Sound, "Button Click.wav");
    write_clip(dir.path(), AudioCategory::Sound, "Button Click.wav.meta");
    write_clip(dir.path(), AudioCategory::Music, "Main Theme.ogg");

    let library = ClipLibrary::scan(dir.path());
    assert_eq!(library.len(AudioCategory::Sound), 1);
    assert_eq!(library.len(AudioCategory::Music), 1);

    let backend = HeadlessBackend::new();
    let mut controller = AudioController::new(
        &Config::default(),
        backend.clone(),
        library,
        MemorySettingsStore::new(),
    );

    // Clips resolve by name or by identifier
    let by_name = controller.play_smart_sound("Button Click", 1.0, 1.0);
    let by_identifier = controller.play_smart_music("main_theme", 1.0, 1.0);

    assert_eq!(
        backend.channel(by_name.id()).unwrap().clip.as_deref(),
        Some("Button Click")
    );
    assert_eq!(
        backend.channel(by_identifier.id()).unwrap().clip.as_deref(),
        Some("Main Theme")
    );
    assert_eq!(controller.clip_names(AudioCategory::Music), vec!["Main Theme"]);
}

#[test]
fn test_config_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    let config = Config::load_or_create(&path).unwrap();
    assert!(path.exists());
    assert_eq!(config.tick_rate_hz, 60);
    assert_eq!(config.disable_policy, DisablePolicy::Stop);

    fs::write(
        &path,
        r#"{ "disable_policy": "mute", "music_volume": 3.0, "tick_rate_hz": 30 }"#,
    )
    .unwrap();
    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.disable_policy, DisablePolicy::Mute);
    assert_eq!(config.music_volume, 1.0);
    assert_eq!(config.tick_interval(), Duration::from_secs_f64(1.0 / 30.0));

    let (mut controller, backend) = create_controller(&Config {
        music_volume: 0.25,
        ..Config::default()
    });
    let music = controller.play_smart_music("theme", 1.0, 1.0);
    assert!(approx(backend.channel(music.id()).unwrap().settings.volume, 0.25));
}
