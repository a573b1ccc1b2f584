use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use sysinfo::System;

use audio_controller::error::AppResult;
use audio_controller::{
    AudioBackend, AudioCategory, AudioController, ClipLibrary, Config, HeadlessBackend,
    JsonSettingsStore, StreamHandle,
};

const LOG_TARGET_STARTUP: &str = "audio_controller::startup";

/// Longest a one-shot sound is allowed to keep the CLI alive
const MAX_SOUND_WAIT: Duration = Duration::from_secs(60);

/// Fade applied when a timed music preview ends
const MUSIC_FADE_OUT: Duration = Duration::from_secs(1);

/// Initialize tracing with file rotation
///
/// Logs are written to `<config dir>/AudioController/logs/` with daily
/// rotation. Debug builds also log to the console.
fn initialize_tracing() {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = dirs::config_dir()
        .map(|dir| dir.join("AudioController").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    let file_appender = rolling::daily(&log_dir, "audio-controller.log");

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    #[cfg(debug_assertions)]
    {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(console_layer)
            .init();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();
    }

    tracing::info!("Log directory: {}", log_dir.display());
}

fn log_runtime_environment() {
    let version = env!("CARGO_PKG_VERSION");
    let os_name = System::long_os_version()
        .or_else(System::name)
        .unwrap_or_else(|| "Unknown OS".to_string());
    let kernel = System::kernel_version().unwrap_or_else(|| "Unknown Kernel".to_string());

    tracing::info!(
        target: LOG_TARGET_STARTUP,
        "Starting audio-controller v{} on {} ({})",
        version,
        std::env::consts::ARCH,
        os_name
    );
    tracing::debug!(target: LOG_TARGET_STARTUP, "Kernel: {}", kernel);
}

fn print_usage() {
    println!("Usage: audio-controller [--config <path>] <command>");
    println!();
    println!("Commands:");
    println!("  list [sound|music]                 List clips and their identifiers");
    println!("  status                             Show preferences and clip counts");
    println!("  play-sound <name> [volume] [pitch] Play a sound effect until it ends");
    println!("  play-music <name> [seconds]        Play music, then fade it out");
    println!("  random-music [seconds]             Play a random music track");
    println!("  sound on|off                       Switch sound effects on or off");
    println!("  music on|off                       Switch music on or off");
}

fn main() {
    initialize_tracing();
    log_runtime_environment();

    if let Err(e) = run(std::env::args().skip(1).collect()) {
        tracing::error!("{:#}", e);
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}

fn run(mut args: Vec<String>) -> AppResult<()> {
    let config_path = match args.iter().position(|a| a == "--config") {
        Some(index) => {
            if index + 1 >= args.len() {
                bail!("--config needs a path");
            }
            let path = PathBuf::from(args.remove(index + 1));
            args.remove(index);
            Some(path)
        }
        None => None,
    };

    let config = match &config_path {
        Some(path) => Config::load_or_create(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    let Some(command) = args.first().cloned() else {
        print_usage();
        return Ok(());
    };
    let rest = &args[1..];

    match command.as_str() {
        "list" => list_clips(&config, rest.first().map(String::as_str)),
        "status" => {
            let controller = build_controller(&config, HeadlessBackend::new())?;
            let library = ClipLibrary::scan(&config.resource_root);
            for category in AudioCategory::ALL {
                println!(
                    "{:<6} {:<4} volume {:.2}  {} clip(s)",
                    category,
                    if controller.is_enabled(category) { "on" } else { "off" },
                    controller.volume(category),
                    library.len(category)
                );
            }
            Ok(())
        }
        "play-sound" => {
            let name = rest.first().context("play-sound needs a clip name")?;
            let volume = parse_arg(rest.get(1), 1.0, "volume")?;
            let pitch = parse_arg(rest.get(2), 1.0, "pitch")?;

            let mut controller = build_controller(&config, open_backend()?)?;
            let stream = controller.play_smart_sound(name, volume, pitch);
            run_until_quiet(&mut controller, &config, stream, MAX_SOUND_WAIT);
            Ok(())
        }
        "play-music" => {
            let name = rest.first().context("play-music needs a clip name")?;
            let seconds = parse_arg(rest.get(1), 10.0, "seconds")?;

            let mut controller = build_controller(&config, open_backend()?)?;
            let stream = controller.play_smart_music(name, 1.0, 1.0);
            preview_music(&mut controller, &config, stream, seconds);
            Ok(())
        }
        "random-music" => {
            let seconds = parse_arg(rest.first(), 10.0, "seconds")?;

            let mut controller = build_controller(&config, open_backend()?)?;
            let stream = controller.play_random_music()?;
            if let Some(clip) = controller.handle(&stream).and_then(|h| h.clip()) {
                println!("♪ {}", clip.name());
            }
            preview_music(&mut controller, &config, stream, seconds);
            Ok(())
        }
        "sound" | "music" => {
            let category = AudioCategory::parse(&command).context("unknown category")?;
            let enabled = match rest.first().map(String::as_str) {
                Some("on") => true,
                Some("off") => false,
                _ => bail!("usage: audio-controller {} on|off", command),
            };

            // Toggling only touches preferences, no output device needed
            let mut controller = build_controller(&config, HeadlessBackend::new())?;
            controller.set_enabled(category, enabled);
            println!("✓ {} {}", category, if enabled { "on" } else { "off" });
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            print_usage();
            bail!("unknown command: {}", other)
        }
    }
}

fn parse_arg(value: Option<&String>, default: f32, what: &str) -> AppResult<f32> {
    match value {
        Some(raw) => raw
            .parse::<f32>()
            .with_context(|| format!("invalid {}: {}", what, raw)),
        None => Ok(default),
    }
}

fn list_clips(config: &Config, filter: Option<&str>) -> AppResult<()> {
    let categories: Vec<AudioCategory> = match filter {
        Some(raw) => vec![AudioCategory::parse(raw)
            .with_context(|| format!("unknown category: {}", raw))?],
        None => AudioCategory::ALL.to_vec(),
    };

    let library = ClipLibrary::scan(&config.resource_root);
    for category in categories {
        println!("{} ({}):", category, library.root().join(category.folder()).display());
        for (identifier, name) in library.identifiers(category) {
            if identifier == name {
                println!("  {}", name);
            } else {
                println!("  {:<32} \"{}\"", identifier, name);
            }
        }
    }
    Ok(())
}

fn build_controller(
    config: &Config,
    backend: impl AudioBackend + 'static,
) -> AppResult<AudioController> {
    let preferences_path = config
        .preferences_file()
        .context("Could not determine where to store preferences")?;
    let settings = JsonSettingsStore::open(&preferences_path)?;
    let library = ClipLibrary::scan(&config.resource_root);

    Ok(AudioController::new(config, backend, library, settings))
}

#[cfg(feature = "rodio-output")]
fn open_backend() -> AppResult<Box<dyn AudioBackend>> {
    let backend = audio_controller::RodioBackend::new().context("Failed to open audio output")?;
    Ok(Box::new(backend))
}

#[cfg(not(feature = "rodio-output"))]
fn open_backend() -> AppResult<Box<dyn AudioBackend>> {
    tracing::warn!("Built without rodio-output; playback is silent");
    Ok(Box::new(HeadlessBackend::new()))
}

/// Tick the controller until `stream` ends or `limit` passes
fn run_until_quiet(
    controller: &mut AudioController,
    config: &Config,
    stream: StreamHandle,
    limit: Duration,
) {
    let interval = config.tick_interval();
    let started = Instant::now();
    let mut last = started;

    while controller.is_playing(&stream) && started.elapsed() < limit {
        thread::sleep(interval);
        let now = Instant::now();
        controller.tick(now - last);
        last = now;
    }

    if controller.is_playing(&stream) {
        tracing::warn!("{} still playing after {:?}, stopping", stream, limit);
        controller.stop_stream(stream, Duration::ZERO);
    }
}

/// Let music play for `seconds`, then fade it out
fn preview_music(
    controller: &mut AudioController,
    config: &Config,
    stream: StreamHandle,
    seconds: f32,
) {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    run_until_quiet(controller, config, stream, Duration::from_secs_f32(seconds));
    controller.stop_stream(stream, MUSIC_FADE_OUT);
    run_until_quiet(controller, config, stream, MUSIC_FADE_OUT * 2);
}
