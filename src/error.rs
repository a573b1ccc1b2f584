use thiserror::Error;

/// Library errors using thiserror for structured error handling.
///
/// Most playback failures never reach the caller: the controller logs them
/// and degrades to silence. These types surface where a caller can act on
/// the failure (construction, configuration, random selection).

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to load audio clip: {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode audio clip {name}")]
    DecodeFailed {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to initialize audio output stream")]
    StreamInitFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Audio playback failed")]
    PlaybackFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("No music available in {folder}")]
    NoMusicAvailable { folder: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to save configuration to {path}")]
    SaveFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine the platform config directory")]
    NoConfigDir,
}

#[derive(Error, Debug)]
pub enum PreferencesError {
    #[error("Failed to read preferences from {path}")]
    ReadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to write preferences to {path}")]
    WriteFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Type alias for application Results using anyhow for context chaining
pub type AppResult<T> = anyhow::Result<T>;
