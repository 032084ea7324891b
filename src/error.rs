//! Error types surfaced by the engine, its sinks, and configuration loading.
//!
//! Only lifecycle operations return errors. Steady-state generation absorbs
//! failures and degrades (a layer skips an event) instead of stopping.

use thiserror::Error;

/// Returned when a scale name is not in the catalogue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown scale '{0}'")]
pub struct UnknownScale(pub String);

/// Returned when a parameter name is not one the layers read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown parameter '{0}'")]
pub struct UnknownParameter(pub String);

/// Failures reported by a synthesis sink during setup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SinkError {
    #[error("synthesis sink unavailable: {0}")]
    Unavailable(String),
}

/// Failures surfaced to the caller of [`Engine`](crate::engine::Engine).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("engine not initialized; call initialize() before start()")]
    NotInitialized,

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Failures stopping an individual voice. Never propagated past the mixer.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceError {
    #[error("voice already stopped")]
    AlreadyStopped,
}

/// Failures opening or feeding the audio output device.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    #[error("no audio output device found")]
    NoOutputDevice,

    #[error("device config error: {0}")]
    DeviceConfig(String),

    #[error("stream build error: {0}")]
    StreamBuild(String),

    #[error("stream play error: {0}")]
    StreamPlay(String),

    #[error("audio command queue is full")]
    QueueFull,
}

/// Failures rendering to a WAV file.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("wav error: {0}")]
    Wav(#[from] hound::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Failures loading an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
}
