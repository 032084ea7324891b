//! Soundscape — an endless generative ambient music engine.
//!
//! Five layers (melody, harmony, bass, ambience, wind) compose in an AABA song
//! form over a shared scale, driven by a discrete-event scheduler in virtual
//! time. Requests go to a [`sink::SynthesisSink`]; the bundled
//! [`instrument::Mixer`] renders them for [`audio::AudioOutput`] or a WAV file.

pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod instrument;
pub mod layer;
pub mod params;
pub mod phrase;
pub mod render;
pub mod section;
pub mod sink;
pub mod theory;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{
    AudioError, ConfigError, EngineError, RenderError, SinkError, UnknownParameter, UnknownScale,
};
