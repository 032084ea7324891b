//! Instruments — the voices, signal stages, and mixer behind the synthesis sink.
//!
//! Requests from the scheduler become voices inside the [`Mixer`]. Voices are
//! summed on a dry bus, routed through the [`Reverb`] and the master
//! [`GainStage`], and the result feeds both the audio output and the
//! [`Analyser`].

pub mod analyser;
pub mod envelope;
pub mod mixer;
pub mod oscillator;
pub mod reverb;
pub mod stage;
pub mod texture;
pub mod voice;

pub use analyser::{Analyser, SNAPSHOT_LEN};
pub use envelope::AdsrEnvelope;
pub use mixer::Mixer;
pub use reverb::Reverb;
pub use stage::{GainStage, Ramp, SignalStage};
pub use texture::TextureVoice;
pub use voice::{ToneVoice, Voice, VoiceClock};
