//! Sink interfaces — where synthesis requests go and where the waveform comes from.
//!
//! The composition core only ever talks to these traits. The concrete backend
//! lives in [`crate::instrument`]; tests use [`RecordingSink`].

use crate::error::SinkError;
use crate::event::{ChordRequest, Moment, SynthesisRequest, TextureRequest, ToneRequest};
use crate::params::EngineParameters;

/// Receives fire-and-forget synthesis requests.
///
/// The sink owns every sound it starts and must release it on completion. No
/// return value is consulted by the core.
pub trait SynthesisSink {
    /// One-time setup before the first start. The only fallible call.
    fn prepare(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Virtual time of the request about to be played.
    fn cue(&mut self, _at: Moment) {}

    fn play_tone(&mut self, tone: &ToneRequest);

    fn play_chord(&mut self, chord: &ChordRequest);

    fn play_texture(&mut self, texture: &TextureRequest);

    /// Force-stop everything still sounding.
    fn release_all(&mut self);

    /// Parameters that affect the signal chain (volume, reverb) changed.
    fn apply_parameters(&mut self, _params: &EngineParameters) {}
}

/// Exposes the most recent output for visualisation.
pub trait TelemetrySink {
    /// Time-domain bytes centred on 128, or `None` before initialisation.
    fn waveform_snapshot(&self) -> Option<Vec<u8>>;
}

/// Route a request to the matching sink call.
pub fn dispatch<S: SynthesisSink + ?Sized>(sink: &mut S, request: &SynthesisRequest) {
    match request {
        SynthesisRequest::Tone(tone) => sink.play_tone(tone),
        SynthesisRequest::Chord(chord) => sink.play_chord(chord),
        SynthesisRequest::Texture(texture) => sink.play_texture(texture),
    }
}

/// A sink that remembers what it was asked to play.
#[derive(Debug, Default)]
pub struct RecordingSink {
    requests: Vec<(Moment, SynthesisRequest)>,
    cursor: Moment,
    prepared: bool,
    unavailable: Option<String>,
    releases: usize,
    last_params: Option<EngineParameters>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose `prepare` fails with the given reason.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            unavailable: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Every request with the virtual time it was cued at.
    pub fn requests(&self) -> &[(Moment, SynthesisRequest)] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// How many times `release_all` was called.
    pub fn releases(&self) -> usize {
        self.releases
    }

    pub fn last_params(&self) -> Option<&EngineParameters> {
        self.last_params.as_ref()
    }

    fn record(&mut self, request: SynthesisRequest) {
        self.requests.push((self.cursor, request));
    }
}

impl SynthesisSink for RecordingSink {
    fn prepare(&mut self) -> Result<(), SinkError> {
        if let Some(reason) = &self.unavailable {
            return Err(SinkError::Unavailable(reason.clone()));
        }
        self.prepared = true;
        Ok(())
    }

    fn cue(&mut self, at: Moment) {
        self.cursor = at;
    }

    fn play_tone(&mut self, tone: &ToneRequest) {
        self.record(SynthesisRequest::Tone(tone.clone()));
    }

    fn play_chord(&mut self, chord: &ChordRequest) {
        self.record(SynthesisRequest::Chord(chord.clone()));
    }

    fn play_texture(&mut self, texture: &TextureRequest) {
        self.record(SynthesisRequest::Texture(texture.clone()));
    }

    fn release_all(&mut self) {
        self.releases += 1;
    }

    fn apply_parameters(&mut self, params: &EngineParameters) {
        self.last_params = Some(params.clone());
    }
}

impl TelemetrySink for RecordingSink {
    fn waveform_snapshot(&self) -> Option<Vec<u8>> {
        None
    }
}
