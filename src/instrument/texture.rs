//! Texture voices — swirling bass, sub bass, and wind.

use std::f64::consts::PI;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::VoiceError;
use crate::event::{TextureKind, TextureRequest, Waveform};

use super::envelope::AdsrEnvelope;
use super::oscillator::{cents_ratio, oscillator, OnePole, Phasor};
use super::voice::{Voice, VoiceClock};

/// Detune between the two swirl saws.
const SWIRL_DETUNE_CENTS: f64 = 7.0;

/// Depth of the cutoff wobble as a fraction of the swept cutoff.
const LFO_DEPTH: f64 = 0.3;

/// The wind band's lower edge sits this far below the swept cutoff.
const WIND_BAND_RATIO: f64 = 0.25;

/// Textures fade in and out slowly.
const TEXTURE_ENVELOPE: AdsrEnvelope = AdsrEnvelope {
    attack: 2.0,
    decay: 1.0,
    sustain: 0.8,
    release: 3.0,
};

/// Fallback pitch for a pitched texture requested without one.
const DEFAULT_TEXTURE_FREQUENCY: f64 = 65.41;

/// A filtered texture with a swept, wobbling cutoff.
pub struct TextureVoice {
    kind: TextureKind,
    frequency: f64,
    filter_from: f64,
    filter_to: f64,
    lfo_rate: f64,
    volume: f64,
    duration: f64,
    envelope: AdsrEnvelope,
    clock: VoiceClock,
    phasors: [Phasor; 2],
    lowpass: OnePole,
    highpass: OnePole,
    noise: ChaCha8Rng,
}

impl TextureVoice {
    /// `seed` drives the noise source so renders are reproducible.
    pub fn new(texture: &TextureRequest, sample_rate: u32, seed: u64) -> Self {
        let sr = sample_rate as f64;
        Self {
            kind: texture.kind,
            frequency: texture.params.frequency.unwrap_or(DEFAULT_TEXTURE_FREQUENCY),
            filter_from: texture.params.filter_from,
            filter_to: texture.params.filter_to,
            lfo_rate: texture.params.lfo_rate,
            volume: texture.volume,
            duration: texture.duration,
            envelope: TEXTURE_ENVELOPE.fitted(texture.duration),
            clock: VoiceClock::new(texture.duration, sample_rate),
            phasors: [Phasor::default(); 2],
            lowpass: OnePole::new(texture.params.filter_from, sr),
            highpass: OnePole::new(texture.params.filter_from * WIND_BAND_RATIO, sr),
            noise: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Cutoff at the current position: a linear sweep plus a slow wobble.
    fn cutoff(&self) -> f64 {
        let swept = self.filter_from + (self.filter_to - self.filter_from) * self.clock.progress();
        let wobble = (2.0 * PI * self.lfo_rate * self.clock.time()).sin() * LFO_DEPTH;
        swept * (1.0 + wobble)
    }

    fn source(&mut self) -> f64 {
        let sr = self.clock.sample_rate();
        match self.kind {
            TextureKind::SwirlBass => {
                let a = self.phasors[0].tick(self.frequency, sr);
                let b = self.phasors[1].tick(self.frequency * cents_ratio(SWIRL_DETUNE_CENTS), sr);
                (oscillator(Waveform::Saw, a) + oscillator(Waveform::Saw, b)) * 0.5
            }
            TextureKind::SubBass => oscillator(Waveform::Sine, self.phasors[0].tick(self.frequency, sr)),
            TextureKind::WindSwirl => self.noise.gen_range(-1.0..1.0),
        }
    }
}

impl Voice for TextureVoice {
    fn next_sample(&mut self) -> f32 {
        if self.clock.is_finished() {
            return 0.0;
        }
        let sr = self.clock.sample_rate();
        let cutoff = self.cutoff();
        let raw = self.source();

        let filtered = match self.kind {
            TextureKind::SubBass => self.lowpass.process(raw),
            TextureKind::SwirlBass => {
                self.lowpass.set_cutoff(cutoff, sr);
                self.lowpass.process(raw)
            }
            TextureKind::WindSwirl => {
                self.lowpass.set_cutoff(cutoff, sr);
                self.highpass.set_cutoff(cutoff * WIND_BAND_RATIO, sr);
                let low = self.lowpass.process(raw);
                low - self.highpass.process(low)
            }
        };

        let env = self.envelope.amplitude(self.clock.time(), self.duration);
        self.clock.advance();
        (filtered * env * self.volume) as f32
    }

    fn is_finished(&self) -> bool {
        self.clock.is_finished()
    }

    fn stop(&mut self) -> Result<(), VoiceError> {
        self.clock.stop()
    }
}
