//! Voices — one sounding event inside the mixer.
//!
//! A voice renders mono samples one at a time and finishes on its own once its
//! envelope reaches the end. The mixer may force-stop it earlier.

use crate::error::VoiceError;
use crate::event::{ToneRequest, Waveform};

use super::envelope::AdsrEnvelope;
use super::oscillator::{oscillator, Phasor};

/// A sound owned by the mixer.
pub trait Voice: Send {
    /// Render the next mono sample.
    fn next_sample(&mut self) -> f32;

    /// Whether the voice has nothing left to play.
    fn is_finished(&self) -> bool;

    /// Stop immediately. Stopping a finished voice is an error the caller
    /// is expected to swallow.
    fn stop(&mut self) -> Result<(), VoiceError>;
}

/// Clock shared by every voice: elapsed samples against a fixed length.
#[derive(Debug, Clone, Copy)]
pub struct VoiceClock {
    sample_rate: f64,
    elapsed: u64,
    length: u64,
    stopped: bool,
}

impl VoiceClock {
    pub fn new(duration: f64, sample_rate: u32) -> Self {
        let length = if duration.is_finite() && duration > 0.0 {
            (duration * sample_rate as f64).ceil() as u64
        } else {
            0
        };
        Self {
            sample_rate: sample_rate as f64,
            elapsed: 0,
            length,
            stopped: false,
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Seconds since the voice started.
    pub fn time(&self) -> f64 {
        self.elapsed as f64 / self.sample_rate
    }

    /// Fraction of the voice already played, in [0.0, 1.0].
    pub fn progress(&self) -> f64 {
        if self.length == 0 {
            1.0
        } else {
            (self.elapsed as f64 / self.length as f64).min(1.0)
        }
    }

    pub fn advance(&mut self) {
        self.elapsed += 1;
    }

    pub fn is_finished(&self) -> bool {
        self.stopped || self.elapsed >= self.length
    }

    pub fn stop(&mut self) -> Result<(), VoiceError> {
        if self.is_finished() {
            return Err(VoiceError::AlreadyStopped);
        }
        self.stopped = true;
        Ok(())
    }
}

/// A single pitched oscillator with an envelope.
#[derive(Debug, Clone)]
pub struct ToneVoice {
    frequency: f64,
    waveform: Waveform,
    volume: f64,
    duration: f64,
    envelope: AdsrEnvelope,
    phasor: Phasor,
    clock: VoiceClock,
}

impl ToneVoice {
    pub fn new(tone: &ToneRequest, sample_rate: u32) -> Self {
        Self {
            frequency: tone.frequency,
            waveform: tone.waveform,
            volume: tone.volume,
            duration: tone.duration,
            envelope: tone.envelope.map(AdsrEnvelope::from).unwrap_or_default(),
            phasor: Phasor::default(),
            clock: VoiceClock::new(tone.duration, sample_rate),
        }
    }
}

impl Voice for ToneVoice {
    fn next_sample(&mut self) -> f32 {
        if self.clock.is_finished() {
            return 0.0;
        }
        let t = self.clock.time();
        let env = self.envelope.amplitude(t, self.duration);
        let phase = self.phasor.tick(self.frequency, self.clock.sample_rate());
        self.clock.advance();
        (oscillator(self.waveform, phase) * env * self.volume) as f32
    }

    fn is_finished(&self) -> bool {
        self.clock.is_finished()
    }

    fn stop(&mut self) -> Result<(), VoiceError> {
        self.clock.stop()
    }
}
