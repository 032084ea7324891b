//! Oscillator primitives — waveform generation and a one-pole low-pass filter.

use std::f64::consts::PI;

use crate::event::Waveform;

/// Generate a single sample for the given waveform at the specified phase.
///
/// `phase` is in the range [0.0, 1.0), representing one full cycle.
/// Returns a value in [-1.0, 1.0].
pub fn oscillator(waveform: Waveform, phase: f64) -> f64 {
    match waveform {
        Waveform::Sine => (phase * 2.0 * PI).sin(),
        Waveform::Saw => 2.0 * phase - 1.0,
        Waveform::Triangle => {
            if phase < 0.25 {
                4.0 * phase
            } else if phase < 0.75 {
                2.0 - 4.0 * phase
            } else {
                4.0 * phase - 4.0
            }
        }
    }
}

/// Frequency ratio for a detune in cents.
pub fn cents_ratio(cents: f64) -> f64 {
    2.0f64.powf(cents / 1200.0)
}

/// Running phase in [0.0, 1.0).
#[derive(Debug, Clone, Copy, Default)]
pub struct Phasor {
    phase: f64,
}

impl Phasor {
    /// Current phase, then advance by one sample of `frequency`.
    #[inline]
    pub fn tick(&mut self, frequency: f64, sample_rate: f64) -> f64 {
        let current = self.phase;
        self.phase = (self.phase + frequency / sample_rate).rem_euclid(1.0);
        current
    }
}

/// One-pole low-pass filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnePole {
    state: f64,
    alpha: f64,
}

impl OnePole {
    pub fn new(cutoff: f64, sample_rate: f64) -> Self {
        let mut filter = Self::default();
        filter.set_cutoff(cutoff, sample_rate);
        filter
    }

    pub fn set_cutoff(&mut self, cutoff: f64, sample_rate: f64) {
        let cutoff = cutoff.clamp(1.0, sample_rate * 0.45);
        let rc = 1.0 / (2.0 * PI * cutoff);
        let dt = 1.0 / sample_rate;
        self.alpha = dt / (rc + dt);
    }

    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        self.state += self.alpha * (input - self.state);
        self.state
    }
}
