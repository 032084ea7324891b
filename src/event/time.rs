//! Virtual time measured in integer microseconds.
//!
//! Layers think in beats, but tempo can change at any moment and a change must
//! never act retroactively. Every beat count is therefore converted to a
//! `Moment` at the tempo in effect when the event is computed, and the scheduler
//! only ever compares integers.

use std::ops::{Add, AddAssign, Sub};

/// Microseconds per second.
pub const MICROS_PER_SECOND: u64 = 1_000_000;

/// A point on (or a span of) the virtual clock, in microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Moment {
    micros: u64,
}

impl Moment {
    /// The start of the virtual clock.
    pub const ZERO: Moment = Moment { micros: 0 };

    pub const fn from_micros(micros: u64) -> Self {
        Self { micros }
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self {
            micros: millis * 1_000,
        }
    }

    /// Create a `Moment` from fractional seconds. Negative and non-finite
    /// values collapse to zero.
    pub fn from_secs_f64(secs: f64) -> Self {
        if !secs.is_finite() || secs <= 0.0 {
            return Self::ZERO;
        }
        Self {
            micros: (secs * MICROS_PER_SECOND as f64).round() as u64,
        }
    }

    /// Convert a (fractional) beat count to a span at the given tempo.
    pub fn from_beats(beats: f64, bpm: f64) -> Self {
        Self::from_secs_f64(beats * 60.0 / bpm)
    }

    pub fn micros(self) -> u64 {
        self.micros
    }

    pub fn as_secs_f64(self) -> f64 {
        self.micros as f64 / MICROS_PER_SECOND as f64
    }

    /// Convert to a frame offset at the given sample rate.
    pub fn to_frames(self, sample_rate: u32) -> u64 {
        (self.micros as u128 * sample_rate as u128 / MICROS_PER_SECOND as u128) as u64
    }

    /// Span covered by `frames` audio frames.
    pub fn from_frames(frames: u64, sample_rate: u32) -> Self {
        if sample_rate == 0 {
            return Self::ZERO;
        }
        Self {
            micros: (frames as u128 * MICROS_PER_SECOND as u128 / sample_rate as u128) as u64,
        }
    }
}

impl Add for Moment {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            micros: self.micros.saturating_add(rhs.micros),
        }
    }
}

impl AddAssign for Moment {
    fn add_assign(&mut self, rhs: Self) {
        self.micros = self.micros.saturating_add(rhs.micros);
    }
}

impl Sub for Moment {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            micros: self.micros.saturating_sub(rhs.micros),
        }
    }
}
