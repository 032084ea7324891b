//! Scale catalogue and the scale-degree → frequency mapping.
//!
//! A scale is an ordered list of semitone offsets inside one octave. Degrees
//! wrap modulo the scale's tone count and octaves add 12 semitones each, so any
//! (degree, octave) pair maps to a pitch in 12-tone equal temperament above the
//! C4 tuning reference.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::UnknownScale;

/// Tuning reference: C4 in Hz.
pub const BASE_FREQUENCY: f64 = 261.63;

/// Semitones per octave.
pub const OCTAVE: i32 = 12;

/// The six selectable modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    Pentatonic,
    Major,
    Minor,
    Dorian,
    Phrygian,
    Chromatic,
}

impl ScaleKind {
    pub const ALL: [ScaleKind; 6] = [
        ScaleKind::Pentatonic,
        ScaleKind::Major,
        ScaleKind::Minor,
        ScaleKind::Dorian,
        ScaleKind::Phrygian,
        ScaleKind::Chromatic,
    ];

    /// Semitone offsets from the root.
    pub fn offsets(self) -> &'static [i32] {
        match self {
            ScaleKind::Pentatonic => &[0, 2, 4, 7, 9],
            ScaleKind::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleKind::Minor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleKind::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            ScaleKind::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            ScaleKind::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScaleKind::Pentatonic => "pentatonic",
            ScaleKind::Major => "major",
            ScaleKind::Minor => "minor",
            ScaleKind::Dorian => "dorian",
            ScaleKind::Phrygian => "phrygian",
            ScaleKind::Chromatic => "chromatic",
        }
    }
}

impl fmt::Display for ScaleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Default for ScaleKind {
    fn default() -> Self {
        ScaleKind::Pentatonic
    }
}

impl FromStr for ScaleKind {
    type Err = UnknownScale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScaleKind::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownScale(s.to_string()))
    }
}

/// An inclusive range of octaves above the tuning reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OctaveRange {
    low: i32,
    high: i32,
}

impl OctaveRange {
    /// Build a range; bounds given in the wrong order are swapped.
    pub const fn new(a: i32, b: i32) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn low(self) -> i32 {
        self.low
    }

    pub fn high(self) -> i32 {
        self.high
    }

    pub fn iter(self) -> impl Iterator<Item = i32> {
        self.low..=self.high
    }

    /// Pick an octave uniformly.
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> i32 {
        rng.gen_range(self.low..=self.high)
    }
}

/// Maps scale degrees to frequencies for the currently selected scale.
#[derive(Debug, Clone)]
pub struct ScaleGenerator {
    base_frequency: f64,
    current: ScaleKind,
}

impl ScaleGenerator {
    /// A pentatonic generator tuned to C4.
    pub fn new() -> Self {
        Self::with_base(BASE_FREQUENCY)
    }

    pub fn with_base(base_frequency: f64) -> Self {
        Self {
            base_frequency,
            current: ScaleKind::Pentatonic,
        }
    }

    /// Select a scale by name. Unknown names leave the current scale in place
    /// and return `false`.
    pub fn set_scale(&mut self, name: &str) -> bool {
        match name.parse::<ScaleKind>() {
            Ok(kind) => {
                self.current = kind;
                true
            }
            Err(_) => false,
        }
    }

    pub fn set_kind(&mut self, kind: ScaleKind) {
        self.current = kind;
    }

    pub fn current_scale(&self) -> ScaleKind {
        self.current
    }

    pub fn base_frequency(&self) -> f64 {
        self.base_frequency
    }

    /// Number of distinct tones in the current scale.
    pub fn tone_count(&self) -> usize {
        self.current.offsets().len()
    }

    /// Equal temperament: `base * 2^(semitone / 12)`. Any offset is valid.
    pub fn frequency_of(&self, semitone: i32) -> f64 {
        self.base_frequency * 2f64.powf(semitone as f64 / OCTAVE as f64)
    }

    /// Semitone offset of a scale degree voiced in a given octave.
    pub fn degree_semitone(&self, degree: usize, octave: i32) -> i32 {
        let offsets = self.current.offsets();
        offsets[degree % offsets.len()] + octave * OCTAVE
    }

    pub fn degree_frequency(&self, degree: usize, octave: i32) -> f64 {
        self.frequency_of(self.degree_semitone(degree, octave))
    }

    /// Scale indices of the root, third, and fifth of the chord on `degree`.
    pub fn chord_degrees(&self, degree: usize) -> [usize; 3] {
        let n = self.tone_count();
        [degree % n, (degree + 2) % n, (degree + 4) % n]
    }

    /// Scale indices that are not part of the chord on `degree`.
    pub fn passing_degrees(&self, degree: usize) -> Vec<usize> {
        let chord = self.chord_degrees(degree);
        (0..self.tone_count())
            .filter(|d| !chord.contains(d))
            .collect()
    }

    /// Root, third, and fifth of the chord on `degree`, each at a random
    /// octave inside `range`.
    pub fn chord_tones<R: Rng + ?Sized>(
        &self,
        degree: usize,
        range: OctaveRange,
        rng: &mut R,
    ) -> Vec<f64> {
        self.chord_degrees(degree)
            .iter()
            .map(|&d| self.degree_frequency(d, range.sample(rng)))
            .collect()
    }

    /// Non-chord scale tones at random octaves inside `range`. Falls back to
    /// the full tone set when the chord covers the whole scale.
    pub fn passing_tones<R: Rng + ?Sized>(
        &self,
        degree: usize,
        range: OctaveRange,
        rng: &mut R,
    ) -> Vec<f64> {
        let passing = self.passing_degrees(degree);
        if passing.is_empty() {
            return self.tones_in_range(range);
        }
        passing
            .iter()
            .map(|&d| self.degree_frequency(d, range.sample(rng)))
            .collect()
    }

    /// Every voicing of the chord on `degree` across all octaves in `range`.
    pub fn chord_tone_pool(&self, degree: usize, range: OctaveRange) -> Vec<f64> {
        let mut degrees = self.chord_degrees(degree).to_vec();
        degrees.dedup();
        self.voice_across(&degrees, range)
    }

    /// Every voicing of the non-chord tones across all octaves in `range`.
    pub fn passing_tone_pool(&self, degree: usize, range: OctaveRange) -> Vec<f64> {
        self.voice_across(&self.passing_degrees(degree), range)
    }

    /// Every scale tone across all octaves in `range`, ascending.
    pub fn tones_in_range(&self, range: OctaveRange) -> Vec<f64> {
        let all: Vec<usize> = (0..self.tone_count()).collect();
        self.voice_across(&all, range)
    }

    /// A uniformly chosen scale step at a uniformly chosen octave.
    pub fn random_frequency<R: Rng + ?Sized>(&self, range: OctaveRange, rng: &mut R) -> f64 {
        let octave = range.sample(rng);
        let degree = rng.gen_range(0..self.tone_count());
        self.degree_frequency(degree, octave)
    }

    /// All scale tones for `octaves` octaves starting at the tuning reference.
    pub fn scale_frequencies(&self, octaves: u32) -> Vec<f64> {
        if octaves == 0 {
            return Vec::new();
        }
        self.tones_in_range(OctaveRange::new(0, octaves as i32 - 1))
    }

    /// Fixed-octave triad on the first scale degree. Empty for scales with
    /// fewer than three tones.
    pub fn chord_frequencies(&self, root_octave: i32) -> Vec<f64> {
        if self.tone_count() < 3 {
            return Vec::new();
        }
        self.chord_degrees(0)
            .iter()
            .map(|&d| self.degree_frequency(d, root_octave))
            .collect()
    }

    fn voice_across(&self, degrees: &[usize], range: OctaveRange) -> Vec<f64> {
        range
            .iter()
            .flat_map(|octave| degrees.iter().map(move |&d| (d, octave)))
            .map(|(d, octave)| self.degree_frequency(d, octave))
            .collect()
    }
}

impl Default for ScaleGenerator {
    fn default() -> Self {
        Self::new()
    }
}
