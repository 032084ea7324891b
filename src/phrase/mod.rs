//! Melodic phrases — one note sequence covering one chord progression.
//!
//! The beat/intensity *shape* of a phrase is fixed by the beat grid; the pitch
//! *content* is stochastic but voice-led: mostly stepwise motion, strong beats
//! on chord tones, weak beats free to use passing tones.

pub mod variation;

pub use variation::vary;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::event::Moment;
use crate::params::EngineParameters;
use crate::theory::{ChordProgression, OctaveRange, ScaleGenerator};

/// Beats each chord of a progression is held for.
pub const BEATS_PER_CHORD: usize = 4;

/// Octaves the melody is voiced in.
pub const MELODY_OCTAVES: OctaveRange = OctaveRange::new(1, 3);

/// Intensity of notes on strong beats.
pub const STRONG_BEAT_INTENSITY: f64 = 1.2;

/// Weak-beat intensity is drawn from `[WEAK_INTENSITY_MIN, WEAK_INTENSITY_MAX)`.
pub const WEAK_INTENSITY_MIN: f64 = 0.7;
pub const WEAK_INTENSITY_MAX: f64 = 1.0;

/// Chance a note is restricted to a step away from the previous note.
pub const STEPWISE_PROBABILITY: f64 = 0.6;

/// A "step" is anything closer than this many octaves (about 3 semitones).
pub const STEP_LIMIT_OCTAVES: f64 = 0.25;

/// Chance a beat is split into sub-beats when complexity allows it.
pub const SUBDIVIDE_PROBABILITY: f64 = 0.5;

/// Largest number of notes a single beat may be split into.
pub const MAX_SUBDIVISIONS: usize = 4;

/// One note of a phrase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    /// Hz.
    pub frequency: f64,
    /// Seconds.
    pub duration: f64,
    pub intensity: f64,
}

/// An immutable sequence of notes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MelodicPhrase {
    notes: Vec<NoteEvent>,
}

impl MelodicPhrase {
    pub fn new(notes: Vec<NoteEvent>) -> Self {
        Self { notes }
    }

    pub fn notes(&self) -> &[NoteEvent] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Sum of all note durations, in seconds.
    pub fn total_duration(&self) -> f64 {
        self.notes.iter().map(|n| n.duration).sum()
    }

    /// A copy covering exactly `span` seconds. Notes starting at or after
    /// `span` are dropped and the last remaining note is trimmed or stretched
    /// to end on it.
    pub fn fitted(&self, span: f64) -> Self {
        if !(span.is_finite() && span > 0.0) {
            return Self::default();
        }
        let mut notes = Vec::with_capacity(self.notes.len());
        let mut onset = 0.0;
        for note in &self.notes {
            if onset >= span {
                break;
            }
            notes.push(*note);
            onset += note.duration;
        }
        if let Some(last) = notes.last_mut() {
            last.duration += span - onset;
        }
        Self { notes }
    }

    /// Each note paired with its start offset from the beginning of the phrase.
    pub fn onsets(&self) -> impl Iterator<Item = (Moment, &NoteEvent)> + '_ {
        self.notes.iter().scan(0.0_f64, |elapsed, note| {
            let start = *elapsed;
            *elapsed += note.duration;
            Some((Moment::from_secs_f64(start), note))
        })
    }
}

/// Notes per beat for a given complexity: `clamp(floor(complexity / 3), 1, 4)`.
pub fn max_subdivisions(complexity: f64) -> usize {
    if !complexity.is_finite() || complexity < 3.0 {
        return 1;
    }
    ((complexity / 3.0).floor() as usize).clamp(1, MAX_SUBDIVISIONS)
}

/// Builds phrases over the current scale.
pub struct PhraseGenerator<'a> {
    scale: &'a ScaleGenerator,
}

impl<'a> PhraseGenerator<'a> {
    pub fn new(scale: &'a ScaleGenerator) -> Self {
        Self { scale }
    }

    /// Generate a phrase spanning `4 * BEATS_PER_CHORD` beats at the current tempo.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        progression: &ChordProgression,
        params: &EngineParameters,
        rng: &mut R,
    ) -> MelodicPhrase {
        let beat_duration = params.beat_duration();
        let max_split = max_subdivisions(params.complexity);
        let fallback = self.scale.tones_in_range(MELODY_OCTAVES);

        let mut notes = Vec::new();
        let mut previous: Option<f64> = None;

        for &degree in progression.degrees() {
            let mut chord = self.scale.chord_tone_pool(degree, MELODY_OCTAVES);
            if chord.is_empty() {
                chord = fallback.clone();
            }
            let mut open = chord.clone();
            open.extend(self.scale.passing_tone_pool(degree, MELODY_OCTAVES));

            for beat in 0..BEATS_PER_CHORD {
                let split = if max_split > 1 && rng.gen_bool(SUBDIVIDE_PROBABILITY) {
                    max_split
                } else {
                    1
                };
                let duration = beat_duration / split as f64;

                for sub in 0..split {
                    let strong = sub == 0 && beat % 2 == 0;
                    let candidates = if strong { &chord } else { &open };
                    let frequency = pick_tone(candidates, previous, rng)
                        .or_else(|| pick_tone(&fallback, previous, rng))
                        .unwrap_or(self.scale.base_frequency());
                    let intensity = if strong {
                        STRONG_BEAT_INTENSITY
                    } else {
                        rng.gen_range(WEAK_INTENSITY_MIN..WEAK_INTENSITY_MAX)
                    };

                    notes.push(NoteEvent {
                        frequency,
                        duration,
                        intensity,
                    });
                    previous = Some(frequency);
                }
            }
        }

        MelodicPhrase::new(notes)
    }
}

/// Whether two pitches are within a step of each other.
pub fn is_step(a: f64, b: f64) -> bool {
    (a / b).log2().abs() < STEP_LIMIT_OCTAVES
}

/// Choose the next tone. Most of the time the choice is restricted to steps
/// from `previous`; the rest of the time any candidate may be picked.
fn pick_tone<R: Rng + ?Sized>(candidates: &[f64], previous: Option<f64>, rng: &mut R) -> Option<f64> {
    if let Some(prev) = previous {
        if rng.gen_bool(STEPWISE_PROBABILITY) {
            let near: Vec<f64> = candidates
                .iter()
                .copied()
                .filter(|&c| is_step(c, prev))
                .collect();
            if let Some(&tone) = near.choose(rng) {
                return Some(tone);
            }
        }
    }
    candidates.choose(rng).copied()
}
