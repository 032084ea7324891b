//! AABA section letters and the snapshot the melody publishes each tick.

use std::fmt;

use crate::event::Moment;
use crate::theory::{ChordProgression, CHORDS_PER_PROGRESSION};

/// Section letter within the song form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionLetter {
    A,
    B,
}

impl fmt::Display for SectionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionLetter::A => f.write_str("A"),
            SectionLetter::B => f.write_str("B"),
        }
    }
}

/// Sections in one full cycle of the form.
pub const SECTIONS_PER_CYCLE: usize = 4;

/// The fixed AABA pattern.
pub const FORM_PATTERN: [SectionLetter; SECTIONS_PER_CYCLE] = [
    SectionLetter::A,
    SectionLetter::A,
    SectionLetter::B,
    SectionLetter::A,
];

/// Letter for a section index.
pub fn letter_at(section_index: usize) -> SectionLetter {
    FORM_PATTERN[section_index % SECTIONS_PER_CYCLE]
}

/// Immutable view of the song form at one melody tick.
///
/// Only the melody layer creates these; harmony and bass read the latest one
/// and must tolerate it being one tick stale.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSnapshot {
    /// Increases by one with every publication.
    pub version: u64,
    pub section_index: usize,
    pub letter: SectionLetter,
    /// Progression of the phrase now playing (the perturbed one during B).
    pub progression: ChordProgression,
    /// When the phrase started on the virtual clock.
    pub started_at: Moment,
    /// How long each chord of the phrase lasts.
    pub chord_span: Moment,
}

impl FormSnapshot {
    /// Index of the chord sounding at `now`, clamped to the last chord.
    pub fn active_chord(&self, now: Moment) -> usize {
        let span = self.chord_span.micros();
        if span == 0 {
            return 0;
        }
        let elapsed = (now - self.started_at).micros();
        ((elapsed / span) as usize).min(CHORDS_PER_PROGRESSION - 1)
    }

    /// Scale degree of the chord sounding at `now`.
    pub fn active_degree(&self, now: Moment) -> usize {
        self.progression.degree(self.active_chord(now))
    }
}
