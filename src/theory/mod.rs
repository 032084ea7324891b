//! Music theory — scales, chord tones, passing tones, and chord progressions.
//!
//! Pure functions over the selected scale. Nothing here knows about time.

pub mod progression;
pub mod scale;

pub use progression::{ChordProgression, CATALOGUE, CHORDS_PER_PROGRESSION};
pub use scale::{OctaveRange, ScaleGenerator, ScaleKind, BASE_FREQUENCY, OCTAVE};
