//! Four-chord progressions drawn from a fixed catalogue.

use rand::Rng;

/// Chords per progression.
pub const CHORDS_PER_PROGRESSION: usize = 4;

/// Degree range used when perturbing a progression.
const DIATONIC_DEGREES: usize = 7;

/// Named harmonic patterns, as zero-based scale degrees.
pub const CATALOGUE: [(&str, [usize; CHORDS_PER_PROGRESSION]); 5] = [
    ("I-IV-V-I", [0, 3, 4, 0]),
    ("I-V-vi-IV", [0, 4, 5, 3]),
    ("vi-IV-I-V", [5, 3, 0, 4]),
    ("I-vi-IV-V", [0, 5, 3, 4]),
    ("ii-V-I-I", [1, 4, 0, 0]),
];

/// An immutable sequence of four chord degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChordProgression {
    degrees: [usize; CHORDS_PER_PROGRESSION],
}

impl ChordProgression {
    pub fn new(degrees: [usize; CHORDS_PER_PROGRESSION]) -> Self {
        Self { degrees }
    }

    /// Pick one pattern from the catalogue uniformly.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let (_, degrees) = CATALOGUE[rng.gen_range(0..CATALOGUE.len())];
        Self::new(degrees)
    }

    /// A copy with one randomly chosen chord moved up a degree (mod 7). Used
    /// to derive the contrasting B section.
    pub fn perturbed<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let mut degrees = self.degrees;
        let idx = rng.gen_range(0..CHORDS_PER_PROGRESSION);
        degrees[idx] = (degrees[idx] + 1) % DIATONIC_DEGREES;
        Self::new(degrees)
    }

    pub fn degrees(&self) -> &[usize; CHORDS_PER_PROGRESSION] {
        &self.degrees
    }

    pub fn degree(&self, index: usize) -> usize {
        self.degrees[index.min(CHORDS_PER_PROGRESSION - 1)]
    }

    /// Catalogue name, if this is an unmodified catalogue pattern.
    pub fn name(&self) -> Option<&'static str> {
        CATALOGUE
            .iter()
            .find(|(_, d)| *d == self.degrees)
            .map(|(name, _)| *name)
    }
}
