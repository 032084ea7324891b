//! Phrase variation — new timing and dynamics, same pitches.
//!
//! Repeated A sections stay recognisable because pitch is never touched; only
//! durations and intensities drift within small multiplicative ranges.

use rand::Rng;

use super::{MelodicPhrase, NoteEvent};

/// Every n-th note is an anchor.
pub const ANCHOR_INTERVAL: usize = 4;

/// Chance an anchor note is copied verbatim.
pub const ANCHOR_KEEP_PROBABILITY: f64 = 0.7;

/// Chance any other note is varied.
pub const VARIATION_PROBABILITY: f64 = 0.4;

pub const DURATION_SCALE_MIN: f64 = 0.85;
pub const DURATION_SCALE_MAX: f64 = 1.15;
pub const INTENSITY_SCALE_MIN: f64 = 0.9;
pub const INTENSITY_SCALE_MAX: f64 = 1.1;

/// Derive a varied copy of `phrase`. The original is left untouched.
pub fn vary<R: Rng + ?Sized>(phrase: &MelodicPhrase, rng: &mut R) -> MelodicPhrase {
    let notes = phrase
        .notes()
        .iter()
        .enumerate()
        .map(|(i, note)| {
            if i % ANCHOR_INTERVAL == 0 && rng.gen_bool(ANCHOR_KEEP_PROBABILITY) {
                return *note;
            }
            if rng.gen_bool(VARIATION_PROBABILITY) {
                NoteEvent {
                    frequency: note.frequency,
                    duration: note.duration
                        * rng.gen_range(DURATION_SCALE_MIN..=DURATION_SCALE_MAX),
                    intensity: note.intensity
                        * rng.gen_range(INTENSITY_SCALE_MIN..=INTENSITY_SCALE_MAX),
                }
            } else {
                *note
            }
        })
        .collect();

    MelodicPhrase::new(notes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn flat_phrase(len: usize) -> MelodicPhrase {
        MelodicPhrase::new(
            (0..len)
                .map(|i| NoteEvent {
                    frequency: 261.63 * (1.0 + i as f64 / 10.0),
                    duration: 0.5,
                    intensity: 1.0,
                })
                .collect(),
        )
    }

    #[test]
    fn pitches_are_never_altered() {
        let original = flat_phrase(64);
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        for _ in 0..20 {
            let varied = vary(&original, &mut rng);
            assert_eq!(varied.len(), original.len());
            for (a, b) in original.notes().iter().zip(varied.notes()) {
                assert_eq!(a.frequency, b.frequency);
            }
        }
    }

    #[test]
    fn changes_stay_within_documented_ranges() {
        let original = flat_phrase(64);
        let mut rng = ChaCha8Rng::seed_from_u64(22);
        for _ in 0..20 {
            let varied = vary(&original, &mut rng);
            for (a, b) in original.notes().iter().zip(varied.notes()) {
                let d = b.duration / a.duration;
                let v = b.intensity / a.intensity;
                assert!((DURATION_SCALE_MIN - 1e-12..=DURATION_SCALE_MAX + 1e-12).contains(&d));
                assert!((INTENSITY_SCALE_MIN - 1e-12..=INTENSITY_SCALE_MAX + 1e-12).contains(&v));
            }
        }
    }

    #[test]
    fn original_is_untouched() {
        let original = flat_phrase(16);
        let snapshot = original.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        let _ = vary(&original, &mut rng);
        assert_eq!(original, snapshot);
    }

    #[test]
    fn anchors_are_mostly_kept() {
        let original = flat_phrase(4_000);
        let mut rng = ChaCha8Rng::seed_from_u64(24);
        let varied = vary(&original, &mut rng);

        let rate = |filter: &dyn Fn(usize) -> bool| {
            let (kept, total) = original
                .notes()
                .iter()
                .zip(varied.notes())
                .enumerate()
                .filter(|(i, _)| filter(*i))
                .fold((0usize, 0usize), |(k, t), (_, (a, b))| {
                    (k + usize::from(a == b), t + 1)
                });
            kept as f64 / total as f64
        };

        // Anchors: 0.7 + 0.3 * 0.6 = 0.88 kept. Others: 0.6 kept.
        let anchor_rate = rate(&|i| i % ANCHOR_INTERVAL == 0);
        let other_rate = rate(&|i| i % ANCHOR_INTERVAL != 0);
        assert!((anchor_rate - 0.88).abs() < 0.05, "anchor rate {anchor_rate}");
        assert!((other_rate - 0.6).abs() < 0.05, "other rate {other_rate}");
    }

    #[test]
    fn empty_phrase_stays_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(25);
        assert!(vary(&MelodicPhrase::default(), &mut rng).is_empty());
    }
}
