//! Song-form tracker — owns the chord progression, its two phrases, and the
//! AABA section cursor, and decides which phrase plays next.
//!
//! State machine:
//!
//! - `NoProgression → InSection(A, 0)`: draw a progression, build phrase A from
//!   it, derive a perturbed progression and build phrase B from that.
//! - `InSection(_, i) → InSection(pattern[i + 1], i + 1)` after each phrase.
//! - `InSection(_, 3) → NoProgression` once the cycle completes, instead of the
//!   normal increment.
//!
//! Per tick: the first A plays phrase A verbatim, the second A plays a fresh
//! variation of it, B plays phrase B, and the final A returns to phrase A.

pub mod form;

pub use form::{letter_at, FormSnapshot, SectionLetter, FORM_PATTERN, SECTIONS_PER_CYCLE};

use rand::Rng;

use crate::params::EngineParameters;
use crate::phrase::{vary, MelodicPhrase, PhraseGenerator};
use crate::theory::{ChordProgression, ScaleGenerator};

/// Observable tracker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    NoProgression,
    InSection {
        letter: SectionLetter,
        index: usize,
    },
}

/// How the phrase for a section is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhraseChoice {
    Original,
    Varied,
    Contrast,
}

impl PhraseChoice {
    pub fn for_section(index: usize) -> Self {
        match (letter_at(index), index % SECTIONS_PER_CYCLE) {
            (SectionLetter::B, _) => PhraseChoice::Contrast,
            (SectionLetter::A, 1) => PhraseChoice::Varied,
            (SectionLetter::A, _) => PhraseChoice::Original,
        }
    }
}

/// Material generated for one AABA cycle. Immutable once built.
#[derive(Debug, Clone)]
pub struct SongForm {
    pub progression: ChordProgression,
    pub contrast_progression: ChordProgression,
    pub phrase_a: MelodicPhrase,
    pub phrase_b: MelodicPhrase,
}

impl SongForm {
    pub fn generate<R: Rng + ?Sized>(
        scale: &ScaleGenerator,
        params: &EngineParameters,
        rng: &mut R,
    ) -> Self {
        let generator = PhraseGenerator::new(scale);
        let progression = ChordProgression::random(rng);
        let phrase_a = generator.generate(&progression, params, rng);
        let contrast_progression = progression.perturbed(rng);
        let phrase_b = generator.generate(&contrast_progression, params, rng);
        Self {
            progression,
            contrast_progression,
            phrase_a,
            phrase_b,
        }
    }
}

/// The outcome of one melody tick.
#[derive(Debug, Clone)]
pub struct FormStep {
    pub letter: SectionLetter,
    pub section_index: usize,
    /// A new progression was drawn on this tick.
    pub regenerated: bool,
    pub choice: PhraseChoice,
    /// Progression underlying `phrase`.
    pub progression: ChordProgression,
    pub phrase: MelodicPhrase,
}

/// Tracks the AABA cursor. Written only by the melody layer.
#[derive(Debug, Clone, Default)]
pub struct SongFormTracker {
    material: Option<SongForm>,
    section_index: usize,
    cycles: u64,
}

impl SongFormTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FormState {
        match self.material {
            None => FormState::NoProgression,
            Some(_) => FormState::InSection {
                letter: letter_at(self.section_index),
                index: self.section_index,
            },
        }
    }

    /// The current cycle's material, if a progression exists.
    pub fn material(&self) -> Option<&SongForm> {
        self.material.as_ref()
    }

    /// Completed AABA cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Choose the phrase for this tick, then move the cursor.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        scale: &ScaleGenerator,
        params: &EngineParameters,
        rng: &mut R,
    ) -> FormStep {
        let regenerated = self.material.is_none();
        if regenerated {
            self.section_index = 0;
        }
        let material = self
            .material
            .get_or_insert_with(|| SongForm::generate(scale, params, rng));

        let index = self.section_index;
        let choice = PhraseChoice::for_section(index);
        let (progression, phrase) = match choice {
            PhraseChoice::Original => (material.progression, material.phrase_a.clone()),
            PhraseChoice::Varied => {
                let span = material.phrase_a.total_duration();
                (material.progression, vary(&material.phrase_a, rng).fitted(span))
            }
            PhraseChoice::Contrast => (material.contrast_progression, material.phrase_b.clone()),
        };

        let step = FormStep {
            letter: letter_at(index),
            section_index: index,
            regenerated,
            choice,
            progression,
            phrase,
        };

        let next = index + 1;
        if next % SECTIONS_PER_CYCLE == 0 {
            self.material = None;
            self.section_index = 0;
            self.cycles += 1;
        } else {
            self.section_index = next;
        }

        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn run(ticks: usize) -> Vec<FormStep> {
        let scale = ScaleGenerator::new();
        let params = EngineParameters::default();
        let mut rng = ChaCha8Rng::seed_from_u64(31);
        let mut tracker = SongFormTracker::new();
        (0..ticks)
            .map(|_| tracker.advance(&scale, &params, &mut rng))
            .collect()
    }

    #[test]
    fn starts_without_progression() {
        assert_eq!(SongFormTracker::new().state(), FormState::NoProgression);
    }

    #[test]
    fn eight_ticks_follow_aaba_twice() {
        let steps = run(8);
        let letters: Vec<SectionLetter> = steps.iter().map(|s| s.letter).collect();
        use SectionLetter::{A, B};
        assert_eq!(letters, vec![A, A, B, A, A, A, B, A]);

        let regenerated: Vec<usize> = steps
            .iter()
            .enumerate()
            .filter(|(_, s)| s.regenerated)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(regenerated, vec![0, 4]);
    }

    #[test]
    fn phrase_choice_per_section() {
        let steps = run(4);
        assert_eq!(steps[0].choice, PhraseChoice::Original);
        assert_eq!(steps[1].choice, PhraseChoice::Varied);
        assert_eq!(steps[2].choice, PhraseChoice::Contrast);
        assert_eq!(steps[3].choice, PhraseChoice::Original);
        // First and last A are identical; the return is verbatim.
        assert_eq!(steps[0].phrase, steps[3].phrase);
    }

    #[test]
    fn varied_a_keeps_pitches() {
        let steps = run(2);
        let a: Vec<f64> = steps[0].phrase.notes().iter().map(|n| n.frequency).collect();
        let a2: Vec<f64> = steps[1].phrase.notes().iter().map(|n| n.frequency).collect();
        assert_eq!(a, a2);
    }

    #[test]
    fn varied_a_covers_the_same_span() {
        for step in run(40).iter().filter(|s| s.choice == PhraseChoice::Varied) {
            assert!((step.phrase.total_duration() - 8.0).abs() < 1e-9);
            assert!(step.phrase.notes().iter().all(|n| n.duration > 0.0));
        }
    }

    #[test]
    fn b_section_uses_perturbed_progression() {
        let steps = run(3);
        let base = steps[0].progression;
        let contrast = steps[2].progression;
        let differing = (0..4).filter(|&i| base.degree(i) != contrast.degree(i)).count();
        assert_eq!(differing, 1);
    }

    #[test]
    fn state_cycles_back_to_no_progression() {
        let scale = ScaleGenerator::new();
        let params = EngineParameters::default();
        let mut rng = ChaCha8Rng::seed_from_u64(32);
        let mut tracker = SongFormTracker::new();

        tracker.advance(&scale, &params, &mut rng);
        assert_eq!(
            tracker.state(),
            FormState::InSection {
                letter: SectionLetter::A,
                index: 1
            }
        );
        tracker.advance(&scale, &params, &mut rng);
        assert_eq!(
            tracker.state(),
            FormState::InSection {
                letter: SectionLetter::B,
                index: 2
            }
        );
        tracker.advance(&scale, &params, &mut rng);
        tracker.advance(&scale, &params, &mut rng);
        assert_eq!(tracker.state(), FormState::NoProgression);
        assert_eq!(tracker.cycles(), 1);
        assert!(tracker.material().is_none());
    }
}
