//! Harmony layer — sustained chords following the melody's progression.

use log::{debug, trace};

use super::{Emission, Layer, Tick, TickContext};
use crate::event::{ChordRequest, LayerId, Moment, SynthesisRequest};
use crate::phrase::BEATS_PER_CHORD;
use crate::theory::{OctaveRange, CHORDS_PER_PROGRESSION};

/// How often to look for a progression before the melody has published one.
pub const POLL_INTERVAL: Moment = Moment::from_millis(1_000);

pub const HARMONY_OCTAVES: OctaveRange = OctaveRange::new(0, 1);

/// At or above this `harmony` value chords gain a seventh.
pub const SEVENTH_THRESHOLD: f64 = 5.0;

/// Scale steps from the root to the seventh.
const SEVENTH_STEPS: usize = 6;

#[derive(Debug, Default)]
pub struct HarmonyLayer;

impl HarmonyLayer {
    pub fn new() -> Self {
        Self
    }
}

impl Layer for HarmonyLayer {
    fn id(&self) -> LayerId {
        LayerId::Harmony
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Tick {
        let Some(form) = ctx.form else {
            trace!("harmony: no progression yet");
            return Tick::rest(POLL_INTERVAL);
        };
        let progression = form.progression;

        let chord_span = ctx.beats(BEATS_PER_CHORD as f64);
        let with_seventh = ctx.params.harmony >= SEVENTH_THRESHOLD;

        let mut emissions = Vec::with_capacity(CHORDS_PER_PROGRESSION);
        let mut offset = Moment::ZERO;
        for &degree in progression.degrees() {
            let mut frequencies = ctx.scale.chord_tones(degree, HARMONY_OCTAVES, ctx.rng);
            if with_seventh {
                let octave = HARMONY_OCTAVES.sample(ctx.rng);
                frequencies.push(ctx.scale.degree_frequency(degree + SEVENTH_STEPS, octave));
            }
            emissions.push(Emission::after(
                offset,
                SynthesisRequest::Chord(ChordRequest {
                    frequencies,
                    duration: chord_span.as_secs_f64(),
                }),
            ));
            offset += chord_span;
        }

        debug!(
            "harmony: {} chords over {:?}",
            emissions.len(),
            progression.degrees()
        );
        Tick::play(emissions, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::EngineParameters;
    use crate::section::{FormSnapshot, SectionLetter};
    use crate::theory::{ChordProgression, ScaleGenerator};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn snapshot() -> FormSnapshot {
        FormSnapshot {
            version: 1,
            section_index: 0,
            letter: SectionLetter::A,
            progression: ChordProgression::new([0, 3, 4, 0]),
            started_at: Moment::ZERO,
            chord_span: Moment::from_millis(2_000),
        }
    }

    #[test]
    fn polls_every_second_without_progression() {
        let params = EngineParameters::default();
        let scale = ScaleGenerator::new();
        let mut rng = ChaCha8Rng::seed_from_u64(51);
        let mut ctx = TickContext::new(Moment::ZERO, &params, &scale, None, &mut rng);
        let tick = HarmonyLayer::new().tick(&mut ctx);
        assert!(tick.is_rest());
        assert_eq!(tick.next_in, POLL_INTERVAL);
    }

    #[test]
    fn four_chords_at_increasing_offsets() {
        let params = EngineParameters::default();
        let scale = ScaleGenerator::new();
        let form = snapshot();
        let mut rng = ChaCha8Rng::seed_from_u64(52);
        let mut ctx = TickContext::new(Moment::ZERO, &params, &scale, Some(&form), &mut rng);
        let tick = HarmonyLayer::new().tick(&mut ctx);

        let offsets: Vec<u64> = tick.emissions.iter().map(|e| e.offset.micros()).collect();
        assert_eq!(offsets, vec![0, 2_000_000, 4_000_000, 6_000_000]);
        assert_eq!(tick.next_in, Moment::from_millis(8_000));
        for emission in &tick.emissions {
            match &emission.request {
                SynthesisRequest::Chord(chord) => {
                    assert_eq!(chord.frequencies.len(), 3);
                    assert!((chord.duration - 2.0).abs() < 1e-9);
                }
                other => panic!("unexpected request {other:?}"),
            }
        }
    }

    #[test]
    fn chords_follow_the_published_progression() {
        let params = EngineParameters::default();
        let scale = ScaleGenerator::new();
        let form = snapshot();
        let mut rng = ChaCha8Rng::seed_from_u64(53);
        let mut ctx = TickContext::new(Moment::ZERO, &params, &scale, Some(&form), &mut rng);
        let tick = HarmonyLayer::new().tick(&mut ctx);

        for (emission, &degree) in tick.emissions.iter().zip(form.progression.degrees()) {
            let pool = scale.chord_tone_pool(degree, HARMONY_OCTAVES);
            if let SynthesisRequest::Chord(chord) = &emission.request {
                for f in &chord.frequencies {
                    assert!(pool.iter().any(|p| (p - f).abs() < 1e-9));
                }
            }
        }
    }

    #[test]
    fn high_harmony_adds_a_seventh() {
        let mut params = EngineParameters::default();
        params.harmony = 7.0;
        let scale = ScaleGenerator::new();
        let form = snapshot();
        let mut rng = ChaCha8Rng::seed_from_u64(54);
        let mut ctx = TickContext::new(Moment::ZERO, &params, &scale, Some(&form), &mut rng);
        let tick = HarmonyLayer::new().tick(&mut ctx);
        for emission in &tick.emissions {
            if let SynthesisRequest::Chord(chord) = &emission.request {
                assert_eq!(chord.frequencies.len(), 4);
            }
        }
    }
}
