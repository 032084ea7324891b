//! Ambience layer — overlapping soft sine tones, independent of the song form.

use log::trace;
use rand::Rng;

use super::{Emission, Layer, Tick, TickContext};
use crate::event::{Envelope, LayerId, Moment, SynthesisRequest, ToneRequest, Waveform};
use crate::theory::OctaveRange;

pub const AMBIENCE_OCTAVES: OctaveRange = OctaveRange::new(0, 2);

/// Tone length in seconds, drawn from `[MIN_DURATION, MAX_DURATION)`.
pub const MIN_DURATION: f64 = 3.0;
pub const MAX_DURATION: f64 = 5.0;

/// Fraction of a tone's length after which the next one starts.
pub const REARM_FRACTION: f64 = 0.7;

pub const AMBIENCE_VOLUME: f64 = 0.05;

#[derive(Debug, Default)]
pub struct AmbienceLayer;

impl AmbienceLayer {
    pub fn new() -> Self {
        Self
    }
}

impl Layer for AmbienceLayer {
    fn id(&self) -> LayerId {
        LayerId::Ambience
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Tick {
        let duration = ctx.rng.gen_range(MIN_DURATION..MAX_DURATION);
        let frequency = ctx.scale.random_frequency(AMBIENCE_OCTAVES, ctx.rng);
        trace!("ambience: {frequency:.2} Hz for {duration:.2}s");

        let tone = SynthesisRequest::Tone(ToneRequest {
            frequency,
            waveform: Waveform::Sine,
            duration,
            volume: AMBIENCE_VOLUME,
            envelope: Some(Envelope::SOFT),
        });
        Tick::play(
            vec![Emission::now(tone)],
            Moment::from_secs_f64(duration * REARM_FRACTION),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::EngineParameters;
    use crate::theory::ScaleGenerator;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn rearms_at_seventy_percent_of_the_tone() {
        let params = EngineParameters::default();
        let scale = ScaleGenerator::new();
        let mut rng = ChaCha8Rng::seed_from_u64(61);
        let mut layer = AmbienceLayer::new();

        for _ in 0..200 {
            let mut ctx = TickContext::new(Moment::ZERO, &params, &scale, None, &mut rng);
            let tick = layer.tick(&mut ctx);
            assert_eq!(tick.emissions.len(), 1);
            let duration = tick.emissions[0].request.duration();
            assert!((MIN_DURATION..MAX_DURATION).contains(&duration));
            let expected = Moment::from_secs_f64(duration * REARM_FRACTION);
            assert_eq!(tick.next_in, expected);
            // Cycles overlap.
            assert!(tick.next_in.as_secs_f64() < duration);
        }
    }

    #[test]
    fn tones_are_quiet_sines_in_range() {
        let params = EngineParameters::default();
        let scale = ScaleGenerator::new();
        let pool = scale.tones_in_range(AMBIENCE_OCTAVES);
        let mut rng = ChaCha8Rng::seed_from_u64(62);
        let mut ctx = TickContext::new(Moment::ZERO, &params, &scale, None, &mut rng);
        let tick = AmbienceLayer::new().tick(&mut ctx);
        match &tick.emissions[0].request {
            SynthesisRequest::Tone(tone) => {
                assert_eq!(tone.waveform, Waveform::Sine);
                assert!((tone.volume - AMBIENCE_VOLUME).abs() < f64::EPSILON);
                assert!(pool.iter().any(|p| (p - tone.frequency).abs() < 1e-9));
            }
            other => panic!("unexpected request {other:?}"),
        }
    }
}
