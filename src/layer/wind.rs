//! Wind layer — occasional swept noise, independent of harmony.

use log::debug;
use rand::Rng;

use super::{Emission, Layer, Tick, TickContext};
use crate::event::{LayerId, SynthesisRequest, TextureKind, TextureParams, TextureRequest};

/// Chance a cycle plays a gust.
pub const PLAY_PROBABILITY: f64 = 0.35;

/// Gust lengths in beats, chosen with equal chance.
pub const SHORT_BEATS: f64 = 12.0;
pub const LONG_BEATS: f64 = 24.0;

/// Rest length in beats, uniform in `[REST_MIN_BEATS, REST_MAX_BEATS]`.
pub const REST_MIN_BEATS: f64 = 8.0;
pub const REST_MAX_BEATS: f64 = 24.0;

pub const WIND_VOLUME: f64 = 0.04;

const SWEEP_FROM: f64 = 400.0;
const SWEEP_TO: f64 = 2_400.0;
const SWEEP_LFO_RATE: f64 = 0.07;

#[derive(Debug, Default)]
pub struct WindLayer;

impl WindLayer {
    pub fn new() -> Self {
        Self
    }
}

impl Layer for WindLayer {
    fn id(&self) -> LayerId {
        LayerId::Wind
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Tick {
        if !ctx.rng.gen_bool(PLAY_PROBABILITY) {
            let beats = ctx.rng.gen_range(REST_MIN_BEATS..=REST_MAX_BEATS);
            debug!("wind: rest {beats:.1} beats");
            return Tick::rest(ctx.beats(beats));
        }

        let beats = if ctx.rng.gen_bool(0.5) {
            SHORT_BEATS
        } else {
            LONG_BEATS
        };
        let span = ctx.beats(beats);
        debug!("wind: gust for {beats} beats");

        let gust = SynthesisRequest::Texture(TextureRequest {
            kind: TextureKind::WindSwirl,
            params: TextureParams {
                frequency: None,
                filter_from: SWEEP_FROM,
                filter_to: SWEEP_TO,
                lfo_rate: SWEEP_LFO_RATE,
            },
            duration: span.as_secs_f64(),
            volume: WIND_VOLUME,
        });
        Tick::play(vec![Emission::now(gust)], span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Moment;
    use crate::params::EngineParameters;
    use crate::theory::ScaleGenerator;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn gust_rate_converges() {
        let params = EngineParameters::default();
        let scale = ScaleGenerator::new();
        let mut rng = ChaCha8Rng::seed_from_u64(81);
        let mut layer = WindLayer::new();
        let cycles = 20_000;
        let mut gusts = 0;
        for _ in 0..cycles {
            let mut ctx = TickContext::new(Moment::ZERO, &params, &scale, None, &mut rng);
            if !layer.tick(&mut ctx).is_rest() {
                gusts += 1;
            }
        }
        let rate = gusts as f64 / cycles as f64;
        assert!((rate - PLAY_PROBABILITY).abs() < 0.015, "gust rate {rate}");
    }

    #[test]
    fn gusts_and_rests_have_documented_lengths() {
        let params = EngineParameters::default();
        let scale = ScaleGenerator::new();
        let mut rng = ChaCha8Rng::seed_from_u64(82);
        for _ in 0..500 {
            let mut ctx = TickContext::new(Moment::ZERO, &params, &scale, None, &mut rng);
            let tick = WindLayer::new().tick(&mut ctx);
            let ms = tick.next_in.micros() / 1_000;
            if tick.is_rest() {
                // 8 to 24 beats at 120 BPM.
                assert!((4_000..=12_000).contains(&ms), "rest {ms}ms");
            } else {
                assert!(ms == 6_000 || ms == 12_000, "gust {ms}ms");
                match &tick.emissions[0].request {
                    SynthesisRequest::Texture(t) => {
                        assert_eq!(t.kind, TextureKind::WindSwirl);
                        assert!(t.params.frequency.is_none());
                    }
                    other => panic!("unexpected request {other:?}"),
                }
            }
        }
    }
}
