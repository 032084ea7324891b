//! Bass layer — long swirling textures on the active chord root.
//!
//! Each cycle either plays (a swirl, or a sub tone with a quieter swirl on
//! top) for 16 or 32 beats, or rests for 4 to 8 beats. Without a published
//! progression the layer rests.

use log::debug;
use rand::Rng;

use super::{Emission, Layer, Tick, TickContext};
use crate::event::{LayerId, SynthesisRequest, TextureKind, TextureParams, TextureRequest};

/// Chance a cycle plays anything.
pub const PLAY_PROBABILITY: f64 = 0.85;

/// Chance a playing cycle pairs a sub tone with the swirl.
pub const SUB_PROBABILITY: f64 = 0.3;

/// Playing cycles last one of these, in beats, with equal chance.
pub const SHORT_BEATS: f64 = 16.0;
pub const LONG_BEATS: f64 = 32.0;

/// Rest length in beats, uniform in `[REST_MIN_BEATS, REST_MAX_BEATS]`.
pub const REST_MIN_BEATS: f64 = 4.0;
pub const REST_MAX_BEATS: f64 = 8.0;

/// Octave the root is voiced in: one below the harmony.
pub const BASS_OCTAVE: i32 = -1;

pub const BASS_VOLUME: f64 = 0.25;

/// The swirl sits at this fraction of the sub tone's volume when paired.
pub const PAIRED_SWIRL_RATIO: f64 = 0.5;

const SWIRL_FILTER_FROM: f64 = 180.0;
const SWIRL_FILTER_TO: f64 = 650.0;
const SWIRL_LFO_RATE: f64 = 0.15;
const SUB_CUTOFF: f64 = 140.0;

#[derive(Debug, Default)]
pub struct BassLayer;

impl BassLayer {
    pub fn new() -> Self {
        Self
    }
}

impl Layer for BassLayer {
    fn id(&self) -> LayerId {
        LayerId::Bass
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Tick {
        let Some(degree) = ctx.form.map(|f| f.active_degree(ctx.now)) else {
            return rest(ctx);
        };
        if !ctx.rng.gen_bool(PLAY_PROBABILITY) {
            return rest(ctx);
        }

        let beats = if ctx.rng.gen_bool(0.5) {
            SHORT_BEATS
        } else {
            LONG_BEATS
        };
        let span = ctx.beats(beats);
        let duration = span.as_secs_f64();
        let root = ctx.scale.degree_frequency(degree, BASS_OCTAVE);

        let emissions = if ctx.rng.gen_bool(SUB_PROBABILITY) {
            debug!("bass: sub + swirl on {root:.2} Hz for {beats} beats");
            vec![
                Emission::now(sub(root, duration, BASS_VOLUME)),
                Emission::now(swirl(root, duration, BASS_VOLUME * PAIRED_SWIRL_RATIO)),
            ]
        } else {
            debug!("bass: swirl on {root:.2} Hz for {beats} beats");
            vec![Emission::now(swirl(root, duration, BASS_VOLUME))]
        };
        Tick::play(emissions, span)
    }
}

fn rest(ctx: &mut TickContext<'_>) -> Tick {
    let beats = ctx.rng.gen_range(REST_MIN_BEATS..=REST_MAX_BEATS);
    debug!("bass: rest {beats:.1} beats");
    Tick::rest(ctx.beats(beats))
}

fn swirl(root: f64, duration: f64, volume: f64) -> SynthesisRequest {
    SynthesisRequest::Texture(TextureRequest {
        kind: TextureKind::SwirlBass,
        params: TextureParams {
            frequency: Some(root),
            filter_from: SWIRL_FILTER_FROM,
            filter_to: SWIRL_FILTER_TO,
            lfo_rate: SWIRL_LFO_RATE,
        },
        duration,
        volume,
    })
}

/// A plain sine an octave under the swirl.
fn sub(root: f64, duration: f64, volume: f64) -> SynthesisRequest {
    SynthesisRequest::Texture(TextureRequest {
        kind: TextureKind::SubBass,
        params: TextureParams {
            frequency: Some(root / 2.0),
            filter_from: SUB_CUTOFF,
            filter_to: SUB_CUTOFF,
            lfo_rate: 0.0,
        },
        duration,
        volume,
    })
}
