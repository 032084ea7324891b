//! Layers — the five independently paced generative processes.
//!
//! A layer never touches a timer. The scheduler wakes it, hands it a
//! [`TickContext`], and the layer answers with a [`Tick`]: what to play (each
//! request at an offset from now), when to wake it next, and optionally a new
//! song-form snapshot. All randomness comes from the context's RNG so a seeded
//! run is fully reproducible.

pub mod ambience;
pub mod bass;
pub mod harmony;
pub mod melody;
pub mod wind;

pub use ambience::AmbienceLayer;
pub use bass::BassLayer;
pub use harmony::HarmonyLayer;
pub use melody::MelodyLayer;
pub use wind::WindLayer;

use rand_chacha::ChaCha8Rng;

use crate::event::{LayerId, Moment, SynthesisRequest};
use crate::params::EngineParameters;
use crate::section::FormSnapshot;
use crate::theory::ScaleGenerator;

/// Everything a layer may read while computing one tick.
pub struct TickContext<'a> {
    /// Virtual time of this wake-up.
    pub now: Moment,
    pub params: &'a EngineParameters,
    pub scale: &'a ScaleGenerator,
    /// Latest published song form, if melody has ticked at least once.
    pub form: Option<&'a FormSnapshot>,
    pub rng: &'a mut ChaCha8Rng,
}

impl<'a> TickContext<'a> {
    pub fn new(
        now: Moment,
        params: &'a EngineParameters,
        scale: &'a ScaleGenerator,
        form: Option<&'a FormSnapshot>,
        rng: &'a mut ChaCha8Rng,
    ) -> Self {
        Self {
            now,
            params,
            scale,
            form,
            rng,
        }
    }

    /// Span of `beats` at the tempo in effect right now.
    pub fn beats(&self, beats: f64) -> Moment {
        Moment::from_beats(beats, self.params.effective_tempo())
    }
}

/// A request to dispatch `offset` after the tick that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    pub offset: Moment,
    pub request: SynthesisRequest,
}

impl Emission {
    pub fn now(request: SynthesisRequest) -> Self {
        Self {
            offset: Moment::ZERO,
            request,
        }
    }

    pub fn after(offset: Moment, request: SynthesisRequest) -> Self {
        Self { offset, request }
    }
}

/// The result of one layer tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub emissions: Vec<Emission>,
    /// Delay until the layer's next wake-up.
    pub next_in: Moment,
    /// A new song-form snapshot. Only the melody layer sets this.
    pub publish: Option<FormSnapshot>,
}

impl Tick {
    /// Emit nothing and wake again after `next_in`.
    pub fn rest(next_in: Moment) -> Self {
        Self {
            emissions: Vec::new(),
            next_in,
            publish: None,
        }
    }

    pub fn play(emissions: Vec<Emission>, next_in: Moment) -> Self {
        Self {
            emissions,
            next_in,
            publish: None,
        }
    }

    pub fn is_rest(&self) -> bool {
        self.emissions.is_empty()
    }
}

/// One generative layer.
pub trait Layer: Send {
    fn id(&self) -> LayerId;

    /// Compute this wake-up's requests and the delay to the next one.
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Tick;
}

/// The five layers in arming order.
pub fn default_layers() -> Vec<Box<dyn Layer>> {
    vec![
        Box::new(MelodyLayer::new()),
        Box::new(HarmonyLayer::new()),
        Box::new(BassLayer::new()),
        Box::new(AmbienceLayer::new()),
        Box::new(WindLayer::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layers_follow_arming_order() {
        let ids: Vec<LayerId> = default_layers().iter().map(|l| l.id()).collect();
        assert_eq!(ids, LayerId::ALL.to_vec());
    }

    #[test]
    fn beats_use_current_tempo() {
        let mut params = EngineParameters::default();
        params.tempo = 60.0;
        let scale = ScaleGenerator::new();
        let mut rng = <ChaCha8Rng as rand::SeedableRng>::seed_from_u64(1);
        let ctx = TickContext::new(Moment::ZERO, &params, &scale, None, &mut rng);
        assert_eq!(ctx.beats(4.0), Moment::from_millis(4_000));
    }

    #[test]
    fn rest_tick_is_empty() {
        let tick = Tick::rest(Moment::from_millis(250));
        assert!(tick.is_rest());
        assert!(tick.publish.is_none());
    }
}
