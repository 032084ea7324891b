//! Event engine — discrete-event scheduler over a virtual clock.
//!
//! The [`EventScheduler`] owns the five layers, the shared parameters and scale,
//! and the latest song-form snapshot. Each layer is armed on a [`Timeline`];
//! advancing the clock pops due entries in time order, runs layer ticks, and
//! hands due requests to a [`SynthesisSink`].
//!
//! The scheduler never sleeps and never touches a device. Callers decide how
//! virtual time maps to wall time, which keeps every cascade testable.

pub mod cancel;
pub mod time;
pub mod timeline;
pub mod transport;
pub mod types;

pub use cancel::CancellationToken;
pub use time::{Moment, MICROS_PER_SECOND};
pub use timeline::{Action, Scheduled, Timeline};
pub use transport::{PlayState, Transport};
pub use types::{
    ChordRequest, Envelope, LayerId, SynthesisRequest, TextureKind, TextureParams,
    TextureRequest, ToneRequest, Waveform,
};

use std::sync::Arc;

use log::{debug, info, trace};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::layer::{default_layers, Layer, TickContext};
use crate::params::{EngineParameters, ParamUpdate};
use crate::section::FormSnapshot;
use crate::sink::{dispatch, SynthesisSink};
use crate::theory::ScaleGenerator;

/// Shortest delay a layer may re-arm with, so a zero-length tick cannot spin.
pub const MIN_REARM: Moment = Moment::from_millis(1);

/// The composition scheduler.
pub struct EventScheduler {
    timeline: Timeline,
    transport: Transport,
    rng: ChaCha8Rng,
    layers: Vec<Box<dyn Layer>>,
    params: EngineParameters,
    scale: ScaleGenerator,
    form: Option<Arc<FormSnapshot>>,
}

impl EventScheduler {
    /// A scheduler running the five standard layers, seeded for reproducibility.
    pub fn new(seed: u64) -> Self {
        Self::with_layers(seed, default_layers())
    }

    /// A scheduler over a custom set of layers, armed in the given order.
    pub fn with_layers(seed: u64, layers: Vec<Box<dyn Layer>>) -> Self {
        Self {
            timeline: Timeline::new(),
            transport: Transport::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            layers,
            params: EngineParameters::default(),
            scale: ScaleGenerator::new(),
            form: None,
        }
    }

    /// Arm every layer at the current position. Returns `false` if already
    /// playing.
    pub fn start(&mut self) -> bool {
        if !self.transport.play() {
            return false;
        }
        let now = self.transport.position();
        let token = self.transport.token().clone();
        self.timeline.insert_batch(
            self.layers
                .iter()
                .map(|layer| Scheduled::new(now, token.clone(), Action::Wake(layer.id()))),
        );
        debug!("scheduler: armed {} layers at {:?}", self.layers.len(), now);
        true
    }

    /// Cancel the current run. Pending wake-ups and dispatches are dropped.
    /// Returns `false` if already stopped.
    pub fn stop(&mut self) -> bool {
        if !self.transport.stop() {
            return false;
        }
        let purged = self.timeline.purge_cancelled();
        self.form = None;
        debug!("scheduler: stopped, {purged} pending entries dropped");
        true
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    /// Advance the virtual clock by `span`, running every wake-up and dispatch
    /// due before the new position. Entries created while advancing are
    /// processed too if they fall inside the window. Returns the number of
    /// requests handed to `sink`.
    pub fn advance<S: SynthesisSink + ?Sized>(&mut self, span: Moment, sink: &mut S) -> usize {
        let (_, end) = self.transport.advance(span);
        let mut dispatched = 0;

        while let Some(entry) = self.timeline.pop_before(end) {
            if entry.token.is_cancelled() {
                continue;
            }
            match entry.action {
                Action::Wake(id) => self.wake(id, entry.at, &entry.token),
                Action::Dispatch { layer, request } => {
                    trace!("{layer}: dispatch at {:?}", entry.at);
                    sink.cue(entry.at);
                    dispatch(sink, &request);
                    dispatched += 1;
                }
            }
        }

        dispatched
    }

    fn wake(&mut self, id: LayerId, at: Moment, token: &CancellationToken) {
        let Some(layer) = self.layers.iter_mut().find(|l| l.id() == id) else {
            return;
        };

        let form = self.form.clone();
        let mut ctx = TickContext::new(at, &self.params, &self.scale, form.as_deref(), &mut self.rng);
        let tick = layer.tick(&mut ctx);

        if let Some(snapshot) = tick.publish {
            trace!("{id}: published form v{}", snapshot.version);
            self.form = Some(Arc::new(snapshot));
        }

        let next = at + tick.next_in.max(MIN_REARM);
        let dispatches = tick.emissions.into_iter().map(|e| {
            Scheduled::new(
                at + e.offset,
                token.clone(),
                Action::Dispatch {
                    layer: id,
                    request: e.request,
                },
            )
        });
        self.timeline.insert_batch(dispatches);
        self.timeline
            .insert(Scheduled::new(next, token.clone(), Action::Wake(id)));
    }

    /// Set a parameter by name. Takes effect for events computed afterwards.
    pub fn set_parameter(&mut self, name: &str, value: f64) -> ParamUpdate {
        self.params.set(name, value)
    }

    /// Select a scale by name. Unknown names are ignored and return `false`.
    pub fn set_scale(&mut self, name: &str) -> bool {
        let changed = self.scale.set_scale(name);
        if changed {
            info!("scale set to {}", self.scale.current_scale());
        }
        changed
    }

    pub fn params(&self) -> &EngineParameters {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut EngineParameters {
        &mut self.params
    }

    pub fn scale(&self) -> &ScaleGenerator {
        &self.scale
    }

    /// The latest song-form snapshot, if melody has ticked in this run.
    pub fn form(&self) -> Option<Arc<FormSnapshot>> {
        self.form.clone()
    }

    pub fn position(&self) -> Moment {
        self.transport.position()
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Entries waiting on the timeline.
    pub fn pending(&self) -> usize {
        self.timeline.len()
    }
}
