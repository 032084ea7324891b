//! Engine — the public lifecycle around the scheduler and a synthesis sink.
//!
//! ```text
//! Engine::new(sink, seed)
//!     initialize()  -> prepares the sink; the only step that can fail
//!     start()       -> arms the five layers at the current position
//!     advance(span) -> runs everything due in the next `span` of virtual time
//!     stop()        -> cancels the run and releases every sounding voice
//! ```
//!
//! Parameter and scale changes are accepted at any time and only affect
//! events computed after the call.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::event::{EventScheduler, Moment};
use crate::instrument::Mixer;
use crate::params::{EngineParameters, ParamName, ParamUpdate};
use crate::section::FormSnapshot;
use crate::sink::{SynthesisSink, TelemetrySink};
use crate::theory::ScaleKind;

/// A composition engine driving one synthesis sink.
pub struct Engine<S: SynthesisSink> {
    scheduler: EventScheduler,
    sink: S,
    seed: u64,
    initialized: bool,
    /// Frames covered by `advance_frames`, so block-sized steps never drift.
    frame_clock: u64,
}

impl<S: SynthesisSink> Engine<S> {
    pub fn new(sink: S, seed: u64) -> Self {
        Self {
            scheduler: EventScheduler::new(seed),
            sink,
            seed,
            initialized: false,
            frame_clock: 0,
        }
    }

    /// An engine with the configured scale and parameters. Without a configured
    /// seed a fresh one is drawn so every run is a new composition.
    pub fn with_config(sink: S, config: &EngineConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut engine = Self::new(sink, seed);
        engine.scheduler.set_scale(config.scale.name());
        *engine.scheduler.params_mut() = config.parameters.clone();
        engine
    }

    /// Prepare the sink. Calling it again after success is a no-op.
    pub fn initialize(&mut self) -> Result<(), EngineError> {
        if self.initialized {
            return Ok(());
        }
        self.sink.prepare()?;
        self.sink.apply_parameters(self.scheduler.params());
        self.initialized = true;
        info!(
            "engine initialized (seed {}, scale {})",
            self.seed,
            self.current_scale()
        );
        Ok(())
    }

    /// Begin composing. Fails if [`initialize`](Self::initialize) has not
    /// succeeded; starting a running engine does nothing.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if !self.initialized {
            return Err(EngineError::NotInitialized);
        }
        if self.scheduler.start() {
            info!("engine started at {:.3}s", self.position().as_secs_f64());
        } else {
            debug!("engine already running");
        }
        Ok(())
    }

    /// Stop composing. Pending events are cancelled and sounding voices are
    /// released. Stopping a stopped engine does nothing.
    pub fn stop(&mut self) {
        if self.scheduler.stop() {
            self.sink.release_all();
            info!("engine stopped at {:.3}s", self.position().as_secs_f64());
        }
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_playing()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Advance virtual time by `span`. Returns the number of requests sent to
    /// the sink.
    pub fn advance(&mut self, span: Moment) -> usize {
        self.scheduler.advance(span, &mut self.sink)
    }

    /// Advance by a number of audio frames. The target position is derived
    /// from the running frame count so rounding never accumulates.
    pub fn advance_frames(&mut self, frames: usize, sample_rate: u32) -> usize {
        self.frame_clock += frames as u64;
        let target = Moment::from_frames(self.frame_clock, sample_rate);
        let span = target - self.scheduler.position();
        self.advance(span)
    }

    /// Set a parameter by name. Unknown names are kept but have no effect.
    pub fn set_parameter(&mut self, name: &str, value: f64) {
        match self.scheduler.set_parameter(name, value) {
            ParamUpdate::Known(param) => {
                debug!("parameter {param} = {value}");
                if matches!(param, ParamName::Volume | ParamName::Reverb) {
                    self.sink.apply_parameters(self.scheduler.params());
                }
            }
            ParamUpdate::Stored(name) => {
                warn!("unknown parameter '{name}' = {value}; ignored by generation");
            }
        }
    }

    /// Select a scale by name. Unknown names leave the current scale in place.
    pub fn set_scale(&mut self, name: &str) {
        if !self.scheduler.set_scale(name) {
            warn!("unknown scale '{name}'; keeping {}", self.current_scale());
        }
    }

    pub fn current_scale(&self) -> ScaleKind {
        self.scheduler.scale().current_scale()
    }

    pub fn params(&self) -> &EngineParameters {
        self.scheduler.params()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn position(&self) -> Moment {
        self.scheduler.position()
    }

    /// The latest published song-form state, if any.
    pub fn form(&self) -> Option<Arc<FormSnapshot>> {
        self.scheduler.form()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

impl<S: SynthesisSink + TelemetrySink> Engine<S> {
    /// The most recent output waveform, absent until initialized.
    pub fn waveform_snapshot(&self) -> Option<Vec<u8>> {
        if !self.initialized {
            return None;
        }
        self.sink.waveform_snapshot()
    }
}

impl Engine<Mixer> {
    /// Advance by `frames` and render them, duplicated across `channels`.
    pub fn render(&mut self, frames: usize, channels: u16) -> Vec<f32> {
        let sample_rate = self.sink.sample_rate();
        self.advance_frames(frames, sample_rate);
        self.sink.render_interleaved(frames, channels)
    }
}
