//! Mixer — the concrete synthesis backend.
//!
//! Turns synthesis requests into voices, renders them block by block through
//! the reverb and the master gain, and keeps the analyser fed. Voices start on
//! the exact frame their request was cued for.

use log::{debug, trace};

use crate::error::{SinkError, VoiceError};
use crate::event::{ChordRequest, Envelope, Moment, TextureRequest, ToneRequest, Waveform};
use crate::params::EngineParameters;
use crate::sink::{SynthesisSink, TelemetrySink};

use super::analyser::Analyser;
use super::reverb::Reverb;
use super::stage::{GainStage, SignalStage};
use super::texture::TextureVoice;
use super::voice::{ToneVoice, Voice};

/// Combined level of all voices in a chord.
pub const CHORD_LEVEL: f64 = 0.15;

/// Seconds over which volume and reverb changes glide.
pub const PARAM_RAMP_SECONDS: f64 = 0.1;

struct ActiveVoice {
    start_frame: u64,
    voice: Box<dyn Voice>,
}

/// Renders requests into mono sample blocks.
pub struct Mixer {
    sample_rate: u32,
    voices: Vec<ActiveVoice>,
    /// Frames rendered so far. Frame 0 is virtual time zero.
    rendered_frames: u64,
    cue_frame: u64,
    reverb: Reverb,
    master: GainStage,
    analyser: Option<Analyser>,
    noise_seed: u64,
    dry_bus: Vec<f32>,
    wet_bus: Vec<f32>,
}

impl Mixer {
    pub fn new(sample_rate: u32) -> Self {
        let params = EngineParameters::default();
        Self {
            sample_rate,
            voices: Vec::new(),
            rendered_frames: 0,
            cue_frame: 0,
            reverb: Reverb::new(sample_rate, params.reverb as f32),
            master: GainStage::new(params.volume as f32),
            analyser: None,
            noise_seed: 0,
            dry_bus: Vec::new(),
            wet_bus: Vec::new(),
        }
    }

    /// Seed for the noise sources of texture voices.
    pub fn with_noise_seed(mut self, seed: u64) -> Self {
        self.noise_seed = seed;
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Voices still sounding or waiting to start.
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Virtual time of the next frame to render.
    pub fn position(&self) -> Moment {
        Moment::from_frames(self.rendered_frames, self.sample_rate)
    }

    pub fn master_gain(&self) -> f32 {
        self.master.gain()
    }

    pub fn reverb_mix(&self) -> f32 {
        self.reverb.mix()
    }

    fn add(&mut self, voice: Box<dyn Voice>) {
        let start_frame = self.cue_frame.max(self.rendered_frames);
        self.voices.push(ActiveVoice { start_frame, voice });
    }

    fn ramp_samples(&self) -> u32 {
        (PARAM_RAMP_SECONDS * self.sample_rate as f64).round() as u32
    }

    /// Render the next `frames` mono samples.
    pub fn render_block(&mut self, frames: usize) -> Vec<f32> {
        self.dry_bus.clear();
        self.dry_bus.resize(frames, 0.0);

        let block_start = self.rendered_frames;
        for active in &mut self.voices {
            let offset = active.start_frame.saturating_sub(block_start) as usize;
            if offset >= frames {
                continue;
            }
            for sample in &mut self.dry_bus[offset..] {
                *sample += active.voice.next_sample();
            }
        }
        let before = self.voices.len();
        self.voices
            .retain(|v| v.start_frame >= block_start + frames as u64 || !v.voice.is_finished());
        if before != self.voices.len() {
            trace!("mixer: {} voices finished", before - self.voices.len());
        }

        // voices -> reverb -> master -> output
        self.wet_bus.clear();
        self.wet_bus.resize(frames, 0.0);
        self.reverb.accept_input(&self.dry_bus);
        self.reverb.route_to(&mut self.wet_bus);

        let mut output = vec![0.0; frames];
        self.master.accept_input(&self.wet_bus);
        self.master.route_to(&mut output);

        if let Some(analyser) = &mut self.analyser {
            analyser.capture(&output);
        }
        self.rendered_frames += frames as u64;
        output
    }

    /// Render `frames` frames duplicated across `channels`, interleaved.
    pub fn render_interleaved(&mut self, frames: usize, channels: u16) -> Vec<f32> {
        let mono = self.render_block(frames);
        let channels = channels.max(1) as usize;
        mono.iter()
            .flat_map(|&s| std::iter::repeat(s).take(channels))
            .collect()
    }
}

impl SynthesisSink for Mixer {
    fn prepare(&mut self) -> Result<(), SinkError> {
        if self.sample_rate == 0 {
            return Err(SinkError::Unavailable("sample rate is zero".to_string()));
        }
        if self.analyser.is_none() {
            self.analyser = Some(Analyser::new());
            debug!("mixer: prepared at {} Hz", self.sample_rate);
        }
        Ok(())
    }

    fn cue(&mut self, at: Moment) {
        self.cue_frame = at.to_frames(self.sample_rate);
    }

    fn play_tone(&mut self, tone: &ToneRequest) {
        self.add(Box::new(ToneVoice::new(tone, self.sample_rate)));
    }

    fn play_chord(&mut self, chord: &ChordRequest) {
        if chord.frequencies.is_empty() {
            return;
        }
        let volume = CHORD_LEVEL / chord.frequencies.len() as f64;
        for &frequency in &chord.frequencies {
            let tone = ToneRequest {
                frequency,
                waveform: Waveform::Sine,
                duration: chord.duration,
                volume,
                envelope: Some(Envelope::SOFT),
            };
            self.add(Box::new(ToneVoice::new(&tone, self.sample_rate)));
        }
    }

    fn play_texture(&mut self, texture: &TextureRequest) {
        self.noise_seed = self.noise_seed.wrapping_add(1);
        self.add(Box::new(TextureVoice::new(
            texture,
            self.sample_rate,
            self.noise_seed,
        )));
    }

    fn release_all(&mut self) {
        let mut already = 0;
        for active in &mut self.voices {
            if let Err(VoiceError::AlreadyStopped) = active.voice.stop() {
                already += 1;
            }
        }
        debug!(
            "mixer: released {} voices ({already} had already finished)",
            self.voices.len()
        );
        self.voices.clear();
    }

    fn apply_parameters(&mut self, params: &EngineParameters) {
        let ramp = self.ramp_samples();
        self.master.set_gain(params.volume as f32, ramp);
        self.reverb.set_mix(params.reverb as f32, ramp);
    }
}

impl TelemetrySink for Mixer {
    fn waveform_snapshot(&self) -> Option<Vec<u8>> {
        self.analyser.as_ref().map(Analyser::snapshot)
    }
}
