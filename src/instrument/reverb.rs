//! Schroeder reverb — parallel damped combs into series all-passes, with a
//! dry/wet split controlled by the `reverb` parameter.

use super::stage::{mix_into, Ramp, SignalStage};

/// Comb delays in samples at 44.1 kHz. Mutually prime to avoid periodic build-up.
const COMB_DELAYS: [f32; 4] = [1117.0, 1187.0, 1277.0, 1351.0];
const ALLPASS_DELAYS: [f32; 2] = [223.0, 557.0];
const ALLPASS_GAIN: f32 = 0.5;

/// Time for the tail to fall by 60 dB.
pub const DECAY_SECONDS: f32 = 3.0;

/// High-frequency damping inside the comb feedback path.
const DAMPING: f32 = 0.2;

/// A one-pole low-pass used to darken the tail.
#[derive(Debug, Clone, Copy, Default)]
struct Damper {
    z1: f32,
}

impl Damper {
    #[inline]
    fn process(&mut self, input: f32, coeff: f32) -> f32 {
        let output = input * (1.0 - coeff) + self.z1 * coeff;
        self.z1 = output;
        output
    }
}

#[derive(Debug, Clone)]
struct Comb {
    buffer: Vec<f32>,
    pos: usize,
    feedback: f32,
    damper: Damper,
}

impl Comb {
    fn new(delay: usize, sample_rate: f32) -> Self {
        let delay = delay.max(1);
        // g such that the loop decays 60 dB in DECAY_SECONDS.
        let feedback = 10f32.powf(-3.0 * delay as f32 / (DECAY_SECONDS * sample_rate));
        Self {
            buffer: vec![0.0; delay],
            pos: 0,
            feedback,
            damper: Damper::default(),
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let output = self.buffer[self.pos];
        let damped = self.damper.process(output, DAMPING);
        self.buffer[self.pos] = input + damped * self.feedback;
        self.pos = (self.pos + 1) % self.buffer.len();
        output
    }
}

#[derive(Debug, Clone)]
struct AllPass {
    buffer: Vec<f32>,
    pos: usize,
}

impl AllPass {
    fn new(delay: usize) -> Self {
        Self {
            buffer: vec![0.0; delay.max(1)],
            pos: 0,
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.pos];
        let output = -input + delayed;
        self.buffer[self.pos] = input + delayed * ALLPASS_GAIN;
        self.pos = (self.pos + 1) % self.buffer.len();
        output
    }
}

/// The reverb stage. Output is `dry * input + wet * tail`.
#[derive(Debug, Clone)]
pub struct Reverb {
    combs: Vec<Comb>,
    allpasses: Vec<AllPass>,
    wet: Ramp,
    dry: Ramp,
    bus: Vec<f32>,
}

impl Reverb {
    /// `mix` is the wet share, nominally 0.0–1.0.
    pub fn new(sample_rate: u32, mix: f32) -> Self {
        let sr = sample_rate as f32;
        let scale = sr / 44_100.0;
        Self {
            combs: COMB_DELAYS
                .iter()
                .map(|d| Comb::new((d * scale) as usize, sr))
                .collect(),
            allpasses: ALLPASS_DELAYS
                .iter()
                .map(|d| AllPass::new((d * scale) as usize))
                .collect(),
            wet: Ramp::new(mix),
            dry: Ramp::new(1.0 - mix),
            bus: Vec::new(),
        }
    }

    /// Change the wet share, gliding over `ramp_samples`.
    pub fn set_mix(&mut self, mix: f32, ramp_samples: u32) {
        self.wet.set_target(mix, ramp_samples);
        self.dry.set_target(1.0 - mix, ramp_samples);
    }

    pub fn mix(&self) -> f32 {
        self.wet.target()
    }

    fn process(&mut self, input: f32) -> f32 {
        let combed: f32 = self.combs.iter_mut().map(|c| c.process(input)).sum::<f32>()
            / self.combs.len() as f32;
        let tail = self
            .allpasses
            .iter_mut()
            .fold(combed, |signal, ap| ap.process(signal));
        input * self.dry.next_value() + tail * self.wet.next_value()
    }
}

impl SignalStage for Reverb {
    fn accept_input(&mut self, input: &[f32]) {
        mix_into(&mut self.bus, input);
    }

    fn route_to(&mut self, output: &mut [f32]) {
        let bus = std::mem::take(&mut self.bus);
        for (out, &x) in output.iter_mut().zip(&bus) {
            *out += self.process(x);
        }
        self.bus = bus;
        self.bus.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impulse_response(mix: f32, len: usize) -> Vec<f32> {
        let mut reverb = Reverb::new(44_100, mix);
        let mut input = vec![0.0; len];
        input[0] = 1.0;
        reverb.accept_input(&input);
        let mut out = vec![0.0; len];
        reverb.route_to(&mut out);
        out
    }

    #[test]
    fn fully_dry_passes_input_through() {
        let out = impulse_response(0.0, 4_096);
        assert_eq!(out[0], 1.0);
        assert!(out[1..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn wet_signal_has_a_tail() {
        let out = impulse_response(1.0, 44_100);
        let late_energy: f32 = out[22_050..].iter().map(|s| s * s).sum();
        assert!(late_energy > 0.0);
    }

    #[test]
    fn tail_decays() {
        let out = impulse_response(1.0, 44_100 * 4);
        let energy = |range: std::ops::Range<usize>| -> f32 { out[range].iter().map(|s| s * s).sum() };
        let early = energy(2_000..46_100);
        let late = energy(44_100 * 3..44_100 * 4);
        assert!(late < early * 0.01, "early {early}, late {late}");
    }

    #[test]
    fn comb_feedback_below_unity() {
        let reverb = Reverb::new(48_000, 0.3);
        assert!(reverb.combs.iter().all(|c| c.feedback > 0.5 && c.feedback < 1.0));
    }

    #[test]
    fn mix_ramps_to_target() {
        let mut reverb = Reverb::new(44_100, 0.3);
        reverb.set_mix(0.8, 4_410);
        assert!((reverb.mix() - 0.8).abs() < f32::EPSILON);
    }
}
