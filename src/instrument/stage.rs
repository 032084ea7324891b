//! Signal stages — the named routing capability of the signal chain.
//!
//! A stage accepts blocks on its input bus (several sources may feed it) and
//! routes its processed output into a destination buffer. The mixer wires
//! voices into the reverb, the reverb into the master gain, and the master gain
//! into the output block.

/// A processing stage with a summing input bus.
pub trait SignalStage: Send {
    /// Mix `input` into the stage's input bus.
    fn accept_input(&mut self, input: &[f32]);

    /// Process everything accepted since the last call and add the result
    /// into `output`. Clears the input bus.
    fn route_to(&mut self, output: &mut [f32]);
}

/// Sum `input` into `bus`, growing it as needed.
pub(crate) fn mix_into(bus: &mut Vec<f32>, input: &[f32]) {
    if bus.len() < input.len() {
        bus.resize(input.len(), 0.0);
    }
    for (b, &x) in bus.iter_mut().zip(input) {
        *b += x;
    }
}

/// A value that glides linearly to a target over a fixed number of samples.
#[derive(Debug, Clone, Copy)]
pub struct Ramp {
    current: f32,
    target: f32,
    step: f32,
    remaining: u32,
}

impl Ramp {
    pub fn new(value: f32) -> Self {
        Self {
            current: value,
            target: value,
            step: 0.0,
            remaining: 0,
        }
    }

    /// Glide to `target` over `samples` samples (immediately when zero).
    pub fn set_target(&mut self, target: f32, samples: u32) {
        self.target = target;
        if samples == 0 {
            self.current = target;
            self.remaining = 0;
            self.step = 0.0;
        } else {
            self.step = (target - self.current) / samples as f32;
            self.remaining = samples;
        }
    }

    #[inline]
    pub fn next_value(&mut self) -> f32 {
        if self.remaining > 0 {
            self.current += self.step;
            self.remaining -= 1;
            if self.remaining == 0 {
                self.current = self.target;
            }
        }
        self.current
    }

    pub fn value(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }
}

/// Master volume with click-free changes.
#[derive(Debug, Clone)]
pub struct GainStage {
    gain: Ramp,
    bus: Vec<f32>,
}

impl GainStage {
    pub fn new(gain: f32) -> Self {
        Self {
            gain: Ramp::new(gain),
            bus: Vec::new(),
        }
    }

    pub fn set_gain(&mut self, gain: f32, ramp_samples: u32) {
        self.gain.set_target(gain, ramp_samples);
    }

    pub fn gain(&self) -> f32 {
        self.gain.value()
    }
}

impl SignalStage for GainStage {
    fn accept_input(&mut self, input: &[f32]) {
        mix_into(&mut self.bus, input);
    }

    fn route_to(&mut self, output: &mut [f32]) {
        for (out, &x) in output.iter_mut().zip(&self.bus) {
            *out += x * self.gain.next_value();
        }
        self.bus.clear();
    }
}
