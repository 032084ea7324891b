//! Master limiter — soft knee in front of a hard ceiling.
//!
//! Samples below the knee pass untouched. Above it the excess is folded through
//! `tanh` so the output approaches, and never crosses, the ceiling. Reverb tails
//! stacking on a loud chord get rounded off instead of clipped.

/// Knee as a fraction of the ceiling.
const KNEE_RATIO: f32 = 0.8;

#[derive(Debug, Clone)]
pub struct Limiter {
    ceiling: f32,
    knee: f32,
}

impl Limiter {
    /// `ceiling` should be in `(0.0, 1.0]`.
    pub fn new(ceiling: f32) -> Self {
        debug_assert!(ceiling > 0.0 && ceiling <= 1.0);
        Self {
            ceiling,
            knee: ceiling * KNEE_RATIO,
        }
    }

    #[inline]
    pub fn process(&self, sample: f32) -> f32 {
        if sample.is_nan() {
            return 0.0;
        }
        let magnitude = sample.abs();
        if magnitude <= self.knee {
            return sample;
        }
        let headroom = self.ceiling - self.knee;
        let over = (magnitude - self.knee) / headroom;
        (self.knee + headroom * over.tanh()).copysign(sample)
    }

    #[inline]
    pub fn process_block(&self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn ceiling(&self) -> f32 {
        self.ceiling
    }

    pub fn knee(&self) -> f32 {
        self.knee
    }
}

impl Default for Limiter {
    fn default() -> Self {
        Self::new(0.95)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn below_knee_is_untouched() {
        let limiter = Limiter::default();
        for s in [0.0, 0.25, -0.5, 0.75, -0.75] {
            assert_eq!(limiter.process(s), s);
        }
    }

    #[test]
    fn never_crosses_the_ceiling() {
        let limiter = Limiter::default();
        for s in [0.9, 1.0, 2.5, 100.0, f32::MAX, f32::INFINITY] {
            let out = limiter.process(s);
            assert!(out <= 0.95, "{s} -> {out}");
            assert!(out > limiter.knee());
            assert_approx_eq!(limiter.process(-s), -out, 1e-6);
        }
    }

    #[test]
    fn is_monotonic_above_the_knee() {
        let limiter = Limiter::default();
        let outputs: Vec<f32> = (0..50).map(|i| limiter.process(0.7 + i as f32 * 0.05)).collect();
        assert!(outputs.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn continuous_at_the_knee() {
        let limiter = Limiter::new(0.5);
        let knee = limiter.knee();
        assert_approx_eq!(limiter.process(knee + 1e-4), knee, 1e-3);
    }

    #[test]
    fn nan_becomes_silence() {
        let mut block = [f32::NAN, 0.2];
        Limiter::default().process_block(&mut block);
        assert_eq!(block, [0.0, 0.2]);
    }

    #[test]
    fn default_ceiling() {
        assert_approx_eq!(Limiter::default().ceiling(), 0.95, f32::EPSILON);
    }
}
