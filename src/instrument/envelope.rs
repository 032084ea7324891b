//! ADSR envelope whose release finishes exactly at the note's end.

use crate::event::Envelope;

/// Attack-Decay-Sustain-Release envelope.
///
/// All time values are in seconds. Sustain is a fraction of the peak. Unlike a
/// gate-driven envelope the release is part of the note: it starts at
/// `duration - release` and reaches zero at `duration`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrEnvelope {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl AdsrEnvelope {
    /// Shrink attack and release so both fit inside `duration`.
    pub fn fitted(self, duration: f64) -> Self {
        let attack = self.attack.min(duration * 0.4).max(0.0);
        let release = self.release.min(duration * 0.5).max(0.0);
        Self {
            attack,
            release,
            ..self
        }
    }

    /// Amplitude at time `t` for a note lasting `duration` seconds.
    ///
    /// - `[0, attack)`: linear ramp from 0 to 1.
    /// - `[attack, attack+decay)`: linear ramp from 1 to sustain.
    /// - then sustain until the release starts.
    /// - `[duration-release, duration)`: linear ramp from the level reached
    ///   at the release start down to 0.
    /// - 0 from `duration` on.
    pub fn amplitude(&self, t: f64, duration: f64) -> f64 {
        if t < 0.0 || t >= duration {
            return 0.0;
        }
        let release_start = (duration - self.release).max(0.0);
        if t < release_start {
            return self.level(t);
        }
        let span = duration - release_start;
        if span <= 0.0 {
            return 0.0;
        }
        self.level(release_start) * (duration - t) / span
    }

    fn level(&self, t: f64) -> f64 {
        if t < self.attack {
            if self.attack <= 0.0 {
                1.0
            } else {
                t / self.attack
            }
        } else if t < self.attack + self.decay {
            if self.decay <= 0.0 {
                self.sustain
            } else {
                let decay_t = (t - self.attack) / self.decay;
                1.0 - decay_t * (1.0 - self.sustain)
            }
        } else {
            self.sustain
        }
    }
}

impl From<Envelope> for AdsrEnvelope {
    fn from(e: Envelope) -> Self {
        Self {
            attack: e.attack,
            decay: e.decay,
            sustain: e.sustain,
            release: e.release,
        }
    }
}

impl Default for AdsrEnvelope {
    fn default() -> Self {
        Envelope::SOFT.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soft() -> AdsrEnvelope {
        AdsrEnvelope::default()
    }

    #[test]
    fn starts_at_zero() {
        assert!(soft().amplitude(0.0, 2.0).abs() < 1e-10);
    }

    #[test]
    fn reaches_peak_at_attack() {
        assert!((soft().amplitude(0.1, 2.0) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn reaches_sustain_after_decay() {
        assert!((soft().amplitude(0.3, 2.0) - 0.7).abs() < 1e-10);
    }

    #[test]
    fn sustain_holds_until_release() {
        assert!((soft().amplitude(1.0, 2.0) - 0.7).abs() < 1e-10);
        assert!((soft().amplitude(1.5, 2.0) - 0.7).abs() < 1e-10);
    }

    #[test]
    fn release_ends_at_duration() {
        let env = soft();
        assert!((env.amplitude(1.75, 2.0) - 0.35).abs() < 1e-10);
        assert!(env.amplitude(1.999_999, 2.0) < 1e-4);
        assert_eq!(env.amplitude(2.0, 2.0), 0.0);
        assert_eq!(env.amplitude(3.0, 2.0), 0.0);
    }

    #[test]
    fn short_note_releases_from_current_level() {
        // Release would start at -0.3; the note fades from the very start.
        let env = soft();
        assert_eq!(env.amplitude(0.0, 0.2), 0.0);
        let mid = env.amplitude(0.1, 0.2);
        assert!(mid >= 0.0 && mid <= 1.0);
    }

    #[test]
    fn negative_time_is_zero() {
        assert_eq!(soft().amplitude(-0.1, 1.0), 0.0);
    }

    #[test]
    fn zero_attack_instant_peak() {
        let env = AdsrEnvelope {
            attack: 0.0,
            decay: 0.05,
            sustain: 0.7,
            release: 0.1,
        };
        assert!((env.amplitude(0.0, 1.0) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn fitted_keeps_stages_inside_the_note() {
        let env = AdsrEnvelope {
            attack: 3.0,
            decay: 1.0,
            sustain: 0.8,
            release: 4.0,
        }
        .fitted(4.0);
        assert!((env.attack - 1.6).abs() < 1e-10);
        assert!((env.release - 2.0).abs() < 1e-10);
    }

    #[test]
    fn envelope_bounded() {
        let env = soft();
        for i in 0..3000 {
            let t = i as f64 / 1000.0;
            let amp = env.amplitude(t, 2.5);
            assert!((0.0..=1.0 + 1e-10).contains(&amp), "amplitude {amp} at t={t}");
        }
    }
}
