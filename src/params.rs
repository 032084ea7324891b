//! Engine parameters — externally settable knobs read by every layer.
//!
//! Layers read the parameters when they compute events, so a change only
//! affects events computed after it. Values are stored as given.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownParameter;

pub const DEFAULT_COMPLEXITY: f64 = 5.0;
pub const DEFAULT_TEMPO: f64 = 120.0;
pub const DEFAULT_HARMONY: f64 = 4.0;
pub const DEFAULT_REVERB: f64 = 0.3;
pub const DEFAULT_VOLUME: f64 = 0.7;

/// Slowest tempo used for timing, in BPM.
pub const MIN_TEMPO: f64 = 1.0;
/// Fastest tempo used for timing, in BPM.
pub const MAX_TEMPO: f64 = 1_000.0;

/// The recognised parameter names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamName {
    Complexity,
    Tempo,
    Harmony,
    Reverb,
    Volume,
}

impl ParamName {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamName::Complexity => "complexity",
            ParamName::Tempo => "tempo",
            ParamName::Harmony => "harmony",
            ParamName::Reverb => "reverb",
            ParamName::Volume => "volume",
        }
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamName {
    type Err = UnknownParameter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "complexity" => Ok(ParamName::Complexity),
            "tempo" | "bpm" => Ok(ParamName::Tempo),
            "harmony" => Ok(ParamName::Harmony),
            "reverb" | "reverbMix" | "reverb_mix" => Ok(ParamName::Reverb),
            "volume" => Ok(ParamName::Volume),
            _ => Err(UnknownParameter(s.to_string())),
        }
    }
}

/// Result of a [`EngineParameters::set`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamUpdate {
    /// A recognised parameter changed.
    Known(ParamName),
    /// The name is not recognised; the value was kept under that key only.
    Stored(String),
}

/// The live parameter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParameters {
    pub complexity: f64,
    /// Beats per minute.
    pub tempo: f64,
    pub harmony: f64,
    /// Wet share of the reverb send, nominally 0.0–1.0.
    pub reverb: f64,
    /// Master volume, nominally 0.0–1.0.
    pub volume: f64,
    /// Values set under unrecognised names. Never read by generation.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, f64>,
}

impl EngineParameters {
    /// Set a parameter by name. Unknown names are stored in [`extra`](Self::extra).
    pub fn set(&mut self, name: &str, value: f64) -> ParamUpdate {
        match name.parse::<ParamName>() {
            Ok(param) => {
                self.set_known(param, value);
                ParamUpdate::Known(param)
            }
            Err(UnknownParameter(name)) => {
                self.extra.insert(name.clone(), value);
                ParamUpdate::Stored(name)
            }
        }
    }

    pub fn set_known(&mut self, param: ParamName, value: f64) {
        match param {
            ParamName::Complexity => self.complexity = value,
            ParamName::Tempo => self.tempo = value,
            ParamName::Harmony => self.harmony = value,
            ParamName::Reverb => self.reverb = value,
            ParamName::Volume => self.volume = value,
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        match name.parse::<ParamName>() {
            Ok(ParamName::Complexity) => Some(self.complexity),
            Ok(ParamName::Tempo) => Some(self.tempo),
            Ok(ParamName::Harmony) => Some(self.harmony),
            Ok(ParamName::Reverb) => Some(self.reverb),
            Ok(ParamName::Volume) => Some(self.volume),
            Err(_) => self.extra(name),
        }
    }

    /// A value stored under an unrecognised name.
    pub fn extra(&self, name: &str) -> Option<f64> {
        self.extra.get(name).copied()
    }

    /// Tempo used for timing. Non-positive or non-finite tempos fall back to
    /// the default; anything else is clamped to [`MIN_TEMPO`, `MAX_TEMPO`].
    pub fn effective_tempo(&self) -> f64 {
        if self.tempo.is_finite() && self.tempo > 0.0 {
            self.tempo.clamp(MIN_TEMPO, MAX_TEMPO)
        } else {
            DEFAULT_TEMPO
        }
    }

    /// Seconds per beat at the effective tempo.
    pub fn beat_duration(&self) -> f64 {
        60.0 / self.effective_tempo()
    }
}

impl Default for EngineParameters {
    fn default() -> Self {
        Self {
            complexity: DEFAULT_COMPLEXITY,
            tempo: DEFAULT_TEMPO,
            harmony: DEFAULT_HARMONY,
            reverb: DEFAULT_REVERB,
            volume: DEFAULT_VOLUME,
            extra: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let p = EngineParameters::default();
        assert_eq!(p.tempo, 120.0);
        assert_eq!(p.complexity, 5.0);
        assert!((p.beat_duration() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn set_known_parameter() {
        let mut p = EngineParameters::default();
        assert_eq!(p.set("tempo", 90.0), ParamUpdate::Known(ParamName::Tempo));
        assert_eq!(p.tempo, 90.0);
        assert_eq!(p.set("reverbMix", 0.8), ParamUpdate::Known(ParamName::Reverb));
        assert_eq!(p.reverb, 0.8);
    }

    #[test]
    fn out_of_range_values_are_kept() {
        let mut p = EngineParameters::default();
        p.set("volume", 7.5);
        p.set("complexity", -3.0);
        assert_eq!(p.volume, 7.5);
        assert_eq!(p.complexity, -3.0);
    }

    #[test]
    fn unknown_parameter_is_stored() {
        let mut p = EngineParameters::default();
        let update = p.set("shimmer", 0.4);
        assert_eq!(update, ParamUpdate::Stored("shimmer".to_string()));
        assert_eq!(p.extra("shimmer"), Some(0.4));
        assert_eq!(p.get("shimmer"), Some(0.4));
        assert_eq!(p.tempo, DEFAULT_TEMPO);
    }

    #[test]
    fn degenerate_tempo_falls_back() {
        let mut p = EngineParameters::default();
        p.set("tempo", 0.0);
        assert_eq!(p.tempo, 0.0);
        assert_eq!(p.effective_tempo(), DEFAULT_TEMPO);
        p.set("tempo", f64::NAN);
        assert_eq!(p.effective_tempo(), DEFAULT_TEMPO);
    }

    #[test]
    fn extreme_tempo_is_clamped_for_timing() {
        let mut p = EngineParameters::default();
        p.set("tempo", 1e-12);
        assert_eq!(p.tempo, 1e-12);
        assert_eq!(p.effective_tempo(), MIN_TEMPO);
        p.set("bpm", 1e9);
        assert_eq!(p.effective_tempo(), MAX_TEMPO);
        assert!((p.beat_duration() - 0.06).abs() < 1e-12);
    }

    #[test]
    fn unknown_name_reports_itself() {
        assert_eq!("bpm".parse::<ParamName>(), Ok(ParamName::Tempo));
        assert_eq!(
            "shimmer".parse::<ParamName>(),
            Err(UnknownParameter("shimmer".to_string()))
        );
    }

    #[test]
    fn yaml_round_trip_with_partial_fields() {
        let p: EngineParameters = serde_yaml::from_str("tempo: 72\nreverb: 0.5\n").unwrap();
        assert_eq!(p.tempo, 72.0);
        assert_eq!(p.reverb, 0.5);
        assert_eq!(p.volume, DEFAULT_VOLUME);
        assert!(p.extra.is_empty());
    }
}
