//! Synthesis requests — the abstract contract between the composition core and
//! whatever renders sound.
//!
//! The core never touches oscillators or filters. It describes *what* to play
//! (pitch, duration, volume, a timbre hint) and hands the request to a
//! [`SynthesisSink`](crate::sink::SynthesisSink).

use std::fmt;

/// Identifies one of the five generative layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerId {
    Melody,
    Harmony,
    Bass,
    Ambience,
    Wind,
}

impl LayerId {
    /// Arming order on start. Melody goes first so its song-form transition
    /// lands before harmony and bass read the snapshot at the same instant.
    pub const ALL: [LayerId; 5] = [
        LayerId::Melody,
        LayerId::Harmony,
        LayerId::Bass,
        LayerId::Ambience,
        LayerId::Wind,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LayerId::Melody => "melody",
            LayerId::Harmony => "harmony",
            LayerId::Bass => "bass",
            LayerId::Ambience => "ambience",
            LayerId::Wind => "wind",
        }
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Oscillator shape hint for pitched tones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Saw,
    Triangle,
}

/// Attack/decay/sustain/release shape, times in seconds, sustain as a
/// fraction of the peak. The release ends at the note's duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl Envelope {
    /// Soft pad envelope used for melody, harmony, and ambience tones.
    pub const SOFT: Envelope = Envelope {
        attack: 0.1,
        decay: 0.2,
        sustain: 0.7,
        release: 0.5,
    };
}

impl Default for Envelope {
    fn default() -> Self {
        Self::SOFT
    }
}

/// Non-pitched or heavily filtered sound kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    /// Detuned saw through a slowly swirling low-pass filter.
    SwirlBass,
    /// Plain deep sine an octave under the swirl.
    SubBass,
    /// Band-limited noise with a slow filter sweep.
    WindSwirl,
}

/// Filter and modulation settings for a texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureParams {
    /// Fundamental in Hz for pitched textures; `None` for pure noise.
    pub frequency: Option<f64>,
    /// Filter cutoff at the start of the event, in Hz.
    pub filter_from: f64,
    /// Filter cutoff at the end of the event, in Hz.
    pub filter_to: f64,
    /// Rate of the cutoff wobble in Hz (0 disables it).
    pub lfo_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToneRequest {
    pub frequency: f64,
    pub waveform: Waveform,
    /// Seconds.
    pub duration: f64,
    pub volume: f64,
    pub envelope: Option<Envelope>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChordRequest {
    pub frequencies: Vec<f64>,
    /// Seconds.
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureRequest {
    pub kind: TextureKind,
    pub params: TextureParams,
    /// Seconds.
    pub duration: f64,
    pub volume: f64,
}

/// One fire-and-forget request to the synthesis sink.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisRequest {
    Tone(ToneRequest),
    Chord(ChordRequest),
    Texture(TextureRequest),
}

impl SynthesisRequest {
    /// Nominal duration of the request in seconds.
    pub fn duration(&self) -> f64 {
        match self {
            SynthesisRequest::Tone(t) => t.duration,
            SynthesisRequest::Chord(c) => c.duration,
            SynthesisRequest::Texture(t) => t.duration,
        }
    }
}
