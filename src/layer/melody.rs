//! Melody layer — drives the song form and plays one phrase per tick.

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use super::{Emission, Layer, Tick, TickContext};
use crate::event::{Envelope, LayerId, SynthesisRequest, ToneRequest, Waveform};
use crate::phrase::BEATS_PER_CHORD;
use crate::theory::CHORDS_PER_PROGRESSION;
use crate::section::{FormSnapshot, SongFormTracker};

/// Timbres a melody note may use.
pub const MELODY_WAVEFORMS: [Waveform; 3] = [Waveform::Sine, Waveform::Triangle, Waveform::Saw];

/// Note volume before intensity is `[VOLUME_MIN, VOLUME_MIN + VOLUME_SPREAD)`.
pub const VOLUME_MIN: f64 = 0.1;
pub const VOLUME_SPREAD: f64 = 0.2;

/// Owns the song-form tracker. The only writer of [`FormSnapshot`]s.
#[derive(Debug, Default)]
pub struct MelodyLayer {
    tracker: SongFormTracker,
    version: u64,
}

impl MelodyLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracker(&self) -> &SongFormTracker {
        &self.tracker
    }
}

impl Layer for MelodyLayer {
    fn id(&self) -> LayerId {
        LayerId::Melody
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Tick {
        let step = self.tracker.advance(ctx.scale, ctx.params, ctx.rng);
        debug!(
            "melody: section {} ({}) with {} notes{}",
            step.section_index,
            step.letter,
            step.phrase.len(),
            if step.regenerated { ", new progression" } else { "" }
        );

        // Sections stay on the progression grid so harmony and bass line up.
        let span = ctx.beats((BEATS_PER_CHORD * CHORDS_PER_PROGRESSION) as f64);
        let phrase = step.phrase.fitted(span.as_secs_f64());

        let emissions = phrase
            .onsets()
            .map(|(onset, note)| {
                let waveform = *MELODY_WAVEFORMS.choose(ctx.rng).unwrap_or(&Waveform::Sine);
                let volume = (VOLUME_MIN + ctx.rng.gen::<f64>() * VOLUME_SPREAD) * note.intensity;
                Emission::after(
                    onset,
                    SynthesisRequest::Tone(ToneRequest {
                        frequency: note.frequency,
                        waveform,
                        duration: note.duration,
                        volume,
                        envelope: Some(Envelope::SOFT),
                    }),
                )
            })
            .collect();

        self.version += 1;
        let snapshot = FormSnapshot {
            version: self.version,
            section_index: step.section_index,
            letter: step.letter,
            progression: step.progression,
            started_at: ctx.now,
            chord_span: ctx.beats(BEATS_PER_CHORD as f64),
        };

        Tick {
            emissions,
            next_in: span,
            publish: Some(snapshot),
        }
    }
}
