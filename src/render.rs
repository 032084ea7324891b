//! Offline rendering — drive the engine in virtual time and write a WAV file.
//!
//! No device is involved, so a seeded render is reproducible sample for sample.

use std::io::{Seek, Write};
use std::path::Path;

use log::info;

use crate::audio::Limiter;
use crate::engine::Engine;
use crate::error::RenderError;
use crate::instrument::Mixer;

/// Output channels for rendered files.
pub const RENDER_CHANNELS: u16 = 2;

/// 32-bit float stereo at the mixer's sample rate.
pub fn wav_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: RENDER_CHANNELS,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    }
}

/// Render `seconds` of audio into `writer`, `block_size` frames at a time.
/// Initializes and starts the engine if needed and stops it afterwards.
/// Returns the number of frames written.
pub fn render_to<W: Write + Seek>(
    engine: &mut Engine<Mixer>,
    writer: W,
    seconds: f64,
    block_size: usize,
) -> Result<u64, RenderError> {
    let sample_rate = engine.sink().sample_rate();
    let mut wav = hound::WavWriter::new(writer, wav_spec(sample_rate))?;
    let limiter = Limiter::default();

    engine.initialize()?;
    engine.start()?;

    let total = (seconds.max(0.0) * sample_rate as f64).round() as u64;
    let block_size = block_size.max(1) as u64;
    let mut written = 0;
    while written < total {
        let frames = block_size.min(total - written) as usize;
        for sample in engine.render(frames, RENDER_CHANNELS) {
            wav.write_sample(limiter.process(sample))?;
        }
        written += frames as u64;
    }

    engine.stop();
    wav.finalize()?;
    Ok(written)
}

/// Render into a new file at `path`.
pub fn render_file(
    engine: &mut Engine<Mixer>,
    path: &Path,
    seconds: f64,
    block_size: usize,
) -> Result<u64, RenderError> {
    let file = std::io::BufWriter::new(std::fs::File::create(path).map_err(hound::Error::IoError)?);
    let frames = render_to(engine, file, seconds, block_size)?;
    info!(
        "rendered {:.1}s ({frames} frames) to {}",
        frames as f64 / engine.sink().sample_rate() as f64,
        path.display()
    );
    Ok(frames)
}
