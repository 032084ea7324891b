//! The engine driving the bundled mixer: lifecycle, telemetry, and WAV output.

use soundscape::event::Moment;
use soundscape::instrument::{Mixer, SNAPSHOT_LEN};
use soundscape::render::{render_file, RENDER_CHANNELS};
use soundscape::{Engine, EngineConfig, EngineError};
use tempfile::TempDir;

const SR: u32 = 8_000;

fn engine(seed: u64) -> Engine<Mixer> {
    Engine::new(Mixer::new(SR).with_noise_seed(seed), seed)
}

fn rms(block: &[f32]) -> f32 {
    (block.iter().map(|s| s * s).sum::<f32>() / block.len().max(1) as f32).sqrt()
}

#[test]
fn start_before_initialize_is_refused() {
    let mut engine = engine(1);
    assert_eq!(engine.start(), Err(EngineError::NotInitialized));
    assert!(engine.waveform_snapshot().is_none());
}

#[test]
fn zero_rate_device_is_reported_at_initialize() {
    let mut engine = Engine::new(Mixer::new(0), 1);
    assert!(matches!(engine.initialize(), Err(EngineError::Sink(_))));
    assert_eq!(engine.start(), Err(EngineError::NotInitialized));
}

#[test]
fn live_engine_produces_audio_and_a_waveform() {
    let mut engine = engine(5);
    engine.initialize().unwrap();
    engine.start().unwrap();

    let mut loud = 0;
    for _ in 0..40 {
        let block = engine.render(400, 1);
        if rms(&block) > 1e-3 {
            loud += 1;
        }
    }
    assert!(loud > 30, "only {loud} of 40 blocks had signal");

    let snapshot = engine.waveform_snapshot().unwrap();
    assert_eq!(snapshot.len(), SNAPSHOT_LEN);
    assert!(snapshot.iter().any(|&b| b != 128));
}

#[test]
fn stop_silences_the_mix() {
    let mut engine = engine(5);
    engine.initialize().unwrap();
    engine.start().unwrap();
    let _ = engine.render(SR as usize * 4, 1);

    engine.stop();
    assert_eq!(engine.sink().active_voices(), 0);
    // Let the reverb tail ring out.
    let _ = engine.render(SR as usize * 8, 1);
    let after = engine.render(SR as usize, 1);
    assert!(rms(&after) < 1e-4);
    assert_eq!(engine.sink().active_voices(), 0);
}

#[test]
fn volume_change_scales_the_output() {
    let mut loud = engine(9);
    let mut quiet = engine(9);
    for e in [&mut loud, &mut quiet] {
        e.set_parameter("reverb", 0.0);
        e.initialize().unwrap();
        e.start().unwrap();
    }
    quiet.set_parameter("volume", 0.1);

    // Skip the 0.1 s ramp.
    let _ = loud.render(SR as usize, 1);
    let _ = quiet.render(SR as usize, 1);
    let a = rms(&loud.render(SR as usize * 4, 1));
    let b = rms(&quiet.render(SR as usize * 4, 1));
    assert!(a > 0.0);
    assert!((b / a - 0.1 / 0.7).abs() < 1e-3, "ratio {}", b / a);
}

#[test]
fn renders_a_wav_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("take.wav");
    let config = EngineConfig {
        seed: Some(77),
        sample_rate: SR,
        ..EngineConfig::default()
    };
    let mut engine = Engine::with_config(Mixer::new(config.sample_rate), &config);

    let frames = render_file(&mut engine, &path, 3.0, config.block_size).unwrap();
    assert_eq!(frames, 24_000);
    assert!(!engine.is_running());
    assert_eq!(engine.position(), Moment::from_millis(3_000));

    let mut reader = hound::WavReader::open(&path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, RENDER_CHANNELS);
    assert_eq!(spec.sample_rate, SR);
    assert_eq!(reader.duration(), 24_000);

    let samples: Vec<f32> = reader.samples::<f32>().map(Result::unwrap).collect();
    assert_eq!(samples.len(), 48_000);
    assert!(samples.iter().all(|s| s.abs() <= 0.95));
    assert!(rms(&samples) > 1e-3);
}
