//! soundscape — play an endless ambient composition, or render one to disk.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use log::{error, info, warn};

use soundscape::audio::AudioOutput;
use soundscape::config::{config_path, EngineConfig};
use soundscape::instrument::Mixer;
use soundscape::render::render_file;
use soundscape::Engine;

/// Blocks kept queued ahead of the device during live playback.
const QUEUE_AHEAD_BLOCKS: usize = 4;

#[derive(Parser, Debug)]
#[command(name = "soundscape", version)]
#[command(about = "An endless generative ambient music engine")]
struct Cli {
    /// RNG seed; omit for a new composition every run
    #[arg(long)]
    seed: Option<u64>,

    /// pentatonic, major, minor, dorian, phrygian, or chromatic
    #[arg(long)]
    scale: Option<String>,

    /// Beats per minute
    #[arg(long)]
    tempo: Option<f64>,

    /// Melodic density; higher values allow more notes per beat
    #[arg(long)]
    complexity: Option<f64>,

    /// At 5 or above chords gain a seventh
    #[arg(long)]
    harmony: Option<f64>,

    /// Reverb wet share, 0.0 to 1.0
    #[arg(long)]
    reverb: Option<f64>,

    /// Master volume, 0.0 to 1.0
    #[arg(long)]
    volume: Option<f64>,

    /// Config file (default: ~/.soundscape/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Render to this WAV file instead of playing live
    #[arg(long)]
    render: Option<PathBuf>,

    /// Length of an offline render
    #[arg(long, default_value_t = 60.0)]
    seconds: f64,
}

impl Cli {
    fn overrides(&self) -> [(&'static str, Option<f64>); 5] {
        [
            ("tempo", self.tempo),
            ("complexity", self.complexity),
            ("harmony", self.harmony),
            ("reverb", self.reverb),
            ("volume", self.volume),
        ]
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::load_default()?,
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    let seed = config.seed.unwrap_or_else(rand::random);
    config.seed = Some(seed);

    info!(
        "soundscape v{} (seed {seed}, config {})",
        env!("CARGO_PKG_VERSION"),
        cli.config
            .clone()
            .or_else(config_path)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".to_string())
    );

    match &cli.render {
        Some(path) => {
            let mixer = Mixer::new(config.sample_rate).with_noise_seed(seed);
            let mut engine = build_engine(mixer, &config, &cli);
            render_file(&mut engine, path, cli.seconds, config.block_size)?;
        }
        None => play_live(&config, &cli)?,
    }
    Ok(())
}

fn build_engine(mixer: Mixer, config: &EngineConfig, cli: &Cli) -> Engine<Mixer> {
    let mut engine = Engine::with_config(mixer, config);
    if let Some(scale) = &cli.scale {
        engine.set_scale(scale);
    }
    for (name, value) in cli.overrides() {
        if let Some(value) = value {
            engine.set_parameter(name, value);
        }
    }
    engine
}

fn play_live(config: &EngineConfig, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut output = AudioOutput::open()?;
    let sample_rate = output.sample_rate();
    let channels = output.channels();
    let seed = config.seed.unwrap_or_default();

    let mut engine = build_engine(Mixer::new(sample_rate).with_noise_seed(seed), config, cli);
    engine.initialize()?;
    engine.start()?;

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))?;
    info!("playing; press Ctrl-C to stop");

    let block_size = config.block_size.max(1);
    let queue_target = block_size * QUEUE_AHEAD_BLOCKS;
    let pause = Duration::from_secs_f64(block_size as f64 / sample_rate as f64 / 2.0);

    while running.load(Ordering::SeqCst) {
        if output.queued_frames() < queue_target {
            let block = engine.render(block_size, channels);
            if let Err(e) = output.push(block) {
                warn!("dropped a block: {e}");
            }
        }
        thread::sleep(pause);
    }

    engine.stop();
    output.flush()?;
    thread::sleep(Duration::from_millis(100));
    info!("stopped after {:.1}s", engine.position().as_secs_f64());
    Ok(())
}
