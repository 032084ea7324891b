//! Audio output — cpal stream fed through a lock-free queue.
//!
//! The render loop owns an [`AudioOutput`] and pushes interleaved blocks into a
//! `ringbuf` SPSC queue. The cpal callback drains the queue on the audio
//! thread, applies the master [`Limiter`], and reports how much audio is still
//! waiting so the loop can render just ahead of playback.

pub mod callback;
pub mod command;
pub mod limiter;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{error, info};
use ringbuf::{
    traits::{Producer, Split},
    HeapRb,
};

pub use crate::error::AudioError;
pub use command::AudioCommand;
pub use limiter::Limiter;

use callback::AudioCallback;

/// Ring buffer capacity in commands.
const RING_BUFFER_CAPACITY: usize = 256;

/// An open output stream on the default device.
pub struct AudioOutput {
    stream: cpal::Stream,
    producer: ringbuf::HeapProd<AudioCommand>,
    queued: Arc<AtomicUsize>,
    sample_rate: u32,
    channels: u16,
}

impl AudioOutput {
    /// Open the default output device at its preferred configuration.
    pub fn open() -> Result<Self, AudioError> {
        let device = default_device()?;
        let config = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceConfig(e.to_string()))?;
        Self::build(&device, config.sample_rate().0, config.channels())
    }

    /// Open the default output device with an explicit rate and channel count.
    pub fn with_config(sample_rate: u32, channels: u16) -> Result<Self, AudioError> {
        let device = default_device()?;
        Self::build(&device, sample_rate, channels)
    }

    fn build(device: &cpal::Device, sample_rate: u32, channels: u16) -> Result<Self, AudioError> {
        let (producer, consumer) = HeapRb::<AudioCommand>::new(RING_BUFFER_CAPACITY).split();
        let queued = Arc::new(AtomicUsize::new(0));
        let mut audio_callback = AudioCallback::new(consumer, Arc::clone(&queued), RING_BUFFER_CAPACITY);

        let stream_config = cpal::StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    audio_callback.process(data);
                },
                |err: cpal::StreamError| error!("audio stream error: {err}"),
                None,
            )
            .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamPlay(e.to_string()))?;

        info!("audio output open: {sample_rate} Hz, {channels} ch");
        Ok(Self {
            stream,
            producer,
            queued,
            sample_rate,
            channels,
        })
    }

    /// Queue a block of interleaved samples for playback.
    pub fn push(&mut self, samples: Vec<f32>) -> Result<(), AudioError> {
        self.producer
            .try_push(AudioCommand::Block(samples))
            .map_err(|_| AudioError::QueueFull)
    }

    /// Drop everything queued but not yet played.
    pub fn flush(&mut self) -> Result<(), AudioError> {
        self.producer
            .try_push(AudioCommand::Flush)
            .map_err(|_| AudioError::QueueFull)
    }

    /// Frames the audio thread has queued but not yet played. Blocks still
    /// sitting in the ring buffer are not counted.
    pub fn queued_frames(&self) -> usize {
        self.queued.load(Ordering::Acquire) / self.channels.max(1) as usize
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn pause(&self) -> Result<(), AudioError> {
        self.stream
            .pause()
            .map_err(|e| AudioError::StreamPlay(e.to_string()))
    }
}

fn default_device() -> Result<cpal::Device, AudioError> {
    cpal::default_host()
        .default_output_device()
        .ok_or(AudioError::NoOutputDevice)
}
