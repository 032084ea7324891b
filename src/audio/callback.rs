//! Audio callback — runs on the cpal audio thread.
//!
//! Drains commands from the ring buffer, plays queued blocks straight into the
//! device buffer, and applies the master limiter. Blocks are never copied or
//! merged here; the callback keeps a read offset into the front block. The
//! number of samples still queued is published through a shared counter so
//! the render loop can keep the queue topped up without running ahead.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ringbuf::traits::Consumer;
use ringbuf::HeapCons;

use super::command::AudioCommand;
use super::limiter::Limiter;

/// State that lives on the audio thread.
pub struct AudioCallback {
    consumer: HeapCons<AudioCommand>,
    blocks: VecDeque<Vec<f32>>,
    /// Samples of the front block already played.
    offset: usize,
    /// Samples across `blocks` not yet played.
    pending: usize,
    limiter: Limiter,
    queued: Arc<AtomicUsize>,
    underruns: u64,
}

impl AudioCallback {
    /// `block_slots` pre-sizes the block queue; pass the ring buffer capacity.
    pub fn new(consumer: HeapCons<AudioCommand>, queued: Arc<AtomicUsize>, block_slots: usize) -> Self {
        Self {
            consumer,
            blocks: VecDeque::with_capacity(block_slots),
            offset: 0,
            pending: 0,
            limiter: Limiter::default(),
            queued,
            underruns: 0,
        }
    }

    /// Fill `output` with queued samples, silence for whatever is missing.
    pub fn process(&mut self, output: &mut [f32]) {
        while let Some(cmd) = self.consumer.try_pop() {
            match cmd {
                AudioCommand::Block(data) if data.is_empty() => {}
                AudioCommand::Block(data) => {
                    self.pending += data.len();
                    self.blocks.push_back(data);
                }
                AudioCommand::Flush => {
                    self.blocks.clear();
                    self.offset = 0;
                    self.pending = 0;
                }
            }
        }

        let had_audio = self.pending > 0;
        let mut written = 0;
        while written < output.len() {
            let Some(front) = self.blocks.front() else {
                break;
            };
            let n = (front.len() - self.offset).min(output.len() - written);
            output[written..written + n].copy_from_slice(&front[self.offset..self.offset + n]);
            written += n;
            self.offset += n;
            self.pending -= n;
            if self.offset == front.len() {
                self.blocks.pop_front();
                self.offset = 0;
            }
        }
        output[written..].fill(0.0);
        if written < output.len() && had_audio {
            self.underruns += 1;
        }

        self.limiter.process_block(output);
        self.queued.store(self.pending, Ordering::Release);
    }

    /// Callbacks that ran dry part-way through a block.
    pub fn underruns(&self) -> u64 {
        self.underruns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringbuf::{
        traits::{Producer, Split},
        HeapProd, HeapRb,
    };

    fn setup() -> (HeapProd<AudioCommand>, AudioCallback, Arc<AtomicUsize>) {
        let (prod, cons) = HeapRb::<AudioCommand>::new(16).split();
        let queued = Arc::new(AtomicUsize::new(0));
        (prod, AudioCallback::new(cons, Arc::clone(&queued), 16), queued)
    }

    #[test]
    fn silence_when_nothing_is_queued() {
        let (_prod, mut callback, _) = setup();
        let mut output = vec![999.0f32; 64];
        callback.process(&mut output);
        assert!(output.iter().all(|&s| s == 0.0));
        assert_eq!(callback.underruns(), 0);
    }

    #[test]
    fn blocks_play_in_order_across_callbacks() {
        let (mut prod, mut callback, queued) = setup();
        prod.try_push(AudioCommand::Block(vec![0.1, 0.2, 0.3])).unwrap();
        prod.try_push(AudioCommand::Block(vec![0.4, 0.5])).unwrap();

        let mut first = vec![0.0f32; 4];
        callback.process(&mut first);
        assert_eq!(first, vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(queued.load(Ordering::Acquire), 1);

        let mut second = vec![9.0f32; 2];
        callback.process(&mut second);
        assert_eq!(second, vec![0.5, 0.0]);
        assert_eq!(queued.load(Ordering::Acquire), 0);
        assert_eq!(callback.underruns(), 1);
    }

    #[test]
    fn flush_drops_queued_audio() {
        let (mut prod, mut callback, queued) = setup();
        prod.try_push(AudioCommand::Block(vec![0.5; 64])).unwrap();
        prod.try_push(AudioCommand::Flush).unwrap();

        let mut output = vec![999.0f32; 32];
        callback.process(&mut output);
        assert!(output.iter().all(|&s| s == 0.0));
        assert_eq!(queued.load(Ordering::Acquire), 0);
    }

    #[test]
    fn output_is_limited() {
        let (mut prod, mut callback, _) = setup();
        prod.try_push(AudioCommand::Block(vec![2.0, -2.0, 0.5])).unwrap();

        let mut output = vec![0.0f32; 3];
        callback.process(&mut output);
        assert!(output[0] <= 0.95 && output[0] > 0.9);
        assert!(output[1] >= -0.95 && output[1] < -0.9);
        assert_eq!(output[2], 0.5);
    }

    #[test]
    fn front_block_is_read_in_place() {
        let (mut prod, mut callback, queued) = setup();
        prod.try_push(AudioCommand::Block((0..100).map(|i| i as f32 / 1000.0).collect()))
            .unwrap();
        prod.try_push(AudioCommand::Block(Vec::new())).unwrap();

        let mut output = vec![0.0f32; 30];
        for chunk in 0..3 {
            callback.process(&mut output);
            assert_eq!(output[0], (chunk * 30) as f32 / 1000.0);
        }
        assert_eq!(callback.blocks.len(), 1);
        assert_eq!(callback.offset, 90);
        assert_eq!(queued.load(Ordering::Acquire), 10);

        callback.process(&mut output);
        assert!(callback.blocks.is_empty());
        assert_eq!(callback.offset, 0);
        assert_eq!(queued.load(Ordering::Acquire), 0);
    }

    #[test]
    fn block_queue_is_sized_up_front() {
        let (mut prod, mut callback, _) = setup();
        let reserved = callback.blocks.capacity();
        assert!(reserved >= 16);
        for _ in 0..16 {
            prod.try_push(AudioCommand::Block(vec![0.0; 4])).unwrap();
        }
        let mut output = vec![0.0f32; 2];
        callback.process(&mut output);
        assert_eq!(callback.blocks.len(), 16);
        assert_eq!(callback.blocks.capacity(), reserved);
    }
}
