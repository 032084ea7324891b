//! Messages from the render loop to the audio thread.

/// Sent through the ring buffer; the audio thread drains them at the start of
/// every callback.
#[derive(Debug)]
pub enum AudioCommand {
    /// A rendered block of interleaved frames, appended to the playback queue.
    Block(Vec<f32>),

    /// Drop everything queued but not yet played.
    Flush,
}

impl AudioCommand {
    /// Samples carried by this command.
    pub fn len(&self) -> usize {
        match self {
            AudioCommand::Block(samples) => samples.len(),
            AudioCommand::Flush => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringbuf::{
        traits::{Consumer, Producer, Split},
        HeapRb,
    };

    #[test]
    fn commands_keep_their_order() {
        let rb = HeapRb::<AudioCommand>::new(4);
        let (mut prod, mut cons) = rb.split();

        prod.try_push(AudioCommand::Block(vec![0.1, -0.1])).unwrap();
        prod.try_push(AudioCommand::Flush).unwrap();

        match cons.try_pop().unwrap() {
            AudioCommand::Block(data) => assert_eq!(data, vec![0.1, -0.1]),
            other => panic!("expected a block, got {other:?}"),
        }
        assert!(matches!(cons.try_pop().unwrap(), AudioCommand::Flush));
        assert!(cons.try_pop().is_none());
    }

    #[test]
    fn full_queue_hands_the_command_back() {
        let rb = HeapRb::<AudioCommand>::new(1);
        let (mut prod, _cons) = rb.split();

        prod.try_push(AudioCommand::Flush).unwrap();
        let rejected = prod.try_push(AudioCommand::Block(vec![0.0; 8])).unwrap_err();
        assert_eq!(rejected.len(), 8);
    }

    #[test]
    fn flush_carries_no_samples() {
        assert!(AudioCommand::Flush.is_empty());
        assert!(!AudioCommand::Block(vec![0.0]).is_empty());
    }
}
