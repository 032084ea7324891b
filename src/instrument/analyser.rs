//! Waveform analyser — keeps the latest output for visualisation.

/// Bytes in a waveform snapshot.
pub const SNAPSHOT_LEN: usize = 1024;

/// Ring of the most recent mono output samples.
#[derive(Debug, Clone)]
pub struct Analyser {
    ring: Vec<f32>,
    pos: usize,
}

impl Analyser {
    pub fn new() -> Self {
        Self {
            ring: vec![0.0; SNAPSHOT_LEN],
            pos: 0,
        }
    }

    pub fn capture(&mut self, block: &[f32]) {
        for &s in block {
            self.ring[self.pos] = s;
            self.pos = (self.pos + 1) % SNAPSHOT_LEN;
        }
    }

    /// Oldest to newest, each sample mapped to `128 + 127 * s` and clamped.
    pub fn snapshot(&self) -> Vec<u8> {
        self.ring[self.pos..]
            .iter()
            .chain(&self.ring[..self.pos])
            .map(|&s| to_byte(s))
            .collect()
    }
}

impl Default for Analyser {
    fn default() -> Self {
        Self::new()
    }
}

fn to_byte(sample: f32) -> u8 {
    (128.0 + 127.0 * sample).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_is_centred() {
        let snap = Analyser::new().snapshot();
        assert_eq!(snap.len(), SNAPSHOT_LEN);
        assert!(snap.iter().all(|&b| b == 128));
    }

    #[test]
    fn byte_mapping_clamps() {
        assert_eq!(to_byte(0.0), 128);
        assert_eq!(to_byte(1.0), 255);
        assert_eq!(to_byte(-1.0), 1);
        assert_eq!(to_byte(4.0), 255);
        assert_eq!(to_byte(-4.0), 0);
    }

    #[test]
    fn snapshot_is_oldest_first() {
        let mut a = Analyser::new();
        let block: Vec<f32> = (0..SNAPSHOT_LEN + 10).map(|i| if i == SNAPSHOT_LEN + 9 { 1.0 } else { 0.0 }).collect();
        a.capture(&block);
        let snap = a.snapshot();
        assert_eq!(snap[SNAPSHOT_LEN - 1], 255);
        assert_eq!(snap[0], 128);
    }
}
