// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Converted, playable sound buffers.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// The maximum device volume a chunk can carry.
pub const MAX_VOLUME: u8 = 128;

/// A converted mono float buffer at the device rate, ready for a mixing channel.
///
/// The device volume lives in the chunk itself, so every channel playing the
/// same chunk shares it. The game thread may rewrite it while the audio
/// callback is reading it.
pub struct Chunk {
    /// Normalized samples in [-1.0, 1.0].
    samples: Vec<f32>,
    /// Encoded device volume, 0..=MAX_VOLUME.
    volume: AtomicU8,
}

impl Chunk {
    /// Wraps converted samples into a chunk at full volume.
    pub fn new(samples: Vec<f32>) -> Chunk {
        Chunk {
            samples,
            volume: AtomicU8::new(MAX_VOLUME),
        }
    }

    /// Returns the converted samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Returns the number of frames in the chunk.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the chunk carries no frames.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the memory size of the sample data in bytes.
    pub fn memory_size(&self) -> usize {
        self.samples.len() * std::mem::size_of::<f32>()
    }

    /// Returns the encoded device volume.
    pub fn volume(&self) -> u8 {
        self.volume.load(Ordering::Relaxed)
    }

    /// Returns the device volume as a linear gain.
    pub fn gain(&self) -> f32 {
        f32::from(self.volume()) / f32::from(MAX_VOLUME)
    }

    /// Encodes a game volume (0..=127) into the chunk.
    pub fn set_volume(&self, game_volume: i32) {
        self.volume
            .store(encode_volume(game_volume), Ordering::Relaxed);
    }
}

/// Maps a game volume (0..=127) onto the device range (0..=128).
pub fn encode_volume(game_volume: i32) -> u8 {
    let v = game_volume.max(0);
    let encoded = (v << 3) | (v >> 1);
    encoded.min(i32::from(MAX_VOLUME)) as u8
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("frames", &self.samples.len())
            .field("volume", &self.volume())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_volume() {
        assert_eq!(encode_volume(0), 0);
        assert_eq!(encode_volume(1), 8);
        assert_eq!(encode_volume(8), 68);
        assert_eq!(encode_volume(15), 127);
        assert_eq!(encode_volume(16), MAX_VOLUME);
        assert_eq!(encode_volume(127), MAX_VOLUME);
        assert_eq!(encode_volume(-5), 0);
    }

    #[test]
    fn test_volume_last_write_wins() {
        let chunk = Chunk::new(vec![0.0; 4]);
        assert_eq!(chunk.volume(), MAX_VOLUME);

        chunk.set_volume(4);
        chunk.set_volume(2);
        assert_eq!(chunk.volume(), 17);
        assert!((chunk.gain() - 17.0 / 128.0).abs() < f32::EPSILON);
    }
}
