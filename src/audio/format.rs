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

use std::fmt;

use crate::config;

/// Output parameters of a device session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceFormat {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Number of interleaved output channels.
    pub channels: u16,
    /// Mixing block size in frames.
    pub chunk_size: u32,
}

impl DeviceFormat {
    /// Builds the device format requested by the audio configuration.
    pub fn from_config(config: &config::Audio) -> DeviceFormat {
        DeviceFormat {
            sample_rate: config.sample_rate(),
            channels: config.channels(),
            chunk_size: config.chunk_size(),
        }
    }
}

impl Default for DeviceFormat {
    /// 44.1kHz stereo, one block per 35Hz game tic.
    fn default() -> Self {
        DeviceFormat {
            sample_rate: 44100,
            channels: 2,
            chunk_size: 44100 / 35,
        }
    }
}

impl fmt::Display for DeviceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}Hz, {} channel(s), {} frame blocks",
            self.sample_rate, self.channels, self.chunk_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format() {
        let format = DeviceFormat::default();
        assert_eq!(format.sample_rate, 44100);
        assert_eq!(format.channels, 2);
        assert_eq!(format.chunk_size, 1260);
    }

    #[test]
    fn test_from_config() {
        let mut audio = config::Audio::new("mock");
        audio.set_sample_rate(48000);
        let format = DeviceFormat::from_config(&audio);
        assert_eq!(format.sample_rate, 48000);
        assert_eq!(format.chunk_size, 48000 / 35);
        assert_eq!(format.to_string(), "48000Hz, 2 channel(s), 1371 frame blocks");
    }
}
