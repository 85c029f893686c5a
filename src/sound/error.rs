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

/// Error types for sound effect operations.
///
/// Only `DeviceInit` ever reaches game logic; the other variants are logged
/// and turned into "no sound plays".
#[derive(Debug, thiserror::Error)]
pub enum SoundError {
    #[error("sound effect {0} not found")]
    ResourceMissing(String),

    #[error("unsupported sound format {0:#06x}")]
    UnsupportedFormat(u16),

    #[error("sound header truncated ({0} bytes)")]
    TruncatedHeader(usize),

    #[error("invalid source sample rate {0}Hz")]
    InvalidSampleRate(u16),

    #[error("unable to resample sound ({srclen} -> {dstlen} samples)")]
    Resample { srclen: usize, dstlen: usize },

    #[error("unable to initialize audio device: {0}")]
    DeviceInit(#[from] crate::audio::AudioError),
}
