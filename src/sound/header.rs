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

//! Raw sound effect lump header.
//!
//! Layout, little endian regardless of host:
//!
//! | offset | size | field |
//! |---|---|---|
//! | 0 | 2 | format code |
//! | 2 | 2 | source sample rate |
//! | 4 | 4 | length (samples plus 16 leading and 16 trailing pad bytes) |
//! | 8 | 16 | padding |
//! | 24 | … | unsigned 8-bit samples |

use super::error::SoundError;

/// The only supported format code: unsigned 8-bit mono PCM.
pub const FORMAT_PCM_U8: u16 = 0x0003;

/// Size of the fixed header.
pub const HEADER_LEN: usize = 24;

/// Pad bytes counted by the length field around the payload.
const LENGTH_PADDING: u32 = 32;

/// A parsed sound effect header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSoundHeader {
    /// Format code.
    pub format: u16,
    /// Source sample rate in Hz.
    pub sample_rate: u16,
    /// The raw length field.
    pub length: u32,
}

impl RawSoundHeader {
    /// Decodes the header at the start of a lump.
    pub fn parse(data: &[u8]) -> Result<RawSoundHeader, SoundError> {
        if data.len() < HEADER_LEN {
            return Err(SoundError::TruncatedHeader(data.len()));
        }

        Ok(RawSoundHeader {
            format: u16::from_le_bytes([data[0], data[1]]),
            sample_rate: u16::from_le_bytes([data[2], data[3]]),
            length: u32::from_le_bytes([data[4], data[5], data[6], data[7]]),
        })
    }

    /// Returns true if the samples can be converted.
    pub fn is_supported(&self) -> bool {
        self.format == FORMAT_PCM_U8
    }

    /// Number of payload samples declared by the header.
    pub fn sample_count(&self) -> usize {
        self.length.saturating_sub(LENGTH_PADDING) as usize
    }

    /// Returns the payload samples, clamped to the bytes actually present.
    pub fn samples<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        let payload = data.get(HEADER_LEN..).unwrap_or_default();
        &payload[..self.sample_count().min(payload.len())]
    }
}
