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

//! Sound effect playback.
//!
//! Effects are converted on first play into device-rate buffers that stay
//! cached until the device closes. Each play gets a fresh instance id and, if
//! one is free, a hardware channel. The device frees channels from its own
//! callback when they finish.

mod cache;
mod channels;
mod driver;
mod error;
pub mod header;
mod music;
pub mod resample;
pub mod sfx;

pub use cache::EffectCache;
pub use channels::{ChannelTable, InstanceId, NO_INSTANCE, NUM_CHANNELS};
pub use driver::SoundDriver;
pub use error::SoundError;
pub use music::{MusicId, MusicPlayer};
pub use sfx::EffectId;
