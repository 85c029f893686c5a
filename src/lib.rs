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

//! Sound effect playback for a game engine: fixed-point resampling of 8-bit
//! effect lumps, a per-effect buffer cache and a 16-channel allocator on top
//! of a mixing device.

pub mod audio;
pub mod config;
pub mod sound;
pub mod verbosity;
pub mod wad;

#[cfg(test)]
mod testutil;
