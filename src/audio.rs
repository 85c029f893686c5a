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
use std::sync::Arc;

use crate::config;

pub mod chunk;
pub mod cpal;
pub mod format;
pub mod mixer;
pub mod mock;
mod thread_priority;

pub use chunk::Chunk;
pub use format::DeviceFormat;

/// Completion notification invoked with the channel index whenever a channel
/// stops playing. Runs in the audio callback: it must not block, allocate or log.
pub type ChannelFinished = Box<dyn Fn(usize) + Send + 'static>;

/// Errors raised while opening a device session.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no audio device named {0}")]
    DeviceNotFound(String),

    #[error("unable to open audio device {device}: {reason}")]
    Open { device: String, reason: String },

    #[error("unsupported output sample format {0}")]
    UnsupportedSampleFormat(String),
}

/// An open audio device with a fixed pool of mixing channels.
pub trait Session: fmt::Display + Send + Sync {
    /// The negotiated output format.
    fn format(&self) -> DeviceFormat;

    /// Plays the chunk once on any free channel, returning the channel index,
    /// or None if every channel is busy.
    fn assign_channel(&self, chunk: Arc<Chunk>) -> Option<usize>;

    /// Halts the given channel.
    fn halt(&self, channel: usize);

    /// Returns true if the channel is currently playing.
    fn is_active(&self, channel: usize) -> bool;

    /// Registers the completion notification.
    fn on_channel_finished(&self, callback: ChannelFinished);
}

/// Lists the names of the available output devices.
pub fn list_devices() -> Result<Vec<String>, AudioError> {
    cpal::Session::list()
}

/// Returns true if the device name selects a headless mock session.
pub fn is_mock_device(name: &str) -> bool {
    name.starts_with("mock")
}

/// Opens the device session described by the configuration.
pub fn open_session(config: &config::Audio) -> Result<Arc<dyn Session>, AudioError> {
    let format = DeviceFormat::from_config(config);
    let device = config.device();
    if is_mock_device(device) {
        return Ok(Arc::new(mock::Session::new(device, format)));
    }

    Ok(Arc::new(cpal::Session::open(device, format)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_mock_session() {
        let mut audio = config::Audio::new("mock-device");
        audio.set_sample_rate(22050);
        let session = open_session(&audio).unwrap();

        assert_eq!(session.format().sample_rate, 22050);
        assert_eq!(session.format().chunk_size, 630);
        assert_eq!(session.to_string(), "mock-device (Mock)");
        assert!(!session.is_active(0));
    }
}
