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
use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use parking_lot::Mutex;
use tracing::info;

use super::mixer::{ChannelControl, ChannelMixer};
use super::{ChannelFinished, Chunk, DeviceFormat};

/// A headless device session. Nothing is mixed until [`Session::render`] is
/// called, which lets tests decide when (and on which thread) completion
/// notifications fire.
pub struct Session {
    name: String,
    format: DeviceFormat,
    control: ChannelControl,
    mixer: Mutex<ChannelMixer>,
    /// When false, completion notifications are swallowed to simulate a
    /// device that misses them.
    deliver_notifications: Arc<AtomicBool>,
}

impl Session {
    /// Opens the given mock session.
    pub fn new(name: &str, format: DeviceFormat) -> Session {
        let (control, mixer) = ChannelMixer::new(format.channels);
        info!(device = name, %format, "Opened mock audio session");
        Session {
            name: name.to_string(),
            format,
            control,
            mixer: Mutex::new(mixer),
            deliver_notifications: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Mixes the given number of frames and returns the interleaved output.
    pub fn render(&self, frames: usize) -> Vec<f32> {
        let mut output = vec![0.0f32; frames * usize::from(self.format.channels)];
        self.mixer.lock().process(&mut output);
        output
    }

    /// Controls whether completion notifications reach the registered callback.
    pub fn set_deliver_notifications(&self, deliver: bool) {
        self.deliver_notifications.store(deliver, Ordering::Relaxed);
    }

    /// Returns the number of channels currently playing.
    pub fn active_channels(&self) -> usize {
        self.control.active_count()
    }
}

impl super::Session for Session {
    fn format(&self) -> DeviceFormat {
        self.format
    }

    fn assign_channel(&self, chunk: Arc<Chunk>) -> Option<usize> {
        self.control.assign(chunk)
    }

    fn halt(&self, channel: usize) {
        self.control.halt(channel);
    }

    fn is_active(&self, channel: usize) -> bool {
        self.control.is_active(channel)
    }

    fn on_channel_finished(&self, callback: ChannelFinished) {
        let deliver = self.deliver_notifications.clone();
        self.control.on_finished(Box::new(move |channel| {
            if deliver.load(Ordering::Relaxed) {
                callback(channel);
            }
        }));
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Session as _;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_render_drives_completion() {
        let session = Session::new("mock", DeviceFormat::default());
        let finished = Arc::new(AtomicUsize::new(usize::MAX));
        let sink = finished.clone();
        session.on_channel_finished(Box::new(move |channel| {
            sink.store(channel, Ordering::SeqCst);
        }));

        let channel = session
            .assign_channel(Arc::new(Chunk::new(vec![0.5; 10])))
            .unwrap();
        assert!(session.is_active(channel));

        let output = session.render(5);
        assert_eq!(output.len(), 10);
        assert!(session.is_active(channel));

        session.render(5);
        assert!(!session.is_active(channel));
        assert_eq!(finished.load(Ordering::SeqCst), channel);
    }

    #[test]
    fn test_swallowed_notifications() {
        let session = Session::new("mock", DeviceFormat::default());
        let count = Arc::new(AtomicUsize::new(0));
        let sink = count.clone();
        session.on_channel_finished(Box::new(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        }));
        session.set_deliver_notifications(false);

        session.assign_channel(Arc::new(Chunk::new(vec![0.5; 2])));
        session.render(4);
        assert_eq!(session.active_channels(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
