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

//! The sound driver: the game-facing play/stop/query surface and the device
//! lifecycle behind it.

use std::sync::Arc;

use tracing::{debug, info, trace};

use super::cache::EffectCache;
use super::channels::{ChannelTable, InstanceId};
use super::error::SoundError;
use super::music::MusicPlayer;
use super::sfx::{self, EffectId};
use crate::audio::{self, AudioError, Session};
use crate::config;
use crate::wad::ResourceStore;

/// Owns the effect buffers, the channel table and the device session.
pub struct SoundDriver {
    audio: config::Audio,
    store: Arc<dyn ResourceStore>,
    cache: EffectCache,
    channels: Arc<ChannelTable>,
    music: MusicPlayer,
    /// Last instance id handed out.
    next_instance: InstanceId,
    /// Open sound and music users. The session lives while this is non-zero.
    refcount: usize,
    session: Option<Arc<dyn Session>>,
}

impl SoundDriver {
    /// Creates an uninitialized driver reading effects from the given store.
    pub fn new(audio: config::Audio, store: Arc<dyn ResourceStore>) -> SoundDriver {
        SoundDriver {
            audio,
            store,
            cache: EffectCache::new(),
            channels: Arc::new(ChannelTable::new()),
            music: MusicPlayer::new(),
            next_instance: 0,
            refcount: 0,
            session: None,
        }
    }

    /// Opens the configured device if this is the first user.
    pub fn init_sound(&mut self) -> Result<(), SoundError> {
        let settings = self.audio.clone();
        self.init_with(|| audio::open_session(&settings))
    }

    /// Like [`SoundDriver::init_sound`], but uses an already opened session.
    pub fn init_with_session(&mut self, session: Arc<dyn Session>) -> Result<(), SoundError> {
        self.init_with(|| Ok(session))
    }

    /// Releases one user, closing the device once none remain.
    pub fn shutdown_sound(&mut self) {
        self.release();
    }

    /// Music shares the sound device and its reference count.
    pub fn init_music(&mut self) -> Result<(), SoundError> {
        self.init_sound()
    }

    pub fn shutdown_music(&mut self) {
        self.release();
    }

    fn init_with<F>(&mut self, open: F) -> Result<(), SoundError>
    where
        F: FnOnce() -> Result<Arc<dyn Session>, AudioError>,
    {
        if self.refcount > 0 {
            self.refcount += 1;
            return Ok(());
        }

        debug!("Initializing sound");
        let session = open()?;
        // Notifications still queued in an earlier session's mixer keep
        // writing to the table they were registered with, never this one.
        self.channels = Arc::new(ChannelTable::new());
        self.cache.clear();
        session.on_channel_finished(self.channels.completion_callback());
        info!(device = %session, format = %session.format(), "Sound initialized");

        self.session = Some(session);
        self.refcount = 1;
        Ok(())
    }

    fn release(&mut self) {
        match self.refcount {
            0 => return,
            1 => {}
            _ => {
                self.refcount -= 1;
                return;
            }
        }

        debug!("Finalizing sound");
        self.refcount = 0;
        if let Some(session) = self.session.take() {
            self.channels.halt_all(session.as_ref());
            debug!(device = %session, "Closing audio device");
        }
        self.channels.clear();
        self.cache.clear();
        debug!("Sound finalized");
    }

    /// Starts an effect and returns the new instance id. The id is handed out
    /// even if nothing ends up playing. Pan, pitch and priority are accepted
    /// but not applied.
    pub fn start_sound(
        &mut self,
        effect: EffectId,
        volume: i32,
        pan: i32,
        pitch: i32,
        priority: i32,
    ) -> InstanceId {
        self.next_instance += 1;
        let instance = self.next_instance;
        trace!(
            effect,
            name = sfx::name(effect).unwrap_or("unknown"),
            instance,
            volume,
            pan,
            pitch,
            priority,
            "Starting sound"
        );

        let Some(session) = self.session.as_ref() else {
            trace!(instance, "Sound not initialized");
            return instance;
        };
        let device_rate = session.format().sample_rate;
        let Some(chunk) = self
            .cache
            .get_or_build(effect, self.store.as_ref(), device_rate)
        else {
            return instance;
        };

        chunk.set_volume(volume);
        if let Some(channel) = self.channels.assign(instance, chunk, session.as_ref()) {
            trace!(instance, channel, "Assigned channel");
        }
        instance
    }

    /// Live parameter changes are not applied to playing sounds.
    pub fn update_sound_params(
        &mut self,
        instance: InstanceId,
        volume: i32,
        pan: i32,
        pitch: i32,
    ) {
        trace!(instance, volume, pan, pitch, "Update sound params");
    }

    /// Stops an instance. No-op if it isn't playing.
    pub fn stop_sound(&mut self, instance: InstanceId) {
        trace!(instance, "Stopping sound");
        if let Some(session) = self.session.as_ref() {
            self.channels.stop(instance, session.as_ref());
        }
    }

    /// Returns true if the instance is still playing.
    pub fn sound_is_playing(&self, instance: InstanceId) -> bool {
        trace!(instance, "Querying sound");
        match self.session.as_ref() {
            Some(session) => self.channels.is_playing(instance, session.as_ref()),
            None => false,
        }
    }

    /// Per-frame update hook. Mixing happens in the device.
    pub fn update_sound(&mut self) {}

    /// Per-frame submit hook.
    pub fn submit_sound(&mut self) {}

    pub fn set_channels(&mut self, channels: usize) {
        trace!(channels, "Set channels");
    }

    /// Returns the music interface.
    pub fn music(&mut self) -> &mut MusicPlayer {
        &mut self.music
    }

    /// Returns true while a device session is open.
    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// Returns the effect cache.
    pub fn cache(&self) -> &EffectCache {
        &self.cache
    }

    /// Returns the channel table.
    pub fn channels(&self) -> &ChannelTable {
        &self.channels
    }
}

impl std::fmt::Debug for SoundDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundDriver")
            .field("device", &self.session.as_ref().map(|s| s.to_string()))
            .field("refcount", &self.refcount)
            .field("next_instance", &self.next_instance)
            .field("cache", &self.cache)
            .field("occupied_channels", &self.channels.occupied())
            .finish()
    }
}
