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

//! Mapping of hardware channels to playback instances.
//!
//! Every slot is a single atomic word so that the completion notification,
//! which runs in the audio callback, can free a slot with one store while the
//! game thread scans the table.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::trace;

use crate::audio::mixer::HARDWARE_CHANNELS;
use crate::audio::{ChannelFinished, Chunk, Session};

/// An opaque playback instance handle. Zero never names an instance.
pub type InstanceId = u64;

/// The "no instance" value held by free slots.
pub const NO_INSTANCE: InstanceId = 0;

/// Number of channel slots.
pub const NUM_CHANNELS: usize = HARDWARE_CHANNELS;

/// Fixed table of channel slots, each free or holding an instance id.
#[derive(Debug)]
pub struct ChannelTable {
    slots: [AtomicU64; NUM_CHANNELS],
}

impl ChannelTable {
    /// Creates a table with every slot free.
    pub fn new() -> ChannelTable {
        ChannelTable {
            slots: std::array::from_fn(|_| AtomicU64::new(NO_INSTANCE)),
        }
    }

    /// Plays the chunk on a free hardware channel and records the instance
    /// there. The sound is dropped if no channel is free.
    pub fn assign(
        &self,
        instance: InstanceId,
        chunk: Arc<Chunk>,
        session: &dyn Session,
    ) -> Option<usize> {
        let Some(channel) = session.assign_channel(chunk) else {
            trace!(instance, "No free channel, dropping sound");
            return None;
        };
        let Some(slot) = self.slots.get(channel) else {
            trace!(instance, channel, "Channel out of range, not recorded");
            return None;
        };
        slot.store(instance, Ordering::Release);
        Some(channel)
    }

    /// Frees a slot. Called from the completion notification: constant time,
    /// no allocation, no logging. Out of range channels are ignored.
    pub fn release(&self, channel: usize) {
        if let Some(slot) = self.slots.get(channel) {
            slot.store(NO_INSTANCE, Ordering::Release);
        }
    }

    /// Returns the channel holding the instance.
    pub fn find(&self, instance: InstanceId) -> Option<usize> {
        if instance == NO_INSTANCE {
            return None;
        }
        self.slots
            .iter()
            .position(|slot| slot.load(Ordering::Acquire) == instance)
    }

    /// Halts the instance's channel and frees its slot. No-op if the instance
    /// isn't playing.
    pub fn stop(&self, instance: InstanceId, session: &dyn Session) {
        let Some(channel) = self.find(instance) else {
            return;
        };
        // Losing the exchange means the completion notification got there first.
        if self.clear_if(channel, instance) {
            session.halt(channel);
        }
    }

    /// Returns true if the instance is playing. A slot whose channel the
    /// session reports idle is freed on the way.
    pub fn is_playing(&self, instance: InstanceId, session: &dyn Session) -> bool {
        let Some(channel) = self.find(instance) else {
            return false;
        };
        if session.is_active(channel) {
            return true;
        }

        trace!(instance, channel, "Freeing slot of finished channel");
        self.clear_if(channel, instance);
        false
    }

    /// Returns the number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.load(Ordering::Acquire) != NO_INSTANCE)
            .count()
    }

    /// Halts every assigned channel and frees all slots.
    pub fn halt_all(&self, session: &dyn Session) {
        for (channel, slot) in self.slots.iter().enumerate() {
            if slot.swap(NO_INSTANCE, Ordering::AcqRel) != NO_INSTANCE {
                session.halt(channel);
            }
        }
    }

    /// Frees all slots without touching the device.
    pub fn clear(&self) {
        self.slots
            .iter()
            .for_each(|slot| slot.store(NO_INSTANCE, Ordering::Release));
    }

    /// Builds the completion notification that frees slots in this table.
    pub fn completion_callback(self: &Arc<Self>) -> ChannelFinished {
        let table = self.clone();
        Box::new(move |channel| table.release(channel))
    }

    fn clear_if(&self, channel: usize, instance: InstanceId) -> bool {
        self.slots[channel]
            .compare_exchange(
                instance,
                NO_INSTANCE,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

impl Default for ChannelTable {
    fn default() -> Self {
        ChannelTable::new()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::audio::{mock, DeviceFormat};
    use crate::testutil::eventually;

    fn session() -> Arc<mock::Session> {
        Arc::new(mock::Session::new("mock-device", DeviceFormat::default()))
    }

    fn chunk(frames: usize) -> Arc<Chunk> {
        Arc::new(Chunk::new(vec![0.25; frames]))
    }

    fn table_for(session: &mock::Session) -> Arc<ChannelTable> {
        let table = Arc::new(ChannelTable::new());
        session.on_channel_finished(table.completion_callback());
        table
    }

    #[test]
    fn test_unknown_instances() {
        let session = session();
        let table = table_for(&session);

        assert!(!table.is_playing(42, session.as_ref()));
        assert!(!table.is_playing(NO_INSTANCE, session.as_ref()));
        table.stop(42, session.as_ref());
        assert_eq!(table.occupied(), 0);
    }

    #[test]
    fn test_assign_then_stop() {
        let session = session();
        let table = table_for(&session);

        let channel = table.assign(1, chunk(1000), session.as_ref()).unwrap();
        assert_eq!(table.find(1), Some(channel));
        assert!(table.is_playing(1, session.as_ref()));

        table.stop(1, session.as_ref());
        assert!(!table.is_playing(1, session.as_ref()));
        assert_eq!(table.occupied(), 0);

        session.render(1);
        assert_eq!(session.active_channels(), 0);
    }

    #[test]
    fn test_capacity() {
        let session = session();
        let table = table_for(&session);

        for instance in 1..=NUM_CHANNELS as InstanceId {
            assert!(table.assign(instance, chunk(1000), session.as_ref()).is_some());
        }
        assert!(table.assign(17, chunk(1000), session.as_ref()).is_none());

        assert_eq!(table.occupied(), NUM_CHANNELS);
        assert!(!table.is_playing(17, session.as_ref()));
        for instance in 1..=NUM_CHANNELS as InstanceId {
            assert!(table.is_playing(instance, session.as_ref()));
        }
    }

    #[test]
    fn test_completion_frees_slot() {
        let session = session();
        let table = table_for(&session);

        table.assign(7, chunk(10), session.as_ref()).unwrap();
        session.render(5);
        assert_eq!(table.occupied(), 1);
        session.render(5);
        assert_eq!(table.occupied(), 0);
        assert!(!table.is_playing(7, session.as_ref()));
    }

    #[test]
    fn test_missed_notification_self_heals() {
        let session = session();
        let table = table_for(&session);
        session.set_deliver_notifications(false);

        table.assign(3, chunk(10), session.as_ref()).unwrap();
        session.render(10);
        assert_eq!(table.occupied(), 1);

        assert!(!table.is_playing(3, session.as_ref()));
        assert_eq!(table.occupied(), 0);
    }

    #[test]
    fn test_release_out_of_range() {
        let session = session();
        let table = table_for(&session);
        table.assign(1, chunk(100), session.as_ref()).unwrap();

        table.release(NUM_CHANNELS);
        table.release(usize::MAX);
        assert_eq!(table.occupied(), 1);
    }

    #[test]
    fn test_halt_all() {
        let session = session();
        let table = table_for(&session);
        for instance in 1..=4 {
            table.assign(instance, chunk(1000), session.as_ref()).unwrap();
        }

        table.halt_all(session.as_ref());
        assert_eq!(table.occupied(), 0);
        session.render(1);
        assert_eq!(session.active_channels(), 0);
    }

    #[test]
    fn test_completion_from_audio_thread() {
        let session = session();
        let table = table_for(&session);
        for instance in 1..=8 {
            table
                .assign(instance, chunk(64 * instance as usize), session.as_ref())
                .unwrap();
        }

        let renderer = {
            let session = session.clone();
            thread::spawn(move || {
                for _ in 0..64 {
                    session.render(16);
                }
            })
        };

        eventually(
            || (1..=8).all(|instance| !table.is_playing(instance, session.as_ref())),
            "Channels never finished",
        );
        renderer.join().unwrap();
        assert_eq!(table.occupied(), 0);
        assert!(table.occupied() <= NUM_CHANNELS);
    }
}
