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

//! Fixed pool of hardware mixing channels.
//!
//! The game thread talks to the mixer through a [`ChannelControl`]: it claims
//! free channels through shared atomic flags and sends play/halt commands over
//! a channel. The mixer itself lives in the audio callback, drains those
//! commands at the start of every block, and fires the completion notification
//! when a channel ends. Anything the mixer lets go of that would free memory
//! is sent back and dropped on the game thread.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};

use super::chunk::Chunk;
use super::ChannelFinished;

/// Number of hardware mixing channels.
pub const HARDWARE_CHANNELS: usize = 16;

/// Messages from the game thread to the mixer.
pub enum Command {
    /// Start playing a chunk on a previously claimed channel.
    Play { channel: usize, chunk: Arc<Chunk> },
    /// Halt a channel immediately.
    Halt { channel: usize },
    /// Install the completion notification.
    OnFinished(ChannelFinished),
}

/// Owned values the mixer releases without dropping them itself. They are
/// never read, only dropped.
#[allow(dead_code)]
enum Retired {
    /// A replaced completion notification.
    Callback(ChannelFinished),
    /// A finished chunk the mixer held the last reference to.
    Chunk(Arc<Chunk>),
}

/// Commands that can be queued between two mixing blocks. Both queues are
/// fixed size so that the mixer never frees queue storage.
const COMMAND_CAPACITY: usize = 256;

/// Room for one retired chunk per channel plus replaced callbacks.
const RETIRED_CAPACITY: usize = HARDWARE_CHANNELS * 2;

/// Activity flags shared between the game thread and the mixer.
struct ChannelStates {
    active: [AtomicBool; HARDWARE_CHANNELS],
}

impl ChannelStates {
    fn new() -> ChannelStates {
        ChannelStates {
            active: std::array::from_fn(|_| AtomicBool::new(false)),
        }
    }

    /// Claims the lowest free channel.
    fn claim(&self) -> Option<usize> {
        self.active.iter().position(|active| {
            active
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        })
    }

    fn is_active(&self, channel: usize) -> bool {
        self.active
            .get(channel)
            .is_some_and(|active| active.load(Ordering::Acquire))
    }

    fn release(&self, channel: usize) {
        if let Some(active) = self.active.get(channel) {
            active.store(false, Ordering::Release);
        }
    }

    fn active_count(&self) -> usize {
        self.active
            .iter()
            .filter(|active| active.load(Ordering::Acquire))
            .count()
    }
}

/// Game-thread handle onto a [`ChannelMixer`].
#[derive(Clone)]
pub struct ChannelControl {
    states: Arc<ChannelStates>,
    commands: Sender<Command>,
    retired: Receiver<Retired>,
}

impl ChannelControl {
    /// Plays the chunk on any free channel. Returns None if every channel is busy.
    pub fn assign(&self, chunk: Arc<Chunk>) -> Option<usize> {
        self.collect_retired();
        let channel = self.states.claim()?;
        if self.commands.try_send(Command::Play { channel, chunk }).is_err() {
            // The mixer is gone or backed up, so nothing will play on this channel.
            self.states.release(channel);
            return None;
        }
        Some(channel)
    }

    /// Halts the given channel. Out of range channels are ignored.
    pub fn halt(&self, channel: usize) {
        if channel < HARDWARE_CHANNELS {
            let _ = self.commands.try_send(Command::Halt { channel });
        }
    }

    /// Returns true if the channel is currently playing.
    pub fn is_active(&self, channel: usize) -> bool {
        self.states.is_active(channel)
    }

    /// Returns the number of channels currently playing.
    pub fn active_count(&self) -> usize {
        self.states.active_count()
    }

    /// Installs the completion notification, replacing any previous one.
    pub fn on_finished(&self, callback: ChannelFinished) {
        self.collect_retired();
        let _ = self.commands.try_send(Command::OnFinished(callback));
    }

    /// Drops everything the mixer has handed back.
    fn collect_retired(&self) {
        while let Ok(retired) = self.retired.try_recv() {
            drop(retired);
        }
    }
}

/// A chunk playing on one channel.
struct Voice {
    chunk: Arc<Chunk>,
    position: usize,
}

impl Voice {
    /// Adds this voice into the interleaved output. Returns true once the
    /// chunk has been fully played.
    fn mix_into(&mut self, output: &mut [f32], output_channels: usize) -> bool {
        let samples = self.chunk.samples();
        let gain = self.chunk.gain();

        for frame in output.chunks_exact_mut(output_channels) {
            let Some(sample) = samples.get(self.position) else {
                return true;
            };
            let value = sample * gain;
            frame.iter_mut().for_each(|out| *out += value);
            self.position += 1;
        }

        self.position >= samples.len()
    }
}

/// The mixing side of the channel pool. Owned by the audio callback.
pub struct ChannelMixer {
    voices: [Option<Voice>; HARDWARE_CHANNELS],
    states: Arc<ChannelStates>,
    commands: Receiver<Command>,
    retired: Sender<Retired>,
    finished: Option<ChannelFinished>,
    output_channels: usize,
}

impl ChannelMixer {
    /// Creates a mixer producing interleaved frames of `output_channels` samples.
    pub fn new(output_channels: u16) -> (ChannelControl, ChannelMixer) {
        let (commands_tx, commands_rx) = crossbeam_channel::bounded(COMMAND_CAPACITY);
        let (retired_tx, retired_rx) = crossbeam_channel::bounded(RETIRED_CAPACITY);
        let states = Arc::new(ChannelStates::new());

        let control = ChannelControl {
            states: states.clone(),
            commands: commands_tx,
            retired: retired_rx,
        };
        let mixer = ChannelMixer {
            voices: std::array::from_fn(|_| None),
            states,
            commands: commands_rx,
            retired: retired_tx,
            finished: None,
            output_channels: usize::from(output_channels.max(1)),
        };
        (control, mixer)
    }

    /// Mixes one block of interleaved output.
    pub fn process(&mut self, output: &mut [f32]) {
        self.drain_commands();
        output.fill(0.0);

        for channel in 0..HARDWARE_CHANNELS {
            let done = match self.voices[channel].as_mut() {
                Some(voice) => voice.mix_into(output, self.output_channels),
                None => continue,
            };
            if done {
                self.finish(channel);
            }
        }

        output
            .iter_mut()
            .for_each(|sample| *sample = sample.clamp(-1.0, 1.0));
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            match command {
                Command::Play { channel, chunk } => {
                    if let Some(voice) = self.voices.get_mut(channel) {
                        *voice = Some(Voice { chunk, position: 0 });
                    }
                }
                Command::Halt { channel } => {
                    if self.voices.get(channel).is_some_and(|v| v.is_some()) {
                        self.finish(channel);
                    }
                }
                Command::OnFinished(callback) => {
                    if let Some(previous) = self.finished.replace(callback) {
                        self.retire(Retired::Callback(previous));
                    }
                }
            }
        }
    }

    /// Ends playback on a channel. The notification runs before the channel is
    /// marked free so that a newly claimed channel is never cleared by a stale
    /// notification.
    fn finish(&mut self, channel: usize) {
        if let Some(voice) = self.voices[channel].take() {
            if Arc::strong_count(&voice.chunk) == 1 {
                self.retire(Retired::Chunk(voice.chunk));
            }
        }
        if let Some(finished) = self.finished.as_ref() {
            finished(channel);
        }
        self.states.release(channel);
    }

    /// Hands a value back to the game thread. It is only dropped here if the
    /// queue is full or the control side is gone.
    fn retire(&self, retired: Retired) {
        let _ = self.retired.try_send(retired);
    }
}

impl fmt::Debug for ChannelMixer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelMixer")
            .field(
                "playing",
                &self.voices.iter().filter(|v| v.is_some()).count(),
            )
            .field("output_channels", &self.output_channels)
            .finish()
    }
}
