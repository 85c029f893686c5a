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
use std::{fmt, sync::Arc, thread};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use thread_priority::ThreadPriority;
use tracing::{debug, error, info};

use super::mixer::{ChannelControl, ChannelMixer};
use super::thread_priority::{callback_thread_priority, configure_callback_thread};
use super::{AudioError, ChannelFinished, Chunk, DeviceFormat};

/// Block size used if the stream doesn't ask for a fixed buffer size.
const DEFAULT_BLOCK_FRAMES: usize = 1024;

/// A device session backed by a cpal output stream.
///
/// cpal streams are not `Send`, so the stream is created on and owned by a
/// dedicated output thread that lives as long as the session.
pub struct Session {
    /// The name of the device.
    name: String,
    /// The host the device belongs to.
    host_id: cpal::HostId,
    /// The negotiated output format.
    format: DeviceFormat,
    /// Game-thread side of the channel pool.
    control: ChannelControl,
    /// Dropping this sender tells the output thread to close the stream.
    shutdown_tx: Mutex<Option<Sender<()>>>,
    /// Handle to the output thread.
    output_thread: Mutex<Option<thread::JoinHandle<()>>>,
}

impl Session {
    /// Lists the output devices of the default host.
    pub fn list() -> Result<Vec<String>, AudioError> {
        let host = cpal::default_host();
        let devices = host.output_devices().map_err(|e| AudioError::Open {
            device: host.id().name().to_string(),
            reason: e.to_string(),
        })?;

        Ok(devices.filter_map(|device| device.name().ok()).collect())
    }

    /// Opens the named device ("default" picks the host's default output) and
    /// starts the output stream.
    pub fn open(name: &str, format: DeviceFormat) -> Result<Session, AudioError> {
        let host = cpal::default_host();
        let device = find_device(&host, name)?;
        let sample_format = device
            .default_output_config()
            .map_err(|e| open_error(name, e))?
            .sample_format();

        let stream_config = cpal::StreamConfig {
            channels: format.channels,
            sample_rate: cpal::SampleRate(format.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(format.chunk_size),
        };

        let (control, mixer) = ChannelMixer::new(format.channels);
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<(), AudioError>>(1);
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);
        let priority = callback_thread_priority();

        let device_name = name.to_string();
        let output_thread = thread::Builder::new()
            .name("sfxdriver-output".to_string())
            .spawn(move || {
                let stream = match build_stream(
                    &device,
                    &stream_config,
                    sample_format,
                    mixer,
                    priority,
                ) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                if let Err(e) = stream.play() {
                    let _ = ready_tx.send(Err(open_error(&device_name, e)));
                    return;
                }
                let _ = ready_tx.send(Ok(()));

                // Returns once the session drops its sender.
                let _ = shutdown_rx.recv();
                drop(stream);
                debug!(device = device_name, "Output stream closed");
            })
            .map_err(|e| open_error(name, e))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = output_thread.join();
                return Err(e);
            }
            Err(e) => {
                let _ = output_thread.join();
                return Err(open_error(name, e));
            }
        }

        info!(device = name, %format, ?sample_format, "Opened audio session");
        Ok(Session {
            name: name.to_string(),
            host_id: host.id(),
            format,
            control,
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            output_thread: Mutex::new(Some(output_thread)),
        })
    }
}

fn open_error(device: &str, e: impl fmt::Display) -> AudioError {
    AudioError::Open {
        device: device.to_string(),
        reason: e.to_string(),
    }
}

fn find_device(host: &cpal::Host, name: &str) -> Result<cpal::Device, AudioError> {
    if name == "default" {
        return host
            .default_output_device()
            .ok_or_else(|| AudioError::DeviceNotFound(name.to_string()));
    }

    host.output_devices()
        .map_err(|e| open_error(name, e))?
        .find(|device| device.name().is_ok_and(|n| n == name))
        .ok_or_else(|| AudioError::DeviceNotFound(name.to_string()))
}

fn build_stream(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    sample_format: cpal::SampleFormat,
    mixer: ChannelMixer,
    priority: ThreadPriority,
) -> Result<cpal::Stream, AudioError> {
    let name = device.name().unwrap_or_default();
    let error_callback = |err: cpal::StreamError| error!(err = %err, "Error during stream");
    let block_frames = match config.buffer_size {
        cpal::BufferSize::Fixed(frames) => frames as usize,
        cpal::BufferSize::Default => DEFAULT_BLOCK_FRAMES,
    };
    let block_len = block_frames.max(1) * usize::from(config.channels.max(1));

    let stream = match sample_format {
        cpal::SampleFormat::F32 => device.build_output_stream(
            config,
            create_callback::<f32>(mixer, priority, block_len),
            error_callback,
            None,
        ),
        cpal::SampleFormat::I16 => device.build_output_stream(
            config,
            create_callback::<i16>(mixer, priority, block_len),
            error_callback,
            None,
        ),
        cpal::SampleFormat::U16 => device.build_output_stream(
            config,
            create_callback::<u16>(mixer, priority, block_len),
            error_callback,
            None,
        ),
        other => return Err(AudioError::UnsupportedSampleFormat(format!("{other:?}"))),
    };

    stream.map_err(|e| open_error(&name, e))
}

/// Mixes into a float block allocated up front, then converts to the device
/// sample type. Device buffers larger than the block are mixed in pieces.
fn create_callback<T>(
    mut mixer: ChannelMixer,
    priority: ThreadPriority,
    block_len: usize,
) -> impl FnMut(&mut [T], &cpal::OutputCallbackInfo) + Send + 'static
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let mut block = vec![0.0f32; block_len];
    let mut priority_set = false;
    move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
        configure_callback_thread(priority, &mut priority_set);

        mix_blocks(&mut mixer, &mut block, data);
    }
}

/// Fills the device buffer one block at a time.
fn mix_blocks<T>(mixer: &mut ChannelMixer, block: &mut [f32], data: &mut [T])
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    for window in data.chunks_mut(block.len()) {
        let block = &mut block[..window.len()];
        mixer.process(block);
        for (dst, &src) in window.iter_mut().zip(block.iter()) {
            *dst = T::from_sample(src);
        }
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
        self.control.on_finished(callback);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown_tx.lock().take();
        if let Some(thread) = self.output_thread.lock().take() {
            let _ = thread.join();
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Channels={}) ({})",
            self.name,
            self.format.channels,
            self.host_id.name()
        )
    }
}

#[cfg(test)]
mod tests {
    use cpal::Sample;

    use super::*;

    #[test]
    fn test_mix_blocks_larger_device_buffer() {
        let (control, mut mixer) = ChannelMixer::new(2);
        control.assign(Arc::new(Chunk::new(vec![0.5; 6])));

        // Two frames per block, five frames requested by the device.
        let mut block = vec![0.0f32; 4];
        let mut data = vec![0i16; 10];
        mix_blocks(&mut mixer, &mut block, &mut data);

        assert!(data.iter().all(|s| *s == i16::from_sample(0.5f32)));
        assert_eq!(block.len(), 4);
        assert!(control.is_active(0));

        mix_blocks(&mut mixer, &mut block, &mut data);
        assert_eq!(data[0], i16::from_sample(0.5f32));
        assert_eq!(data[2], 0);
        assert!(!control.is_active(0));
    }
}
