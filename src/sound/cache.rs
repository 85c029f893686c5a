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

//! Lazily built, permanently cached effect buffers.
//!
//! Effects live in an arena indexed by effect id. A buffer, once built, stays
//! until [`EffectCache::clear`] runs at device shutdown.

use std::sync::Arc;

use tracing::{debug, trace};

use super::error::SoundError;
use super::header::RawSoundHeader;
use super::resample::{resample, target_len};
use super::sfx::{self, EffectId, NUM_SFX};
use crate::audio::Chunk;
use crate::wad::ResourceStore;

/// The cached state of one effect.
#[derive(Default)]
struct Effect {
    /// Raw lump data, loaded once from the resource store.
    raw: Option<Arc<[u8]>>,
    /// Source sample rate read from the header.
    source_rate: Option<u16>,
    /// The converted buffer.
    chunk: Option<Arc<Chunk>>,
}

/// Owns the converted buffer of every effect.
pub struct EffectCache {
    effects: Vec<Effect>,
    /// Number of buffers built since creation.
    builds: usize,
}

impl EffectCache {
    /// Creates an empty cache with a slot for every effect.
    pub fn new() -> EffectCache {
        EffectCache {
            effects: (0..NUM_SFX).map(|_| Effect::default()).collect(),
            builds: 0,
        }
    }

    /// Returns the effect's buffer, building it at `device_rate` on first use.
    /// Returns None if the effect can't be played; failures are not remembered.
    pub fn get_or_build(
        &mut self,
        id: EffectId,
        store: &dyn ResourceStore,
        device_rate: u32,
    ) -> Option<Arc<Chunk>> {
        let effect = self.effects.get_mut(id)?;
        if let Some(chunk) = &effect.chunk {
            return Some(chunk.clone());
        }

        if effect.raw.is_none() {
            let Some(lump) = sfx::lump_name(id) else {
                debug!(effect = id, "No lump for effect");
                return None;
            };
            match store.load(&lump) {
                Some(data) => effect.raw = Some(data),
                None => {
                    debug!(effect = id, lump = %lump, "Sound effect not found");
                    return None;
                }
            }
        }

        let raw = effect.raw.as_deref()?;
        match build(raw, device_rate) {
            Ok((source_rate, chunk)) => {
                let chunk = Arc::new(chunk);
                debug!(
                    effect = id,
                    name = sfx::name(id).unwrap_or("unknown"),
                    source_rate,
                    device_rate,
                    frames = chunk.len(),
                    memory_kb = chunk.memory_size() / 1024,
                    "Built effect buffer"
                );
                effect.source_rate = Some(source_rate);
                effect.chunk = Some(chunk.clone());
                self.builds += 1;
                Some(chunk)
            }
            Err(e) => {
                trace!(effect = id, error = %e, "Skipped effect buffer");
                None
            }
        }
    }

    /// Returns the effect's buffer if it has been built.
    pub fn get(&self, id: EffectId) -> Option<&Arc<Chunk>> {
        self.effects.get(id)?.chunk.as_ref()
    }

    /// Returns the source sample rate of a built effect.
    pub fn source_rate(&self, id: EffectId) -> Option<u16> {
        self.effects.get(id)?.source_rate
    }

    /// Returns the number of buffers built since creation.
    pub fn builds(&self) -> usize {
        self.builds
    }

    /// Returns the number of effects currently holding a buffer.
    pub fn built_count(&self) -> usize {
        self.effects.iter().filter(|e| e.chunk.is_some()).count()
    }

    /// Returns the total memory used by built buffers.
    pub fn total_memory_usage(&self) -> usize {
        self.effects
            .iter()
            .filter_map(|e| e.chunk.as_ref())
            .map(|c| c.memory_size())
            .sum()
    }

    /// Releases every buffer and raw lump.
    pub fn clear(&mut self) {
        for (id, effect) in self.effects.iter_mut().enumerate() {
            if let Some(chunk) = effect.chunk.take() {
                debug!(
                    effect = id,
                    name = sfx::name(id).unwrap_or("unknown"),
                    frames = chunk.len(),
                    "Freed chunk"
                );
            }
            effect.raw = None;
            effect.source_rate = None;
        }
    }
}

impl Default for EffectCache {
    fn default() -> Self {
        EffectCache::new()
    }
}

/// Converts a raw lump into a chunk at the device rate.
fn build(raw: &[u8], device_rate: u32) -> Result<(u16, Chunk), SoundError> {
    let header = RawSoundHeader::parse(raw)?;
    if !header.is_supported() {
        return Err(SoundError::UnsupportedFormat(header.format));
    }
    if header.sample_rate == 0 {
        return Err(SoundError::InvalidSampleRate(header.sample_rate));
    }

    let samples = header.samples(raw);
    let dstlen = target_len(samples.len(), header.sample_rate, device_rate);
    let converted = resample(samples, dstlen)?;
    Ok((header.sample_rate, Chunk::new(converted)))
}

impl std::fmt::Debug for EffectCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectCache")
            .field("built", &self.built_count())
            .field("builds", &self.builds)
            .field("total_memory_kb", &(self.total_memory_usage() / 1024))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::sound::header::tests::build_lump;
    use crate::sound::header::FORMAT_PCM_U8;
    use crate::wad::MemoryStore;

    const PISTOL: EffectId = 1;

    /// Counts lookups so tests can tell whether the store was consulted.
    struct CountingStore {
        inner: MemoryStore,
        loads: AtomicUsize,
    }

    impl ResourceStore for CountingStore {
        fn load(&self, name: &str) -> Option<Arc<[u8]>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load(name)
        }

        fn names(&self) -> Vec<String> {
            self.inner.names()
        }
    }

    fn store_with(name: &str, lump: Vec<u8>) -> CountingStore {
        let mut inner = MemoryStore::new();
        inner.insert(name, lump);
        CountingStore {
            inner,
            loads: AtomicUsize::new(0),
        }
    }

    #[test]
    fn test_build_is_idempotent() {
        let store = store_with(
            "dspistol",
            build_lump(FORMAT_PCM_U8, 11025, &[118, 128, 138, 128]),
        );
        let mut cache = EffectCache::new();

        let first = cache.get_or_build(PISTOL, &store, 44100).unwrap();
        let second = cache.get_or_build(PISTOL, &store, 44100).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 16);
        assert_eq!(cache.builds(), 1);
        assert_eq!(store.loads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.source_rate(PISTOL), Some(11025));
        assert!(cache.get(PISTOL).is_some());
    }

    #[test]
    fn test_missing_resource() {
        let store = store_with("dsoof", build_lump(FORMAT_PCM_U8, 11025, &[128; 4]));
        let mut cache = EffectCache::new();

        assert!(cache.get_or_build(PISTOL, &store, 44100).is_none());
        assert!(cache.get_or_build(PISTOL, &store, 44100).is_none());
        assert_eq!(store.loads.load(Ordering::SeqCst), 2);
        assert_eq!(cache.builds(), 0);
    }

    #[test]
    fn test_unsupported_format_is_retried() {
        let store = store_with("dspistol", build_lump(0x0001, 11025, &[128; 4]));
        let mut cache = EffectCache::new();

        assert!(cache.get_or_build(PISTOL, &store, 44100).is_none());
        assert!(cache.get_or_build(PISTOL, &store, 44100).is_none());
        assert_eq!(cache.builds(), 0);
        assert!(cache.get(PISTOL).is_none());
        // The raw lump is kept, only the build is retried.
        assert_eq!(store.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_rejected_lumps() {
        let mut inner = MemoryStore::new();
        inner.insert("dspistol", vec![3, 0, 0x11]);
        inner.insert("dsshotgn", build_lump(FORMAT_PCM_U8, 0, &[128; 4]));
        inner.insert("dssgcock", build_lump(FORMAT_PCM_U8, 11025, &[]));
        let mut cache = EffectCache::new();

        assert!(cache.get_or_build(PISTOL, &inner, 44100).is_none());
        assert!(cache.get_or_build(2, &inner, 44100).is_none());
        assert!(cache.get_or_build(3, &inner, 44100).is_none());
        assert_eq!(cache.builds(), 0);
    }

    #[test]
    fn test_out_of_range_and_none() {
        let store = store_with("dspistol", build_lump(FORMAT_PCM_U8, 11025, &[128; 4]));
        let mut cache = EffectCache::new();

        assert!(cache.get_or_build(0, &store, 44100).is_none());
        assert!(cache.get_or_build(NUM_SFX, &store, 44100).is_none());
        assert_eq!(store.loads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_clear() {
        let store = store_with("dspistol", build_lump(FORMAT_PCM_U8, 11025, &[128; 100]));
        let mut cache = EffectCache::new();
        let chunk = cache.get_or_build(PISTOL, &store, 22050).unwrap();
        assert_eq!(chunk.len(), 200);
        assert_eq!(cache.built_count(), 1);
        assert_eq!(cache.total_memory_usage(), 800);

        cache.clear();
        assert_eq!(cache.built_count(), 0);
        assert!(cache.get(PISTOL).is_none());

        let rebuilt = cache.get_or_build(PISTOL, &store, 22050).unwrap();
        assert!(!Arc::ptr_eq(&chunk, &rebuilt));
        assert_eq!(cache.builds(), 2);
    }
}
