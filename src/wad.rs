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

//! Resource stores holding named lumps.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{ResourceLocation, Resources};

mod file;
mod lumpdir;

pub use file::WadFile;
pub use lumpdir::LumpDir;

/// Lump names are at most eight characters.
pub const LUMP_NAME_LEN: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum WadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a WAD file (magic {0:?})")]
    InvalidMagic([u8; 4]),

    #[error("WAD truncated: {0}")]
    Truncated(String),

    #[error("invalid resources configuration: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// A store of named lumps.
pub trait ResourceStore: Send + Sync {
    /// Loads the lump with the given name. Lookup ignores case.
    fn load(&self, name: &str) -> Option<Arc<[u8]>>;

    /// Returns the names of every lump in the store.
    fn names(&self) -> Vec<String>;
}

/// Normalizes a lump name for lookup.
pub fn lump_key(name: &str) -> String {
    name.chars()
        .take(LUMP_NAME_LEN)
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Opens the store described by the resources configuration.
pub fn open_store(resources: &Resources) -> Result<Arc<dyn ResourceStore>, WadError> {
    Ok(match resources.location()? {
        ResourceLocation::Wad(path) => Arc::new(WadFile::open(path)?),
        ResourceLocation::LumpDir(path) => Arc::new(LumpDir::open(path)?),
    })
}

/// A store held entirely in memory.
#[derive(Default, Clone)]
pub struct MemoryStore {
    lumps: HashMap<String, Arc<[u8]>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Adds or replaces a lump.
    pub fn insert(&mut self, name: &str, data: Vec<u8>) {
        self.lumps.insert(lump_key(name), Arc::from(data));
    }
}

impl ResourceStore for MemoryStore {
    fn load(&self, name: &str) -> Option<Arc<[u8]>> {
        self.lumps.get(&lump_key(name)).cloned()
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lumps.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lump_key() {
        assert_eq!(lump_key("dspistol"), "DSPISTOL");
        assert_eq!(lump_key("dsverylongname"), "DSVERYLO");
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        store.insert("DSPISTOL", vec![1, 2, 3]);
        store.insert("dsoof", vec![4]);

        assert_eq!(store.load("dspistol").as_deref(), Some(&[1u8, 2, 3][..]));
        assert_eq!(store.load("DSOOF").as_deref(), Some(&[4u8][..]));
        assert!(store.load("dsradio").is_none());
        assert_eq!(store.names(), vec!["DSOOF", "DSPISTOL"]);
    }

    #[test]
    fn test_open_store_from_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("DSOOF.lmp"), [9u8, 9]).unwrap();

        let store = open_store(&Resources::lump_dir(dir.path())).unwrap();
        assert_eq!(store.load("dsoof").as_deref(), Some(&[9u8, 9][..]));

        let missing = open_store(&Resources::wad(&dir.path().join("missing.wad")));
        assert!(matches!(missing, Err(WadError::Io(_))));
    }
}
