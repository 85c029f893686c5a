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

//! IWAD/PWAD archives.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use super::{lump_key, ResourceStore, WadError, LUMP_NAME_LEN};

const HEADER_LEN: usize = 12;
const DIRECTORY_ENTRY_LEN: usize = 16;

/// A WAD file loaded into memory.
pub struct WadFile {
    /// The whole file.
    data: Vec<u8>,
    /// Lump name to byte range. Later directory entries shadow earlier ones.
    lumps: HashMap<String, Range<usize>>,
    /// Total entries in the directory, including shadowed ones.
    entries: usize,
    /// "IWAD" or "PWAD".
    kind: String,
}

impl WadFile {
    /// Reads and indexes the WAD at the given path.
    pub fn open(path: &Path) -> Result<WadFile, WadError> {
        let wad = WadFile::parse(fs::read(path)?)?;
        info!(path = ?path, kind = wad.kind, lumps = wad.entries, "Opened WAD");
        Ok(wad)
    }

    /// Parses an in-memory WAD image.
    pub fn parse(data: Vec<u8>) -> Result<WadFile, WadError> {
        let magic: [u8; 4] = data
            .get(0..4)
            .and_then(|m| m.try_into().ok())
            .ok_or_else(|| WadError::Truncated("header".to_string()))?;
        if &magic != b"IWAD" && &magic != b"PWAD" {
            return Err(WadError::InvalidMagic(magic));
        }
        if data.len() < HEADER_LEN {
            return Err(WadError::Truncated("header".to_string()));
        }

        let entries = read_count(&data, 4)?;
        let directory = read_count(&data, 8)?;

        let mut lumps = HashMap::with_capacity(entries);
        for index in 0..entries {
            let entry = directory + index * DIRECTORY_ENTRY_LEN;
            let raw = data
                .get(entry..entry + DIRECTORY_ENTRY_LEN)
                .ok_or_else(|| WadError::Truncated(format!("directory entry {index}")))?;

            let position = read_count(raw, 0)?;
            let size = read_count(raw, 4)?;
            let name = lump_name(&raw[8..8 + LUMP_NAME_LEN]);
            if position + size > data.len() {
                return Err(WadError::Truncated(format!("lump {name}")));
            }
            lumps.insert(lump_key(&name), position..position + size);
        }

        Ok(WadFile {
            kind: String::from_utf8_lossy(&magic).into_owned(),
            data,
            lumps,
            entries,
        })
    }
}

/// Reads a little-endian directory integer. Negative values are corrupt.
fn read_count(data: &[u8], offset: usize) -> Result<usize, WadError> {
    let bytes: [u8; 4] = data
        .get(offset..offset + 4)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| WadError::Truncated(format!("integer at {offset}")))?;
    usize::try_from(i32::from_le_bytes(bytes))
        .map_err(|_| WadError::Truncated(format!("negative integer at {offset}")))
}

/// Lump names are NUL padded.
fn lump_name(raw: &[u8]) -> String {
    let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

impl ResourceStore for WadFile {
    fn load(&self, name: &str) -> Option<Arc<[u8]>> {
        let range = self.lumps.get(&lump_key(name))?;
        Some(Arc::from(&self.data[range.clone()]))
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lumps.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for WadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WadFile")
            .field("kind", &self.kind)
            .field("entries", &self.entries)
            .field("size_kb", &(self.data.len() / 1024))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a PWAD image holding the given lumps in order.
    fn build_wad(lumps: &[(&str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        let mut directory = Vec::new();
        for (name, data) in lumps {
            let position = (HEADER_LEN + body.len()) as i32;
            body.extend_from_slice(data);
            directory.extend_from_slice(&position.to_le_bytes());
            directory.extend_from_slice(&(data.len() as i32).to_le_bytes());
            let mut raw_name = [0u8; LUMP_NAME_LEN];
            raw_name[..name.len()].copy_from_slice(name.as_bytes());
            directory.extend_from_slice(&raw_name);
        }

        let mut wad = Vec::new();
        wad.extend_from_slice(b"PWAD");
        wad.extend_from_slice(&(lumps.len() as i32).to_le_bytes());
        wad.extend_from_slice(&((HEADER_LEN + body.len()) as i32).to_le_bytes());
        wad.extend_from_slice(&body);
        wad.extend_from_slice(&directory);
        wad
    }

    #[test]
    fn test_parse_wad() {
        let wad = WadFile::parse(build_wad(&[("DSPISTOL", &[1, 2, 3][..]), ("DSOOF", &[4, 5][..])]))
            .unwrap();

        assert_eq!(wad.load("dspistol").as_deref(), Some(&[1u8, 2, 3][..]));
        assert_eq!(wad.load("DSOOF").as_deref(), Some(&[4u8, 5][..]));
        assert!(wad.load("DSRADIO").is_none());
        assert_eq!(wad.names(), vec!["DSOOF", "DSPISTOL"]);
    }

    #[test]
    fn test_later_lumps_shadow_earlier() {
        let wad =
            WadFile::parse(build_wad(&[("DSOOF", &[1][..]), ("DSOOF", &[2, 2][..])])).unwrap();
        assert_eq!(wad.load("dsoof").as_deref(), Some(&[2u8, 2][..]));
        assert_eq!(wad.entries, 2);
    }

    #[test]
    fn test_invalid_magic() {
        let mut image = build_wad(&[]);
        image[0] = b'X';
        assert!(matches!(
            WadFile::parse(image),
            Err(WadError::InvalidMagic(_))
        ));
    }

    #[test]
    fn test_truncated_directory() {
        let mut image = build_wad(&[("DSOOF", &[1, 2][..])]);
        image.truncate(image.len() - 4);
        assert!(matches!(WadFile::parse(image), Err(WadError::Truncated(_))));
        assert!(matches!(
            WadFile::parse(b"PW".to_vec()),
            Err(WadError::Truncated(_))
        ));
    }

    #[test]
    fn test_open_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.wad");
        fs::write(&path, build_wad(&[("DSITEMUP", &[7, 7, 7][..])])).unwrap();

        let wad = WadFile::open(&path).unwrap();
        assert_eq!(wad.load("dsitemup").as_deref(), Some(&[7u8, 7, 7][..]));
    }
}
