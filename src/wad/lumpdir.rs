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
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use super::{lump_key, ResourceStore, WadError};

/// A directory of extracted lumps, one `<NAME>.lmp` file per lump.
#[derive(Debug)]
pub struct LumpDir {
    lumps: HashMap<String, PathBuf>,
}

impl LumpDir {
    /// Indexes the `.lmp` files in the given directory.
    pub fn open(path: &Path) -> Result<LumpDir, WadError> {
        let mut lumps = HashMap::new();
        for entry in fs::read_dir(path)? {
            let path = entry?.path();
            let is_lump = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("lmp"));
            if !is_lump || !path.is_file() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                lumps.insert(lump_key(stem), path.clone());
            }
        }

        info!(path = ?path, lumps = lumps.len(), "Indexed lump directory");
        Ok(LumpDir { lumps })
    }
}

impl ResourceStore for LumpDir {
    fn load(&self, name: &str) -> Option<Arc<[u8]>> {
        let path = self.lumps.get(&lump_key(name))?;
        match fs::read(path) {
            Ok(data) => Some(Arc::from(data)),
            Err(e) => {
                debug!(path = ?path, error = %e, "Failed to read lump");
                None
            }
        }
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lumps.keys().cloned().collect();
        names.sort();
        names
    }
}
