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
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::error::ConfigError;

/// Where sound effect lumps are loaded from.
#[derive(Deserialize, Clone, Debug)]
pub struct Resources {
    /// A WAD file.
    wad: Option<PathBuf>,
    /// A directory of `<LUMPNAME>.lmp` files.
    lump_dir: Option<PathBuf>,
}

/// The resolved resource location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceLocation<'a> {
    Wad(&'a Path),
    LumpDir(&'a Path),
}

impl Resources {
    /// Creates a resources section pointing at a WAD file.
    pub fn wad(path: &Path) -> Resources {
        Resources {
            wad: Some(path.to_path_buf()),
            lump_dir: None,
        }
    }

    /// Creates a resources section pointing at a lump directory.
    pub fn lump_dir(path: &Path) -> Resources {
        Resources {
            wad: None,
            lump_dir: Some(path.to_path_buf()),
        }
    }

    /// Returns the configured location. Exactly one of `wad` and `lump_dir` must be set.
    pub fn location(&self) -> Result<ResourceLocation<'_>, ConfigError> {
        match (&self.wad, &self.lump_dir) {
            (Some(wad), None) => Ok(ResourceLocation::Wad(wad)),
            (None, Some(dir)) => Ok(ResourceLocation::LumpDir(dir)),
            (None, None) => Err(ConfigError::Resources(
                "one of wad or lump_dir is required".to_string(),
            )),
            (Some(_), Some(_)) => Err(ConfigError::Resources(
                "wad and lump_dir are mutually exclusive".to_string(),
            )),
        }
    }

    /// Resolves relative paths against the directory holding the config file.
    pub(super) fn rebase(&mut self, base: &Path) {
        for path in [&mut self.wad, &mut self.lump_dir].into_iter().flatten() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}
