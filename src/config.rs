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
use std::path::Path;

use config::{Config, File};
use serde::Deserialize;

mod audio;
mod error;
mod resources;

pub use self::audio::Audio;
pub use self::error::ConfigError;
pub use self::resources::{ResourceLocation, Resources};

/// The configuration for the sound driver.
#[derive(Deserialize, Clone, Debug)]
pub struct Driver {
    /// The audio device configuration.
    audio: Audio,
    /// Where effect lumps come from.
    resources: Resources,
    /// Verbosity level name (quiet, error, alert, print, debug, trace).
    verbosity: Option<String>,
}

impl Driver {
    /// Creates a new driver configuration.
    pub fn new(audio: Audio, resources: Resources) -> Driver {
        Driver {
            audio,
            resources,
            verbosity: None,
        }
    }

    /// Parse a driver configuration from a YAML file. Relative resource paths
    /// are resolved against the file's directory.
    pub fn deserialize(path: &Path) -> Result<Driver, ConfigError> {
        let mut driver = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<Driver>()?;

        if let Some(base) = path.parent() {
            driver.resources.rebase(base);
        }
        driver.resources.location()?;
        Ok(driver)
    }

    /// Returns the audio configuration.
    pub fn audio(&self) -> &Audio {
        &self.audio
    }

    /// Returns the resources configuration.
    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    /// Returns the configured verbosity level name, if any.
    pub fn verbosity(&self) -> Option<&str> {
        self.verbosity.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_driver_deserialize() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sfxdriver.yaml");
        fs::write(
            &path,
            r#"
audio:
  device: mock-device
  sample_rate: 22050
resources:
  wad: doom1.wad
verbosity: debug
"#,
        )
        .unwrap();

        let driver = Driver::deserialize(&path).unwrap();
        assert_eq!(driver.audio().device(), "mock-device");
        assert_eq!(driver.audio().sample_rate(), 22050);
        assert_eq!(driver.verbosity(), Some("debug"));
        assert_eq!(
            driver.resources().location().unwrap(),
            ResourceLocation::Wad(&dir.path().join("doom1.wad"))
        );
    }

    #[test]
    fn test_driver_rejects_ambiguous_resources() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sfxdriver.yaml");
        fs::write(
            &path,
            r#"
audio:
  device: mock-device
resources:
  wad: doom1.wad
  lump_dir: lumps
"#,
        )
        .unwrap();

        assert!(matches!(
            Driver::deserialize(&path),
            Err(ConfigError::Resources(_))
        ));
    }

    #[test]
    fn test_driver_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Driver::deserialize(&dir.path().join("missing.yaml")),
            Err(ConfigError::Load(_))
        ));
    }
}
