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

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{crate_version, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sfxdriver::config::{self, Resources};
use sfxdriver::sound::header::RawSoundHeader;
use sfxdriver::sound::{sfx, SoundDriver, SoundError};
use sfxdriver::verbosity::Verbosity;
use sfxdriver::{audio, wad};

/// How often the play command polls for finished sounds.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Sounds still playing after this long are stopped.
const MAX_PLAY_TIME: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A sound effect driver."
)]
struct Cli {
    /// Verbosity level: quiet, error, alert, print, debug or trace.
    #[arg(short, long, global = true)]
    verbose: Option<Verbosity>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lists the available audio output devices.
    Devices {},
    /// Lists the sound effects found in a WAD file or lump directory.
    Sounds {
        /// The path to the WAD file or lump directory.
        path: PathBuf,
    },
    /// Plays sound effects through the configured device.
    Play {
        /// The path to the driver config.
        config_path: PathBuf,
        /// The effects to play, by name ("pistol") or lump name ("DSPISTOL").
        #[arg(required = true)]
        effects: Vec<String>,
    },
}

fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Devices {} => {
            init_logging(cli.verbose.unwrap_or_default());
            let devices = audio::list_devices()?;

            if devices.is_empty() {
                println!("No devices found.");
                return Ok(());
            }

            println!("Devices:");
            for device in devices {
                println!("- {}", device);
            }
        }
        Commands::Sounds { path } => {
            init_logging(cli.verbose.unwrap_or_default());
            list_sounds(&path)?;
        }
        Commands::Play {
            config_path,
            effects,
        } => {
            let driver_config = config::Driver::deserialize(&config_path)?;
            init_logging(
                cli.verbose
                    .unwrap_or_else(|| Verbosity::from_name(driver_config.verbosity())),
            );
            play(&driver_config, &effects)?;
        }
    }

    Ok(())
}

fn list_sounds(path: &Path) -> Result<(), Box<dyn Error>> {
    let resources = if path.is_dir() {
        Resources::lump_dir(path)
    } else {
        Resources::wad(path)
    };
    let store = wad::open_store(&resources)?;

    let mut found = 0;
    println!("Sounds:");
    for id in 1..sfx::NUM_SFX {
        let Some(lump) = sfx::lump_name(id) else {
            continue;
        };
        let Some(data) = store.load(&lump) else {
            continue;
        };
        found += 1;

        match RawSoundHeader::parse(&data) {
            Ok(header) if header.is_supported() => println!(
                "- {} ({}): {}Hz, {} samples",
                sfx::name(id).unwrap_or_default(),
                lump.to_ascii_uppercase(),
                header.sample_rate,
                header.samples(&data).len(),
            ),
            Ok(header) => println!(
                "- {} ({}): unsupported format {:#06x}",
                sfx::name(id).unwrap_or_default(),
                lump.to_ascii_uppercase(),
                header.format,
            ),
            Err(e) => println!(
                "- {} ({}): {}",
                sfx::name(id).unwrap_or_default(),
                lump.to_ascii_uppercase(),
                e
            ),
        }
    }

    if found == 0 {
        println!("No sounds found in {}.", path.display());
    }
    Ok(())
}

fn play(driver_config: &config::Driver, effects: &[String]) -> Result<(), Box<dyn Error>> {
    let ids = effects
        .iter()
        .map(|name| sfx::find(name).ok_or_else(|| SoundError::ResourceMissing(name.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    let store: Arc<dyn wad::ResourceStore> = wad::open_store(driver_config.resources())?;
    let audio_config = driver_config.audio();
    let mut driver = SoundDriver::new(audio_config.clone(), store);

    // Mock sessions only mix when asked to, so they are rendered in step with polling.
    let mock = audio::is_mock_device(audio_config.device()).then(|| {
        Arc::new(audio::mock::Session::new(
            audio_config.device(),
            audio::DeviceFormat::from_config(audio_config),
        ))
    });
    match &mock {
        Some(session) => driver.init_with_session(session.clone())?,
        None => driver.init_sound()?,
    }
    let frames_per_poll =
        (u128::from(audio_config.sample_rate()) * POLL_INTERVAL.as_millis() / 1000) as usize;

    let instances: Vec<_> = ids
        .into_iter()
        .map(|id| driver.start_sound(id, 127, 128, 128, 0))
        .collect();
    info!(count = instances.len(), "Started sounds");

    let start = Instant::now();
    while instances.iter().any(|i| driver.sound_is_playing(*i)) {
        if start.elapsed() > MAX_PLAY_TIME {
            info!("Stopping sounds that are still playing");
            instances.iter().for_each(|i| driver.stop_sound(*i));
            break;
        }
        driver.update_sound();
        driver.submit_sound();
        match &mock {
            Some(session) => {
                session.render(frames_per_poll);
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    }

    driver.shutdown_sound();
    Ok(())
}
