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

//! Music interface. Songs are registered and handed ids but never played.

use tracing::trace;

/// An opaque registered song handle. Zero never names a song.
pub type MusicId = u64;

/// Tracks registered songs and the music volume.
#[derive(Debug, Default)]
pub struct MusicPlayer {
    next_song: MusicId,
    volume: i32,
}

impl MusicPlayer {
    /// Creates a player with no songs registered.
    pub fn new() -> MusicPlayer {
        MusicPlayer::default()
    }

    /// Registers song data and returns its id.
    pub fn register_song(&mut self, data: &[u8]) -> MusicId {
        self.next_song += 1;
        trace!(song = self.next_song, bytes = data.len(), "Registered song");
        self.next_song
    }

    pub fn unregister_song(&mut self, song: MusicId) {
        trace!(song, "Unregistered song");
    }

    pub fn play_song(&mut self, song: MusicId, looping: bool) {
        trace!(song, looping, "Play song");
    }

    pub fn pause_song(&mut self, song: MusicId) {
        trace!(song, "Pause song");
    }

    pub fn resume_song(&mut self, song: MusicId) {
        trace!(song, "Resume song");
    }

    pub fn stop_song(&mut self, song: MusicId) {
        trace!(song, "Stop song");
    }

    /// Records the music volume.
    pub fn set_music_volume(&mut self, volume: i32) {
        trace!(volume, "Set music volume");
        self.volume = volume;
    }

    /// Returns the last volume set.
    pub fn volume(&self) -> i32 {
        self.volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_song_ids() {
        let mut music = MusicPlayer::new();
        let first = music.register_song(b"MUS\x1a");
        let second = music.register_song(&[]);
        assert_eq!(first, 1);
        assert_eq!(second, 2);

        music.play_song(first, true);
        music.pause_song(first);
        music.resume_song(first);
        music.stop_song(first);
        music.unregister_song(first);
        assert_eq!(music.register_song(&[]), 3);
    }

    #[test]
    fn test_music_volume() {
        let mut music = MusicPlayer::new();
        assert_eq!(music.volume(), 0);
        music.set_music_volume(8);
        assert_eq!(music.volume(), 8);
    }
}
