use serde::{Deserialize, Serialize};

use crate::catalog::Album;
use crate::playback::{NowPlaying, PlaybackSnapshot};
use crate::playlist::PlaylistState;

/// Intents sent from the UI to the player core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd")]
pub enum Command {
    /// Fetch `album`'s songs and cue the first one.
    SelectAlbum { album: String },
    PlayIndex { index: usize },
    Next,
    Prev,
    TogglePause,
    /// Absolute position as a fraction of the duration.
    SeekFraction { fraction: f64 },
    /// Signed offset as a fraction of the duration (e.g. `-0.05`).
    SeekRelative { fraction: f64 },
    Volume { value: f32 },
    ToggleMute,
    RefreshAlbums,
}

/// Health of the mpv process as observed by the core.
///
/// Transitions:
///   Absent -> Starting -> Running -> Dead -> Starting ...
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum MediaHealth {
    /// mpv process does not exist yet (before first use).
    #[default]
    Absent,
    /// Process is spawning / socket not yet available.
    Starting,
    Running,
    /// Process exited or socket closed.
    Dead,
}

impl MediaHealth {
    /// Short label for the status badge, `None` when nothing is worth showing.
    pub fn badge_label(&self) -> Option<&'static str> {
        match self {
            MediaHealth::Absent | MediaHealth::Running => None,
            MediaHealth::Starting => Some("INIT"),
            MediaHealth::Dead => Some("DEAD"),
        }
    }
}

/// Everything the UI renders. `rev` increases on every change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerState {
    #[serde(default)]
    pub rev: u64,
    pub albums: Vec<Album>,
    pub albums_loading: bool,
    pub playlist: PlaylistState,
    pub playback: PlaybackSnapshot,
    pub now_playing: NowPlaying,
    #[serde(default)]
    pub media_health: MediaHealth,
}

impl PlayerState {
    pub fn album(&self, key: &str) -> Option<&Album> {
        self.albums.iter().find(|a| a.key == key)
    }

    pub fn current_album(&self) -> Option<&Album> {
        self.playlist
            .current_album
            .as_deref()
            .and_then(|key| self.album(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_wire_shape() {
        let json = serde_json::to_string(&Command::SelectAlbum {
            album: "ncs".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"cmd":"SelectAlbum","album":"ncs"}"#);

        let cmd: Command = serde_json::from_str(r#"{"cmd":"Next"}"#).unwrap();
        assert_eq!(cmd, Command::Next);
    }

    #[test]
    fn test_current_album_lookup() {
        let mut state = PlayerState::default();
        state.albums.push(Album {
            key: "ncs".into(),
            title: "No Copyright Sounds".into(),
            description: String::new(),
            cover_url: String::new(),
        });
        assert!(state.current_album().is_none());
        state.playlist.current_album = Some("ncs".into());
        assert_eq!(
            state.current_album().map(|a| a.title.as_str()),
            Some("No Copyright Sounds")
        );
        assert_eq!(state.media_health.badge_label(), None);
    }
}
