use serde::{Deserialize, Serialize};

use crate::catalog::Song;

/// The selected album, its songs, and which one is loaded.
///
/// `current_index` is `None` whenever `songs` is empty, and otherwise always
/// in bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistState {
    pub current_album: Option<String>,
    pub songs: Vec<Song>,
    pub current_index: Option<usize>,
}

/// A track the controller should hand to the media element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub album: String,
    pub index: usize,
    pub song: Song,
    pub autoplay: bool,
}

impl PlaylistState {
    /// Replace the playlist with `album`'s songs and cue the first one.
    ///
    /// Returns the initial load (without autoplay), or `None` for an empty album.
    pub fn select_album(&mut self, album: String, songs: Vec<Song>) -> Option<LoadRequest> {
        self.current_album = Some(album);
        self.songs = songs;
        self.current_index = None;
        if self.songs.is_empty() {
            return None;
        }
        self.load(0, false)
    }

    /// Point at `index`. Out-of-range indices leave the state untouched.
    pub fn load(&mut self, index: usize, autoplay: bool) -> Option<LoadRequest> {
        let song = self.songs.get(index)?.clone();
        let album = self.current_album.clone()?;
        self.current_index = Some(index);
        Some(LoadRequest {
            album,
            index,
            song,
            autoplay,
        })
    }

    pub fn next(&mut self) -> Option<LoadRequest> {
        let len = self.songs.len();
        if len == 0 {
            return None;
        }
        let next = match self.current_index {
            Some(i) => (i + 1) % len,
            None => 0,
        };
        self.load(next, true)
    }

    pub fn prev(&mut self) -> Option<LoadRequest> {
        let len = self.songs.len();
        if len == 0 {
            return None;
        }
        let prev = match self.current_index {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.load(prev, true)
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.current_index.and_then(|i| self.songs.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn songs(names: &[&str]) -> Vec<Song> {
        names
            .iter()
            .map(|n| Song::from_file_name(&format!("{n}.mp3"), ".mp3"))
            .collect()
    }

    fn three() -> PlaylistState {
        let mut p = PlaylistState::default();
        p.select_album("ncs".into(), songs(&["a", "b", "c"]));
        p
    }

    #[test]
    fn test_select_album_cues_first_without_autoplay() {
        let mut p = PlaylistState::default();
        let load = p.select_album("ncs".into(), songs(&["a", "b"])).unwrap();
        assert_eq!(load.index, 0);
        assert!(!load.autoplay);
        assert_eq!(load.album, "ncs");
        assert_eq!(load.song.decoded, "a");
        assert_eq!(p.current_index, Some(0));
    }

    #[test]
    fn test_select_empty_album_clears_index() {
        let mut p = three();
        assert!(p.select_album("empty".into(), Vec::new()).is_none());
        assert_eq!(p.current_album.as_deref(), Some("empty"));
        assert_eq!(p.current_index, None);
        assert!(p.current_song().is_none());
    }

    #[test]
    fn test_next_and_prev_wrap() {
        let mut p = three();
        p.load(2, false);
        let load = p.next().unwrap();
        assert_eq!(load.index, 0);
        assert!(load.autoplay);

        let load = p.prev().unwrap();
        assert_eq!(load.index, 2);
        assert_eq!(p.current_song().map(|s| s.decoded.as_str()), Some("c"));
    }

    #[test]
    fn test_load_out_of_range_is_noop() {
        let mut p = three();
        p.load(1, false);
        assert!(p.load(3, true).is_none());
        assert!(p.load(usize::MAX, true).is_none());
        assert_eq!(p.current_index, Some(1));
    }

    #[test]
    fn test_next_prev_on_empty_is_noop() {
        let mut p = PlaylistState::default();
        assert!(p.next().is_none());
        assert!(p.prev().is_none());
        assert_eq!(p, PlaylistState::default());
    }
}
