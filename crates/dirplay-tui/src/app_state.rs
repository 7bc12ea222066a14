//! AppState: shared read-only data passed to all components during render/event.
//!
//! Components read this for player state, but never mutate it.
//! The App event-loop is the only thing that writes to AppState.

use std::collections::VecDeque;

use dirplay_proto::protocol::PlayerState;

const LOG_CAP: usize = 500;

pub struct AppState {
    /// Latest snapshot from the StateManager.
    pub player: PlayerState,
    /// In-app log lines, oldest first.
    pub logs: VecDeque<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            player: PlayerState::default(),
            logs: VecDeque::with_capacity(LOG_CAP),
        }
    }

    pub fn push_log(&mut self, line: String) {
        if self.logs.len() >= LOG_CAP {
            self.logs.pop_front();
        }
        self.logs.push_back(line);
    }

    /// Index of the playing song when the song list shows the current album.
    pub fn current_index(&self) -> Option<usize> {
        let playlist = &self.player.playlist;
        playlist.current_index.filter(|&i| i < playlist.songs.len())
    }
}
