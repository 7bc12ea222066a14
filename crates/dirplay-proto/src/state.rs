use crate::catalog::Album;
use crate::playback::{NowPlaying, PlayIndicator, PlaybackSnapshot};
use crate::playlist::PlaylistState;
use crate::protocol::{MediaHealth, PlayerState};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared, read-mostly view of the player. Only the core writes; every write
/// bumps `rev`.
pub struct StateManager {
    state: Arc<RwLock<PlayerState>>,
}

impl StateManager {
    pub fn new(initial_volume: f32) -> Self {
        let state = PlayerState {
            rev: 1,
            playback: PlaybackSnapshot {
                volume: initial_volume.clamp(0.0, 1.0),
                ..PlaybackSnapshot::default()
            },
            ..PlayerState::default()
        };

        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub fn arc(&self) -> Arc<RwLock<PlayerState>> {
        Arc::clone(&self.state)
    }

    pub async fn get_state(&self) -> PlayerState {
        self.state.read().await.clone()
    }

    pub async fn set_albums_loading(&self) {
        let mut state = self.state.write().await;
        state.albums_loading = true;
        state.rev += 1;
    }

    /// A new listing fully replaces the previous one.
    pub async fn set_albums(&self, albums: Vec<Album>) {
        let mut state = self.state.write().await;
        state.albums = albums;
        state.albums_loading = false;
        state.rev += 1;
    }

    pub async fn set_playlist(&self, playlist: PlaylistState) {
        let mut state = self.state.write().await;
        state.playlist = playlist;
        state.rev += 1;
    }

    /// Reset the display for a freshly loaded track.
    pub async fn set_track(&self, playlist: PlaylistState, title: &str, indicator: PlayIndicator) {
        let mut state = self.state.write().await;
        state.playlist = playlist;
        state.now_playing = NowPlaying {
            indicator,
            ..NowPlaying::for_track(title)
        };
        state.playback.time_pos = None;
        state.playback.duration = None;
        state.rev += 1;
    }

    /// Album switched to one without songs.
    pub async fn clear_track(&self, playlist: PlaylistState) {
        let mut state = self.state.write().await;
        state.playlist = playlist;
        state.now_playing = NowPlaying::default();
        state.playback.time_pos = None;
        state.playback.duration = None;
        state.rev += 1;
    }

    pub async fn set_indicator(&self, indicator: PlayIndicator) {
        let mut state = self.state.write().await;
        state.now_playing.indicator = indicator;
        state.rev += 1;
    }

    pub async fn set_paused(&self, paused: bool) {
        let mut state = self.state.write().await;
        state.playback.paused = paused;
        state.rev += 1;
    }

    pub async fn set_time_pos(&self, time_pos: Option<f64>) {
        let mut state = self.state.write().await;
        state.playback.time_pos = time_pos;
        let duration = state.playback.duration;
        state.now_playing.update_time(time_pos, duration);
        state.rev += 1;
    }

    pub async fn set_duration(&self, duration: Option<f64>) {
        let mut state = self.state.write().await;
        state.playback.duration = duration;
        let time_pos = state.playback.time_pos;
        state.now_playing.update_time(time_pos, duration);
        state.rev += 1;
    }

    pub async fn set_volume(&self, volume: f32) {
        let mut state = self.state.write().await;
        state.playback.volume = volume.clamp(0.0, 1.0);
        state.rev += 1;
    }

    pub async fn set_muted(&self, muted: bool) {
        let mut state = self.state.write().await;
        state.playback.muted = muted;
        state.rev += 1;
    }

    pub async fn set_media_health(&self, health: MediaHealth) {
        let mut state = self.state.write().await;
        state.media_health = health;
        state.rev += 1;
    }
}
