/// PlayerCore: single-owner event loop for all mutable player state.
///
/// Owns the `PlaylistState`, the media element and the playback snapshot;
/// no other task touches them.  Catalog fetches run as spawned tasks and
/// report back as `CoreEvent`s, as do media notifications.
///
/// After each event, PlayerCore broadcasts `BroadcastMessage::StateUpdated`;
/// the UI then reads a fresh snapshot from the `StateManager`.
use std::sync::Arc;

use dirplay_proto::catalog::{Album, CatalogClient, Song};
use dirplay_proto::config::Config;
use dirplay_proto::playback::{clamp_unit, PlayIndicator, PlaybackSnapshot};
use dirplay_proto::playlist::{LoadRequest, PlaylistState};
use dirplay_proto::protocol::{Command, MediaHealth};
use dirplay_proto::state::StateManager;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use crate::media::{MediaElement, MediaEvent};
use crate::BroadcastMessage;

const HEARTBEAT_SECS: u64 = 10;

// ── CoreEvent ─────────────────────────────────────────────────────────────────

/// All inputs into the PlayerCore loop.
#[derive(Debug)]
pub enum CoreEvent {
    /// A user intent from the TUI.
    Command(Command),
    /// Notification from the media element.
    Media(MediaEvent),
    /// Album listing with metadata finished.
    AlbumsLoaded(Vec<Album>),
    /// Song listing for `album` finished.  The latest one to arrive wins.
    SongsLoaded { album: String, songs: Vec<Song> },
    /// Check media process liveness.
    HeartbeatTick,
    Shutdown,
}

// ── PlayerCore ────────────────────────────────────────────────────────────────

pub struct PlayerCore<M: MediaElement> {
    catalog: CatalogClient,
    default_album: Option<String>,
    state_manager: Arc<StateManager>,
    media: M,
    playlist: PlaylistState,
    /// Mirrors the media element's last reported values.
    snapshot: PlaybackSnapshot,
    media_health: MediaHealth,
    /// Select the default album once the first listing arrives.
    boot_pending: bool,
    event_tx: mpsc::Sender<CoreEvent>,
    broadcast_tx: broadcast::Sender<BroadcastMessage>,
}

impl<M: MediaElement> PlayerCore<M> {
    pub fn new(
        config: &Config,
        catalog: CatalogClient,
        media: M,
        broadcast_tx: broadcast::Sender<BroadcastMessage>,
        event_tx: mpsc::Sender<CoreEvent>,
    ) -> Self {
        let volume = config.mpv.default_volume.clamp(0.0, 1.0);
        Self {
            catalog,
            default_album: config.server.default_album.clone(),
            state_manager: Arc::new(StateManager::new(volume)),
            media,
            playlist: PlaylistState::default(),
            snapshot: PlaybackSnapshot {
                volume,
                ..PlaybackSnapshot::default()
            },
            media_health: MediaHealth::Absent,
            boot_pending: true,
            event_tx,
            broadcast_tx,
        }
    }

    pub fn state_manager(&self) -> Arc<StateManager> {
        Arc::clone(&self.state_manager)
    }

    /// Run the event loop until `Shutdown` or until every sender is gone.
    pub async fn run(mut self, mut event_rx: mpsc::Receiver<CoreEvent>) -> anyhow::Result<()> {
        info!("PlayerCore: starting event loop");

        let heartbeat_tx = self.event_tx.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(tokio::time::Duration::from_secs(HEARTBEAT_SECS)).await;
                if heartbeat_tx.send(CoreEvent::HeartbeatTick).await.is_err() {
                    break;
                }
            }
        });

        if let Err(e) = self.media.set_volume(self.snapshot.volume).await {
            warn!("PlayerCore: initial volume not applied: {}", e);
        }
        self.refresh_albums().await;

        loop {
            match event_rx.recv().await {
                None => {
                    info!("PlayerCore: event channel closed, shutting down");
                    break;
                }
                Some(CoreEvent::Shutdown) => {
                    info!("PlayerCore: shutdown requested");
                    break;
                }
                Some(evt) => {
                    self.handle_event(evt).await;
                    let _ = self.broadcast_tx.send(BroadcastMessage::StateUpdated);
                }
            }
        }

        self.media.shutdown().await;
        Ok(())
    }

    pub async fn handle_event(&mut self, evt: CoreEvent) {
        match evt {
            CoreEvent::Command(cmd) => {
                debug!("PlayerCore: command {:?}", cmd);
                self.handle_command(cmd).await;
            }
            CoreEvent::Media(evt) => self.handle_media_event(evt).await,
            CoreEvent::AlbumsLoaded(albums) => self.on_albums_loaded(albums).await,
            CoreEvent::SongsLoaded { album, songs } => self.on_songs_loaded(album, songs).await,
            CoreEvent::HeartbeatTick => {
                self.media.check_alive().await;
                self.sync_health().await;
            }
            CoreEvent::Shutdown => {}
        }
    }

    fn log(&self, message: String) {
        info!("{}", message);
        let _ = self.broadcast_tx.send(BroadcastMessage::Log(message));
    }

    fn log_warn(&self, message: String) {
        warn!("{}", message);
        let _ = self.broadcast_tx.send(BroadcastMessage::Log(message));
    }

    // ── catalog ───────────────────────────────────────────────────────────────

    async fn refresh_albums(&mut self) {
        self.state_manager.set_albums_loading().await;
        let catalog = self.catalog.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let albums = catalog.load_albums().await;
            let _ = tx.send(CoreEvent::AlbumsLoaded(albums)).await;
        });
    }

    fn request_songs(&self, album: String) {
        self.log(format!("Loading songs from {}", self.catalog.album_url(&album)));
        let catalog = self.catalog.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let songs = catalog.list_songs(&album).await;
            let _ = tx.send(CoreEvent::SongsLoaded { album, songs }).await;
        });
    }

    async fn on_albums_loaded(&mut self, albums: Vec<Album>) {
        self.log(format!("{} album(s) found", albums.len()));
        let boot_choice = if self.boot_pending {
            self.boot_pending = false;
            pick_default_album(&albums, self.default_album.as_deref())
        } else {
            None
        };
        self.state_manager.set_albums(albums).await;
        if let Some(album) = boot_choice {
            self.request_songs(album);
        }
    }

    async fn on_songs_loaded(&mut self, album: String, songs: Vec<Song>) {
        self.log(format!("{} song(s) in {}", songs.len(), album));
        match self.playlist.select_album(album, songs) {
            Some(load) => self.load_track(load).await,
            None => {
                // Nothing to cue; stop the old album's track so the display
                // and the sink agree.
                if let Err(e) = self.media.pause().await {
                    debug!("PlayerCore: pause on empty album failed: {}", e);
                }
                self.snapshot.time_pos = None;
                self.snapshot.duration = None;
                self.state_manager.clear_track(self.playlist.clone()).await;
            }
        }
    }

    // ── commands ──────────────────────────────────────────────────────────────

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::SelectAlbum { album } => self.request_songs(album),
            Command::PlayIndex { index } => match self.playlist.load(index, true) {
                Some(load) => self.load_track(load).await,
                None => debug!("PlayerCore: index {} out of range, ignored", index),
            },
            Command::Next => {
                if let Some(load) = self.playlist.next() {
                    self.load_track(load).await;
                }
            }
            Command::Prev => {
                if let Some(load) = self.playlist.prev() {
                    self.load_track(load).await;
                }
            }
            Command::TogglePause => self.toggle_pause().await,
            Command::SeekFraction { fraction } => self.seek_fraction(fraction).await,
            Command::SeekRelative { fraction } => {
                let Some(duration) = self.snapshot.known_duration() else {
                    return;
                };
                let current = self.snapshot.time_pos.unwrap_or(0.0) / duration;
                self.seek_fraction(current + fraction).await;
            }
            Command::Volume { value } => self.set_volume(value).await,
            Command::ToggleMute => self.toggle_mute().await,
            Command::RefreshAlbums => self.refresh_albums().await,
        }
    }

    async fn load_track(&mut self, load: LoadRequest) {
        let url = self.catalog.playback_url(&load.album, &load.song);
        self.log(format!("Loading audio: {}", url));

        self.snapshot.time_pos = None;
        self.snapshot.duration = None;
        self.state_manager
            .set_track(self.playlist.clone(), &load.song.decoded, PlayIndicator::Paused)
            .await;

        let loaded = self.media.load(&url).await;
        self.sync_health().await;
        if let Err(e) = loaded {
            self.log_warn(format!("Failed to load {}: {:#}", url, e));
            return;
        }

        if load.autoplay {
            self.start_playback().await;
        }
    }

    /// Ask the media element to play; a rejection leaves the indicator paused.
    async fn start_playback(&mut self) {
        match self.media.play().await {
            Ok(()) => {
                self.snapshot.paused = false;
                self.state_manager.set_indicator(PlayIndicator::Playing).await;
            }
            Err(e) => {
                self.log_warn(format!("Play prevented: {:#}", e));
                self.state_manager.set_indicator(PlayIndicator::Paused).await;
            }
        }
    }

    async fn toggle_pause(&mut self) {
        if self.playlist.current_song().is_none() {
            return;
        }
        let paused = match self.media.is_paused().await {
            Ok(p) => p,
            Err(e) => {
                debug!("PlayerCore: pause query failed ({}), using last known", e);
                self.snapshot.paused
            }
        };
        if paused {
            self.start_playback().await;
        } else {
            if let Err(e) = self.media.pause().await {
                self.log_warn(format!("Pause failed: {:#}", e));
            }
            self.snapshot.paused = true;
            self.state_manager.set_indicator(PlayIndicator::Paused).await;
        }
    }

    async fn seek_fraction(&mut self, fraction: f64) {
        let Some(duration) = self.snapshot.known_duration() else {
            debug!("PlayerCore: seek ignored, duration unknown");
            return;
        };
        let target = clamp_unit(fraction) * duration;
        if let Err(e) = self.media.seek_to(target).await {
            self.log_warn(format!("Seek to {:.1}s failed: {:#}", target, e));
        }
    }

    async fn set_volume(&mut self, value: f32) {
        let volume = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        if let Err(e) = self.media.set_volume(volume).await {
            self.log_warn(format!("Volume change failed: {:#}", e));
            return;
        }
        self.snapshot.volume = volume;
        self.state_manager.set_volume(volume).await;
    }

    async fn toggle_mute(&mut self) {
        let muted = !self.snapshot.muted;
        if let Err(e) = self.media.set_muted(muted).await {
            self.log_warn(format!("Mute toggle failed: {:#}", e));
            return;
        }
        self.snapshot.muted = muted;
        self.state_manager.set_muted(muted).await;
    }

    // ── media events ──────────────────────────────────────────────────────────

    async fn handle_media_event(&mut self, evt: MediaEvent) {
        match evt {
            MediaEvent::TimeUpdate(pos) => {
                self.snapshot.time_pos = pos;
                self.state_manager.set_time_pos(pos).await;
            }
            MediaEvent::DurationChange(duration) => {
                if duration != self.snapshot.duration {
                    self.snapshot.duration = duration;
                    self.state_manager.set_duration(duration).await;
                }
            }
            MediaEvent::Paused(paused) => {
                self.snapshot.paused = paused;
                self.state_manager.set_paused(paused).await;
                if self.playlist.current_song().is_some() {
                    let indicator = if paused {
                        PlayIndicator::Paused
                    } else {
                        PlayIndicator::Playing
                    };
                    self.state_manager.set_indicator(indicator).await;
                }
            }
            MediaEvent::VolumeChange(volume) => {
                self.snapshot.volume = volume;
                self.state_manager.set_volume(volume).await;
            }
            MediaEvent::MuteChange(muted) => {
                self.snapshot.muted = muted;
                self.state_manager.set_muted(muted).await;
            }
            MediaEvent::Ended => {
                info!("PlayerCore: track ended, advancing");
                if let Some(load) = self.playlist.next() {
                    self.load_track(load).await;
                }
            }
            MediaEvent::Error(detail) => {
                self.log_warn(format!("Audio error: {}", detail));
            }
        }
    }

    async fn sync_health(&mut self) {
        let health = self.media.health();
        if health != self.media_health {
            info!(
                "PlayerCore: media health {:?} → {:?}",
                self.media_health, health
            );
            if health == MediaHealth::Dead {
                error!("PlayerCore: media element is not running");
            }
            self.media_health = health.clone();
            self.state_manager.set_media_health(health).await;
        }
    }
}

/// The configured default when the catalog lists it, otherwise the first album.
pub fn pick_default_album(albums: &[Album], preferred: Option<&str>) -> Option<String> {
    if let Some(preferred) = preferred {
        if albums.iter().any(|a| a.key == preferred) {
            return Some(preferred.to_string());
        }
    }
    albums.first().map(|a| a.key.clone())
}
