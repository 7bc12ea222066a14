//! The single audio sink the player drives.

use async_trait::async_trait;
use dirplay_proto::protocol::MediaHealth;

/// Unsolicited notifications from the media element.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    Paused(bool),
    TimeUpdate(Option<f64>),
    DurationChange(Option<f64>),
    /// 0.0..=1.0
    VolumeChange(f32),
    MuteChange(bool),
    /// The current source played to its end.
    Ended,
    /// Decode or network failure on the current source.
    Error(String),
}

/// One playback element: a source, a paused flag, a position, volume and mute.
///
/// `load` replaces the source and leaves the element paused; `play` may be
/// rejected, in which case it stays paused.
#[async_trait]
pub trait MediaElement: Send {
    async fn load(&mut self, url: &str) -> anyhow::Result<()>;
    async fn play(&mut self) -> anyhow::Result<()>;
    async fn pause(&mut self) -> anyhow::Result<()>;
    async fn is_paused(&mut self) -> anyhow::Result<bool>;
    async fn seek_to(&mut self, secs: f64) -> anyhow::Result<()>;
    /// `volume` in 0.0..=1.0.
    async fn set_volume(&mut self, volume: f32) -> anyhow::Result<()>;
    async fn set_muted(&mut self, muted: bool) -> anyhow::Result<()>;

    fn health(&self) -> MediaHealth {
        MediaHealth::Running
    }

    /// Liveness check, called on the heartbeat.
    async fn check_alive(&mut self) {}

    async fn shutdown(&mut self) {}
}
