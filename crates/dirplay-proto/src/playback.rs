//! Playback values shared by the controller and the renderer.

use serde::{Deserialize, Serialize};

/// Last values reported by the media element. Display only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub paused: bool,
    pub time_pos: Option<f64>,
    pub duration: Option<f64>,
    /// 0.0..=1.0
    pub volume: f32,
    pub muted: bool,
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self {
            paused: true,
            time_pos: None,
            duration: None,
            volume: 1.0,
            muted: false,
        }
    }
}

impl PlaybackSnapshot {
    /// Duration if the media element knows a usable one.
    pub fn known_duration(&self) -> Option<f64> {
        self.duration.filter(|d| d.is_finite() && *d > 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayIndicator {
    Playing,
    #[default]
    Paused,
}

impl PlayIndicator {
    pub fn symbol(self) -> &'static str {
        match self {
            PlayIndicator::Playing => "▶",
            PlayIndicator::Paused => "⏸",
        }
    }
}

/// What the now-playing bar shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NowPlaying {
    pub title: String,
    pub time_label: String,
    pub seek_percent: f64,
    pub indicator: PlayIndicator,
}

impl Default for NowPlaying {
    fn default() -> Self {
        Self {
            title: String::new(),
            time_label: time_label(None, None),
            seek_percent: 0.0,
            indicator: PlayIndicator::Paused,
        }
    }
}

impl NowPlaying {
    /// Fresh display for a newly loaded track.
    pub fn for_track(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    /// Refresh the label and (when the duration is known) the seek position.
    pub fn update_time(&mut self, time_pos: Option<f64>, duration: Option<f64>) {
        self.time_label = time_label(time_pos, duration);
        if let Some(pct) = progress_percent(time_pos, duration) {
            self.seek_percent = pct;
        }
    }
}

/// `mm:ss`, floored and zero-padded. Unknown, NaN and non-positive values
/// read `00:00`. Minutes keep counting past 99.
pub fn format_clock(secs: Option<f64>) -> String {
    let total = match secs {
        Some(s) if s.is_finite() && s > 0.0 => s.floor() as u64,
        _ => 0,
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// `"mm:ss / mm:ss"`.
pub fn time_label(time_pos: Option<f64>, duration: Option<f64>) -> String {
    format!("{} / {}", format_clock(time_pos), format_clock(duration))
}

pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Map a pointer column on a track starting at `left` and `width` cells wide
/// to a fraction in 0.0..=1.0.
pub fn seek_fraction_from_pointer(x: u16, left: u16, width: u16) -> f64 {
    if width == 0 {
        return 0.0;
    }
    clamp_unit((f64::from(x) - f64::from(left)) / f64::from(width))
}

/// Position as a 0..=100 percentage, or `None` while the duration is unknown.
pub fn progress_percent(time_pos: Option<f64>, duration: Option<f64>) -> Option<f64> {
    let dur = duration.filter(|d| d.is_finite() && *d > 0.0)?;
    let cur = time_pos.filter(|c| c.is_finite()).unwrap_or(0.0);
    Some((cur / dur * 100.0).clamp(0.0, 100.0))
}
