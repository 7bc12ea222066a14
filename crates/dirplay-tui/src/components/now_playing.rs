//! NowPlaying component: title, play indicator, time label, seek track and
//! volume gauge. Clicks on the track seek; clicks on the gauge set volume.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use dirplay_proto::playback::{seek_fraction_from_pointer, PlayIndicator};
use dirplay_proto::protocol::MediaHealth;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{
        style_muted, C_BADGE_ERR, C_BADGE_PENDING, C_PAUSED, C_PLAYING, C_PRIMARY, C_SECONDARY,
        C_VOLUME,
    },
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        progress_bar::draw_bar,
    },
};

/// Keyboard seek step, as a fraction of the duration.
pub const SEEK_STEP: f64 = 0.05;
pub const VOLUME_STEP: f32 = 0.05;
const GAUGE_WIDTH: u16 = 10;

pub struct NowPlaying {
    /// Seek row of the last draw (time label plus track).
    seek_row: Rect,
    /// Track cells only; clicks map onto this.
    track_area: Rect,
    gauge_area: Rect,
}

impl NowPlaying {
    pub fn new() -> Self {
        Self {
            seek_row: Rect::default(),
            track_area: Rect::default(),
            gauge_area: Rect::default(),
        }
    }

    fn volume_step(state: &AppState, delta: f32) -> Vec<Action> {
        let volume = (state.player.playback.volume + delta).clamp(0.0, 1.0);
        vec![Action::Volume(volume)]
    }

    /// Action for a pointer press or drag at (`column`, `row`).
    fn pointer_action(&self, column: u16, row: u16) -> Option<Action> {
        if contains(self.gauge_area, column, row) {
            // Leftmost cell is silence, rightmost is full volume.
            let steps = self.gauge_area.width.saturating_sub(1);
            let fraction = if steps == 0 {
                1.0
            } else {
                seek_fraction_from_pointer(column, self.gauge_area.x, steps)
            };
            return Some(Action::Volume(fraction as f32));
        }
        if contains(self.seek_row, column, row) && self.track_area.width > 0 {
            // Anywhere on the seek row counts; left of the track clamps to 0.
            let fraction =
                seek_fraction_from_pointer(column, self.track_area.x, self.track_area.width);
            return Some(Action::SeekTo(fraction));
        }
        None
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

/// Cut `text` to `max` terminal cells, marking the cut with `…`.
fn fit_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    if max > 0 {
        out.push('…');
    }
    out
}

fn health_badge(health: &MediaHealth) -> Option<Badge<'static>> {
    let text = health.badge_label()?;
    let color = if *health == MediaHealth::Dead {
        C_BADGE_ERR
    } else {
        C_BADGE_PENDING
    };
    Some(Badge { text, color })
}

impl Component for NowPlaying {
    fn id(&self) -> ComponentId {
        ComponentId::NowPlaying
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let coarse = key.modifiers.contains(KeyModifiers::SHIFT);
        let seek = if coarse { SEEK_STEP * 4.0 } else { SEEK_STEP };
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => vec![Action::SeekRelative(-seek)],
            KeyCode::Right | KeyCode::Char('l') => vec![Action::SeekRelative(seek)],
            KeyCode::Up | KeyCode::Char('k') => Self::volume_step(state, VOLUME_STEP),
            KeyCode::Down | KeyCode::Char('j') => Self::volume_step(state, -VOLUME_STEP),
            KeyCode::Enter => vec![Action::TogglePause],
            KeyCode::Home => vec![Action::SeekTo(0.0)],
            _ => vec![],
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => {
                self.pointer_action(event.column, event.row)
                    .into_iter()
                    .collect()
            }
            MouseEventKind::ScrollUp => Self::volume_step(state, VOLUME_STEP),
            MouseEventKind::ScrollDown => Self::volume_step(state, -VOLUME_STEP),
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let player = &state.player;
        let mut badges = Vec::new();
        if player.playback.muted {
            badges.push(Badge {
                text: "MUTE",
                color: C_BADGE_PENDING,
            });
        }
        badges.extend(health_badge(&player.media_health));

        let block = pane_chrome("now playing", Some('3'), focused, badges);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height < 2 || inner.width < 8 {
            self.seek_row = Rect::default();
            self.track_area = Rect::default();
            self.gauge_area = Rect::default();
            return;
        }

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(inner);

        // ── Row 1: indicator + title | volume gauge ──────────────────────────
        let volume_pct = format!(" {:>3}%", (player.playback.volume * 100.0).round() as u32);
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(5),
                Constraint::Length(GAUGE_WIDTH),
                Constraint::Length(volume_pct.len() as u16),
            ])
            .split(rows[0]);

        let now = &player.now_playing;
        let (indicator_color, title_line) = if now.title.is_empty() {
            (C_SECONDARY, Span::styled("nothing loaded", style_muted()))
        } else {
            let color = match now.indicator {
                PlayIndicator::Playing => C_PLAYING,
                PlayIndicator::Paused => C_PAUSED,
            };
            // Two cells go to the indicator.
            let room = (top[0].width as usize).saturating_sub(2);
            (
                color,
                Span::styled(
                    fit_width(&now.title, room),
                    Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
                ),
            )
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(
                    format!("{} ", now.indicator.symbol()),
                    Style::default().fg(indicator_color),
                ),
                title_line,
            ])),
            top[0],
        );
        frame.render_widget(
            Paragraph::new(Span::styled(" vol ", style_muted())),
            top[1],
        );
        let gauge_color = if player.playback.muted {
            C_SECONDARY
        } else {
            C_VOLUME
        };
        draw_bar(frame, top[2], f64::from(player.playback.volume), gauge_color);
        frame.render_widget(
            Paragraph::new(Span::styled(volume_pct, Style::default().fg(C_SECONDARY))),
            top[3],
        );
        self.gauge_area = top[2];

        // ── Row 2: time label + seek track ───────────────────────────────────
        let label = format!("{} ", now.time_label);
        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(label.chars().count() as u16),
                Constraint::Min(1),
            ])
            .split(rows[1]);
        frame.render_widget(
            Paragraph::new(Span::styled(label, Style::default().fg(C_SECONDARY))),
            bottom[0],
        );
        draw_bar(frame, bottom[1], now.seek_percent / 100.0, indicator_color);
        self.seek_row = rows[1];
        self.track_area = bottom[1];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laid_out() -> NowPlaying {
        let mut pane = NowPlaying::new();
        pane.seek_row = Rect::new(1, 5, 60, 1);
        pane.track_area = Rect::new(16, 5, 40, 1);
        pane.gauge_area = Rect::new(45, 4, 11, 1);
        pane
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn track_clicks_map_to_clamped_fractions() {
        let mut pane = laid_out();
        let state = AppState::new();
        let area = Rect::new(0, 3, 62, 4);

        assert_eq!(
            pane.handle_mouse(click(26, 5), area, &state),
            vec![Action::SeekTo(0.25)]
        );
        // Left of the track (on the time label) clamps to the start.
        assert_eq!(
            pane.handle_mouse(click(3, 5), area, &state),
            vec![Action::SeekTo(0.0)]
        );
        // Past the right edge of the track clamps to the end.
        assert_eq!(
            pane.handle_mouse(click(58, 5), area, &state),
            vec![Action::SeekTo(1.0)]
        );
    }

    #[test]
    fn gauge_click_sets_volume() {
        let mut pane = laid_out();
        let state = AppState::new();
        let area = Rect::new(0, 3, 62, 4);

        assert_eq!(
            pane.handle_mouse(click(45, 4), area, &state),
            vec![Action::Volume(0.0)]
        );
        assert_eq!(
            pane.handle_mouse(click(50, 4), area, &state),
            vec![Action::Volume(0.5)]
        );
        assert_eq!(
            pane.handle_mouse(click(55, 4), area, &state),
            vec![Action::Volume(1.0)]
        );
        assert!(pane.handle_mouse(click(30, 4), area, &state).is_empty());
    }

    #[test]
    fn volume_keys_step_from_current_and_clamp() {
        let mut pane = NowPlaying::new();
        let mut state = AppState::new();
        state.player.playback.volume = 0.98;
        assert_eq!(
            pane.handle_key(KeyEvent::new(KeyCode::Up, KeyModifiers::NONE), &state),
            vec![Action::Volume(1.0)]
        );
        assert_eq!(
            pane.handle_key(KeyEvent::new(KeyCode::Right, KeyModifiers::NONE), &state),
            vec![Action::SeekRelative(SEEK_STEP)]
        );
    }

    #[test]
    fn long_titles_are_cut_to_width() {
        assert_eq!(fit_width("Track One", 20), "Track One");
        assert_eq!(fit_width("Track One", 6), "Track…");
        assert_eq!(fit_width("日本語の曲", 5), "日本…");
        assert_eq!(fit_width("abc", 0), "");
    }

    #[test]
    fn health_badges() {
        assert!(health_badge(&MediaHealth::Running).is_none());
        assert_eq!(health_badge(&MediaHealth::Dead).map(|b| b.text), Some("DEAD"));
    }
}
