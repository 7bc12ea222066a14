//! LogPanel component: collapsible log viewer.
//!
//! Shows the most recent line when collapsed; expands to a scrollable pane.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{style_muted, C_SECONDARY},
    widgets::pane_chrome::pane_chrome,
};

/// Height of the expanded panel, borders included.
pub const EXPANDED_HEIGHT: u16 = 10;

pub struct LogPanel {
    pub expanded: bool,
    /// First visible line; `usize::MAX` pins to the newest.
    pub scroll: usize,
    last_log_count: usize,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            expanded: false,
            scroll: usize::MAX,
            last_log_count: 0,
        }
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
        if self.expanded {
            self.scroll = usize::MAX;
        }
    }

    pub fn height(&self) -> u16 {
        if self.expanded {
            EXPANDED_HEIGHT
        } else {
            1
        }
    }

    /// Clamp `scroll` for `count` lines in a `height`-row viewport, following
    /// new lines when the view was at the bottom.
    fn settle_scroll(&mut self, count: usize, height: usize) -> usize {
        let max_scroll = count.saturating_sub(height);
        if count > self.last_log_count {
            let prev_max = self.last_log_count.saturating_sub(height);
            if self.scroll >= prev_max {
                self.scroll = usize::MAX;
            }
            self.last_log_count = count;
        }
        self.scroll = self.scroll.min(max_scroll);
        self.scroll
    }
}

impl Component for LogPanel {
    fn id(&self) -> ComponentId {
        ComponentId::LogPanel
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release || !self.expanded {
            return vec![];
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll = self.scroll.saturating_add(1),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(10),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(10),
            KeyCode::Home | KeyCode::Char('g') => self.scroll = 0,
            KeyCode::End | KeyCode::Char('G') => self.scroll = usize::MAX,
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        if !self.expanded {
            return vec![];
        }
        match event.kind {
            MouseEventKind::ScrollUp => self.scroll = self.scroll.saturating_sub(1),
            MouseEventKind::ScrollDown => self.scroll = self.scroll.saturating_add(1),
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) {
        if *action == Action::ToggleLogs {
            self.toggle();
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        if area.height == 0 {
            return;
        }
        frame.render_widget(Clear, area);

        if !self.expanded || area.height <= 2 {
            let last = state
                .logs
                .back()
                .map(String::as_str)
                .unwrap_or("(no log)");
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled(" log ", style_muted()),
                    Span::styled(last, Style::default().fg(C_SECONDARY)),
                ])),
                area,
            );
            return;
        }

        let block = pane_chrome("log", Some('4'), focused, vec![]);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if state.logs.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("  no log entries yet", style_muted())),
                inner,
            );
            return;
        }

        let height = inner.height as usize;
        let first = self.settle_scroll(state.logs.len(), height);
        let lines: Vec<Line> = state
            .logs
            .iter()
            .skip(first)
            .take(height)
            .map(|msg| Line::from(vec![Span::raw(" "), Span::styled(msg.as_str(), style_muted())]))
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_follows_tail_until_user_scrolls_up() {
        let mut panel = LogPanel::new();
        panel.toggle();
        assert_eq!(panel.settle_scroll(20, 8), 12);
        assert_eq!(panel.settle_scroll(25, 8), 17);

        panel.scroll = 3;
        assert_eq!(panel.settle_scroll(30, 8), 3);
    }

    #[test]
    fn toggle_action_expands() {
        let mut panel = LogPanel::new();
        let state = AppState::new();
        assert_eq!(panel.height(), 1);
        panel.on_action(&Action::ToggleLogs, &state);
        assert!(panel.expanded);
        assert_eq!(panel.height(), EXPANDED_HEIGHT);
    }
}
