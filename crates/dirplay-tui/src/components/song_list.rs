//! SongList component: the selected album's tracks, current one highlighted.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use dirplay_proto::catalog::Song;
use dirplay_proto::playback::PlayIndicator;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{style_muted, C_PAUSED, C_PLAYING, C_PRIMARY, C_SECONDARY, C_SELECTION_BG},
    widgets::{pane_chrome::pane_chrome, scrollable_list::ScrollableList},
};

pub struct SongList {
    pub list: ScrollableList<Song>,
    /// Album the list was filled from.
    album: Option<String>,
    /// Current index the cursor last followed.
    followed: Option<usize>,
    rows_area: Rect,
}

impl SongList {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(),
            album: None,
            followed: None,
            rows_area: Rect::default(),
        }
    }

    fn play_selected(&self) -> Vec<Action> {
        match self.list.selected_index() {
            Some(idx) => vec![Action::PlayIndex(idx)],
            None => vec![],
        }
    }
}

impl Component for SongList {
    fn id(&self) -> ComponentId {
        ComponentId::SongList
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let step = if key.modifiers.contains(KeyModifiers::SHIFT) {
            5
        } else {
            1
        };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(step),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(step),
            KeyCode::PageUp => self.list.select_up(10),
            KeyCode::PageDown => self.list.select_down(10),
            KeyCode::Home | KeyCode::Char('g') => self.list.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.list.select_last(),
            KeyCode::Enter => return self.play_selected(),
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::ScrollUp => self.list.select_up(1),
            MouseEventKind::ScrollDown => self.list.select_down(1),
            MouseEventKind::Down(MouseButton::Left) => {
                let rows = self.rows_area;
                if event.row >= rows.y && event.row < rows.y + rows.height {
                    if let Some(idx) = self.list.handle_click((event.row - rows.y) as usize) {
                        return vec![Action::PlayIndex(idx)];
                    }
                }
            }
            _ => {}
        }
        vec![]
    }

    fn sync(&mut self, state: &AppState) {
        let playlist = &state.player.playlist;
        if playlist.current_album != self.album {
            self.album = playlist.current_album.clone();
            self.list.set_items(playlist.songs.clone());
            self.followed = None;
        } else if playlist.songs != self.list.items {
            self.list.set_items_keep(playlist.songs.clone(), |s| s.file_name.clone());
        }
        if playlist.current_index != self.followed {
            self.followed = playlist.current_index;
            self.on_action(&Action::JumpToCurrent, state);
        }
    }

    fn on_action(&mut self, action: &Action, state: &AppState) {
        if *action == Action::JumpToCurrent {
            if let Some(idx) = state.current_index() {
                self.list.select(idx);
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let title = state
            .player
            .current_album()
            .map(|a| a.title.as_str())
            .or(state.player.playlist.current_album.as_deref())
            .unwrap_or("songs");
        let block = pane_chrome(title, Some('2'), focused, vec![]);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.rows_area = inner;

        if self.list.is_empty() {
            let msg = if self.album.is_some() {
                "  no songs in this album"
            } else {
                "  pick an album"
            };
            frame.render_widget(Paragraph::new(Span::styled(msg, style_muted())), inner);
            return;
        }

        let height = inner.height as usize;
        self.list.ensure_visible(height);
        let current = state.current_index();
        let indicator = state.player.now_playing.indicator;
        let selected = self.list.selected;
        let number_w = self.list.len().to_string().len();

        let items: Vec<ListItem> = self
            .list
            .visible_items(height)
            .into_iter()
            .map(|(idx, song)| {
                let is_current = current == Some(idx);
                let (icon, icon_color) = match (is_current, indicator) {
                    (true, PlayIndicator::Playing) => (indicator.symbol(), C_PLAYING),
                    (true, PlayIndicator::Paused) => (indicator.symbol(), C_PAUSED),
                    (false, _) => (" ", C_SECONDARY),
                };
                let name_style = if is_current {
                    Style::default().fg(icon_color).add_modifier(Modifier::BOLD)
                } else if idx == selected {
                    Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(C_SECONDARY)
                };
                let line = Line::from(vec![
                    Span::styled(format!("{icon} "), Style::default().fg(icon_color)),
                    Span::styled(format!("{:>number_w$}  ", idx + 1), style_muted()),
                    Span::styled(song.decoded.as_str(), name_style),
                ]);
                let item = ListItem::new(line);
                if idx == selected {
                    item.style(Style::default().bg(C_SELECTION_BG))
                } else {
                    item
                }
            })
            .collect();
        frame.render_widget(List::new(items), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(album: &str, names: &[&str], current: Option<usize>) -> AppState {
        let mut state = AppState::new();
        state.player.playlist.current_album = Some(album.into());
        state.player.playlist.songs = names
            .iter()
            .map(|n| Song::from_file_name(&format!("{n}.mp3"), ".mp3"))
            .collect();
        state.player.playlist.current_index = current;
        state
    }

    #[test]
    fn cursor_follows_track_changes() {
        let mut pane = SongList::new();
        let mut state = state_with("ncs", &["a", "b", "c"], Some(0));
        pane.sync(&state);
        assert_eq!(pane.list.selected, 0);

        // Playback advanced on its own (track ended).
        state.player.playlist.current_index = Some(2);
        pane.sync(&state);
        assert_eq!(pane.list.selected, 2);

        // User browses; an unrelated state update leaves the cursor alone.
        pane.list.select(1);
        pane.sync(&state);
        assert_eq!(pane.list.selected, 1);
    }

    #[test]
    fn enter_plays_selected_index_and_album_switch_resets() {
        let mut pane = SongList::new();
        let state = state_with("ncs", &["a", "b"], Some(0));
        pane.sync(&state);
        pane.handle_key(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE), &state);
        assert_eq!(
            pane.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), &state),
            vec![Action::PlayIndex(1)]
        );

        let other = state_with("cs", &[], None);
        pane.sync(&other);
        assert!(pane.list.is_empty());
        assert!(pane
            .handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), &other)
            .is_empty());
    }
}
