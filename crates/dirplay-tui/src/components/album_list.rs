//! AlbumList component: left pane, one card per album folder.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph, Wrap},
    Frame,
};

use dirplay_proto::catalog::Album;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{
        style_muted, C_DESCRIPTION, C_LINK, C_MUTED, C_PLAYING, C_PRIMARY, C_SECONDARY,
        C_SELECTION_BG,
    },
    widgets::{pane_chrome::pane_chrome, scrollable_list::ScrollableList},
};

/// Rows reserved under the list for the selected album's details.
const DETAIL_HEIGHT: u16 = 3;

pub struct AlbumList {
    pub list: ScrollableList<Album>,
    /// List rows of the last draw, for click mapping.
    rows_area: Rect,
    /// Album the cursor last followed.
    followed: Option<String>,
}

impl AlbumList {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(),
            rows_area: Rect::default(),
            followed: None,
        }
    }

    fn select_selected(&self) -> Vec<Action> {
        match self.list.selected_item() {
            Some(album) => vec![Action::SelectAlbum(album.key.clone())],
            None => vec![],
        }
    }

    fn render_item<'a>(album: &'a Album, is_current: bool, is_selected: bool) -> ListItem<'a> {
        let marker = if is_current { "● " } else { "  " };
        let title_style = match (is_current, is_selected) {
            (true, _) => Style::default().fg(C_PLAYING).add_modifier(Modifier::BOLD),
            (false, true) => Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            (false, false) => Style::default().fg(C_SECONDARY),
        };
        let mut spans = vec![
            Span::styled(marker, Style::default().fg(C_PLAYING)),
            Span::styled(album.title.as_str(), title_style),
        ];
        if album.title != album.key {
            spans.push(Span::styled(format!("  {}/", album.key), style_muted()));
        }
        let item = ListItem::new(Line::from(spans));
        if is_selected {
            item.style(Style::default().bg(C_SELECTION_BG))
        } else {
            item
        }
    }

    fn draw_detail(&self, frame: &mut Frame, area: Rect) {
        let Some(album) = self.list.selected_item() else {
            return;
        };
        let description = if album.description.is_empty() {
            Span::styled("no description", style_muted())
        } else {
            Span::styled(album.description.as_str(), Style::default().fg(C_DESCRIPTION))
        };
        let lines = vec![
            Line::from(Span::styled("─".repeat(area.width as usize), style_muted())),
            Line::from(description),
            Line::from(vec![
                Span::styled("cover ", Style::default().fg(C_MUTED)),
                Span::styled(album.cover_url.as_str(), Style::default().fg(C_LINK)),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
    }
}

impl Component for AlbumList {
    fn id(&self) -> ComponentId {
        ComponentId::AlbumList
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
            KeyCode::Enter => return self.select_selected(),
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
                let inside = event.row >= rows.y && event.row < rows.y + rows.height;
                if inside
                    && self
                        .list
                        .handle_click((event.row - rows.y) as usize)
                        .is_some()
                {
                    return self.select_selected();
                }
            }
            _ => {}
        }
        vec![]
    }

    fn sync(&mut self, state: &AppState) {
        self.list
            .set_items_keep(state.player.albums.clone(), |a| a.key.clone());
        // Follow the playing album when it changes, not on every refresh.
        let current = &state.player.playlist.current_album;
        if *current != self.followed && !self.list.is_empty() {
            self.followed = current.clone();
            self.on_action(&Action::JumpToCurrent, state);
        }
    }

    fn on_action(&mut self, action: &Action, state: &AppState) {
        if *action == Action::JumpToCurrent {
            if let Some(key) = &state.player.playlist.current_album {
                if let Some(pos) = self.list.items.iter().position(|a| &a.key == key) {
                    self.list.select(pos);
                }
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let block = pane_chrome("albums", Some('1'), focused, vec![]);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.list.is_empty() {
            self.rows_area = Rect::default();
            let msg = if state.player.albums_loading {
                "  loading albums…"
            } else {
                "  no albums found"
            };
            frame.render_widget(Paragraph::new(Span::styled(msg, style_muted())), inner);
            return;
        }

        let detail_h = if inner.height > DETAIL_HEIGHT + 2 {
            DETAIL_HEIGHT
        } else {
            0
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(detail_h)])
            .split(inner);
        self.rows_area = chunks[0];

        let height = chunks[0].height as usize;
        self.list.ensure_visible(height);
        let current = state.player.playlist.current_album.as_deref();
        let selected = self.list.selected;
        let items: Vec<ListItem> = self
            .list
            .visible_items(height)
            .into_iter()
            .map(|(idx, album)| {
                Self::render_item(album, current == Some(album.key.as_str()), idx == selected)
            })
            .collect();
        frame.render_widget(List::new(items), chunks[0]);

        if detail_h > 0 {
            self.draw_detail(frame, chunks[1]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn album(key: &str) -> Album {
        Album {
            key: key.into(),
            title: key.to_uppercase(),
            description: String::new(),
            cover_url: format!("http://h/{key}/cover.jpg"),
        }
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn enter_selects_album_under_cursor() {
        let mut state = AppState::new();
        state.player.albums = vec![album("ncs"), album("cs")];
        let mut pane = AlbumList::new();
        pane.sync(&state);

        pane.handle_key(press(KeyCode::Down), &state);
        assert_eq!(
            pane.handle_key(press(KeyCode::Enter), &state),
            vec![Action::SelectAlbum("cs".into())]
        );
    }

    #[test]
    fn cursor_follows_current_album_changes() {
        let mut state = AppState::new();
        state.player.albums = vec![album("cs"), album("jazz"), album("ncs")];
        state.player.playlist.current_album = Some("ncs".into());
        let mut pane = AlbumList::new();
        pane.sync(&state);
        assert_eq!(pane.list.selected_item().map(|a| a.key.as_str()), Some("ncs"));

        // Later refreshes keep the cursor where the user left it.
        pane.list.select(0);
        pane.sync(&state);
        assert_eq!(pane.list.selected_item().map(|a| a.key.as_str()), Some("cs"));

        state.player.playlist.current_album = Some("jazz".into());
        pane.sync(&state);
        assert_eq!(pane.list.selected_item().map(|a| a.key.as_str()), Some("jazz"));
    }
}
