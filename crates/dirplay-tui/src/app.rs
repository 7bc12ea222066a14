//! App: component-based event loop.
//!
//! Architecture:
//! - `App` owns all components and `AppState` (shared read-only data for components).
//! - A `tokio::mpsc` channel carries `AppMessage` events in from background tasks.
//! - The event loop draws each frame, then awaits the next message.
//! - Components return `Vec<Action>`; App dispatches each Action.
//! - Commands to the player core flow out through the `CoreEvent` channel.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Terminal,
};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use dirplay_proto::protocol::{Command, PlayerState};
use dirplay_proto::state::StateManager;

use crate::core::CoreEvent;
use crate::BroadcastMessage;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::{
        album_list::AlbumList,
        help_overlay::HelpOverlay,
        log_panel::LogPanel,
        now_playing::{NowPlaying, SEEK_STEP, VOLUME_STEP},
        song_list::SongList,
    },
    focus::FocusRing,
};

/// Height of the now-playing bar, borders included.
const NOW_PLAYING_HEIGHT: u16 = 4;

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
    StateUpdated(PlayerState),
    Log(String),
}

/// Screen rects from the last draw, for mouse hit-testing.
#[derive(Debug, Clone, Copy, Default)]
struct PaneAreas {
    album_list: Rect,
    song_list: Rect,
    now_playing: Rect,
    log_panel: Rect,
}

pub struct App {
    state: AppState,
    album_list: AlbumList,
    song_list: SongList,
    now_playing: NowPlaying,
    log_panel: LogPanel,
    help_overlay: HelpOverlay,
    focus: FocusRing,
    pane_areas: PaneAreas,
    should_quit: bool,
    log_path: PathBuf,
    cmd_tx: mpsc::Sender<CoreEvent>,
    state_manager: Arc<StateManager>,
}

impl App {
    pub fn new(
        log_path: PathBuf,
        cmd_tx: mpsc::Sender<CoreEvent>,
        state_manager: Arc<StateManager>,
    ) -> Self {
        Self {
            state: AppState::new(),
            album_list: AlbumList::new(),
            song_list: SongList::new(),
            now_playing: NowPlaying::new(),
            log_panel: LogPanel::new(),
            help_overlay: HelpOverlay::new(),
            focus: FocusRing::new(vec![
                ComponentId::AlbumList,
                ComponentId::SongList,
                ComponentId::NowPlaying,
                ComponentId::LogPanel,
            ]),
            pane_areas: PaneAreas::default(),
            should_quit: false,
            log_path,
            cmd_tx,
            state_manager,
        }
    }

    pub async fn run(
        mut self,
        mut broadcast_rx: broadcast::Receiver<BroadcastMessage>,
    ) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let (tx, mut rx) = mpsc::channel::<AppMessage>(1024);

        self.push_log(format!("dirplay started, log file {}", self.log_path.display()));
        let initial = self.state_manager.get_state().await;
        self.on_state_updated(initial);

        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // ── Background task: broadcast receiver (PlayerCore → AppMessage) ─────
        let bc_tx = tx.clone();
        let bc_state_manager = Arc::clone(&self.state_manager);
        tokio::spawn(async move {
            loop {
                match broadcast_rx.recv().await {
                    Ok(msg) => {
                        let app_msg = match msg {
                            BroadcastMessage::StateUpdated => {
                                AppMessage::StateUpdated(bc_state_manager.get_state().await)
                            }
                            BroadcastMessage::Log(s) => AppMessage::Log(s),
                        };
                        if bc_tx.send(app_msg).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // Only StateUpdated is coalescable; the next one catches up.
                        warn!("broadcast receiver lagged by {} messages", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        drop(tx);

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }

            let Some(msg) = rx.recv().await else {
                break;
            };
            needs_redraw = self.handle_message(msg).await;

            // Drain whatever queued up meanwhile (time-pos updates arrive in bursts).
            const MAX_DRAIN: usize = 256;
            for _ in 0..MAX_DRAIN {
                match rx.try_recv() {
                    Ok(next) => needs_redraw |= self.handle_message(next).await,
                    Err(_) => break,
                }
            }

            if self.should_quit {
                break;
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        info!("TUI shutting down");
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        Ok(())
    }

    /// Returns whether a redraw is needed.
    async fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(ev) => match ev {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        return false;
                    }
                    for a in self.handle_key(key) {
                        self.dispatch(a).await;
                    }
                }
                Event::Mouse(mouse) => {
                    let actions = self.handle_mouse(mouse);
                    if actions.is_empty() && !matches!(mouse.kind, MouseEventKind::Down(_)) {
                        return false;
                    }
                    for a in actions {
                        self.dispatch(a).await;
                    }
                }
                Event::Resize(..) => {}
                _ => return false,
            },
            AppMessage::StateUpdated(player) => self.on_state_updated(player),
            AppMessage::Log(msg) => self.push_log(msg),
        }
        true
    }

    fn on_state_updated(&mut self, player: PlayerState) {
        if player.rev < self.state.player.rev {
            // A slower fetch of an older snapshot; keep the newer one.
            return;
        }
        self.state.player = player;
        let s = &self.state;
        self.album_list.sync(s);
        self.song_list.sync(s);
        self.now_playing.sync(s);
        self.log_panel.sync(s);
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        // Global keys: always active regardless of focus
        match key.code {
            KeyCode::Char('c') if key.modifiers == KeyModifiers::CONTROL => {
                return vec![Action::Quit];
            }
            KeyCode::Char('q') if !self.help_overlay.visible => return vec![Action::Quit],
            KeyCode::Char('L') => return vec![Action::ToggleLogs],
            _ => {}
        }

        // Help overlay captures all keys when visible
        if self.help_overlay.visible {
            let actions = self.help_overlay.handle_key(key, &self.state);
            if !actions.is_empty() {
                return actions;
            }
            // Any other key closes the overlay
            return vec![Action::ToggleHelp];
        }

        match key.code {
            KeyCode::Char('?') => return vec![Action::ToggleHelp],
            KeyCode::Tab => return vec![Action::FocusNext],
            KeyCode::BackTab => return vec![Action::FocusPrev],

            // Global playback keys
            KeyCode::Char(' ') => return vec![Action::TogglePause],
            KeyCode::Char('n') => return vec![Action::Next],
            KeyCode::Char('p') => return vec![Action::Prev],
            KeyCode::Char('m') => return vec![Action::Mute],
            KeyCode::Char('r') => return vec![Action::RefreshAlbums],
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let volume = (self.state.player.playback.volume + VOLUME_STEP).min(1.0);
                return vec![Action::Volume(volume)];
            }
            KeyCode::Char('-') => {
                let volume = (self.state.player.playback.volume - VOLUME_STEP).max(0.0);
                return vec![Action::Volume(volume)];
            }
            KeyCode::Char(',') => return vec![Action::SeekRelative(-SEEK_STEP)],
            KeyCode::Char('.') => return vec![Action::SeekRelative(SEEK_STEP)],
            KeyCode::Char('J') => return vec![Action::JumpToCurrent],
            KeyCode::Char('1') => return vec![Action::FocusPane(ComponentId::AlbumList)],
            KeyCode::Char('2') => return vec![Action::FocusPane(ComponentId::SongList)],
            KeyCode::Char('3') => return vec![Action::FocusPane(ComponentId::NowPlaying)],
            KeyCode::Char('4') => return vec![Action::FocusPane(ComponentId::LogPanel)],
            _ => {}
        }

        // Dispatch to the focused component
        let s = &self.state;
        match self.focus.current() {
            Some(ComponentId::AlbumList) => self.album_list.handle_key(key, s),
            Some(ComponentId::SongList) => self.song_list.handle_key(key, s),
            Some(ComponentId::NowPlaying) => self.now_playing.handle_key(key, s),
            Some(ComponentId::LogPanel) => self.log_panel.handle_key(key, s),
            Some(ComponentId::HelpOverlay) | None => vec![],
        }
    }

    // ── Mouse handling ────────────────────────────────────────────────────────

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        let relevant = matches!(
            event.kind,
            MouseEventKind::Down(_)
                | MouseEventKind::Drag(MouseButton::Left)
                | MouseEventKind::ScrollUp
                | MouseEventKind::ScrollDown
        );
        if !relevant || self.help_overlay.visible {
            return vec![];
        }

        let col = event.column;
        let row = event.row;

        fn hit(r: Rect, col: u16, row: u16) -> bool {
            r.width > 0
                && r.height > 0
                && col >= r.x
                && col < r.x + r.width
                && row >= r.y
                && row < r.y + r.height
        }

        let areas = self.pane_areas;
        let s = &self.state;

        // Dispatch to the clicked pane; focus follows clicks, not drags or wheel.
        macro_rules! click_pane {
            ($id:expr, $component:expr, $area:expr) => {{
                let mut actions = $component.handle_mouse(event, $area, s);
                let is_press = matches!(event.kind, MouseEventKind::Down(_));
                if is_press && self.focus.current() != Some($id) {
                    actions.insert(0, Action::FocusPane($id));
                }
                return actions;
            }};
        }

        if hit(areas.album_list, col, row) {
            click_pane!(ComponentId::AlbumList, self.album_list, areas.album_list);
        }
        if hit(areas.song_list, col, row) {
            click_pane!(ComponentId::SongList, self.song_list, areas.song_list);
        }
        if hit(areas.now_playing, col, row) {
            click_pane!(ComponentId::NowPlaying, self.now_playing, areas.now_playing);
        }
        if hit(areas.log_panel, col, row) && self.log_panel.expanded {
            click_pane!(ComponentId::LogPanel, self.log_panel, areas.log_panel);
        }

        vec![]
    }

    // ── Action dispatcher ─────────────────────────────────────────────────────

    async fn dispatch(&mut self, action: Action) {
        // Let every component react first (toggles, jump-to-current).
        {
            let s = &self.state;
            self.album_list.on_action(&action, s);
            self.song_list.on_action(&action, s);
            self.now_playing.on_action(&action, s);
            self.log_panel.on_action(&action, s);
            self.help_overlay.on_action(&action, s);
        }
        self.apply_action(action).await;
    }

    async fn apply_action(&mut self, action: Action) {
        debug!("apply_action: {:?}", action);
        match action {
            Action::Quit => self.should_quit = true,
            Action::FocusNext => {
                self.focus.next();
                if !self.log_panel.expanded && self.focus.is_focused(ComponentId::LogPanel) {
                    self.focus.next();
                }
            }
            Action::FocusPrev => {
                self.focus.prev();
                if !self.log_panel.expanded && self.focus.is_focused(ComponentId::LogPanel) {
                    self.focus.prev();
                }
            }
            Action::FocusPane(id) => {
                if id != ComponentId::LogPanel || self.log_panel.expanded {
                    self.focus.set(id);
                }
            }
            Action::ToggleLogs => {
                if !self.log_panel.expanded && self.focus.is_focused(ComponentId::LogPanel) {
                    self.focus.set(ComponentId::AlbumList);
                }
            }
            Action::ToggleHelp | Action::JumpToCurrent => {}
            other => {
                if let Some(cmd) = other.to_command() {
                    self.send_cmd(cmd).await;
                }
            }
        }
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        use crate::theme::C_BG;
        use ratatui::widgets::Block;
        let area = frame.area();

        frame.render_widget(
            Block::default().style(ratatui::style::Style::default().bg(C_BG)),
            area,
        );

        // ── Outer layout: body | now playing | log ────────────────────────────
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(NOW_PLAYING_HEIGHT),
                Constraint::Length(self.log_panel.height()),
            ])
            .split(area);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(outer[0]);

        self.pane_areas = PaneAreas {
            album_list: body[0],
            song_list: body[1],
            now_playing: outer[1],
            log_panel: outer[2],
        };

        let s = &self.state;
        let focus = &self.focus;
        self.album_list
            .draw(frame, body[0], focus.is_focused(ComponentId::AlbumList), s);
        self.song_list
            .draw(frame, body[1], focus.is_focused(ComponentId::SongList), s);
        self.now_playing
            .draw(frame, outer[1], focus.is_focused(ComponentId::NowPlaying), s);
        self.log_panel
            .draw(frame, outer[2], focus.is_focused(ComponentId::LogPanel), s);

        // ── Help overlay (on top of everything) ──────────────────────────────
        self.help_overlay.draw(frame, area, false, s);
    }

    async fn send_cmd(&self, cmd: Command) {
        if self.cmd_tx.send(CoreEvent::Command(cmd)).await.is_err() {
            warn!("player core is gone, command dropped");
        }
    }

    fn push_log(&mut self, msg: String) {
        let stamp = chrono::Local::now().format("%H:%M:%S");
        self.state.push_log(format!("{stamp} {msg}"));
    }
}
