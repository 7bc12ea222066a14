//! Action enum: all user-initiated intents and internal events.

use dirplay_proto::protocol::Command;

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    AlbumList,
    SongList,
    NowPlaying,
    LogPanel,
    HelpOverlay,
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Playback ─────────────────────────────────────────────────────────────
    SelectAlbum(String),
    PlayIndex(usize),
    TogglePause,
    Next,
    Prev,
    /// Absolute position, 0.0..=1.0 of the duration.
    SeekTo(f64),
    /// Signed fraction of the duration.
    SeekRelative(f64),
    Volume(f32),
    Mute,
    RefreshAlbums,

    // ── Navigation ───────────────────────────────────────────────────────────
    FocusNext,
    FocusPrev,
    FocusPane(ComponentId),
    JumpToCurrent,

    // ── UI toggles ───────────────────────────────────────────────────────────
    ToggleLogs,
    ToggleHelp,

    // ── System ───────────────────────────────────────────────────────────────
    SendCommand(Command),
    Quit,
}

impl Action {
    /// The core command a playback action maps to, if any.
    pub fn to_command(&self) -> Option<Command> {
        let cmd = match self {
            Action::SelectAlbum(album) => Command::SelectAlbum {
                album: album.clone(),
            },
            Action::PlayIndex(index) => Command::PlayIndex { index: *index },
            Action::TogglePause => Command::TogglePause,
            Action::Next => Command::Next,
            Action::Prev => Command::Prev,
            Action::SeekTo(fraction) => Command::SeekFraction {
                fraction: *fraction,
            },
            Action::SeekRelative(fraction) => Command::SeekRelative {
                fraction: *fraction,
            },
            Action::Volume(value) => Command::Volume { value: *value },
            Action::Mute => Command::ToggleMute,
            Action::RefreshAlbums => Command::RefreshAlbums,
            Action::SendCommand(cmd) => cmd.clone(),
            _ => return None,
        };
        Some(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playback_actions_map_to_commands() {
        assert_eq!(
            Action::SeekTo(0.25).to_command(),
            Some(Command::SeekFraction { fraction: 0.25 })
        );
        assert_eq!(Action::Mute.to_command(), Some(Command::ToggleMute));
        assert_eq!(
            Action::SelectAlbum("ncs".into()).to_command(),
            Some(Command::SelectAlbum {
                album: "ncs".into()
            })
        );
        assert_eq!(Action::ToggleHelp.to_command(), None);
        assert_eq!(Action::FocusNext.to_command(), None);
    }
}
