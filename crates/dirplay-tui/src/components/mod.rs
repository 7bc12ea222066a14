pub mod album_list;
pub mod help_overlay;
pub mod log_panel;
pub mod now_playing;
pub mod song_list;
