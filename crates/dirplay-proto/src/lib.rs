pub mod catalog;
pub mod config;
pub mod listing;
pub mod platform;
pub mod playback;
pub mod playlist;
pub mod protocol;
pub mod state;
