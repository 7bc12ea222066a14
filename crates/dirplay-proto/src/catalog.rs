//! Album catalog backed by a static file server's directory listings.
//!
//! Layout on the server:
//!
//! ```text
//! <base>/                      listing of album folders
//! <base>/<album>/              listing of audio files (+ cover, descriptor)
//! <base>/<album>/info.json     optional { "title": .., "description": .. }
//! <base>/<album>/cover.jpg     optional cover art
//! ```
//!
//! Every public fetch recovers to an empty or fallback value; failures are
//! only logged.

use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ServerConfig;
use crate::listing::{parse_listing, strip_suffix, ListingMode};

/// An album folder and its display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    /// Folder name, unique within the catalog.
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Absolute URL of the album's cover image.
    #[serde(default)]
    pub cover_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumMeta {
    pub title: String,
    pub description: String,
}

impl AlbumMeta {
    fn fallback(album: &str) -> Self {
        Self {
            title: album.to_string(),
            description: String::new(),
        }
    }
}

/// One playable file in an album.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Display name (`Track One`).
    pub decoded: String,
    /// Decoded file name as listed (`Track One.mp3`).
    pub file_name: String,
    /// Percent-encoded `file_name`, used as the URL path segment.
    pub encoded: String,
}

impl Song {
    pub fn from_file_name(file_name: &str, audio_suffix: &str) -> Self {
        Self {
            decoded: strip_suffix(file_name, audio_suffix).to_string(),
            file_name: file_name.to_string(),
            encoded: urlencoding::encode(file_name).into_owned(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("malformed descriptor at {url}: {source}")]
    Descriptor {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Raw descriptor shape. Fields are optional and only string values count.
#[derive(Debug, Default, Deserialize)]
struct Descriptor {
    #[serde(default)]
    title: Option<serde_json::Value>,
    #[serde(default)]
    description: Option<serde_json::Value>,
}

fn non_empty_str(value: Option<serde_json::Value>) -> Option<String> {
    match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
    descriptor_name: String,
    cover_name: String,
    audio_suffix: String,
}

impl CatalogClient {
    pub fn new(server: &ServerConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("dirplay/", env!("CARGO_PKG_VERSION")));
        if server.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(server.request_timeout_secs));
        }
        let client = builder.build().context("failed to build reqwest client")?;
        Ok(Self::with_client(client, server))
    }

    pub fn with_client(client: Client, server: &ServerConfig) -> Self {
        Self {
            client,
            base_url: normalize_base(&server.base_url),
            descriptor_name: server.descriptor_name.clone(),
            cover_name: server.cover_name.clone(),
            audio_suffix: server.audio_suffix.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn audio_suffix(&self) -> &str {
        &self.audio_suffix
    }

    pub fn album_url(&self, album: &str) -> String {
        format!("{}{}/", self.base_url, urlencoding::encode(album))
    }

    pub fn descriptor_url(&self, album: &str) -> String {
        format!("{}{}", self.album_url(album), self.descriptor_name)
    }

    pub fn cover_url(&self, album: &str) -> String {
        format!("{}{}", self.album_url(album), self.cover_name)
    }

    pub fn playback_url(&self, album: &str, song: &Song) -> String {
        format!("{}{}", self.album_url(album), song.encoded)
    }

    /// Album folder names in listing order. Empty on any failure.
    pub async fn list_albums(&self) -> Vec<String> {
        match self.fetch_text(&self.base_url).await {
            Ok(html) => {
                let albums = parse_listing(&html, ListingMode::Folders, &self.audio_suffix);
                debug!("catalog: {} album folder(s) at {}", albums.len(), self.base_url);
                albums
            }
            Err(e) => {
                warn!("catalog: album listing unavailable: {}", e);
                Vec::new()
            }
        }
    }

    /// Title/description for `album`, falling back to the folder name.
    pub async fn load_album_metadata(&self, album: &str) -> AlbumMeta {
        match self.fetch_descriptor(album).await {
            Ok(descriptor) => AlbumMeta {
                title: non_empty_str(descriptor.title).unwrap_or_else(|| album.to_string()),
                description: non_empty_str(descriptor.description).unwrap_or_default(),
            },
            Err(e) => {
                debug!("catalog: no descriptor for {:?}: {}", album, e);
                AlbumMeta::fallback(album)
            }
        }
    }

    /// Audio files of `album` in listing order. Empty on any failure.
    pub async fn list_songs(&self, album: &str) -> Vec<Song> {
        let url = self.album_url(album);
        match self.fetch_text(&url).await {
            Ok(html) => parse_listing(&html, ListingMode::Files, &self.audio_suffix)
                .iter()
                .map(|name| Song::from_file_name(name, &self.audio_suffix))
                .collect(),
            Err(e) => {
                warn!("catalog: song listing for {:?} unavailable: {}", album, e);
                Vec::new()
            }
        }
    }

    /// Album list with metadata, fetched one descriptor at a time.
    pub async fn load_albums(&self) -> Vec<Album> {
        let mut albums = Vec::new();
        for key in self.list_albums().await {
            let meta = self.load_album_metadata(&key).await;
            albums.push(Album {
                cover_url: self.cover_url(&key),
                key,
                title: meta.title,
                description: meta.description,
            });
        }
        albums
    }

    async fn fetch_descriptor(&self, album: &str) -> Result<Descriptor, CatalogError> {
        let url = self.descriptor_url(album);
        let body = self.fetch_text(&url).await?;
        serde_json::from_str(&body).map_err(|source| CatalogError::Descriptor { url, source })
    }

    async fn fetch_text(&self, url: &str) -> Result<String, CatalogError> {
        let transport = |source| CatalogError::Transport {
            url: url.to_string(),
            source,
        };
        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                url: url.to_string(),
                status,
            });
        }
        response.text().await.map_err(transport)
    }
}

fn normalize_base(base: &str) -> String {
    let trimmed = base.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> CatalogClient {
        let server = ServerConfig {
            base_url: base.to_string(),
            ..ServerConfig::default()
        };
        CatalogClient::new(&server).unwrap()
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        assert_eq!(client("http://h:3000/music").base_url(), "http://h:3000/music/");
        assert_eq!(client("http://h:3000/music/").base_url(), "http://h:3000/music/");
    }

    #[test]
    fn test_url_builders_encode_segments() {
        let c = client("http://h:3000/spotify/music/");
        let song = Song::from_file_name("Track One.mp3", ".mp3");
        assert_eq!(song.decoded, "Track One");
        assert_eq!(song.encoded, "Track%20One.mp3");

        assert_eq!(c.album_url("lo fi"), "http://h:3000/spotify/music/lo%20fi/");
        assert_eq!(
            c.descriptor_url("jazz"),
            "http://h:3000/spotify/music/jazz/info.json"
        );
        assert_eq!(c.cover_url("jazz"), "http://h:3000/spotify/music/jazz/cover.jpg");
        assert_eq!(
            c.playback_url("lo fi", &song),
            "http://h:3000/spotify/music/lo%20fi/Track%20One.mp3"
        );
    }

    #[test]
    fn test_non_string_descriptor_fields_fall_back() {
        let d: Descriptor = serde_json::from_str(r#"{"title": 7, "description": ""}"#).unwrap();
        assert_eq!(non_empty_str(d.title), None);
        assert_eq!(non_empty_str(d.description), None);
    }
}
