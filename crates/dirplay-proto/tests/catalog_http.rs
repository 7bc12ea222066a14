mod common;

use axum::http::StatusCode;
use common::listing_server::{self, music_tree, Pages};
use dirplay_proto::catalog::{AlbumMeta, CatalogClient};
use dirplay_proto::config::ServerConfig;

fn catalog(base: &str) -> CatalogClient {
    let server = ServerConfig {
        base_url: base.to_string(),
        ..ServerConfig::default()
    };
    CatalogClient::new(&server).expect("catalog client should build")
}

#[tokio::test]
async fn album_listing_skips_parent_audio_and_duplicates() {
    let base = listing_server::start(music_tree()).await;
    let catalog = catalog(&format!("{base}/music"));

    assert_eq!(catalog.list_albums().await, vec!["ncs", "cs", "jazz"]);
}

#[tokio::test]
async fn song_listing_keeps_audio_in_listing_order() {
    let base = listing_server::start(music_tree()).await;
    let catalog = catalog(&format!("{base}/music/"));

    let songs = catalog.list_songs("ncs").await;
    let decoded: Vec<_> = songs.iter().map(|s| s.decoded.as_str()).collect();
    assert_eq!(decoded, vec!["Track One", "Track Two"]);
    assert_eq!(songs[1].file_name, "Track Two.MP3");
    assert_eq!(
        catalog.playback_url("ncs", &songs[0]),
        format!("{base}/music/ncs/Track%20One.mp3")
    );

    assert!(catalog.list_songs("jazz").await.is_empty());
}

#[tokio::test]
async fn descriptor_fields_and_fallbacks() {
    let base = listing_server::start(music_tree()).await;
    let catalog = catalog(&format!("{base}/music/"));

    assert_eq!(
        catalog.load_album_metadata("ncs").await,
        AlbumMeta {
            title: "No Copyright Sounds".into(),
            description: "Free to stream".into(),
        }
    );
    // 404
    assert_eq!(
        catalog.load_album_metadata("jazz").await,
        AlbumMeta {
            title: "jazz".into(),
            description: String::new(),
        }
    );
    // malformed JSON
    assert_eq!(catalog.load_album_metadata("cs").await.title, "cs");
}

#[tokio::test]
async fn load_albums_pairs_keys_with_metadata() {
    let base = listing_server::start(music_tree()).await;
    let catalog = catalog(&format!("{base}/music/"));

    let albums = catalog.load_albums().await;
    let titles: Vec<_> = albums
        .iter()
        .map(|a| (a.key.as_str(), a.title.as_str()))
        .collect();
    assert_eq!(
        titles,
        vec![
            ("ncs", "No Copyright Sounds"),
            ("cs", "cs"),
            ("jazz", "jazz")
        ]
    );
    assert_eq!(albums[2].cover_url, format!("{base}/music/jazz/cover.jpg"));
}

#[tokio::test]
async fn album_names_are_percent_encoded_in_requests() {
    let pages = Pages::new()
        .listing("/music/", &["lo%20fi/"])
        .listing("/music/lo%20fi/", &["rain%20%26%20tea.mp3"])
        .json("/music/lo%20fi/info.json", r#"{"title": "Lo-Fi", "description": ""}"#);
    let base = listing_server::start(pages).await;
    let catalog = catalog(&format!("{base}/music/"));

    assert_eq!(catalog.list_albums().await, vec!["lo fi"]);
    let songs = catalog.list_songs("lo fi").await;
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0].decoded, "rain & tea");
    assert_eq!(songs[0].encoded, "rain%20%26%20tea.mp3");

    let meta = catalog.load_album_metadata("lo fi").await;
    assert_eq!(meta.title, "Lo-Fi");
    assert_eq!(meta.description, "");
}

#[tokio::test]
async fn unreachable_server_yields_empty_catalog() {
    let base = listing_server::dead_address().await;
    let catalog = catalog(&format!("{base}/music/"));

    assert!(catalog.list_albums().await.is_empty());
    assert!(catalog.list_songs("ncs").await.is_empty());
    assert!(catalog.load_albums().await.is_empty());
    assert_eq!(catalog.load_album_metadata("ncs").await.title, "ncs");
}

#[tokio::test]
async fn error_pages_with_anchors_are_not_listings() {
    let pages = Pages::new()
        .error_page(
            "/music/",
            StatusCode::INTERNAL_SERVER_ERROR,
            &["ncs/", "cs/"],
        )
        .error_page("/music/ncs/", StatusCode::NOT_FOUND, &["Track%20One.mp3"]);
    let base = listing_server::start(pages).await;
    let catalog = catalog(&format!("{base}/music/"));

    assert!(catalog.list_albums().await.is_empty());
    assert!(catalog.list_songs("ncs").await.is_empty());
    assert!(catalog.load_albums().await.is_empty());
}
