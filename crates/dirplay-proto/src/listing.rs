//! Directory-listing scraper.
//!
//! Static file servers answer a GET on a folder with an HTML page of anchors.
//! We only look at `href` attributes, in document order, and reduce each one
//! to its last decoded path segment.

use std::collections::HashSet;

use scraper::{Html, Selector};
use tracing::debug;

/// What kind of entries a listing is being read for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingMode {
    /// Album folders: anything that is not an audio file, deduplicated.
    Folders,
    /// Audio files: only entries with the audio suffix, kept as listed.
    Files,
}

/// Percent-decode `raw_href` and return its last non-empty `/` or `\` segment.
///
/// Returns `None` for empty references, references that are not valid
/// percent-encoded UTF-8, and references with no segments (`/`, `\\`).
pub fn last_path_segment(raw_href: &str) -> Option<String> {
    if raw_href.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(raw_href).ok()?;
    decoded
        .split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .last()
        .map(str::to_string)
}

/// Case-insensitive suffix test (`Track.MP3` matches `.mp3`).
pub fn has_suffix(name: &str, suffix: &str) -> bool {
    name.to_lowercase().ends_with(&suffix.to_lowercase())
}

/// Strip `suffix` from `name` case-insensitively, leaving other names alone.
pub fn strip_suffix<'a>(name: &'a str, suffix: &str) -> &'a str {
    if !suffix.is_empty() && has_suffix(name, suffix) && name.len() >= suffix.len() {
        let cut = name.len() - suffix.len();
        if name.is_char_boundary(cut) {
            return &name[..cut];
        }
    }
    name
}

/// Extract entry names from a listing document.
pub fn parse_listing(html: &str, mode: ListingMode, audio_suffix: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for anchor in document.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if is_navigation_href(href) {
            continue;
        }
        let Some(name) = last_path_segment(href) else {
            debug!("listing: skipping undecodable href {:?}", href);
            continue;
        };
        if name == "." || name == ".." {
            continue;
        }

        let is_audio = has_suffix(&name, audio_suffix);
        match mode {
            ListingMode::Folders => {
                if !is_audio && seen.insert(name.clone()) {
                    names.push(name);
                }
            }
            ListingMode::Files => {
                if is_audio {
                    names.push(name);
                }
            }
        }
    }

    names
}

/// Parent links and the sort/anchor links some servers add to their listings.
fn is_navigation_href(href: &str) -> bool {
    href.is_empty() || href == "../" || href == ".." || href.starts_with('?') || href.starts_with('#')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(hrefs: &[&str]) -> String {
        let anchors: String = hrefs
            .iter()
            .map(|h| format!("<li><a href=\"{h}\">{h}</a></li>"))
            .collect();
        format!("<html><body><h1>Index of /</h1><ul>{anchors}</ul></body></html>")
    }

    #[test]
    fn test_last_path_segment() {
        assert_eq!(last_path_segment("ncs/").as_deref(), Some("ncs"));
        assert_eq!(
            last_path_segment("%5Cspotify%5Cmusic%5Ccs/").as_deref(),
            Some("cs")
        );
        assert_eq!(
            last_path_segment("/spotify/music/ncs/Track%20One.mp3").as_deref(),
            Some("Track One.mp3")
        );
        assert_eq!(last_path_segment("a\\b\\c.MP3").as_deref(), Some("c.MP3"));
        assert_eq!(last_path_segment(""), None);
        assert_eq!(last_path_segment("/"), None);
        assert_eq!(last_path_segment("%2F%5C"), None);
    }

    #[test]
    fn test_last_path_segment_rejects_bad_utf8() {
        assert_eq!(last_path_segment("%FF%FE.mp3"), None);
    }

    #[test]
    fn test_audio_hrefs_always_yield_last_segment() {
        let cases = [
            ("song.mp3", "song.mp3"),
            ("Song.MP3", "Song.MP3"),
            ("dir/sub/Mixed%20Case.Mp3", "Mixed Case.Mp3"),
            ("%5Cmusic%5Cjazz%5Ctake%20five.mp3", "take five.mp3"),
            ("http://host:3000/music/a%26b/x%23y.mp3", "x#y.mp3"),
        ];
        for (raw, expected) in cases {
            let name = last_path_segment(raw).unwrap();
            assert!(!name.is_empty());
            assert_eq!(name, expected, "href {raw}");
            assert!(has_suffix(&name, ".mp3"));
        }
    }

    #[test]
    fn test_folders_skip_parent_and_dedupe_in_order() {
        let html = listing(&["../", "ncs/", "cs/", "ncs/"]);
        assert_eq!(
            parse_listing(&html, ListingMode::Folders, ".mp3"),
            vec!["ncs", "cs"]
        );
    }

    #[test]
    fn test_folders_exclude_audio_and_aliases_collapse() {
        let html = listing(&[
            "/spotify/music/ncs/",
            "%5Cspotify%5Cmusic%5Cncs/",
            "loose.MP3",
            "jazz/",
        ]);
        assert_eq!(
            parse_listing(&html, ListingMode::Folders, ".mp3"),
            vec!["ncs", "jazz"]
        );
    }

    #[test]
    fn test_files_keep_audio_only_without_dedupe() {
        let html = listing(&[
            "../",
            "cover.jpg",
            "Track%20One.mp3",
            "info.json",
            "Track%20Two.MP3",
            "Track%20One.mp3",
        ]);
        assert_eq!(
            parse_listing(&html, ListingMode::Files, ".mp3"),
            vec!["Track One.mp3", "Track Two.MP3", "Track One.mp3"]
        );
    }

    #[test]
    fn test_missing_and_sort_hrefs_are_skipped() {
        let html = r##"<a>no href</a><a href="">empty</a><a href="?C=N;O=D">Name</a>
            <a href="#top">top</a><a href="/">root</a><a href="./">here</a><a href="rock/">rock</a>"##;
        assert_eq!(
            parse_listing(html, ListingMode::Folders, ".mp3"),
            vec!["rock"]
        );
    }

    #[test]
    fn test_garbage_document_is_empty() {
        assert!(parse_listing("<<<not html", ListingMode::Files, ".mp3").is_empty());
        assert!(parse_listing("", ListingMode::Folders, ".mp3").is_empty());
    }

    #[test]
    fn test_strip_suffix() {
        assert_eq!(strip_suffix("Track One.mp3", ".mp3"), "Track One");
        assert_eq!(strip_suffix("Track Two.MP3", ".mp3"), "Track Two");
        assert_eq!(strip_suffix("cover.jpg", ".mp3"), "cover.jpg");
        assert_eq!(strip_suffix(".mp3", ".mp3"), "");
    }
}
