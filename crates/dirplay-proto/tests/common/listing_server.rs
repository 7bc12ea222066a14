use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;

/// A canned file server: exact request path -> page. Anything else is a 404.
#[derive(Default, Clone)]
pub struct Pages {
    pages: HashMap<String, Page>,
}

#[derive(Clone)]
struct Page {
    content_type: &'static str,
    body: String,
    status: StatusCode,
}

impl Pages {
    pub fn new() -> Self {
        Self::default()
    }

    /// An autoindex-style page with one anchor per href.
    pub fn listing(mut self, path: &str, hrefs: &[&str]) -> Self {
        self.pages.insert(
            path.to_string(),
            Page {
                content_type: "text/html; charset=utf-8",
                body: listing_html(path, hrefs),
                status: StatusCode::OK,
            },
        );
        self
    }

    pub fn json(mut self, path: &str, body: &str) -> Self {
        self.pages.insert(
            path.to_string(),
            Page {
                content_type: "application/json",
                body: body.to_string(),
                status: StatusCode::OK,
            },
        );
        self
    }

    /// An HTML error page with `status` that still carries anchors, the way
    /// some servers render their 404 and 500 pages.
    pub fn error_page(mut self, path: &str, status: StatusCode, hrefs: &[&str]) -> Self {
        self.pages.insert(
            path.to_string(),
            Page {
                content_type: "text/html; charset=utf-8",
                body: listing_html(path, hrefs),
                status,
            },
        );
        self
    }
}

pub fn listing_html(title: &str, hrefs: &[&str]) -> String {
    let mut html = format!("<html><head><title>Index of {title}</title></head><body><h1>Index of {title}</h1><hr><pre>\n");
    for href in hrefs {
        html.push_str(&format!("<a href=\"{href}\">{href}</a>\n"));
    }
    html.push_str("</pre><hr></body></html>");
    html
}

async fn serve(State(pages): State<Arc<Pages>>, uri: Uri) -> Response {
    match pages.pages.get(uri.path()) {
        Some(page) => (
            page.status,
            [(header::CONTENT_TYPE, page.content_type)],
            page.body.clone(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

/// Bind on an ephemeral port and serve `pages`. Returns `http://127.0.0.1:<port>`.
pub async fn start(pages: Pages) -> String {
    let app = Router::new().fallback(serve).with_state(Arc::new(pages));
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

/// An address nothing listens on.
pub async fn dead_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    drop(listener);
    format!("http://{addr}")
}

/// The music tree most tests use, rooted at `/music/`.
pub fn music_tree() -> Pages {
    Pages::new()
        .listing("/music/", &["../", "ncs/", "cs/", "ncs/", "jazz/", "stray.MP3"])
        .listing(
            "/music/ncs/",
            &["../", "cover.jpg", "Track%20One.mp3", "info.json", "Track%20Two.MP3"],
        )
        .json(
            "/music/ncs/info.json",
            r#"{"title": "No Copyright Sounds", "description": "Free to stream"}"#,
        )
        .listing("/music/cs/", &["../", "intro.mp3"])
        .json("/music/cs/info.json", "{ not json")
        .listing("/music/jazz/", &["../", "cover.jpg"])
}
