mod action;
mod app;
mod app_state;
mod component;
mod components;
mod core;
mod focus;
mod media;
mod mpv;
mod theme;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use dirplay_proto::catalog::CatalogClient;
use dirplay_proto::config::Config;
use tokio::sync::{broadcast, mpsc};

/// What the PlayerCore broadcasts to the TUI.
#[derive(Debug, Clone)]
pub enum BroadcastMessage {
    /// `PlayerState` changed; receivers should fetch from StateManager.
    StateUpdated,
    /// A log message from the core event loop.
    Log(String),
}

/// dirplay - play albums straight off a static file server
#[derive(Parser, Debug)]
#[command(name = "dirplay", version, about)]
struct Args {
    /// Music root URL (directory listing of album folders)
    #[arg(long)]
    base_url: Option<String>,

    /// Album to select at startup
    #[arg(long)]
    album: Option<String>,

    /// Initial volume, 0.0 to 1.0
    #[arg(long)]
    volume: Option<f32>,

    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the effective config as TOML and exit
    #[arg(long)]
    print_config: bool,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.base_url {
            config.server.base_url = url.clone();
        }
        if let Some(album) = &self.album {
            config.server.default_album = Some(album.clone());
        }
        if let Some(volume) = self.volume {
            config.mpv.default_volume = volume.clamp(0.0, 1.0);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_default(),
    };
    args.apply(&mut config);

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let data_dir = dirplay_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("dirplay.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // RUST_LOG wins; otherwise debug for our code, quiet HTTP and HTML parser internals.
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        "debug,hyper_util=warn,reqwest=warn,hyper=warn,html5ever=warn,selectors=warn".to_string()
    });
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("dirplay log: {}", log_path.display());

    tracing::info!("dirplay starting, music root {}", config.server.base_url);

    // ── Broadcast channel (PlayerCore → TUI) ─────────────────────────────────
    let (broadcast_tx, broadcast_rx) = broadcast::channel::<BroadcastMessage>(1024);

    // ── CoreEvent channel (TUI / media / fetch tasks → PlayerCore) ───────────
    let (event_tx, event_rx) = mpsc::channel::<core::CoreEvent>(1024);

    // Media notifications get their own channel so the mpv driver stays
    // unaware of the core's event type.
    let (media_tx, mut media_rx) = mpsc::channel::<media::MediaEvent>(256);
    let forward_tx = event_tx.clone();
    tokio::spawn(async move {
        while let Some(evt) = media_rx.recv().await {
            if forward_tx.send(core::CoreEvent::Media(evt)).await.is_err() {
                break;
            }
        }
    });

    let catalog = CatalogClient::new(&config.server)?;
    let media = mpv::MpvMedia::new(&config.mpv, media_tx);

    let player_core = core::PlayerCore::new(
        &config,
        catalog,
        media,
        broadcast_tx.clone(),
        event_tx.clone(),
    );
    let state_manager = player_core.state_manager();

    let _ = broadcast_tx.send(BroadcastMessage::StateUpdated);

    let core_task = tokio::spawn(async move {
        if let Err(e) = player_core.run(event_rx).await {
            tracing::error!("PlayerCore exited with error: {}", e);
        }
    });

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let app = app::App::new(log_path, event_tx.clone(), state_manager);
    let result = app.run(broadcast_rx).await;

    // Let the core stop mpv before the runtime goes away.
    let _ = event_tx.send(core::CoreEvent::Shutdown).await;
    let _ = tokio::time::timeout(std::time::Duration::from_secs(2), core_task).await;

    result
}
