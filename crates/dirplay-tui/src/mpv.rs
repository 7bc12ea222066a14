/// mpv IPC driver with separated reader/writer tasks.
///
/// Architecture:
///
/// ```text
///   MpvMedia (MediaElement)
///     └── MpvDriver::spawn_and_connect()
///           ├── writer_task   ← receives PendingRequest via mpsc, serialises → socket
///           └── reader_task   ← reads JSON lines from socket
///                                  ├── response (has request_id) → matched oneshot::Sender
///                                  └── event / property-change   → translate_event → MediaEvent
/// ```
///
/// Platform notes:
/// - Unix:   Unix domain sockets
/// - Windows: Named pipes  \\.\pipe\<name>
use async_trait::async_trait;
use dirplay_proto::config::MpvConfig;
use dirplay_proto::protocol::MediaHealth;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

use crate::media::{MediaElement, MediaEvent};

#[cfg(unix)]
use tokio::net::UnixStream;

#[cfg(windows)]
use tokio::net::windows::named_pipe::ClientOptions;

// ── global request-id counter ─────────────────────────────────────────────────

static NEXT_REQ_ID: AtomicU64 = AtomicU64::new(1);

// ── observation property IDs ──────────────────────────────────────────────────

/// Fixed observe_property IDs.  We match on these in property-change events.
pub const OBS_PAUSE: u64 = 1;
pub const OBS_TIME_POS: u64 = 2;
pub const OBS_DURATION: u64 = 3;
pub const OBS_VOLUME: u64 = 4;
pub const OBS_MUTE: u64 = 5;

const IPC_TIMEOUT_SECS: u64 = 5;

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<anyhow::Result<Value>>>>>;

// ── internal channel types ────────────────────────────────────────────────────

struct PendingRequest {
    req_id: u64,
    payload: String, // serialised JSON line (already has '\n')
    reply: oneshot::Sender<anyhow::Result<Value>>,
}

/// An mpv event / property-change that arrived unsolicited (no request_id).
#[derive(Debug, Clone)]
pub struct MpvEvent {
    pub raw: Value,
}

impl MpvEvent {
    /// Returns `Some((obs_id, data))` if this is a property-change event.
    pub fn as_property_change(&self) -> Option<(u64, &Value)> {
        if self.raw.get("event")?.as_str()? == "property-change" {
            let id = self.raw.get("id")?.as_u64()?;
            let data = self.raw.get("data").unwrap_or(&Value::Null);
            Some((id, data))
        } else {
            None
        }
    }

    /// Returns the event name, e.g. "end-file", "start-file", "file-loaded".
    pub fn event_name(&self) -> Option<&str> {
        self.raw.get("event")?.as_str()
    }
}

/// Map a raw mpv notification onto the media-element vocabulary.
///
/// `end-file` only matters for `eof` (advance) and `error`; `stop` and
/// `redirect` come from our own `loadfile … replace`.
pub fn translate_event(evt: &MpvEvent) -> Option<MediaEvent> {
    if let Some((obs_id, data)) = evt.as_property_change() {
        return match obs_id {
            OBS_PAUSE => data.as_bool().map(MediaEvent::Paused),
            OBS_TIME_POS => Some(MediaEvent::TimeUpdate(data.as_f64())),
            OBS_DURATION => Some(MediaEvent::DurationChange(data.as_f64())),
            OBS_VOLUME => data
                .as_f64()
                .map(|v| MediaEvent::VolumeChange((v / 100.0).clamp(0.0, 1.0) as f32)),
            OBS_MUTE => data.as_bool().map(MediaEvent::MuteChange),
            _ => None,
        };
    }

    match evt.event_name()? {
        "end-file" => {
            let reason = evt
                .raw
                .get("reason")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            match reason {
                "eof" => Some(MediaEvent::Ended),
                "error" => {
                    let detail = evt
                        .raw
                        .get("file_error")
                        .and_then(Value::as_str)
                        .unwrap_or("playback error");
                    Some(MediaEvent::Error(detail.to_string()))
                }
                _ => None,
            }
        }
        _ => None,
    }
}

// ── public handle ─────────────────────────────────────────────────────────────

/// Cloneable handle to the mpv writer task.  Use `send()` to fire a command
/// and await the response.
#[derive(Clone)]
pub struct MpvHandle {
    tx: mpsc::Sender<PendingRequest>,
}

impl MpvHandle {
    pub async fn send(&self, command: Value) -> anyhow::Result<Value> {
        let req_id = NEXT_REQ_ID.fetch_add(1, Ordering::Relaxed);
        let msg = json!({ "command": command, "request_id": req_id });
        let mut raw = serde_json::to_string(&msg)?;
        raw.push('\n');

        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(PendingRequest {
                req_id,
                payload: raw,
                reply: reply_tx,
            })
            .await
            .map_err(|_| anyhow::anyhow!("mpv writer task gone"))?;

        tokio::time::timeout(tokio::time::Duration::from_secs(IPC_TIMEOUT_SECS), reply_rx)
            .await
            .map_err(|_| anyhow::anyhow!("mpv IPC timeout for req={}", req_id))?
            .map_err(|_| anyhow::anyhow!("mpv reply channel dropped req={}", req_id))?
    }
}

// ── driver ────────────────────────────────────────────────────────────────────

/// Owns the mpv child process.
pub struct MpvDriver {
    pub socket_name: String,
    binary_override: Option<PathBuf>,
    process: Option<tokio::process::Child>,
    /// Carried into the command line of the next spawn.
    pub last_volume: f32,
    pub last_muted: bool,
}

impl MpvDriver {
    pub fn new(binary_override: Option<PathBuf>, volume: f32) -> Self {
        Self {
            socket_name: dirplay_proto::platform::mpv_socket_name(),
            binary_override,
            process: None,
            last_volume: volume.clamp(0.0, 1.0),
            last_muted: false,
        }
    }

    pub fn process_alive(&mut self) -> bool {
        if let Some(ref mut child) = self.process {
            match child.try_wait() {
                Ok(None) => true,
                Ok(Some(status)) => {
                    if let Some(code) = status.code() {
                        warn!("mpv process exited with code: {}", code);
                    } else {
                        warn!("mpv process terminated by signal");
                    }
                    false
                }
                Err(e) => {
                    warn!("mpv process_alive check failed: {}", e);
                    false
                }
            }
        } else {
            false
        }
    }

    /// Kill the process if running.
    pub async fn kill(&mut self) {
        if let Some(mut p) = self.process.take() {
            let _ = p.kill().await;
        }
    }

    fn command(&self) -> anyhow::Result<tokio::process::Command> {
        let mpv_binary =
            dirplay_proto::platform::find_mpv_binary(self.binary_override.as_deref())
                .ok_or_else(|| anyhow::anyhow!("mpv binary not found"))?;

        let vol_arg = format!(
            "--volume={}",
            (self.last_volume * 100.0).clamp(0.0, 100.0).round() as i64
        );
        let mute_arg = format!("--mute={}", if self.last_muted { "yes" } else { "no" });

        let mut cmd = tokio::process::Command::new(mpv_binary);
        cmd.arg("--no-video")
            .arg("--idle=yes")
            .arg("--pause")
            .arg(dirplay_proto::platform::mpv_socket_arg())
            .arg("--quiet")
            .arg(vol_arg)
            .arg(mute_arg)
            .stdout(std::process::Stdio::null())
            .kill_on_drop(true);
        Ok(cmd)
    }

    // ── spawn ─────────────────────────────────────────────────────────────────

    #[cfg(unix)]
    pub async fn spawn_and_connect(
        &mut self,
        event_tx: mpsc::Sender<MpvEvent>,
    ) -> anyhow::Result<MpvHandle> {
        if let Some(mut p) = self.process.take() {
            let _ = p.kill().await;
        }

        let socket_path = PathBuf::from(&self.socket_name);
        let _ = tokio::fs::remove_file(&socket_path).await;

        info!("mpv: spawning new process");
        let mut cmd = self.command()?;

        let stderr_path = dirplay_proto::platform::data_dir().join("mpv-stderr.log");
        let stderr_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&stderr_path)?;
        info!("mpv: logging stderr to {:?}", stderr_path);

        let child = cmd.stderr(stderr_file).spawn()?;
        info!("mpv: spawned process with pid {:?}", child.id());
        self.process = Some(child);

        for _ in 0..50 {
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            if socket_path.exists() {
                break;
            }
        }
        if !socket_path.exists() {
            anyhow::bail!("mpv IPC socket did not appear");
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

        let stream = UnixStream::connect(&socket_path).await?;
        info!("mpv: connected to IPC socket");
        let (read_half, write_half) = stream.into_split();
        Ok(start_io_tasks(BufReader::new(read_half), write_half, event_tx))
    }

    #[cfg(windows)]
    pub async fn spawn_and_connect(
        &mut self,
        event_tx: mpsc::Sender<MpvEvent>,
    ) -> anyhow::Result<MpvHandle> {
        if let Some(mut p) = self.process.take() {
            let _ = p.kill().await;
        }

        info!("mpv: spawning new process");
        let child = self
            .command()?
            .stderr(std::process::Stdio::null())
            .spawn()?;
        self.process = Some(child);

        let pipe_path = format!(r"\\.\pipe\{}", self.socket_name);
        for _ in 0..50 {
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            if let Ok(client) = ClientOptions::new().open(&pipe_path) {
                info!("mpv: connected to named pipe");
                let (read_half, write_half) = tokio::io::split(client);
                return Ok(start_io_tasks(BufReader::new(read_half), write_half, event_tx));
            }
        }
        anyhow::bail!("mpv named pipe did not appear")
    }
}

fn start_io_tasks<R, W>(
    reader: BufReader<R>,
    writer: W,
    event_tx: mpsc::Sender<MpvEvent>,
) -> MpvHandle
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
    W: tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    // req_id → reply channel, shared between writer (inserts) and reader (resolves).
    let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
    let (cmd_tx, cmd_rx) = mpsc::channel::<PendingRequest>(64);

    tokio::spawn(writer_task(writer, cmd_rx, pending.clone()));
    tokio::spawn(reader_task(reader, pending, event_tx));

    MpvHandle { tx: cmd_tx }
}

// ── reader task ───────────────────────────────────────────────────────────────

async fn reader_task<R>(
    mut reader: BufReader<R>,
    pending: PendingMap,
    event_tx: mpsc::Sender<MpvEvent>,
) where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                debug!("mpv reader: connection closed");
                let mut map = pending.lock().await;
                for (_, tx) in map.drain() {
                    let _ = tx.send(Err(anyhow::anyhow!("mpv IPC connection closed")));
                }
                break;
            }
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let val: Value = match serde_json::from_str(trimmed) {
                    Ok(v) => v,
                    Err(e) => {
                        debug!("mpv reader: invalid json '{}': {}", trimmed, e);
                        continue;
                    }
                };

                if let Some(req_id) = val.get("request_id").and_then(|v| v.as_u64()) {
                    let mut map = pending.lock().await;
                    if let Some(tx) = map.remove(&req_id) {
                        let result = if val["error"].as_str() == Some("success") {
                            Ok(val)
                        } else {
                            let err = val["error"].as_str().unwrap_or("unknown error").to_string();
                            debug!("mpv reader: response req={} err={}", req_id, err);
                            Err(anyhow::anyhow!("mpv error: {}", err))
                        };
                        let _ = tx.send(result);
                    } else {
                        debug!("mpv reader: response for unknown req={}", req_id);
                    }
                } else {
                    // time-pos changes are far too chatty for the debug log
                    if val.get("id").and_then(Value::as_u64) != Some(OBS_TIME_POS) {
                        debug!("mpv reader: event {}", trimmed);
                    }
                    let _ = event_tx.send(MpvEvent { raw: val }).await;
                }
            }
            Err(e) => {
                warn!("mpv reader: read error: {}", e);
                let mut map = pending.lock().await;
                for (_, tx) in map.drain() {
                    let _ = tx.send(Err(anyhow::anyhow!("mpv IPC read error: {}", e)));
                }
                break;
            }
        }
    }
}

// ── writer task ───────────────────────────────────────────────────────────────

async fn writer_task<W>(mut writer: W, mut rx: mpsc::Receiver<PendingRequest>, pending: PendingMap)
where
    W: tokio::io::AsyncWrite + Unpin,
{
    while let Some(req) = rx.recv().await {
        // Register before writing so the reader can always match the reply.
        {
            let mut map = pending.lock().await;
            map.insert(req.req_id, req.reply);
        }
        debug!(
            "mpv writer: send req={} payload={}",
            req.req_id,
            req.payload.trim()
        );
        if let Err(e) = writer.write_all(req.payload.as_bytes()).await {
            warn!("mpv writer: write error: {}", e);
            let mut map = pending.lock().await;
            if let Some(tx) = map.remove(&req.req_id) {
                let _ = tx.send(Err(anyhow::anyhow!("mpv write error: {}", e)));
            }
            break;
        }
    }
    debug!("mpv writer: task exiting");
}

// ── convenience wrappers ──────────────────────────────────────────────────────

impl MpvHandle {
    pub async fn load_file(&self, url: &str) -> anyhow::Result<()> {
        debug!("mpv: loadfile {}", url);
        self.send(json!(["loadfile", url, "replace"])).await?;
        Ok(())
    }

    /// Replace the current source without letting it start. `pause` is a
    /// global property, so it has to be set before the file is swapped in.
    pub async fn load_paused(&self, url: &str) -> anyhow::Result<()> {
        self.set_pause(true).await?;
        self.load_file(url).await
    }

    pub async fn set_volume(&self, vol: f32) -> anyhow::Result<()> {
        let vol_pct = (vol * 100.0).clamp(0.0, 100.0);
        self.send(json!(["set_property", "volume", vol_pct])).await?;
        Ok(())
    }

    pub async fn set_mute(&self, muted: bool) -> anyhow::Result<()> {
        self.send(json!(["set_property", "mute", muted])).await?;
        Ok(())
    }

    pub async fn set_pause(&self, paused: bool) -> anyhow::Result<()> {
        self.send(json!(["set_property", "pause", paused])).await?;
        Ok(())
    }

    pub async fn get_pause(&self) -> anyhow::Result<bool> {
        let resp = self.send(json!(["get_property", "pause"])).await?;
        resp["data"]
            .as_bool()
            .ok_or_else(|| anyhow::anyhow!("mpv pause property is not a bool"))
    }

    pub async fn seek_to(&self, secs: f64) -> anyhow::Result<()> {
        self.send(json!(["set_property", "time-pos", secs])).await?;
        Ok(())
    }

    /// Register observe_property for everything the player mirrors.
    /// Must be called after every fresh connection.
    pub async fn observe_all_properties(&self) {
        let props = [
            (OBS_PAUSE, "pause"),
            (OBS_TIME_POS, "time-pos"),
            (OBS_DURATION, "duration"),
            (OBS_VOLUME, "volume"),
            (OBS_MUTE, "mute"),
        ];
        for (id, name) in &props {
            match self.send(json!(["observe_property", id, name])).await {
                Ok(_) => debug!("mpv: observe_property id={} name={}", id, name),
                Err(e) => warn!("mpv: observe_property {} failed: {}", name, e),
            }
        }
    }
}

// ── MediaElement over mpv ─────────────────────────────────────────────────────

/// The mpv process as the player's media element. Spawned on first load and
/// respawned on the next load after it dies.
pub struct MpvMedia {
    driver: MpvDriver,
    handle: Option<MpvHandle>,
    health: MediaHealth,
    media_tx: mpsc::Sender<MediaEvent>,
}

impl MpvMedia {
    pub fn new(config: &MpvConfig, media_tx: mpsc::Sender<MediaEvent>) -> Self {
        Self {
            driver: MpvDriver::new(config.binary_override(), config.default_volume),
            handle: None,
            health: MediaHealth::Absent,
            media_tx,
        }
    }

    fn drop_dead_handle(&mut self) {
        if self.handle.is_some() && !self.driver.process_alive() {
            warn!("mpv: process died, dropping handle");
            self.handle = None;
            self.health = MediaHealth::Dead;
        }
    }

    async fn ensure_handle(&mut self) -> anyhow::Result<MpvHandle> {
        self.drop_dead_handle();
        if let Some(handle) = &self.handle {
            return Ok(handle.clone());
        }

        // One forwarder per connection; it ends when the reader task drops its sender.
        let (event_tx, mut event_rx) = mpsc::channel::<MpvEvent>(64);
        let media_tx = self.media_tx.clone();
        tokio::spawn(async move {
            while let Some(evt) = event_rx.recv().await {
                if let Some(media_evt) = translate_event(&evt) {
                    if media_tx.send(media_evt).await.is_err() {
                        break;
                    }
                }
            }
        });

        self.health = MediaHealth::Starting;
        let handle = match self.driver.spawn_and_connect(event_tx).await {
            Ok(h) => h,
            Err(e) => {
                self.health = MediaHealth::Dead;
                return Err(e.context("failed to start mpv"));
            }
        };
        handle.observe_all_properties().await;
        self.health = MediaHealth::Running;
        self.handle = Some(handle.clone());
        Ok(handle)
    }

    fn live_handle(&mut self) -> Option<MpvHandle> {
        self.drop_dead_handle();
        self.handle.clone()
    }
}

#[async_trait]
impl MediaElement for MpvMedia {
    async fn load(&mut self, url: &str) -> anyhow::Result<()> {
        let handle = self.ensure_handle().await?;
        handle.load_paused(url).await
    }

    async fn play(&mut self) -> anyhow::Result<()> {
        match self.live_handle() {
            Some(handle) => handle.set_pause(false).await,
            None => anyhow::bail!("no media loaded"),
        }
    }

    async fn pause(&mut self) -> anyhow::Result<()> {
        match self.live_handle() {
            Some(handle) => handle.set_pause(true).await,
            None => Ok(()),
        }
    }

    async fn is_paused(&mut self) -> anyhow::Result<bool> {
        match self.live_handle() {
            Some(handle) => handle.get_pause().await,
            None => Ok(true),
        }
    }

    async fn seek_to(&mut self, secs: f64) -> anyhow::Result<()> {
        match self.live_handle() {
            Some(handle) => handle.seek_to(secs).await,
            None => anyhow::bail!("no media loaded"),
        }
    }

    async fn set_volume(&mut self, volume: f32) -> anyhow::Result<()> {
        self.driver.last_volume = volume.clamp(0.0, 1.0);
        match self.live_handle() {
            Some(handle) => handle.set_volume(volume).await,
            None => Ok(()),
        }
    }

    async fn set_muted(&mut self, muted: bool) -> anyhow::Result<()> {
        self.driver.last_muted = muted;
        match self.live_handle() {
            Some(handle) => handle.set_mute(muted).await,
            None => Ok(()),
        }
    }

    fn health(&self) -> MediaHealth {
        self.health.clone()
    }

    async fn check_alive(&mut self) {
        self.drop_dead_handle();
    }

    async fn shutdown(&mut self) {
        info!("mpv: shutting down");
        if let Some(handle) = self.handle.take() {
            let _ = handle.send(json!(["quit"])).await;
        }
        self.driver.kill().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evt(raw: Value) -> MpvEvent {
        MpvEvent { raw }
    }

    fn prop(id: u64, data: Value) -> MpvEvent {
        evt(json!({ "event": "property-change", "id": id, "name": "x", "data": data }))
    }

    #[test]
    fn property_changes_map_to_media_events() {
        assert_eq!(
            translate_event(&prop(OBS_PAUSE, json!(false))),
            Some(MediaEvent::Paused(false))
        );
        assert_eq!(
            translate_event(&prop(OBS_TIME_POS, json!(12.5))),
            Some(MediaEvent::TimeUpdate(Some(12.5)))
        );
        assert_eq!(
            translate_event(&prop(OBS_DURATION, Value::Null)),
            Some(MediaEvent::DurationChange(None))
        );
        assert_eq!(
            translate_event(&prop(OBS_VOLUME, json!(130.0))),
            Some(MediaEvent::VolumeChange(1.0))
        );
        assert_eq!(
            translate_event(&prop(OBS_VOLUME, json!(40.0))),
            Some(MediaEvent::VolumeChange(0.4))
        );
        assert_eq!(
            translate_event(&prop(OBS_MUTE, json!(true))),
            Some(MediaEvent::MuteChange(true))
        );
        assert_eq!(translate_event(&prop(99, json!(1))), None);
    }

    #[test]
    fn property_change_without_data_is_unknown() {
        let raw = evt(json!({ "event": "property-change", "id": OBS_TIME_POS, "name": "time-pos" }));
        assert_eq!(translate_event(&raw), Some(MediaEvent::TimeUpdate(None)));
    }

    #[test]
    fn only_eof_and_error_end_files_matter() {
        assert_eq!(
            translate_event(&evt(json!({ "event": "end-file", "reason": "eof" }))),
            Some(MediaEvent::Ended)
        );
        assert_eq!(
            translate_event(&evt(json!({
                "event": "end-file",
                "reason": "error",
                "file_error": "loading failed"
            }))),
            Some(MediaEvent::Error("loading failed".into()))
        );
        assert_eq!(
            translate_event(&evt(json!({ "event": "end-file", "reason": "stop" }))),
            None
        );
        assert_eq!(translate_event(&evt(json!({ "event": "file-loaded" }))), None);
    }

    #[tokio::test]
    async fn handle_matches_replies_and_forwards_events() {
        let (client, server) = tokio::io::duplex(4096);
        let (client_read, client_write) = tokio::io::split(client);
        let (event_tx, mut event_rx) = mpsc::channel(8);
        let handle = start_io_tasks(BufReader::new(client_read), client_write, event_tx);

        // Fake mpv: echo a success for every request, preceded by an event.
        tokio::spawn(async move {
            let (server_read, mut server_write) = tokio::io::split(server);
            let mut lines = BufReader::new(server_read).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let req: Value = serde_json::from_str(&line).unwrap();
                let reply = json!({ "request_id": req["request_id"], "error": "success", "data": true });
                let event = json!({ "event": "end-file", "reason": "eof" });
                let out = format!("{event}\n{reply}\n");
                server_write.write_all(out.as_bytes()).await.unwrap();
            }
        });

        assert!(handle.get_pause().await.unwrap());
        let forwarded = event_rx.recv().await.unwrap();
        assert_eq!(translate_event(&forwarded), Some(MediaEvent::Ended));
    }

    #[tokio::test]
    async fn mpv_error_replies_become_errors() {
        let (client, server) = tokio::io::duplex(4096);
        let (client_read, client_write) = tokio::io::split(client);
        let (event_tx, _event_rx) = mpsc::channel(8);
        let handle = start_io_tasks(BufReader::new(client_read), client_write, event_tx);

        tokio::spawn(async move {
            let (server_read, mut server_write) = tokio::io::split(server);
            let mut lines = BufReader::new(server_read).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let req: Value = serde_json::from_str(&line).unwrap();
                let reply = json!({ "request_id": req["request_id"], "error": "property unavailable" });
                server_write
                    .write_all(format!("{reply}\n").as_bytes())
                    .await
                    .unwrap();
            }
        });

        let err = handle.seek_to(10.0).await.unwrap_err();
        assert!(err.to_string().contains("property unavailable"));
    }

    #[tokio::test]
    async fn load_paused_pauses_before_replacing_the_source() {
        let (client, server) = tokio::io::duplex(4096);
        let (client_read, client_write) = tokio::io::split(client);
        let (event_tx, _event_rx) = mpsc::channel(8);
        let handle = start_io_tasks(BufReader::new(client_read), client_write, event_tx);

        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel::<Value>();
        tokio::spawn(async move {
            let (server_read, mut server_write) = tokio::io::split(server);
            let mut lines = BufReader::new(server_read).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let req: Value = serde_json::from_str(&line).unwrap();
                let reply = json!({ "request_id": req["request_id"], "error": "success" });
                seen_tx.send(req["command"].clone()).unwrap();
                server_write
                    .write_all(format!("{reply}\n").as_bytes())
                    .await
                    .unwrap();
            }
        });

        handle.load_paused("http://host/music/a/b.mp3").await.unwrap();
        assert_eq!(
            seen_rx.recv().await.unwrap(),
            json!(["set_property", "pause", true])
        );
        assert_eq!(
            seen_rx.recv().await.unwrap(),
            json!(["loadfile", "http://host/music/a/b.mp3", "replace"])
        );
    }

    #[tokio::test]
    async fn failed_pause_leaves_the_source_alone() {
        let (client, server) = tokio::io::duplex(4096);
        let (client_read, client_write) = tokio::io::split(client);
        let (event_tx, _event_rx) = mpsc::channel(8);
        let handle = start_io_tasks(BufReader::new(client_read), client_write, event_tx);

        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel::<Value>();
        tokio::spawn(async move {
            let (server_read, mut server_write) = tokio::io::split(server);
            let mut lines = BufReader::new(server_read).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let req: Value = serde_json::from_str(&line).unwrap();
                let reply = json!({ "request_id": req["request_id"], "error": "property unavailable" });
                seen_tx.send(req["command"].clone()).unwrap();
                server_write
                    .write_all(format!("{reply}\n").as_bytes())
                    .await
                    .unwrap();
            }
        });

        assert!(handle.load_paused("http://host/x.mp3").await.is_err());
        assert_eq!(
            seen_rx.recv().await.unwrap(),
            json!(["set_property", "pause", true])
        );
        assert!(seen_rx.try_recv().is_err());
    }
}
