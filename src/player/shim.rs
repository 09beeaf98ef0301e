use async_trait::async_trait;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use super::backend::{BackendEvent, BackendEventSender, Capabilities, PlayerBackend};
use super::error::PlayerError;
use super::types::{LogLevel, PlayerState, Quality, ResizeMode};

/// Fallback backend for hosts without a real playback engine.
///
/// Satisfies the full property and command contract: loads acknowledge with
/// a Ready transition, play/pause drive the state machine, seeks confirm at
/// the requested position. Nothing actually plays, no renditions are
/// reported, and duration stays unknown.
pub struct ShimBackend {
    events: BackendEventSender,
    session_id: String,
    state: Mutex<ShimState>,
}

#[derive(Debug, Default)]
struct ShimState {
    url: Option<String>,
    position_ms: i64,
    released: bool,
}

impl ShimBackend {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BackendEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let backend = Self {
            events: tx,
            session_id: Uuid::new_v4().to_string(),
            state: Mutex::new(ShimState::default()),
        };
        (backend, rx)
    }

    fn emit(&self, event: BackendEvent) {
        if self.events.send(event).is_err() {
            debug!("Shim backend event dropped; controller is gone");
        }
    }

    fn is_released(&self) -> bool {
        let released = self.state.lock().unwrap().released;
        if released {
            warn!("Shim backend called after release");
        }
        released
    }
}

#[async_trait]
impl PlayerBackend for ShimBackend {
    fn name(&self) -> &'static str {
        "shim"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities { pip: false }
    }

    async fn load(&self, url: &Url) -> Result<(), PlayerError> {
        if self.is_released() {
            return Ok(());
        }
        self.state.lock().unwrap().url = Some(url.to_string());
        // No engine to wait for; a load is immediately Ready.
        self.emit(BackendEvent::StateChanged(PlayerState::Ready));
        Ok(())
    }

    async fn play(&self) {
        if self.is_released() {
            return;
        }
        self.emit(BackendEvent::StateChanged(PlayerState::Playing));
    }

    async fn pause(&self) {
        if self.is_released() {
            return;
        }
        self.emit(BackendEvent::StateChanged(PlayerState::Idle));
    }

    async fn seek_to(&self, position_ms: i64) {
        if self.is_released() {
            return;
        }
        self.state.lock().unwrap().position_ms = position_ms;
        self.emit(BackendEvent::SeekCompleted { position_ms });
    }

    async fn position_ms(&self) -> i64 {
        self.state.lock().unwrap().position_ms
    }

    async fn duration_ms(&self) -> i64 {
        -1
    }

    async fn qualities(&self) -> Vec<Quality> {
        Vec::new()
    }

    async fn version(&self) -> String {
        concat!("shim/", env!("CARGO_PKG_VERSION")).to_string()
    }

    async fn session_id(&self) -> String {
        self.session_id.clone()
    }

    async fn set_muted(&self, _muted: bool) {}

    async fn set_volume(&self, _volume: f32) {}

    async fn set_playback_rate(&self, _rate: f32) {}

    async fn set_live_low_latency(&self, _enabled: bool) {}

    async fn set_rebuffer_to_live(&self, _enabled: bool) {}

    async fn set_resize_mode(&self, _mode: ResizeMode) {}

    async fn set_log_level(&self, _level: LogLevel) {}

    async fn set_max_bitrate(&self, _bitrate: u64) {}

    async fn set_initial_buffer_duration(&self, _seconds: f64) {}

    async fn set_auto_quality_mode(&self, _enabled: bool) {}

    async fn set_quality(&self, _quality: Option<Quality>) {}

    async fn set_auto_max_quality(&self, _quality: Option<Quality>) {}

    async fn toggle_pip(&self) {
        // Unreachable through the controller: capabilities().pip is false.
    }

    async fn release(&self) {
        self.state.lock().unwrap().released = true;
    }
}
