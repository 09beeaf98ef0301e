#![cfg(test)]

use std::sync::Once;

/// Opt-in tracing output for debugging tests (RUST_LOG=ivs_player=trace).
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Let the controller task drain everything queued on its channels.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Scripted engine for driving the controller in tests.
pub mod fake_backend {
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;
    use url::Url;

    use crate::player::backend::{
        BackendEvent, BackendEventSender, Capabilities, PlayerBackend,
    };
    use crate::player::error::PlayerError;
    use crate::player::types::{LogLevel, Quality, ResizeMode};

    /// Everything the controller asked the engine to do, in order.
    #[derive(Debug, Clone, PartialEq)]
    pub enum BackendCall {
        Load(String),
        Play,
        Pause,
        SeekTo(i64),
        SetMuted(bool),
        SetVolume(f32),
        SetPlaybackRate(f32),
        SetLiveLowLatency(bool),
        SetRebufferToLive(bool),
        SetResizeMode(ResizeMode),
        SetLogLevel(LogLevel),
        SetMaxBitrate(u64),
        SetInitialBufferDuration(f64),
        SetAutoQualityMode(bool),
        SetQuality(Option<Quality>),
        SetAutoMaxQuality(Option<Quality>),
        TogglePip,
        Release,
    }

    struct FakeInner {
        events: BackendEventSender,
        calls: Mutex<Vec<BackendCall>>,
        position_ms: AtomicI64,
        duration_ms: AtomicI64,
        qualities: Mutex<Vec<Quality>>,
        fail_next_load: Mutex<Option<PlayerError>>,
        pip: bool,
    }

    /// A [`PlayerBackend`] that records every call and lets the test inject
    /// engine callbacks through [`driver`](FakeBackend::driver).
    ///
    /// State transitions are never emitted on its own; tests script them.
    /// The one exception is seeks, which auto-confirm at the requested
    /// position the way a real engine reports completion.
    #[derive(Clone)]
    pub struct FakeBackend {
        inner: Arc<FakeInner>,
    }

    impl FakeBackend {
        pub fn new() -> (Self, mpsc::UnboundedReceiver<BackendEvent>) {
            Self::with_pip(false)
        }

        pub fn with_pip(pip: bool) -> (Self, mpsc::UnboundedReceiver<BackendEvent>) {
            let (tx, rx) = mpsc::unbounded_channel();
            let backend = Self {
                inner: Arc::new(FakeInner {
                    events: tx,
                    calls: Mutex::new(Vec::new()),
                    position_ms: AtomicI64::new(0),
                    duration_ms: AtomicI64::new(-1),
                    qualities: Mutex::new(Vec::new()),
                    fail_next_load: Mutex::new(None),
                    pip,
                }),
            };
            (backend, rx)
        }

        /// Sender for injecting engine callbacks into the controller.
        pub fn driver(&self) -> BackendEventSender {
            self.inner.events.clone()
        }

        pub fn calls(&self) -> Vec<BackendCall> {
            self.inner.calls.lock().unwrap().clone()
        }

        pub fn release_count(&self) -> usize {
            self.calls()
                .iter()
                .filter(|call| **call == BackendCall::Release)
                .count()
        }

        pub fn set_position_ms(&self, position_ms: i64) {
            self.inner.position_ms.store(position_ms, Ordering::Relaxed);
        }

        pub fn set_duration_ms(&self, duration_ms: i64) {
            self.inner.duration_ms.store(duration_ms, Ordering::Relaxed);
        }

        pub fn set_qualities(&self, qualities: Vec<Quality>) {
            *self.inner.qualities.lock().unwrap() = qualities;
        }

        pub fn fail_next_load(&self, err: PlayerError) {
            *self.inner.fail_next_load.lock().unwrap() = Some(err);
        }

        fn record(&self, call: BackendCall) {
            self.inner.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl PlayerBackend for FakeBackend {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities {
                pip: self.inner.pip,
            }
        }

        async fn load(&self, url: &Url) -> Result<(), PlayerError> {
            self.record(BackendCall::Load(url.to_string()));
            match self.inner.fail_next_load.lock().unwrap().take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }

        async fn play(&self) {
            self.record(BackendCall::Play);
        }

        async fn pause(&self) {
            self.record(BackendCall::Pause);
        }

        async fn seek_to(&self, position_ms: i64) {
            self.record(BackendCall::SeekTo(position_ms));
            self.inner.position_ms.store(position_ms, Ordering::Relaxed);
            let _ = self
                .inner
                .events
                .send(BackendEvent::SeekCompleted { position_ms });
        }

        async fn position_ms(&self) -> i64 {
            self.inner.position_ms.load(Ordering::Relaxed)
        }

        async fn duration_ms(&self) -> i64 {
            self.inner.duration_ms.load(Ordering::Relaxed)
        }

        async fn qualities(&self) -> Vec<Quality> {
            self.inner.qualities.lock().unwrap().clone()
        }

        async fn version(&self) -> String {
            "fake/1.0.0".to_string()
        }

        async fn session_id(&self) -> String {
            "fake-session".to_string()
        }

        async fn set_muted(&self, muted: bool) {
            self.record(BackendCall::SetMuted(muted));
        }

        async fn set_volume(&self, volume: f32) {
            self.record(BackendCall::SetVolume(volume));
        }

        async fn set_playback_rate(&self, rate: f32) {
            self.record(BackendCall::SetPlaybackRate(rate));
        }

        async fn set_live_low_latency(&self, enabled: bool) {
            self.record(BackendCall::SetLiveLowLatency(enabled));
        }

        async fn set_rebuffer_to_live(&self, enabled: bool) {
            self.record(BackendCall::SetRebufferToLive(enabled));
        }

        async fn set_resize_mode(&self, mode: ResizeMode) {
            self.record(BackendCall::SetResizeMode(mode));
        }

        async fn set_log_level(&self, level: LogLevel) {
            self.record(BackendCall::SetLogLevel(level));
        }

        async fn set_max_bitrate(&self, bitrate: u64) {
            self.record(BackendCall::SetMaxBitrate(bitrate));
        }

        async fn set_initial_buffer_duration(&self, seconds: f64) {
            self.record(BackendCall::SetInitialBufferDuration(seconds));
        }

        async fn set_auto_quality_mode(&self, enabled: bool) {
            self.record(BackendCall::SetAutoQualityMode(enabled));
        }

        async fn set_quality(&self, quality: Option<Quality>) {
            self.record(BackendCall::SetQuality(quality));
        }

        async fn set_auto_max_quality(&self, quality: Option<Quality>) {
            self.record(BackendCall::SetAutoMaxQuality(quality));
        }

        async fn toggle_pip(&self) {
            self.record(BackendCall::TogglePip);
        }

        async fn release(&self) {
            self.record(BackendCall::Release);
        }
    }
}
