use async_trait::async_trait;
use tokio::sync::mpsc;
use url::Url;

use super::error::PlayerError;
use super::types::{LogLevel, PlayerState, Quality, ResizeMode, TextCue, TextMetadataCue};

/// What a backend can actually do, beyond the uniform contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct Capabilities {
    /// Whether the engine drives a real picture-in-picture controller.
    pub pip: bool,
}

/// A callback from the playback engine, in the engine's own conventions.
///
/// Time values are milliseconds here; the controller converts to seconds
/// before anything reaches the event bus. A negative duration means the
/// engine does not know it (live streams).
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    StateChanged(PlayerState),
    DurationChanged { duration_ms: i64 },
    QualityChanged { quality: Option<Quality> },
    SeekCompleted { position_ms: i64 },
    Rebuffering,
    TextCue(TextCue),
    TextMetadataCue(TextMetadataCue),
    VideoStatistics {
        bitrate: u64,
        duration_ms: Option<i64>,
        frames_decoded: Option<u64>,
        frames_dropped: Option<u64>,
    },
    LiveLatencyChanged { latency_ms: i64 },
    PipChanged { is_active: bool },
    Error(PlayerError),
}

/// Channel a backend pushes its callbacks into. The controller owns the
/// receiving end and re-marshals every callback before it becomes a
/// [`PlayerEvent`](crate::events::PlayerEvent).
pub type BackendEventSender = mpsc::UnboundedSender<BackendEvent>;

/// The engine boundary. One instance per controller; the engine's own
/// threads stay behind this trait and talk back through [`BackendEvent`].
#[async_trait]
pub trait PlayerBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn capabilities(&self) -> Capabilities;

    /// Begin loading the given stream. The caller has already validated the
    /// URL; failures the engine reports asynchronously arrive as
    /// [`BackendEvent::Error`].
    async fn load(&self, url: &Url) -> Result<(), PlayerError>;

    async fn play(&self);

    async fn pause(&self);

    /// Seek to a position in engine time units. Completion is reported via
    /// [`BackendEvent::SeekCompleted`].
    async fn seek_to(&self, position_ms: i64);

    /// Current playhead position in engine time units.
    async fn position_ms(&self) -> i64;

    /// Stream duration in engine time units; negative when unknown.
    async fn duration_ms(&self) -> i64;

    async fn qualities(&self) -> Vec<Quality>;

    async fn version(&self) -> String;

    async fn session_id(&self) -> String;

    async fn set_muted(&self, muted: bool);

    async fn set_volume(&self, volume: f32);

    async fn set_playback_rate(&self, rate: f32);

    async fn set_live_low_latency(&self, enabled: bool);

    async fn set_rebuffer_to_live(&self, enabled: bool);

    async fn set_resize_mode(&self, mode: ResizeMode);

    async fn set_log_level(&self, level: LogLevel);

    /// Bitrate ceiling in bits per second; 0 means unbounded.
    async fn set_max_bitrate(&self, bitrate: u64);

    async fn set_initial_buffer_duration(&self, seconds: f64);

    async fn set_auto_quality_mode(&self, enabled: bool);

    /// Manually pin a rendition; `None` returns control to the engine.
    async fn set_quality(&self, quality: Option<Quality>);

    /// Upper bound for automatic rendition selection.
    async fn set_auto_max_quality(&self, quality: Option<Quality>);

    /// Toggle picture-in-picture. Only called when [`Capabilities::pip`] is
    /// set; resulting transitions arrive as [`BackendEvent::PipChanged`].
    async fn toggle_pip(&self);

    /// Release the engine instance. Called exactly once, after the last
    /// command has been processed.
    async fn release(&self);
}
