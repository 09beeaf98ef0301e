use serde::Serialize;

use crate::player::types::{
    PlayerData, PlayerState, Quality, TextCue, TextMetadataCue, VideoData,
};

/// Every event a player instance can emit, as one tagged union.
///
/// The controller pushes these onto the [`EventBus`](super::EventBus) and the
/// application drains them; delivery order per player instance follows
/// emission order. Time-valued payload fields are seconds, regardless of the
/// engine's native units.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PlayerEvent {
    /// A stream load has begun.
    LoadStart,
    /// The player reached Ready for the current load.
    Load { duration: Option<f64> },
    /// Available renditions plus engine version and session id, once per load.
    Data(PlayerData),
    /// Any state transition.
    PlayerStateChange { state: PlayerState },
    DurationChange { duration: Option<f64> },
    QualityChange { quality: Option<Quality> },
    /// Buffering began.
    Rebuffering,
    /// Periodic position report while Playing.
    Progress { progress: f64 },
    /// A seek completed at the given position.
    Seek { position: f64 },
    /// Playback crossed a configured breakpoint position.
    TimePoint { position: f64 },
    Error { error: String },
    TextCue(TextCue),
    TextMetadataCue(TextMetadataCue),
    PipChange { is_active: bool },
    VideoStatistics(VideoData),
    /// Live-edge latency report, in seconds.
    LiveLatencyChange { latency: f64 },
}

impl PlayerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            PlayerEvent::LoadStart => EventKind::LoadStart,
            PlayerEvent::Load { .. } => EventKind::Load,
            PlayerEvent::Data(_) => EventKind::Data,
            PlayerEvent::PlayerStateChange { .. } => EventKind::PlayerStateChange,
            PlayerEvent::DurationChange { .. } => EventKind::DurationChange,
            PlayerEvent::QualityChange { .. } => EventKind::QualityChange,
            PlayerEvent::Rebuffering => EventKind::Rebuffering,
            PlayerEvent::Progress { .. } => EventKind::Progress,
            PlayerEvent::Seek { .. } => EventKind::Seek,
            PlayerEvent::TimePoint { .. } => EventKind::TimePoint,
            PlayerEvent::Error { .. } => EventKind::Error,
            PlayerEvent::TextCue(_) => EventKind::TextCue,
            PlayerEvent::TextMetadataCue(_) => EventKind::TextMetadataCue,
            PlayerEvent::PipChange { .. } => EventKind::PipChange,
            PlayerEvent::VideoStatistics(_) => EventKind::VideoStatistics,
            PlayerEvent::LiveLatencyChange { .. } => EventKind::LiveLatencyChange,
        }
    }
}

/// Discriminant of [`PlayerEvent`], for filtering and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    LoadStart,
    Load,
    Data,
    PlayerStateChange,
    DurationChange,
    QualityChange,
    Rebuffering,
    Progress,
    Seek,
    TimePoint,
    Error,
    TextCue,
    TextMetadataCue,
    PipChange,
    VideoStatistics,
    LiveLatencyChange,
}

impl EventKind {
    /// The callback name a host-facing binding would dispatch this event as.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::LoadStart => "onLoadStart",
            EventKind::Load => "onLoad",
            EventKind::Data => "onData",
            EventKind::PlayerStateChange => "onPlayerStateChange",
            EventKind::DurationChange => "onDurationChange",
            EventKind::QualityChange => "onQualityChange",
            EventKind::Rebuffering => "onRebuffering",
            EventKind::Progress => "onProgress",
            EventKind::Seek => "onSeek",
            EventKind::TimePoint => "onTimePoint",
            EventKind::Error => "onError",
            EventKind::TextCue => "onTextCue",
            EventKind::TextMetadataCue => "onTextMetadataCue",
            EventKind::PipChange => "onPipChange",
            EventKind::VideoStatistics => "onVideoStatistics",
            EventKind::LiveLatencyChange => "onLiveLatencyChange",
        }
    }
}
