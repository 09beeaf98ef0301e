/// Common types shared by the player facade, the controller, and backend
/// adapters. All of these are plain values; the serde renames keep the
/// field names stable across the serialization boundary.
use serde::{Deserialize, Serialize};

/// One selectable encoded rendition of a stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quality {
    pub name: String,
    pub codecs: String,
    /// Bits per second.
    pub bitrate: u64,
    pub framerate: f32,
    pub width: u32,
    pub height: u32,
}

/// Stream-level data reported once per successful load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerData {
    pub qualities: Vec<Quality>,
    pub version: String,
    pub session_id: String,
}

/// Periodic playback statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoData {
    pub bitrate: u64,
    pub duration: Option<f64>,
    pub frames_decoded: Option<u64>,
    pub frames_dropped: Option<u64>,
}

/// A timed caption cue decoded from the stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextCue {
    #[serde(rename = "type")]
    pub cue_type: String,
    pub text: String,
    pub line: f32,
    pub size: f32,
    pub position: f32,
    pub text_alignment: String,
}

/// A timed metadata cue decoded from the stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMetadataCue {
    #[serde(rename = "type")]
    pub cue_type: String,
    pub text: String,
    pub text_description: String,
}

/// A preloaded, not-yet-active stream reference.
///
/// Obtained from [`PlayerHandle::preload`](crate::player::PlayerHandle::preload).
/// Carries only the identifier and the URL; playback state never lives here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub(crate) id: u64,
    pub(crate) url: String,
}

impl Source {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Playback state as reported by the engine. Transitions are relayed, never
/// synthesized here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Idle,
    Ready,
    Buffering,
    Playing,
    Ended,
}

/// Engine log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogLevel {
    #[serde(rename = "IVSLogLevelDebug")]
    Debug,
    #[serde(rename = "IVSLogLevelInfo")]
    Info,
    #[serde(rename = "IVSLogLevelWarning")]
    Warning,
    #[default]
    #[serde(rename = "IVSLogLevelError")]
    Error,
}

/// How the video is fitted into its surface. Maps to the engine's native
/// scale/gravity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResizeMode {
    AspectFill,
    #[default]
    AspectFit,
    AspectZoom,
}
