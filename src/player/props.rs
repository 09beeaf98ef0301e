use serde::{Deserialize, Serialize};

use super::types::{LogLevel, Quality, ResizeMode};

/// The declarative property surface.
///
/// Every field is a one-way binding from the application to the player;
/// applying the same value twice is a no-op. The controller diffs an
/// incoming set against the previously applied one and only performs the
/// side effects of changed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProps {
    /// Setting this triggers a load sequence.
    #[serde(default)]
    pub stream_url: Option<String>,

    /// Toggles an immediate play or pause call.
    #[serde(default)]
    pub paused: bool,

    #[serde(default)]
    pub muted: bool,

    /// 0.0 to 1.0.
    #[serde(default = "default_volume")]
    pub volume: f32,

    #[serde(default = "default_playback_rate")]
    pub playback_rate: f32,

    /// Consulted when the player reaches Ready.
    #[serde(default)]
    pub autoplay: bool,

    /// Consulted when the player reaches Ended.
    #[serde(default, rename = "loop")]
    pub loop_playback: bool,

    #[serde(default = "default_true")]
    pub live_low_latency: bool,

    #[serde(default)]
    pub rebuffer_to_live: bool,

    /// Applied to the engine's scale mode immediately on change.
    #[serde(default)]
    pub resize_mode: ResizeMode,

    /// Cadence of Progress events while Playing, in seconds.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: f64,

    #[serde(default)]
    pub pip_enabled: bool,

    #[serde(default)]
    pub log_level: LogLevel,

    /// Bits per second; 0 means unbounded.
    #[serde(default)]
    pub max_bitrate: u64,

    /// Seconds of media buffered before playback starts.
    #[serde(default)]
    pub initial_buffer_duration: f64,

    #[serde(default = "default_true")]
    pub auto_quality_mode: bool,

    /// Manually pinned rendition; None leaves selection to the engine.
    #[serde(default)]
    pub quality: Option<Quality>,

    /// Ceiling for automatic rendition selection.
    #[serde(default)]
    pub auto_max_quality: Option<Quality>,

    /// Positions (seconds) that emit a TimePoint event when playback
    /// crosses them.
    #[serde(default)]
    pub breakpoints: Vec<f64>,
}

fn default_volume() -> f32 {
    1.0
}

fn default_playback_rate() -> f32 {
    1.0
}

fn default_progress_interval() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

impl Default for PlayerProps {
    fn default() -> Self {
        Self {
            stream_url: None,
            paused: false,
            muted: false,
            volume: default_volume(),
            playback_rate: default_playback_rate(),
            autoplay: false,
            loop_playback: false,
            live_low_latency: default_true(),
            rebuffer_to_live: false,
            resize_mode: ResizeMode::default(),
            progress_interval: default_progress_interval(),
            pip_enabled: false,
            log_level: LogLevel::default(),
            max_bitrate: 0,
            initial_buffer_duration: 0.0,
            auto_quality_mode: default_true(),
            quality: None,
            auto_max_quality: None,
            breakpoints: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_surface() {
        let props = PlayerProps::default();
        assert!(!props.paused);
        assert_eq!(props.volume, 1.0);
        assert_eq!(props.playback_rate, 1.0);
        assert!(props.live_low_latency);
        assert_eq!(props.resize_mode, ResizeMode::AspectFit);
        assert_eq!(props.progress_interval, 1.0);
        assert_eq!(props.log_level, LogLevel::Error);
        assert!(props.auto_quality_mode);
        assert_eq!(props.max_bitrate, 0);
    }

    #[test]
    fn deserializes_partial_props_with_defaults() {
        let props: PlayerProps = serde_json::from_str(
            r#"{"streamUrl": "https://example.com/live.m3u8", "loop": true}"#,
        )
        .unwrap();
        assert_eq!(
            props.stream_url.as_deref(),
            Some("https://example.com/live.m3u8")
        );
        assert!(props.loop_playback);
        assert_eq!(props.progress_interval, 1.0);
        assert!(props.live_low_latency);
    }
}
