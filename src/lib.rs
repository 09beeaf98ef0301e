//! Relay between an application-facing player contract and an embedded
//! live-video playback engine.
//!
//! The crate exposes three surfaces: a declarative property set applied
//! through [`PlayerHandle::set_props`], an imperative command handle
//! (preload/load/release/play/pause/seek/PiP), and a typed event channel
//! the application drains. The engine itself lives behind
//! [`PlayerBackend`]; this crate only forwards property changes one way and
//! translates engine callbacks the other.

pub mod config;
pub mod constants;
pub mod events;
pub mod player;

#[cfg(test)]
mod test_utils;

pub use config::Config;
pub use events::{EventBus, EventFilter, EventKind, EventSubscriber, PlayerEvent};
pub use player::{
    BackendEvent, Capabilities, LogLevel, PlayerBackend, PlayerController, PlayerData,
    PlayerError, PlayerHandle, PlayerProps, PlayerState, Quality, ResizeMode, ShimBackend,
    Source, TextCue, TextMetadataCue, VideoData,
};
