pub mod backend;
pub mod controller;
pub mod error;
pub mod props;
pub mod shim;
pub mod types;


pub use backend::{BackendEvent, BackendEventSender, Capabilities, PlayerBackend};
pub use controller::{PlayerCommand, PlayerController, PlayerHandle};
pub use error::PlayerError;
pub use props::PlayerProps;
pub use shim::ShimBackend;
pub use types::{
    LogLevel, PlayerData, PlayerState, Quality, ResizeMode, Source, TextCue, TextMetadataCue,
    VideoData,
};
