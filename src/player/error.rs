use thiserror::Error;

/// Errors surfaced through the `Error` event.
///
/// The application-visible payload is the rendered message; the variants
/// exist so embedders and tests can match on the failure class without
/// parsing strings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayerError {
    /// The stream URL could not be parsed. Playback is never attempted.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The engine rejected or failed a load.
    #[error("Load failed: {0}")]
    LoadFailed(String),

    /// A network failure reported by the engine.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Any other engine failure, relayed verbatim.
    #[error("{0}")]
    Unknown(String),
}
