use anyhow::Result;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use url::Url;

use super::backend::{BackendEvent, PlayerBackend};
use super::error::PlayerError;
use super::props::PlayerProps;
use super::shim::ShimBackend;
use super::types::{PlayerData, PlayerState, Source, VideoData};
use crate::config::Config;
use crate::constants::{EVENT_BUS_CAPACITY, MS_PER_SEC};
use crate::events::{EventBus, EventKind, EventSubscriber, PlayerEvent};

/// Commands that can be sent to the player controller.
///
/// All of these are fire-and-forget: nothing about player state comes back
/// synchronously, results surface later as events.
#[derive(Debug)]
pub enum PlayerCommand {
    /// Apply a new declarative property set; only changed fields take effect
    SetProps { props: PlayerProps },
    /// Register a preloaded source id for later activation
    Preload { id: u64, url: String },
    /// Begin the load sequence for a previously preloaded source
    LoadSource { id: u64 },
    /// Forget a preloaded source
    ReleaseSource { id: u64 },
    /// Start playback
    Play,
    /// Pause playback
    Pause,
    /// Seek to position
    SeekTo { position: Duration },
    /// Configure a request origin header (unsupported on every backend)
    SetOrigin { origin: String },
    /// Toggle picture-in-picture
    TogglePip,
    /// Tear the player down
    Release,
}

/// Controller that owns the backend and processes commands.
///
/// One backend instance per controller; commands and property writes are
/// serialized through the command channel, backend callbacks are re-marshaled
/// through the callback channel, and both meet in a single select loop.
pub struct PlayerController {
    backend: Box<dyn PlayerBackend>,
    receiver: mpsc::UnboundedReceiver<PlayerCommand>,
    backend_events: mpsc::UnboundedReceiver<BackendEvent>,
    ticks: mpsc::UnboundedReceiver<()>,
    tick_sender: mpsc::UnboundedSender<()>,
    bus: Arc<EventBus>,
    props: PlayerProps,
    sources: HashMap<u64, String>,
    state: PlayerState,
    progress_timer: Option<CancellationToken>,
    last_position: f64,
}

impl PlayerController {
    /// Create a controller with the backend named by the given config.
    pub fn new(config: &Config) -> Result<(PlayerHandle, PlayerController)> {
        let backend_name = config.playback.backend.as_str();
        if backend_name != "shim" {
            warn!(
                "Unknown player backend '{}', falling back to shim",
                backend_name
            );
        }
        info!("Creating shim player backend");
        let (backend, backend_events) = ShimBackend::new();
        Ok(Self::with_backend(
            Box::new(backend),
            backend_events,
            config.initial_props(),
        ))
    }

    /// Wire a controller around an externally constructed backend.
    pub fn with_backend(
        backend: Box<dyn PlayerBackend>,
        backend_events: mpsc::UnboundedReceiver<BackendEvent>,
        initial_props: PlayerProps,
    ) -> (PlayerHandle, PlayerController) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (tick_sender, ticks) = mpsc::unbounded_channel();
        let bus = Arc::new(EventBus::new(EVENT_BUS_CAPACITY));

        let controller = PlayerController {
            backend,
            receiver,
            backend_events,
            ticks,
            tick_sender,
            bus: bus.clone(),
            props: initial_props,
            sources: HashMap::new(),
            state: PlayerState::Idle,
            progress_timer: None,
            last_position: 0.0,
        };
        let handle = PlayerHandle {
            sender,
            bus,
            next_source_id: Arc::new(AtomicU64::new(0)),
            sources: Arc::new(Mutex::new(HashMap::new())),
        };

        (handle, controller)
    }

    /// Run the controller event loop until released.
    pub async fn run(mut self) {
        debug!("PlayerController event loop started");

        loop {
            tokio::select! {
                command = self.receiver.recv() => {
                    match command {
                        Some(PlayerCommand::Release) => {
                            trace!("Release command received");
                            break;
                        }
                        Some(command) => self.handle_command(command).await,
                        None => {
                            debug!("All player handles dropped");
                            break;
                        }
                    }
                }
                Some(event) = self.backend_events.recv() => {
                    self.handle_backend_event(event).await;
                }
                Some(()) = self.ticks.recv() => {
                    self.emit_progress().await;
                }
            }
        }

        // Timer first so no tick can observe a released backend.
        self.stop_progress_timer();
        self.backend.release().await;
        debug!("PlayerController event loop terminated");
    }

    async fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::SetProps { props } => {
                trace!("Applying props");
                self.apply_props(props).await;
            }
            PlayerCommand::Preload { id, url } => {
                trace!("Preloading source {} -> {}", id, url);
                self.sources.insert(id, url);
            }
            PlayerCommand::LoadSource { id } => match self.sources.get(&id).cloned() {
                Some(url) => self.load_stream(&url).await,
                None => debug!("loadSource for unknown source id {}, ignoring", id),
            },
            PlayerCommand::ReleaseSource { id } => {
                if self.sources.remove(&id).is_none() {
                    debug!("releaseSource for unknown source id {}, ignoring", id);
                }
            }
            PlayerCommand::Play => {
                trace!("Starting playback");
                self.backend.play().await;
            }
            PlayerCommand::Pause => {
                trace!("Pausing playback");
                self.backend.pause().await;
            }
            PlayerCommand::SeekTo { position } => {
                trace!("Seeking to {:?}", position);
                self.backend.seek_to(position.as_millis() as i64).await;
            }
            PlayerCommand::SetOrigin { origin } => {
                // Known gap: no backend implements origin headers yet.
                warn!("setOrigin({:?}) is not supported, ignoring", origin);
            }
            PlayerCommand::TogglePip => self.toggle_pip().await,
            PlayerCommand::Release => {
                // Handled by the run loop before dispatch.
            }
        }
    }

    /// Diff the incoming props against the applied set and perform the side
    /// effects of changed fields only.
    async fn apply_props(&mut self, next: PlayerProps) {
        let prev = std::mem::replace(&mut self.props, next);
        let props = self.props.clone();

        if props.muted != prev.muted {
            self.backend.set_muted(props.muted).await;
        }
        if props.volume != prev.volume {
            self.backend.set_volume(props.volume).await;
        }
        if props.playback_rate != prev.playback_rate {
            self.backend.set_playback_rate(props.playback_rate).await;
        }
        if props.live_low_latency != prev.live_low_latency {
            self.backend.set_live_low_latency(props.live_low_latency).await;
        }
        if props.rebuffer_to_live != prev.rebuffer_to_live {
            self.backend.set_rebuffer_to_live(props.rebuffer_to_live).await;
        }
        if props.resize_mode != prev.resize_mode {
            self.backend.set_resize_mode(props.resize_mode).await;
        }
        if props.log_level != prev.log_level {
            self.backend.set_log_level(props.log_level).await;
        }
        if props.max_bitrate != prev.max_bitrate {
            self.backend.set_max_bitrate(props.max_bitrate).await;
        }
        if props.initial_buffer_duration != prev.initial_buffer_duration {
            self.backend
                .set_initial_buffer_duration(props.initial_buffer_duration)
                .await;
        }
        if props.auto_quality_mode != prev.auto_quality_mode {
            self.backend.set_auto_quality_mode(props.auto_quality_mode).await;
        }
        if props.quality != prev.quality {
            self.backend.set_quality(props.quality.clone()).await;
        }
        if props.auto_max_quality != prev.auto_max_quality {
            self.backend
                .set_auto_max_quality(props.auto_max_quality.clone())
                .await;
        }
        if props.progress_interval != prev.progress_interval
            && self.progress_timer.is_some()
        {
            // Cadence change takes effect on a running timer immediately.
            self.start_progress_timer();
        }
        if props.stream_url != prev.stream_url
            && let Some(url) = props.stream_url.as_deref()
        {
            self.load_stream(url).await;
        }
        if props.paused != prev.paused {
            if props.paused {
                self.backend.pause().await;
            } else {
                self.backend.play().await;
            }
        }
    }

    /// The load sequence: LoadStart first, then local validation, then the
    /// engine. A malformed URL never reaches the backend.
    async fn load_stream(&mut self, url: &str) {
        self.publish(PlayerEvent::LoadStart).await;
        self.last_position = 0.0;

        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(_) => {
                let err = PlayerError::InvalidUrl(url.to_string());
                warn!("{}", err);
                self.publish(PlayerEvent::Error {
                    error: err.to_string(),
                })
                .await;
                return;
            }
        };

        debug!("Loading stream: {}", parsed);
        if let Err(err) = self.backend.load(&parsed).await {
            // Engine rejections are relayed verbatim, no retry.
            self.publish(PlayerEvent::Error {
                error: err.to_string(),
            })
            .await;
        }
    }

    async fn toggle_pip(&mut self) {
        if !self.backend.capabilities().pip {
            // Engines without PiP answer with an inactive report, not an error.
            debug!(
                "Backend '{}' does not support picture-in-picture",
                self.backend.name()
            );
            self.publish(PlayerEvent::PipChange { is_active: false }).await;
            return;
        }
        if !self.props.pip_enabled {
            debug!("togglePip requested with pipEnabled unset, ignoring");
            return;
        }
        self.backend.toggle_pip().await;
    }

    async fn handle_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::StateChanged(state) => self.handle_state_change(state).await,
            BackendEvent::DurationChanged { duration_ms } => {
                self.publish(PlayerEvent::DurationChange {
                    duration: duration_secs(duration_ms),
                })
                .await;
            }
            BackendEvent::QualityChanged { quality } => {
                self.publish(PlayerEvent::QualityChange { quality }).await;
            }
            BackendEvent::SeekCompleted { position_ms } => {
                let position = position_ms as f64 / MS_PER_SEC;
                // Seeks reset the breakpoint baseline.
                self.last_position = position;
                self.publish(PlayerEvent::Seek { position }).await;
            }
            BackendEvent::Rebuffering => {
                self.publish(PlayerEvent::Rebuffering).await;
            }
            BackendEvent::TextCue(cue) => {
                self.publish(PlayerEvent::TextCue(cue)).await;
            }
            BackendEvent::TextMetadataCue(cue) => {
                self.publish(PlayerEvent::TextMetadataCue(cue)).await;
            }
            BackendEvent::VideoStatistics {
                bitrate,
                duration_ms,
                frames_decoded,
                frames_dropped,
            } => {
                self.publish(PlayerEvent::VideoStatistics(VideoData {
                    bitrate,
                    duration: duration_ms.and_then(duration_secs),
                    frames_decoded,
                    frames_dropped,
                }))
                .await;
            }
            BackendEvent::LiveLatencyChanged { latency_ms } => {
                self.publish(PlayerEvent::LiveLatencyChange {
                    latency: latency_ms as f64 / MS_PER_SEC,
                })
                .await;
            }
            BackendEvent::PipChanged { is_active } => {
                self.publish(PlayerEvent::PipChange { is_active }).await;
            }
            BackendEvent::Error(err) => {
                error!("Player error: {}", err);
                self.publish(PlayerEvent::Error {
                    error: err.to_string(),
                })
                .await;
            }
        }
    }

    async fn handle_state_change(&mut self, state: PlayerState) {
        debug!("Player state: {:?} -> {:?}", self.state, state);
        self.state = state;

        match state {
            PlayerState::Idle => self.stop_progress_timer(),
            PlayerState::Ready => {
                let duration = duration_secs(self.backend.duration_ms().await);
                self.publish(PlayerEvent::Load { duration }).await;

                self.publish(PlayerEvent::Data(PlayerData {
                    qualities: self.backend.qualities().await,
                    version: self.backend.version().await,
                    session_id: self.backend.session_id().await,
                }))
                .await;

                if self.props.autoplay && !self.props.paused {
                    self.backend.play().await;
                }
            }
            PlayerState::Buffering => {
                // Rebuffers do not stop the progress timer.
                self.publish(PlayerEvent::Rebuffering).await;
            }
            PlayerState::Playing => self.start_progress_timer(),
            PlayerState::Ended => {
                self.stop_progress_timer();
                if self.props.loop_playback {
                    // Replay without surfacing an intermediate Idle.
                    self.backend.seek_to(0).await;
                    self.backend.play().await;
                }
            }
        }

        self.publish(PlayerEvent::PlayerStateChange { state }).await;
    }

    fn start_progress_timer(&mut self) {
        self.stop_progress_timer();

        let secs = self.props.progress_interval;
        let interval = if secs > 0.0 {
            Duration::from_secs_f64(secs)
        } else {
            warn!("Non-positive progressInterval {}, using 1s", secs);
            Duration::from_secs(1)
        };

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let ticks = self.tick_sender.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        if ticks.send(()).is_err() {
                            break;
                        }
                    }
                }
            }
        });
        self.progress_timer = Some(token);
    }

    fn stop_progress_timer(&mut self) {
        if let Some(token) = self.progress_timer.take() {
            token.cancel();
        }
    }

    async fn emit_progress(&mut self) {
        if self.progress_timer.is_none() {
            // Stale tick queued before the timer was stopped.
            return;
        }

        let position = self.backend.position_ms().await as f64 / MS_PER_SEC;
        self.publish(PlayerEvent::Progress { progress: position }).await;
        self.emit_time_points(position).await;
    }

    /// Emit a TimePoint for every configured breakpoint crossed since the
    /// previous tick.
    async fn emit_time_points(&mut self, position: f64) {
        let prev = std::mem::replace(&mut self.last_position, position);
        if self.props.breakpoints.is_empty() || position <= prev {
            return;
        }

        let crossed: Vec<f64> = self
            .props
            .breakpoints
            .iter()
            .copied()
            .filter(|bp| *bp > prev && *bp <= position)
            .collect();
        for position in crossed {
            self.publish(PlayerEvent::TimePoint { position }).await;
        }
    }

    async fn publish(&self, event: PlayerEvent) {
        let _ = self.bus.publish(event).await;
    }
}

fn duration_secs(duration_ms: i64) -> Option<f64> {
    (duration_ms >= 0).then(|| duration_ms as f64 / MS_PER_SEC)
}

/// Handle to send commands to the player controller.
///
/// This is the application-facing facade: declarative props go through
/// [`set_props`](Self::set_props), imperative commands through the methods
/// below, and events come back via [`subscribe`](Self::subscribe). Every
/// command is fire-and-forget; a command sent after the controller is gone
/// is dropped with a diagnostic.
#[derive(Clone)]
pub struct PlayerHandle {
    sender: mpsc::UnboundedSender<PlayerCommand>,
    bus: Arc<EventBus>,
    next_source_id: Arc<AtomicU64>,
    sources: Arc<Mutex<HashMap<u64, String>>>,
}

impl std::fmt::Debug for PlayerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerHandle")
            .field("sources", &self.sources.lock().unwrap().len())
            .finish()
    }
}

impl PlayerHandle {
    /// Subscribe to all events of this player instance.
    pub fn subscribe(&self) -> EventSubscriber {
        self.bus.subscribe()
    }

    /// Subscribe to specific event kinds.
    pub fn subscribe_to_kinds(&self, kinds: Vec<EventKind>) -> EventSubscriber {
        self.bus.subscribe_to_kinds(kinds)
    }

    /// Apply a declarative property set.
    pub fn set_props(&self, props: PlayerProps) {
        self.dispatch(PlayerCommand::SetProps { props });
    }

    /// Register a stream for later activation. Never touches the active
    /// playback; returns a [`Source`] usable with
    /// [`load_source`](Self::load_source).
    pub fn preload(&self, url: &str) -> Source {
        let id = self.next_source_id.fetch_add(1, Ordering::Relaxed);
        self.sources.lock().unwrap().insert(id, url.to_string());
        self.dispatch(PlayerCommand::Preload {
            id,
            url: url.to_string(),
        });
        Source {
            id,
            url: url.to_string(),
        }
    }

    /// Begin the load sequence for a preloaded source. Unknown sources are
    /// ignored.
    pub fn load_source(&self, source: &Source) {
        self.dispatch(PlayerCommand::LoadSource { id: source.id });
    }

    /// Forget a preloaded source. Unknown sources are ignored.
    pub fn release_source(&self, source: &Source) {
        self.sources.lock().unwrap().remove(&source.id);
        self.dispatch(PlayerCommand::ReleaseSource { id: source.id });
    }

    /// Start playback. Safe to call regardless of current state.
    pub fn play(&self) {
        self.dispatch(PlayerCommand::Play);
    }

    /// Pause playback. Safe to call regardless of current state.
    pub fn pause(&self) {
        self.dispatch(PlayerCommand::Pause);
    }

    /// Seek to a position in seconds. The Seek event fires on completion.
    pub fn seek_to(&self, position_secs: f64) {
        match Duration::try_from_secs_f64(position_secs.max(0.0)) {
            Ok(position) => self.dispatch(PlayerCommand::SeekTo { position }),
            Err(_) => warn!("Ignoring unrepresentable seek position {}", position_secs),
        }
    }

    /// Configure a request origin header. Unsupported on every backend; the
    /// call is logged and ignored rather than silently accepted.
    pub fn set_origin(&self, origin: &str) {
        self.dispatch(PlayerCommand::SetOrigin {
            origin: origin.to_string(),
        });
    }

    /// Toggle picture-in-picture. Backends without PiP answer with
    /// `PipChange { is_active: false }`.
    pub fn toggle_pip(&self) {
        self.dispatch(PlayerCommand::TogglePip);
    }

    /// Tear the player down: the progress timer stops and the backend is
    /// released exactly once. Dropping the last handle has the same effect.
    pub fn release(&self) {
        self.dispatch(PlayerCommand::Release);
    }

    fn dispatch(&self, command: PlayerCommand) {
        if let Err(err) = self.sender.send(command) {
            warn!("Player controller is gone; dropping {:?}", err.0);
        }
    }
}
