//! Playback sessions
//!
//! A [`PlaybackSession`] drives one render surface for one watch view. All
//! input arrives either as a control call from the host or as a
//! [`PlayerEvent`] handed to [`PlaybackSession::handle_event`]; the session
//! never polls. Timers post their own events on the same channel so the host
//! loop stays the only place where state changes.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::controls::ControlsVisibility;
use super::recovery::{StrategyAction, StrategyRecovery, SurfaceAction, SurfaceRecovery};
use super::state::PlaybackState;
use super::strategy::{select_strategy, DeliveryStrategy, PlaybackCapabilities};
use super::surface::{
    DemuxerFactory, EventSender, NoSoftwareDemuxer, PlayerEvent, RenderSurface, SoftwareDemuxer,
};
use super::timer::OneShotTimer;
use crate::config::PlaybackConfig;
use crate::errors::{PlaybackError, PlaybackResult, UserFacingError};
use crate::utils::url::HLS_MIME_TYPE;
use crate::utils::UrlUtils;

/// What the host asks to play
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerOptions {
    pub source_url: String,
    pub poster_url: Option<String>,
    pub auto_play: bool,
    pub muted: bool,
    /// Opaque styling hook passed through to the presentation layer
    pub class_name: Option<String>,
}

impl PlayerOptions {
    pub fn new<S: Into<String>>(source_url: S) -> Self {
        Self {
            source_url: source_url.into(),
            ..Default::default()
        }
    }

    pub fn poster<S: Into<String>>(mut self, poster_url: S) -> Self {
        self.poster_url = Some(poster_url.into());
        self
    }

    pub fn auto_play(mut self, auto_play: bool) -> Self {
        self.auto_play = auto_play;
        self
    }

    pub fn muted(mut self, muted: bool) -> Self {
        self.muted = muted;
        self
    }

    pub fn class_name<S: Into<String>>(mut self, class_name: S) -> Self {
        self.class_name = Some(class_name.into());
        self
    }
}

/// Receiving end of a session's event channel
#[derive(Debug)]
pub struct PlayerEvents {
    rx: mpsc::UnboundedReceiver<PlayerEvent>,
}

impl PlayerEvents {
    /// Wait for the next event posted by the surface, the demuxer or a timer
    pub async fn next(&mut self) -> Option<PlayerEvent> {
        self.rx.recv().await
    }
}

/// Creates playback sessions with shared configuration
#[derive(Clone)]
pub struct PlaybackEngine {
    config: PlaybackConfig,
    demuxers: Arc<dyn DemuxerFactory>,
}

impl PlaybackEngine {
    pub fn new(config: PlaybackConfig, demuxers: Arc<dyn DemuxerFactory>) -> Self {
        Self { config, demuxers }
    }

    /// Engine for runtimes that can only play natively or directly
    pub fn without_software_demuxer(config: PlaybackConfig) -> Self {
        Self::new(config, Arc::new(NoSoftwareDemuxer))
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Start a session on `surface`; the returned events must be fed back
    /// into [`PlaybackSession::handle_event`]
    pub fn open<S>(&self, surface: S, options: PlayerOptions) -> (PlaybackSession, PlayerEvents)
    where
        S: RenderSurface + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut session = PlaybackSession {
            config: self.config.clone(),
            demuxers: self.demuxers.clone(),
            events: EventSender::new(tx),
            surface: Box::new(surface),
            demuxer: None,
            options,
            strategy: None,
            state: PlaybackState::Idle,
            position: 0.0,
            duration: 0.0,
            volume: 1.0,
            muted: false,
            fullscreen: false,
            has_retried: false,
            last_error: None,
            surface_recovery: SurfaceRecovery::new(self.config.reload_delay),
            reload_timer: OneShotTimer::new(),
            controls: ControlsVisibility::new(self.config.controls_hide_delay),
            disposed: false,
        };
        session.start();
        (session, PlayerEvents { rx })
    }
}

pub struct PlaybackSession {
    config: PlaybackConfig,
    demuxers: Arc<dyn DemuxerFactory>,
    events: EventSender,
    surface: Box<dyn RenderSurface>,
    demuxer: Option<Box<dyn SoftwareDemuxer>>,
    options: PlayerOptions,
    strategy: Option<DeliveryStrategy>,
    state: PlaybackState,
    position: f64,
    duration: f64,
    volume: f64,
    muted: bool,
    fullscreen: bool,
    has_retried: bool,
    last_error: Option<String>,
    surface_recovery: SurfaceRecovery,
    reload_timer: OneShotTimer,
    controls: ControlsVisibility,
    disposed: bool,
}

impl PlaybackSession {
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn strategy(&self) -> Option<DeliveryStrategy> {
        self.strategy
    }

    pub fn source_url(&self) -> &str {
        &self.options.source_url
    }

    pub fn options(&self) -> &PlayerOptions {
        &self.options
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Whether the one-shot automatic reload has been used for this source
    pub fn has_retried(&self) -> bool {
        self.has_retried
    }

    /// Current error or recovery notice, if any
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.state == PlaybackState::Loading
    }

    pub fn controls_visible(&self) -> bool {
        self.controls.is_visible(self.state.is_playing())
    }

    /// Displayable error with its recovery action, once the session gave up
    pub fn user_facing_error(&self) -> Option<UserFacingError> {
        if self.state != PlaybackState::Errored {
            return None;
        }
        let message = self
            .last_error
            .clone()
            .unwrap_or_else(|| "Stream unavailable".to_string());
        Some(UserFacingError::retry_playback(message))
    }

    /// `"m:ss / m:ss"` for the progress display
    pub fn time_display(&self) -> String {
        format!(
            "{} / {}",
            format_time(self.position),
            format_time(self.duration)
        )
    }

    /// Apply one event from the surface, the demuxer or a timer
    pub fn handle_event(&mut self, event: PlayerEvent) {
        if self.disposed {
            debug!("Ignoring {:?} on disposed session", event);
            return;
        }

        match event {
            PlayerEvent::LoadStart => {
                if self.state != PlaybackState::Errored {
                    self.transition(PlaybackState::Loading);
                }
            }
            PlayerEvent::CanPlay => {
                if self.state == PlaybackState::Loading {
                    self.last_error = None;
                    self.transition(PlaybackState::Ready);
                }
            }
            PlayerEvent::Playing => self.transition(PlaybackState::Playing),
            PlayerEvent::Paused => self.transition(PlaybackState::Paused),
            PlayerEvent::TimeUpdate(position) => self.position = position,
            PlayerEvent::DurationChange(duration) => self.duration = duration,
            PlayerEvent::VolumeChange { volume, muted } => {
                self.volume = volume;
                self.muted = muted;
            }
            PlayerEvent::FullscreenChange(fullscreen) => self.fullscreen = fullscreen,
            PlayerEvent::ManifestParsed => {
                if self.options.auto_play {
                    if let Err(e) = self.surface.play() {
                        warn!("Autoplay rejected by surface: {}", e);
                    }
                }
            }
            PlayerEvent::DemuxerError(error) => self.on_demuxer_error(error),
            PlayerEvent::SurfaceError(error) => {
                if self.state == PlaybackState::Idle || self.state == PlaybackState::Errored {
                    debug!("Ignoring surface error in state {}: {:?}", self.state, error);
                    return;
                }
                match self.surface_recovery.classify(&error, self.has_retried) {
                    SurfaceAction::ScheduleReload { delay, notice } => {
                        warn!("{}", notice);
                        self.has_retried = true;
                        self.last_error = Some(notice);
                        self.transition(PlaybackState::Loading);
                        self.reload_timer
                            .schedule(delay, &self.events, PlayerEvent::ReloadTimerElapsed);
                    }
                    SurfaceAction::Fail { message } => self.fail(message),
                }
            }
            PlayerEvent::ReloadTimerElapsed(generation) => {
                if self.reload_timer.fire(generation) {
                    info!(
                        "Reloading stream after surface error: {}",
                        UrlUtils::obfuscate_credentials(&self.options.source_url)
                    );
                    self.reattach();
                }
            }
            PlayerEvent::ControlsHideTimerElapsed(generation) => {
                self.controls
                    .timer_elapsed(generation, self.state.is_playing());
            }
        }
    }

    /// Ask the surface to play; `Playing` is entered when it confirms
    pub fn play(&mut self) -> PlaybackResult<()> {
        self.ensure_active("play")?;
        self.surface.play().map_err(PlaybackError::Surface)
    }

    pub fn pause(&mut self) -> PlaybackResult<()> {
        self.ensure_active("pause")?;
        self.surface.pause();
        Ok(())
    }

    pub fn toggle_play(&mut self) -> PlaybackResult<()> {
        if self.state.is_playing() {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Seek to `position` seconds, clamped to the known duration
    pub fn seek(&mut self, position: f64) -> PlaybackResult<()> {
        self.ensure_active("seek")?;
        if !position.is_finite() || position < 0.0 {
            return Err(PlaybackError::InvalidPosition(position));
        }
        let target = if self.duration > 0.0 {
            position.min(self.duration)
        } else {
            position
        };
        self.surface.seek(target);
        self.position = target;
        Ok(())
    }

    /// Set volume in `[0, 1]`; mute state is left as is
    pub fn set_volume(&mut self, volume: f64) -> PlaybackResult<()> {
        self.ensure_not_disposed()?;
        if !(0.0..=1.0).contains(&volume) {
            return Err(PlaybackError::InvalidVolume(volume));
        }
        self.volume = volume;
        self.surface.set_volume(volume);
        Ok(())
    }

    pub fn toggle_mute(&mut self) -> PlaybackResult<()> {
        self.ensure_not_disposed()?;
        self.muted = !self.muted;
        self.surface.set_muted(self.muted);
        Ok(())
    }

    pub fn toggle_fullscreen(&mut self) -> PlaybackResult<()> {
        self.ensure_not_disposed()?;
        let target = !self.fullscreen;
        self.surface
            .set_fullscreen(target)
            .map_err(PlaybackError::Surface)?;
        self.fullscreen = target;
        Ok(())
    }

    /// User-triggered reload; the only way out of `Errored`
    pub fn reload(&mut self) -> PlaybackResult<()> {
        self.ensure_not_disposed()?;
        if self.state == PlaybackState::Idle {
            return Err(PlaybackError::invalid_state("reload", self.state.to_string()));
        }
        self.reload_timer.cancel();
        self.last_error = None;
        self.reattach();
        Ok(())
    }

    /// Switch to a new source, releasing the current strategy first
    pub fn change_source(&mut self, options: PlayerOptions) -> PlaybackResult<()> {
        self.ensure_not_disposed()?;
        if options.source_url == self.options.source_url {
            self.options = options;
            return Ok(());
        }

        self.reload_timer.cancel();
        self.destroy_demuxer();
        self.surface.clear_source();
        self.transition(PlaybackState::Idle);

        self.options = options;
        self.strategy = None;
        self.position = 0.0;
        self.duration = 0.0;
        self.has_retried = false;
        self.last_error = None;
        self.start();
        Ok(())
    }

    pub fn pointer_moved(&mut self) {
        if !self.disposed {
            self.controls
                .pointer_moved(self.state.is_playing(), &self.events);
        }
    }

    pub fn pointer_left(&mut self) {
        self.controls.pointer_left(self.state.is_playing());
    }

    /// Release the demuxer, then the surface. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.reload_timer.cancel();
        self.controls.cancel();
        self.destroy_demuxer();
        self.surface.release();
        self.state = PlaybackState::Idle;
        debug!(
            "Disposed playback session for {}",
            UrlUtils::obfuscate_credentials(&self.options.source_url)
        );
    }

    fn start(&mut self) {
        self.surface
            .set_cross_origin_anonymous(self.config.cross_origin_anonymous);
        self.surface.set_poster(self.options.poster_url.as_deref());
        self.surface.set_autoplay(self.options.auto_play);
        self.muted = self.options.muted;
        self.surface.set_muted(self.muted);

        let capabilities = capabilities_of(self.demuxers.as_ref(), self.surface.as_ref());
        let strategy = select_strategy(&self.options.source_url, capabilities);
        info!(
            "Starting playback of {} using {} delivery",
            UrlUtils::obfuscate_credentials(&self.options.source_url),
            strategy
        );
        self.strategy = Some(strategy);
        self.attach_strategy();
    }

    fn attach_strategy(&mut self) {
        let url = self.options.source_url.clone();
        match self.strategy {
            Some(DeliveryStrategy::SoftwareDemux) => {
                let mut demuxer = self
                    .demuxers
                    .create(&self.config.demuxer, self.events.clone());
                demuxer.load_source(&url);
                demuxer.attach(self.surface.as_mut());
                self.demuxer = Some(demuxer);
            }
            Some(DeliveryStrategy::Native) | Some(DeliveryStrategy::Direct) => {
                self.surface.set_source(&url);
                self.surface.load();
            }
            None => return,
        }
        self.transition(PlaybackState::Loading);
    }

    /// Tear down and rebuild the current strategy for the same source
    fn reattach(&mut self) {
        self.destroy_demuxer();
        self.attach_strategy();
    }

    fn destroy_demuxer(&mut self) {
        if let Some(mut demuxer) = self.demuxer.take() {
            demuxer.destroy();
        }
    }

    fn on_demuxer_error(&mut self, error: super::surface::DemuxerError) {
        if self.demuxer.is_none() {
            debug!("Ignoring demuxer error without an attached demuxer: {:?}", error);
            return;
        }
        match StrategyRecovery::classify(&error) {
            StrategyAction::Ignore => {
                debug!("Non-fatal demuxer error: {}", error.details);
            }
            StrategyAction::RestartLoad => {
                warn!("Fatal network error, restarting load: {}", error.details);
                if let Some(demuxer) = self.demuxer.as_mut() {
                    demuxer.start_load();
                }
            }
            StrategyAction::RecoverMediaError => {
                warn!("Fatal media error, recovering: {}", error.details);
                if let Some(demuxer) = self.demuxer.as_mut() {
                    demuxer.recover_media_error();
                }
            }
            StrategyAction::Teardown { message } => {
                self.destroy_demuxer();
                self.fail(message);
            }
        }
    }

    fn fail(&mut self, message: String) {
        warn!(
            "Playback failed for {}: {}",
            UrlUtils::obfuscate_credentials(&self.options.source_url),
            message
        );
        self.reload_timer.cancel();
        self.last_error = Some(message);
        self.transition(PlaybackState::Errored);
    }

    fn transition(&mut self, next: PlaybackState) {
        if self.state == next {
            return;
        }
        if !self.state.can_transition_to(next) {
            debug!("Ignoring transition {} -> {}", self.state, next);
            return;
        }
        let was_playing = self.state.is_playing();
        debug!("Playback state {} -> {}", self.state, next);
        self.state = next;
        if was_playing != next.is_playing() {
            self.controls.playing_changed(next.is_playing(), &self.events);
        }
    }

    fn ensure_not_disposed(&self) -> PlaybackResult<()> {
        if self.disposed {
            Err(PlaybackError::Disposed)
        } else {
            Ok(())
        }
    }

    fn ensure_active(&self, action: &str) -> PlaybackResult<()> {
        self.ensure_not_disposed()?;
        match self.state {
            PlaybackState::Idle | PlaybackState::Errored => {
                Err(PlaybackError::invalid_state(action, self.state.to_string()))
            }
            _ => Ok(()),
        }
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn capabilities_of(
    demuxers: &dyn DemuxerFactory,
    surface: &dyn RenderSurface,
) -> PlaybackCapabilities {
    PlaybackCapabilities {
        software_demux: demuxers.is_supported(),
        native_hls: surface.can_play_type(HLS_MIME_TYPE),
    }
}

/// Format seconds as `m:ss`
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
