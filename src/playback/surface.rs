//! Boundaries to the host's media stack
//!
//! The host owns the actual video element / decoder. The session drives it
//! through [`RenderSurface`] and, for HLS without native support, through a
//! [`SoftwareDemuxer`] bound to that surface. Both report back by posting
//! [`PlayerEvent`]s on the session's [`EventSender`].

use tokio::sync::mpsc;

use crate::config::DemuxerConfig;

/// Media error code for a source the surface cannot decode
pub const MEDIA_ERR_SRC_NOT_SUPPORTED: u16 = 4;

/// Message fragment surfaces use for an HLS stream their demuxer rejected
pub const DEMUXER_INCOMPATIBILITY_SIGNATURE: &str = "DEMUXER_ERROR_DETECTED_HLS";

/// Error reported by the render surface itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceError {
    pub code: Option<u16>,
    pub message: Option<String>,
}

impl SurfaceError {
    pub fn new(code: Option<u16>, message: Option<&str>) -> Self {
        Self {
            code,
            message: message.map(str::to_string),
        }
    }

    /// The surface's demuxer could not handle this stream
    pub fn is_demuxer_incompatibility(&self) -> bool {
        self.code == Some(MEDIA_ERR_SRC_NOT_SUPPORTED)
            || self
                .message
                .as_deref()
                .is_some_and(|m| m.contains(DEMUXER_INCOMPATIBILITY_SIGNATURE))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemuxerErrorKind {
    Network,
    Media,
    Other,
}

/// Error classified by the software demuxer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemuxerError {
    pub kind: DemuxerErrorKind,
    pub fatal: bool,
    pub details: String,
}

impl DemuxerError {
    pub fn fatal<S: Into<String>>(kind: DemuxerErrorKind, details: S) -> Self {
        Self {
            kind,
            fatal: true,
            details: details.into(),
        }
    }

    pub fn recoverable<S: Into<String>>(kind: DemuxerErrorKind, details: S) -> Self {
        Self {
            kind,
            fatal: false,
            details: details.into(),
        }
    }
}

/// Everything that can happen to a session, in the order it happened
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    LoadStart,
    CanPlay,
    Playing,
    Paused,
    TimeUpdate(f64),
    DurationChange(f64),
    VolumeChange { volume: f64, muted: bool },
    FullscreenChange(bool),
    SurfaceError(SurfaceError),
    ManifestParsed,
    DemuxerError(DemuxerError),
    ReloadTimerElapsed(u64),
    ControlsHideTimerElapsed(u64),
}

/// Cloneable handle for posting events to a session
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<PlayerEvent>,
}

impl EventSender {
    pub(crate) fn new(tx: mpsc::UnboundedSender<PlayerEvent>) -> Self {
        Self { tx }
    }

    /// Post an event; silently dropped once the host stopped listening
    pub fn emit(&self, event: PlayerEvent) {
        let _ = self.tx.send(event);
    }
}

/// The host's video element
pub trait RenderSurface: Send {
    fn set_source(&mut self, url: &str);

    fn clear_source(&mut self);

    fn set_cross_origin_anonymous(&mut self, enabled: bool);

    fn set_poster(&mut self, poster: Option<&str>);

    fn set_autoplay(&mut self, autoplay: bool);

    /// Whether the surface claims it can play this MIME type natively
    fn can_play_type(&self, mime: &str) -> bool;

    /// Restart loading the current source
    fn load(&mut self);

    fn play(&mut self) -> Result<(), String>;

    fn pause(&mut self);

    fn seek(&mut self, position: f64);

    fn set_volume(&mut self, volume: f64);

    fn set_muted(&mut self, muted: bool);

    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), String>;

    /// Free everything the surface holds; called once, after any demuxer is destroyed
    fn release(&mut self);
}

/// A software HLS demuxer bound to one surface
pub trait SoftwareDemuxer: Send {
    fn load_source(&mut self, url: &str);

    fn attach(&mut self, surface: &mut dyn RenderSurface);

    /// Re-initiate loading after a network failure
    fn start_load(&mut self);

    /// Try to recover the media pipeline after a decode failure
    fn recover_media_error(&mut self);

    /// Detach from the surface and free all resources
    fn destroy(&mut self);
}

pub trait DemuxerFactory: Send + Sync {
    /// Whether software demuxing works in this runtime
    fn is_supported(&self) -> bool;

    fn create(&self, config: &DemuxerConfig, events: EventSender) -> Box<dyn SoftwareDemuxer>;
}

/// Factory for runtimes without a software demuxer
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSoftwareDemuxer;

impl DemuxerFactory for NoSoftwareDemuxer {
    fn is_supported(&self) -> bool {
        false
    }

    fn create(&self, _config: &DemuxerConfig, _events: EventSender) -> Box<dyn SoftwareDemuxer> {
        Box::new(InertDemuxer)
    }
}

struct InertDemuxer;

impl SoftwareDemuxer for InertDemuxer {
    fn load_source(&mut self, _url: &str) {}
    fn attach(&mut self, _surface: &mut dyn RenderSurface) {}
    fn start_load(&mut self) {}
    fn recover_media_error(&mut self) {}
    fn destroy(&mut self) {}
}
