//! Stream playback
//!
//! Strategy selection, the session state machine and its two recovery layers.
//! The host supplies a [`RenderSurface`] and optionally a [`DemuxerFactory`];
//! everything else lives here.

pub mod controls;
pub mod recovery;
pub mod session;
pub mod state;
pub mod strategy;
pub mod surface;
pub mod timer;

#[cfg(test)]
pub(crate) mod testing;

pub use controls::ControlsVisibility;
pub use recovery::{StrategyAction, StrategyRecovery, SurfaceAction, SurfaceRecovery};
pub use session::{format_time, PlaybackEngine, PlaybackSession, PlayerEvents, PlayerOptions};
pub use state::PlaybackState;
pub use strategy::{select_strategy, DeliveryStrategy, PlaybackCapabilities};
pub use surface::{
    DemuxerError, DemuxerErrorKind, DemuxerFactory, EventSender, NoSoftwareDemuxer, PlayerEvent,
    RenderSurface, SoftwareDemuxer, SurfaceError,
};
pub use timer::OneShotTimer;
