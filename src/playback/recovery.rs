//! The two failure-recovery layers
//!
//! [`StrategyRecovery`] reacts to errors the software demuxer classified
//! itself. [`SurfaceRecovery`] reacts to errors the render surface reports and
//! owns the one-shot automatic reload. They see different signals and are
//! applied independently by the session.

use std::time::Duration;

use super::surface::{DemuxerError, DemuxerErrorKind, SurfaceError};

/// What the session should do with the demuxer after an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyAction {
    /// Non-fatal; the demuxer handles it
    Ignore,
    /// Fatal network error: restart loading inside the demuxer
    RestartLoad,
    /// Fatal media error: run the demuxer's media recovery
    RecoverMediaError,
    /// Anything else fatal: destroy the demuxer and fail the session
    Teardown { message: String },
}

pub struct StrategyRecovery;

impl StrategyRecovery {
    pub fn classify(error: &DemuxerError) -> StrategyAction {
        if !error.fatal {
            return StrategyAction::Ignore;
        }
        match error.kind {
            DemuxerErrorKind::Network => StrategyAction::RestartLoad,
            DemuxerErrorKind::Media => StrategyAction::RecoverMediaError,
            DemuxerErrorKind::Other => StrategyAction::Teardown {
                message: format!("HLS playback failed: {}", error.details),
            },
        }
    }
}

/// What the session should do after a surface error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceAction {
    /// Show `notice`, then reload once after `delay`
    ScheduleReload { delay: Duration, notice: String },
    /// Give up and enter `Errored`
    Fail { message: String },
}

#[derive(Debug, Clone)]
pub struct SurfaceRecovery {
    reload_delay: Duration,
}

impl SurfaceRecovery {
    pub fn new(reload_delay: Duration) -> Self {
        Self { reload_delay }
    }

    pub fn reload_delay(&self) -> Duration {
        self.reload_delay
    }

    /// Decide on a surface error given whether this session already auto-retried
    pub fn classify(&self, error: &SurfaceError, already_retried: bool) -> SurfaceAction {
        let message = error.message.as_deref().unwrap_or("Unknown error");

        if error.is_demuxer_incompatibility() && !already_retried {
            return SurfaceAction::ScheduleReload {
                delay: self.reload_delay,
                notice: format!(
                    "HLS stream error detected. This may be due to incompatible stream format or codec issues. Error: {message}"
                ),
            };
        }

        let code = error
            .code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        SurfaceAction::Fail {
            message: format!("Failed to load video stream (Error {code}: {message})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_branches_by_kind() {
        assert_eq!(
            StrategyRecovery::classify(&DemuxerError::fatal(DemuxerErrorKind::Network, "x")),
            StrategyAction::RestartLoad
        );
        assert_eq!(
            StrategyRecovery::classify(&DemuxerError::fatal(DemuxerErrorKind::Media, "x")),
            StrategyAction::RecoverMediaError
        );
        assert_eq!(
            StrategyRecovery::classify(&DemuxerError::fatal(
                DemuxerErrorKind::Other,
                "keySystemNoKeys"
            )),
            StrategyAction::Teardown {
                message: "HLS playback failed: keySystemNoKeys".to_string()
            }
        );
    }

    #[test]
    fn non_fatal_demuxer_errors_are_ignored() {
        let err = DemuxerError::recoverable(DemuxerErrorKind::Other, "bufferStalledError");
        assert_eq!(StrategyRecovery::classify(&err), StrategyAction::Ignore);
    }

    #[test]
    fn incompatibility_reloads_once() {
        let recovery = SurfaceRecovery::new(Duration::from_secs(2));
        let err = SurfaceError::new(Some(4), Some("DEMUXER_ERROR_DETECTED_HLS"));

        match recovery.classify(&err, false) {
            SurfaceAction::ScheduleReload { delay, notice } => {
                assert_eq!(delay, Duration::from_secs(2));
                assert!(notice.ends_with("Error: DEMUXER_ERROR_DETECTED_HLS"));
            }
            other => panic!("expected reload, got {other:?}"),
        }

        assert_eq!(
            recovery.classify(&err, true),
            SurfaceAction::Fail {
                message: "Failed to load video stream (Error 4: DEMUXER_ERROR_DETECTED_HLS)"
                    .to_string()
            }
        );
    }

    #[test]
    fn other_surface_errors_fail_immediately() {
        let recovery = SurfaceRecovery::new(Duration::from_secs(2));
        assert_eq!(
            recovery.classify(&SurfaceError::new(Some(2), None), false),
            SurfaceAction::Fail {
                message: "Failed to load video stream (Error 2: Unknown error)".to_string()
            }
        );
    }
}
