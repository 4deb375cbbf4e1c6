//! Playback lifecycle states

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Errored,
}

impl PlaybackState {
    pub fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }

    /// Allowed edges of the lifecycle graph.
    ///
    /// `Idle` is reachable from anywhere (source change, dispose). `Errored`
    /// can only be left through `Loading`, i.e. an explicit reload.
    pub fn can_transition_to(self, next: PlaybackState) -> bool {
        use PlaybackState::*;
        match (self, next) {
            (_, Idle) => true,
            (Idle, Loading) => true,
            (Loading, Loading | Ready | Playing | Errored) => true,
            (Ready, Loading | Playing | Paused | Errored) => true,
            (Playing, Loading | Paused | Errored) => true,
            (Paused, Loading | Playing | Errored) => true,
            (Errored, Loading) => true,
            _ => false,
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Errored => "errored",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::PlaybackState::*;

    #[test]
    fn errored_only_leaves_through_loading() {
        assert!(Errored.can_transition_to(Loading));
        assert!(Errored.can_transition_to(Idle));
        assert!(!Errored.can_transition_to(Playing));
        assert!(!Errored.can_transition_to(Ready));
    }

    #[test]
    fn playing_and_paused_toggle() {
        assert!(Playing.can_transition_to(Paused));
        assert!(Paused.can_transition_to(Playing));
        assert!(!Idle.can_transition_to(Playing));
    }

    #[test]
    fn errored_reachable_from_active_states() {
        for state in [Loading, Ready, Playing, Paused] {
            assert!(state.can_transition_to(Errored), "{state} -> errored");
        }
        assert!(!Idle.can_transition_to(Errored));
    }
}
