//! Auto-hiding control overlay

use std::time::Duration;

use super::surface::{EventSender, PlayerEvent};
use super::timer::OneShotTimer;

/// Visibility of the on-screen controls.
///
/// Controls are always visible while not playing. While playing they hide
/// after `hide_delay` without pointer movement, or as soon as the pointer
/// leaves the surface.
#[derive(Debug)]
pub struct ControlsVisibility {
    shown: bool,
    hide_delay: Duration,
    timer: OneShotTimer,
}

impl ControlsVisibility {
    pub fn new(hide_delay: Duration) -> Self {
        Self {
            shown: true,
            hide_delay,
            timer: OneShotTimer::new(),
        }
    }

    pub fn is_visible(&self, playing: bool) -> bool {
        self.shown || !playing
    }

    pub fn pointer_moved(&mut self, playing: bool, events: &EventSender) {
        self.shown = true;
        if playing {
            self.timer.schedule(
                self.hide_delay,
                events,
                PlayerEvent::ControlsHideTimerElapsed,
            );
        } else {
            self.timer.cancel();
        }
    }

    pub fn pointer_left(&mut self, playing: bool) {
        if playing {
            self.timer.cancel();
            self.shown = false;
        }
    }

    /// Entering `Playing` starts the inactivity countdown; leaving it shows the controls
    pub fn playing_changed(&mut self, playing: bool, events: &EventSender) {
        self.pointer_moved(playing, events);
    }

    pub fn timer_elapsed(&mut self, generation: u64, playing: bool) {
        if self.timer.fire(generation) && playing {
            self.shown = false;
        }
    }

    pub fn cancel(&mut self) {
        self.timer.cancel();
    }
}
