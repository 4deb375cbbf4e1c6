//! Cancellable one-shot timers that report back through the event channel

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::surface::{EventSender, PlayerEvent};

/// A single pending deadline. Re-arming cancels the previous one, and every
/// arming gets a new generation so a late event from a cancelled timer can be
/// told apart from the live one.
#[derive(Debug, Default)]
pub struct OneShotTimer {
    token: Option<CancellationToken>,
    generation: u64,
}

impl OneShotTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer; `make_event` builds the event posted when it elapses
    pub fn schedule<F>(&mut self, delay: Duration, events: &EventSender, make_event: F)
    where
        F: FnOnce(u64) -> PlayerEvent + Send + 'static,
    {
        self.cancel();
        self.generation += 1;

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("No async runtime available, timer not scheduled");
                return;
            }
        };

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let events = events.clone();
        let event = make_event(self.generation);

        handle.spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => events.emit(event),
                _ = cancelled.cancelled() => {}
            }
        });

        self.token = Some(token);
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }

    /// Consume an elapsed event; true only for the live arming
    pub fn fire(&mut self, generation: u64) -> bool {
        if self.token.is_some() && generation == self.generation {
            self.token = None;
            true
        } else {
            false
        }
    }
}

impl Drop for OneShotTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
