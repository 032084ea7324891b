//! Transport — play/stop state, virtual clock position, and the live
//! cancellation token.

use super::cancel::CancellationToken;
use super::time::Moment;

/// Playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Stopped,
    Playing,
}

/// Tracks the virtual clock and which run is current.
#[derive(Debug)]
pub struct Transport {
    state: PlayState,
    position: Moment,
    token: CancellationToken,
}

impl Transport {
    /// A stopped transport at position zero. Its initial token is already
    /// cancelled so nothing can be scheduled against it.
    pub fn new() -> Self {
        let token = CancellationToken::new();
        token.cancel();
        Self {
            state: PlayState::Stopped,
            position: Moment::ZERO,
            token,
        }
    }

    /// Start a new run. Returns `true` if the transport was stopped; calling it
    /// while playing keeps the current run and token.
    pub fn play(&mut self) -> bool {
        if self.state == PlayState::Playing {
            return false;
        }
        self.token = CancellationToken::new();
        self.state = PlayState::Playing;
        true
    }

    /// Stop the current run, cancelling its token. Returns `true` if the
    /// transport was playing.
    pub fn stop(&mut self) -> bool {
        if self.state == PlayState::Stopped {
            return false;
        }
        self.token.cancel();
        self.state = PlayState::Stopped;
        true
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    pub fn position(&self) -> Moment {
        self.position
    }

    /// Token for entries scheduled during the current run.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Advance the clock by `span`, returning the covered range `[from, to)`.
    ///
    /// The clock keeps moving while stopped so a restarted run does not land in
    /// the past relative to sounds the sink is still releasing.
    pub fn advance(&mut self, span: Moment) -> (Moment, Moment) {
        let from = self.position;
        self.position += span;
        (from, self.position)
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}
