//! # Cooperative cancellation
//!
//! [`CancelContext`] is a one-way `active -> cancelled` signal shared by a
//! subscription and the producer task feeding it. It wraps a
//! [`CancellationToken`], so the flag is atomic and safe to read or flip from
//! the consumer task and the producer task at the same time.
//!
//! ## Hierarchy
//! Every subscription runs under a **child** of the context handed to
//! `observe_with`, and every operator that may stop its upstream early
//! (`take`, `try_do_on_next`) derives another child for that upstream:
//!
//! ```text
//! external ctx ──► subscription ctx ──► take's upstream ctx ──► interval
//! ```
//!
//! Cancelling a parent reaches every descendant. Cancelling a child never
//! affects its parent, so a satisfied `take` stops the timer without tearing
//! down the subscription that is still delivering `Complete`.

use tokio_util::sync::CancellationToken;

/// Observable state of a [`CancelContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelState {
    Active,
    Cancelled,
}

/// Shared one-way cancellation signal.
#[derive(Debug, Clone, Default)]
pub struct CancelContext {
    token: CancellationToken,
}

impl CancelContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip to `Cancelled`. Idempotent; there is no way back.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn state(&self) -> CancelState {
        if self.is_cancelled() {
            CancelState::Cancelled
        } else {
            CancelState::Active
        }
    }

    /// Derive a context that is cancelled together with `self` but can also
    /// be cancelled on its own.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    /// Resolves once the context is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }
}

impl From<CancellationToken> for CancelContext {
    fn from(token: CancellationToken) -> Self {
        Self { token }
    }
}
