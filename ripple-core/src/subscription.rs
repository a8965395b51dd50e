//! # Live subscriptions
//!
//! A [`Subscription`] is one realization of an observable: a producer task
//! pushing into an unbounded channel and the receiving end handed to the
//! caller. It can be drained three ways:
//!
//! - `next_event().await` in a loop
//! - as a [`futures::Stream`] of [`Event`]s
//! - [`blocking_iter`](Subscription::blocking_iter) from a plain thread
//!
//! ## Lifecycle
//!
//! ```text
//! observe() ──► producer task running ──► terminal event ──► channel closed
//!                      │
//!                      └── cancel() / parent cancel / drop ──► channel closed
//! ```
//!
//! Once the subscription is cancelled the caller sees no further events,
//! even ones already buffered, and the producer task exits at its next
//! check point.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cancel::CancelContext;
use crate::event::Event;

/// Handle to one running subscription. Dropping it cancels the subscription.
pub struct Subscription<T> {
    id: Uuid,
    events: mpsc::UnboundedReceiver<Event<T>>,
    ctx: CancelContext,
    task: Option<JoinHandle<()>>,
}

impl<T> Subscription<T> {
    pub(crate) fn new(
        id: Uuid,
        events: mpsc::UnboundedReceiver<Event<T>>,
        ctx: CancelContext,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            id,
            events,
            ctx,
            task: Some(task),
        }
    }

    /// Unique id, also attached to this subscription's log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Stop the subscription. Idempotent.
    pub fn cancel(&self) {
        if !self.ctx.is_cancelled() {
            debug!(subscription = %self.id, "subscription cancelled");
        }
        self.ctx.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.ctx.is_cancelled()
    }

    /// The subscription's own cancellation context.
    pub fn context(&self) -> &CancelContext {
        &self.ctx
    }

    /// Wait for the next event. `None` once the channel is closed or the
    /// subscription is cancelled.
    pub async fn next_event(&mut self) -> Option<Event<T>> {
        if self.ctx.is_cancelled() {
            return None;
        }
        let event = self.events.recv().await?;
        if self.ctx.is_cancelled() {
            return None;
        }
        Some(event)
    }

    /// Wait until the producer task has exited and released the delivery
    /// channel.
    pub async fn closed(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(subscription = %self.id, error = %e, "producer task failed");
            }
        }
    }

    /// Drain events from a thread outside the runtime.
    ///
    /// # Panics
    /// Iterating panics when called from within an async context, like
    /// [`mpsc::UnboundedReceiver::blocking_recv`].
    pub fn blocking_iter(self) -> BlockingEvents<T> {
        BlockingEvents { subscription: self }
    }
}

impl<T> Stream for Subscription<T> {
    type Item = Event<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.ctx.is_cancelled() {
            return Poll::Ready(None);
        }
        self.events.poll_recv(cx)
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        // Releases the producer task if the caller stops early.
        self.ctx.cancel();
    }
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("cancelled", &self.ctx.is_cancelled())
            .finish()
    }
}

/// Blocking iterator over a subscription's events.
pub struct BlockingEvents<T> {
    subscription: Subscription<T>,
}

impl<T> BlockingEvents<T> {
    /// Cancel the underlying subscription.
    pub fn cancel(&self) {
        self.subscription.cancel();
    }
}

impl<T> Iterator for BlockingEvents<T> {
    type Item = Event<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let sub = &mut self.subscription;
        if sub.ctx.is_cancelled() {
            return None;
        }
        let event = sub.events.blocking_recv()?;
        if sub.ctx.is_cancelled() {
            return None;
        }
        Some(event)
    }
}
