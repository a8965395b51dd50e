//! Channel-adapter source
//!
//! Forwards events pushed by an external supplier. The input can only be
//! consumed once, so the producer is single-shot: the first `observe` claims
//! the input and any later `observe` fails with
//! [`RxError::ReplayNotSupported`].
//!
//! The adapter never closes the supplier's channel. The supplier ends the
//! stream by dropping its senders; the adapter then emits `Complete`. On
//! cancellation the adapter just stops reading and releases its receiver.

use futures::future::BoxFuture;
use futures::{FutureExt, Stream, StreamExt};
use parking_lot::Mutex;
use tracing::debug;

use crate::cancel::CancelContext;
use crate::error::{Result, RxError};
use crate::event::Event;
use crate::observer::BoxObserver;
use crate::producer::Producer;

pub(crate) struct EventSource<S> {
    input: Mutex<Option<S>>,
}

impl<S> EventSource<S> {
    pub(crate) fn new(input: S) -> Self {
        Self {
            input: Mutex::new(Some(input)),
        }
    }
}

impl<T, S> Producer<T> for EventSource<S>
where
    T: Send + 'static,
    S: Stream<Item = Event<T>> + Send + Unpin + 'static,
{
    fn open(
        &self,
        mut observer: BoxObserver<T>,
        ctx: CancelContext,
    ) -> Result<BoxFuture<'static, ()>> {
        let mut input = self.input.lock().take().ok_or(RxError::ReplayNotSupported)?;

        Ok(async move {
            loop {
                let next = tokio::select! {
                    biased;
                    _ = ctx.cancelled() => {
                        debug!("event source cancelled");
                        return;
                    }
                    next = input.next() => next,
                };

                match next {
                    Some(Event::Value(v)) => {
                        if observer.on_next(v).is_stop() {
                            return;
                        }
                    }
                    Some(Event::Error(e)) => {
                        observer.on_error(e);
                        return;
                    }
                    Some(Event::Complete) | None => {
                        debug!("event source drained");
                        observer.on_complete();
                        return;
                    }
                }
            }
        }
        .boxed())
    }

    fn is_single_shot(&self) -> bool {
        true
    }
}
