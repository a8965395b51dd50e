//! Push-side consumer interface

use tokio::sync::mpsc;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::error::RxError;
use crate::event::Event;

/// Tells a producer whether its consumer still wants values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

impl Flow {
    pub fn is_stop(self) -> bool {
        matches!(self, Flow::Stop)
    }
}

/// Receives the events of one subscription, in emission order.
///
/// Producers must stop calling `on_next` once it returns [`Flow::Stop`] and
/// must call at most one of `on_error` / `on_complete`. Implementations
/// still guard against misbehaving producers and ignore anything that
/// arrives after a terminal event.
pub trait Observer<T>: Send + 'static {
    fn on_next(&mut self, value: T) -> Flow;
    fn on_error(&mut self, error: RxError);
    fn on_complete(&mut self);
}

/// Observer handed to producers and operator stages
pub type BoxObserver<T> = Box<dyn Observer<T>>;

impl<T, O: Observer<T> + ?Sized> Observer<T> for Box<O> {
    fn on_next(&mut self, value: T) -> Flow {
        (**self).on_next(value)
    }

    fn on_error(&mut self, error: RxError) {
        (**self).on_error(error);
    }

    fn on_complete(&mut self) {
        (**self).on_complete();
    }
}

/// Terminal stage of every subscription: forwards events into the delivery
/// channel.
///
/// The sender is dropped on the terminal event, which closes the channel.
/// Dropping the observer without a terminal event (cancellation) closes it
/// too; either way the channel is closed exactly once.
pub(crate) struct ChannelObserver<T> {
    id: Uuid,
    tx: Option<mpsc::UnboundedSender<Event<T>>>,
}

impl<T> ChannelObserver<T> {
    pub(crate) fn new(id: Uuid, tx: mpsc::UnboundedSender<Event<T>>) -> Self {
        Self { id, tx: Some(tx) }
    }

    fn finish(&mut self, event: Event<T>) {
        match self.tx.take() {
            Some(tx) => {
                debug!(subscription = %self.id, kind = event.kind(), "terminal event");
                // The consumer may already be gone; nothing left to tell it.
                let _ = tx.send(event);
            }
            None => warn!(
                subscription = %self.id,
                kind = event.kind(),
                "event after terminal ignored"
            ),
        }
    }
}

impl<T: Send + 'static> Observer<T> for ChannelObserver<T> {
    fn on_next(&mut self, value: T) -> Flow {
        let Some(tx) = &self.tx else {
            return Flow::Stop;
        };
        if tx.send(Event::Value(value)).is_err() {
            debug!(subscription = %self.id, "consumer dropped, stopping delivery");
            self.tx = None;
            return Flow::Stop;
        }
        trace!(subscription = %self.id, "value delivered");
        Flow::Continue
    }

    fn on_error(&mut self, error: RxError) {
        self.finish(Event::Error(error));
    }

    fn on_complete(&mut self) {
        self.finish(Event::Complete);
    }
}
