//! Observable builder and subscription entry point

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;
use uuid::Uuid;

use crate::cancel::CancelContext;
use crate::error::{BoxError, Result, RxError};
use crate::event::Event;
use crate::observer::{BoxObserver, ChannelObserver};
use crate::operators::{DoOnCompleted, DoOnNext, Take, TapFn};
use crate::producer::Producer;
use crate::sources::{Create, EventSource, Interval, Just, Terminal};
use crate::subscription::Subscription;

/// Lazy, composable description of an event source.
///
/// Building an observable and attaching operators does nothing by itself.
/// Work starts when [`observe`](Self::observe) opens a [`Subscription`].
/// Operators never modify `self`; they return a new observable wrapping
/// it, so subscriptions already running are never affected by operators
/// attached later.
///
/// # Example
/// ```no_run
/// use ripple_core::{Event, Observable};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), ripple_core::RxError> {
/// let obs = Observable::just(vec![1, 2, 3])
///     .do_on_next(|v| tracing::info!("next {}", v))
///     .do_on_completed(|| tracing::info!("completed"));
///
/// let mut sub = obs.observe()?;
/// while let Some(event) = sub.next_event().await {
///     if let Event::Error(e) = event {
///         return Err(e);
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct Observable<T> {
    producer: Arc<dyn Producer<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            producer: Arc::clone(&self.producer),
        }
    }
}

impl<T: Send + 'static> Observable<T> {
    /// Wrap a custom [`Producer`].
    pub fn from_producer<P: Producer<T>>(producer: P) -> Self {
        Self {
            producer: Arc::new(producer),
        }
    }

    /// Emit every element in order, then `Complete`.
    pub fn just<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Clone + Sync,
    {
        Self::from_producer(Just::new(values.into_iter().collect()))
    }

    /// Complete immediately without values.
    pub fn empty() -> Self {
        Self::from_producer(Terminal::complete())
    }

    /// Terminate immediately with `error`.
    pub fn throw(error: RxError) -> Self {
        Self::from_producer(Terminal::error(error))
    }

    /// Build an observable from a closure run once per subscription.
    ///
    /// The closure receives the subscription's observer and cancellation
    /// context and must follow the [`Producer`] rules.
    pub fn create<F, Fut>(f: F) -> Self
    where
        F: Fn(BoxObserver<T>, CancelContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::from_producer(Create::new(f))
    }

    /// Forward events from an external channel until its senders are gone.
    ///
    /// Single-shot: a second `observe` fails with
    /// [`RxError::ReplayNotSupported`].
    pub fn from_event_source(rx: mpsc::Receiver<Event<T>>) -> Self {
        Self::from_stream(ReceiverStream::new(rx))
    }

    /// Forward events from any stream until it ends. Single-shot.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Event<T>> + Send + Unpin + 'static,
    {
        Self::from_producer(EventSource::new(stream))
    }

    /// Emit at most `count` values, then complete and cancel upstream.
    ///
    /// `take(0)` completes at subscription time and never starts upstream.
    pub fn take(&self, count: usize) -> Self {
        Self::from_producer(Take::new(Arc::clone(&self.producer), count))
    }

    /// [`take`](Self::take) for callers holding a signed count.
    pub fn try_take(&self, count: i64) -> Result<Self> {
        let count = usize::try_from(count)
            .map_err(|_| RxError::InvalidArgument(format!("take count must be >= 0, got {count}")))?;
        Ok(self.take(count))
    }

    /// Call `f` for every value as it passes through.
    pub fn do_on_next<F>(&self, f: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.try_do_on_next(move |v| {
            f(v);
            Ok(())
        })
    }

    /// Call a fallible `f` for every value. An `Err` (or a panic) ends the
    /// subscription with an `Error` event.
    pub fn try_do_on_next<F>(&self, f: F) -> Self
    where
        F: Fn(&T) -> std::result::Result<(), BoxError> + Send + Sync + 'static,
    {
        let tap: Arc<TapFn<T>> = Arc::new(f);
        Self::from_producer(DoOnNext::new(Arc::clone(&self.producer), tap))
    }

    /// Call `f` once after upstream completes, before `Complete` is
    /// delivered. Not called when the subscription ends with an error or is
    /// cancelled.
    pub fn do_on_completed<F>(&self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::from_producer(DoOnCompleted::new(Arc::clone(&self.producer), Arc::new(f)))
    }

    /// `true` when the underlying source can back only one subscription.
    pub fn is_single_shot(&self) -> bool {
        self.producer.is_single_shot()
    }

    /// Open a new subscription with its own cancellation context.
    ///
    /// # Panics
    /// Must be called within a tokio runtime, like [`tokio::spawn`].
    pub fn observe(&self) -> Result<Subscription<T>> {
        self.observe_with(&CancelContext::new())
    }

    /// Open a new subscription under `parent`: cancelling `parent` cancels
    /// the subscription, cancelling the subscription leaves `parent` alone.
    ///
    /// # Panics
    /// Must be called within a tokio runtime, like [`tokio::spawn`].
    pub fn observe_with(&self, parent: &CancelContext) -> Result<Subscription<T>> {
        let id = Uuid::new_v4();
        let ctx = parent.child();
        let (tx, rx) = mpsc::unbounded_channel();

        let run = self
            .producer
            .open(Box::new(ChannelObserver::new(id, tx)), ctx.clone())?;
        debug!(subscription = %id, "subscription opened");

        let task = tokio::spawn(async move {
            run.await;
            debug!(subscription = %id, "producer finished");
        });

        Ok(Subscription::new(id, rx, ctx, task))
    }
}

impl Observable<u64> {
    /// Emit 0, 1, 2, ... every `period`, starting one period after
    /// subscription. Never completes; combine with [`take`](Self::take) or
    /// cancel the subscription.
    pub fn interval(period: Duration) -> Result<Self> {
        Ok(Self::from_producer(Interval::new(period)?))
    }
}

impl<T: 'static> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("single_shot", &self.producer.is_single_shot())
            .finish()
    }
}
