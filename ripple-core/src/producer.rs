//! The emission strategy behind an [`Observable`](crate::Observable)

use futures::future::BoxFuture;

use crate::cancel::CancelContext;
use crate::error::Result;
use crate::observer::BoxObserver;

/// Emission strategy bound to an observable.
///
/// `open` runs synchronously inside `observe`. It validates the subscription
/// (a single-shot source claims its input here and fails with
/// [`RxError::ReplayNotSupported`](crate::RxError::ReplayNotSupported) the
/// second time) and returns the future that pushes events into `observer`.
/// `observe` spawns that future on its own task.
///
/// The returned future must:
/// - stop once `ctx` is cancelled, checking it before every emission and
///   around every await point
/// - stop once `observer.on_next` returns [`Flow::Stop`](crate::Flow::Stop)
/// - deliver at most one terminal event
///
/// Leaving without a terminal event (cancellation) is allowed: dropping the
/// observer closes the delivery channel.
pub trait Producer<T>: Send + Sync + 'static {
    fn open(&self, observer: BoxObserver<T>, ctx: CancelContext) -> Result<BoxFuture<'static, ()>>;

    /// Whether this producer can back only one subscription.
    fn is_single_shot(&self) -> bool {
        false
    }
}
