use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;

use super::guarded;
use crate::cancel::CancelContext;
use crate::error::{BoxError, Result, RxError};
use crate::observer::{BoxObserver, Flow, Observer};
use crate::producer::Producer;

/// Side-effect callback run for every value
pub(crate) type TapFn<T> = dyn Fn(&T) -> std::result::Result<(), BoxError> + Send + Sync;

/// Calls `tap` for each value and forwards the value unchanged.
///
/// A failing or panicking tap ends the subscription with `Error` and
/// cancels upstream.
pub(crate) struct DoOnNext<T> {
    upstream: Arc<dyn Producer<T>>,
    tap: Arc<TapFn<T>>,
}

impl<T> DoOnNext<T> {
    pub(crate) fn new(upstream: Arc<dyn Producer<T>>, tap: Arc<TapFn<T>>) -> Self {
        Self { upstream, tap }
    }
}

impl<T: Send + 'static> Producer<T> for DoOnNext<T> {
    fn open(&self, observer: BoxObserver<T>, ctx: CancelContext) -> Result<BoxFuture<'static, ()>> {
        let upstream_ctx = ctx.child();
        let stage = DoOnNextObserver {
            downstream: observer,
            tap: Arc::clone(&self.tap),
            upstream: upstream_ctx.clone(),
            done: false,
        };
        self.upstream.open(Box::new(stage), upstream_ctx)
    }

    fn is_single_shot(&self) -> bool {
        self.upstream.is_single_shot()
    }
}

struct DoOnNextObserver<T> {
    downstream: BoxObserver<T>,
    tap: Arc<TapFn<T>>,
    upstream: CancelContext,
    done: bool,
}

impl<T: Send + 'static> Observer<T> for DoOnNextObserver<T> {
    fn on_next(&mut self, value: T) -> Flow {
        if self.done {
            return Flow::Stop;
        }
        let tap = &self.tap;
        match guarded("do_on_next", || tap(&value).map_err(RxError::from)) {
            Ok(()) => self.downstream.on_next(value),
            Err(e) => {
                debug!(error = %e, "do_on_next callback failed");
                self.done = true;
                self.upstream.cancel();
                self.downstream.on_error(e);
                Flow::Stop
            }
        }
    }

    fn on_error(&mut self, error: RxError) {
        if !self.done {
            self.done = true;
            self.downstream.on_error(error);
        }
    }

    fn on_complete(&mut self) {
        if !self.done {
            self.done = true;
            self.downstream.on_complete();
        }
    }
}
