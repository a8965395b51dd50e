use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::debug;

use crate::cancel::CancelContext;
use crate::error::{Result, RxError};
use crate::observer::{BoxObserver, Flow, Observer};
use crate::producer::Producer;

/// Passes the first `count` values, then completes and cancels upstream.
pub(crate) struct Take<T> {
    upstream: Arc<dyn Producer<T>>,
    count: usize,
}

impl<T> Take<T> {
    pub(crate) fn new(upstream: Arc<dyn Producer<T>>, count: usize) -> Self {
        Self { upstream, count }
    }
}

impl<T: Send + 'static> Producer<T> for Take<T> {
    fn open(
        &self,
        mut observer: BoxObserver<T>,
        ctx: CancelContext,
    ) -> Result<BoxFuture<'static, ()>> {
        if self.count == 0 {
            // Nothing to wait for: upstream is never opened.
            observer.on_complete();
            return Ok(futures::future::ready(()).boxed());
        }

        let upstream_ctx = ctx.child();
        let stage = TakeObserver {
            downstream: observer,
            remaining: self.count,
            upstream: upstream_ctx.clone(),
            done: false,
        };
        self.upstream.open(Box::new(stage), upstream_ctx)
    }

    fn is_single_shot(&self) -> bool {
        self.upstream.is_single_shot()
    }
}

struct TakeObserver<T> {
    downstream: BoxObserver<T>,
    remaining: usize,
    upstream: CancelContext,
    done: bool,
}

impl<T: Send + 'static> Observer<T> for TakeObserver<T> {
    fn on_next(&mut self, value: T) -> Flow {
        if self.done {
            return Flow::Stop;
        }
        self.remaining -= 1;
        let flow = self.downstream.on_next(value);

        if flow.is_stop() {
            // Downstream is gone; it gets no terminal event.
            self.done = true;
            self.upstream.cancel();
            return Flow::Stop;
        }
        if self.remaining == 0 {
            self.done = true;
            self.upstream.cancel();
            debug!("take satisfied, upstream cancelled");
            self.downstream.on_complete();
            return Flow::Stop;
        }
        flow
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
