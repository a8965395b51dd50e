use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::warn;

use super::guarded;
use crate::cancel::CancelContext;
use crate::error::{Result, RxError};
use crate::observer::{BoxObserver, Flow, Observer};
use crate::producer::Producer;

/// Runs `hook` once when upstream completes, before `Complete` goes
/// downstream. Error termination skips the hook.
pub(crate) struct DoOnCompleted<T> {
    upstream: Arc<dyn Producer<T>>,
    hook: Arc<dyn Fn() + Send + Sync>,
}

impl<T> DoOnCompleted<T> {
    pub(crate) fn new(upstream: Arc<dyn Producer<T>>, hook: Arc<dyn Fn() + Send + Sync>) -> Self {
        Self { upstream, hook }
    }
}

impl<T: Send + 'static> Producer<T> for DoOnCompleted<T> {
    fn open(&self, observer: BoxObserver<T>, ctx: CancelContext) -> Result<BoxFuture<'static, ()>> {
        let stage = DoOnCompletedObserver {
            downstream: observer,
            hook: Arc::clone(&self.hook),
            done: false,
        };
        self.upstream.open(Box::new(stage), ctx)
    }

    fn is_single_shot(&self) -> bool {
        self.upstream.is_single_shot()
    }
}

struct DoOnCompletedObserver<T> {
    downstream: BoxObserver<T>,
    hook: Arc<dyn Fn() + Send + Sync>,
    done: bool,
}

impl<T: Send + 'static> Observer<T> for DoOnCompletedObserver<T> {
    fn on_next(&mut self, value: T) -> Flow {
        if self.done {
            return Flow::Stop;
        }
        self.downstream.on_next(value)
    }

    fn on_error(&mut self, error: RxError) {
        if !self.done {
            self.done = true;
            self.downstream.on_error(error);
        }
    }

    fn on_complete(&mut self) {
        if self.done {
            return;
        }
        self.done = true;
        let hook = &self.hook;
        match guarded("do_on_completed", || {
            hook();
            Ok(())
        }) {
            Ok(()) => self.downstream.on_complete(),
            Err(e) => {
                warn!(error = %e, "do_on_completed callback failed");
                self.downstream.on_error(e);
            }
        }
    }
}
