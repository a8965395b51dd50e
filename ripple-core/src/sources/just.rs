//! Finite sources: `just`, `empty`, `throw`

use std::marker::PhantomData;

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::debug;

use crate::cancel::CancelContext;
use crate::error::{Result, RxError};
use crate::observer::BoxObserver;
use crate::producer::Producer;

/// Emits a fixed list in order, then `Complete`.
///
/// Each subscription replays the full list from a fresh clone.
pub(crate) struct Just<T> {
    values: Vec<T>,
}

impl<T> Just<T> {
    pub(crate) fn new(values: Vec<T>) -> Self {
        Self { values }
    }
}

impl<T: Clone + Send + Sync + 'static> Producer<T> for Just<T> {
    fn open(
        &self,
        mut observer: BoxObserver<T>,
        ctx: CancelContext,
    ) -> Result<BoxFuture<'static, ()>> {
        let values = self.values.clone();
        Ok(async move {
            for value in values {
                if ctx.is_cancelled() {
                    debug!("just: cancelled mid-sequence");
                    return;
                }
                if observer.on_next(value).is_stop() {
                    return;
                }
            }
            observer.on_complete();
        }
        .boxed())
    }
}

/// Emits nothing but a terminal event: `Complete` when `error` is `None`.
pub(crate) struct Terminal<T> {
    error: Option<RxError>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Terminal<T> {
    pub(crate) fn complete() -> Self {
        Self {
            error: None,
            _marker: PhantomData,
        }
    }

    pub(crate) fn error(error: RxError) -> Self {
        Self {
            error: Some(error),
            _marker: PhantomData,
        }
    }
}

impl<T: Send + 'static> Producer<T> for Terminal<T> {
    fn open(
        &self,
        mut observer: BoxObserver<T>,
        _ctx: CancelContext,
    ) -> Result<BoxFuture<'static, ()>> {
        match &self.error {
            Some(e) => observer.on_error(e.clone()),
            None => observer.on_complete(),
        }
        Ok(futures::future::ready(()).boxed())
    }
}
