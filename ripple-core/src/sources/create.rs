//! Closure-backed source for custom emission strategies

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::cancel::CancelContext;
use crate::error::Result;
use crate::observer::BoxObserver;
use crate::producer::Producer;

type CreateFn<T> = dyn Fn(BoxObserver<T>, CancelContext) -> BoxFuture<'static, ()> + Send + Sync;

/// Runs a user closure once per subscription.
pub(crate) struct Create<T> {
    f: Arc<CreateFn<T>>,
}

impl<T: Send + 'static> Create<T> {
    pub(crate) fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(BoxObserver<T>, CancelContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            f: Arc::new(move |observer: BoxObserver<T>, ctx: CancelContext| {
                f(observer, ctx).boxed()
            }),
        }
    }
}

impl<T: Send + 'static> Producer<T> for Create<T> {
    fn open(&self, observer: BoxObserver<T>, ctx: CancelContext) -> Result<BoxFuture<'static, ()>> {
        Ok((self.f)(observer, ctx))
    }
}
