//! Timer source

use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

use crate::cancel::CancelContext;
use crate::error::{Result, RxError};
use crate::observer::BoxObserver;
use crate::producer::Producer;

/// Emits 0, 1, 2, ... once per `period`, first tick one period after
/// subscription. Never completes on its own.
pub(crate) struct Interval {
    period: Duration,
}

impl Interval {
    pub(crate) fn new(period: Duration) -> Result<Self> {
        if period.is_zero() {
            return Err(RxError::InvalidArgument(
                "interval period must be greater than zero".to_string(),
            ));
        }
        Ok(Self { period })
    }
}

impl Producer<u64> for Interval {
    fn open(
        &self,
        mut observer: BoxObserver<u64>,
        ctx: CancelContext,
    ) -> Result<BoxFuture<'static, ()>> {
        let period = self.period;
        Ok(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            // A slow consumer shifts the schedule instead of bursting.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut tick: u64 = 0;

            loop {
                tokio::select! {
                    biased;
                    _ = ctx.cancelled() => {
                        debug!(ticks = tick, "interval cancelled");
                        return;
                    }
                    _ = ticker.tick() => {
                        if ctx.is_cancelled() {
                            return;
                        }
                        if observer.on_next(tick).is_stop() {
                            debug!(ticks = tick + 1, "interval stopped by downstream");
                            return;
                        }
                        tick += 1;
                    }
                }
            }
        }
        .boxed())
    }
}
