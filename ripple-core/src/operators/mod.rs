//! Operator stages
//!
//! Each operator is a [`Producer`](crate::Producer) wrapping its upstream
//! producer. On `open` it wraps the downstream observer in its own stage and
//! opens the upstream with that stage, so a whole chain runs inside the one
//! task spawned by `observe`.
//!
//! Operators that can end a subscription early (`take`, a failing
//! `try_do_on_next`) open their upstream under a child [`CancelContext`]
//! and cancel it once they are done, which stops timers and channel readers
//! without waiting for their next emission.
//!
//! [`CancelContext`]: crate::CancelContext

mod do_on_completed;
mod do_on_next;
mod take;

pub(crate) use do_on_completed::DoOnCompleted;
pub(crate) use do_on_next::{DoOnNext, TapFn};
pub(crate) use take::Take;

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::error::{Result, RxError};

/// Run a user callback, turning a panic into a producer error.
fn guarded(context: &str, f: impl FnOnce() -> Result<()>) -> Result<()> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(res) => res,
        Err(payload) => Err(RxError::from_panic(context, payload.as_ref())),
    }
}
