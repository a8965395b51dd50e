//! Caller-side handling of terminal errors
//!
//! The core reports failures as `Event::Error` and leaves the reaction to
//! the caller. The demo runner offers three reactions:
//!
//! - `fail`: stop and return the error (non-zero exit)
//! - `log`: log the error and finish normally
//! - `retry`: rebuild the observable and subscribe again, up to a limit

use anyhow::{Context, anyhow};
use ripple_core::{CancelContext, Event, Observable};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    Fail,
    Log,
    Retry,
}

/// What a drained subscription delivered
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub values: usize,
    pub completed: bool,
    pub errors: usize,
    pub attempts: u32,
}

/// Subscribe to the observable produced by `build` and log every event
/// until the subscription closes, applying `policy` to error events.
///
/// `build` runs once per attempt, so single-shot sources get a fresh
/// input on retry.
pub async fn drain<T, F>(
    build: F,
    ctx: &CancelContext,
    policy: ErrorPolicy,
    max_retries: u32,
) -> anyhow::Result<Outcome>
where
    T: Debug + Send + 'static,
    F: Fn() -> ripple_core::Result<Observable<T>>,
{
    let mut outcome = Outcome::default();

    'attempts: loop {
        outcome.attempts += 1;
        let obs = build().context("failed to build observable")?;
        let mut sub = obs.observe_with(ctx).context("failed to subscribe")?;

        while let Some(event) = sub.next_event().await {
            info!(subscription = %sub.id(), "{:?}", event);
            match event {
                Event::Value(_) => outcome.values += 1,
                Event::Complete => outcome.completed = true,
                Event::Error(e) => {
                    outcome.errors += 1;
                    match policy {
                        ErrorPolicy::Fail => {
                            return Err(anyhow!(e).context("subscription terminated with error"));
                        }
                        ErrorPolicy::Log => {
                            warn!(error = %e, label = e.as_label(), "subscription failed, continuing");
                        }
                        ErrorPolicy::Retry if outcome.attempts <= max_retries => {
                            warn!(
                                error = %e,
                                attempt = outcome.attempts,
                                max_retries,
                                "subscription failed, resubscribing"
                            );
                            continue 'attempts;
                        }
                        ErrorPolicy::Retry => {
                            return Err(anyhow!(e).context(format!(
                                "subscription still failing after {max_retries} retries"
                            )));
                        }
                    }
                }
            }
        }

        if ctx.is_cancelled() {
            info!("stopped by cancellation");
        }
        return Ok(outcome);
    }
}
