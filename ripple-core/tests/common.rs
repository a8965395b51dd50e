//! Common test utilities

use std::time::Duration;

use ripple_core::{Event, Subscription};

/// Route tracing output through the test harness
#[allow(dead_code)] // Used by other test modules
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .try_init();
}

/// Drain a subscription until its channel closes, failing after `limit`
#[allow(dead_code)] // Used by other test modules
pub async fn collect<T>(sub: &mut Subscription<T>, limit: Duration) -> Vec<Event<T>> {
    tokio::time::timeout(limit, async {
        let mut events = Vec::new();
        while let Some(event) = sub.next_event().await {
            events.push(event);
        }
        events
    })
    .await
    .expect("subscription did not close in time")
}
