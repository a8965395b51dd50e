//! Process-stop handling
//!
//! A termination signal cancels the root [`CancelContext`], which reaches
//! every running subscription.

use ripple_core::CancelContext;
use tracing::{info, warn};

/// Waits for Ctrl-C, SIGINT, SIGTERM or SIGQUIT.
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for Ctrl-C.
#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Cancel `root` when the process is asked to stop.
pub fn cancel_on_shutdown(root: CancelContext) {
    tokio::spawn(async move {
        match wait_for_shutdown_signal().await {
            Ok(()) => {
                info!("shutdown signal received, cancelling subscriptions");
                root.cancel();
            }
            Err(e) => warn!("failed to install signal handlers: {}", e),
        }
    });
}
