//! Observable builders for each demo subcommand

use ripple_core::{CancelContext, Observable};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::DemoConfig;

/// Fixed values with a logging tap.
pub fn just(values: Vec<i64>) -> ripple_core::Result<Observable<i64>> {
    Ok(Observable::just(values).do_on_next(|v| info!("DoOnNext {}", v)))
}

/// Timer with logging taps, limited to `take` ticks.
pub fn interval(period: Duration, take: usize) -> ripple_core::Result<Observable<u64>> {
    Ok(Observable::interval(period)?
        .do_on_next(|v| info!("DoOnNext {}", v))
        .do_on_completed(|| info!("DoOnCompleted"))
        .take(take))
}

/// Unbounded timer with a logging tap; the caller ends it by cancellation.
pub fn on_next(period: Duration) -> ripple_core::Result<Observable<u64>> {
    Ok(Observable::interval(period)?
        .do_on_next(|v| info!("OnNext {}", v))
        .do_on_completed(|| info!("DoOnCompleted")))
}

/// Channel-backed source fed by a timer for `config.event_source.window_ms`.
///
/// Spawns the feeder task: it forwards timer ticks into a bounded channel,
/// then cancels its timer and drops the sender, which completes the
/// returned observable. `parent` cancellation stops the feeder early.
pub fn from_channel(
    config: &DemoConfig,
    parent: &CancelContext,
) -> ripple_core::Result<Observable<u64>> {
    let ticks = Observable::interval(config.period())?;
    let (tx, rx) = mpsc::channel(config.event_source.capacity);
    let feeder_ctx = parent.child();
    let window = config.source_window();

    let mut sub = ticks.observe_with(&feeder_ctx)?;
    tokio::spawn(async move {
        let stop = feeder_ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            stop.cancel();
        });

        while let Some(event) = sub.next_event().await {
            let forwarded = tokio::select! {
                _ = feeder_ctx.cancelled() => break,
                sent = tx.send(event) => sent,
            };
            if forwarded.is_err() {
                debug!("event source consumer gone, feeder stopping");
                break;
            }
        }
        debug!("feeder closing channel");
    });

    Ok(Observable::<u64>::from_event_source(rx)
        .do_on_completed(|| info!("DoOnCompleted"))
        .take(config.event_source.take))
}

/// Values 1..=5 whose tap fails on `fail_at`.
pub fn faulty(fail_at: i64) -> ripple_core::Result<Observable<i64>> {
    Ok(Observable::just(1..=5).try_do_on_next(move |v| {
        if *v == fail_at {
            Err(format!("value {v} rejected").into())
        } else {
            info!("DoOnNext {}", v);
            Ok(())
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_core::Event;

    async fn events<T>(obs: Observable<T>) -> Vec<Event<T>>
    where
        T: Send + 'static,
    {
        let mut sub = obs.observe().unwrap();
        let mut out = Vec::new();
        tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(event) = sub.next_event().await {
                out.push(event);
            }
        })
        .await
        .unwrap();
        out
    }

    fn fast_config() -> DemoConfig {
        let mut config = DemoConfig::default();
        config.interval.period_ms = 10;
        config.event_source.window_ms = 80;
        config.event_source.capacity = 4;
        config
    }

    #[tokio::test]
    async fn test_just_demo() {
        let obs = just(vec![1, 2, 3]).unwrap();
        assert_eq!(
            events(obs).await,
            vec![
                Event::Value(1),
                Event::Value(2),
                Event::Value(3),
                Event::Complete
            ]
        );
    }

    #[tokio::test]
    async fn test_interval_demo_takes_n() {
        let obs = interval(Duration::from_millis(10), 3).unwrap();
        assert_eq!(
            events(obs).await,
            vec![
                Event::Value(0),
                Event::Value(1),
                Event::Value(2),
                Event::Complete
            ]
        );
    }

    #[tokio::test]
    async fn test_on_next_demo_runs_until_cancelled() {
        let ctx = CancelContext::new();
        let mut sub = on_next(Duration::from_millis(10))
            .unwrap()
            .observe_with(&ctx)
            .unwrap();

        assert_eq!(sub.next_event().await, Some(Event::Value(0)));
        ctx.cancel();
        assert_eq!(sub.next_event().await, None);
    }

    #[tokio::test]
    async fn test_faulty_demo_errors_at_value() {
        let evs = events(faulty(3).unwrap()).await;
        assert_eq!(evs.len(), 3);
        assert_eq!(evs[..2], [Event::Value(1), Event::Value(2)]);
        assert!(evs[2].is_error());
    }

    #[tokio::test]
    async fn test_from_channel_demo_completes_when_window_closes() {
        let mut config = fast_config();
        config.event_source.take = 1000;
        let obs = from_channel(&config, &CancelContext::new()).unwrap();
        assert!(obs.is_single_shot());

        let evs = events(obs).await;
        assert_eq!(evs.last(), Some(&Event::Complete));
        let values: Vec<u64> = evs.into_iter().filter_map(Event::into_value).collect();
        assert!(!values.is_empty());
        assert_eq!(values, (0..values.len() as u64).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_from_channel_demo_take_limits() {
        let mut config = fast_config();
        config.event_source.window_ms = 10_000;
        config.event_source.take = 2;
        let obs = from_channel(&config, &CancelContext::new()).unwrap();

        assert_eq!(
            events(obs).await,
            vec![Event::Value(0), Event::Value(1), Event::Complete]
        );
    }
}
