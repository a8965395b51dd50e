//! Tests for finite sources and operator composition

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::StreamExt;
use ripple_core::{CancelContext, CancelState, Event, Flow, Observable, Observer, RxError};
use tokio_test::assert_ready_eq;

use common::{collect, init_tracing};

const LIMIT: Duration = Duration::from_secs(2);

#[tokio::test]
async fn test_just_emits_values_then_complete() {
    init_tracing();
    let mut sub = Observable::just(vec![1, 2, 3]).observe().unwrap();

    let events = collect(&mut sub, LIMIT).await;
    assert_eq!(
        events,
        vec![
            Event::Value(1),
            Event::Value(2),
            Event::Value(3),
            Event::Complete
        ]
    );
}

#[tokio::test]
async fn test_just_empty_list_completes() {
    let mut sub = Observable::<i32>::just(Vec::new()).observe().unwrap();
    assert_eq!(collect(&mut sub, LIMIT).await, vec![Event::Complete]);
}

#[tokio::test]
async fn test_observable_is_restartable() {
    let obs = Observable::just(vec!["a", "b"]);

    let mut first = obs.observe().unwrap();
    let mut second = obs.observe().unwrap();
    assert_ne!(first.id(), second.id());

    let expected = vec![Event::Value("a"), Event::Value("b"), Event::Complete];
    assert_eq!(collect(&mut first, LIMIT).await, expected);
    assert_eq!(collect(&mut second, LIMIT).await, expected);
    assert!(!obs.is_single_shot());
}

#[test]
fn test_observable_debug_reports_single_shot() {
    let obs = Observable::just(vec![1u8]).take(1);
    assert_eq!(format!("{obs:?}"), "Observable { single_shot: false }");

    let (_tx, rx) = tokio::sync::mpsc::channel::<Event<u8>>(1);
    let source = Observable::from_event_source(rx);
    assert_eq!(format!("{source:?}"), "Observable { single_shot: true }");
}

#[tokio::test]
async fn test_empty_and_throw() {
    let mut sub = Observable::<u8>::empty().observe().unwrap();
    assert_eq!(collect(&mut sub, LIMIT).await, vec![Event::Complete]);

    let mut sub = Observable::<u8>::throw(RxError::producer("boom"))
        .observe()
        .unwrap();
    assert_eq!(
        collect(&mut sub, LIMIT).await,
        vec![Event::Error(RxError::producer("boom"))]
    );
}

#[tokio::test]
async fn test_subscription_is_a_stream() {
    let sub = Observable::just(vec![5, 6]).observe().unwrap();
    let values: Vec<i32> = sub.filter_map(|e| async move { e.into_value() }).collect().await;
    assert_eq!(values, vec![5, 6]);
}

#[tokio::test]
async fn test_do_on_next_sees_every_value_unchanged() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    let obs = Observable::just(vec![10, 20, 30]).do_on_next(move |v| s.lock().unwrap().push(*v));

    let mut sub = obs.observe().unwrap();
    let events = collect(&mut sub, LIMIT).await;

    assert_eq!(
        events,
        vec![
            Event::Value(10),
            Event::Value(20),
            Event::Value(30),
            Event::Complete
        ]
    );
    assert_eq!(*seen.lock().unwrap(), vec![10, 20, 30]);
}

#[tokio::test]
async fn test_operators_are_lazy() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c1 = Arc::clone(&calls);
    let c2 = Arc::clone(&calls);

    let _obs = Observable::just(vec![1, 2, 3])
        .do_on_next(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        })
        .do_on_completed(move || {
            c2.fetch_add(1, Ordering::SeqCst);
        });

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_operators_return_new_observables() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);

    let base = Observable::just(vec![1, 2]);
    let _tapped = base.do_on_next(move |_| {
        c.fetch_add(1, Ordering::SeqCst);
    });

    // The tap belongs to `_tapped`, not to `base`.
    let mut sub = base.observe().unwrap();
    collect(&mut sub, LIMIT).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_try_do_on_next_error_terminates_subscription() {
    let obs = Observable::just(vec![1, 2, 3, 4]).try_do_on_next(|v| {
        if *v == 3 {
            Err("three is not allowed".into())
        } else {
            Ok(())
        }
    });

    let mut sub = obs.observe().unwrap();
    assert_eq!(
        collect(&mut sub, LIMIT).await,
        vec![
            Event::Value(1),
            Event::Value(2),
            Event::Error(RxError::Producer("three is not allowed".into()))
        ]
    );
}

#[tokio::test]
async fn test_do_on_next_panic_becomes_error_event() {
    let obs = Observable::just(vec![1, 2]).do_on_next(|v| {
        if *v == 2 {
            panic!("tap exploded");
        }
    });

    let mut sub = obs.observe().unwrap();
    let events = collect(&mut sub, LIMIT).await;
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], Event::Value(1));
    assert_eq!(
        events[1],
        Event::Error(RxError::Producer("do_on_next panicked: tap exploded".into()))
    );
}

#[tokio::test]
async fn test_callback_error_does_not_affect_sibling_subscriptions() {
    let fail = Arc::new(AtomicUsize::new(1));
    let f = Arc::clone(&fail);
    let obs = Observable::just(vec![1, 2]).try_do_on_next(move |_| {
        // Only the first value ever seen fails.
        if f.swap(0, Ordering::SeqCst) == 1 {
            Err("first call fails".into())
        } else {
            Ok(())
        }
    });

    let mut failing = obs.observe().unwrap();
    let events = collect(&mut failing, LIMIT).await;
    assert!(events.last().is_some_and(Event::is_error));

    // Retrying means rebuilding the subscription.
    let mut retry = obs.observe().unwrap();
    assert_eq!(
        collect(&mut retry, LIMIT).await,
        vec![Event::Value(1), Event::Value(2), Event::Complete]
    );
}

#[tokio::test]
async fn test_do_on_completed_runs_once_after_last_value() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let l1 = Arc::clone(&log);
    let l2 = Arc::clone(&log);

    let obs = Observable::just(vec![1, 2])
        .do_on_next(move |v| l1.lock().unwrap().push(format!("next:{v}")))
        .do_on_completed(move || l2.lock().unwrap().push("completed".to_string()));

    let mut sub = obs.observe().unwrap();
    while let Some(event) = sub.next_event().await {
        if event == Event::Complete {
            // The hook has already run by the time Complete is observed.
            assert_eq!(log.lock().unwrap().last().map(String::as_str), Some("completed"));
        }
    }

    assert_eq!(*log.lock().unwrap(), vec!["next:1", "next:2", "completed"]);
}

#[tokio::test]
async fn test_do_on_completed_skipped_on_error() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);

    let obs = Observable::<i32>::throw(RxError::producer("failed"))
        .do_on_completed(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
    let mut sub = obs.observe().unwrap();
    let events = collect(&mut sub, LIMIT).await;
    assert_eq!(events, vec![Event::Error(RxError::producer("failed"))]);

    let c = Arc::clone(&calls);
    let obs = Observable::just(vec![1, 2])
        .try_do_on_next(|_| Err("tap failed".into()))
        .do_on_completed(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
    let mut sub = obs.observe().unwrap();
    collect(&mut sub, LIMIT).await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_do_on_completed_panic_becomes_error() {
    let obs = Observable::just(vec![1]).do_on_completed(|| panic!("hook exploded"));
    let mut sub = obs.observe().unwrap();
    assert_eq!(
        collect(&mut sub, LIMIT).await,
        vec![
            Event::Value(1),
            Event::Error(RxError::Producer(
                "do_on_completed panicked: hook exploded".into()
            ))
        ]
    );
}

#[tokio::test]
async fn test_take_limits_finite_source() {
    let mut sub = Observable::just(vec![1, 2, 3]).take(2).observe().unwrap();
    assert_eq!(
        collect(&mut sub, LIMIT).await,
        vec![Event::Value(1), Event::Value(2), Event::Complete]
    );

    let mut sub = Observable::just(vec![1, 2]).take(5).observe().unwrap();
    assert_eq!(
        collect(&mut sub, LIMIT).await,
        vec![Event::Value(1), Event::Value(2), Event::Complete]
    );
}

#[tokio::test]
async fn test_take_zero_completes_without_blocking() {
    let never = Observable::<u32>::create(|_observer, ctx| async move {
        ctx.cancelled().await;
    });
    let mut sub = never.take(0).observe().unwrap();

    {
        let mut next = tokio_test::task::spawn(sub.next_event());
        assert_ready_eq!(next.poll(), Some(Event::Complete));
    }
    let mut next = tokio_test::task::spawn(sub.next_event());
    assert_ready_eq!(next.poll(), None);
}

#[tokio::test]
async fn test_take_zero_does_not_start_upstream() {
    let opened = Arc::new(AtomicUsize::new(0));
    let o = Arc::clone(&opened);
    let obs = Observable::<u32>::create(move |mut observer, _ctx| {
        o.fetch_add(1, Ordering::SeqCst);
        async move { observer.on_complete() }
    });

    let mut sub = obs.take(0).observe().unwrap();
    assert_eq!(collect(&mut sub, LIMIT).await, vec![Event::Complete]);
    assert_eq!(opened.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_try_take_rejects_negative_count() {
    let obs = Observable::just(vec![1]);
    assert!(matches!(obs.try_take(-1), Err(RxError::InvalidArgument(_))));

    let mut sub = obs.try_take(1).unwrap().observe().unwrap();
    assert_eq!(
        collect(&mut sub, LIMIT).await,
        vec![Event::Value(1), Event::Complete]
    );
}

#[tokio::test]
async fn test_take_cancels_upstream_context() {
    let upstream_state = Arc::new(Mutex::new(None));
    let state = Arc::clone(&upstream_state);

    let obs = Observable::<u32>::create(move |mut observer, ctx| {
        let state = Arc::clone(&state);
        async move {
            let mut n = 0;
            while !ctx.is_cancelled() {
                if observer.on_next(n) == Flow::Stop {
                    break;
                }
                n += 1;
                tokio::task::yield_now().await;
            }
            *state.lock().unwrap() = Some(ctx.state());
        }
    });

    let mut sub = obs.take(3).observe().unwrap();
    assert_eq!(
        collect(&mut sub, LIMIT).await,
        vec![
            Event::Value(0),
            Event::Value(1),
            Event::Value(2),
            Event::Complete
        ]
    );
    sub.closed().await;
    assert_eq!(
        *upstream_state.lock().unwrap(),
        Some(CancelState::Cancelled)
    );
}

#[tokio::test]
async fn test_external_context_cancels_subscription() {
    let parent = CancelContext::new();
    let obs = Observable::<u32>::create(|_observer, ctx| async move {
        ctx.cancelled().await;
    });

    let mut sub = obs.observe_with(&parent).unwrap();
    assert!(!sub.is_cancelled());

    parent.cancel();
    assert!(sub.is_cancelled());
    assert_eq!(collect(&mut sub, LIMIT).await, vec![]);
    tokio::time::timeout(LIMIT, sub.closed()).await.unwrap();
}

#[tokio::test]
async fn test_cancelling_subscription_leaves_parent_active() {
    let parent = CancelContext::new();
    let sub = Observable::just(vec![1]).observe_with(&parent).unwrap();

    sub.cancel();
    assert!(sub.is_cancelled());
    assert!(!parent.is_cancelled());
}

#[tokio::test]
async fn test_dropping_subscription_cancels_producer() {
    let (done_tx, done_rx) = tokio::sync::oneshot::channel::<()>();
    let done_tx = Arc::new(Mutex::new(Some(done_tx)));

    let obs = Observable::<u32>::create(move |_observer, ctx| {
        let done_tx = Arc::clone(&done_tx);
        async move {
            ctx.cancelled().await;
            if let Some(tx) = done_tx.lock().unwrap().take() {
                let _ = tx.send(());
            }
        }
    });

    let sub = obs.observe().unwrap();
    drop(sub);

    tokio::time::timeout(LIMIT, done_rx)
        .await
        .expect("producer was not cancelled")
        .unwrap();
}

#[test]
fn test_blocking_iteration_outside_runtime() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let sub = {
        let _guard = rt.enter();
        Observable::just(vec![1, 2, 3]).take(2).observe().unwrap()
    };

    let events: Vec<_> = sub.blocking_iter().collect();
    assert_eq!(
        events,
        vec![Event::Value(1), Event::Value(2), Event::Complete]
    );
}
