//! Waits on the real clock: cancellation latency and concurrent callers.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use settle::{
    CancellationToken, ElementVisible, Locator, ScriptedElement, ScriptedSession, SystemClock,
    WaitEngine, WaitRequest,
};
use std::thread;
use std::time::{Duration, Instant};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn test_cancel_interrupts_sleep() {
    let clock = SystemClock::new();
    let session = ScriptedSession::new(clock);
    let engine = WaitEngine::with_clock(clock);
    let token = CancellationToken::new();

    let request = WaitRequest::new(
        ElementVisible::new(Locator::id("never")),
        ms(10_000),
        ms(2_000),
    )
    .unwrap()
    .with_cancellation(token.clone());

    let started = Instant::now();
    let canceller = thread::spawn(move || {
        thread::sleep(ms(100));
        token.cancel();
    });
    let outcome = engine.wait(&session, request);
    canceller.join().unwrap();

    assert!(outcome.is_cancelled(), "got {}", outcome.label());
    // Well inside the 2s poll interval, let alone the 10s timeout
    assert!(started.elapsed() < ms(1_500), "took {:?}", started.elapsed());
    assert_eq!(outcome.polls(), 1);
}

#[test]
fn test_unbounded_wait_runs_until_cancelled() {
    let clock = SystemClock::new();
    let session = ScriptedSession::new(clock);
    let engine = WaitEngine::with_clock(clock);
    let token = CancellationToken::new();

    let request = WaitRequest::new(
        ElementVisible::new(Locator::id("never")),
        Duration::MAX,
        Duration::MAX,
    )
    .unwrap()
    .with_cancellation(token.clone());

    let started = Instant::now();
    let canceller = thread::spawn(move || {
        thread::sleep(ms(50));
        token.cancel();
    });
    let outcome = engine.wait(&session, request);
    canceller.join().unwrap();

    assert!(outcome.is_cancelled(), "got {}", outcome.label());
    assert!(started.elapsed() < ms(1_500), "took {:?}", started.elapsed());
    assert_eq!(outcome.polls(), 1);
}

#[test]
fn test_concurrent_waits_share_engine_and_session() {
    let clock = SystemClock::new();
    let mut session = ScriptedSession::new(clock);
    for i in 0..4u64 {
        session = session.with_element(
            ScriptedElement::new(Locator::test_id(format!("row-{i}"))).appears_at(ms(40 * i)),
        );
    }
    let engine = WaitEngine::with_clock(clock);

    thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let engine = &engine;
                let session = &session;
                scope.spawn(move || {
                    let request = WaitRequest::new(
                        ElementVisible::new(Locator::test_id(format!("row-{i}"))),
                        ms(3_000),
                        ms(10),
                    )
                    .unwrap();
                    engine.wait(session, request)
                })
            })
            .collect();

        for handle in handles {
            let outcome = handle.join().unwrap();
            assert!(outcome.is_success(), "got {}", outcome.label());
        }
    });
}

#[test]
fn test_cancelling_one_wait_leaves_others_running() {
    let clock = SystemClock::new();
    let session = ScriptedSession::new(clock)
        .with_element(ScriptedElement::new(Locator::id("late")).appears_at(ms(300)));
    let engine = WaitEngine::with_clock(clock);
    let cancelled = CancellationToken::new();
    let untouched = CancellationToken::new();

    thread::scope(|scope| {
        let doomed = scope.spawn(|| {
            let request = WaitRequest::new(
                ElementVisible::new(Locator::id("late")),
                ms(5_000),
                ms(25),
            )
            .unwrap()
            .with_cancellation(cancelled.clone());
            engine.wait(&session, request)
        });
        let survivor = scope.spawn(|| {
            let request = WaitRequest::new(
                ElementVisible::new(Locator::id("late")),
                ms(5_000),
                ms(25),
            )
            .unwrap()
            .with_cancellation(untouched.clone());
            engine.wait(&session, request)
        });

        thread::sleep(ms(50));
        cancelled.cancel();

        assert!(doomed.join().unwrap().is_cancelled());
        let outcome = survivor.join().unwrap();
        assert!(outcome.is_success(), "got {}", outcome.label());
        assert!(outcome.elapsed() >= ms(250));
    });
    assert!(!untouched.is_cancelled());
}
