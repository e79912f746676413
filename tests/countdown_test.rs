use agile_tracker::countdown::{Clock, CountdownScheduler, Remaining};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Wall clock that follows tokio's paused test clock
fn paused_clock() -> (DateTime<Utc>, Clock) {
    let base = Utc::now();
    let origin = tokio::time::Instant::now();
    let clock: Clock = Arc::new(move || {
        base + chrono::Duration::from_std(origin.elapsed()).unwrap_or_default()
    });
    (base, clock)
}

#[tokio::test(start_paused = true)]
async fn counts_down_then_reaches_target() {
    let (base, clock) = paused_clock();
    let (mut scheduler, mut rx) = CountdownScheduler::with_clock(clock);
    let target = base + chrono::Duration::seconds(2);
    scheduler.arm(target);

    let mut counting = 0;
    loop {
        let state = rx.recv().await.unwrap();
        assert_eq!(state.target, target);
        match state.remaining {
            Remaining::Counting(left) => {
                assert!(left > chrono::Duration::zero());
                counting += 1;
            }
            Remaining::Reached => break,
        }
    }
    assert!((1..=2).contains(&counting), "got {} counting updates", counting);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(rx.try_recv().is_err());
    assert!(!scheduler.is_active());
}

#[tokio::test(start_paused = true)]
async fn rearming_supersedes_previous_target() {
    let (base, clock) = paused_clock();
    let (mut scheduler, mut rx) = CountdownScheduler::with_clock(clock);
    let first = base + chrono::Duration::seconds(10);
    scheduler.arm(first);
    assert_eq!(rx.recv().await.unwrap().target, first);

    let second = base + chrono::Duration::seconds(2);
    scheduler.arm(second);
    loop {
        let state = rx.recv().await.unwrap();
        assert_eq!(state.target, second);
        if state.is_reached() {
            break;
        }
    }

    // Well past the first target, nothing from it ever arrives
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn past_target_is_reached_immediately() {
    let (base, clock) = paused_clock();
    let (mut scheduler, mut rx) = CountdownScheduler::with_clock(clock);
    let target = base - chrono::Duration::minutes(5);
    scheduler.arm(target);

    let state = rx.try_recv().unwrap();
    assert_eq!(state.target, target);
    assert_eq!(state.remaining, Remaining::Reached);
    assert!(!scheduler.is_active());
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_updates() {
    let (base, clock) = paused_clock();
    let (mut scheduler, mut rx) = CountdownScheduler::with_clock(clock);
    scheduler.arm(base + chrono::Duration::seconds(30));
    assert!(matches!(
        rx.recv().await.unwrap().remaining,
        Remaining::Counting(_)
    ));

    scheduler.cancel();
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(rx.try_recv().is_err());
    assert!(!scheduler.is_active());
}

#[tokio::test(start_paused = true)]
async fn dropping_scheduler_closes_channel() {
    let (base, clock) = paused_clock();
    let (mut scheduler, mut rx) = CountdownScheduler::with_clock(clock);
    scheduler.arm(base + chrono::Duration::seconds(30));
    rx.recv().await.unwrap();

    drop(scheduler);
    assert!(rx.recv().await.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rearming_on_many_threads_never_leaks_old_updates() {
    let (mut scheduler, mut rx) = CountdownScheduler::new();
    let far = Utc::now() + chrono::Duration::hours(1);

    for i in 0..200 {
        scheduler.arm(far + chrono::Duration::seconds(i));
        tokio::task::yield_now().await;
    }
    let last = far - chrono::Duration::seconds(1);
    scheduler.arm(last);

    // Anything queued before the last arm is allowed; nothing after it
    while let Ok(state) = rx.try_recv() {
        if state.target == last {
            break;
        }
    }
    let next = tokio::time::timeout(Duration::from_secs(3), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(next.target, last);
}
