mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use common::{PausedClock, at};
use countdown_overlay::tasks::countdown::{CountdownEngine, TickMode};
use tokio::sync::{mpsc, watch};

async fn collect_until_cleared(display: &mut watch::Receiver<String>) -> Vec<String> {
    let mut seen = Vec::new();
    loop {
        display.changed().await.expect("display sender dropped");
        let text = display.borrow_and_update().clone();
        if text.is_empty() {
            return seen;
        }
        seen.push(text);
    }
}

#[tokio::test(start_paused = true)]
async fn aligned_ticks_decrease_then_signal_once() {
    let base = at(9, 0, 0);
    let (tx, mut finished) = mpsc::channel(4);
    let mut engine =
        CountdownEngine::new(Arc::new(PausedClock::new(base)), TickMode::Aligned).with_observer(tx);
    let mut display = engine.subscribe();

    let target = base + TimeDelta::milliseconds(3500);
    engine.start(target).await;
    assert!(engine.is_active());

    let seen = collect_until_cleared(&mut display).await;
    assert_eq!(seen, ["00:03", "00:02", "00:01", "00:00"]);

    let done = finished.recv().await.expect("completion signal");
    assert_eq!(done.target, target);
    tokio::task::yield_now().await;
    assert!(finished.try_recv().is_err(), "completion must fire once");
    assert!(!engine.is_active());
    assert_eq!(engine.text(), "");
}

#[tokio::test(start_paused = true)]
async fn fixed_interval_ticks_also_reach_completion() {
    let base = at(9, 0, 0);
    let (tx, mut finished) = mpsc::channel(4);
    let mut engine =
        CountdownEngine::new(Arc::new(PausedClock::new(base)), TickMode::Fixed).with_observer(tx);
    let mut display = engine.subscribe();

    engine.start(base + TimeDelta::milliseconds(2500)).await;
    let seen = collect_until_cleared(&mut display).await;
    assert_eq!(seen, ["00:02", "00:01", "00:00"]);
    assert!(finished.recv().await.is_some());
}

#[tokio::test(start_paused = true)]
async fn hours_are_shown_from_one_hour_on() {
    let base = at(9, 0, 0);
    let mut engine = CountdownEngine::new(Arc::new(PausedClock::new(base)), TickMode::Aligned);
    let mut display = engine.subscribe();

    engine.start(base + TimeDelta::hours(2)).await;
    display.changed().await.unwrap();
    assert_eq!(*display.borrow_and_update(), "01:59:59");

    engine.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stop_clears_and_silences_the_display() {
    let base = at(9, 0, 0);
    let (tx, mut finished) = mpsc::channel(4);
    let mut engine =
        CountdownEngine::new(Arc::new(PausedClock::new(base)), TickMode::Aligned).with_observer(tx);
    let mut display = engine.subscribe();

    // stopping a fresh engine is a no-op
    engine.stop().await;
    assert!(!engine.is_active());
    assert!(!display.has_changed().unwrap());

    engine.start(base + TimeDelta::seconds(100)).await;
    display.changed().await.unwrap();
    assert_eq!(*display.borrow_and_update(), "01:39");

    engine.stop().await;
    assert!(!engine.is_active());
    assert_eq!(*display.borrow_and_update(), "");

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(!display.has_changed().unwrap(), "published after stop");

    engine.stop().await;
    assert_eq!(engine.text(), "");

    tokio::time::sleep(Duration::from_secs(200)).await;
    assert!(finished.try_recv().is_err(), "stopped countdown must not complete");
}

#[tokio::test(start_paused = true)]
async fn restart_replaces_the_previous_target() {
    let base = at(9, 0, 0);
    let mut engine = CountdownEngine::new(Arc::new(PausedClock::new(base)), TickMode::Aligned);
    let mut display = engine.subscribe();

    engine.start(base + TimeDelta::seconds(100)).await;
    display.changed().await.unwrap();
    assert_eq!(*display.borrow_and_update(), "01:39");

    let second = base + TimeDelta::seconds(10);
    engine.start(second).await;
    assert_eq!(engine.target(), Some(second));

    let mut seen = Vec::new();
    while seen.len() < 4 {
        display.changed().await.unwrap();
        seen.push(display.borrow_and_update().clone());
    }
    assert_eq!(seen, ["00:09", "00:08", "00:07", "00:06"]);

    engine.stop().await;
}

#[tokio::test(start_paused = true)]
async fn past_target_expires_immediately() {
    let base = at(9, 0, 0);
    let (tx, mut finished) = mpsc::channel(4);
    let mut engine =
        CountdownEngine::new(Arc::new(PausedClock::new(base)), TickMode::Aligned).with_observer(tx);

    engine.start(base - TimeDelta::seconds(1)).await;
    assert!(finished.recv().await.is_some());
    assert_eq!(engine.text(), "");
}

#[tokio::test(start_paused = true)]
async fn target_equal_to_now_shows_zero_once() {
    let base = at(9, 0, 0);
    let (tx, mut finished) = mpsc::channel(4);
    let mut engine =
        CountdownEngine::new(Arc::new(PausedClock::new(base)), TickMode::Aligned).with_observer(tx);
    let mut display = engine.subscribe();

    engine.start(base).await;
    assert_eq!(collect_until_cleared(&mut display).await, ["00:00"]);
    assert!(finished.recv().await.is_some());
    assert!(finished.try_recv().is_err());
}
