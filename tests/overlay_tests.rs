mod common;

use std::sync::Arc;

use chrono::TimeDelta;
use common::{PausedClock, at, write_png};
use countdown_overlay::config::Configuration;
use countdown_overlay::overlay::Overlay;
use countdown_overlay::processing::layout::{Length, Size};
use countdown_overlay::processing::placement::{Corner, Point};
use countdown_overlay::tasks::slideshow::NEVER_ROTATE;
use palette::Srgb;
use std::time::Duration;
use tokio::sync::mpsc;

fn overlay_at(now: chrono::NaiveDateTime) -> Overlay {
    Overlay::new(&Configuration::default(), Arc::new(PausedClock::new(now)), None)
}

#[tokio::test(start_paused = true)]
async fn past_end_time_rolls_over_to_tomorrow() {
    let now = at(11, 0, 0);
    let mut overlay = overlay_at(now);
    let mut display = overlay.countdown().subscribe();

    let target = overlay.apply_end_time_text("10:00:00").await.unwrap();
    assert_eq!(target, now + TimeDelta::hours(23));
    assert!(overlay.countdown().is_active());

    display.changed().await.unwrap();
    assert_eq!(*display.borrow_and_update(), "22:59:59");

    overlay.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn unparseable_end_time_stops_and_clears() {
    let mut overlay = overlay_at(at(9, 0, 0));
    let mut display = overlay.countdown().subscribe();

    overlay.apply_end_time_text("09:00:30").await.unwrap();
    display.changed().await.unwrap();
    assert_eq!(*display.borrow_and_update(), "00:29");

    assert!(overlay.apply_end_time_text("half past nine").await.is_none());
    assert!(!overlay.countdown().is_active());
    assert_eq!(overlay.countdown().text(), "");
}

#[tokio::test(start_paused = true)]
async fn completion_reaches_the_observer() {
    let now = at(9, 0, 0);
    let (tx, mut finished) = mpsc::channel(1);
    let mut overlay = Overlay::new(
        &Configuration::default(),
        Arc::new(PausedClock::new(now)),
        Some(tx),
    );

    overlay.apply_end_time_text("09:00:02").await.unwrap();
    let done = finished.recv().await.unwrap();
    assert_eq!(done.target, at(9, 0, 2));
    assert!(!overlay.countdown().is_active());
}

#[tokio::test]
async fn pause_text_degrades_to_sentinel() {
    let overlay = overlay_at(at(9, 0, 0));
    assert_eq!(overlay.apply_pause_text("7"), Duration::from_secs(7));
    assert_eq!(overlay.slideshow().pause(), Duration::from_secs(7));
    assert_eq!(overlay.apply_pause_text("seven"), NEVER_ROTATE);
    assert_eq!(overlay.slideshow().pause(), NEVER_ROTATE);
    assert_eq!(overlay.apply_pause_text("-1"), NEVER_ROTATE);
}

#[tokio::test]
async fn corner_keys_and_timer_position() {
    let mut overlay = overlay_at(at(9, 0, 0));
    // default: bottom right of 800x400 for a 600x220 timer
    assert_eq!(overlay.timer_position(), Point { x: 200.0, y: 180.0 });

    assert!(overlay.apply_corner_key('7'));
    assert_eq!(overlay.corner(), Corner::TopLeft);
    assert_eq!(overlay.timer_position(), Point { x: 0.0, y: 0.0 });

    assert!(!overlay.apply_corner_key('5'));
    assert!(!overlay.apply_corner_key('q'));
    assert_eq!(overlay.corner(), Corner::TopLeft);

    overlay.set_timer_padding(Length::Px(10.0), Length::Percent(10.0));
    overlay.set_container_size(Size::new(1000.0, 500.0));
    assert_eq!(overlay.timer_position(), Point { x: 10.0, y: 50.0 });

    overlay.set_corner(Corner::BottomCenter);
    overlay.set_timer_size(Size::new(200.0, 100.0));
    assert_eq!(overlay.timer_position(), Point { x: 400.0, y: 350.0 });
}

#[tokio::test]
async fn timer_frame_reflects_style() {
    let mut overlay = overlay_at(at(9, 0, 0));
    assert!(overlay.apply_font_size_text("120"));
    assert!(!overlay.apply_font_size_text("big"));
    assert!(!overlay.apply_font_size_text("0"));
    overlay.set_font_color(Srgb::new(255, 0, 0));

    let frame = overlay.timer_frame().unwrap();
    assert_eq!(frame.style.font_size, 120);
    assert_eq!(frame.style.color, Srgb::new(255, 0, 0));
    assert_eq!(frame.text, "");

    overlay.set_timer_visible(false);
    assert!(overlay.timer_frame().is_none());
}

#[tokio::test]
async fn container_resize_relayouts_background() {
    let tmp = tempfile::tempdir().unwrap();
    let bg = tmp.path().join("bg.png");
    write_png(&bg, 100, 100);

    let mut overlay = overlay_at(at(9, 0, 0));
    overlay.set_background(&bg).await.unwrap();
    let before = overlay.slideshow().backdrop().unwrap().placement.unwrap();
    assert_eq!((before.x, before.width), (200.0, 400.0));

    overlay.set_container_size(Size::new(400.0, 800.0));
    assert_eq!(overlay.container(), Size::new(400.0, 800.0));
    let after = overlay.slideshow().backdrop().unwrap().placement.unwrap();
    assert_eq!((after.x, after.y, after.width), (0.0, 200.0, 400.0));

    assert_eq!(overlay.show_directory(tmp.path().join("none")).await, 0);
    overlay.shutdown().await;
}
