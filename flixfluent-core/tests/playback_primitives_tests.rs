//! Integration tests for the core playback primitives
//!
//! Covers cue lookup over realistic subtitle scripts, the rate cycle,
//! source classification and poll scheduler lifecycles.

use flixfluent_core::*;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

fn greeting_script() -> Vec<SubtitleCue> {
    vec![
        SubtitleCue::new(0.0, 5.0, "안녕하세요"),
        SubtitleCue::new(5.0, 10.0, "한국어 학습에 오신 것을 환영합니다"),
        SubtitleCue::new(10.0, 15.0, "이 비디오는 한국어 학습을 위한 것입니다"),
        SubtitleCue::new(20.0, 25.0, "감사합니다"),
    ]
}

// ============================================================================
// CUE TESTS
// ============================================================================

#[test]
fn test_cue_lookup_over_script() {
    let track = CueTrack::new(greeting_script());

    assert_eq!(track.len(), 4);
    assert_eq!(track.active_text(2.5), "안녕하세요");
    assert_eq!(track.active_text(14.9), "이 비디오는 한국어 학습을 위한 것입니다");
    // Gap between 15 and 20 clears the subtitle
    assert_eq!(track.active_text(17.0), "");
    assert_eq!(track.active_text(22.0), "감사합니다");
    assert_eq!(track.active_text(-1.0), "");
}

#[test]
fn test_every_instant_maps_to_containing_cue() {
    let track = CueTrack::new(greeting_script());

    let mut t = 0.0;
    while t < 30.0 {
        match track.active_cue(t) {
            Some(cue) => assert!(cue.start <= t && t <= cue.end),
            None => assert!(track.cues().iter().all(|c| !c.contains(t))),
        }
        t += 0.25;
    }
}

#[test]
fn test_cue_serialization() {
    let cue = SubtitleCue::new(1.5, 4.0, "좋은 하루 되세요");
    let json = serde_json::to_string(&cue).unwrap();
    assert!(json.contains("\"start\":1.5"));

    let back: SubtitleCue = serde_json::from_str(&json).unwrap();
    assert_eq!(back, cue);
    assert_eq!(back.duration(), 2.5);
}

// ============================================================================
// RATE AND SOURCE TESTS
// ============================================================================

#[test]
fn test_rate_cycle_visits_every_rate() {
    let mut rate = PlaybackRate::default();
    let mut seen = vec![rate];
    for _ in 0..5 {
        rate = rate.next();
        seen.push(rate);
    }

    assert_eq!(rate.next(), PlaybackRate::Normal);
    for expected in PlaybackRate::ALL {
        assert!(seen.contains(&expected));
    }
}

#[test]
fn test_demo_urls_are_embedded() {
    for url in [
        "https://youtu.be/K3PDRB9R-YI?si=_ZHKj-EBSun9SsSp",
        "https://youtu.be/GJMG5Aj9rM8?si=tLn0wP2dtqTRN4KG",
        "https://www.youtube.com/watch?v=p0U6qZBLoFs",
    ] {
        let source = assert_ok!(VideoSource::parse(url));
        assert!(source.is_embedded(), "{} should use the embed widget", url);
    }
}

#[test]
fn test_invalid_inputs_rejected() {
    let err = assert_err!(VideoSource::parse(""));
    assert_eq!(err.error_code(), "EMPTY_URL");

    let err = assert_err!(VideoSource::parse("www.example.com/video"));
    assert_eq!(err.error_code(), "INVALID_URL");
    assert!(err.is_recoverable());
}

// ============================================================================
// POLL SCHEDULER TESTS
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_replacing_poll_keeps_single_instance() {
    let scheduler = PollScheduler::new();
    let old_ticks = Arc::new(AtomicUsize::new(0));
    let new_ticks = Arc::new(AtomicUsize::new(0));

    let counter = old_ticks.clone();
    let mut current = scheduler.spawn("subtitle", Duration::from_millis(500), move || {
        counter.fetch_add(1, Ordering::SeqCst);
        async { ControlFlow::Continue(()) }
    });
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(old_ticks.load(Ordering::SeqCst), 1);

    // Cancel-then-recreate, as a cue reload does
    current.cancel();
    let counter = new_ticks.clone();
    current = scheduler.spawn("subtitle", Duration::from_millis(500), move || {
        counter.fetch_add(1, Ordering::SeqCst);
        async { ControlFlow::Continue(()) }
    });

    assert_eq!(scheduler.active_count("subtitle"), 1);
    tokio::time::sleep(Duration::from_millis(2_100)).await;
    assert_eq!(old_ticks.load(Ordering::SeqCst), 1);
    assert_eq!(new_ticks.load(Ordering::SeqCst), 4);

    current.stop().await;
    assert_eq!(scheduler.total_active(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_independent_poll_names() {
    let scheduler = PollScheduler::new();
    let subtitle = scheduler.spawn("subtitle", Duration::from_millis(500), || async {
        ControlFlow::Continue(())
    });
    let progress = scheduler.spawn("progress", Duration::from_millis(1_000), || async {
        ControlFlow::Continue(())
    });

    assert_eq!(scheduler.active_count("subtitle"), 1);
    assert_eq!(scheduler.active_count("progress"), 1);
    assert_eq!(scheduler.total_active(), 2);
    assert_eq!(progress.period(), Duration::from_secs(1));

    drop(subtitle);
    assert_eq!(scheduler.active_count("subtitle"), 0);
    assert_eq!(scheduler.active_count("progress"), 1);
    assert!(!progress.is_finished());
}
