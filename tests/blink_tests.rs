// Host-side tests for the blink timeline.

use avatar_core::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

const CAMERA_Y: f32 = 1.45;

#[test]
fn samples_stay_in_their_ranges() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..10_000 {
        let i = sample_interval_ms(&mut rng);
        assert!((BLINK_INTERVAL_MIN_MS..BLINK_INTERVAL_MAX_MS).contains(&i));
        let c = sample_closed_ms(&mut rng);
        assert!((BLINK_CLOSED_MIN_MS..BLINK_CLOSED_MAX_MS).contains(&c));
    }
}

#[test]
fn first_blink_waits_one_interval() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut s = BlinkScheduler::new(500.0, CAMERA_Y, &mut rng);
    let first = s.next_deadline_ms();
    assert!(first >= 1500.0 && first < 11_500.0);
    assert!(s.poll(first - 1.0, &mut rng).is_empty());
    assert_eq!(s.eye_weight(), 0.0);
}

#[test]
fn eyes_are_fully_shut_only_inside_closed_windows() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut s = BlinkScheduler::new(0.0, CAMERA_Y, &mut rng);
    let mut closed_at: Option<f64> = None;
    let mut last_fire: Option<f64> = None;
    let mut blinks = 0;

    for t in 0..120_000u32 {
        let now = t as f64;
        for ev in s.poll(now, &mut rng) {
            match ev {
                BlinkEvent::Closed { at_ms, look_at_y } => {
                    assert_eq!(at_ms, now);
                    assert!((look_at_y - blink_look_at_y(CAMERA_Y)).abs() < 1e-6);
                    if let Some(prev) = last_fire {
                        let gap = at_ms - prev;
                        assert!(
                            gap >= BLINK_INTERVAL_MIN_MS as f64 && gap < BLINK_INTERVAL_MAX_MS as f64,
                            "interval {gap}"
                        );
                    }
                    last_fire = Some(at_ms);
                    closed_at = Some(at_ms);
                    blinks += 1;
                }
                BlinkEvent::Opened { at_ms } => {
                    let start = closed_at.take().expect("opened without closing");
                    let held = at_ms - start;
                    assert!(
                        held >= BLINK_CLOSED_MIN_MS as f64 && held < BLINK_CLOSED_MAX_MS as f64,
                        "closed for {held}"
                    );
                }
            }
        }
        let expected = if closed_at.is_some() { 1.0 } else { 0.0 };
        assert_eq!(s.eye_weight(), expected, "at {now}");
    }
    assert!(blinks >= 10, "only {blinks} blinks in two minutes");
}

#[test]
fn late_poll_replays_close_then_open_in_order() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut s = BlinkScheduler::new(0.0, CAMERA_Y, &mut rng);
    let first = s.next_deadline_ms();
    let events = s.poll(first + 400.0, &mut rng);
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], BlinkEvent::Closed { at_ms, .. } if at_ms == first));
    assert!(matches!(events[1], BlinkEvent::Opened { at_ms } if at_ms > first));
    assert!(!s.is_blinking());
    // The next blink is measured from the firing instant, not the reopen.
    let next = s.next_deadline_ms();
    assert!(next >= first + BLINK_INTERVAL_MIN_MS as f64);
    assert!(next < first + BLINK_INTERVAL_MAX_MS as f64);
}

#[test]
fn long_suspension_skips_missed_blinks() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut s = BlinkScheduler::new(0.0, CAMERA_Y, &mut rng);
    let now = s.next_deadline_ms() + 60_000.0;
    let events = s.poll(now, &mut rng);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], BlinkEvent::Closed { at_ms, .. } if at_ms == now));
    assert_eq!(s.eye_weight(), 1.0);
}
