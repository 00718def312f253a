// Host-side tests for loudness sampling and the loudness -> mouth mapping.

use avatar_core::*;
use proptest::prelude::*;

fn config(threshold: f32, boost: f32) -> AnimationConfig {
    AnimationConfig {
        mouth_threshold: threshold,
        mouth_boost: boost,
        ..AnimationConfig::default()
    }
}

#[test]
fn loud_frame_opens_mouth_fully() {
    assert_eq!(mouth_weight(80.0, &config(10.0, 10.0)), 1.0);
}

#[test]
fn quiet_frame_keeps_mouth_closed() {
    assert_eq!(mouth_weight(15.0, &config(10.0, 10.0)), 0.0);
}

#[test]
fn gate_is_strictly_greater_than_twice_threshold() {
    let cfg = config(10.0, 10.0);
    assert_eq!(mouth_weight(20.0, &cfg), 0.0);
    let just_above = mouth_weight(21.0, &cfg);
    assert!((just_above - 9.0 / 53.0).abs() < 1e-6, "got {just_above}");
}

#[test]
fn boost_scales_the_opening() {
    let base = mouth_weight(30.0, &config(10.0, 10.0));
    let doubled = mouth_weight(30.0, &config(10.0, 20.0));
    assert!((doubled - 2.0 * base).abs() < 1e-6);
    assert_eq!(mouth_weight(30.0, &config(10.0, 0.0)), 0.0);
}

#[test]
fn loudness_is_mean_of_bins() {
    assert_eq!(loudness(&[]), 0.0);
    assert_eq!(loudness(&[0, 255]), 127.5);
    let bins = vec![80u8; FFT_SIZE as usize / 2];
    assert_eq!(loudness(&bins), 80.0);
}

#[test]
fn stall_monitor_reports_once_and_resumes() {
    let mut m = StallMonitor::new(1000.0);
    assert_eq!(m.check(50_000.0), None, "nothing before the first tick");
    assert_eq!(m.record_tick(0.0), None);
    assert_eq!(m.check(999.0), None);
    assert_eq!(m.check(1001.0), Some(StallEvent::Stalled));
    assert_eq!(m.check(5000.0), None);
    assert!(m.is_stalled());
    assert_eq!(m.record_tick(5100.0), Some(StallEvent::Resumed));
    assert!(!m.is_stalled());
}

proptest! {
    #[test]
    fn mouth_weight_stays_in_unit_range(
        l in 0.0f32..=255.0,
        threshold in 0.0f32..=100.0,
        boost in 0.0f32..=100.0,
    ) {
        let w = mouth_weight(l, &config(threshold, boost));
        prop_assert!((0.0..=1.0).contains(&w));
    }

    #[test]
    fn mouth_weight_is_monotonic_in_loudness_and_boost(
        l in 0.0f32..=255.0,
        dl in 0.0f32..=50.0,
        threshold in 0.0f32..=100.0,
        boost in 0.0f32..=100.0,
        db in 0.0f32..=50.0,
    ) {
        let cfg = config(threshold, boost);
        let w = mouth_weight(l, &cfg);
        prop_assert!(mouth_weight(l + dl, &cfg) >= w);
        prop_assert!(mouth_weight(l, &config(threshold, boost + db)) >= w);
    }

    #[test]
    fn below_gate_is_always_closed(threshold in 0.0f32..=100.0, frac in 0.0f32..=1.0) {
        let l = threshold * 2.0 * frac;
        prop_assert_eq!(mouth_weight(l, &config(threshold, 100.0)), 0.0);
    }
}
