// Host-side tests for the animation controller's session lifecycle.

use avatar_core::*;
use std::cell::RefCell;

fn controller() -> AvatarController {
    AvatarController::new(AnimationConfig::default(), Some(7))
}

fn frame(level: u8) -> Vec<u8> {
    vec![level; FFT_SIZE as usize / 2]
}

#[test]
fn missing_stream_fails_fast_and_stays_idle() {
    let mut ctl = controller();
    let err = ctl.attach_stream(None::<()>, 0.0).unwrap_err();
    assert_eq!(err, AvatarError::MissingAudioStream);
    assert!(!ctl.is_active());
    assert!(ctl.next_blink_deadline_ms().is_none());
}

#[test]
fn callbacks_without_session_are_rejected() {
    let mut ctl = controller();
    assert_eq!(ctl.on_audio_frame(0.0, &frame(80)), Err(AvatarError::NoSession));
    assert_eq!(ctl.on_blink_timer(0.0).unwrap_err(), AvatarError::NoSession);
    assert_eq!(ctl.weights(), ExpressionWeights::default());
}

#[test]
fn audio_frames_drive_mouth_and_drift() {
    let mut ctl = controller();
    ctl.attach_stream(Some("stream"), 0.0).unwrap();

    let level = ctl.on_audio_frame(10.0, &frame(80)).unwrap();
    assert_eq!(level, 80.0);
    assert_eq!(ctl.weights().get(Expression::Aa), 1.0);

    ctl.on_audio_frame(20.0, &frame(15)).unwrap();
    assert_eq!(ctl.weights().get(Expression::Aa), 0.0);

    let c = ctl.ceilings();
    for t in 0..5000 {
        ctl.on_audio_frame(30.0 + t as f64, &frame(40)).unwrap();
        let w = ctl.weights();
        assert!(w.get(Expression::Happy) <= c.positive);
        assert!(w.get(Expression::Angry) <= c.negative);
    }
}

#[test]
fn stall_closes_mouth_until_ticks_resume() {
    let mut ctl = controller();
    ctl.start_session(0.0);
    ctl.on_audio_frame(10.0, &frame(80)).unwrap();
    assert_eq!(ctl.check_stall(500.0), None);
    assert_eq!(ctl.check_stall(1500.0), Some(StallEvent::Stalled));
    assert_eq!(ctl.weights().get(Expression::Aa), 0.0);
    assert_eq!(ctl.loudness(), 0.0);
    assert_eq!(ctl.check_stall(3000.0), None);

    ctl.on_audio_frame(3100.0, &frame(80)).unwrap();
    assert_eq!(ctl.weights().get(Expression::Aa), 1.0);
}

#[test]
fn blink_timer_closes_both_eyes_and_lowers_gaze() {
    let mut ctl = controller();
    ctl.start_session(0.0);
    let deadline = ctl.next_blink_deadline_ms().unwrap();
    let events = ctl.on_blink_timer(deadline).unwrap();
    assert!(matches!(events[0], BlinkEvent::Closed { .. }));
    let w = ctl.weights();
    assert_eq!(w.get(Expression::BlinkLeft), 1.0);
    assert_eq!(w.get(Expression::BlinkRight), 1.0);
    let y = ctl.look_at_y().unwrap();
    assert!((y - blink_look_at_y(CAMERA_EYE[1])).abs() < 1e-6);

    let reopen = ctl.next_blink_deadline_ms().unwrap();
    ctl.on_blink_timer(reopen).unwrap();
    assert_eq!(ctl.weights().get(Expression::BlinkLeft), 0.0);
}

#[test]
fn applying_settings_twice_is_idempotent() {
    let mut ctl = controller();
    ctl.start_session(0.0);
    let cfg = AnimationConfig {
        expression_bias: 30.0,
        mouth_boost: 25.0,
        ..AnimationConfig::default()
    };
    ctl.apply_config(cfg);
    let first = (*ctl.config(), ctl.ceilings(), ctl.drift().unwrap().ceilings());
    ctl.apply_config(cfg);
    let second = (*ctl.config(), ctl.ceilings(), ctl.drift().unwrap().ceilings());
    assert_eq!(first, second);
    assert!((second.1.positive - 0.225).abs() < 1e-6);
}

#[test]
fn ending_session_zeroes_weights() {
    let mut ctl = controller();
    ctl.start_session(0.0);
    ctl.on_audio_frame(1.0, &frame(90)).unwrap();
    ctl.end_session();
    assert!(!ctl.is_active());
    assert_eq!(ctl.weights(), ExpressionWeights::default());
}

#[test]
fn failed_setup_after_attach_leaves_controller_idle() {
    let ctl = RefCell::new(controller());
    let result: avatar_core::Result<()> = start_session_with(&ctl, Some("stream"), 0.0, |_| {
        assert!(ctl.borrow().is_active(), "session runs while feeders are built");
        Err(AvatarError::Signaling("no audio context".into()))
    });
    assert!(result.is_err());
    assert!(!ctl.borrow().is_active());
    assert!(ctl.borrow().next_blink_deadline_ms().is_none());
    assert_eq!(
        ctl.borrow_mut().on_audio_frame(1.0, &frame(80)),
        Err(AvatarError::NoSession)
    );
}

#[test]
fn successful_setup_keeps_session_and_returns_feeders() {
    let ctl = RefCell::new(controller());
    let fed: avatar_core::Result<&str> =
        start_session_with(&ctl, Some("stream"), 0.0, |s| Ok(s));
    assert_eq!(fed, Ok("stream"));
    assert!(ctl.borrow().is_active());
}

#[test]
fn missing_stream_skips_setup_entirely() {
    let ctl = RefCell::new(controller());
    let mut built = false;
    let result: avatar_core::Result<()> = start_session_with(&ctl, None::<()>, 0.0, |_| {
        built = true;
        Ok(())
    });
    assert_eq!(result, Err(AvatarError::MissingAudioStream));
    assert!(!built);
    assert!(!ctl.borrow().is_active());
}
