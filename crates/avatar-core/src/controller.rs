//! The audio-driven animation controller.
//!
//! Three independent callback sources write into it: audio processing ticks
//! (mouth + drift), the blink timer, and the frame loop (stall checks). Only
//! the frame loop reads [`AvatarController::weights`] and pushes them into the
//! avatar, so each weight channel has exactly one writer.

use crate::blink::{BlinkEvent, BlinkScheduler};
use crate::config::{AnimationConfig, DriftCeilings};
use crate::constants::CAMERA_EYE;
use crate::drift::ExpressionDrift;
use crate::error::{AvatarError, Result};
use crate::mouth::mouth_weight;
use crate::rig::{Expression, ExpressionWeights};
use crate::sampler::{loudness, StallEvent, StallMonitor};
use rand::rngs::StdRng;
use rand::SeedableRng;
use smallvec::SmallVec;
use std::cell::RefCell;

/// Per-stream state, created when an audio stream is attached.
#[derive(Clone, Debug)]
struct Session {
    drift: ExpressionDrift,
    blink: BlinkScheduler,
    stall: StallMonitor,
    mouth: f32,
    loudness: f32,
    look_at_y: Option<f32>,
}

pub struct AvatarController {
    config: AnimationConfig,
    ceilings: DriftCeilings,
    session: Option<Session>,
    rng: StdRng,
}

impl AvatarController {
    pub fn new(config: AnimationConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self {
            ceilings: config.drift_ceilings(),
            config,
            session: None,
            rng,
        }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn ceilings(&self) -> DriftCeilings {
        self.ceilings
    }

    /// Copy edited settings into the running state. Applying the same values
    /// twice leaves everything unchanged.
    pub fn apply_config(&mut self, config: AnimationConfig) {
        self.config = config;
        self.ceilings = config.drift_ceilings();
        if let Some(s) = &mut self.session {
            s.drift.set_ceilings(self.ceilings);
        }
        log::info!(
            "[settings] expression mix {:.3} positive / {:.3} negative",
            self.ceilings.positive,
            self.ceilings.negative
        );
    }

    /// Start a session for `stream`, failing fast when there is none.
    pub fn attach_stream<S>(&mut self, stream: Option<S>, now_ms: f64) -> Result<S> {
        let stream = stream.ok_or(AvatarError::MissingAudioStream)?;
        self.start_session(now_ms);
        Ok(stream)
    }

    pub fn start_session(&mut self, now_ms: f64) {
        if self.session.is_some() {
            log::warn!("[audio] replacing active session");
        }
        let blink = BlinkScheduler::new(now_ms, CAMERA_EYE[1], &mut self.rng);
        self.session = Some(Session {
            drift: ExpressionDrift::new(self.ceilings),
            blink,
            stall: StallMonitor::default(),
            mouth: 0.0,
            loudness: 0.0,
            look_at_y: None,
        });
    }

    pub fn end_session(&mut self) {
        self.session = None;
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// One audio processing tick. Returns the loudness sample.
    pub fn on_audio_frame(&mut self, now_ms: f64, bins: &[u8]) -> Result<f32> {
        let session = self.session.as_mut().ok_or(AvatarError::NoSession)?;
        if let Some(StallEvent::Resumed) = session.stall.record_tick(now_ms) {
            log::info!("[audio] processing resumed");
        }
        let level = loudness(bins);
        session.loudness = level;
        session.mouth = mouth_weight(level, &self.config);
        session.drift.step(&mut self.rng);
        Ok(level)
    }

    pub fn on_blink_timer(&mut self, now_ms: f64) -> Result<SmallVec<[BlinkEvent; 2]>> {
        let session = self.session.as_mut().ok_or(AvatarError::NoSession)?;
        let events = session.blink.poll(now_ms, &mut self.rng);
        for ev in &events {
            if let BlinkEvent::Closed { look_at_y, .. } = ev {
                session.look_at_y = Some(*look_at_y);
            }
        }
        Ok(events)
    }

    pub fn next_blink_deadline_ms(&self) -> Option<f64> {
        self.session.as_ref().map(|s| s.blink.next_deadline_ms())
    }

    /// Close the mouth when the tick channel goes quiet.
    pub fn check_stall(&mut self, now_ms: f64) -> Option<StallEvent> {
        let session = self.session.as_mut()?;
        let ev = session.stall.check(now_ms);
        if ev == Some(StallEvent::Stalled) {
            session.mouth = 0.0;
            session.loudness = 0.0;
        }
        ev
    }

    pub fn loudness(&self) -> f32 {
        self.session.as_ref().map_or(0.0, |s| s.loudness)
    }

    pub fn drift(&self) -> Option<&ExpressionDrift> {
        self.session.as_ref().map(|s| &s.drift)
    }

    pub fn look_at_y(&self) -> Option<f32> {
        self.session.as_ref().and_then(|s| s.look_at_y)
    }

    /// Current target weights; all zero without a session.
    pub fn weights(&self) -> ExpressionWeights {
        let mut w = ExpressionWeights::default();
        if let Some(s) = &self.session {
            let eye = s.blink.eye_weight();
            w.set(Expression::BlinkLeft, eye);
            w.set(Expression::BlinkRight, eye);
            w.set(Expression::Aa, s.mouth);
            w.set(Expression::Happy, s.drift.positive());
            w.set(Expression::Angry, s.drift.negative());
        }
        w
    }
}

/// Start a session on `controller` for `stream`, then run `build` to set up
/// whatever feeds it. A failed `build` ends the session again, so the
/// controller is never left active without its feeders.
///
/// The controller is not borrowed while `build` runs.
pub fn start_session_with<S, T, E>(
    controller: &RefCell<AvatarController>,
    stream: Option<S>,
    now_ms: f64,
    build: impl FnOnce(S) -> std::result::Result<T, E>,
) -> std::result::Result<T, E>
where
    E: From<AvatarError>,
{
    let stream = controller.borrow_mut().attach_stream(stream, now_ms)?;
    match build(stream) {
        Ok(fed) => Ok(fed),
        Err(e) => {
            log::warn!("[audio] setup failed; ending session");
            controller.borrow_mut().end_session();
            Err(e)
        }
    }
}
