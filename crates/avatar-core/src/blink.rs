//! Autonomous eye blinks as an explicit timeline.
//!
//! The host arms a single timer for [`BlinkScheduler::next_deadline_ms`] and
//! calls [`BlinkScheduler::poll`] when it fires. Inter-blink intervals are
//! measured from each blink's firing instant, so the closed duration never
//! stretches the period.

use crate::constants::{
    BLINK_CLOSED_MAX_MS, BLINK_CLOSED_MIN_MS, BLINK_INTERVAL_MAX_MS, BLINK_INTERVAL_MIN_MS,
    BLINK_LOOK_AT_BASE,
};
use rand::Rng;
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BlinkEvent {
    /// Eyes shut; the look-at proxy moves to `look_at_y`.
    Closed { at_ms: f64, look_at_y: f32 },
    Opened { at_ms: f64 },
}

pub fn sample_interval_ms<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(BLINK_INTERVAL_MIN_MS..BLINK_INTERVAL_MAX_MS)
}

pub fn sample_closed_ms<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(BLINK_CLOSED_MIN_MS..BLINK_CLOSED_MAX_MS)
}

/// Look-at height used while blinking, relative to the camera rig.
#[inline]
pub fn blink_look_at_y(camera_y: f32) -> f32 {
    BLINK_LOOK_AT_BASE - camera_y
}

#[derive(Clone, Debug)]
pub struct BlinkScheduler {
    camera_y: f32,
    next_blink_ms: f64,
    reopen_ms: Option<f64>,
}

impl BlinkScheduler {
    /// The first blink comes one random interval after `now_ms`.
    pub fn new<R: Rng + ?Sized>(now_ms: f64, camera_y: f32, rng: &mut R) -> Self {
        Self {
            camera_y,
            next_blink_ms: now_ms + sample_interval_ms(rng) as f64,
            reopen_ms: None,
        }
    }

    pub fn is_blinking(&self) -> bool {
        self.reopen_ms.is_some()
    }

    /// 1.0 while closed, 0.0 otherwise. Never partial.
    pub fn eye_weight(&self) -> f32 {
        if self.is_blinking() {
            1.0
        } else {
            0.0
        }
    }

    pub fn next_deadline_ms(&self) -> f64 {
        match self.reopen_ms {
            Some(r) => r.min(self.next_blink_ms),
            None => self.next_blink_ms,
        }
    }

    /// Process every transition due at or before `now_ms`, oldest first.
    pub fn poll<R: Rng + ?Sized>(&mut self, now_ms: f64, rng: &mut R) -> SmallVec<[BlinkEvent; 2]> {
        let mut events = SmallVec::new();
        // After a long host suspension, skip the missed blinks instead of replaying them.
        if now_ms - self.next_blink_ms > BLINK_INTERVAL_MAX_MS as f64 {
            log::debug!("[blink] resync after {:.0}ms gap", now_ms - self.next_blink_ms);
            self.next_blink_ms = now_ms;
        }
        loop {
            match self.reopen_ms {
                Some(r) if r <= now_ms && r <= self.next_blink_ms => {
                    self.reopen_ms = None;
                    events.push(BlinkEvent::Opened { at_ms: r });
                    continue;
                }
                _ => {}
            }
            if self.next_blink_ms <= now_ms {
                let at_ms = self.next_blink_ms;
                self.next_blink_ms = at_ms + sample_interval_ms(rng) as f64;
                self.reopen_ms = Some(at_ms + sample_closed_ms(rng) as f64);
                events.push(BlinkEvent::Closed {
                    at_ms,
                    look_at_y: blink_look_at_y(self.camera_y),
                });
                continue;
            }
            break;
        }
        events
    }
}
