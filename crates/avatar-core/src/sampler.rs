//! Loudness reduction for analyser frames and stall detection on the tick
//! channel.

use crate::constants::AUDIO_STALL_MS;

/// Mean byte magnitude over all frequency bins, in 0..=255. Empty input is 0.
pub fn loudness(bins: &[u8]) -> f32 {
    if bins.is_empty() {
        return 0.0;
    }
    let sum: u64 = bins.iter().map(|&b| b as u64).sum();
    (sum as f64 / bins.len() as f64) as f32
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StallEvent {
    Stalled,
    Resumed,
}

/// Watches the timestamps of processing ticks. When the audio track ends the
/// processing callback simply stops firing, so the only symptom is silence on
/// this channel.
#[derive(Clone, Debug)]
pub struct StallMonitor {
    timeout_ms: f64,
    last_tick_ms: Option<f64>,
    stalled: bool,
}

impl Default for StallMonitor {
    fn default() -> Self {
        Self::new(AUDIO_STALL_MS)
    }
}

impl StallMonitor {
    pub fn new(timeout_ms: f64) -> Self {
        Self {
            timeout_ms,
            last_tick_ms: None,
            stalled: false,
        }
    }

    /// Record a tick. Returns `Resumed` if the channel was stalled.
    pub fn record_tick(&mut self, now_ms: f64) -> Option<StallEvent> {
        self.last_tick_ms = Some(now_ms);
        if self.stalled {
            self.stalled = false;
            return Some(StallEvent::Resumed);
        }
        None
    }

    /// Reports `Stalled` once per stall; nothing before the first tick.
    pub fn check(&mut self, now_ms: f64) -> Option<StallEvent> {
        let last = self.last_tick_ms?;
        if !self.stalled && now_ms - last > self.timeout_ms {
            self.stalled = true;
            return Some(StallEvent::Stalled);
        }
        None
    }

    pub fn is_stalled(&self) -> bool {
        self.stalled
    }
}
