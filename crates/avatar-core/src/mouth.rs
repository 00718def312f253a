use crate::config::AnimationConfig;
use crate::constants::{MOUTH_BOOST_UNIT, MOUTH_THRESHOLD_SCALE, VOWEL_DAMP, VOWEL_MIN};

/// Map a loudness sample onto the "aa" weight.
///
/// Gated: anything at or below `mouth_threshold * 2` closes the mouth. Above
/// the gate the weight is set directly each tick, with no attack/release.
pub fn mouth_weight(loudness: f32, config: &AnimationConfig) -> f32 {
    if loudness > config.mouth_threshold * MOUTH_THRESHOLD_SCALE {
        (((loudness - VOWEL_MIN) / VOWEL_DAMP) * (config.mouth_boost / MOUTH_BOOST_UNIT))
            .clamp(0.0, 1.0)
    } else {
        0.0
    }
}
