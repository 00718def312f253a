use glam::Vec3;

// Shared animation/audio tuning constants used by the web frontend and tests.

// Audio analysis
pub const FFT_SIZE: u32 = 1024;
pub const ANALYSER_SMOOTHING: f64 = 0.5;
pub const PROCESSOR_BUFFER_SIZE: u32 = 256; // samples per processing tick
pub const AUDIO_STALL_MS: f64 = 1000.0; // silence on the tick channel before we call it a stall

// Mouth articulation
pub const VOWEL_MIN: f32 = 12.0; // loudness offset subtracted before scaling
pub const VOWEL_DAMP: f32 = 53.0; // loudness span mapped onto a full "aa"
pub const MOUTH_BOOST_UNIT: f32 = 10.0; // mouthBoost of 10 means gain 1.0
pub const MOUTH_THRESHOLD_SCALE: f32 = 2.0; // gate opens above threshold * 2

// Expression drift
pub const EXPRESSION_EASE: f32 = 100.0; // step = (rand - 0.5) / ease
pub const EXPRESSION_INTENSITY: f32 = 0.75;

// Blink timing (milliseconds)
pub const BLINK_INTERVAL_MIN_MS: u32 = 1000;
pub const BLINK_INTERVAL_MAX_MS: u32 = 11000; // exclusive
pub const BLINK_CLOSED_MIN_MS: u32 = 50;
pub const BLINK_CLOSED_MAX_MS: u32 = 300; // exclusive
pub const BLINK_LOOK_AT_BASE: f32 = 1.25;

// Rest pose (radians)
pub const HIPS_YAW: f32 = std::f32::consts::PI; // face the camera
pub const UPPER_ARM_ROLL: f32 = 1.327_412; // arms down out of the T-pose
pub const LOWER_ARM_ROLL: f32 = 0.2;
pub const IDLE_JITTER_SPAN: f32 = 0.1; // full width, centred on zero

// Camera
pub const CAMERA_FOVY_DEG: f32 = 30.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 20.0;
pub const CAMERA_EYE: [f32; 3] = [0.0, 1.45, 0.75];
pub const CAMERA_TARGET: [f32; 3] = [0.0, 1.45, 0.0];

#[inline]
pub fn camera_eye_vec3() -> Vec3 {
    Vec3::from(CAMERA_EYE)
}

#[inline]
pub fn camera_target_vec3() -> Vec3 {
    Vec3::from(CAMERA_TARGET)
}
