// Web-only wiring constants: asset locations, endpoints and DOM ids.

pub const DEFAULT_VRM_URL: &str = "https://automattic.github.io/VU-VRM/assets/VU-VRM-elf.vrm";
pub const STUN_URL: &str = "stun:stun.l.google.com:19302";
pub const STOP_GRACE_MS: i32 = 500; // let transceivers flush before close

// Transport controls and logs
pub const ID_START: &str = "start";
pub const ID_STOP: &str = "stop";
pub const ID_USE_STUN: &str = "use-stun";
pub const ID_USE_AUDIO: &str = "use-audio";
pub const ID_AUDIO_CODEC: &str = "audio-codec";
pub const ID_VIDEO_TRANSFORM: &str = "video-transform";
pub const ID_OFFER_SDP: &str = "offer-sdp";
pub const ID_ANSWER_SDP: &str = "answer-sdp";
pub const ID_ICE_GATHERING: &str = "ice-gathering-state";
pub const ID_ICE_CONNECTION: &str = "ice-connection-state";
pub const ID_SIGNALING: &str = "signaling-state";
pub const ID_AUDIO: &str = "audio";
pub const ID_VIDEO: &str = "video";

// Settings panel
pub const ID_APPLY_SETTINGS: &str = "interface";
pub const ID_HIDE_SETTINGS: &str = "hideInterface";
pub const ID_INPUT_LEVEL: &str = "inputlevel";
pub const INFO_PANELS: [&str; 3] = ["interface", "infobar", "credits"];
