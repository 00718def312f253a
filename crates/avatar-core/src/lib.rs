pub mod blink;
pub mod config;
pub mod constants;
pub mod controller;
pub mod drift;
pub mod error;
pub mod mouth;
pub mod pose;
pub mod rig;
pub mod sampler;
pub mod sdp;
pub mod signaling;
pub mod stage;
pub mod state;

pub use blink::*;
pub use config::*;
pub use constants::*;
pub use controller::*;
pub use drift::*;
pub use error::*;
pub use mouth::*;
pub use pose::*;
pub use rig::*;
pub use sampler::*;
pub use signaling::*;
pub use stage::*;
pub use state::*;
