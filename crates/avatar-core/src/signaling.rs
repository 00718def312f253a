//! JSON payloads exchanged with the `/offer` signaling endpoint.

use crate::error::Result;
use serde::{Deserialize, Serialize};

pub const OFFER_PATH: &str = "/offer";

/// `RTCPeerConnection.iceGatheringState`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IceGathering {
    New,
    Gathering,
    Complete,
}

impl IceGathering {
    pub fn parse(state: &str) -> Option<Self> {
        match state {
            "new" => Some(IceGathering::New),
            "gathering" => Some(IceGathering::Gathering),
            "complete" => Some(IceGathering::Complete),
            _ => None,
        }
    }

    /// The offer may be sent once this holds; an unknown state never counts.
    pub fn is_complete(state: &str) -> bool {
        Self::parse(state) == Some(IceGathering::Complete)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OfferRequest {
    pub sdp: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub video_transform: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionAnswer {
    pub sdp: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl OfferRequest {
    pub fn new(sdp: impl Into<String>, video_transform: impl Into<String>) -> Self {
        Self {
            sdp: sdp.into(),
            kind: "offer".to_owned(),
            video_transform: video_transform.into(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl SessionAnswer {
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }
}
