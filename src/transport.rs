//! Peer connection plumbing: one best-effort offer/answer round with the
//! signaling endpoint, no renegotiation or retry.

use crate::constants::{
    ID_ANSWER_SDP, ID_AUDIO_CODEC, ID_ICE_CONNECTION, ID_ICE_GATHERING, ID_OFFER_SDP,
    ID_SIGNALING, ID_VIDEO_TRANSFORM, STOP_GRACE_MS, STUN_URL,
};
use crate::dom;
use avatar_core::sdp::filter_codec;
use avatar_core::{IceGathering, OfferRequest, SessionAnswer, OFFER_PATH};
use js_sys::{Array, Object, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

fn js_err(e: JsValue) -> anyhow::Error {
    anyhow::anyhow!("{:?}", e)
}

pub struct PeerSession {
    pc: web::RtcPeerConnection,
    _state_listeners: Vec<Closure<dyn FnMut()>>,
    _on_track: Closure<dyn FnMut(web::RtcTrackEvent)>,
}

fn state_of(pc: &web::RtcPeerConnection, property: &str) -> String {
    Reflect::get(pc, &JsValue::from_str(property))
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_default()
}

fn rtc_configuration(use_stun: bool) -> Result<web::RtcConfiguration, JsValue> {
    let config = Object::new();
    Reflect::set(&config, &"sdpSemantics".into(), &"unified-plan".into())?;
    if use_stun {
        let server = Object::new();
        Reflect::set(&server, &"urls".into(), &Array::of1(&STUN_URL.into()))?;
        Reflect::set(&config, &"iceServers".into(), &Array::of1(&server))?;
    }
    Ok(config.unchecked_into())
}

impl PeerSession {
    /// Create the connection and mirror its state transitions into the page.
    pub fn create(
        document: &web::Document,
        use_stun: bool,
        on_track: impl FnMut(web::RtcTrackEvent) + 'static,
    ) -> anyhow::Result<Self> {
        let config = rtc_configuration(use_stun).map_err(js_err)?;
        let pc = web::RtcPeerConnection::new_with_configuration(&config).map_err(js_err)?;

        let mut state_listeners = Vec::new();
        for (event, property, log_id) in [
            ("icegatheringstatechange", "iceGatheringState", ID_ICE_GATHERING),
            ("iceconnectionstatechange", "iceConnectionState", ID_ICE_CONNECTION),
            ("signalingstatechange", "signalingState", ID_SIGNALING),
        ] {
            dom::set_text(document, log_id, &state_of(&pc, property));
            let pc_state = pc.clone();
            let doc = document.clone();
            let listener = Closure::wrap(Box::new(move || {
                let state = state_of(&pc_state, property);
                log::info!("[rtc] {} -> {}", property, state);
                dom::append_text(&doc, log_id, &format!(" -> {}", state));
            }) as Box<dyn FnMut()>);
            pc.add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
                .map_err(js_err)?;
            state_listeners.push(listener);
        }

        let on_track =
            Closure::wrap(Box::new(on_track) as Box<dyn FnMut(web::RtcTrackEvent)>);
        pc.set_ontrack(Some(on_track.as_ref().unchecked_ref()));

        Ok(Self {
            pc,
            _state_listeners: state_listeners,
            _on_track: on_track,
        })
    }

    pub fn connection(&self) -> &web::RtcPeerConnection {
        &self.pc
    }

    /// Capture local audio and send it alongside the offer.
    pub async fn add_local_audio(&self) -> anyhow::Result<()> {
        let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
        let devices = window.navigator().media_devices().map_err(js_err)?;
        let constraints = web::MediaStreamConstraints::new();
        constraints.set_audio(&JsValue::TRUE);
        constraints.set_video(&JsValue::FALSE);
        let stream: web::MediaStream = JsFuture::from(
            devices
                .get_user_media_with_constraints(&constraints)
                .map_err(js_err)?,
        )
        .await
        .map_err(|e| anyhow::anyhow!("could not acquire media: {:?}", e))?
        .unchecked_into();
        for track in stream.get_tracks().iter() {
            let track: web::MediaStreamTrack = track.unchecked_into();
            self.pc.add_track_0(&track, &stream);
        }
        Ok(())
    }

    /// Stop transceivers and local tracks, give them a moment, then close.
    pub async fn close(self) {
        for t in self.pc.get_transceivers().iter() {
            t.unchecked_into::<web::RtcRtpTransceiver>().stop();
        }
        for s in self.pc.get_senders().iter() {
            if let Some(track) = s.unchecked_into::<web::RtcRtpSender>().track() {
                track.stop();
            }
        }
        if let Err(e) = sleep_ms(STOP_GRACE_MS).await {
            log::warn!("[rtc] close delay failed: {:?}", e);
        }
        self.pc.close();
        log::info!("[rtc] peer connection closed");
    }
}

pub async fn sleep_ms(ms: i32) -> anyhow::Result<()> {
    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        let armed = web::window().map(|w| {
            w.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
        });
        if !matches!(armed, Some(Ok(_))) {
            _ = reject.call1(&JsValue::NULL, &"setTimeout unavailable".into());
        }
    });
    JsFuture::from(promise).await.map_err(js_err)?;
    Ok(())
}

fn gathering_complete(pc: &web::RtcPeerConnection) -> bool {
    IceGathering::is_complete(&state_of(pc, "iceGatheringState"))
}

/// Resolve once `icegatheringstatechange` reports `complete`.
async fn wait_for_ice_gathering(pc: &web::RtcPeerConnection) -> anyhow::Result<()> {
    if gathering_complete(pc) {
        return Ok(());
    }
    let mut listener: Option<Closure<dyn FnMut()>> = None;
    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        let pc_state = pc.clone();
        let on_change = Closure::wrap(Box::new(move || {
            if gathering_complete(&pc_state) {
                _ = resolve.call0(&JsValue::NULL);
            }
        }) as Box<dyn FnMut()>);
        if let Err(e) = pc.add_event_listener_with_callback(
            "icegatheringstatechange",
            on_change.as_ref().unchecked_ref(),
        ) {
            _ = reject.call1(&JsValue::NULL, &e);
        }
        listener = Some(on_change);
    });
    let gathered = JsFuture::from(promise).await.map_err(js_err);
    if let Some(on_change) = listener {
        _ = pc.remove_event_listener_with_callback(
            "icegatheringstatechange",
            on_change.as_ref().unchecked_ref(),
        );
    }
    gathered.map(|_| ())
}

fn sdp_type(kind: &str) -> anyhow::Result<web::RtcSdpType> {
    match kind {
        "answer" => Ok(web::RtcSdpType::Answer),
        "pranswer" => Ok(web::RtcSdpType::Pranswer),
        other => anyhow::bail!("unexpected answer type {:?}", other),
    }
}

async fn post_offer(offer: &OfferRequest) -> anyhow::Result<SessionAnswer> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let init = web::RequestInit::new();
    init.set_method("POST");
    init.set_body(&JsValue::from_str(&offer.to_json()?));
    let request = web::Request::new_with_str_and_init(OFFER_PATH, &init).map_err(js_err)?;
    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(js_err)?;
    let response: web::Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_err)?
        .unchecked_into();
    if !response.ok() {
        anyhow::bail!("{} returned HTTP {}", OFFER_PATH, response.status());
    }
    let body = JsFuture::from(response.text().map_err(js_err)?)
        .await
        .map_err(js_err)?
        .as_string()
        .ok_or_else(|| anyhow::anyhow!("answer body is not text"))?;
    Ok(SessionAnswer::from_json(&body)?)
}

/// Offer, wait for ICE gathering, exchange with the endpoint, apply the answer.
pub async fn negotiate(pc: &web::RtcPeerConnection, document: &web::Document) -> anyhow::Result<()> {
    let offer: web::RtcSessionDescriptionInit = JsFuture::from(pc.create_offer())
        .await
        .map_err(js_err)?
        .unchecked_into();
    JsFuture::from(pc.set_local_description(&offer))
        .await
        .map_err(js_err)?;
    wait_for_ice_gathering(pc).await?;

    // The gathered description carries the ICE candidates.
    let mut sdp = pc
        .local_description()
        .map(|d| d.sdp())
        .ok_or_else(|| anyhow::anyhow!("no local description after gathering"))?;
    let codec = dom::select_value(document, ID_AUDIO_CODEC).unwrap_or_else(|| "default".into());
    if codec != "default" {
        sdp = filter_codec("audio", &codec, &sdp);
        sdp = filter_codec("video", &codec, &sdp);
    }
    dom::set_text(document, ID_OFFER_SDP, &sdp);

    let video_transform = dom::select_value(document, ID_VIDEO_TRANSFORM)
        .or_else(|| dom::input_value(document, ID_VIDEO_TRANSFORM))
        .unwrap_or_else(|| "none".into());
    let answer = post_offer(&OfferRequest::new(sdp, video_transform)).await?;
    dom::set_text(document, ID_ANSWER_SDP, &answer.sdp);

    let remote = web::RtcSessionDescriptionInit::new(sdp_type(&answer.kind)?);
    remote.set_sdp(&answer.sdp);
    JsFuture::from(pc.set_remote_description(&remote))
        .await
        .map_err(js_err)?;
    log::info!("[rtc] negotiated");
    Ok(())
}
