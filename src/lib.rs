#![cfg(target_arch = "wasm32")]
use avatar_core::{
    restore_or_seed, start_session_with, AnimationConfig, AvatarController, AvatarRig, AvatarSlot,
    MemoryStore, RestPose, SceneFraming, SettingsStore,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod audio;
mod blink;
mod constants;
mod dom;
mod frame;
mod overlay;
mod scene;
mod settings;
mod timer;
mod transport;

use constants::*;
use scene::{AvatarScene, WebAvatar};

/// Everything one page session owns. Audio tap, blink timer and peer
/// connection exist only between "start" and "stop".
struct App {
    document: web::Document,
    scene: AvatarScene,
    stage: Rc<RefCell<AvatarSlot<WebAvatar>>>,
    controller: Rc<RefCell<AvatarController>>,
    store: Box<dyn SettingsStore>,
    peer: Option<transport::PeerSession>,
    audio: Option<audio::AudioTap>,
    blink: Option<timer::Timer>,
    _render_loop: frame::LoopHandle,
}

impl App {
    /// Begin animating from `stream`; fails fast when there is none.
    fn attach_audio(&mut self, stream: Option<web::MediaStream>) -> anyhow::Result<()> {
        // Release any previous tap before building the new graph.
        self.audio = None;
        self.blink = None;
        let meter = dom::input(&self.document, ID_INPUT_LEVEL);
        let controller = self.controller.clone();
        let (tap, blink) = start_session_with(
            &self.controller,
            stream,
            js_sys::Date::now(),
            move |stream: web::MediaStream| -> anyhow::Result<_> {
                let tap = audio::AudioTap::attach(&stream, controller.clone(), meter)?;
                let blink = blink::start_blinking(controller)?;
                Ok((tap, blink))
            },
        )?;
        self.audio = Some(tap);
        self.blink = Some(blink);
        log::info!("[audio] avatar animation running");
        Ok(())
    }

    fn detach_audio(&mut self) {
        self.blink = None;
        self.audio = None;
        self.controller.borrow_mut().end_session();
    }

    /// Fetch `url` and swap it in once parsed; a newer request supersedes it.
    fn load_avatar(&self, url: &str) {
        let ticket = self.stage.borrow_mut().begin_load(url);
        let scene = self.scene.clone();
        let stage = self.stage.clone();
        let url = url.to_owned();
        spawn_local(async move {
            match scene::fetch_avatar(&scene, &url).await {
                Ok(mut avatar) => match stage.try_borrow_mut() {
                    Ok(mut slot) => {
                        slot.complete_load(ticket, avatar);
                    }
                    Err(_) => {
                        log::error!("[load] avatar slot busy; dropping {}", url);
                        avatar.dispose();
                    }
                },
                Err(reason) => match stage.try_borrow_mut() {
                    Ok(mut slot) => {
                        _ = slot.fail_load(ticket, reason);
                    }
                    Err(_) => log::error!("[load] {} failed: {}", url, reason),
                },
            }
        });
    }

    fn apply_settings(&mut self) {
        let mut ctl = self.controller.borrow_mut();
        if let Err(e) = settings::apply_from_sliders(&self.document, &mut ctl, self.store.as_mut()) {
            log::error!("[settings] could not persist: {}", e);
        }
    }
}

fn open_store() -> Box<dyn SettingsStore> {
    match settings::LocalStorageStore::open() {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("[settings] {:?}; settings will not persist", e);
            Box::new(MemoryStore::new())
        }
    }
}

fn wire_window_resize(scene: &AvatarScene) {
    let scene_resize = scene.clone();
    let resize_closure = Closure::wrap(Box::new(move || {
        if let Some(w) = web::window() {
            let width = w.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
            let height = w.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
            scene_resize.resize(width, height.max(1.0));
        }
    }) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window
            .add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref());
    }
    resize_closure.forget();
}

fn on_track(app: &Rc<RefCell<App>>, ev: web::RtcTrackEvent) {
    let Ok(mut app) = app.try_borrow_mut() else {
        log::error!("[rtc] app busy; ignoring incoming track");
        return;
    };
    let stream = ev
        .streams()
        .get(0)
        .dyn_into::<web::MediaStream>()
        .ok();
    if ev.track().kind() == "video" {
        if let Some(s) = &stream {
            dom::set_media_stream(&app.document, ID_VIDEO, s);
        }
        return;
    }
    if let Some(s) = &stream {
        dom::set_media_stream(&app.document, ID_AUDIO, s);
    }
    if let Err(e) = app.attach_audio(stream) {
        log::error!("[audio] {:?}", e);
    }
}

async fn start_session(app: Rc<RefCell<App>>) -> anyhow::Result<()> {
    let document = app.borrow().document.clone();

    let app_track = app.clone();
    let peer = transport::PeerSession::create(
        &document,
        dom::is_checked(&document, ID_USE_STUN),
        move |ev| on_track(&app_track, ev),
    )?;
    if dom::is_checked(&document, ID_USE_AUDIO) {
        peer.add_local_audio().await?;
    }
    let pc = peer.connection().clone();
    app.borrow_mut().peer = Some(peer);
    transport::negotiate(&pc, &document).await
}

async fn stop_session(app: Rc<RefCell<App>>) {
    let (document, peer) = {
        let mut a = app.borrow_mut();
        a.detach_audio();
        (a.document.clone(), a.peer.take())
    };
    dom::set_visible(&document, ID_STOP, None);
    if let Some(peer) = peer {
        peer.close().await;
    }
}

fn wire_buttons(app: &Rc<RefCell<App>>) {
    let document = app.borrow().document.clone();

    let app_start = app.clone();
    dom::add_click_listener(&document, ID_START, move || {
        let app = app_start.clone();
        spawn_local(async move {
            let document = app.borrow().document.clone();
            dom::set_visible(&document, ID_START, None);
            if let Err(e) = start_session(app).await {
                log::error!("[rtc] start failed: {:?}", e);
                dom::alert(&format!("{}", e));
            }
            overlay::show_start_button(&document, false);
        });
    });

    let app_stop = app.clone();
    dom::add_click_listener(&document, ID_STOP, move || {
        spawn_local(stop_session(app_stop.clone()));
    });

    let app_apply = app.clone();
    dom::add_click_listener(&document, ID_APPLY_SETTINGS, move || {
        match app_apply.try_borrow_mut() {
            Ok(mut a) => a.apply_settings(),
            Err(_) => log::warn!("[settings] busy; try again"),
        }
    });

    dom::add_click_listener(&document, ID_HIDE_SETTINGS, move || {
        if let Some(d) = dom::window_document() {
            overlay::hide(&d);
        }
    });
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("vu-avatar starting");

    if let Err(e) = init() {
        log::error!("init error: {:?}", e);
    }
    Ok(())
}

fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let scene = scene::create_scene(&SceneFraming::portrait())?;
    wire_window_resize(&scene);

    let mut store = open_store();
    let config = restore_or_seed(store.as_mut(), || {
        settings::read_sliders(&document, &AnimationConfig::default())
    })
    .unwrap_or_else(|e| {
        log::warn!("[settings] restore failed: {}", e);
        AnimationConfig::default()
    });
    // Sliders only display the restored values; the controller takes them as is.
    settings::write_sliders(&document, &config);
    let controller = Rc::new(RefCell::new(AvatarController::new(config, None)));
    let stage = Rc::new(RefCell::new(AvatarSlot::new(RestPose::standard())));

    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext::new(
        scene.clone(),
        stage.clone(),
        controller.clone(),
    )));
    let render_loop = frame::start_loop(frame_ctx);

    let app = Rc::new(RefCell::new(App {
        document,
        scene,
        stage,
        controller,
        store,
        peer: None,
        audio: None,
        blink: None,
        _render_loop: render_loop,
    }));
    app.borrow().load_avatar(DEFAULT_VRM_URL);
    wire_buttons(&app);
    // The listeners keep their own clones of the app alive for the page lifetime.
    Ok(())
}
