use crate::scene::{AvatarScene, WebAvatar};
use avatar_core::{AvatarController, AvatarSlot, StallEvent};
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

// Clamp for the first frame after a hidden tab resumes
const MAX_FRAME_DT_SEC: f32 = 0.25;

pub struct FrameContext {
    pub scene: AvatarScene,
    pub stage: Rc<RefCell<AvatarSlot<WebAvatar>>>,
    pub controller: Rc<RefCell<AvatarController>>,
    pub last_instant: Instant,
    pub last_look_at_y: Option<f32>,
}

impl FrameContext {
    pub fn new(
        scene: AvatarScene,
        stage: Rc<RefCell<AvatarSlot<WebAvatar>>>,
        controller: Rc<RefCell<AvatarController>>,
    ) -> Self {
        Self {
            scene,
            stage,
            controller,
            last_instant: Instant::now(),
            last_look_at_y: None,
        }
    }

    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt_sec = (now - self.last_instant).as_secs_f32().min(MAX_FRAME_DT_SEC);
        self.last_instant = now;

        // Snapshot the weights written by the audio and blink callbacks.
        let snapshot = match self.controller.try_borrow_mut() {
            Ok(mut ctl) => {
                match ctl.check_stall(js_sys::Date::now()) {
                    Some(StallEvent::Stalled) => {
                        log::warn!("[frame] audio processing stalled; closing mouth")
                    }
                    Some(StallEvent::Resumed) | None => {}
                }
                Some((ctl.weights(), ctl.look_at_y()))
            }
            Err(_) => None,
        };

        if let Some((weights, look_at_y)) = snapshot {
            if let Some(y) = look_at_y.filter(|&y| self.last_look_at_y != Some(y)) {
                self.scene.set_look_at_height(y);
                self.last_look_at_y = Some(y);
            }
            match self.stage.try_borrow_mut() {
                Ok(mut stage) => {
                    stage.drive(dt_sec, &weights);
                }
                Err(_) => log::warn!("[frame] avatar slot busy; skipping pose update"),
            }
        }

        self.scene.render();
    }
}

/// Cancels the render loop when stopped or dropped.
pub struct LoopHandle {
    running: Rc<Cell<bool>>,
    raf_id: Rc<Cell<Option<i32>>>,
    _tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl LoopHandle {
    pub fn stop(&self) {
        self.running.set(false);
        if let Some(id) = self.raf_id.take() {
            if let Some(w) = web::window() {
                _ = w.cancel_animation_frame(id);
            }
        }
    }
}

impl Drop for LoopHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn request_frame(
    tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
    raf_id: &Rc<Cell<Option<i32>>>,
) {
    let Some(w) = web::window() else {
        return;
    };
    if let Some(cb) = tick.borrow().as_ref() {
        match w.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(id) => raf_id.set(Some(id)),
            Err(e) => log::error!("[frame] requestAnimationFrame failed: {:?}", e),
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) -> LoopHandle {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let running = Rc::new(Cell::new(true));
    let raf_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));

    // The closure holds weak refs to itself so dropping the handle frees it.
    let tick_weak = Rc::downgrade(&tick);
    let running_tick = running.clone();
    let raf_tick = raf_id.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        raf_tick.set(None);
        if !running_tick.get() {
            return;
        }
        match frame_ctx.try_borrow_mut() {
            Ok(mut ctx) => ctx.frame(),
            Err(_) => log::warn!("[frame] frame context busy; skipping frame"),
        }
        if let Some(tick) = tick_weak.upgrade() {
            request_frame(&tick, &raf_tick);
        }
    }) as Box<dyn FnMut()>));
    request_frame(&tick, &raf_id);

    LoopHandle {
        running,
        raf_id,
        _tick: tick,
    }
}
