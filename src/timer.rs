use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Self-rearming `setTimeout` chain with a single reusable callback.
///
/// The callback returns the delay until its next run, or `None` to stop.
/// Dropping the timer clears any pending timeout.
pub struct Timer {
    shared: Rc<TimerShared>,
}

struct TimerShared {
    callback: RefCell<Option<Closure<dyn FnMut()>>>,
    handle: Cell<Option<i32>>,
    cancelled: Cell<bool>,
}

impl TimerShared {
    fn arm(&self, delay_ms: f64) -> anyhow::Result<()> {
        let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
        let callback = self.callback.borrow();
        let Some(cb) = callback.as_ref() else {
            anyhow::bail!("timer callback missing");
        };
        let id = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                delay_ms.max(0.0).ceil() as i32,
            )
            .map_err(|e| anyhow::anyhow!("setTimeout failed: {:?}", e))?;
        self.handle.set(Some(id));
        Ok(())
    }
}

impl Timer {
    pub fn start(
        first_delay_ms: f64,
        mut on_fire: impl FnMut() -> Option<f64> + 'static,
    ) -> anyhow::Result<Self> {
        let shared = Rc::new(TimerShared {
            callback: RefCell::new(None),
            handle: Cell::new(None),
            cancelled: Cell::new(false),
        });
        let weak: Weak<TimerShared> = Rc::downgrade(&shared);
        let closure = Closure::wrap(Box::new(move || {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            shared.handle.set(None);
            if shared.cancelled.get() {
                return;
            }
            if let Some(delay_ms) = on_fire() {
                if let Err(e) = shared.arm(delay_ms) {
                    log::error!("[timer] rearm failed: {:?}", e);
                }
            }
        }) as Box<dyn FnMut()>);
        *shared.callback.borrow_mut() = Some(closure);
        shared.arm(first_delay_ms)?;
        Ok(Self { shared })
    }

    pub fn cancel(&self) {
        self.shared.cancelled.set(true);
        if let Some(id) = self.shared.handle.take() {
            if let Some(w) = web::window() {
                w.clear_timeout_with_handle(id);
            }
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.cancel();
    }
}
