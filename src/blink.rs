use crate::timer::Timer;
use avatar_core::{AvatarController, BlinkEvent};
use std::cell::RefCell;
use std::rc::Rc;

// Rearm delay when the controller is borrowed by another callback
const RETRY_MS: f64 = 50.0;

/// Drive the controller's blink timeline from a single timer.
///
/// The returned timer keeps blinking until dropped.
pub fn start_blinking(controller: Rc<RefCell<AvatarController>>) -> anyhow::Result<Timer> {
    let now = js_sys::Date::now();
    let first = controller
        .borrow()
        .next_blink_deadline_ms()
        .ok_or_else(|| anyhow::anyhow!("blink requested without an audio session"))?;
    Timer::start(first - now, move || {
        let now_ms = js_sys::Date::now();
        let Ok(mut ctl) = controller.try_borrow_mut() else {
            log::warn!("[blink] controller busy; retrying");
            return Some(RETRY_MS);
        };
        match ctl.on_blink_timer(now_ms) {
            Ok(events) => {
                for ev in &events {
                    if let BlinkEvent::Closed { at_ms, .. } = ev {
                        log::debug!("[blink] closed at {:.0}", at_ms);
                    }
                }
            }
            Err(e) => {
                log::error!("[blink] {}", e);
                return None;
            }
        }
        ctl.next_blink_deadline_ms().map(|deadline| deadline - now_ms)
    })
}
