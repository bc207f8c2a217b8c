use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::utils::dom;

/// Runs `task` when the browser is idle, or after `fallback_ms` where
/// `requestIdleCallback` is unavailable.
pub fn when_idle(fallback_ms: u32, task: impl FnOnce() + 'static) {
    let window = match dom::window() {
        Some(w) if dom::global_has("requestIdleCallback") => w,
        _ => {
            Timeout::new(fallback_ms, task).forget();
            return;
        }
    };

    let task = Rc::new(RefCell::new(Some(task)));
    let pending = Rc::clone(&task);
    let callback = Closure::once(move |_: JsValue| {
        if let Some(task) = pending.borrow_mut().take() {
            task();
        }
    });
    match window.request_idle_callback(callback.as_ref().unchecked_ref()) {
        Ok(_) => callback.forget(),
        Err(e) => {
            log::warn!("requestIdleCallback failed, using timeout: {:?}", e);
            if let Some(task) = task.borrow_mut().take() {
                Timeout::new(fallback_ms, task).forget();
            }
        }
    }
}
