use std::cell::Cell;
use std::rc::Rc;

use gloo_events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, MouseEvent};

use crate::config::GlowConfig;
use crate::error::UiError;
use crate::motion::policy::{MotionGate, MotionPolicy};
use crate::utils::dom;
use crate::utils::frame::{FrameLoop, LoopControl};

pub const GLOW_SELECTOR: &str = ".cursor-glow";

/// Pointer position and the trailing glow position, in client pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GlowState {
    pub mouse_x: f64,
    pub mouse_y: f64,
    pub glow_x: f64,
    pub glow_y: f64,
}

impl GlowState {
    pub fn point_at(&mut self, x: f64, y: f64) {
        self.mouse_x = x;
        self.mouse_y = y;
    }

    /// Moves the glow `smoothing` of the remaining way towards the pointer.
    pub fn step(&mut self, smoothing: f64) {
        self.glow_x += (self.mouse_x - self.glow_x) * smoothing;
        self.glow_y += (self.mouse_y - self.glow_y) * smoothing;
    }
}

struct GlowFollower {
    element: HtmlElement,
    state: Rc<Cell<GlowState>>,
    frames: FrameLoop,
}

impl GlowFollower {
    fn new(element: HtmlElement, smoothing: f64) -> Self {
        let state = Rc::new(Cell::new(GlowState::default()));
        let frames = {
            let state = Rc::clone(&state);
            let element = element.clone();
            FrameLoop::new(move |_| {
                let mut current = state.get();
                current.step(smoothing);
                state.set(current);
                dom::set_style(
                    &element,
                    "transform",
                    &format!(
                        "translate({:.2}px, {:.2}px) translate(-50%, -50%)",
                        current.glow_x, current.glow_y
                    ),
                );
                LoopControl::Continue
            })
        };
        Self {
            element,
            state,
            frames,
        }
    }

    fn page_hidden() -> bool {
        dom::document().map(|d| d.hidden()).unwrap_or(false)
    }

    fn sync(&self, policy: &MotionPolicy) {
        if !policy.allows_glow() {
            self.frames.cancel();
            dom::set_style(&self.element, "display", "none");
            return;
        }
        if let Err(e) = self.element.style().remove_property("display") {
            log::warn!("Failed to show cursor glow: {:?}", e);
        }
        if Self::page_hidden() {
            self.frames.cancel();
        } else if !self.frames.is_running() {
            log::debug!("Cursor glow loop started");
            self.frames.start();
        }
    }
}

pub fn install(gate: &Rc<MotionGate>, config: &GlowConfig) -> Result<(), UiError> {
    let Some(element) = dom::query(GLOW_SELECTOR).and_then(|el| dom::as_html(&el)) else {
        log::debug!("No {}, skipping cursor glow", GLOW_SELECTOR);
        return Ok(());
    };
    let document = dom::document().ok_or_else(|| UiError::MissingElement("document".into()))?;
    let follower = Rc::new(GlowFollower::new(element, config.smoothing));
    follower.sync(&gate.policy());

    {
        let state = Rc::clone(&follower.state);
        EventListener::new(&document, "mousemove", move |event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                let mut current = state.get();
                current.point_at(event.client_x() as f64, event.client_y() as f64);
                state.set(current);
            }
        })
        .forget();
    }

    {
        let follower = Rc::clone(&follower);
        let gate = Rc::clone(gate);
        EventListener::new(&document, "visibilitychange", move |_| {
            follower.sync(&gate.policy());
        })
        .forget();
    }

    gate.subscribe(move |policy| follower.sync(&policy));
    Ok(())
}


#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn desktop(reduce_motion: bool) -> MotionPolicy {
        MotionPolicy {
            reduce_motion,
            is_mobile: false,
            has_touch: false,
            fine_pointer: true,
        }
    }

    fn display(element: &HtmlElement) -> String {
        element.style().get_property_value("display").unwrap()
    }

    #[wasm_bindgen_test]
    fn repeated_syncs_settle_on_the_same_loop_state() {
        let element = dom::create_element("div", "cursor-glow").unwrap();
        let follower = GlowFollower::new(element.clone(), 0.08);
        let visible = !GlowFollower::page_hidden();

        follower.sync(&desktop(false));
        follower.sync(&desktop(false));
        assert_eq!(follower.frames.is_running(), visible);

        follower.sync(&desktop(true));
        follower.sync(&desktop(true));
        assert!(!follower.frames.is_running());
        assert_eq!(display(&element), "none");

        follower.sync(&desktop(false));
        assert_eq!(follower.frames.is_running(), visible);
        assert_eq!(display(&element), "");
        follower.frames.cancel();
    }

    #[wasm_bindgen_test]
    fn mobile_hides_the_glow() {
        let element = dom::create_element("div", "cursor-glow").unwrap();
        let follower = GlowFollower::new(element.clone(), 0.08);
        follower.sync(&MotionPolicy {
            is_mobile: true,
            ..desktop(false)
        });
        assert!(!follower.frames.is_running());
        assert_eq!(display(&element), "none");
    }
}
