use std::rc::Rc;

use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{Element, MouseEvent};

use crate::config::RippleConfig;
use crate::error::UiError;
use crate::motion::policy::MotionGate;
use crate::utils::dom;

const CONTROL_SELECTOR: &str = "button, .btn";
const OPT_OUT_ATTR: &str = "data-no-ripple";
const OPT_OUT_CLASS: &str = "no-ripple";

/// Square ripple placement, relative to the clicked control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RippleGeometry {
    pub size: f64,
    pub left: f64,
    pub top: f64,
}

impl RippleGeometry {
    /// Centers a square as large as the control's longer side on the click point.
    pub fn centered_on(
        (rect_left, rect_top, width, height): (f64, f64, f64, f64),
        (client_x, client_y): (f64, f64),
    ) -> Self {
        let size = width.max(height);
        Self {
            size,
            left: client_x - rect_left - size / 2.0,
            top: client_y - rect_top - size / 2.0,
        }
    }

    /// Full inline presentation. Only the `ripple` keyframes come from the page.
    pub fn style(&self, lifetime_ms: u32) -> String {
        format!(
            "width:{size:.1}px;height:{size:.1}px;left:{:.1}px;top:{:.1}px;\
             position:absolute;border-radius:50%;background:rgba(255, 255, 255, 0.3);\
             transform:scale(0);animation:ripple {:.1}s ease-out;pointer-events:none",
            self.left,
            self.top,
            f64::from(lifetime_ms) / 1000.0,
            size = self.size,
        )
    }
}

fn opted_out(control: &Element) -> bool {
    control.has_attribute(OPT_OUT_ATTR) || dom::has_class(control, OPT_OUT_CLASS)
}

fn spawn(control: &Element, event: &MouseEvent, lifetime_ms: u32) -> Result<(), UiError> {
    let rect = control.get_bounding_client_rect();
    let geometry = RippleGeometry::centered_on(
        (rect.left(), rect.top(), rect.width(), rect.height()),
        (event.client_x() as f64, event.client_y() as f64),
    );
    let ripple = dom::create_element("span", "ripple")?;
    ripple.set_attribute("style", &geometry.style(lifetime_ms))?;
    control.append_child(&ripple)?;
    Timeout::new(lifetime_ms, move || ripple.remove()).forget();
    Ok(())
}

/// One document-level click listener covers every current and future control.
pub fn install(gate: &Rc<MotionGate>, config: &RippleConfig) -> Result<(), UiError> {
    let document = dom::document().ok_or_else(|| UiError::MissingElement("document".into()))?;
    let gate = Rc::clone(gate);
    let lifetime_ms = config.lifetime_ms;
    EventListener::new(&document, "click", move |event| {
        if !gate.policy().allows_decoration() {
            return;
        }
        let Some(event) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        let control = event
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .and_then(|el| el.closest(CONTROL_SELECTOR).ok().flatten());
        let Some(control) = control else {
            return;
        };
        if opted_out(&control) {
            return;
        }
        if let Err(e) = spawn(&control, event, lifetime_ms) {
            log::warn!("Failed to spawn ripple: {}", e);
        }
    })
    .forget();
    log::debug!("Ripple feedback delegated from document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ripple_is_centered_on_the_click() {
        let geometry = RippleGeometry::centered_on((100.0, 50.0, 120.0, 40.0), (160.0, 70.0));
        assert_eq!(geometry.size, 120.0);
        assert_eq!(geometry.left, 0.0);
        assert_eq!(geometry.top, -40.0);
    }

    #[test]
    fn tall_controls_use_their_height() {
        let geometry = RippleGeometry::centered_on((0.0, 0.0, 30.0, 90.0), (15.0, 45.0));
        assert_eq!(geometry.size, 90.0);
        assert_eq!(geometry.left, -30.0);
        assert_eq!(geometry.top, 0.0);
    }

    #[test]
    fn style_carries_the_full_presentation() {
        let geometry = RippleGeometry::centered_on((100.0, 50.0, 120.0, 40.0), (160.0, 70.0));
        let style = geometry.style(600);
        assert!(style.starts_with("width:120.0px;height:120.0px;left:0.0px;top:-40.0px;"));
        for property in [
            "position:absolute",
            "border-radius:50%",
            "background:rgba(255, 255, 255, 0.3)",
            "transform:scale(0)",
            "animation:ripple 0.6s ease-out",
            "pointer-events:none",
        ] {
            assert!(style.contains(property), "missing {} in {}", property, style);
        }
    }
}
