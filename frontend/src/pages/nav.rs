use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, ScrollBehavior, ScrollToOptions};

use crate::error::UiError;
use crate::motion::policy::MotionGate;
use crate::scroll::navbar;
use crate::utils::dom;

const LINKS_SELECTOR: &str = ".nav-links";
const TOGGLE_SELECTOR: &str = ".nav-toggle";
const ACTIVE_CLASS: &str = "active";
/// Global the page markup calls from `onclick`.
pub const TOGGLE_GLOBAL: &str = "toggleMenu";

/// Opens or closes the mobile menu.
pub fn toggle_menu() {
    if let Some(links) = dom::query(LINKS_SELECTOR) {
        let open = !dom::has_class(&links, ACTIVE_CLASS);
        dom::set_class(&links, ACTIVE_CLASS, open);
    }
}

fn expose_toggle() -> Result<(), UiError> {
    let window = dom::window().ok_or_else(|| UiError::MissingElement("window".into()))?;
    let toggle = Closure::<dyn Fn()>::new(toggle_menu);
    js_sys::Reflect::set(&window, &TOGGLE_GLOBAL.into(), toggle.as_ref())?;
    toggle.forget();
    Ok(())
}

/// Same-page anchor named by `href`, e.g. `#pricing`.
pub fn anchor_id(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

/// Document offset to scroll to so the target clears a fixed nav bar.
pub fn scroll_target(target_top: f64, scroll_y: f64, nav_height: f64) -> f64 {
    (target_top + scroll_y - nav_height).max(0.0)
}

fn scroll_to(target: &Element, reduce_motion: bool) {
    let Some(window) = dom::window() else {
        return;
    };
    let nav_height = navbar::find_nav()
        .and_then(|nav| nav.dyn_into::<HtmlElement>().ok())
        .map(|nav| nav.offset_height() as f64)
        .unwrap_or(0.0);
    let options = ScrollToOptions::new();
    options.set_top(scroll_target(
        target.get_bounding_client_rect().top(),
        dom::scroll_y(),
        nav_height,
    ));
    options.set_behavior(if reduce_motion {
        ScrollBehavior::Instant
    } else {
        ScrollBehavior::Smooth
    });
    window.scroll_to_with_scroll_to_options(&options);
}

pub fn install(gate: &Rc<MotionGate>) -> Result<(), UiError> {
    let Some(links) = dom::query(LINKS_SELECTOR) else {
        log::debug!("No {}, skipping nav links", LINKS_SELECTOR);
        return Ok(());
    };

    expose_toggle()?;
    // a toggle wired inline through the global would flip twice
    if let Some(toggle) = dom::query(TOGGLE_SELECTOR).filter(|t| !t.has_attribute("onclick")) {
        EventListener::new(&toggle, "click", |_| toggle_menu()).forget();
    }

    let gate = Rc::clone(gate);
    let menu = links.clone();
    EventListener::new_with_options(
        &links,
        "click",
        EventListenerOptions::enable_prevent_default(),
        move |event| {
            let anchor = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest("a[href]").ok().flatten());
            let Some(anchor) = anchor else {
                return;
            };
            let href = anchor.get_attribute("href").unwrap_or_default();
            let Some(target) = anchor_id(&href).and_then(dom::by_id) else {
                return;
            };
            event.prevent_default();
            dom::set_class(&menu, ACTIVE_CLASS, false);
            scroll_to(&target, gate.policy().reduce_motion);
        },
    )
    .forget();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_same_page_anchors_count() {
        assert_eq!(anchor_id("#pricing"), Some("pricing"));
        assert_eq!(anchor_id("#"), None);
        assert_eq!(anchor_id("/about"), None);
        assert_eq!(anchor_id("https://example.com/#x"), None);
    }

    #[test]
    fn scroll_target_clears_the_nav() {
        assert_eq!(scroll_target(300.0, 1000.0, 80.0), 1220.0);
        assert_eq!(scroll_target(-50.0, 20.0, 80.0), 0.0);
    }
}
