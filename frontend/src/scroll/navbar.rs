use gloo_events::EventListener;
use web_sys::Element;

use crate::config::NavbarConfig;
use crate::error::UiError;
use crate::utils::dom;
use crate::utils::frame::FrameThrottle;

const NAV_ID: &str = "nav";
const NAV_TAG: &str = "nav";
const SCROLLED_CLASS: &str = "scrolled";

/// The page's navigation bar: `#nav`, else the first `<nav>`.
pub fn find_nav() -> Option<Element> {
    dom::by_id(NAV_ID).or_else(|| dom::query(NAV_TAG))
}

pub fn is_scrolled(scroll_y: f64, threshold: f64) -> bool {
    scroll_y > threshold
}

pub fn install(config: &NavbarConfig) -> Result<(), UiError> {
    let Some(nav) = find_nav() else {
        log::debug!("No #{} or <nav>, skipping navbar scroll state", NAV_ID);
        return Ok(());
    };
    let window = dom::window().ok_or_else(|| UiError::MissingElement("window".into()))?;
    let threshold = config.scroll_threshold;
    let throttle = FrameThrottle::new(move || {
        dom::set_class(&nav, SCROLLED_CLASS, is_scrolled(dom::scroll_y(), threshold));
    });
    throttle.run_now();
    EventListener::new(&window, "scroll", move |_| throttle.schedule()).forget();
    Ok(())
}


#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn nav_id_wins_over_the_first_nav_tag() {
        let body = dom::document().unwrap().body().unwrap();
        let plain = dom::create_element("nav", "").unwrap();
        plain.set_id("site-nav");
        let bar = dom::create_element("header", "").unwrap();
        bar.set_id(NAV_ID);
        body.append_child(&plain).unwrap();
        body.append_child(&bar).unwrap();

        assert_eq!(find_nav().map(|nav| nav.id()).as_deref(), Some(NAV_ID));
        bar.remove();
        assert_eq!(find_nav().map(|nav| nav.id()).as_deref(), Some("site-nav"));
        plain.remove();
        assert!(find_nav().is_none());
    }
}
