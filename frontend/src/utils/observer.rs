use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use crate::error::UiError;
use crate::utils::dom;

/// Calls `on_visible` once per target the first time it intersects the
/// viewport past `threshold`, then stops observing that target.
///
/// Without `IntersectionObserver` support every target is handed to
/// `on_visible` immediately.
pub fn observe_once(
    targets: Vec<Element>,
    threshold: f64,
    root_margin: &str,
    mut on_visible: impl FnMut(&Element) + 'static,
) -> Result<(), UiError> {
    if targets.is_empty() {
        return Ok(());
    }
    if !dom::global_has("IntersectionObserver") {
        log::debug!(
            "IntersectionObserver unavailable, showing {} elements now",
            targets.len()
        );
        for target in &targets {
            on_visible(target);
        }
        return Ok(());
    }

    let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
        move |entries: js_sys::Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if !entry.is_intersecting() {
                    continue;
                }
                let target = entry.target();
                observer.unobserve(&target);
                on_visible(&target);
            }
        },
    );

    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(threshold));
    init.set_root_margin(root_margin);
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
    for target in &targets {
        observer.observe(target);
    }
    callback.forget();
    Ok(())
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn without_observer_every_target_is_handed_over_at_once() {
        let window = dom::window().unwrap();
        let key = JsValue::from_str("IntersectionObserver");
        let saved = js_sys::Reflect::get(&window, &key).unwrap();
        js_sys::Reflect::delete_property(&window, &key).unwrap();

        let targets: Vec<Element> = (0..3)
            .map(|_| dom::create_element("div", "feature-card").unwrap().into())
            .collect();
        let seen = Rc::new(Cell::new(0));
        let counted = Rc::clone(&seen);
        let result = observe_once(targets, 0.1, "0px", move |_| counted.set(counted.get() + 1));

        js_sys::Reflect::set(&window, &key, &saved).unwrap();
        assert!(result.is_ok());
        assert_eq!(seen.get(), 3);
        assert!(dom::global_has("IntersectionObserver"));
    }
}
