use gloo_events::{EventListener, EventListenerOptions};
use gloo_timers::callback::Timeout;
use web_sys::Element;

use crate::error::UiError;
use crate::utils::dom;

const ITEM_SELECTOR: &str = ".faq-item";
const QUESTION_SELECTOR: &str = ".faq-question";
const OPEN_CLASS: &str = "open";

/// Id named by a location hash such as `#pricing-question`.
pub fn hash_target(hash: &str) -> Option<&str> {
    let id = hash.strip_prefix('#').unwrap_or(hash).trim();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

fn open_from_hash(items: &[Element]) {
    let Some(hash) = dom::window().and_then(|w| w.location().hash().ok()) else {
        return;
    };
    let Some(id) = hash_target(&hash) else {
        return;
    };
    let Some(item) = items.iter().find(|item| item.id() == id) else {
        return;
    };
    dom::set_class(item, OPEN_CLASS, true);
    // let the answer expand before scrolling to it
    let item = item.clone();
    Timeout::new(100, move || item.scroll_into_view_with_bool(true)).forget();
}

pub fn install() -> Result<(), UiError> {
    let items = dom::query_all(ITEM_SELECTOR);
    if items.is_empty() {
        log::debug!("No FAQ items");
        return Ok(());
    }

    for item in &items {
        let trigger = dom::query_all_in(item, QUESTION_SELECTOR)
            .into_iter()
            .next()
            .unwrap_or_else(|| item.clone());
        let item = item.clone();
        EventListener::new_with_options(
            &trigger,
            "click",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                event.prevent_default();
                let open = !dom::has_class(&item, OPEN_CLASS);
                dom::set_class(&item, OPEN_CLASS, open);
            },
        )
        .forget();
    }

    open_from_hash(&items);
    let window = dom::window().ok_or_else(|| UiError::MissingElement("window".into()))?;
    EventListener::new(&window, "hashchange", move |_| open_from_hash(&items)).forget();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_target_strips_the_marker() {
        assert_eq!(hash_target("#how-it-works"), Some("how-it-works"));
        assert_eq!(hash_target("how-it-works"), Some("how-it-works"));
        assert_eq!(hash_target("#"), None);
        assert_eq!(hash_target(""), None);
    }
}
