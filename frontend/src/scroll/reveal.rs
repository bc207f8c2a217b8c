use std::cell::RefCell;
use std::rc::Rc;

use crate::config::RevealConfig;
use crate::error::UiError;
use crate::utils::{dom, observer};

const VISIBLE_CLASS: &str = "visible";
const ID_ATTR: &str = "data-reveal-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    Unobserved,
    Observed,
    Revealed,
}

/// One-way lifecycle of every element handed to the reveal controller.
#[derive(Debug, Default)]
pub struct RevealLedger {
    phases: Vec<RevealPhase>,
}

impl RevealLedger {
    pub fn register(&mut self) -> usize {
        self.phases.push(RevealPhase::Unobserved);
        self.phases.len() - 1
    }

    #[cfg(test)]
    pub fn phase(&self, id: usize) -> Option<RevealPhase> {
        self.phases.get(id).copied()
    }

    pub fn observe(&mut self, id: usize) -> bool {
        self.advance(id, RevealPhase::Unobserved, RevealPhase::Observed)
    }

    /// Returns `true` only on the first reveal of an observed element.
    pub fn reveal(&mut self, id: usize) -> bool {
        self.advance(id, RevealPhase::Observed, RevealPhase::Revealed)
    }

    pub fn revealed_count(&self) -> usize {
        self.phases
            .iter()
            .filter(|p| **p == RevealPhase::Revealed)
            .count()
    }

    fn advance(&mut self, id: usize, from: RevealPhase, to: RevealPhase) -> bool {
        match self.phases.get_mut(id) {
            Some(phase) if *phase == from => {
                *phase = to;
                true
            }
            _ => false,
        }
    }
}

pub fn install(config: &RevealConfig) -> Result<(), UiError> {
    if config.selectors.is_empty() {
        return Ok(());
    }
    let targets = dom::query_all(&config.selectors.join(", "));
    if targets.is_empty() {
        log::debug!("Nothing to reveal");
        return Ok(());
    }

    let ledger = Rc::new(RefCell::new(RevealLedger::default()));
    for target in &targets {
        let id = {
            let mut ledger = ledger.borrow_mut();
            let id = ledger.register();
            ledger.observe(id);
            id
        };
        target.set_attribute(ID_ATTR, &id.to_string())?;
    }
    let total = targets.len();
    log::debug!("Watching {} elements for reveal", total);

    observer::observe_once(targets, config.threshold, &config.root_margin, move |el| {
        let id = el
            .get_attribute(ID_ATTR)
            .and_then(|raw| raw.parse::<usize>().ok());
        if let Some(id) = id {
            let mut ledger = ledger.borrow_mut();
            if ledger.reveal(id) {
                dom::set_class(el, VISIBLE_CLASS, true);
                if ledger.revealed_count() == total {
                    log::debug!("All {} elements revealed", total);
                }
            }
        }
    })
}


#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen::JsValue;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn stats_and_timeline_are_revealed_without_observer() {
        let window = dom::window().unwrap();
        let body = dom::document().unwrap().body().unwrap();
        let targets: Vec<_> = ["stats-grid", "timeline-item", "section-header"]
            .iter()
            .map(|class| dom::create_element("div", class).unwrap())
            .collect();
        for target in &targets {
            body.append_child(target).unwrap();
        }

        let key = JsValue::from_str("IntersectionObserver");
        let saved = js_sys::Reflect::get(&window, &key).unwrap();
        js_sys::Reflect::delete_property(&window, &key).unwrap();
        let result = install(&RevealConfig::default());
        js_sys::Reflect::set(&window, &key, &saved).unwrap();

        result.unwrap();
        for target in &targets {
            assert!(dom::has_class(target, VISIBLE_CLASS));
            target.remove();
        }
    }
}
