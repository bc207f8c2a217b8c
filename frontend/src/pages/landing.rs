use gloo_events::EventListener;

use crate::config::LandingConfig;
use crate::effects::{confetti::Confetti, glow, particles, ripple};
use crate::error::UiError;
use crate::forms::{calendar_dom, upload, wizard_dom};
use crate::motion::policy::MotionGate;
use crate::pages::{faq, nav};
use crate::scroll::{counter, navbar, parallax, reveal};
use crate::utils::dom;

fn report(component: &str, result: Result<(), UiError>) {
    if let Err(e) = result {
        log::error!("Failed to set up {}: {}", component, e);
    }
}

/// Wires every component against the current document. Each one is
/// independent; a failure in one is logged and the rest still run.
fn wire(config: &LandingConfig) {
    let gate = MotionGate::detect(&config.motion);

    report("particles", particles::install(&gate, &config.particles));
    report("cursor glow", glow::install(&gate, &config.glow));
    report("navbar", navbar::install(&config.navbar));
    report("nav links", nav::install(&gate));
    report("reveal", reveal::install(&config.reveal));
    report("counters", counter::install(&gate, &config.counters));
    report("ripple", ripple::install(&gate, &config.ripple));

    let confetti = Confetti::install(&gate, &config.confetti);
    let selection = match calendar_dom::install(&config.calendar) {
        Ok(selection) => selection,
        Err(e) => {
            log::error!("Failed to set up date picker: {}", e);
            None
        }
    };
    for spec in [&wizard_dom::FOUNDER, &wizard_dom::INVESTOR] {
        report(
            spec.name,
            wizard_dom::install(spec, &config.wizard, selection.clone(), &confetti),
        );
    }
    report("file upload", upload::install());
    report("faq", faq::install());
    report("parallax", parallax::install(&gate, &config.parallax));

    log::info!("Landing page ready");
}

/// Runs [`wire`] now, or once the document has finished parsing.
pub fn boot(config: LandingConfig) {
    let Some(document) = dom::document() else {
        log::error!("No document, nothing to wire");
        return;
    };
    if document.ready_state() != "loading" {
        wire(&config);
        return;
    }
    EventListener::once(&document, "DOMContentLoaded", move |_| wire(&config)).forget();
}
