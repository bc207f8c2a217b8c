use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, HtmlInputElement};

use crate::config::WizardConfig;
use crate::effects::confetti::Confetti;
use crate::error::UiError;
use crate::forms::calendar::SelectionReader;
use crate::forms::wizard::{RequiredField, StepMark, Wizard, WizardSurface};
use crate::utils::dom;

const STEP_SELECTOR: &str = ".form-step[data-step]";
const INDICATOR_SELECTOR: &str = ".step[data-step]";
const PROGRESS_SELECTOR: &str = ".form-progress";
const REQUIRED_SELECTOR: &str = "[required]";
const NEXT_SELECTOR: &str = ".btn-next";
const PREV_SELECTOR: &str = ".btn-prev";
const ERROR_CLASS: &str = "error";

/// Element ids of one wizard instance on the page.
#[derive(Debug, Clone, Copy)]
pub struct WizardSpec {
    pub name: &'static str,
    pub form_id: &'static str,
    pub progress_fill_id: &'static str,
    pub success_id: &'static str,
    pub success_date_id: Option<&'static str>,
}

pub const FOUNDER: WizardSpec = WizardSpec {
    name: "founder",
    form_id: "startupForm",
    progress_fill_id: "progressFill",
    success_id: "formSuccess",
    success_date_id: Some("successDate"),
};

pub const INVESTOR: WizardSpec = WizardSpec {
    name: "investor",
    form_id: "investorForm",
    progress_fill_id: "investorProgressFill",
    success_id: "investorSuccess",
    success_date_id: None,
};

pub struct DomWizardSurface {
    form: HtmlElement,
    /// Step panels ordered by their `data-step`.
    steps: Vec<HtmlElement>,
    scope: Element,
    fill: Option<HtmlElement>,
    success: Option<HtmlElement>,
    success_date: Option<Element>,
    confetti: Confetti,
}

impl DomWizardSurface {
    fn new(spec: &WizardSpec, form: HtmlElement, confetti: Confetti) -> Self {
        let mut steps: Vec<(usize, HtmlElement)> = dom::query_all_in(&form, STEP_SELECTOR)
            .into_iter()
            .filter_map(|el| Some((dom::data_step(&el)?, dom::as_html(&el)?)))
            .collect();
        steps.sort_by_key(|(n, _)| *n);
        let scope = form.parent_element().unwrap_or_else(|| (*form).clone());
        Self {
            steps: steps.into_iter().map(|(_, el)| el).collect(),
            scope,
            fill: dom::html_by_id(spec.progress_fill_id),
            success: dom::html_by_id(spec.success_id),
            success_date: spec.success_date_id.and_then(dom::by_id),
            form,
            confetti,
        }
    }

    fn required_controls(&self, step: usize) -> Vec<Element> {
        self.steps
            .get(step.wrapping_sub(1))
            .map(|panel| dom::query_all_in(panel, REQUIRED_SELECTOR))
            .unwrap_or_default()
    }

    fn read_field(control: &Element) -> RequiredField {
        if let Some(input) = control.dyn_ref::<HtmlInputElement>() {
            match input.type_().as_str() {
                "radio" => {
                    return RequiredField::Choice {
                        group: input.name(),
                        checked: input.checked(),
                    }
                }
                "checkbox" => {
                    return RequiredField::Value {
                        filled: input.checked(),
                    }
                }
                _ => {}
            }
        }
        // select and textarea expose `value` too
        let value = js_sys::Reflect::get(control, &"value".into())
            .ok()
            .and_then(|v| v.as_string())
            .unwrap_or_default();
        RequiredField::Value {
            filled: !value.trim().is_empty(),
        }
    }
}

impl WizardSurface for DomWizardSurface {
    fn step_count(&self) -> usize {
        self.steps.len()
    }

    fn required_fields(&self, step: usize) -> Vec<RequiredField> {
        self.required_controls(step)
            .iter()
            .map(Self::read_field)
            .collect()
    }

    fn flag_fields(&self, step: usize, invalid: &[usize]) {
        for (i, control) in self.required_controls(step).iter().enumerate() {
            dom::set_class(control, ERROR_CLASS, invalid.contains(&i));
        }
    }

    fn show_step(&self, step: usize) {
        for (i, panel) in self.steps.iter().enumerate() {
            dom::set_class(panel, "active", i + 1 == step);
        }
    }

    fn set_progress(&self, percent: f64) {
        if let Some(fill) = &self.fill {
            dom::set_style(fill, "width", &format!("{:.2}%", percent));
        }
    }

    fn mark_step(&self, step: usize, mark: StepMark) {
        for indicator in dom::query_all_in(&self.scope, INDICATOR_SELECTOR) {
            if dom::data_step(&indicator) != Some(step) {
                continue;
            }
            dom::set_class(&indicator, "completed", mark == StepMark::Completed);
            dom::set_class(&indicator, "active", mark == StepMark::Active);
        }
    }

    fn finish(&self, date: &str) {
        dom::set_style(&self.form, "display", "none");
        for progress in dom::query_all_in(&self.scope, PROGRESS_SELECTOR) {
            if let Some(progress) = dom::as_html(&progress) {
                dom::set_style(&progress, "display", "none");
            }
        }
        if let Some(date_el) = &self.success_date {
            date_el.set_text_content(Some(date));
        }
        match &self.success {
            Some(success) => {
                dom::set_style(success, "display", "block");
                dom::set_class(success, "active", true);
            }
            None => log::warn!("Wizard finished but has no success panel"),
        }
    }

    fn celebrate(&self) {
        self.confetti.burst();
    }
}

fn clear_error(form: &Element, target: &Element) {
    if let Some(input) = target.dyn_ref::<HtmlInputElement>() {
        if input.type_() == "radio" {
            let selector = format!("input[type=\"radio\"][name=\"{}\"]", input.name());
            for radio in dom::query_all_in(form, &selector) {
                dom::set_class(&radio, ERROR_CLASS, false);
            }
            return;
        }
    }
    dom::set_class(target, ERROR_CLASS, false);
}

pub fn install(
    spec: &WizardSpec,
    config: &WizardConfig,
    selection: Option<SelectionReader>,
    confetti: &Confetti,
) -> Result<(), UiError> {
    let Some(form) = dom::html_by_id(spec.form_id) else {
        log::debug!("No #{}, skipping {} wizard", spec.form_id, spec.name);
        return Ok(());
    };
    let surface = DomWizardSurface::new(spec, form.clone(), confetti.clone());
    let Some(wizard) = Wizard::new(spec.name, surface, selection, config.fallback_date.clone())
    else {
        log::warn!("#{} has no step panels", spec.form_id);
        return Ok(());
    };
    let wizard = Rc::new(RefCell::new(wizard));
    log::debug!("{} wizard wired with {} steps", spec.name, wizard.borrow().state().total());

    {
        let wizard = Rc::clone(&wizard);
        EventListener::new_with_options(
            &form,
            "click",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok())
                else {
                    return;
                };
                if target.closest(NEXT_SELECTOR).ok().flatten().is_some() {
                    event.prevent_default();
                    wizard.borrow_mut().next();
                } else if target.closest(PREV_SELECTOR).ok().flatten().is_some() {
                    event.prevent_default();
                    wizard.borrow_mut().prev();
                }
            },
        )
        .forget();
    }

    {
        let wizard = Rc::clone(&wizard);
        let name = spec.name;
        EventListener::new_with_options(
            &form,
            "submit",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                event.prevent_default();
                let mut wizard = wizard.borrow_mut();
                if wizard.is_finished() {
                    log::debug!("{} wizard already submitted", name);
                } else if wizard.state().is_last() {
                    wizard.submit();
                } else {
                    wizard.next();
                }
            },
        )
        .forget();
    }

    for kind in ["input", "change"] {
        let scope: Element = (*form).clone();
        EventListener::new(&form, kind, move |event| {
            if let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) {
                clear_error(&scope, &target);
            }
        })
        .forget();
    }
    Ok(())
}
