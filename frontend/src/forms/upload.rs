use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, Element, FileList, HtmlInputElement};

use crate::error::UiError;
use crate::utils::dom;

const ZONE_ID: &str = "fileUpload";
const INPUT_ID: &str = "pitchDeck";
const LABEL_ID: &str = "fileName";
const DRAGOVER_CLASS: &str = "dragover";

/// Label shown for the chosen files; `placeholder` when nothing is chosen.
pub fn label_text(names: &[String], placeholder: &str) -> String {
    match names {
        [] => placeholder.to_string(),
        [only] => only.clone(),
        [first, rest @ ..] => format!("{} (+{} more)", first, rest.len()),
    }
}

fn file_names(files: Option<FileList>) -> Vec<String> {
    let Some(files) = files else {
        return Vec::new();
    };
    (0..files.length())
        .filter_map(|i| files.get(i))
        .map(|file| file.name())
        .collect()
}

struct UploadWidget {
    zone: Element,
    input: HtmlInputElement,
    label: Option<Element>,
    placeholder: String,
}

impl UploadWidget {
    fn refresh_label(&self) {
        let names = file_names(self.input.files());
        if let Some(label) = &self.label {
            label.set_text_content(Some(&label_text(&names, &self.placeholder)));
        }
        dom::set_class(&self.zone, "has-file", !names.is_empty());
    }

    fn set_dragging(&self, dragging: bool) {
        dom::set_class(&self.zone, DRAGOVER_CLASS, dragging);
    }
}

pub fn install() -> Result<(), UiError> {
    let (Some(zone), Some(input)) = (
        dom::by_id(ZONE_ID),
        dom::by_id(INPUT_ID).and_then(|el| el.dyn_into::<HtmlInputElement>().ok()),
    ) else {
        log::debug!("No upload widget on page");
        return Ok(());
    };
    let label = dom::by_id(LABEL_ID);
    let placeholder = label
        .as_ref()
        .and_then(|l| l.text_content())
        .unwrap_or_default();
    let widget = Rc::new(UploadWidget {
        zone,
        input,
        label,
        placeholder,
    });

    {
        let widget = Rc::clone(&widget);
        EventListener::new(&widget.input.clone(), "change", move |_| widget.refresh_label()).forget();
    }
    for kind in ["dragenter", "dragover"] {
        let widget = Rc::clone(&widget);
        EventListener::new_with_options(
            &widget.zone.clone(),
            kind,
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                event.prevent_default();
                widget.set_dragging(true);
            },
        )
        .forget();
    }
    {
        let widget = Rc::clone(&widget);
        EventListener::new(&widget.zone.clone(), "dragleave", move |_| widget.set_dragging(false))
            .forget();
    }
    {
        let zone = widget.zone.clone();
        EventListener::new_with_options(
            &zone,
            "drop",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                event.prevent_default();
                widget.set_dragging(false);
                let files = event
                    .dyn_ref::<DragEvent>()
                    .and_then(|e| e.data_transfer())
                    .and_then(|dt| dt.files());
                if let Some(files) = files {
                    widget.input.set_files(Some(&files));
                }
                widget.refresh_label();
            },
        )
        .forget();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_restores_placeholder() {
        assert_eq!(label_text(&[], "No file chosen"), "No file chosen");
    }

    #[test]
    fn single_file_shows_its_name() {
        assert_eq!(label_text(&["deck.pdf".to_string()], "x"), "deck.pdf");
    }

    #[test]
    fn extra_files_are_counted() {
        let names = vec!["deck.pdf".to_string(), "a.png".to_string(), "b.png".to_string()];
        assert_eq!(label_text(&names, "x"), "deck.pdf (+2 more)");
    }
}
