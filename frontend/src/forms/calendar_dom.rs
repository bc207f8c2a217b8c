use std::cell::RefCell;
use std::rc::Rc;

use chrono::Datelike;
use gloo_events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlInputElement};

use crate::config::CalendarConfig;
use crate::error::UiError;
use crate::forms::calendar::{CalendarDay, CalendarPicker, CalendarSurface, SelectionReader, SelectionState};
use crate::utils::dom;

const CALENDAR_ID: &str = "calendar";
const SLOTS_ID: &str = "timeSlots";
const DATE_INPUT_ID: &str = "selectedDate";
const TIME_INPUT_ID: &str = "selectedTime";
const DAY_SELECTOR: &str = ".calendar-day[data-index]";
const SLOT_SELECTOR: &str = ".time-slot[data-index]";
const SELECTED_CLASS: &str = "selected";

pub struct DomCalendarSurface {
    calendar: Element,
    slots: Option<Element>,
    date_input: Option<HtmlInputElement>,
    time_input: Option<HtmlInputElement>,
}

impl DomCalendarSurface {
    fn cell(class: &str, text: &str, index: Option<usize>) -> Result<Element, UiError> {
        let cell = dom::create_element("div", class)?;
        cell.set_text_content(Some(text));
        if let Some(index) = index {
            cell.set_attribute("data-index", &index.to_string())?;
        }
        Ok(cell.into())
    }

    fn append_all(parent: &Element, cells: Vec<Result<Element, UiError>>) {
        for cell in cells {
            if let Err(e) = cell.and_then(|c| parent.append_child(&c).map_err(UiError::from)) {
                log::warn!("Failed to render calendar cell: {}", e);
            }
        }
    }

    fn mark(container: &Element, selector: &str, index: Option<usize>) {
        for cell in dom::query_all_in(container, selector) {
            let cell_index = cell
                .get_attribute("data-index")
                .and_then(|raw| raw.parse::<usize>().ok());
            dom::set_class(&cell, SELECTED_CLASS, index.is_some() && cell_index == index);
        }
    }

    fn write_input(input: &Option<HtmlInputElement>, value: Option<&str>) {
        let Some(input) = input else {
            return;
        };
        input.set_value(value.unwrap_or_default());
        match Event::new("change") {
            Ok(event) => {
                if let Err(e) = input.dispatch_event(&event) {
                    log::warn!("Failed to dispatch change on #{}: {:?}", input.id(), e);
                }
            }
            Err(e) => log::warn!("Failed to create change event: {:?}", e),
        }
    }
}

impl CalendarSurface for DomCalendarSurface {
    fn render_grid(&self, weekdays: &[String], blanks: usize, days: &[CalendarDay]) {
        self.calendar.set_inner_html("");
        let cells = weekdays
            .iter()
            .map(|name| Self::cell("calendar-header", name, None))
            .chain((0..blanks).map(|_| Self::cell("calendar-day empty", "", None)))
            .chain(days.iter().enumerate().map(|(i, day)| -> Result<Element, UiError> {
                let cell = Self::cell("calendar-day", &day.date.day().to_string(), Some(i))?;
                cell.set_attribute("title", &day.label)?;
                Ok(cell)
            }))
            .collect();
        Self::append_all(&self.calendar, cells);
    }

    fn mark_day(&self, index: Option<usize>) {
        Self::mark(&self.calendar, DAY_SELECTOR, index);
    }

    fn render_slots(&self, slots: &[String]) {
        let Some(container) = &self.slots else {
            return;
        };
        container.set_inner_html("");
        let cells = slots
            .iter()
            .enumerate()
            .map(|(i, slot)| Self::cell("time-slot", slot, Some(i)))
            .collect();
        Self::append_all(container, cells);
    }

    fn mark_slot(&self, index: Option<usize>) {
        if let Some(container) = &self.slots {
            Self::mark(container, SLOT_SELECTOR, index);
        }
    }

    fn write_selection(&self, selection: &SelectionState) {
        Self::write_input(&self.date_input, selection.date.as_deref());
        Self::write_input(&self.time_input, selection.time.as_deref());
    }
}

fn clicked_index(event: &Event, selector: &str) -> Option<usize> {
    event
        .target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .and_then(|el| el.closest(selector).ok().flatten())
        .and_then(|cell| cell.get_attribute("data-index"))
        .and_then(|raw| raw.parse().ok())
}

fn input_by_id(id: &str) -> Option<HtmlInputElement> {
    dom::by_id(id).and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
}

/// Renders the date window and returns a reader for the wizards, or `None`
/// when the page has no calendar.
pub fn install(config: &CalendarConfig) -> Result<Option<SelectionReader>, UiError> {
    let Some(calendar) = dom::by_id(CALENDAR_ID) else {
        log::debug!("No #{}, skipping date picker", CALENDAR_ID);
        return Ok(None);
    };
    let slots = dom::by_id(SLOTS_ID);
    let surface = DomCalendarSurface {
        calendar: calendar.clone(),
        slots: slots.clone(),
        date_input: input_by_id(DATE_INPUT_ID),
        time_input: input_by_id(TIME_INPUT_ID),
    };
    let today = chrono::Local::now().date_naive();
    let picker = Rc::new(RefCell::new(CalendarPicker::new(surface, today, config)));
    let reader = picker.borrow().reader();

    {
        let picker = Rc::clone(&picker);
        EventListener::new(&calendar, "click", move |event| {
            if let Some(index) = clicked_index(event, DAY_SELECTOR) {
                picker.borrow_mut().select_day(index);
            }
        })
        .forget();
    }
    if let Some(slots) = slots {
        EventListener::new(&slots, "click", move |event| {
            if let Some(index) = clicked_index(event, SLOT_SELECTOR) {
                picker.borrow_mut().select_slot(index);
            }
        })
        .forget();
    }
    log::debug!("Date picker rendered from {}", today);
    Ok(Some(reader))
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use chrono::NaiveDate;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn selected(container: &Element, selector: &str) -> Vec<String> {
        dom::query_all_in(container, &format!("{}.{}", selector, SELECTED_CLASS))
            .iter()
            .filter_map(|cell| cell.get_attribute("data-index"))
            .collect()
    }

    fn input() -> HtmlInputElement {
        dom::create_element("input", "").unwrap().dyn_into().unwrap()
    }

    #[wasm_bindgen_test]
    fn exactly_one_day_and_one_slot_carry_the_marker() {
        let calendar: Element = dom::create_element("div", "").unwrap().into();
        let slots: Element = dom::create_element("div", "").unwrap().into();
        let date_input = input();
        let time_input = input();
        let surface = DomCalendarSurface {
            calendar: calendar.clone(),
            slots: Some(slots.clone()),
            date_input: Some(date_input.clone()),
            time_input: Some(time_input.clone()),
        };
        let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let mut picker = CalendarPicker::new(surface, today, &CalendarConfig::default());

        assert_eq!(dom::query_all_in(&calendar, ".calendar-header").len(), 7);
        assert_eq!(dom::query_all_in(&calendar, ".calendar-day.empty").len(), 2);
        assert_eq!(dom::query_all_in(&calendar, DAY_SELECTOR).len(), 28);

        for day in [0, 3, 7] {
            assert!(picker.select_day(day));
            for slot in [2, 0, 3] {
                assert!(picker.select_slot(slot));
                assert_eq!(selected(&calendar, DAY_SELECTOR), vec![day.to_string()]);
                assert_eq!(selected(&slots, SLOT_SELECTOR), vec![slot.to_string()]);
            }
        }
        assert_eq!(date_input.value(), "Tue Jan 9");
        assert_eq!(time_input.value(), "16:30");

        assert!(picker.select_day(1));
        assert_eq!(selected(&calendar, DAY_SELECTOR), vec!["1".to_string()]);
        assert!(selected(&slots, SLOT_SELECTOR).is_empty());
        assert_eq!(date_input.value(), "Wed Jan 3");
        assert_eq!(time_input.value(), "");
    }
}
