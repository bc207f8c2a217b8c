use std::cell::RefCell;
use std::rc::Rc;

use chrono::{Datelike, Duration, NaiveDate};

use crate::config::CalendarConfig;

/// The picked date and time as display strings. Written only by the
/// calendar picker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub date: Option<String>,
    pub time: Option<String>,
}

/// Read-only view of the calendar's selection, handed to the wizards.
#[derive(Debug, Clone)]
pub struct SelectionReader(Rc<RefCell<SelectionState>>);

impl SelectionReader {
    pub fn date(&self) -> Option<String> {
        self.0.borrow().date.clone()
    }

    #[cfg(test)]
    pub fn time(&self) -> Option<String> {
        self.0.borrow().time.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub label: String,
}

impl CalendarDay {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            label: date.format("%a %b %-d").to_string(),
        }
    }
}

/// `days` consecutive days starting at `today`.
pub fn date_window(today: NaiveDate, days: u32) -> Vec<CalendarDay> {
    (0..days as i64)
        .map(|offset| CalendarDay::new(today + Duration::days(offset)))
        .collect()
}

/// Empty cells needed before `first` in a Sunday-first grid.
pub fn leading_blanks(first: NaiveDate) -> usize {
    first.weekday().num_days_from_sunday() as usize
}

pub trait CalendarSurface {
    fn render_grid(&self, weekdays: &[String], blanks: usize, days: &[CalendarDay]);
    /// Marks exactly the given day as selected, or none.
    fn mark_day(&self, index: Option<usize>);
    fn render_slots(&self, slots: &[String]);
    /// Marks exactly the given slot as selected, or none.
    fn mark_slot(&self, index: Option<usize>);
    fn write_selection(&self, selection: &SelectionState);
}

pub struct CalendarPicker<S: CalendarSurface> {
    surface: S,
    days: Vec<CalendarDay>,
    slots: Vec<String>,
    selected_day: Option<usize>,
    selection: Rc<RefCell<SelectionState>>,
}

impl<S: CalendarSurface> CalendarPicker<S> {
    pub fn new(surface: S, today: NaiveDate, config: &CalendarConfig) -> Self {
        let days = date_window(today, config.days);
        surface.render_grid(&config.weekdays, leading_blanks(today), &days);
        let picker = Self {
            surface,
            days,
            slots: config.time_slots.clone(),
            selected_day: None,
            selection: Rc::new(RefCell::new(SelectionState::default())),
        };
        picker.surface.write_selection(&picker.selection.borrow());
        picker
    }

    pub fn reader(&self) -> SelectionReader {
        SelectionReader(Rc::clone(&self.selection))
    }

    /// Picking a day always drops the previously picked time.
    pub fn select_day(&mut self, index: usize) -> bool {
        let Some(day) = self.days.get(index) else {
            return false;
        };
        self.selected_day = Some(index);
        {
            let mut selection = self.selection.borrow_mut();
            selection.date = Some(day.label.clone());
            selection.time = None;
        }
        self.surface.mark_day(Some(index));
        self.surface.render_slots(&self.slots);
        self.surface.mark_slot(None);
        self.surface.write_selection(&self.selection.borrow());
        log::debug!("Picked day {}", day.label);
        true
    }

    pub fn select_slot(&mut self, index: usize) -> bool {
        if self.selected_day.is_none() {
            return false;
        }
        let Some(slot) = self.slots.get(index) else {
            return false;
        };
        self.selection.borrow_mut().time = Some(slot.clone());
        self.surface.mark_slot(Some(index));
        self.surface.write_selection(&self.selection.borrow());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Mirrors what the DOM would show: which cells carry `selected`.
    #[derive(Default)]
    struct FakeCalendar {
        day_cells: Cell<usize>,
        blanks: Cell<usize>,
        selected_days: RefCell<Vec<usize>>,
        slot_cells: RefCell<Vec<String>>,
        selected_slots: RefCell<Vec<usize>>,
        written: RefCell<SelectionState>,
    }

    impl CalendarSurface for Rc<FakeCalendar> {
        fn render_grid(&self, _weekdays: &[String], blanks: usize, days: &[CalendarDay]) {
            self.blanks.set(blanks);
            self.day_cells.set(days.len());
        }

        fn mark_day(&self, index: Option<usize>) {
            *self.selected_days.borrow_mut() = index.into_iter().collect();
        }

        fn render_slots(&self, slots: &[String]) {
            *self.slot_cells.borrow_mut() = slots.to_vec();
            self.selected_slots.borrow_mut().clear();
        }

        fn mark_slot(&self, index: Option<usize>) {
            *self.selected_slots.borrow_mut() = index.into_iter().collect();
        }

        fn write_selection(&self, selection: &SelectionState) {
            *self.written.borrow_mut() = selection.clone();
        }
    }

    fn jan_2_2024() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    fn picker() -> (CalendarPicker<Rc<FakeCalendar>>, Rc<FakeCalendar>) {
        let fake = Rc::new(FakeCalendar::default());
        let picker = CalendarPicker::new(Rc::clone(&fake), jan_2_2024(), &CalendarConfig::default());
        (picker, fake)
    }

    #[test]
    fn window_covers_28_days_from_today() {
        let days = date_window(jan_2_2024(), 28);
        assert_eq!(days.len(), 28);
        assert_eq!(days[0].label, "Tue Jan 2");
        assert_eq!(days[27].date, NaiveDate::from_ymd_opt(2024, 1, 29).unwrap());
        assert_eq!(leading_blanks(jan_2_2024()), 2);
    }

    #[test]
    fn day_then_slot_fills_selection() {
        let (mut picker, fake) = picker();
        assert_eq!(fake.day_cells.get(), 28);
        assert_eq!(fake.blanks.get(), 2);

        assert!(picker.select_day(0));
        assert_eq!(picker.reader().time(), None);
        let fourteen = fake.slot_cells.borrow().iter().position(|s| s == "14:00").unwrap();
        assert!(picker.select_slot(fourteen));

        let reader = picker.reader();
        assert_eq!(reader.date().as_deref(), Some("Tue Jan 2"));
        assert_eq!(reader.time().as_deref(), Some("14:00"));
        assert_eq!(fake.written.borrow().time.as_deref(), Some("14:00"));
    }

    #[test]
    fn new_day_clears_time() {
        let (mut picker, fake) = picker();
        picker.select_day(0);
        picker.select_slot(1);
        picker.select_day(3);

        let reader = picker.reader();
        assert_eq!(reader.date().as_deref(), Some("Fri Jan 5"));
        assert_eq!(reader.time(), None);
        assert!(fake.selected_slots.borrow().is_empty());
        assert_eq!(fake.written.borrow().time, None);
    }

    #[test]
    fn at_most_one_day_and_one_slot_selected() {
        let (mut picker, fake) = picker();
        for day in [4, 9, 2] {
            picker.select_day(day);
            for slot in 0..4 {
                picker.select_slot(slot);
                assert_eq!(fake.selected_days.borrow().len(), 1);
                assert_eq!(fake.selected_slots.borrow().len(), 1);
            }
        }
        assert_eq!(*fake.selected_days.borrow(), vec![2]);
        assert_eq!(*fake.selected_slots.borrow(), vec![3]);
    }

    #[test]
    fn slot_needs_a_day_and_indices_must_exist() {
        let (mut picker, _fake) = picker();
        assert!(!picker.select_slot(0));
        assert!(!picker.select_day(28));
        picker.select_day(0);
        assert!(!picker.select_slot(4));
        assert_eq!(picker.reader().time(), None);
    }
}
