use std::collections::HashSet;

use crate::forms::calendar::SelectionReader;

/// A required control inside a step, as seen at validation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequiredField {
    /// Text-like input, select, textarea or checkbox.
    Value { filled: bool },
    /// One radio button of the named group.
    Choice { group: String, checked: bool },
}

/// Positions (within `fields`) of the controls that block the step.
///
/// A radio group is satisfied when any one of its buttons is checked; every
/// button of an unsatisfied group is reported.
pub fn invalid_fields(fields: &[RequiredField]) -> Vec<usize> {
    let satisfied: HashSet<&str> = fields
        .iter()
        .filter_map(|field| match field {
            RequiredField::Choice {
                group,
                checked: true,
            } => Some(group.as_str()),
            _ => None,
        })
        .collect();
    fields
        .iter()
        .enumerate()
        .filter(|(_, field)| match field {
            RequiredField::Value { filled } => !filled,
            RequiredField::Choice { group, .. } => !satisfied.contains(group.as_str()),
        })
        .map(|(i, _)| i)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMark {
    Completed,
    Active,
    Upcoming,
}

/// Current step of one wizard. Steps are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardState {
    current: usize,
    total: usize,
}

impl WizardState {
    pub fn new(total: usize) -> Option<Self> {
        if total == 0 {
            return None;
        }
        Some(Self { current: 1, total })
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_last(&self) -> bool {
        self.current == self.total
    }

    pub fn advance(&mut self) -> bool {
        if self.current >= self.total {
            return false;
        }
        self.current += 1;
        true
    }

    pub fn retreat(&mut self) -> bool {
        if self.current <= 1 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// `(current - 1) / (total - 1) * 100`; a single-step wizard sits at 0.
    pub fn progress_percent(&self) -> f64 {
        if self.total <= 1 {
            return 0.0;
        }
        (self.current - 1) as f64 / (self.total - 1) as f64 * 100.0
    }

    pub fn mark(&self, step: usize) -> StepMark {
        if step < self.current {
            StepMark::Completed
        } else if step == self.current {
            StepMark::Active
        } else {
            StepMark::Upcoming
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Moved { from: usize, to: usize },
    /// Validation failed; positions as returned by [`invalid_fields`].
    Blocked { invalid: Vec<usize> },
    /// Boundary reached, or the wizard already finished.
    Refused,
    Submitted,
}

/// Everything the wizard needs from the page.
pub trait WizardSurface {
    fn step_count(&self) -> usize;
    fn required_fields(&self, step: usize) -> Vec<RequiredField>;
    /// Flags exactly the given fields of `step` as invalid.
    fn flag_fields(&self, step: usize, invalid: &[usize]);
    fn show_step(&self, step: usize);
    fn set_progress(&self, percent: f64);
    fn mark_step(&self, step: usize, mark: StepMark);
    /// Hides the form and its progress, shows the success panel.
    fn finish(&self, date: &str);
    fn celebrate(&self);
}

pub struct Wizard<S: WizardSurface> {
    name: &'static str,
    state: WizardState,
    surface: S,
    selection: Option<SelectionReader>,
    fallback_date: String,
    finished: bool,
}

impl<S: WizardSurface> Wizard<S> {
    /// `None` when the form has no step panels.
    pub fn new(
        name: &'static str,
        surface: S,
        selection: Option<SelectionReader>,
        fallback_date: impl Into<String>,
    ) -> Option<Self> {
        let state = WizardState::new(surface.step_count())?;
        let wizard = Self {
            name,
            state,
            surface,
            selection,
            fallback_date: fallback_date.into(),
            finished: false,
        };
        wizard.render();
        Some(wizard)
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn next(&mut self) -> Transition {
        if self.finished || self.state.is_last() {
            return Transition::Refused;
        }
        if let Some(blocked) = self.validate_current() {
            return blocked;
        }
        let from = self.state.current();
        self.state.advance();
        self.render();
        log::debug!("{} wizard: step {} -> {}", self.name, from, self.state.current());
        Transition::Moved {
            from,
            to: self.state.current(),
        }
    }

    pub fn prev(&mut self) -> Transition {
        if self.finished {
            return Transition::Refused;
        }
        let from = self.state.current();
        if !self.state.retreat() {
            return Transition::Refused;
        }
        self.render();
        Transition::Moved {
            from,
            to: self.state.current(),
        }
    }

    /// Only accepted from the last step, once it validates.
    pub fn submit(&mut self) -> Transition {
        if self.finished || !self.state.is_last() {
            return Transition::Refused;
        }
        if let Some(blocked) = self.validate_current() {
            return blocked;
        }
        self.finished = true;
        let date = self
            .selection
            .as_ref()
            .and_then(|s| s.date())
            .unwrap_or_else(|| self.fallback_date.clone());
        self.surface.finish(&date);
        self.surface.celebrate();
        log::info!("{} wizard submitted", self.name);
        Transition::Submitted
    }

    fn validate_current(&self) -> Option<Transition> {
        let step = self.state.current();
        let invalid = invalid_fields(&self.surface.required_fields(step));
        self.surface.flag_fields(step, &invalid);
        if invalid.is_empty() {
            None
        } else {
            log::debug!("{} wizard: step {} has {} empty fields", self.name, step, invalid.len());
            Some(Transition::Blocked { invalid })
        }
    }

    fn render(&self) {
        self.surface.show_step(self.state.current());
        self.surface.set_progress(self.state.progress_percent());
        for step in 1..=self.state.total() {
            self.surface.mark_step(step, self.state.mark(step));
        }
    }
}
