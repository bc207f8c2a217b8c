use std::cell::Cell;
use std::rc::Rc;

use web_sys::Element;

use crate::config::CounterConfig;
use crate::error::UiError;
use crate::motion::policy::MotionGate;
use crate::utils::frame::{FrameLoop, LoopControl};
use crate::utils::{dom, observer};

const CONTAINER_ID: &str = "stats";
const CONTAINER_SELECTOR: &str = ".stats";
const NUMBER_SELECTOR: &str = ".stat-number[data-target]";

/// A numeric target read from `data-target`, with optional affixes.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterTarget {
    pub target: f64,
    pub prefix: String,
    pub suffix: String,
}

impl CounterTarget {
    /// `None` for anything that is not a finite number.
    pub fn parse(raw: &str, prefix: Option<String>, suffix: Option<String>) -> Option<Self> {
        let target: f64 = raw.trim().parse().ok()?;
        if !target.is_finite() {
            return None;
        }
        Some(Self {
            target,
            prefix: prefix.unwrap_or_default(),
            suffix: suffix.unwrap_or_default(),
        })
    }

    pub fn is_whole(&self) -> bool {
        self.target.fract() == 0.0
    }

    /// Displayed value once `fraction` of the duration has elapsed.
    pub fn value_at(&self, fraction: f64) -> f64 {
        if fraction >= 1.0 {
            return self.target;
        }
        self.target * ease_out_cubic(fraction.max(0.0))
    }

    pub fn render(&self, value: f64) -> String {
        let number = if self.is_whole() {
            format!("{}", value.floor() as i64)
        } else {
            format!("{:.1}", value)
        };
        format!("{}{}{}", self.prefix, number, self.suffix)
    }
}

pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

pub fn elapsed_fraction(start_ms: f64, now_ms: f64, duration_ms: f64) -> f64 {
    if duration_ms <= 0.0 {
        return 1.0;
    }
    ((now_ms - start_ms) / duration_ms).clamp(0.0, 1.0)
}

fn read_targets(container: &Element) -> Vec<(Element, CounterTarget)> {
    dom::query_all_in(container, NUMBER_SELECTOR)
        .into_iter()
        .filter_map(|el| {
            let raw = el.get_attribute("data-target")?;
            match CounterTarget::parse(
                &raw,
                el.get_attribute("data-prefix"),
                el.get_attribute("data-suffix"),
            ) {
                Some(target) => Some((el, target)),
                None => {
                    log::warn!("Skipping counter with non-numeric target {:?}", raw);
                    None
                }
            }
        })
        .collect()
}

fn animate(container: &Element, duration_ms: f64, reduce_motion: bool) {
    let counters = read_targets(container);
    if counters.is_empty() {
        return;
    }
    if reduce_motion {
        for (el, target) in &counters {
            el.set_text_content(Some(&target.render(target.target)));
        }
        return;
    }
    let start = Rc::new(Cell::new(None::<f64>));
    FrameLoop::new(move |now| {
        let started = match start.get() {
            Some(t) => t,
            None => {
                start.set(Some(now));
                now
            }
        };
        let fraction = elapsed_fraction(started, now, duration_ms);
        for (el, target) in &counters {
            el.set_text_content(Some(&target.render(target.value_at(fraction))));
        }
        if fraction >= 1.0 {
            LoopControl::Stop
        } else {
            LoopControl::Continue
        }
    })
    .start();
}

pub fn install(gate: &Rc<MotionGate>, config: &CounterConfig) -> Result<(), UiError> {
    let mut containers = dom::query_all(CONTAINER_SELECTOR);
    if let Some(by_id) = dom::by_id(CONTAINER_ID) {
        if !containers.contains(&by_id) {
            containers.push(by_id);
        }
    }
    if containers.is_empty() {
        log::debug!("No stats container, skipping counters");
        return Ok(());
    }
    let duration_ms = config.duration_ms;
    let gate = Rc::clone(gate);
    observer::observe_once(containers, config.threshold, "0px", move |container| {
        animate(container, duration_ms, gate.policy().reduce_motion);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(raw: &str) -> CounterTarget {
        CounterTarget::parse(raw, None, None).unwrap()
    }

    #[test]
    fn non_numeric_targets_are_rejected() {
        assert!(CounterTarget::parse("abc", None, None).is_none());
        assert!(CounterTarget::parse("", None, None).is_none());
        assert!(CounterTarget::parse("NaN", None, None).is_none());
        assert!(CounterTarget::parse("inf", None, None).is_none());
    }

    #[test]
    fn final_value_is_exact_target() {
        let whole = target("250");
        assert_eq!(whole.value_at(1.0), 250.0);
        assert_eq!(whole.render(whole.value_at(1.0)), "250");

        let fractional = target("4.76");
        assert_eq!(fractional.render(fractional.value_at(1.0)), "4.8");

        let one_decimal = target("3.2");
        assert_eq!(one_decimal.render(one_decimal.value_at(1.5)), "3.2");
    }

    #[test]
    fn whole_targets_render_without_decimals_midway() {
        let whole = target("100");
        let midway = whole.render(whole.value_at(0.5));
        assert!(!midway.contains('.'));
        let fractional = target("9.5");
        let midway = fractional.render(fractional.value_at(0.5));
        assert_eq!(midway.split('.').nth(1).map(str::len), Some(1));
    }

    #[test]
    fn value_never_decreases() {
        let t = target("1000");
        let mut last = 0.0;
        for step in 0..=60 {
            let value = t.value_at(step as f64 / 60.0);
            assert!(value >= last);
            last = value;
        }
        assert_eq!(last, 1000.0);
    }

    #[test]
    fn fraction_follows_elapsed_time_not_ticks() {
        assert_eq!(elapsed_fraction(1000.0, 1000.0, 1200.0), 0.0);
        assert_eq!(elapsed_fraction(1000.0, 1600.0, 1200.0), 0.5);
        assert_eq!(elapsed_fraction(1000.0, 9000.0, 1200.0), 1.0);
        assert_eq!(elapsed_fraction(0.0, 10.0, 0.0), 1.0);
    }

    #[test]
    fn affixes_wrap_the_number() {
        let t = CounterTarget::parse("98", Some("$".into()), Some("%".into())).unwrap();
        assert_eq!(t.render(98.0), "$98%");
    }
}
