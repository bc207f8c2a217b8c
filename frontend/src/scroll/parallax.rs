use std::cell::Cell;
use std::rc::Rc;

use gloo_events::EventListener;
use web_sys::{Element, HtmlElement};

use crate::config::ParallaxConfig;
use crate::error::UiError;
use crate::motion::policy::MotionGate;
use crate::utils::dom;
use crate::utils::frame::FrameThrottle;

const TRACK_ID: &str = "dealFlowTrack";
const CARD_SELECTOR: &str = ".startup-card";

/// How far the section has travelled through the viewport, or `None`
/// while it does not intersect it vertically.
pub fn scroll_progress(section_top: f64, section_height: f64, viewport_height: f64) -> Option<f64> {
    if section_top >= viewport_height || section_top + section_height <= 0.0 {
        return None;
    }
    let travel = viewport_height + section_height;
    if travel <= 0.0 {
        return None;
    }
    Some(((viewport_height - section_top) / travel).clamp(0.0, 1.0))
}

pub fn max_offset(scroll_width: f64, visible_width: f64) -> f64 {
    (scroll_width - visible_width).max(0.0)
}

pub fn track_offset(progress: f64, max_offset: f64, damping: f64) -> f64 {
    progress * max_offset * damping
}

pub fn in_view(card_left: f64, card_right: f64, view_left: f64, view_right: f64) -> bool {
    card_right > view_left && card_left < view_right
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardLook {
    pub scale: f64,
    pub opacity: f64,
}

impl CardLook {
    /// Full size and opacity at the center, shrinking and fading towards
    /// the edges down to the configured floors.
    pub fn at_distance(card_center: f64, view_center: f64, half_width: f64, config: &ParallaxConfig) -> Self {
        let distance = if half_width > 0.0 {
            ((card_center - view_center).abs() / half_width).min(1.0)
        } else {
            0.0
        };
        Self {
            scale: (1.0 - distance * (1.0 - config.min_scale)).max(config.min_scale),
            opacity: (1.0 - distance * (1.0 - config.min_opacity)).max(config.min_opacity),
        }
    }
}

struct ParallaxTrack {
    track: HtmlElement,
    viewport: Element,
    section: Element,
    cards: Vec<HtmlElement>,
    max_offset: Cell<f64>,
    config: ParallaxConfig,
    gate: Rc<MotionGate>,
}

impl ParallaxTrack {
    fn measure(&self) {
        let offset = max_offset(
            self.track.scroll_width() as f64,
            self.viewport.client_width() as f64,
        );
        self.max_offset.set(offset);
    }

    fn reset(&self) {
        dom::set_style(&self.track, "transform", "none");
        for card in &self.cards {
            dom::set_style(card, "transform", "none");
            dom::set_style(card, "opacity", "1");
        }
    }

    fn update(&self) {
        if self.gate.policy().reduce_motion {
            self.reset();
            return;
        }
        let section = self.section.get_bounding_client_rect();
        let Some(progress) =
            scroll_progress(section.top(), section.height(), dom::viewport_height())
        else {
            return;
        };
        let offset = track_offset(progress, self.max_offset.get(), self.config.damping);
        dom::set_style(&self.track, "transform", &format!("translateX({:.2}px)", -offset));

        let view = self.viewport.get_bounding_client_rect();
        let half_width = view.width() / 2.0;
        let view_center = view.left() + half_width;
        for card in &self.cards {
            let rect = card.get_bounding_client_rect();
            if !in_view(rect.left(), rect.right(), view.left(), view.right()) {
                continue;
            }
            let look = CardLook::at_distance(
                rect.left() + rect.width() / 2.0,
                view_center,
                half_width,
                &self.config,
            );
            dom::set_style(card, "transform", &format!("scale({:.3})", look.scale));
            dom::set_style(card, "opacity", &format!("{:.3}", look.opacity));
        }
    }
}

pub fn install(gate: &Rc<MotionGate>, config: &ParallaxConfig) -> Result<(), UiError> {
    let Some(track) = dom::html_by_id(TRACK_ID) else {
        log::debug!("No #{}, skipping parallax track", TRACK_ID);
        return Ok(());
    };
    let viewport = track
        .parent_element()
        .ok_or_else(|| UiError::MissingElement(format!("#{} parent", TRACK_ID)))?;
    let section = track
        .closest("section")
        .ok()
        .flatten()
        .unwrap_or_else(|| viewport.clone());
    let cards = dom::query_all_in(&track, CARD_SELECTOR)
        .iter()
        .filter_map(dom::as_html)
        .collect();
    let window = dom::window().ok_or_else(|| UiError::MissingElement("window".into()))?;

    let parallax = Rc::new(ParallaxTrack {
        track,
        viewport,
        section,
        cards,
        max_offset: Cell::new(0.0),
        config: config.clone(),
        gate: Rc::clone(gate),
    });
    parallax.measure();

    let on_scroll = {
        let parallax = Rc::clone(&parallax);
        FrameThrottle::new(move || parallax.update())
    };
    let on_resize = {
        let parallax = Rc::clone(&parallax);
        FrameThrottle::new(move || {
            parallax.measure();
            parallax.update();
        })
    };
    on_scroll.run_now();

    {
        let on_scroll = on_scroll.clone();
        EventListener::new(&window, "scroll", move |_| on_scroll.schedule()).forget();
    }
    EventListener::new(&window, "resize", move |_| on_resize.schedule()).forget();
    gate.subscribe(move |_| on_scroll.schedule());
    log::debug!("Parallax track wired, max offset {:.0}px", parallax.max_offset.get());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_runs_from_entry_to_exit() {
        // section just entering from below
        assert_eq!(scroll_progress(800.0, 600.0, 800.0), None);
        assert_eq!(scroll_progress(799.0, 600.0, 800.0).map(|p| p < 0.01), Some(true));
        // halfway through its travel
        assert_eq!(scroll_progress(100.0, 600.0, 800.0), Some(0.5));
        // leaving above
        assert_eq!(scroll_progress(-600.0, 600.0, 800.0), None);
        assert!(scroll_progress(-599.0, 600.0, 800.0).unwrap() > 0.99);
    }

    #[test]
    fn max_offset_never_negative() {
        assert_eq!(max_offset(2400.0, 1200.0), 1200.0);
        assert_eq!(max_offset(800.0, 1200.0), 0.0);
    }

    #[test]
    fn offset_is_damped() {
        assert_eq!(track_offset(0.5, 1000.0, 0.8), 400.0);
        assert_eq!(track_offset(1.0, 0.0, 0.8), 0.0);
    }

    #[test]
    fn centered_card_is_full_size() {
        let look = CardLook::at_distance(600.0, 600.0, 600.0, &ParallaxConfig::default());
        assert_eq!(look.scale, 1.0);
        assert_eq!(look.opacity, 1.0);
    }

    #[test]
    fn edge_cards_hit_the_floors() {
        let config = ParallaxConfig::default();
        let edge = CardLook::at_distance(1200.0, 600.0, 600.0, &config);
        assert!((edge.scale - 0.85).abs() < 1e-9);
        assert!((edge.opacity - 0.5).abs() < 1e-9);
        let beyond = CardLook::at_distance(5000.0, 600.0, 600.0, &config);
        assert!(beyond.scale >= 0.85);
        assert!(beyond.opacity >= 0.5);
    }

    #[test]
    fn cards_outside_the_viewport_are_skipped() {
        assert!(in_view(100.0, 400.0, 0.0, 1200.0));
        assert!(in_view(-100.0, 10.0, 0.0, 1200.0));
        assert!(!in_view(1200.0, 1500.0, 0.0, 1200.0));
        assert!(!in_view(-300.0, 0.0, 0.0, 1200.0));
    }
}
