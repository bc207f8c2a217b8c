use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_events::EventListener;

use crate::config::MotionConfig;
use crate::utils::dom;

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";
const FINE_POINTER_QUERY: &str = "(pointer: fine)";

/// What the current device and user preferences allow us to animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotionPolicy {
    pub reduce_motion: bool,
    pub is_mobile: bool,
    pub has_touch: bool,
    pub fine_pointer: bool,
}

/// Raw platform readings. `None` means the platform did not answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct MotionSignals {
    pub reduce_motion: Option<bool>,
    pub fine_pointer: Option<bool>,
    pub viewport_width: f64,
    pub max_touch_points: i32,
}

impl MotionPolicy {
    pub fn from_signals(signals: MotionSignals, mobile_breakpoint: f64) -> Self {
        let has_touch = signals.max_touch_points > 0;
        Self {
            reduce_motion: signals.reduce_motion.unwrap_or(false),
            is_mobile: signals.viewport_width > 0.0 && signals.viewport_width <= mobile_breakpoint,
            has_touch,
            fine_pointer: signals.fine_pointer.unwrap_or(!has_touch),
        }
    }

    /// Particles, confetti and ripples.
    pub fn allows_decoration(&self) -> bool {
        !self.reduce_motion
    }

    pub fn allows_glow(&self) -> bool {
        self.fine_pointer && !self.is_mobile && !self.reduce_motion
    }
}

type Subscriber = Box<dyn Fn(MotionPolicy)>;

/// Holds the live [`MotionPolicy`] and tells subscribers when the
/// reduced-motion preference flips.
pub struct MotionGate {
    policy: Cell<MotionPolicy>,
    subscribers: RefCell<Vec<Subscriber>>,
}

impl MotionGate {
    pub fn new(policy: MotionPolicy) -> Rc<Self> {
        Rc::new(Self {
            policy: Cell::new(policy),
            subscribers: RefCell::new(Vec::new()),
        })
    }

    /// Reads the platform signals and starts following reduced-motion changes.
    pub fn detect(config: &MotionConfig) -> Rc<Self> {
        let reduce_query = dom::window().and_then(|w| w.match_media(REDUCED_MOTION_QUERY).ok().flatten());
        let fine_pointer = dom::window()
            .and_then(|w| w.match_media(FINE_POINTER_QUERY).ok().flatten())
            .map(|q| q.matches());
        let signals = MotionSignals {
            reduce_motion: reduce_query.as_ref().map(|q| q.matches()),
            fine_pointer,
            viewport_width: dom::viewport_width(),
            max_touch_points: dom::window()
                .map(|w| w.navigator().max_touch_points())
                .unwrap_or(0),
        };
        let policy = MotionPolicy::from_signals(signals, config.mobile_breakpoint);
        log::debug!(
            "Motion policy: reduce_motion={} mobile={} touch={} fine_pointer={}",
            policy.reduce_motion,
            policy.is_mobile,
            policy.has_touch,
            policy.fine_pointer
        );

        let gate = Self::new(policy);
        if let Some(query) = reduce_query {
            let watching = Rc::clone(&gate);
            let watched = query.clone();
            EventListener::new(&query, "change", move |_| {
                watching.set_reduce_motion(watched.matches());
            })
            .forget();
        }
        gate
    }

    pub fn policy(&self) -> MotionPolicy {
        self.policy.get()
    }

    pub fn subscribe(&self, subscriber: impl Fn(MotionPolicy) + 'static) {
        self.subscribers.borrow_mut().push(Box::new(subscriber));
    }

    pub fn set_reduce_motion(&self, reduce: bool) {
        let mut policy = self.policy.get();
        if policy.reduce_motion == reduce {
            return;
        }
        policy.reduce_motion = reduce;
        self.policy.set(policy);
        log::info!("Reduced motion is now {}", if reduce { "on" } else { "off" });
        for subscriber in self.subscribers.borrow().iter() {
            subscriber(policy);
        }
    }
}
