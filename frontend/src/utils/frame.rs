use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_render::{request_animation_frame, AnimationFrame};

/// Guard that lets at most one frame request be pending at a time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InFlight {
    pending: bool,
}

impl InFlight {
    /// Returns `true` if the caller now owns the pending slot.
    pub fn try_begin(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    pub fn finish(&mut self) {
        self.pending = false;
    }
}

struct ThrottleInner {
    gate: RefCell<InFlight>,
    handle: RefCell<Option<AnimationFrame>>,
    job: Box<dyn Fn()>,
}

/// Collapses any number of `schedule` calls within one frame into a single run of `job`.
#[derive(Clone)]
pub struct FrameThrottle {
    inner: Rc<ThrottleInner>,
}

impl FrameThrottle {
    pub fn new(job: impl Fn() + 'static) -> Self {
        Self {
            inner: Rc::new(ThrottleInner {
                gate: RefCell::new(InFlight::default()),
                handle: RefCell::new(None),
                job: Box::new(job),
            }),
        }
    }

    pub fn schedule(&self) {
        if !self.inner.gate.borrow_mut().try_begin() {
            return;
        }
        let inner = Rc::clone(&self.inner);
        let handle = request_animation_frame(move |_| {
            inner.handle.borrow_mut().take();
            inner.gate.borrow_mut().finish();
            (inner.job)();
        });
        *self.inner.handle.borrow_mut() = Some(handle);
    }

    /// Runs the job synchronously, outside the frame gate.
    pub fn run_now(&self) {
        (self.inner.job)();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

struct LoopInner {
    running: Cell<bool>,
    handle: RefCell<Option<AnimationFrame>>,
    tick: RefCell<Box<dyn FnMut(f64) -> LoopControl>>,
}

impl LoopInner {
    fn request(this: &Rc<Self>) {
        let inner = Rc::clone(this);
        let handle = request_animation_frame(move |timestamp| {
            inner.handle.borrow_mut().take();
            if !inner.running.get() {
                return;
            }
            let control = {
                let mut tick = inner.tick.borrow_mut();
                (*tick)(timestamp)
            };
            // the tick may have cancelled us
            if control == LoopControl::Stop || !inner.running.get() {
                inner.running.set(false);
                return;
            }
            LoopInner::request(&inner);
        });
        *this.handle.borrow_mut() = Some(handle);
    }
}

/// A task re-run on every animation frame until its tick returns
/// [`LoopControl::Stop`] or [`FrameLoop::cancel`] is called.
#[derive(Clone)]
pub struct FrameLoop {
    inner: Rc<LoopInner>,
}

impl FrameLoop {
    pub fn new(tick: impl FnMut(f64) -> LoopControl + 'static) -> Self {
        Self {
            inner: Rc::new(LoopInner {
                running: Cell::new(false),
                handle: RefCell::new(None),
                tick: RefCell::new(Box::new(tick)),
            }),
        }
    }

    pub fn start(&self) {
        if self.inner.running.replace(true) {
            return;
        }
        LoopInner::request(&self.inner);
    }

    /// Safe to call any number of times, running or not.
    pub fn cancel(&self) {
        self.inner.running.set(false);
        // dropping the handle cancels the pending frame
        self.inner.handle.borrow_mut().take();
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_flight_admits_one_pending_request() {
        let mut gate = InFlight::default();
        assert!(gate.try_begin());
        assert!(!gate.try_begin());
        assert!(!gate.try_begin());
        assert_eq!(gate, InFlight { pending: true });
        gate.finish();
        assert_eq!(gate, InFlight::default());
        assert!(gate.try_begin());
    }

    #[test]
    fn burst_of_events_collapses_to_one_request_per_frame() {
        let mut gate = InFlight::default();
        let mut requested = 0;
        for frame in 0..3 {
            for _ in 0..10 {
                if gate.try_begin() {
                    requested += 1;
                }
            }
            assert_eq!(requested, frame + 1);
            gate.finish();
        }
    }

    #[test]
    fn finishing_twice_is_harmless() {
        let mut gate = InFlight::default();
        gate.finish();
        gate.finish();
        assert!(gate.try_begin());
    }
}
