use std::rc::Rc;

use rand::Rng;
use web_sys::HtmlElement;

use crate::config::ParticleConfig;
use crate::error::UiError;
use crate::motion::policy::{MotionGate, MotionPolicy};
use crate::utils::{dom, idle};

pub const CONTAINER_ID: &str = "particles";

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSpec {
    pub left_pct: f64,
    pub top_pct: f64,
    pub size_px: f64,
    pub delay_s: f64,
    pub duration_s: f64,
}

impl ParticleSpec {
    fn random(rng: &mut impl Rng) -> Self {
        Self {
            left_pct: rng.gen_range(0.0..100.0),
            top_pct: rng.gen_range(0.0..100.0),
            size_px: rng.gen_range(20.0..100.0),
            delay_s: rng.gen_range(0.0..20.0),
            duration_s: rng.gen_range(15.0..25.0),
        }
    }

    fn style(&self) -> String {
        format!(
            "left:{:.2}%;top:{:.2}%;width:{size:.1}px;height:{size:.1}px;\
             animation-delay:{:.2}s;animation-duration:{:.2}s",
            self.left_pct,
            self.top_pct,
            self.delay_s,
            self.duration_s,
            size = self.size_px,
        )
    }
}

pub fn particle_count(policy: &MotionPolicy, config: &ParticleConfig) -> usize {
    if !policy.allows_decoration() {
        0
    } else if policy.is_mobile {
        config.mobile_count
    } else {
        config.count
    }
}

pub fn generate(count: usize, rng: &mut impl Rng) -> Vec<ParticleSpec> {
    (0..count).map(|_| ParticleSpec::random(rng)).collect()
}

struct ParticleField {
    container: HtmlElement,
    config: ParticleConfig,
}

impl ParticleField {
    fn populate(&self, policy: &MotionPolicy) -> Result<(), UiError> {
        self.clear();
        let specs = generate(particle_count(policy, &self.config), &mut rand::thread_rng());
        for spec in &specs {
            let particle = dom::create_element("div", "particle")?;
            particle.set_attribute("style", &spec.style())?;
            self.container.append_child(&particle)?;
        }
        log::debug!("Spawned {} particles", specs.len());
        Ok(())
    }

    fn clear(&self) {
        self.container.set_inner_html("");
    }

    fn sync(&self, policy: &MotionPolicy) {
        if policy.allows_decoration() {
            if let Err(e) = self.populate(policy) {
                log::warn!("Failed to populate particles: {}", e);
            }
        } else {
            self.clear();
        }
    }
}

pub fn install(gate: &Rc<MotionGate>, config: &ParticleConfig) -> Result<(), UiError> {
    let Some(container) = dom::html_by_id(CONTAINER_ID) else {
        log::debug!("No #{}, skipping particle field", CONTAINER_ID);
        return Ok(());
    };
    let field = Rc::new(ParticleField {
        container,
        config: config.clone(),
    });

    let policy = gate.policy();
    if policy.allows_decoration() {
        let field = Rc::clone(&field);
        let gate = Rc::clone(gate);
        idle::when_idle(config.idle_fallback_ms, move || field.sync(&gate.policy()));
    } else {
        field.clear();
    }

    gate.subscribe(move |policy| field.sync(&policy));
    Ok(())
}
