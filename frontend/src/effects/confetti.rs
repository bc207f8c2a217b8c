use std::rc::Rc;

use gloo_timers::callback::Timeout;
use rand::Rng;

use crate::config::ConfettiConfig;
use crate::error::UiError;
use crate::motion::policy::{MotionGate, MotionPolicy};
use crate::utils::dom;

const PIECE_SELECTOR: &str = ".confetti";

#[derive(Debug, Clone, PartialEq)]
pub struct ConfettiPiece {
    pub left_pct: f64,
    pub color: String,
    pub fall_s: f64,
    pub delay_s: f64,
    pub rotation_deg: f64,
}

/// Empty under reduced motion or with an empty palette.
pub fn pieces(
    count: usize,
    palette: &[String],
    policy: &MotionPolicy,
    rng: &mut impl Rng,
) -> Vec<ConfettiPiece> {
    if !policy.allows_decoration() || palette.is_empty() {
        return Vec::new();
    }
    (0..count)
        .map(|_| ConfettiPiece {
            left_pct: rng.gen_range(0.0..100.0),
            color: palette[rng.gen_range(0..palette.len())].clone(),
            fall_s: rng.gen_range(2.0..4.0),
            delay_s: rng.gen_range(0.0..0.5),
            rotation_deg: rng.gen_range(0.0..360.0),
        })
        .collect()
}

#[derive(Clone)]
pub struct Confetti {
    gate: Rc<MotionGate>,
    config: ConfettiConfig,
}

impl Confetti {
    /// Creates the page's confetti source; pieces still falling are cleared
    /// as soon as reduced motion turns on.
    pub fn install(gate: &Rc<MotionGate>, config: &ConfettiConfig) -> Self {
        gate.subscribe(|policy| {
            if !policy.allows_decoration() {
                for piece in dom::query_all(PIECE_SELECTOR) {
                    piece.remove();
                }
            }
        });
        Self {
            gate: Rc::clone(gate),
            config: config.clone(),
        }
    }

    pub fn burst(&self) {
        if let Err(e) = self.try_burst() {
            log::warn!("Confetti burst failed: {}", e);
        }
    }

    fn try_burst(&self) -> Result<(), UiError> {
        let pieces = pieces(
            self.config.count,
            &self.config.palette,
            &self.gate.policy(),
            &mut rand::thread_rng(),
        );
        if pieces.is_empty() {
            return Ok(());
        }
        let body = dom::document()
            .and_then(|doc| doc.body())
            .ok_or_else(|| UiError::MissingElement("body".into()))?;
        for piece in &pieces {
            let el = dom::create_element("div", "confetti")?;
            el.set_attribute(
                "style",
                &format!(
                    "left:{:.1}%;background:{};animation-duration:{:.2}s;\
                     animation-delay:{:.2}s;transform:rotate({:.0}deg)",
                    piece.left_pct, piece.color, piece.fall_s, piece.delay_s, piece.rotation_deg
                ),
            )?;
            body.append_child(&el)?;
            Timeout::new(self.config.lifetime_ms, move || el.remove()).forget();
        }
        log::debug!("Confetti burst of {}", pieces.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn burst_uses_palette_colors() {
        let config = ConfettiConfig::default();
        let mut rng = StdRng::seed_from_u64(42);
        let burst = pieces(config.count, &config.palette, &MotionPolicy::default(), &mut rng);
        assert_eq!(burst.len(), 50);
        for piece in &burst {
            assert!(config.palette.contains(&piece.color));
            assert!((0.0..100.0).contains(&piece.left_pct));
            assert!((2.0..4.0).contains(&piece.fall_s));
        }
    }

    #[test]
    fn reduced_motion_produces_zero_pieces() {
        let config = ConfettiConfig::default();
        let policy = MotionPolicy {
            reduce_motion: true,
            ..MotionPolicy::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert!(pieces(config.count, &config.palette, &policy, &mut rng).is_empty());
    }

    #[test]
    fn empty_palette_produces_zero_pieces() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(pieces(10, &[], &MotionPolicy::default(), &mut rng).is_empty());
    }
}
