use serde::Deserialize;

use crate::error::UiError;
use crate::utils::dom;

/// Id of the optional inline JSON block that overrides the defaults below.
pub const CONFIG_ELEMENT_ID: &str = "landing-config";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LandingConfig {
    pub log_level: String,
    pub motion: MotionConfig,
    pub particles: ParticleConfig,
    pub glow: GlowConfig,
    pub navbar: NavbarConfig,
    pub reveal: RevealConfig,
    pub counters: CounterConfig,
    pub ripple: RippleConfig,
    pub confetti: ConfettiConfig,
    pub parallax: ParallaxConfig,
    pub calendar: CalendarConfig,
    pub wizard: WizardConfig,
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            motion: MotionConfig::default(),
            particles: ParticleConfig::default(),
            glow: GlowConfig::default(),
            navbar: NavbarConfig::default(),
            reveal: RevealConfig::default(),
            counters: CounterConfig::default(),
            ripple: RippleConfig::default(),
            confetti: ConfettiConfig::default(),
            parallax: ParallaxConfig::default(),
            calendar: CalendarConfig::default(),
            wizard: WizardConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Viewports at or below this width are treated as mobile.
    pub mobile_breakpoint: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self { mobile_breakpoint: 768.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub count: usize,
    pub mobile_count: usize,
    /// Fallback delay when the platform has no idle callback.
    pub idle_fallback_ms: u32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 30,
            mobile_count: 12,
            idle_fallback_ms: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GlowConfig {
    pub smoothing: f64,
}

impl Default for GlowConfig {
    fn default() -> Self {
        Self { smoothing: 0.08 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NavbarConfig {
    pub scroll_threshold: f64,
}

impl Default for NavbarConfig {
    fn default() -> Self {
        Self {
            scroll_threshold: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub threshold: f64,
    pub root_margin: String,
    pub selectors: Vec<String>,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: "0px 0px -50px 0px".to_string(),
            selectors: vec![
                ".stats-grid".to_string(),
                ".section-header".to_string(),
                ".feature-card".to_string(),
                ".timeline-item".to_string(),
                ".step-card".to_string(),
                ".testimonial-card".to_string(),
                ".stat-item".to_string(),
                ".faq-item".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub threshold: f64,
    pub duration_ms: f64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            duration_ms: 1200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RippleConfig {
    pub lifetime_ms: u32,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self { lifetime_ms: 600 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfettiConfig {
    pub count: usize,
    pub lifetime_ms: u32,
    pub palette: Vec<String>,
}

impl Default for ConfettiConfig {
    fn default() -> Self {
        Self {
            count: 50,
            lifetime_ms: 4000,
            palette: vec![
                "#6366f1".to_string(),
                "#8b5cf6".to_string(),
                "#ec4899".to_string(),
                "#f59e0b".to_string(),
                "#10b981".to_string(),
                "#3b82f6".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParallaxConfig {
    pub damping: f64,
    pub min_scale: f64,
    pub min_opacity: f64,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            damping: 0.8,
            min_scale: 0.85,
            min_opacity: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub days: u32,
    pub time_slots: Vec<String>,
    pub weekdays: Vec<String>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            days: 28,
            time_slots: ["10:00", "11:30", "14:00", "16:30"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            weekdays: ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Shown on the success panel when no date was picked.
    pub fallback_date: String,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            fallback_date: "your selected date".to_string(),
        }
    }
}

impl LandingConfig {
    pub fn from_json(raw: &str) -> Result<Self, UiError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }
}

/// Reads the inline config block. A page without one gets the defaults;
/// a malformed block is an error so the caller can report it once logging is up.
pub fn load() -> Result<LandingConfig, UiError> {
    let raw = dom::document()
        .and_then(|doc| doc.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|el| el.text_content());
    match raw {
        Some(raw) if !raw.trim().is_empty() => LandingConfig::from_json(&raw),
        _ => Ok(LandingConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = LandingConfig::default();
        assert_eq!(config.navbar.scroll_threshold, 50.0);
        assert_eq!(config.counters.duration_ms, 1200.0);
        assert_eq!(config.ripple.lifetime_ms, 600);
        assert_eq!(config.calendar.days, 28);
        assert_eq!(config.calendar.time_slots.len(), 4);
        assert_eq!(config.parallax.min_scale, 0.85);
    }

    #[test]
    fn default_reveal_targets_cover_stats_and_timeline() {
        let selectors = RevealConfig::default().selectors;
        for expected in [".stats-grid", ".section-header", ".feature-card", ".timeline-item"] {
            assert!(
                selectors.iter().any(|s| s == expected),
                "missing {}: {:?}",
                expected,
                selectors
            );
        }
    }

    #[test]
    fn partial_json_overrides_only_given_keys() {
        let config =
            LandingConfig::from_json(r#"{"navbar": {"scroll_threshold": 80}, "log_level": "debug"}"#)
                .unwrap();
        assert_eq!(config.navbar.scroll_threshold, 80.0);
        assert_eq!(config.log_level(), log::Level::Debug);
        assert_eq!(config.glow, GlowConfig::default());
        assert_eq!(config.reveal, RevealConfig::default());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = LandingConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, UiError::Config(_)));
    }

    #[test]
    fn unknown_log_level_falls_back_to_info() {
        let config = LandingConfig {
            log_level: "chatty".to_string(),
            ..LandingConfig::default()
        };
        assert_eq!(config.log_level(), log::Level::Info);
    }
}
