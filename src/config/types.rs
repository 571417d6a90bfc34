use std::fmt;

use serde::Deserialize;

use crate::animation::SpringParams;
use crate::model::{Geometry, Size};

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub notch: NotchConfig,
    #[serde(default)]
    pub panel: PanelConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
}

/// Assumed physical cutout and the margins derived from it
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct NotchConfig {
    /// Width of the hardware notch in points
    #[serde(default = "default_notch_width")]
    pub width: f64,
    /// Height of the hardware notch in points
    #[serde(default = "default_notch_height")]
    pub height: f64,
    /// How far the closed shape sits inside the notch, and how far the
    /// opened panel is inflated when deciding whether a drag left it
    #[serde(default = "default_inset")]
    pub inset: f64,
    /// Extra width/height of the invisible drop detector
    #[serde(default = "default_drop_range")]
    pub drop_range: f64,
}

impl Default for NotchConfig {
    fn default() -> Self {
        Self {
            width: default_notch_width(),
            height: default_notch_height(),
            inset: default_inset(),
            drop_range: default_drop_range(),
        }
    }
}

/// The expanded panel shown when the overlay is open
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PanelConfig {
    #[serde(default = "default_panel_width")]
    pub width: f64,
    #[serde(default = "default_panel_height")]
    pub height: f64,
    /// Heading drawn at the top left of the panel
    #[serde(default = "default_title")]
    pub title: String,
    /// Time format string (chrono format)
    #[serde(default = "default_clock_format")]
    pub clock_format: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            width: default_panel_width(),
            height: default_panel_height(),
            title: default_title(),
            clock_format: default_clock_format(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AnimationConfig {
    /// Approximate settle time of the spring in seconds
    #[serde(default = "default_response")]
    pub response: f64,
    /// 1.0 is critically damped, lower values overshoot
    #[serde(default = "default_damping_fraction")]
    pub damping_fraction: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            response: default_response(),
            damping_fraction: default_damping_fraction(),
        }
    }
}

fn default_notch_width() -> f64 {
    160.0
}

fn default_notch_height() -> f64 {
    30.0
}

fn default_inset() -> f64 {
    4.0
}

fn default_drop_range() -> f64 {
    32.0
}

fn default_panel_width() -> f64 {
    500.0
}

fn default_panel_height() -> f64 {
    120.0
}

fn default_title() -> String {
    "TopNotch".to_string()
}

fn default_clock_format() -> String {
    "%H:%M".to_string()
}

fn default_response() -> f64 {
    0.5
}

fn default_damping_fraction() -> f64 {
    0.85
}

/// A problem found while validating a loaded config.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub is_error: bool,
    pub message: String,
}

impl ConfigIssue {
    fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            is_error: false,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = if self.is_error { "error" } else { "warning" };
        write!(f, "{}: {}", level, self.message)
    }
}

impl Config {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let positive = [
            ("notch.width", self.notch.width),
            ("notch.height", self.notch.height),
            ("panel.width", self.panel.width),
            ("panel.height", self.panel.height),
            ("animation.response", self.animation.response),
        ];
        for (key, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                issues.push(ConfigIssue::error(format!(
                    "{} must be a positive number, got {}",
                    key, value
                )));
            }
        }

        let non_negative = [
            ("notch.inset", self.notch.inset),
            ("notch.drop_range", self.notch.drop_range),
        ];
        for (key, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                issues.push(ConfigIssue::error(format!(
                    "{} must not be negative, got {}",
                    key, value
                )));
            }
        }

        let damping = self.animation.damping_fraction;
        if !(damping > 0.0 && damping <= 1.0) {
            issues.push(ConfigIssue::error(format!(
                "animation.damping_fraction must be in (0, 1], got {}",
                damping
            )));
        }

        if self.panel.width < self.notch.width || self.panel.height < self.notch.height {
            issues.push(ConfigIssue::warning(
                "panel is smaller than the notch; the open state will look collapsed",
            ));
        }

        if self.notch.inset * 2.0 >= self.notch.width.min(self.notch.height) {
            issues.push(ConfigIssue::warning(
                "notch.inset swallows the closed shape entirely",
            ));
        }

        if self.panel.clock_format.trim().is_empty() {
            issues.push(ConfigIssue::warning("panel.clock_format is empty"));
        }

        issues
    }

    pub fn geometry(&self) -> Geometry {
        Geometry {
            notch_size: Size::new(self.notch.width, self.notch.height),
            opened_size: Size::new(self.panel.width, self.panel.height),
            inset: self.notch.inset,
            drop_range: self.notch.drop_range,
        }
    }

    pub fn spring(&self) -> SpringParams {
        SpringParams {
            response: self.animation.response,
            damping_fraction: self.animation.damping_fraction,
        }
    }
}
