//! Spring interpolation of the rendered notch shape.
//!
//! The view never animates on its own: every model notification hands the
//! animator a new [`ShapeFrame`] target and the event loop calls
//! [`ShapeAnimator::step`] once per frame until it settles. Retargeting while
//! in flight keeps the current position and velocity, so rapid toggles bend
//! the motion instead of restarting it.

use std::f64::consts::PI;

use crate::model::{OverlayModel, OverlayState};

/// Largest integration step; longer frames are split into several steps.
const MAX_STEP: f64 = 1.0 / 120.0;
/// Frames longer than this (e.g. after the machine slept) are clamped.
const MAX_FRAME: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringParams {
    /// Seconds for one undamped oscillation; roughly the settle time
    pub response: f64,
    /// 1.0 is critically damped
    pub damping_fraction: f64,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            response: 0.5,
            damping_fraction: 0.85,
        }
    }
}

impl SpringParams {
    fn stiffness(&self) -> f64 {
        let omega = 2.0 * PI / self.response.max(0.01);
        omega * omega
    }

    fn damping(&self) -> f64 {
        4.0 * PI * self.damping_fraction / self.response.max(0.01)
    }
}

/// Everything about the shape that animates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShapeFrame {
    pub width: f64,
    pub height: f64,
    /// Radius of the two bottom corners
    pub corner_radius: f64,
    pub opacity: f64,
    /// Alpha of the panel content, 0 when closed
    pub content_alpha: f64,
}

impl ShapeFrame {
    /// The frame the model's current state should settle on.
    pub fn target_for(model: &OverlayModel) -> Self {
        let size = model.current_size();
        Self {
            width: size.width,
            height: size.height,
            corner_radius: model.corner_radius(),
            opacity: model.opacity(),
            content_alpha: if model.state() == OverlayState::Opened {
                1.0
            } else {
                0.0
            },
        }
    }

    fn channels(&self) -> [f64; 5] {
        [
            self.width,
            self.height,
            self.corner_radius,
            self.opacity,
            self.content_alpha,
        ]
    }

    fn from_channels(c: [f64; 5]) -> Self {
        Self {
            width: c[0].max(0.0),
            height: c[1].max(0.0),
            corner_radius: c[2].max(0.0),
            opacity: c[3].clamp(0.0, 1.0),
            content_alpha: c[4].clamp(0.0, 1.0),
        }
    }
}

/// Per-channel settle thresholds: points for geometry, fractions for alpha.
const EPSILON: [f64; 5] = [0.25, 0.25, 0.1, 0.005, 0.005];

#[derive(Debug, Clone)]
pub struct ShapeAnimator {
    params: SpringParams,
    position: [f64; 5],
    velocity: [f64; 5],
    target: [f64; 5],
    animating: bool,
}

impl ShapeAnimator {
    /// Starts at rest on `initial`.
    pub fn new(params: SpringParams, initial: ShapeFrame) -> Self {
        Self {
            params,
            position: initial.channels(),
            velocity: [0.0; 5],
            target: initial.channels(),
            animating: false,
        }
    }

    pub fn set_params(&mut self, params: SpringParams) {
        self.params = params;
    }

    pub fn retarget(&mut self, target: ShapeFrame) {
        let target = target.channels();
        if target == self.target {
            return;
        }
        self.target = target;
        self.animating = true;
    }

    pub fn current(&self) -> ShapeFrame {
        ShapeFrame::from_channels(self.position)
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Advances the spring by `dt` seconds. Returns true if the frame moved.
    pub fn step(&mut self, dt: f64) -> bool {
        if !self.animating {
            return false;
        }

        let k = self.params.stiffness();
        let c = self.params.damping();
        let mut remaining = dt.clamp(0.0, MAX_FRAME);

        while remaining > 0.0 {
            let h = remaining.min(MAX_STEP);
            remaining -= h;
            for i in 0..5 {
                let displacement = self.position[i] - self.target[i];
                let accel = -k * displacement - c * self.velocity[i];
                self.velocity[i] += accel * h;
                self.position[i] += self.velocity[i] * h;
            }
        }

        let settled = (0..5).all(|i| {
            (self.position[i] - self.target[i]).abs() < EPSILON[i]
                && self.velocity[i].abs() < EPSILON[i] * 10.0
        });
        if settled {
            self.position = self.target;
            self.velocity = [0.0; 5];
            self.animating = false;
        }

        true
    }
}
