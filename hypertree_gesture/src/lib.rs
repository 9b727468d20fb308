// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hypertree Gesture: turns raw pointer input into view intents.
//!
//! All positions are disk coordinates (the unit disk the tree is drawn in).
//! The state machines here never touch the view themselves; they return
//! events the owner applies to its transformation and layout.
//!
//! - [`GestureState`]: one pointer pans, two pointers pinch; a short,
//!   nearly still press is a click. Mouse wheel steps are discrete zooms.
//! - [`HoverState`]: debounced hover target with a distance-scale gate.
//! - [`ClickFilter`]: swallows the second tap of a double tap on the node
//!   that is already at the center.
//!
//! ```
//! use hypertree_gesture::{GestureConfig, GestureEvent, GestureState};
//! use kurbo::Point;
//!
//! let mut gestures: GestureState<u32> = GestureState::new(GestureConfig::default());
//! gestures.on_down(None, Point::new(0.1, 0.1), 0.1, |_| None);
//! let up = gestures.on_up(None, Point::new(0.101, 0.1));
//! assert!(matches!(up, GestureEvent::Click { .. }));
//! ```

mod gesture;
mod hover;

pub use gesture::{GestureEvent, GesturePhase, GestureState, PointerId};
pub use hover::{ClickFilter, HoverEvent, HoverState};

/// Gesture parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GestureConfig {
    /// Longest pointer path, in disk units, that still counts as a click.
    pub click_epsilon: f64,
    /// Most move samples a click may have.
    pub click_max_moves: u32,
    /// Largest disk radius a pan point may reach.
    pub max_mouse_r: f64,
    /// Smallest λ reachable by pinch or wheel.
    pub lambda_min: f64,
    /// Largest λ reachable by pinch or wheel.
    pub lambda_max: f64,
    /// λ is multiplied or divided by this per wheel step.
    pub wheel_factor: f64,
    /// How long hover survives after the pointer leaves every node.
    pub hover_debounce_ms: u64,
    /// Nodes drawn smaller than this distance scale are not hovered.
    pub hover_min_scale: f64,
    /// Window in which a second tap on the center node is swallowed.
    pub double_tap_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            click_epsilon: 0.006,
            click_max_moves: 2,
            max_mouse_r: hypertree_math::DEFAULT_MAX_MOUSE_R,
            lambda_min: 0.03,
            lambda_max: 0.8,
            wheel_factor: 1.175,
            hover_debounce_ms: 100,
            hover_min_scale: 0.25,
            double_tap_ms: 300,
        }
    }
}

impl GestureConfig {
    /// Clamp λ into `[lambda_min, lambda_max]`.
    pub fn clamp_lambda(&self, lambda: f64) -> f64 {
        if lambda.is_finite() {
            lambda.clamp(self.lambda_min, self.lambda_max)
        } else {
            self.lambda_min
        }
    }
}
