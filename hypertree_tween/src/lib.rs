// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hypertree Tween: transitions of the view state driven by a host clock.
//!
//! Nothing here reads a clock or schedules frames. The host calls
//! [`Scheduler::tick`] with its own timestamp (a browser animation frame, a
//! game loop, a test) and applies the [`FrameResult`] it gets back. A
//! [`Transition`] stores only its duration, easing and interpolation
//! target; its start time is latched on its first tick.
//!
//! [`TransitionSlot`] holds at most one transition. Starting another while
//! one runs is a no-op, and cancelling reports
//! [`TransitionOutcome::Cancelled`] to the running transition's
//! continuation.
//!
//! ```
//! use hypertree_tween::{FrameResult, Scheduler, TransitionSlot, TweenTarget, TweenValue};
//!
//! let mut slot = TransitionSlot::new();
//! slot.start(100, TweenTarget::Lambda { from: 0.1, to: 0.3 }, |_| {});
//!
//! assert!(matches!(slot.tick(1_000), FrameResult::Running { .. })); // latches start
//! let FrameResult::Finished { value, .. } = slot.tick(1_100) else {
//!     unreachable!()
//! };
//! assert_eq!(value, TweenValue::Lambda(0.3));
//! assert!(!slot.is_busy());
//! ```

mod transition;

pub use transition::{
    Easing, FrameResult, Scheduler, Transition, TransitionId, TransitionOutcome, TransitionSlot,
    TweenTarget, TweenValue,
};

/// Transition durations.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TweenConfig {
    /// Duration of navigation transitions when the caller gives none.
    pub default_duration_ms: u64,
    /// Duration of λ transitions.
    pub lambda_duration_ms: u64,
}

impl Default for TweenConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: 750,
            lambda_duration_ms: 250,
        }
    }
}
