// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transitions and the single-slot scheduler.

use core::fmt::Debug;

use hypertree_math::{Complex, sigmoid};

/// Maps linear progress in `[0, 1]` to eased progress.
pub type Easing = fn(f64) -> f64;

/// Identifier of a started transition.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TransitionId(pub u64);

/// What a transition interpolates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TweenTarget {
    /// The pan point `P` of the transformation.
    Pan {
        /// Start value.
        from: Complex,
        /// End value.
        to: Complex,
    },
    /// The layout scale λ.
    Lambda {
        /// Start value.
        from: f64,
        /// End value.
        to: f64,
    },
}

/// One interpolated value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TweenValue {
    /// A pan point.
    Pan(Complex),
    /// A λ value.
    Lambda(f64),
}

impl TweenTarget {
    /// The value at eased progress `t`; `t == 1` gives exactly the end value.
    pub fn value_at(&self, t: f64) -> TweenValue {
        match *self {
            Self::Pan { to, .. } if t >= 1.0 => TweenValue::Pan(to),
            Self::Pan { from, to } => TweenValue::Pan(from.lerp(to, t)),
            Self::Lambda { to, .. } if t >= 1.0 => TweenValue::Lambda(to),
            Self::Lambda { from, to } => TweenValue::Lambda(from + (to - from) * t),
        }
    }
}

/// A timed interpolation.
#[derive(Clone, Debug)]
pub struct Transition {
    /// Identifier.
    pub id: TransitionId,
    /// Duration in milliseconds.
    pub duration_ms: u64,
    /// What is interpolated.
    pub target: TweenTarget,
    /// Easing curve, [`sigmoid`] by default.
    pub easing: Easing,
    /// Timestamp of the first tick.
    pub start: Option<u64>,
}

impl Transition {
    /// Create a transition with the default easing.
    pub fn new(id: TransitionId, duration_ms: u64, target: TweenTarget) -> Self {
        Self {
            id,
            duration_ms,
            target,
            easing: sigmoid,
            start: None,
        }
    }

    /// Replace the easing curve.
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Linear progress in `[0, 1]` at `now`, latching the start time.
    pub fn progress(&mut self, now: u64) -> f64 {
        let start = *self.start.get_or_insert(now);
        if self.duration_ms == 0 {
            return 1.0;
        }
        #[allow(clippy::cast_precision_loss, reason = "frame timestamps fit in f64")]
        let p = now.saturating_sub(start) as f64 / self.duration_ms as f64;
        p.clamp(0.0, 1.0)
    }

    /// The eased value at linear progress `p`.
    pub fn value_at(&self, p: f64) -> TweenValue {
        let eased = if p >= 1.0 { 1.0 } else { (self.easing)(p) };
        self.target.value_at(eased)
    }
}

/// How a transition ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// It ran to its end value.
    Finished,
    /// It was stopped before the end (a gesture or a new load took over).
    Cancelled,
}

/// What the host should do after a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameResult {
    /// Nothing is animating; no frame needed.
    Idle,
    /// Apply `value` and request another frame.
    Running {
        /// The transition that produced the value.
        id: TransitionId,
        /// Interpolated value.
        value: TweenValue,
        /// Linear progress in `[0, 1)`.
        progress: f64,
    },
    /// Apply the final `value`; the transition is over.
    Finished {
        /// The transition that ended.
        id: TransitionId,
        /// End value.
        value: TweenValue,
    },
}

/// A frame clock driven by the host.
pub trait Scheduler {
    /// Advance to `now` (milliseconds).
    fn tick(&mut self, now: u64) -> FrameResult;

    /// Whether a transition is running.
    fn is_busy(&self) -> bool;

    /// Stop the running transition. Returns whether one was running.
    fn cancel(&mut self) -> bool;
}

type Continuation = Box<dyn FnOnce(TransitionOutcome)>;

struct Running {
    transition: Transition,
    on_done: Option<Continuation>,
}

impl Debug for Running {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Running")
            .field("transition", &self.transition)
            .field("on_done", &self.on_done.is_some())
            .finish()
    }
}

impl Running {
    fn resolve(mut self, outcome: TransitionOutcome) {
        if let Some(done) = self.on_done.take() {
            done(outcome);
        }
    }
}

/// Owner of at most one running [`Transition`].
#[derive(Debug, Default)]
pub struct TransitionSlot {
    running: Option<Running>,
    next_id: u64,
}

impl TransitionSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a transition with the default easing.
    ///
    /// Returns `None`, and drops `on_done` uncalled, if one is already
    /// running.
    pub fn start(
        &mut self,
        duration_ms: u64,
        target: TweenTarget,
        on_done: impl FnOnce(TransitionOutcome) + 'static,
    ) -> Option<TransitionId> {
        let id = TransitionId(self.next_id);
        self.start_transition(Transition::new(id, duration_ms, target), on_done)
    }

    /// Start a prepared transition; its id is replaced by a fresh one.
    pub fn start_transition(
        &mut self,
        mut transition: Transition,
        on_done: impl FnOnce(TransitionOutcome) + 'static,
    ) -> Option<TransitionId> {
        if self.running.is_some() {
            log::debug!("transition already running; start ignored");
            return None;
        }
        let id = TransitionId(self.next_id);
        self.next_id += 1;
        transition.id = id;
        transition.start = None;
        log::debug!("transition {} started ({} ms)", id.0, transition.duration_ms);
        self.running = Some(Running {
            transition,
            on_done: Some(Box::new(on_done)),
        });
        Some(id)
    }

    /// The running transition.
    pub fn current(&self) -> Option<&Transition> {
        self.running.as_ref().map(|r| &r.transition)
    }
}

impl Scheduler for TransitionSlot {
    fn tick(&mut self, now: u64) -> FrameResult {
        let Some(running) = &mut self.running else {
            return FrameResult::Idle;
        };
        let transition = &mut running.transition;
        let progress = transition.progress(now);
        let value = transition.value_at(progress);
        let id = transition.id;
        if progress < 1.0 {
            return FrameResult::Running {
                id,
                value,
                progress,
            };
        }
        if let Some(done) = self.running.take() {
            log::debug!("transition {} finished", id.0);
            done.resolve(TransitionOutcome::Finished);
        }
        FrameResult::Finished { id, value }
    }

    fn is_busy(&self) -> bool {
        self.running.is_some()
    }

    fn cancel(&mut self) -> bool {
        let Some(running) = self.running.take() else {
            return false;
        };
        log::debug!("transition {} cancelled", running.transition.id.0);
        running.resolve(TransitionOutcome::Cancelled);
        true
    }
}
