// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pan, pinch, click and wheel recognition.

use core::num::NonZeroU64;
use std::collections::BTreeMap;

use hypertree_math::{Complex, max_r};

use crate::GestureConfig;

/// Pointer identifier for tracking concurrent contacts.
pub type PointerId = NonZeroU64;

const DEFAULT_POINTER: PointerId = NonZeroU64::MIN;

/// What the pointers are currently doing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GesturePhase {
    /// No pointer is down.
    #[default]
    Idle,
    /// One pointer pans the view.
    Dragging,
    /// Two pointers zoom and pan the view.
    Pinching,
}

/// An intent produced by [`GestureState`].
#[derive(Clone, Debug, PartialEq)]
pub enum GestureEvent<K> {
    /// A pan started at `point`; snapshot the transformation now.
    PanStart {
        /// Disk point under the pointer.
        point: Complex,
    },
    /// Pan so the point shown at `start` is shown at `current`.
    Pan {
        /// Down point of the pan.
        start: Complex,
        /// Current point, clamped to the max mouse radius.
        current: Complex,
    },
    /// A second pointer went down; the view switches to pinch zoom.
    PinchStart {
        /// Midpoint of the two contacts.
        center: Complex,
        /// Node nearest to the center, kept visually fixed while zooming.
        preserve: Option<K>,
    },
    /// Set λ and keep `preserve` under the moving pinch center.
    Pinch {
        /// New λ, clamped.
        lambda: f64,
        /// Current midpoint of the two contacts.
        center: Complex,
        /// Node nearest to the center at pinch start.
        preserve: Option<K>,
    },
    /// A press that barely moved was released at `point`.
    Click {
        /// Release point.
        point: Complex,
    },
    /// A pan or pinch ended.
    DragEnd,
    /// A wheel step: zoom to `lambda` about `point`.
    Wheel {
        /// New λ, clamped.
        lambda: f64,
        /// Pointer position.
        point: Complex,
    },
    /// Nothing to do.
    None,
}

#[derive(Clone, Debug)]
struct Trace {
    down: Complex,
    last: Complex,
    path_len: f64,
    moves: u32,
    // False once the trace took part in a pinch.
    clickable: bool,
}

impl Trace {
    fn new(point: Complex) -> Self {
        Self {
            down: point,
            last: point,
            path_len: 0.0,
            moves: 0,
            clickable: true,
        }
    }

    fn advance(&mut self, point: Complex) {
        self.path_len += self.last.distance(point);
        self.last = point;
    }
}

#[derive(Clone, Debug)]
struct Pinch<K> {
    pointers: [PointerId; 2],
    ref_distance: f64,
    lambda_at_start: f64,
    preserve: Option<K>,
}

/// Gesture recognition state machine.
///
/// Each pointer is tracked independently by [`PointerId`]; `None` stands
/// for the single mouse pointer. Sequences that make no sense (move or up
/// without a down) are ignored and yield [`GestureEvent::None`].
#[derive(Clone, Debug)]
pub struct GestureState<K> {
    config: GestureConfig,
    traces: BTreeMap<PointerId, Trace>,
    phase: GesturePhase,
    pinch: Option<Pinch<K>>,
}

impl<K: Clone> GestureState<K> {
    /// Create an idle state machine.
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            traces: BTreeMap::new(),
            phase: GesturePhase::Idle,
            pinch: None,
        }
    }

    /// The configuration.
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Current phase.
    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// Number of pointers currently down.
    pub fn active_pointers(&self) -> usize {
        self.traces.len()
    }

    /// Record a pointer down.
    ///
    /// `lambda` is the current λ, the reference for a pinch. `hit` resolves
    /// the node nearest a disk point and is only called when a pinch starts.
    pub fn on_down(
        &mut self,
        pointer: Option<PointerId>,
        point: impl Into<Complex>,
        lambda: f64,
        hit: impl FnOnce(Complex) -> Option<K>,
    ) -> GestureEvent<K> {
        let pointer = pointer.unwrap_or(DEFAULT_POINTER);
        let point = point.into();
        self.traces.insert(pointer, Trace::new(point));
        match self.traces.len() {
            1 => {
                self.phase = GesturePhase::Dragging;
                log::debug!("pan start at {point:?}");
                GestureEvent::PanStart { point }
            }
            2 => {
                let mut ids = self.traces.keys().copied();
                let (Some(a), Some(b)) = (ids.next(), ids.next()) else {
                    return GestureEvent::None;
                };
                for trace in self.traces.values_mut() {
                    trace.clickable = false;
                }
                let (center, distance) = self.span(a, b);
                let preserve = hit(center);
                self.pinch = Some(Pinch {
                    pointers: [a, b],
                    ref_distance: distance,
                    lambda_at_start: lambda,
                    preserve: preserve.clone(),
                });
                self.phase = GesturePhase::Pinching;
                log::debug!("pinch start at {center:?}");
                GestureEvent::PinchStart { center, preserve }
            }
            // Extra contacts are tracked but ignored.
            _ => GestureEvent::None,
        }
    }

    /// Record a pointer move.
    pub fn on_move(
        &mut self,
        pointer: Option<PointerId>,
        point: impl Into<Complex>,
    ) -> GestureEvent<K> {
        let pointer = pointer.unwrap_or(DEFAULT_POINTER);
        let point = point.into();
        let Some(trace) = self.traces.get_mut(&pointer) else {
            return GestureEvent::None;
        };
        trace.advance(point);
        trace.moves = trace.moves.saturating_add(1);
        let start = trace.down;

        match self.phase {
            GesturePhase::Idle => GestureEvent::None,
            GesturePhase::Dragging => GestureEvent::Pan {
                start,
                current: max_r(point, self.config.max_mouse_r),
            },
            GesturePhase::Pinching => {
                let Some(pinch) = &self.pinch else {
                    return GestureEvent::None;
                };
                let [a, b] = pinch.pointers;
                let (center, distance) = self.span(a, b);
                let ratio = if pinch.ref_distance > 0.0 {
                    distance / pinch.ref_distance
                } else {
                    1.0
                };
                GestureEvent::Pinch {
                    lambda: self.config.clamp_lambda(pinch.lambda_at_start * ratio),
                    center,
                    preserve: pinch.preserve.clone(),
                }
            }
        }
    }

    /// Record a pointer up.
    ///
    /// Releasing the last pointer of a pan resolves it as a click when the
    /// path stayed below `click_epsilon` and at most `click_max_moves` move
    /// samples were seen. Releasing one finger of a pinch continues as a
    /// pan with the remaining finger.
    pub fn on_up(
        &mut self,
        pointer: Option<PointerId>,
        point: impl Into<Complex>,
    ) -> GestureEvent<K> {
        let pointer = pointer.unwrap_or(DEFAULT_POINTER);
        let point = point.into();
        let Some(mut trace) = self.traces.remove(&pointer) else {
            return GestureEvent::None;
        };
        trace.advance(point);

        if self.phase == GesturePhase::Pinching {
            return self.end_pinch(pointer);
        }
        if !self.traces.is_empty() {
            return GestureEvent::None;
        }
        self.phase = GesturePhase::Idle;
        if trace.clickable
            && trace.path_len < self.config.click_epsilon
            && trace.moves <= self.config.click_max_moves
        {
            GestureEvent::Click { point }
        } else {
            log::debug!("drag end after {} moves", trace.moves);
            GestureEvent::DragEnd
        }
    }

    /// Drop a pointer without resolving a click.
    pub fn on_cancel(&mut self, pointer: Option<PointerId>) -> GestureEvent<K> {
        let pointer = pointer.unwrap_or(DEFAULT_POINTER);
        if self.traces.remove(&pointer).is_none() {
            return GestureEvent::None;
        }
        if self.phase == GesturePhase::Pinching {
            return self.end_pinch(pointer);
        }
        if self.traces.is_empty() {
            self.phase = GesturePhase::Idle;
            return GestureEvent::DragEnd;
        }
        GestureEvent::None
    }

    /// A wheel step: negative `delta_y` zooms in (λ grows).
    pub fn on_wheel(
        &self,
        delta_y: f64,
        point: impl Into<Complex>,
        lambda: f64,
    ) -> GestureEvent<K> {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return GestureEvent::None;
        }
        let stepped = if delta_y < 0.0 {
            lambda * self.config.wheel_factor
        } else {
            lambda / self.config.wheel_factor
        };
        GestureEvent::Wheel {
            lambda: self.config.clamp_lambda(stepped),
            point: point.into(),
        }
    }

    /// Forget all pointers.
    pub fn clear(&mut self) {
        self.traces.clear();
        self.pinch = None;
        self.phase = GesturePhase::Idle;
    }

    fn end_pinch(&mut self, lifted: PointerId) -> GestureEvent<K> {
        if self
            .pinch
            .as_ref()
            .is_some_and(|p| !p.pointers.contains(&lifted))
        {
            return GestureEvent::None;
        }
        self.pinch = None;
        self.resume_pan()
    }

    fn resume_pan(&mut self) -> GestureEvent<K> {
        let Some(trace) = self.traces.values_mut().next() else {
            self.phase = GesturePhase::Idle;
            return GestureEvent::DragEnd;
        };
        trace.down = trace.last;
        self.phase = GesturePhase::Dragging;
        GestureEvent::PanStart { point: trace.last }
    }

    fn span(&self, a: PointerId, b: PointerId) -> (Complex, f64) {
        let pa = self.traces.get(&a).map_or(Complex::ZERO, |t| t.last);
        let pb = self.traces.get(&b).map_or(Complex::ZERO, |t| t.last);
        (pa.lerp(pb, 0.5), pa.distance(pb))
    }
}

#[cfg(test)]
mod tests {
    use core::num::NonZeroU64;

    use hypertree_math::Complex;
    use kurbo::Point;

    use super::{GestureEvent, GesturePhase, GestureState};
    use crate::GestureConfig;

    fn state() -> GestureState<u32> {
        GestureState::new(GestureConfig::default())
    }

    fn press(samples: &[(f64, f64)]) -> GestureEvent<u32> {
        let mut s = state();
        let (first, rest) = samples.split_first().unwrap();
        s.on_down(None, Point::new(first.0, first.1), 0.1, |_| None);
        let (last, moves) = rest.split_last().unwrap();
        for &(x, y) in moves {
            s.on_move(None, Point::new(x, y));
        }
        s.on_up(None, Point::new(last.0, last.1))
    }

    #[test]
    fn short_still_press_is_a_click() {
        let up = press(&[(0.2, 0.2), (0.201, 0.2), (0.202, 0.2), (0.203, 0.2)]);
        assert_eq!(up, GestureEvent::Click { point: Complex::new(0.203, 0.2) });
        assert!(matches!(press(&[(0.0, 0.0), (0.0, 0.0)]), GestureEvent::Click { .. }));
    }

    #[test]
    fn long_path_is_a_drag() {
        let up = press(&[(0.2, 0.2), (0.2, 0.207)]);
        assert_eq!(up, GestureEvent::DragEnd);
    }

    #[test]
    fn many_samples_are_a_drag() {
        // Three moves of zero length.
        let up = press(&[(0.2, 0.2), (0.2, 0.2), (0.2, 0.2), (0.2, 0.2), (0.2, 0.2)]);
        assert_eq!(up, GestureEvent::DragEnd);
    }

    #[test]
    fn pan_reports_down_and_clamped_current() {
        let mut s = state();
        assert_eq!(
            s.on_down(None, Point::ZERO, 0.1, |_| None),
            GestureEvent::PanStart { point: Complex::ZERO }
        );
        assert_eq!(s.phase(), GesturePhase::Dragging);
        let GestureEvent::Pan { start, current } = s.on_move(None, Point::new(0.3, 0.0)) else {
            panic!("expected a pan");
        };
        assert_eq!(start, Complex::ZERO);
        assert_eq!(current, Complex::new(0.3, 0.0));

        let GestureEvent::Pan { current, .. } = s.on_move(None, Point::new(2.0, 0.0)) else {
            panic!("expected a pan");
        };
        assert!((current.norm() - s.config().max_mouse_r).abs() < 1e-12);
    }

    #[test]
    fn unmatched_events_are_ignored() {
        let mut s = state();
        assert_eq!(s.on_move(None, Point::ZERO), GestureEvent::None);
        assert_eq!(s.on_up(None, Point::ZERO), GestureEvent::None);
        assert_eq!(s.on_cancel(None), GestureEvent::None);
        assert_eq!(s.phase(), GesturePhase::Idle);
    }

    #[test]
    fn two_pointers_pinch() {
        let mut s = state();
        let p1 = NonZeroU64::new(1);
        let p2 = NonZeroU64::new(2);
        s.on_down(p1, Point::new(-0.1, 0.0), 0.2, |_| Some(99));
        let start = s.on_down(p2, Point::new(0.1, 0.0), 0.2, |c| {
            assert!(c.norm() < 1e-12, "hit test at the midpoint");
            Some(7)
        });
        assert_eq!(
            start,
            GestureEvent::PinchStart {
                center: Complex::ZERO,
                preserve: Some(7)
            }
        );
        assert_eq!(s.phase(), GesturePhase::Pinching);

        let GestureEvent::Pinch { lambda, center, preserve } = s.on_move(p2, Point::new(0.3, 0.0))
        else {
            panic!("expected a pinch");
        };
        // Distance doubled.
        assert!((lambda - 0.4).abs() < 1e-12);
        assert!((center.re - 0.1).abs() < 1e-12);
        assert_eq!(preserve, Some(7));

        // Spreading far clamps to lambda_max.
        let GestureEvent::Pinch { lambda, .. } = s.on_move(p2, Point::new(0.9, 0.0)) else {
            panic!("expected a pinch");
        };
        assert_eq!(lambda, s.config().lambda_max);

        // Lifting one finger pans with the other; lifting it never clicks.
        assert!(matches!(s.on_up(p2, Point::new(0.9, 0.0)), GestureEvent::PanStart { .. }));
        assert_eq!(s.phase(), GesturePhase::Dragging);
        assert_eq!(s.on_up(p1, Point::new(-0.1, 0.0)), GestureEvent::DragEnd);
        assert_eq!(s.phase(), GesturePhase::Idle);
    }

    #[test]
    fn wheel_steps_lambda() {
        let s = state();
        let GestureEvent::Wheel { lambda, point } = s.on_wheel(-3.0, Point::new(0.1, 0.2), 0.1)
        else {
            panic!("expected a wheel step");
        };
        assert!((lambda - 0.1175).abs() < 1e-12);
        assert_eq!(point, Complex::new(0.1, 0.2));

        let GestureEvent::Wheel { lambda, .. } = s.on_wheel(1.0, Point::ZERO, 0.1175) else {
            panic!("expected a wheel step");
        };
        assert!((lambda - 0.1).abs() < 1e-12);

        let GestureEvent::Wheel { lambda, .. } = s.on_wheel(1.0, Point::ZERO, 0.03) else {
            panic!("expected a wheel step");
        };
        assert_eq!(lambda, s.config().lambda_min);
        assert_eq!(s.on_wheel(0.0, Point::ZERO, 0.1), GestureEvent::None);
    }
}
