// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Debounced hover and double-tap suppression.

/// Result of feeding [`HoverState`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HoverEvent<K> {
    /// The hovered node changed; `None` means nothing is hovered now.
    Changed(Option<K>),
    /// Nothing to report.
    Unchanged,
}

/// Hover tracking with a clear debounce.
///
/// Moving onto a node reports it right away. Moving off every node only
/// clears the hover once `debounce_ms` have passed without a new hit, so a
/// pointer crossing a gap between nodes does not flicker.
#[derive(Clone, Debug)]
pub struct HoverState<K> {
    current: Option<K>,
    clear_at: Option<u64>,
    debounce_ms: u64,
    min_scale: f64,
}

impl<K: Clone + PartialEq> HoverState<K> {
    /// Create a hover tracker.
    pub fn new(debounce_ms: u64, min_scale: f64) -> Self {
        Self {
            current: None,
            clear_at: None,
            debounce_ms,
            min_scale,
        }
    }

    /// The hovered node.
    pub fn current(&self) -> Option<&K> {
        self.current.as_ref()
    }

    /// Feed a hit test result.
    ///
    /// `dist_scale` is the size factor the hit node is drawn with; hits on
    /// nodes squeezed below the minimum scale count as misses.
    pub fn on_move(&mut self, hit: Option<K>, dist_scale: f64, now: u64) -> HoverEvent<K> {
        let hit = hit.filter(|_| dist_scale >= self.min_scale);
        match hit {
            Some(node) => {
                self.clear_at = None;
                if self.current.as_ref() == Some(&node) {
                    HoverEvent::Unchanged
                } else {
                    self.current = Some(node.clone());
                    HoverEvent::Changed(Some(node))
                }
            }
            None if self.current.is_none() => HoverEvent::Unchanged,
            None => {
                let deadline = *self.clear_at.get_or_insert(now + self.debounce_ms);
                self.expire(deadline, now)
            }
        }
    }

    /// Advance the clock; fires the pending clear once it is due.
    pub fn tick(&mut self, now: u64) -> HoverEvent<K> {
        match self.clear_at {
            Some(deadline) => self.expire(deadline, now),
            None => HoverEvent::Unchanged,
        }
    }

    /// Whether a clear is waiting for its deadline.
    pub fn is_pending(&self) -> bool {
        self.clear_at.is_some()
    }

    /// Clear immediately, e.g. when the pointer leaves the view.
    pub fn clear(&mut self) -> HoverEvent<K> {
        self.clear_at = None;
        match self.current.take() {
            Some(_) => HoverEvent::Changed(None),
            None => HoverEvent::Unchanged,
        }
    }

    fn expire(&mut self, deadline: u64, now: u64) -> HoverEvent<K> {
        if now < deadline {
            return HoverEvent::Unchanged;
        }
        self.clear()
    }
}

/// Swallows the second tap of a double tap on the center node.
///
/// A tap on the center would animate to where the view already is; when it
/// repeats within the window it is dropped instead.
#[derive(Clone, Debug)]
pub struct ClickFilter<K> {
    last: Option<(K, u64)>,
    window_ms: u64,
}

impl<K: Clone + PartialEq> ClickFilter<K> {
    /// Create a filter with the given double-tap window.
    pub fn new(window_ms: u64) -> Self {
        Self {
            last: None,
            window_ms,
        }
    }

    /// Whether a click on `node` should be acted on.
    pub fn accept(&mut self, node: Option<&K>, center: Option<&K>, now: u64) -> bool {
        let repeated = self.last.as_ref().is_some_and(|(k, t)| {
            Some(k) == node && now.saturating_sub(*t) <= self.window_ms
        });
        let suppress = repeated && node.is_some() && node == center;
        self.last = node.map(|k| (k.clone(), now));
        if suppress {
            log::debug!("double tap on the center node suppressed");
        }
        !suppress
    }
}

#[cfg(test)]
mod tests {
    use super::{ClickFilter, HoverEvent, HoverState};

    #[test]
    fn hover_reports_enter_once() {
        let mut h = HoverState::new(100, 0.25);
        assert_eq!(h.on_move(Some(1), 0.9, 0), HoverEvent::Changed(Some(1)));
        assert_eq!(h.on_move(Some(1), 0.9, 10), HoverEvent::Unchanged);
        assert_eq!(h.on_move(Some(2), 0.9, 20), HoverEvent::Changed(Some(2)));
        assert_eq!(h.current(), Some(&2));
    }

    #[test]
    fn clearing_is_debounced() {
        let mut h = HoverState::new(100, 0.25);
        h.on_move(Some(1), 0.9, 0);
        assert_eq!(h.on_move(None, 1.0, 50), HoverEvent::Unchanged);
        assert!(h.is_pending());
        assert_eq!(h.tick(120), HoverEvent::Unchanged);
        // Coming back in time cancels the clear.
        assert_eq!(h.on_move(Some(1), 0.9, 130), HoverEvent::Unchanged);
        assert!(!h.is_pending());

        h.on_move(None, 1.0, 200);
        assert_eq!(h.tick(299), HoverEvent::Unchanged);
        assert_eq!(h.tick(300), HoverEvent::Changed(None));
        assert_eq!(h.current(), None);
    }

    #[test]
    fn compressed_nodes_are_not_hovered() {
        let mut h = HoverState::new(100, 0.25);
        assert_eq!(h.on_move(Some(1), 0.1, 0), HoverEvent::Unchanged);
        assert_eq!(h.current(), None);
    }

    #[test]
    fn double_tap_on_center_is_swallowed() {
        let mut f = ClickFilter::new(300);
        assert!(f.accept(Some(&5), Some(&5), 0));
        assert!(!f.accept(Some(&5), Some(&5), 200));
        // Outside the window it fires again.
        assert!(f.accept(Some(&5), Some(&5), 900));
        // Repeated taps away from the center are not affected.
        assert!(f.accept(Some(&6), Some(&5), 950));
        assert!(f.accept(Some(&6), Some(&5), 1000));
        // Empty clicks always go through.
        assert!(f.accept(None, Some(&5), 1010));
        assert!(f.accept(None, Some(&5), 1020));
    }
}
