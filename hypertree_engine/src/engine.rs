// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The owning engine: loading, the update cycle, input and navigation.

use core::fmt::Debug;

use hypertree_filter::{MagicFilter, VisibilityCache, leaf_or_lazy};
use hypertree_gesture::{ClickFilter, GestureEvent, GestureState, HoverEvent, HoverState, PointerId};
use hypertree_layout::{LayoutMode, layout_berge, layout_path};
use hypertree_math::{
    Complex, HyperbolicTransform, NegTransform, PanTransform, TransformState, Transformation,
    shift,
};
use hypertree_tree::{Generation, NodeId, NodePayload, PathId, Tree};
use hypertree_tween::{
    FrameResult, Scheduler, TransitionId, TransitionOutcome, TransitionSlot, TweenTarget,
    TweenValue,
};

use crate::init::{CompletedLoad, InitMachine};
use crate::{
    Color, ConfigOverride, DataLoader, EngineConfig, EngineError, InitState, LabelMap, LangLoader,
    LayerFlags, LayerStack, LoadTiming, LoadedData, PathKind, PathRegistry, RenderSink,
    TransformKind, UpdateFlags,
};

type ClickCallback = Box<dyn FnMut(Option<NodeId>, Complex)>;
type CenterCallback = Box<dyn FnMut(NodeId, &str)>;
type HoverCallback = Box<dyn FnMut(Option<NodeId>)>;
type SelectCallback = Box<dyn FnMut(NodeId)>;

#[derive(Default)]
struct Callbacks {
    node_click: Option<ClickCallback>,
    center_change: Option<CenterCallback>,
    hover_change: Option<HoverCallback>,
    node_select: Option<SelectCallback>,
}

fn make_transform(config: &EngineConfig) -> Box<dyn Transformation> {
    let state = TransformState::new(Complex::ZERO, Complex::ONE, config.initial_lambda);
    let hyperbolic =
        || HyperbolicTransform::new(state).with_max_mouse_r(config.gesture.max_mouse_r);
    match config.transform {
        TransformKind::Hyperbolic => Box::new(hyperbolic()),
        TransformKind::Pan => Box::new(PanTransform::new(state)),
        TransformKind::Negated => Box::new(NegTransform::new(hyperbolic())),
    }
}

/// An interactive hyperbolic view of one tree.
///
/// The engine is single-threaded and frame-driven: every input method and
/// [`tick`](Self::tick) runs the work it triggers synchronously, ending
/// with an [`update`](Self::update) that rebuilds the visibility cache and
/// feeds the render layers.
pub struct Engine<D: NodePayload> {
    config: EngineConfig,
    tree: Tree<D>,
    transform: Box<dyn Transformation>,
    filter: MagicFilter,
    gesture: GestureState<NodeId>,
    hover: HoverState<NodeId>,
    clicks: ClickFilter<NodeId>,
    transitions: TransitionSlot,
    paths: PathRegistry,
    hover_path: Option<PathId>,
    layers: LayerStack,
    sink: Option<Box<dyn RenderSink>>,
    callbacks: Callbacks,
    init: InitMachine<D>,
    refresh: Option<Generation>,
    labels: LabelMap,
    timing: Option<LoadTiming>,
    laid_out_lambda: Option<f64>,
    zoom_anchor: Option<NodeId>,
    pinch_center: Complex,
    last_center: Option<NodeId>,
    pending_updates: UpdateFlags,
}

impl<D: NodePayload> Debug for Engine<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Engine")
            .field("state", self.transform.state())
            .field("init", &self.init.state())
            .field("nodes", &self.tree.len())
            .field("center", &self.last_center)
            .field("paths", &self.paths.len())
            .field("animating", &self.transitions.is_busy())
            .finish_non_exhaustive()
    }
}

impl<D: NodePayload> Engine<D> {
    /// Create an engine with no data.
    pub fn new(config: EngineConfig) -> Self {
        let gesture = &config.gesture;
        Self {
            tree: Tree::new(Generation::default()),
            transform: make_transform(&config),
            filter: MagicFilter::new(config.filter.clone()),
            gesture: GestureState::new(gesture.clone()),
            hover: HoverState::new(gesture.hover_debounce_ms, gesture.hover_min_scale),
            clicks: ClickFilter::new(gesture.double_tap_ms),
            transitions: TransitionSlot::new(),
            paths: PathRegistry::new(),
            hover_path: None,
            layers: LayerStack::new(LayerFlags::default(), config.node_radius),
            sink: None,
            callbacks: Callbacks::default(),
            init: InitMachine::default(),
            refresh: None,
            labels: LabelMap::new(),
            timing: None,
            laid_out_lambda: None,
            zoom_anchor: None,
            pinch_center: Complex::ZERO,
            last_center: None,
            pending_updates: UpdateFlags::all(),
            config,
        }
    }

    /// Create an engine from the defaults and an override.
    pub fn with_override(o: &ConfigOverride) -> Self {
        Self::new(EngineConfig::default().merged(o))
    }

    /// The configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The loaded tree.
    pub fn tree(&self) -> &Tree<D> {
        &self.tree
    }

    /// Current pan, rotation and λ.
    pub fn state(&self) -> &TransformState {
        self.transform.state()
    }

    /// Current λ.
    pub fn lambda(&self) -> f64 {
        self.transform.state().lambda
    }

    /// The cache built by the last update.
    pub fn cache(&self) -> &VisibilityCache {
        self.filter.cache()
    }

    /// Current adaptive threshold scalar.
    pub fn magic(&self) -> f64 {
        self.filter.magic()
    }

    /// Node closest to the disk center.
    pub fn center(&self) -> Option<NodeId> {
        self.filter.cache().center
    }

    /// Hovered node.
    pub fn hovered(&self) -> Option<NodeId> {
        self.hover.current().copied()
    }

    /// Active highlight paths.
    pub fn paths(&self) -> &PathRegistry {
        &self.paths
    }

    /// The render layers.
    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    /// Where initialization stands.
    pub fn init_state(&self) -> InitState {
        self.init.state()
    }

    /// Timing reported with the current dataset.
    pub fn load_timing(&self) -> Option<LoadTiming> {
        self.timing
    }

    /// Whether a transition is running.
    pub fn is_animating(&self) -> bool {
        self.transitions.is_busy()
    }

    /// Send layer updates to `sink`; the next update re-attaches every layer.
    pub fn set_render_sink(&mut self, sink: impl RenderSink + 'static) {
        self.sink = Some(Box::new(sink));
        self.pending_updates = UpdateFlags::all();
    }

    /// Stop sending layer updates.
    pub fn clear_render_sink(&mut self) -> Option<Box<dyn RenderSink>> {
        self.sink.take()
    }

    /// Choose the rendered layers.
    pub fn set_layers(&mut self, enabled: LayerFlags) {
        self.layers.set_enabled(enabled);
        self.pending_updates |= UpdateFlags::PARENT | UpdateFlags::DATA;
    }

    /// Called with the clicked node (if any) and the click point.
    pub fn on_node_click(&mut self, f: impl FnMut(Option<NodeId>, Complex) + 'static) {
        self.callbacks.node_click = Some(Box::new(f));
    }

    /// Called with the new center and its breadcrumb.
    pub fn on_center_node_change(&mut self, f: impl FnMut(NodeId, &str) + 'static) {
        self.callbacks.center_change = Some(Box::new(f));
    }

    /// Called when the hovered node changes.
    pub fn on_hover_node_change(&mut self, f: impl FnMut(Option<NodeId>) + 'static) {
        self.callbacks.hover_change = Some(Box::new(f));
    }

    /// Called when a node gets selected.
    pub fn on_node_select(&mut self, f: impl FnMut(NodeId) + 'static) {
        self.callbacks.node_select = Some(Box::new(f));
    }

    // Loading

    /// Start loading a dataset; deliveries must carry the returned generation.
    ///
    /// Cancels the running transition and supersedes any pending load.
    pub fn begin_load(&mut self) -> Generation {
        self.transitions.cancel();
        self.refresh = None;
        self.init.begin()
    }

    /// Hand over the dataset of a pending load.
    pub fn deliver_data(
        &mut self,
        generation: Generation,
        data: LoadedData<D>,
    ) -> Result<InitState, EngineError> {
        if let Some(load) = self.init.deliver_data(generation, data)? {
            self.install(load);
        }
        Ok(self.init.state())
    }

    /// Hand over the labels of a pending load.
    pub fn deliver_labels(
        &mut self,
        generation: Generation,
        labels: LabelMap,
    ) -> Result<InitState, EngineError> {
        if let Some(load) = self.init.deliver_labels(generation, labels)? {
            self.install(load);
        }
        Ok(self.init.state())
    }

    /// Load through callback-style loaders.
    ///
    /// Loaders that complete synchronously leave the engine ready; otherwise
    /// the returned generation is what late deliveries must carry.
    pub fn load_with(
        &mut self,
        mut data: impl DataLoader<D>,
        mut lang: impl LangLoader,
    ) -> Result<Generation, EngineError> {
        let generation = self.begin_load();
        let mut labels = None;
        lang.load(&mut |l| labels = Some(l));
        let mut loaded = None;
        data.load(&mut |d| loaded = Some(d));
        if let Some(labels) = labels {
            self.deliver_labels(generation, labels)?;
        }
        if let Some(loaded) = loaded {
            self.deliver_data(generation, loaded)?;
        }
        Ok(generation)
    }

    /// Replace the dataset, keeping the current view and labels.
    ///
    /// Highlight paths refer to the old nodes and are dropped.
    pub fn refresh_data(&mut self, data: LoadedData<D>) -> Result<Generation, EngineError> {
        if self.init.state() != InitState::Ready {
            return Err(EngineError::NotReady);
        }
        let generation = self.begin_load();
        self.refresh = Some(generation);
        self.deliver_labels(generation, self.labels.clone())?;
        self.deliver_data(generation, data)?;
        Ok(generation)
    }

    fn install(&mut self, load: CompletedLoad<D>) {
        let CompletedLoad {
            generation,
            data,
            labels,
        } = load;
        let keep_view = self.refresh.take() == Some(generation);
        self.transitions.cancel();

        let mut tree = Tree::from_source(data.root, generation);
        let labelled = tree.apply_labels(|key| labels.get(key).map(String::as_str));
        tree.compute_precalc();
        log::debug!(
            "dataset {generation:?}: {} nodes, {labelled} labels, loaded in {} ms",
            tree.len(),
            data.timing.duration_ms()
        );
        self.tree = tree;
        self.labels = labels;
        self.timing = Some(data.timing);

        if !self.paths.is_empty() {
            log::debug!("dropping {} paths of the previous dataset", self.paths.len());
        }
        self.paths.clear();
        self.hover_path = None;
        self.hover.clear();
        self.gesture.clear();
        self.filter.reset();
        self.layers.reset();
        self.last_center = None;
        self.laid_out_lambda = None;
        self.zoom_anchor = None;
        if !keep_view {
            *self.transform.state_mut() =
                TransformState::new(Complex::ZERO, Complex::ONE, self.config.initial_lambda);
        }
        self.transform.on_drag_end();
        self.pending_updates = UpdateFlags::all();
        self.init.mark_ready();
        self.update();
    }

    // Update cycle

    /// Lay out if λ changed, filter, report a new center and render.
    pub fn update(&mut self) -> &VisibilityCache {
        let lambda = self.lambda();
        if self.laid_out_lambda != Some(lambda) {
            self.relayout(lambda);
        }
        let heads = self.paths.heads();
        let hover: Vec<NodeId> = self.hover.current().copied().into_iter().collect();
        self.filter.update(
            &mut self.tree,
            self.transform.as_ref(),
            lambda,
            &heads,
            &hover,
            leaf_or_lazy,
        );

        let center = self.filter.cache().center;
        if center != self.last_center {
            self.last_center = center;
            if let Some(c) = center {
                let crumb = self.breadcrumb(c);
                log::debug!("center changed to {c:?} ({crumb})");
                if let Some(cb) = &mut self.callbacks.center_change {
                    cb(c, &crumb);
                }
            }
        }

        let requested = core::mem::take(&mut self.pending_updates) | UpdateFlags::TRANSFORMATION;
        let ran = self
            .layers
            .render(&self.tree, self.filter.cache(), &self.paths, requested);
        if let Some(sink) = self.sink.as_mut() {
            self.layers.emit(&mut **sink, ran);
        }
        self.filter.cache()
    }

    /// Labels from the root down to `node`, joined by the separator.
    pub fn breadcrumb(&self, node: NodeId) -> String {
        let labels: Vec<&str> = self
            .tree
            .path_from_root(node)
            .into_iter()
            .filter_map(|id| self.tree.label(id))
            .collect();
        labels.join(self.config.breadcrumb_separator.as_str())
    }

    /// Re-derive weights and layout after the payloads changed, keeping the pan.
    pub fn update_nodes_visualization(&mut self) {
        self.tree.compute_precalc();
        self.zoom_anchor = self.center();
        self.laid_out_lambda = None;
        self.pending_updates |= UpdateFlags::DATA | UpdateFlags::STYLE;
        self.update();
    }

    fn relayout(&mut self, lambda: f64) {
        let Some(root) = self.tree.root() else {
            return;
        };
        let anchor = self
            .zoom_anchor
            .take()
            .or(self.filter.cache().center)
            .and_then(|n| Some((n, self.disk_position(n)?)));
        layout_berge(
            &mut self.tree,
            root,
            lambda,
            &self.config.layout,
            LayoutMode::Recursive,
        );
        self.laid_out_lambda = Some(lambda);
        if let Some((node, old_disk)) = anchor {
            self.re_anchor(node, old_disk);
        }
    }

    fn disk_position(&self, node: NodeId) -> Option<Complex> {
        let z = self.tree.layout(node)?.z;
        Some(self.transform.transform_point(z))
    }

    /// Pan so `node`, drawn at `old_disk` before its layout moved, is drawn there again.
    fn re_anchor(&mut self, node: NodeId, old_disk: Complex) {
        if let Some(now) = self.disk_position(node) {
            self.pan_by(now, old_disk);
        }
    }

    /// Pan so the point drawn at `s` is drawn at `e`.
    fn pan_by(&mut self, s: Complex, e: Complex) {
        let kind = self.config.transform;
        let state = self.transform.state_mut();
        match kind {
            TransformKind::Hyperbolic => state.set_mobius(shift(&state.mobius(), s, e)),
            TransformKind::Negated => state.set_mobius(shift(&state.mobius(), -s, -e)),
            TransformKind::Pan => state.p += e - s,
        }
    }

    /// Set λ, keeping `anchor` (or the center) where it is drawn.
    fn zoom_about(&mut self, lambda: f64, anchor: Option<NodeId>) {
        let anchor = anchor
            .filter(|&n| self.tree.contains(n))
            .or(self.filter.cache().center);
        if let Some(node) = anchor
            && let Some(old_disk) = self.disk_position(node)
        {
            layout_path(&mut self.tree, node, lambda, &self.config.layout);
            self.re_anchor(node, old_disk);
        }
        self.transform.on_drag_lambda(lambda);
        self.zoom_anchor = anchor;
    }

    // Input

    /// The node under a disk point.
    pub fn hit_test(&self, point: impl Into<Complex>) -> Option<NodeId> {
        self.filter
            .cache()
            .tessellation
            .find(point.into(), self.config.filter.hit_radius)
    }

    /// A pointer went down. Cancels the running transition.
    pub fn pointer_down(&mut self, pointer: Option<PointerId>, point: impl Into<Complex>) {
        self.transitions.cancel();
        let lambda = self.lambda();
        let cache = self.filter.cache();
        let radius = self.config.filter.hit_radius;
        let event = self
            .gesture
            .on_down(pointer, point, lambda, |c| cache.tessellation.find(c, radius));
        self.apply_gesture(event, 0);
    }

    /// A pointer moved while down.
    pub fn pointer_move(&mut self, pointer: Option<PointerId>, point: impl Into<Complex>) {
        let event = self.gesture.on_move(pointer, point);
        self.apply_gesture(event, 0);
    }

    /// A pointer went up at host time `now`.
    pub fn pointer_up(&mut self, pointer: Option<PointerId>, point: impl Into<Complex>, now: u64) {
        let event = self.gesture.on_up(pointer, point);
        self.apply_gesture(event, now);
    }

    /// A pointer was lost without a release.
    pub fn pointer_cancel(&mut self, pointer: Option<PointerId>) {
        let event = self.gesture.on_cancel(pointer);
        self.apply_gesture(event, 0);
    }

    /// A wheel step at `point`; negative `delta_y` zooms in.
    pub fn wheel(&mut self, delta_y: f64, point: impl Into<Complex>) {
        let event = self.gesture.on_wheel(delta_y, point, self.lambda());
        if event != GestureEvent::None {
            self.transitions.cancel();
        }
        self.apply_gesture(event, 0);
    }

    /// Rotate about the disk center by the angle between `s` and `e`.
    pub fn rotate(&mut self, s: impl Into<Complex>, e: impl Into<Complex>) {
        self.transform.on_drag_theta(s.into(), e.into());
        self.update();
    }

    /// The pointer moved without a button down.
    pub fn hover(&mut self, point: impl Into<Complex>, now: u64) {
        let hit = self.hit_test(point);
        let scale = hit
            .and_then(|n| self.tree.cache(n))
            .map_or(0.0, |c| c.dist_scale);
        let event = self.hover.on_move(hit, scale, now);
        self.apply_hover(event);
    }

    /// The pointer left the view.
    pub fn pointer_leave(&mut self) {
        let event = self.hover.clear();
        self.apply_hover(event);
    }

    /// Advance the host clock: fires due hover clears and steps the transition.
    pub fn tick(&mut self, now: u64) -> FrameResult {
        let hover = self.hover.tick(now);
        self.apply_hover(hover);
        let frame = self.transitions.tick(now);
        match frame {
            FrameResult::Idle => {}
            FrameResult::Running { value, .. } | FrameResult::Finished { value, .. } => {
                self.apply_tween(value);
                self.update();
            }
        }
        frame
    }

    fn apply_gesture(&mut self, event: GestureEvent<NodeId>, now: u64) {
        match event {
            GestureEvent::None => {}
            GestureEvent::PanStart { .. } => self.transform.on_drag_start(),
            GestureEvent::Pan { start, current } => {
                self.transform.on_drag_p(start, current);
                self.update();
            }
            GestureEvent::PinchStart { center, .. } => {
                self.transform.on_drag_end();
                self.pinch_center = center;
            }
            GestureEvent::Pinch {
                lambda,
                center,
                preserve,
            } => {
                self.zoom_about(lambda, preserve);
                self.pan_by(self.pinch_center, center);
                self.pinch_center = center;
                self.update();
            }
            GestureEvent::Click { point } => {
                self.transform.on_drag_end();
                self.click(point, now);
            }
            GestureEvent::DragEnd => {
                self.transform.on_drag_end();
                self.update();
            }
            GestureEvent::Wheel { lambda, point } => {
                let anchor = self.hit_test(point);
                self.zoom_about(lambda, anchor);
                self.update();
            }
        }
    }

    fn click(&mut self, point: Complex, now: u64) {
        let hit = self.hit_test(point);
        let center = self.center();
        if !self.clicks.accept(hit.as_ref(), center.as_ref(), now) {
            return;
        }
        log::debug!("click on {hit:?}");
        if let Some(cb) = &mut self.callbacks.node_click {
            cb(hit, point);
        }
        if self.config.click_to_center
            && let Some(node) = hit
        {
            match self.goto_node(node, None) {
                Ok(Some(_)) => {}
                Ok(None) => log::debug!("click on {node:?} not centered: a transition is running"),
                Err(err) => log::debug!("click on {node:?} not centered: {err}"),
            }
        }
    }

    fn apply_hover(&mut self, event: HoverEvent<NodeId>) {
        let HoverEvent::Changed(hovered) = event else {
            return;
        };
        let moved = match (hovered, self.hover_path) {
            (Some(node), Some(path)) => self.paths.set_head(&mut self.tree, path, node).is_ok(),
            (Some(node), None) => {
                self.hover_path = self
                    .paths
                    .add(&mut self.tree, PathKind::Hover, node, None)
                    .ok();
                self.hover_path.is_some()
            }
            (None, Some(path)) => {
                self.hover_path = None;
                self.paths.remove(&mut self.tree, path).is_ok()
            }
            (None, None) => false,
        };
        if let Some(cb) = &mut self.callbacks.hover_change {
            cb(hovered);
        }
        if moved {
            self.pending_updates |= UpdateFlags::STYLE;
            self.update();
        }
    }

    fn apply_tween(&mut self, value: TweenValue) {
        match value {
            TweenValue::Pan(p) => self.transform.state_mut().p = p,
            TweenValue::Lambda(lambda) => self.transform.on_drag_lambda(lambda),
        }
    }

    // Navigation

    fn ensure_ready(&self, node: Option<NodeId>) -> Result<(), EngineError> {
        if self.init.state() != InitState::Ready {
            return Err(EngineError::NotReady);
        }
        match node {
            Some(n) if !self.tree.contains(n) => Err(EngineError::UnknownNode(n)),
            _ => Ok(()),
        }
    }

    fn start(
        &mut self,
        duration_ms: Option<u64>,
        target: TweenTarget,
        on_done: impl FnOnce(TransitionOutcome) + 'static,
    ) -> Option<TransitionId> {
        let duration = duration_ms.unwrap_or(self.config.tween.default_duration_ms);
        self.transitions.start(duration, target, on_done)
    }

    /// Animate the root back to the center.
    ///
    /// Returns `Ok(None)` while another transition runs.
    pub fn goto_home(&mut self, duration_ms: Option<u64>) -> Result<Option<TransitionId>, EngineError> {
        self.ensure_ready(None)?;
        let from = self.state().p;
        Ok(self.start(
            duration_ms,
            TweenTarget::Pan {
                from,
                to: Complex::ZERO,
            },
            |_| {},
        ))
    }

    /// Animate `node` to the center.
    ///
    /// Returns `Ok(None)` while another transition runs.
    pub fn goto_node(
        &mut self,
        node: NodeId,
        duration_ms: Option<u64>,
    ) -> Result<Option<TransitionId>, EngineError> {
        self.goto_node_then(node, duration_ms, |_| {})
    }

    /// Like [`goto_node`](Self::goto_node), reporting how the transition ended.
    pub fn goto_node_then(
        &mut self,
        node: NodeId,
        duration_ms: Option<u64>,
        on_done: impl FnOnce(TransitionOutcome) + 'static,
    ) -> Result<Option<TransitionId>, EngineError> {
        self.ensure_ready(Some(node))?;
        let z = self.tree.layout(node).map_or(Complex::ZERO, |l| l.z);
        let state = self.state();
        let target = TweenTarget::Pan {
            from: state.p,
            to: -(state.theta * z),
        };
        Ok(self.start(duration_ms, target, on_done))
    }

    /// Animate λ to `lambda`, clamped to the configured band.
    pub fn goto_lambda(&mut self, lambda: f64) -> Result<Option<TransitionId>, EngineError> {
        self.ensure_ready(None)?;
        let target = TweenTarget::Lambda {
            from: self.lambda(),
            to: self.config.gesture.clamp_lambda(lambda),
        };
        let duration = Some(self.config.tween.lambda_duration_ms);
        Ok(self.start(duration, target, |_| {}))
    }

    /// Cancel the running transition.
    pub fn cancel_transition(&mut self) -> bool {
        self.transitions.cancel()
    }

    /// Select `node`, or unselect it if selected. Returns whether it is selected now.
    pub fn toggle_selection(&mut self, node: NodeId) -> Result<bool, EngineError> {
        self.ensure_ready(Some(node))?;
        let existing = self
            .paths
            .of_kind(PathKind::Selection)
            .find(|p| p.head == node)
            .map(|p| p.id);
        let selected = match existing {
            Some(id) => {
                self.paths.remove(&mut self.tree, id)?;
                false
            }
            None => {
                self.paths
                    .add(&mut self.tree, PathKind::Selection, node, None)?;
                if let Some(cb) = &mut self.callbacks.node_select {
                    cb(node);
                }
                true
            }
        };
        self.pending_updates |= UpdateFlags::STYLE;
        self.update();
        Ok(selected)
    }

    /// Add a highlight path ending at `head`.
    pub fn add_path(
        &mut self,
        kind: PathKind,
        head: NodeId,
        color: Option<Color>,
    ) -> Result<PathId, EngineError> {
        let id = self.paths.add(&mut self.tree, kind, head, color)?;
        self.pending_updates |= UpdateFlags::STYLE;
        self.update();
        Ok(id)
    }

    /// Remove a highlight path.
    pub fn remove_path(&mut self, id: PathId) -> Result<(), EngineError> {
        self.paths.remove(&mut self.tree, id)?;
        if self.hover_path == Some(id) {
            self.hover_path = None;
        }
        self.pending_updates |= UpdateFlags::STYLE;
        self.update();
        Ok(())
    }

    /// Move the head of a highlight path.
    pub fn set_path_head(&mut self, id: PathId, head: NodeId) -> Result<(), EngineError> {
        self.paths.set_head(&mut self.tree, id, head)?;
        self.pending_updates |= UpdateFlags::STYLE;
        self.update();
        Ok(())
    }

    /// Highlight every node whose label or search text contains `text`.
    ///
    /// Replaces the previous query; an empty text clears it. Returns the
    /// number of matches.
    pub fn select_query(&mut self, text: &str) -> usize {
        self.paths.remove_kind(&mut self.tree, PathKind::Query);
        let matches: Vec<NodeId> = self
            .tree
            .ids()
            .filter(|&id| self.tree.matches_text(id, text))
            .collect();
        for &id in &matches {
            // Ids come from the current tree.
            let _ = self.paths.add(&mut self.tree, PathKind::Query, id, None);
        }
        log::debug!("query {text:?}: {} matches", matches.len());
        self.pending_updates |= UpdateFlags::STYLE;
        self.update();
        matches.len()
    }

    /// Fill color of `node`.
    pub fn node_color(&self, node: NodeId) -> Color {
        self.paths.color_of(&self.tree, node).unwrap_or(Color::NODE)
    }
}
