// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The render layer stack and the host sink it feeds.

use hypertree_filter::VisibilityCache;
use hypertree_math::{ArcCenter, Complex, arc_center};
use hypertree_tree::{NodeId, NodePayload, Tree};
use kurbo::{Circle, Point};

use crate::{Color, PathRegistry};

/// The layers, in paint order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerKind {
    /// Hit-test cells, one per clickable unculled node.
    Cells,
    /// Edges between unculled nodes and their parents.
    Links,
    /// Edges on highlight paths, drawn over the plain links.
    PathLinks,
    /// Circles for leaf and lazy nodes.
    Nodes,
    /// Thinned labels.
    Labels,
}

impl LayerKind {
    /// Every layer in paint order.
    pub const ALL: [Self; 5] = [
        Self::Cells,
        Self::Links,
        Self::PathLinks,
        Self::Nodes,
        Self::Labels,
    ];

    /// The enablement flag of this layer.
    pub fn flag(self) -> LayerFlags {
        match self {
            Self::Cells => LayerFlags::CELLS,
            Self::Links => LayerFlags::LINKS,
            Self::PathLinks => LayerFlags::PATH_LINKS,
            Self::Nodes => LayerFlags::NODES,
            Self::Labels => LayerFlags::LABELS,
        }
    }
}

bitflags::bitflags! {
    /// Which layers the stack renders.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct LayerFlags: u8 {
        /// [`LayerKind::Cells`].
        const CELLS      = 1 << 0;
        /// [`LayerKind::Links`].
        const LINKS      = 1 << 1;
        /// [`LayerKind::PathLinks`].
        const PATH_LINKS = 1 << 2;
        /// [`LayerKind::Nodes`].
        const NODES      = 1 << 3;
        /// [`LayerKind::Labels`].
        const LABELS     = 1 << 4;
    }
}

impl Default for LayerFlags {
    /// Everything but the hit-test cells.
    fn default() -> Self {
        Self::all() - Self::CELLS
    }
}

bitflags::bitflags! {
    /// Which sink hooks a render pass calls.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct UpdateFlags: u8 {
        /// The layer is (re)attached, e.g. for a new dataset.
        const PARENT         = 1 << 0;
        /// The set of drawn elements changed.
        const DATA           = 1 << 1;
        /// Positions changed.
        const TRANSFORMATION = 1 << 2;
        /// Colors changed.
        const STYLE          = 1 << 3;
    }
}

/// A hit-test cell around one node center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellSite {
    /// Node owning the cell.
    pub node: NodeId,
    /// Cell site in disk coordinates.
    pub site: Point,
}

/// An edge drawn as a geodesic arc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkArc {
    /// Child end.
    pub node: NodeId,
    /// Parent end.
    pub parent: NodeId,
    /// Parent position.
    pub from: Point,
    /// Child position.
    pub to: Point,
    /// Geodesic circle; straight when collinear with the origin.
    pub arc: ArcCenter,
    /// Stroke width factor in `[0, 1]` from the child's subtree weight.
    pub width: f64,
    /// Stroke color.
    pub color: Color,
}

/// A node circle.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDot {
    /// Node.
    pub node: NodeId,
    /// Circle in disk coordinates, radius scaled by position.
    pub circle: Circle,
    /// Cached `transform` attribute.
    pub transform: String,
    /// Whether the node has culled children.
    pub lazy: bool,
    /// Fill color.
    pub color: Color,
}

/// A label.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelItem {
    /// Node.
    pub node: NodeId,
    /// Display text.
    pub text: String,
    /// Anchor in disk coordinates.
    pub anchor: Point,
    /// Cached `transform` attribute.
    pub transform: String,
}

/// What one layer draws this frame.
#[derive(Clone, Debug, PartialEq)]
pub enum LayerFrame {
    /// See [`LayerKind::Cells`].
    Cells(Vec<CellSite>),
    /// See [`LayerKind::Links`].
    Links(Vec<LinkArc>),
    /// See [`LayerKind::PathLinks`].
    PathLinks(Vec<LinkArc>),
    /// See [`LayerKind::Nodes`].
    Nodes(Vec<NodeDot>),
    /// See [`LayerKind::Labels`].
    Labels(Vec<LabelItem>),
}

impl LayerFrame {
    /// The layer this frame belongs to.
    pub fn kind(&self) -> LayerKind {
        match self {
            Self::Cells(_) => LayerKind::Cells,
            Self::Links(_) => LayerKind::Links,
            Self::PathLinks(_) => LayerKind::PathLinks,
            Self::Nodes(_) => LayerKind::Nodes,
            Self::Labels(_) => LayerKind::Labels,
        }
    }

    /// Number of drawn elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Cells(v) => v.len(),
            Self::Links(v) | Self::PathLinks(v) => v.len(),
            Self::Nodes(v) => v.len(),
            Self::Labels(v) => v.len(),
        }
    }

    /// Whether nothing is drawn.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The host side of rendering.
///
/// Every hook receives the frame of one layer; hooks run layer by layer in
/// paint order, and within a layer in the order parent, data,
/// transformation, style.
pub trait RenderSink {
    /// The layer is attached to a new dataset.
    fn update_parent(&mut self, kind: LayerKind) {
        let _ = kind;
    }

    /// The elements of the layer changed.
    fn update_data(&mut self, frame: &LayerFrame);

    /// Positions of the layer's elements changed.
    fn update_transformation(&mut self, frame: &LayerFrame);

    /// Colors of the layer's elements changed.
    fn update_style(&mut self, frame: &LayerFrame) {
        let _ = frame;
    }
}

/// Builds layer frames from the visibility cache.
#[derive(Clone, Debug)]
pub struct LayerStack {
    enabled: LayerFlags,
    node_radius: f64,
    frames: Vec<LayerFrame>,
    last_unculled: Vec<NodeId>,
}

impl LayerStack {
    /// Create a stack; `node_radius` is the circle radius at the disk center.
    pub fn new(enabled: LayerFlags, node_radius: f64) -> Self {
        Self {
            enabled,
            node_radius,
            frames: Vec::new(),
            last_unculled: Vec::new(),
        }
    }

    /// Enabled layers.
    pub fn enabled(&self) -> LayerFlags {
        self.enabled
    }

    /// Enable or disable layers; takes effect on the next render.
    pub fn set_enabled(&mut self, enabled: LayerFlags) {
        self.enabled = enabled;
    }

    /// Frames built by the last render, in paint order.
    pub fn frames(&self) -> &[LayerFrame] {
        &self.frames
    }

    /// The last frame of one layer.
    pub fn frame(&self, kind: LayerKind) -> Option<&LayerFrame> {
        self.frames.iter().find(|f| f.kind() == kind)
    }

    /// Rebuild every enabled layer.
    ///
    /// Returns the hooks [`emit`](Self::emit) should run: `updates`, plus
    /// [`UpdateFlags::DATA`] when the unculled set changed.
    pub fn render<D: NodePayload>(
        &mut self,
        tree: &Tree<D>,
        cache: &VisibilityCache,
        paths: &PathRegistry,
        mut updates: UpdateFlags,
    ) -> UpdateFlags {
        if cache.unculled != self.last_unculled {
            updates |= UpdateFlags::DATA;
            self.last_unculled.clone_from(&cache.unculled);
        }
        self.frames = LayerKind::ALL
            .into_iter()
            .filter(|k| self.enabled.contains(k.flag()))
            .map(|k| self.build(k, tree, cache, paths))
            .collect();
        updates
    }

    /// Hand the last frames to `sink`, layer by layer.
    pub fn emit(&self, sink: &mut dyn RenderSink, updates: UpdateFlags) {
        for frame in &self.frames {
            if updates.contains(UpdateFlags::PARENT) {
                sink.update_parent(frame.kind());
            }
            if updates.contains(UpdateFlags::DATA) {
                sink.update_data(frame);
            }
            if updates.contains(UpdateFlags::TRANSFORMATION) {
                sink.update_transformation(frame);
            }
            if updates.contains(UpdateFlags::STYLE) {
                sink.update_style(frame);
            }
        }
    }

    /// Forget the last unculled set so the next render reports new data.
    pub fn reset(&mut self) {
        self.frames.clear();
        self.last_unculled.clear();
    }

    fn build<D: NodePayload>(
        &self,
        kind: LayerKind,
        tree: &Tree<D>,
        cache: &VisibilityCache,
        paths: &PathRegistry,
    ) -> LayerFrame {
        let color = |id: NodeId| paths.color_of(tree, id).unwrap_or(Color::NODE);
        match kind {
            LayerKind::Cells => LayerFrame::Cells(
                cache
                    .tessellation
                    .sites()
                    .iter()
                    .map(|&(node, site)| CellSite {
                        node,
                        site: site.into(),
                    })
                    .collect(),
            ),
            LayerKind::Links => {
                LayerFrame::Links(cache.links.iter().filter_map(|&id| link(tree, id, color)).collect())
            }
            LayerKind::PathLinks => LayerFrame::PathLinks(
                cache
                    .path_links
                    .iter()
                    .filter_map(|&id| link(tree, id, color))
                    .collect(),
            ),
            LayerKind::Nodes => LayerFrame::Nodes(
                cache
                    .leaf_or_lazy
                    .iter()
                    .filter_map(|&id| {
                        let c = tree.cache(id)?;
                        Some(NodeDot {
                            node: id,
                            circle: Circle::new(c.z, c.dist_scale * self.node_radius),
                            transform: c.transform.clone(),
                            lazy: !tree.is_leaf(id),
                            color: color(id),
                        })
                    })
                    .collect(),
            ),
            LayerKind::Labels => LayerFrame::Labels(
                cache
                    .labels
                    .iter()
                    .filter_map(|&id| {
                        let c = tree.cache(id)?;
                        Some(LabelItem {
                            node: id,
                            text: tree.label(id)?.to_owned(),
                            anchor: c.z.into(),
                            transform: c.transform.clone(),
                        })
                    })
                    .collect(),
            ),
        }
    }
}

fn link<D>(tree: &Tree<D>, id: NodeId, color: impl Fn(NodeId) -> Color) -> Option<LinkArc> {
    let parent = tree.parent_of(id)?;
    let node = tree.cache(id)?;
    let parent_cache = tree.cache(parent)?;
    // A parent the filter did not write this cycle has a stale position.
    if parent_cache.cycle != node.cycle {
        log::debug!("skipping link of {id:?}: parent {parent:?} not visited this cycle");
        return None;
    }
    let from: Complex = parent_cache.z;
    let to: Complex = node.z;
    Some(LinkArc {
        node: id,
        parent,
        from: from.into(),
        to: to.into(),
        arc: arc_center(from, to),
        width: tree.precalc(id).map_or(0.0, |p| p.weight_scale),
        color: color(id),
    })
}

#[cfg(test)]
mod tests {
    use hypertree_filter::{FilterConfig, MagicFilter, leaf_or_lazy};
    use hypertree_layout::{LayoutConfig, LayoutMode, layout_berge};
    use hypertree_math::{
        Complex, HyperbolicTransform, Mobius, TransformState, Transformation,
    };
    use hypertree_tree::{Generation, SourceNode, Tree};

    use super::{LayerFlags, LayerFrame, LayerKind, LayerStack, RenderSink, UpdateFlags};
    use crate::{LabelMap, PathKind, PathRegistry};

    #[derive(Default)]
    struct Recorder(Vec<(&'static str, LayerKind, usize)>);

    impl RenderSink for Recorder {
        fn update_parent(&mut self, kind: LayerKind) {
            self.0.push(("parent", kind, 0));
        }
        fn update_data(&mut self, frame: &LayerFrame) {
            self.0.push(("data", frame.kind(), frame.len()));
        }
        fn update_transformation(&mut self, frame: &LayerFrame) {
            self.0.push(("transformation", frame.kind(), frame.len()));
        }
        fn update_style(&mut self, frame: &LayerFrame) {
            self.0.push(("style", frame.kind(), frame.len()));
        }
    }

    fn laid_out() -> Tree<String> {
        let leaves = (0..4).map(|i| SourceNode::leaf(format!("leaf {i}"))).collect();
        let mut tree = Tree::from_source(
            SourceNode::with_children("root".to_owned(), leaves),
            Generation(1),
        );
        let labels: LabelMap = tree
            .ids()
            .filter_map(|id| tree.data(id).map(|d| (d.clone(), d.to_uppercase())))
            .collect();
        tree.apply_labels(|k| labels.get(k).map(String::as_str));
        tree.compute_precalc();
        let root = tree.root().unwrap();
        layout_berge(&mut tree, root, 0.3, &LayoutConfig::default(), LayoutMode::Recursive);
        tree
    }

    #[test]
    fn frames_follow_the_cache() {
        let mut tree = laid_out();
        let transform = HyperbolicTransform::new(TransformState::default());
        let mut filter = MagicFilter::new(FilterConfig::default());
        filter.update(&mut tree, &transform, 0.3, &[], &[], leaf_or_lazy);
        let mut stack = LayerStack::new(LayerFlags::all(), 0.05);
        stack.render(&tree, filter.cache(), &PathRegistry::new(), UpdateFlags::empty());

        let kinds: Vec<LayerKind> = stack.frames().iter().map(LayerFrame::kind).collect();
        assert_eq!(kinds, LayerKind::ALL.to_vec(), "paint order is fixed");
        assert_eq!(stack.frame(LayerKind::Links).unwrap().len(), 4);
        assert_eq!(stack.frame(LayerKind::Cells).unwrap().len(), 5);
        assert!(stack.frame(LayerKind::PathLinks).unwrap().is_empty());
        let Some(LayerFrame::Nodes(dots)) = stack.frame(LayerKind::Nodes) else {
            panic!("nodes layer is enabled");
        };
        assert_eq!(dots.len(), 4, "only leaves get circles");
        assert!(dots.iter().all(|d| d.circle.radius < 0.05 && !d.lazy));
    }

    #[test]
    fn hooks_run_in_order_and_data_is_detected() {
        let mut tree = laid_out();
        let transform = HyperbolicTransform::new(TransformState::default());
        let mut filter = MagicFilter::new(FilterConfig::default());
        filter.update(&mut tree, &transform, 0.3, &[], &[], leaf_or_lazy);
        let mut stack = LayerStack::new(LayerFlags::NODES | LayerFlags::LABELS, 0.05);
        let paths = PathRegistry::new();
        let mut sink = Recorder::default();

        let ran = stack.render(
            &tree,
            filter.cache(),
            &paths,
            UpdateFlags::PARENT | UpdateFlags::TRANSFORMATION,
        );
        stack.emit(&mut sink, ran);
        assert_eq!(ran, UpdateFlags::PARENT | UpdateFlags::DATA | UpdateFlags::TRANSFORMATION);
        let hooks: Vec<&str> = sink.0.iter().map(|e| e.0).collect();
        assert_eq!(
            hooks,
            ["parent", "data", "transformation", "parent", "data", "transformation"]
        );
        assert_eq!(sink.0[0].1, LayerKind::Nodes);
        assert_eq!(sink.0[3].1, LayerKind::Labels);

        // Same set again: only the requested hook.
        sink.0.clear();
        let ran = stack.render(&tree, filter.cache(), &paths, UpdateFlags::TRANSFORMATION);
        stack.emit(&mut sink, ran);
        assert_eq!(ran, UpdateFlags::TRANSFORMATION);
        assert_eq!(sink.0.len(), 2);
    }

    #[test]
    fn path_links_take_the_path_color() {
        let mut tree = laid_out();
        let mut paths = PathRegistry::new();
        let leaf = tree.find(|_, d| d == "leaf 2").unwrap();
        let id = paths.add(&mut tree, PathKind::Query, leaf, None).unwrap();
        let transform = HyperbolicTransform::new(TransformState::default());
        let mut filter = MagicFilter::new(FilterConfig::default());
        filter.update(&mut tree, &transform, 0.3, &paths.heads(), &[], leaf_or_lazy);
        let mut stack = LayerStack::new(LayerFlags::default(), 0.05);
        stack.render(&tree, filter.cache(), &paths, UpdateFlags::STYLE);

        let Some(LayerFrame::PathLinks(links)) = stack.frame(LayerKind::PathLinks) else {
            panic!("path links layer is enabled");
        };
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].node, leaf);
        assert_eq!(links[0].color, paths.get(id).unwrap().color);
        assert!(stack.frame(LayerKind::Cells).is_none(), "cells are off by default");
    }

    fn binary(depth: u32) -> SourceNode<()> {
        if depth == 0 {
            return SourceNode::leaf(());
        }
        SourceNode::with_children((), vec![binary(depth - 1), binary(depth - 1)])
    }

    #[test]
    fn links_start_at_fresh_parent_positions() {
        let lambda = 0.5;
        let mut tree = Tree::from_source(binary(8), Generation(1));
        tree.compute_precalc();
        let root = tree.root().unwrap();
        layout_berge(&mut tree, root, lambda, &LayoutConfig::default(), LayoutMode::Recursive);
        let deep = tree.iter_depth_first(root).find(|&id| tree.is_leaf(id)).unwrap();
        let mut state = TransformState::new(Complex::ZERO, Complex::ONE, lambda);
        state.set_mobius(Mobius::translation(tree.layout(deep).unwrap().z).inverse());
        let transform = HyperbolicTransform::new(state);

        let mut filter = MagicFilter::new(FilterConfig::default());
        filter.update(&mut tree, &transform, lambda, &[], &[], leaf_or_lazy);
        let top = filter.cache().highway[0];
        assert_ne!(top, root);
        let mut stack = LayerStack::new(LayerFlags::LINKS, 0.05);
        stack.render(&tree, filter.cache(), &PathRegistry::new(), UpdateFlags::empty());
        let Some(LayerFrame::Links(links)) = stack.frame(LayerKind::Links) else {
            panic!("links layer is enabled");
        };
        assert_eq!(links.len(), filter.cache().links.len());
        for link in links {
            let expected = transform.transform_point(tree.layout(link.parent).unwrap().z);
            assert!(Complex::from(link.from).distance(expected) < 1e-9);
        }

        // A parent left over from an earlier cycle gets no edge.
        let parent = tree.parent_of(top).unwrap();
        tree.cache_mut(parent).unwrap().cycle = 0;
        stack.render(&tree, filter.cache(), &PathRegistry::new(), UpdateFlags::empty());
        let Some(LayerFrame::Links(links)) = stack.frame(LayerKind::Links) else {
            panic!("links layer is enabled");
        };
        assert_eq!(links.len(), filter.cache().links.len() - 1);
        assert!(links.iter().all(|l| l.node != top));
    }
}
