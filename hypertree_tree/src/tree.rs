// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, side tables, traversal.

use smallvec::SmallVec;

use crate::types::{Generation, NodeCache, NodeLayout, NodeId, PathId, Precalc, SourceNode};

/// Structural record of one node.
#[derive(Clone, Debug)]
pub(crate) struct Node<D> {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) depth: u32,
    pub(crate) height: u32,
    pub(crate) data: D,
}

/// Arena of nodes for one dataset.
///
/// Nodes are addressed by [`NodeId`] and never removed individually; loading
/// a new dataset builds a new tree with a new [`Generation`]. Mutable node
/// state lives in parallel side tables ([`Precalc`], [`NodeLayout`],
/// [`NodeCache`], path membership) so the layout pass can write positions
/// while the filter writes the transform cache without borrowing the
/// structure mutably.
///
/// Parents are always inserted before their children, so arena order is a
/// valid pre-order for top-down passes and reverse arena order a valid
/// post-order for bottom-up aggregation.
///
/// ## Example
///
/// ```rust
/// use hypertree_tree::{Generation, SourceNode, Tree};
///
/// let source = SourceNode::with_children(
///     "root",
///     vec![SourceNode::leaf("a"), SourceNode::leaf("b")],
/// );
/// let mut tree = Tree::from_source(source, Generation(1));
/// tree.compute_precalc();
///
/// let root = tree.root().unwrap();
/// assert_eq!(tree.children_of(root).len(), 2);
/// assert_eq!(tree.precalc(root).unwrap().culling_weight, 2.0);
/// ```
pub struct Tree<D> {
    generation: Generation,
    pub(crate) nodes: Vec<Node<D>>,
    pub(crate) precalc: Vec<Precalc>,
    layout: Vec<NodeLayout>,
    cache: Vec<NodeCache>,
    paths: Vec<SmallVec<[PathId; 2]>>,
}

impl<D> core::fmt::Debug for Tree<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let leaves = self.nodes.iter().filter(|n| n.children.is_empty()).count();
        f.debug_struct("Tree")
            .field("generation", &self.generation)
            .field("nodes", &self.nodes.len())
            .field("leaves", &leaves)
            .finish_non_exhaustive()
    }
}

impl<D> Tree<D> {
    /// Create an empty tree for a dataset generation.
    pub fn new(generation: Generation) -> Self {
        Self {
            generation,
            nodes: Vec::new(),
            precalc: Vec::new(),
            layout: Vec::new(),
            cache: Vec::new(),
            paths: Vec::new(),
        }
    }

    /// Build a tree from nested loader output in one `O(n)` pass.
    pub fn from_source(source: SourceNode<D>, generation: Generation) -> Self {
        let mut tree = Self::new(generation);
        let mut stack = vec![(None, source)];
        while let Some((parent, node)) = stack.pop() {
            let SourceNode { data, children } = node;
            let id = tree.insert(parent, data);
            // Reversed so children are inserted, and thus listed, in source order.
            for child in children.into_iter().rev() {
                stack.push((Some(id), child));
            }
        }
        tree
    }

    /// Append a node under `parent` (or as the root if `None`).
    ///
    /// Only the first parentless node is the tree's [`root`](Self::root);
    /// a stale parent id inserts a detached node that no traversal reaches.
    pub fn insert(&mut self, parent: Option<NodeId>, data: D) -> NodeId {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId uses 32-bit indices by design."
        )]
        let id = NodeId::new(self.nodes.len() as u32, self.generation);
        let parent = parent.filter(|p| self.contains(*p));
        let depth = parent.map_or(0, |p| self.nodes[p.index()].depth + 1);
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            depth,
            height: 0,
            data,
        });
        self.precalc.push(Precalc::default());
        self.layout.push(NodeLayout::default());
        self.cache.push(NodeCache::default());
        self.paths.push(SmallVec::new());
        if let Some(p) = parent {
            self.nodes[p.index()].children.push(id);
            self.raise_heights(id);
        }
        id
    }

    fn raise_heights(&mut self, leaf: NodeId) {
        let mut height = 0;
        let mut current = self.nodes[leaf.index()].parent;
        while let Some(p) = current {
            height += 1;
            let node = &mut self.nodes[p.index()];
            if node.height >= height {
                break;
            }
            node.height = height;
            current = node.parent;
        }
    }

    /// The dataset generation of this tree.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The root node, if any.
    pub fn root(&self) -> Option<NodeId> {
        (!self.nodes.is_empty()).then(|| NodeId::new(0, self.generation))
    }

    /// Returns true if `id` belongs to this tree.
    pub fn contains(&self, id: NodeId) -> bool {
        id.1 == self.generation.0 && id.index() < self.nodes.len()
    }

    /// The node id at an arena position.
    pub fn id_at(&self, index: usize) -> Option<NodeId> {
        if index >= self.nodes.len() {
            return None;
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId uses 32-bit indices by design."
        )]
        let id = NodeId::new(index as u32, self.generation);
        Some(id)
    }

    /// Iterate all node ids in arena (pre-)order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).filter_map(|i| self.id_at(i))
    }

    /// Returns the parent of a node, or `None` for the root or foreign ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Get the children of a node, or an empty slice for foreign ids.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| &n.children)
    }

    /// Distance from the root (root is 0).
    pub fn depth(&self, id: NodeId) -> Option<u32> {
        self.node(id).map(|n| n.depth)
    }

    /// Longest distance to a leaf below (leaf is 0).
    pub fn height(&self, id: NodeId) -> Option<u32> {
        self.node(id).map(|n| n.height)
    }

    /// Whether the node has no children.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.children_of(id).is_empty()
    }

    /// Application payload of a node.
    pub fn data(&self, id: NodeId) -> Option<&D> {
        self.node(id).map(|n| &n.data)
    }

    /// Aggregates of a node.
    pub fn precalc(&self, id: NodeId) -> Option<&Precalc> {
        self.side(id).map(|i| &self.precalc[i])
    }

    /// Mutable aggregates of a node.
    pub fn precalc_mut(&mut self, id: NodeId) -> Option<&mut Precalc> {
        self.side(id).map(|i| &mut self.precalc[i])
    }

    /// Layout state of a node.
    pub fn layout(&self, id: NodeId) -> Option<&NodeLayout> {
        self.side(id).map(|i| &self.layout[i])
    }

    /// Mutable layout state of a node.
    pub fn layout_mut(&mut self, id: NodeId) -> Option<&mut NodeLayout> {
        self.side(id).map(|i| &mut self.layout[i])
    }

    /// Transform cache of a node.
    pub fn cache(&self, id: NodeId) -> Option<&NodeCache> {
        self.side(id).map(|i| &self.cache[i])
    }

    /// Mutable transform cache of a node.
    pub fn cache_mut(&mut self, id: NodeId) -> Option<&mut NodeCache> {
        self.side(id).map(|i| &mut self.cache[i])
    }

    /// Paths this node belongs to, oldest first.
    pub fn paths_of(&self, id: NodeId) -> &[PathId] {
        self.side(id).map_or(&[], |i| &self.paths[i])
    }

    /// Record that `id` is on `path`. Returns false if it already was.
    pub fn add_path_membership(&mut self, id: NodeId, path: PathId) -> bool {
        let Some(i) = self.side(id) else {
            return false;
        };
        if self.paths[i].contains(&path) {
            return false;
        }
        self.paths[i].push(path);
        true
    }

    /// Remove `path` from the membership of `id`. Returns false if it was not there.
    pub fn remove_path_membership(&mut self, id: NodeId, path: PathId) -> bool {
        let Some(i) = self.side(id) else {
            return false;
        };
        let before = self.paths[i].len();
        self.paths[i].retain(|p| *p != path);
        before != self.paths[i].len()
    }

    /// Iterate from `id` up to the root, starting with `id` itself.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_, D> {
        Ancestors {
            tree: self,
            next: self.contains(id).then_some(id),
        }
    }

    /// The chain from the root down to `id` (inclusive), or empty for foreign ids.
    pub fn path_from_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path: Vec<NodeId> = self.ancestors(id).collect();
        path.reverse();
        path
    }

    /// Whether `ancestor` is `id` or lies on the way from `id` to the root.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let Some(target_depth) = self.depth(ancestor) else {
            return false;
        };
        self.ancestors(id)
            .find(|a| self.nodes[a.index()].depth == target_depth)
            .is_some_and(|a| a == ancestor)
    }

    /// Depth-first pre-order iterator over the subtree at `start`.
    pub fn iter_depth_first(&self, start: NodeId) -> DepthFirst<'_, D> {
        DepthFirst {
            tree: self,
            stack: if self.contains(start) {
                vec![start]
            } else {
                Vec::new()
            },
        }
    }

    /// First node in depth-first order matching `pred`.
    pub fn find(&self, mut pred: impl FnMut(NodeId, &D) -> bool) -> Option<NodeId> {
        let root = self.root()?;
        self.iter_depth_first(root)
            .find(|&id| pred(id, &self.nodes[id.index()].data))
    }

    /// Get the next node in depth-first traversal order.
    ///
    /// Returns `None` at the end of the traversal or for foreign ids.
    pub fn next_depth_first(&self, current: NodeId) -> Option<NodeId> {
        if let Some(&first_child) = self.children_of(current).first() {
            return Some(first_child);
        }
        let mut node = current;
        while let Some(parent) = self.parent_of(node) {
            if let Some(next_sibling) = self.next_sibling(node) {
                return Some(next_sibling);
            }
            node = parent;
        }
        None
    }

    /// Get the previous node in depth-first traversal order.
    pub fn prev_depth_first(&self, current: NodeId) -> Option<NodeId> {
        if let Some(prev_sibling) = self.prev_sibling(current) {
            let mut node = prev_sibling;
            while let Some(&last) = self.children_of(node).last() {
                node = last;
            }
            return Some(node);
        }
        self.parent_of(current)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let siblings = self.children_of(self.parent_of(node)?);
        let pos = siblings.iter().position(|&id| id == node)?;
        siblings.get(pos + 1).copied()
    }

    fn prev_sibling(&self, node: NodeId) -> Option<NodeId> {
        let siblings = self.children_of(self.parent_of(node)?);
        let pos = siblings.iter().position(|&id| id == node)?;
        pos.checked_sub(1).and_then(|p| siblings.get(p).copied())
    }

    fn node(&self, id: NodeId) -> Option<&Node<D>> {
        self.side(id).map(|i| &self.nodes[i])
    }

    fn side(&self, id: NodeId) -> Option<usize> {
        self.contains(id).then(|| id.index())
    }
}

/// Iterator returned by [`Tree::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a, D> {
    tree: &'a Tree<D>,
    next: Option<NodeId>,
}

impl<D> Iterator for Ancestors<'_, D> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent_of(current);
        Some(current)
    }
}

/// Iterator returned by [`Tree::iter_depth_first`].
#[derive(Debug)]
pub struct DepthFirst<'a, D> {
    tree: &'a Tree<D>,
    stack: Vec<NodeId>,
}

impl<D> Iterator for DepthFirst<'_, D> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.tree.children_of(current).iter().rev().copied());
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root
    /// ├── a
    /// │   ├── a1
    /// │   └── a2
    /// └── b
    fn sample() -> (Tree<&'static str>, [NodeId; 5]) {
        let mut tree = Tree::new(Generation(3));
        let root = tree.insert(None, "root");
        let a = tree.insert(Some(root), "a");
        let a1 = tree.insert(Some(a), "a1");
        let a2 = tree.insert(Some(a), "a2");
        let b = tree.insert(Some(root), "b");
        (tree, [root, a, a1, a2, b])
    }

    #[test]
    fn structure_depth_and_height() {
        let (tree, [root, a, a1, _a2, b]) = sample();
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.root(), Some(root));
        assert_eq!(tree.parent_of(a1), Some(a));
        assert_eq!(tree.parent_of(root), None);
        assert_eq!(tree.depth(a1), Some(2));
        assert_eq!(tree.height(root), Some(2));
        assert_eq!(tree.height(a), Some(1));
        assert_eq!(tree.height(b), Some(0));
        assert!(tree.is_leaf(b));
    }

    #[test]
    fn from_source_keeps_child_order() {
        let source = SourceNode::with_children(
            "root",
            vec![
                SourceNode::with_children("a", vec![SourceNode::leaf("a1")]),
                SourceNode::leaf("b"),
            ],
        );
        let tree = Tree::from_source(source, Generation(1));
        let root = tree.root().unwrap();
        let names: Vec<&str> = tree
            .children_of(root)
            .iter()
            .map(|&c| *tree.data(c).unwrap())
            .collect();
        assert_eq!(names, ["a", "b"]);
        let order: Vec<&str> = tree
            .iter_depth_first(root)
            .map(|id| *tree.data(id).unwrap())
            .collect();
        assert_eq!(order, ["root", "a", "a1", "b"]);
    }

    #[test]
    fn depth_first_traversal() {
        let (tree, [root, a, a1, a2, b]) = sample();
        let forward: Vec<NodeId> =
            core::iter::successors(Some(root), |&n| tree.next_depth_first(n)).collect();
        assert_eq!(forward, [root, a, a1, a2, b]);
        let backward: Vec<NodeId> =
            core::iter::successors(Some(b), |&n| tree.prev_depth_first(n)).collect();
        assert_eq!(backward, [b, a2, a1, a, root]);
    }

    #[test]
    fn ancestors_and_path_from_root() {
        let (tree, [root, a, a1, _a2, b]) = sample();
        assert_eq!(tree.ancestors(a1).collect::<Vec<_>>(), [a1, a, root]);
        assert_eq!(tree.path_from_root(a1), [root, a, a1]);
        assert!(tree.is_ancestor_or_self(a, a1));
        assert!(tree.is_ancestor_or_self(a1, a1));
        assert!(!tree.is_ancestor_or_self(b, a1));
    }

    #[test]
    fn ids_from_other_generation_are_foreign() {
        let (tree, [root, ..]) = sample();
        let (other, _) = {
            let mut t = Tree::new(Generation(4));
            let r = t.insert(None, "x");
            (t, r)
        };
        let foreign = other.root().unwrap();
        assert_eq!(foreign.index(), root.index());
        assert!(!tree.contains(foreign), "generation differs");
        assert!(tree.children_of(foreign).is_empty());
        assert!(tree.layout(foreign).is_none());
        assert!(foreign.merge_id() > root.merge_id(), "merge ids increase per load");
    }

    #[test]
    fn path_membership() {
        let (mut tree, [_root, a, ..]) = sample();
        assert!(tree.add_path_membership(a, PathId(1)));
        assert!(!tree.add_path_membership(a, PathId(1)), "no duplicates");
        assert!(tree.add_path_membership(a, PathId(2)));
        assert_eq!(tree.paths_of(a), [PathId(1), PathId(2)]);
        assert!(tree.remove_path_membership(a, PathId(1)));
        assert!(!tree.remove_path_membership(a, PathId(1)));
        assert_eq!(tree.paths_of(a), [PathId(2)]);
    }

    #[test]
    fn find_by_payload() {
        let (tree, [_, _, _, a2, _]) = sample();
        assert_eq!(tree.find(|_, d| *d == "a2"), Some(a2));
        assert_eq!(tree.find(|_, d| *d == "zzz"), None);
    }
}
