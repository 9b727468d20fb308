// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Highlight paths: hover, selections and query matches.

use hypertree_tree::{NodeId, PathId, Tree};

use crate::PathError;

/// An RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Nodes on no path.
    pub const NODE: Self = Self::rgb(0x4c, 0x4c, 0x4c);
    /// The hover path.
    pub const HOVER: Self = Self::rgb(0x21, 0x96, 0xf3);
    /// Selections.
    pub const SELECTION: Self = Self::rgb(0xff, 0x98, 0x00);
    /// Query matches.
    pub const QUERY: Self = Self::rgb(0x4c, 0xaf, 0x50);

    /// `#rrggbb` when opaque, `#rrggbbaa` otherwise.
    pub fn to_hex(self) -> String {
        if self.a == 0xff {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// What a path highlights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PathKind {
    /// Follows the hovered node.
    Hover,
    /// A node the user selected.
    Selection,
    /// A node matching the current query.
    Query,
}

impl PathKind {
    /// Default color of the kind.
    pub fn color(self) -> Color {
        match self {
            Self::Hover => Color::HOVER,
            Self::Selection => Color::SELECTION,
            Self::Query => Color::QUERY,
        }
    }
}

/// A highlighted chain from the root down to `head`.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    /// Identifier.
    pub id: PathId,
    /// Kind.
    pub kind: PathKind,
    /// Color of its nodes and links.
    pub color: Color,
    /// Lowest node of the chain.
    pub head: NodeId,
    /// Root first, ending with `head`.
    pub chain: Vec<NodeId>,
}

/// All active paths, with their membership recorded on the tree.
#[derive(Clone, Debug, Default)]
pub struct PathRegistry {
    paths: Vec<Path>,
    next_id: u32,
}

impl PathRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether there are no paths.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Paths in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter()
    }

    /// Look up a path.
    pub fn get(&self, id: PathId) -> Option<&Path> {
        self.paths.iter().find(|p| p.id == id)
    }

    /// Paths of one kind.
    pub fn of_kind(&self, kind: PathKind) -> impl Iterator<Item = &Path> {
        self.paths.iter().filter(move |p| p.kind == kind)
    }

    /// Heads of every path, for the filter's path preservation.
    pub fn heads(&self) -> Vec<NodeId> {
        self.paths.iter().map(|p| p.head).collect()
    }

    /// Add a path ending at `head`.
    pub fn add<D>(
        &mut self,
        tree: &mut Tree<D>,
        kind: PathKind,
        head: NodeId,
        color: Option<Color>,
    ) -> Result<PathId, PathError> {
        if !tree.contains(head) {
            return Err(PathError::ForeignNode(head));
        }
        let id = PathId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let chain = tree.path_from_root(head);
        for &n in &chain {
            tree.add_path_membership(n, id);
        }
        log::debug!("path {} ({kind:?}) added at {head:?}", id.0);
        self.paths.push(Path {
            id,
            kind,
            color: color.unwrap_or_else(|| kind.color()),
            head,
            chain,
        });
        Ok(id)
    }

    /// Remove a path and its membership.
    pub fn remove<D>(&mut self, tree: &mut Tree<D>, id: PathId) -> Result<Path, PathError> {
        let Some(pos) = self.paths.iter().position(|p| p.id == id) else {
            log::warn!("removing unknown path {}", id.0);
            return Err(PathError::Unknown(id));
        };
        let path = self.paths.remove(pos);
        for &n in &path.chain {
            tree.remove_path_membership(n, id);
        }
        log::debug!("path {} removed", id.0);
        Ok(path)
    }

    /// Move the head of a path, rewriting its membership.
    pub fn set_head<D>(
        &mut self,
        tree: &mut Tree<D>,
        id: PathId,
        head: NodeId,
    ) -> Result<(), PathError> {
        if !tree.contains(head) {
            return Err(PathError::ForeignNode(head));
        }
        let Some(path) = self.paths.iter_mut().find(|p| p.id == id) else {
            log::warn!("moving unknown path {}", id.0);
            return Err(PathError::Unknown(id));
        };
        for &n in &path.chain {
            tree.remove_path_membership(n, id);
        }
        path.head = head;
        path.chain = tree.path_from_root(head);
        for &n in &path.chain {
            tree.add_path_membership(n, id);
        }
        Ok(())
    }

    /// Remove every path of `kind`; returns how many were removed.
    pub fn remove_kind<D>(&mut self, tree: &mut Tree<D>, kind: PathKind) -> usize {
        let ids: Vec<PathId> = self.of_kind(kind).map(|p| p.id).collect();
        ids.iter()
            .filter(|&&id| self.remove(tree, id).is_ok())
            .count()
    }

    /// Forget every path without touching a tree, e.g. when it was replaced.
    pub fn clear(&mut self) {
        self.paths.clear();
    }

    /// Color of `node`: the most recently added path it is on, if any.
    pub fn color_of<D>(&self, tree: &Tree<D>, node: NodeId) -> Option<Color> {
        let last = *tree.paths_of(node).last()?;
        self.get(last).map(|p| p.color)
    }
}

#[cfg(test)]
mod tests {
    use hypertree_tree::{Generation, PathId, SourceNode, Tree};

    use super::{Color, PathKind, PathRegistry};
    use crate::PathError;

    fn chain_tree() -> Tree<&'static str> {
        Tree::from_source(
            SourceNode::with_children(
                "r",
                vec![
                    SourceNode::with_children("a", vec![SourceNode::leaf("a1")]),
                    SourceNode::leaf("b"),
                ],
            ),
            Generation(1),
        )
    }

    #[test]
    fn membership_follows_the_chain() {
        let mut tree = chain_tree();
        let mut paths = PathRegistry::new();
        let a1 = tree.find(|_, d| *d == "a1").unwrap();
        let b = tree.find(|_, d| *d == "b").unwrap();
        let root = tree.root().unwrap();

        let id = paths.add(&mut tree, PathKind::Selection, a1, None).unwrap();
        assert_eq!(paths.get(id).unwrap().chain.len(), 3);
        assert_eq!(tree.paths_of(root), &[id]);
        assert!(tree.paths_of(b).is_empty());
        assert_eq!(paths.color_of(&tree, a1), Some(Color::SELECTION));

        paths.set_head(&mut tree, id, b).unwrap();
        assert!(tree.paths_of(a1).is_empty());
        assert_eq!(tree.paths_of(b), &[id]);
        assert_eq!(paths.heads(), vec![b]);

        paths.remove(&mut tree, id).unwrap();
        assert!(tree.paths_of(root).is_empty());
        assert!(paths.is_empty());
    }

    #[test]
    fn newest_path_colors_shared_nodes() {
        let mut tree = chain_tree();
        let mut paths = PathRegistry::new();
        let a1 = tree.find(|_, d| *d == "a1").unwrap();
        let b = tree.find(|_, d| *d == "b").unwrap();
        paths.add(&mut tree, PathKind::Selection, a1, None).unwrap();
        paths.add(&mut tree, PathKind::Query, b, None).unwrap();
        assert_eq!(paths.color_of(&tree, tree.root().unwrap()), Some(Color::QUERY));
        assert_eq!(paths.color_of(&tree, a1), Some(Color::SELECTION));
        assert_eq!(paths.remove_kind(&mut tree, PathKind::Query), 1);
        assert_eq!(paths.color_of(&tree, tree.root().unwrap()), Some(Color::SELECTION));
    }

    #[test]
    fn unknown_ids_are_errors() {
        let mut tree = chain_tree();
        let mut paths = PathRegistry::new();
        assert_eq!(
            paths.remove(&mut tree, PathId(9)).unwrap_err(),
            PathError::Unknown(PathId(9))
        );
        let other = Tree::from_source(SourceNode::leaf("x"), Generation(2));
        let foreign = other.root().unwrap();
        assert_eq!(
            paths.add(&mut tree, PathKind::Hover, foreign, None).unwrap_err(),
            PathError::ForeignNode(foreign)
        );
    }

    #[test]
    fn hex_colors() {
        assert_eq!(Color::HOVER.to_hex(), "#2196f3");
        assert_eq!(Color { a: 0x80, ..Color::NODE }.to_hex(), "#4c4c4c80");
    }
}
