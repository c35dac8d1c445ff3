//! Partition tree: an arena of rectangular nodes that split as content is placed.
//!
//! Placing content of `cw`x`ch` into a free node cuts the remainder twice:
//!
//! ```text
//! +---------+--------------+
//! | content |    right     |   right:  x1+cw..x2, y1..y1+ch
//! +---------+--------------+
//! |                        |
//! |         bottom         |   bottom: x1..x2,    y1+ch..y2
//! |                        |
//! +------------------------+
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpritePackError};
use crate::model::{Bounds, Layout, Meta, Placement};

/// Stable handle of a node inside its [`PartitionTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    /// The root always occupies the first arena slot.
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// Payload stored in an occupied node, with the effective (padded) size it consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content<P> {
    pub payload: P,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeState<P> {
    Free,
    /// Occupied by `content`; the remainder belongs to the two children.
    Split {
        content: Content<P>,
        right: NodeId,
        bottom: NodeId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionNode<P> {
    id: NodeId,
    bounds: Bounds,
    depth: u32,
    padding: u32,
    parent: Option<NodeId>,
    state: NodeState<P>,
}

impl<P> PartitionNode<P> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn width(&self) -> u32 {
        self.bounds.width()
    }

    pub fn height(&self) -> u32 {
        self.bounds.height()
    }

    /// Placed origin x, inset by half the padding.
    pub fn x(&self) -> u32 {
        self.bounds.x1 + self.padding / 2
    }

    /// Placed origin y, inset by half the padding.
    pub fn y(&self) -> u32 {
        self.bounds.y1 + self.padding / 2
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn padding(&self) -> u32 {
        self.padding
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn state(&self) -> &NodeState<P> {
        &self.state
    }

    pub fn is_free(&self) -> bool {
        matches!(self.state, NodeState::Free)
    }

    pub fn is_split(&self) -> bool {
        matches!(self.state, NodeState::Split { .. })
    }

    pub fn content(&self) -> Option<&Content<P>> {
        match &self.state {
            NodeState::Split { content, .. } => Some(content),
            NodeState::Free => None,
        }
    }

    pub fn payload(&self) -> Option<&P> {
        self.content().map(|c| &c.payload)
    }

    pub fn right(&self) -> Option<NodeId> {
        match self.state {
            NodeState::Split { right, .. } => Some(right),
            NodeState::Free => None,
        }
    }

    pub fn bottom(&self) -> Option<NodeId> {
        match self.state {
            NodeState::Split { bottom, .. } => Some(bottom),
            NodeState::Free => None,
        }
    }

    /// Region reserved by the content, padding included.
    pub fn slot(&self) -> Option<Bounds> {
        self.content()
            .map(|c| Bounds::from_size(self.bounds.x1, self.bounds.y1, c.width, c.height))
    }

    /// Pixels actually covered by the sprite: the slot minus padding, at the placed origin.
    pub fn sprite_rect(&self) -> Option<Bounds> {
        self.content().map(|c| {
            Bounds::from_size(
                self.x(),
                self.y(),
                c.width.saturating_sub(self.padding),
                c.height.saturating_sub(self.padding),
            )
        })
    }

    pub fn fits(&self, width: u32, height: u32) -> bool {
        width <= self.width() && height <= self.height()
    }
}

/// Arena owning every node of one atlas. Children are only ever appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionTree<P> {
    nodes: Vec<PartitionNode<P>>,
    padding: u32,
}

impl<P> PartitionTree<P> {
    pub fn new(width: u32, height: u32, padding: u32) -> Self {
        let root = PartitionNode {
            id: NodeId::ROOT,
            bounds: Bounds::new(0, 0, width, height),
            depth: 0,
            padding,
            parent: None,
            state: NodeState::Free,
        };
        Self {
            nodes: vec![root],
            padding,
        }
    }

    pub fn root(&self) -> &PartitionNode<P> {
        &self.nodes[NodeId::ROOT.0]
    }

    pub fn width(&self) -> u32 {
        self.root().width()
    }

    pub fn height(&self) -> u32 {
        self.root().height()
    }

    pub fn padding(&self) -> u32 {
        self.padding
    }

    /// Number of nodes, free and split.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&PartitionNode<P>> {
        self.nodes.get(id.0)
    }

    pub fn node(&self, id: NodeId) -> Result<&PartitionNode<P>> {
        self.get(id).ok_or(SpritePackError::UnknownNode(id.0))
    }

    /// Nodes in creation order.
    pub fn nodes(&self) -> &[PartitionNode<P>] {
        &self.nodes
    }

    /// Occupies the free node `id` with `payload`, consuming `width`x`height`
    /// (padding already included), and returns the new `(right, bottom)` children.
    pub fn insert(
        &mut self,
        id: NodeId,
        payload: P,
        width: u32,
        height: u32,
    ) -> Result<(NodeId, NodeId)> {
        if self.node(id)?.is_split() {
            return Err(SpritePackError::Occupied);
        }
        self.split(
            id,
            Content {
                payload,
                width,
                height,
            },
        )
    }

    /// Nodes never change shape once created.
    pub fn resize(&mut self, id: NodeId, _width: u32, _height: u32) -> Result<()> {
        self.node(id)?;
        Err(SpritePackError::Unsupported("resize"))
    }

    /// Stores `content` in node `id` and cuts the remainder into `right` and
    /// `bottom` children. A node splits at most once.
    ///
    /// Errors: `AlreadySplit` for a split node, `ContentTooLarge` when the
    /// content exceeds the node. The tree is unchanged on error.
    pub fn split(&mut self, id: NodeId, content: Content<P>) -> Result<(NodeId, NodeId)> {
        let node = self.node(id)?;
        if node.is_split() {
            return Err(SpritePackError::AlreadySplit);
        }
        if !node.fits(content.width, content.height) {
            return Err(SpritePackError::ContentTooLarge {
                width: content.width,
                height: content.height,
                node_width: node.width(),
                node_height: node.height(),
            });
        }
        let b = node.bounds;
        let depth = node.depth + 1;
        let right = self.push_child(
            id,
            depth,
            Bounds::new(b.x1 + content.width, b.y1, b.x2, b.y1 + content.height),
        );
        let bottom = self.push_child(
            id,
            depth,
            Bounds::new(b.x1, b.y1 + content.height, b.x2, b.y2),
        );
        self.nodes[id.0].state = NodeState::Split {
            content,
            right,
            bottom,
        };
        Ok((right, bottom))
    }

    fn push_child(&mut self, parent: NodeId, depth: u32, bounds: Bounds) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(PartitionNode {
            id,
            bounds,
            depth,
            padding: self.padding,
            parent: Some(parent),
            state: NodeState::Free,
        });
        id
    }

    /// Depth-first walk from the root: a node, then its right subtree, then its bottom subtree.
    pub fn walk(&self) -> Walk<'_, P> {
        Walk {
            tree: self,
            stack: vec![NodeId::ROOT],
        }
    }

    /// Occupied nodes in walk order.
    pub fn placements(&self) -> impl Iterator<Item = &PartitionNode<P>> {
        self.walk().filter(|n| n.is_split())
    }

    /// Builds the serializable layout, naming each payload with `key`.
    pub fn layout<K>(&self, mut key: impl FnMut(&P) -> K) -> Layout<K> {
        let placements = self
            .placements()
            .filter_map(|node| {
                let content = node.content()?;
                let rect = node.sprite_rect()?;
                Some(Placement {
                    key: key(&content.payload),
                    x: rect.x1,
                    y: rect.y1,
                    w: rect.width(),
                    h: rect.height(),
                    depth: node.depth(),
                })
            })
            .collect();
        Layout {
            meta: Meta::new(self.width(), self.height(), self.padding),
            placements,
        }
    }
}

/// Iterator returned by [`PartitionTree::walk`].
pub struct Walk<'a, P> {
    tree: &'a PartitionTree<P>,
    stack: Vec<NodeId>,
}

impl<'a, P> Iterator for Walk<'a, P> {
    type Item = &'a PartitionNode<P>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = &self.tree.nodes[id.0];
        if let NodeState::Split { right, bottom, .. } = node.state {
            // LIFO: push bottom first so right is visited first
            self.stack.push(bottom);
            self.stack.push(right);
        }
        Some(node)
    }
}

impl<P> fmt::Display for PartitionTree<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.walk() {
            let indent = "  ".repeat(node.depth as usize);
            let b = node.bounds;
            let marker = if node.is_split() { '-' } else { '*' };
            writeln!(
                f,
                "{}{} l:{} ({}, {}) ({}, {})",
                indent, marker, node.depth, b.x1, b.y1, b.x2, b.y2
            )?;
        }
        Ok(())
    }
}
