use tracing::{debug, trace, warn};

use super::node::{NodeId, PartitionNode, PartitionTree};
use crate::config::PackerConfig;
use crate::error::{Result, SpritePackError};
use crate::model::Layout;

struct PendingItem<P> {
    /// Position in insertion order, reported back on failure.
    index: usize,
    width: u32,
    height: u32,
    payload: P,
}

/// Greedy guillotine packer over a single fixed-size atlas.
///
/// Items are sorted tallest first (stable), then each goes into the first free
/// node that fits, searching the "right" candidates before the "bottom" ones.
/// A packer is single-use: `pack` runs once and later calls fail with
/// [`SpritePackError::AlreadyPacked`].
pub struct Packer<P> {
    tree: PartitionTree<P>,
    pending: Vec<PendingItem<P>>,
    next_index: usize,
    packed: bool,
}

impl<P> Packer<P> {
    pub fn new(width: u32, height: u32, padding: u32) -> Self {
        Self {
            tree: PartitionTree::new(width, height, padding),
            pending: Vec::new(),
            next_index: 0,
            packed: false,
        }
    }

    /// Creates a packer from a validated configuration.
    pub fn from_config(cfg: &PackerConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self::new(cfg.width, cfg.height, cfg.padding))
    }

    pub fn width(&self) -> u32 {
        self.tree.width()
    }

    pub fn height(&self) -> u32 {
        self.tree.height()
    }

    pub fn padding(&self) -> u32 {
        self.tree.padding()
    }

    /// Number of items waiting for `pack`.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_packed(&self) -> bool {
        self.packed
    }

    /// Queues `payload` with its unpadded size. Sizes are only checked by `pack`.
    ///
    /// Fails with [`SpritePackError::AlreadyPacked`] once `pack` has run; the
    /// item is not queued.
    pub fn add(&mut self, payload: P, width: u32, height: u32) -> Result<()> {
        if self.packed {
            warn!(width, height, "item added after pack; rejected");
            return Err(SpritePackError::AlreadyPacked);
        }
        self.pending.push(PendingItem {
            index: self.next_index,
            width,
            height,
            payload,
        });
        self.next_index += 1;
        Ok(())
    }

    /// Places every queued item.
    ///
    /// On [`SpritePackError::NoSpace`] the items placed before the failing one
    /// stay in the tree; nothing is rolled back.
    pub fn pack(&mut self) -> Result<()> {
        if self.packed {
            return Err(SpritePackError::AlreadyPacked);
        }
        self.packed = true;

        let mut items = std::mem::take(&mut self.pending);
        // Vec::sort_by is stable: equal heights keep insertion order.
        items.sort_by(|a, b| b.height.cmp(&a.height));

        let padding = self.tree.padding();
        debug!(
            items = items.len(),
            width = self.width(),
            height = self.height(),
            padding,
            "packing"
        );

        let mut right_candidates = vec![NodeId::ROOT];
        let mut bottom_candidates: Vec<NodeId> = Vec::new();

        for item in items {
            // An effective size that overflows u32 cannot fit any node.
            let effective = item
                .width
                .checked_add(padding)
                .zip(item.height.checked_add(padding));
            let slot = effective.and_then(|(w, h)| {
                if let Some(pos) = first_fit(&self.tree, &right_candidates, w, h) {
                    Some((right_candidates.remove(pos), w, h))
                } else {
                    first_fit(&self.tree, &bottom_candidates, w, h)
                        .map(|pos| (bottom_candidates.remove(pos), w, h))
                }
            });
            let Some((id, w, h)) = slot else {
                debug!(
                    index = item.index,
                    width = item.width,
                    height = item.height,
                    "no free node fits"
                );
                return Err(SpritePackError::NoSpace {
                    index: item.index,
                    width: item.width,
                    height: item.height,
                });
            };

            let (right, bottom) = self.tree.insert(id, item.payload, w, h)?;
            right_candidates.push(right);
            bottom_candidates.push(bottom);

            let node = &self.tree.nodes()[id.index()];
            trace!(
                index = item.index,
                x = node.x(),
                y = node.y(),
                w,
                h,
                depth = node.depth(),
                "placed"
            );
        }

        debug!(nodes = self.tree.len(), "packing finished");
        Ok(())
    }

    pub fn tree(&self) -> &PartitionTree<P> {
        &self.tree
    }

    pub fn root(&self) -> &PartitionNode<P> {
        self.tree.root()
    }

    pub fn into_tree(self) -> PartitionTree<P> {
        self.tree
    }

    /// Serializable layout of everything placed so far.
    pub fn layout<K>(&self, key: impl FnMut(&P) -> K) -> Layout<K> {
        self.tree.layout(key)
    }
}

fn first_fit<P>(tree: &PartitionTree<P>, candidates: &[NodeId], w: u32, h: u32) -> Option<usize> {
    candidates
        .iter()
        .position(|&id| tree.get(id).is_some_and(|node| node.fits(w, h)))
}
