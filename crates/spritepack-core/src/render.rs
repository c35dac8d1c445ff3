use image::{Rgba, RgbaImage};

use crate::packer::PartitionTree;

/// Outline colours for the debug overlay, picked by `depth % 3`.
pub const DEBUG_PALETTE: [Rgba<u8>; 3] = [
    Rgba([255, 0, 0, 255]),
    Rgba([0, 255, 0, 255]),
    Rgba([0, 0, 255, 255]),
];

/// Pixel source for a packed payload.
pub trait SpritePixels {
    fn rgba(&self) -> &RgbaImage;
}

impl SpritePixels for RgbaImage {
    fn rgba(&self) -> &RgbaImage {
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Fill colour for uncovered pixels.
    pub background: [u8; 4],
    /// Draw [`draw_debug_overlay`] after compositing.
    pub debug_overlay: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            background: [255, 255, 255, 255],
            debug_overlay: false,
        }
    }
}

/// Composites every placed payload onto a canvas the size of the atlas.
///
/// Nodes are visited in [`PartitionTree::walk`] order (right before bottom);
/// free nodes contribute nothing.
pub fn render_atlas<P: SpritePixels>(tree: &PartitionTree<P>, opts: &RenderOptions) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(tree.width(), tree.height(), Rgba(opts.background));
    for node in tree.placements() {
        let (Some(payload), Some(rect)) = (node.payload(), node.sprite_rect()) else {
            continue;
        };
        blit(payload.rgba(), &mut canvas, rect.x1, rect.y1, rect.width(), rect.height());
    }
    if opts.debug_overlay {
        draw_debug_overlay(&mut canvas, tree);
    }
    canvas
}

/// Copies the top-left `w`x`h` of `src` to `(dx, dy)`, clipped to both images.
fn blit(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32, w: u32, h: u32) {
    let (cw, ch) = canvas.dimensions();
    let w = w.min(src.width());
    let h = h.min(src.height());
    for yy in 0..h {
        for xx in 0..w {
            if dx + xx < cw && dy + yy < ch {
                canvas.put_pixel(dx + xx, dy + yy, *src.get_pixel(xx, yy));
            }
        }
    }
}

/// Draws a 1px outline around every node, free or occupied.
pub fn draw_debug_overlay<P>(canvas: &mut RgbaImage, tree: &PartitionTree<P>) {
    let (cw, ch) = canvas.dimensions();
    for node in tree.walk() {
        let b = node.bounds();
        if b.is_empty() {
            continue;
        }
        let color = DEBUG_PALETTE[(node.depth() % 3) as usize];
        let right = b.x2 - 1;
        let bottom = b.y2 - 1;
        for xx in b.x1..b.x2 {
            if xx < cw && b.y1 < ch {
                canvas.put_pixel(xx, b.y1, color);
            }
            if xx < cw && bottom < ch {
                canvas.put_pixel(xx, bottom, color);
            }
        }
        for yy in b.y1..b.y2 {
            if b.x1 < cw && yy < ch {
                canvas.put_pixel(b.x1, yy, color);
            }
            if right < cw && yy < ch {
                canvas.put_pixel(right, yy, color);
            }
        }
    }
}
