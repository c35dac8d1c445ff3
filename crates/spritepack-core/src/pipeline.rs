use image::{DynamicImage, RgbaImage};
use tracing::{info, instrument};

use crate::config::PackerConfig;
use crate::error::Result;
use crate::model::Layout;
use crate::packer::Packer;
use crate::render::{RenderOptions, SpritePixels, render_atlas};

/// In-memory sprite to pack (key + decoded RGBA pixels).
#[derive(Debug, Clone)]
pub struct InputSprite {
    pub key: String,
    pub image: RgbaImage,
}

impl InputSprite {
    pub fn new(key: impl Into<String>, image: RgbaImage) -> Self {
        Self {
            key: key.into(),
            image,
        }
    }

    /// Converts any decoded image to RGBA8.
    pub fn from_dynamic(key: impl Into<String>, image: DynamicImage) -> Self {
        Self::new(key, image.to_rgba8())
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

impl SpritePixels for InputSprite {
    fn rgba(&self) -> &RgbaImage {
        &self.image
    }
}

/// Output of a packing run: the layout and the rendered atlas.
pub struct PackOutput {
    pub layout: Layout,
    pub rgba: RgbaImage,
}

impl PackOutput {
    /// Convenience method that delegates to `layout.stats()`.
    pub fn stats(&self) -> crate::model::PackStats {
        self.layout.stats()
    }
}

/// Packs `inputs` in the given order and renders the atlas.
///
/// Notes:
/// - An empty input yields a blank atlas.
/// - Fails with `NoSpace` naming the first sprite (by input index) that does not fit.
#[instrument(skip_all)]
pub fn pack_sprites(inputs: Vec<InputSprite>, cfg: &PackerConfig) -> Result<PackOutput> {
    let mut packer = Packer::from_config(cfg)?;
    for sprite in inputs {
        let (w, h) = sprite.dimensions();
        packer.add(sprite, w, h)?;
    }
    packer.pack()?;

    let layout = packer.layout(|s: &InputSprite| s.key.clone());
    let rgba = render_atlas(
        packer.tree(),
        &RenderOptions {
            background: cfg.background,
            debug_overlay: cfg.debug_overlay,
        },
    );
    info!(
        sprites = layout.placements.len(),
        width = cfg.width,
        height = cfg.height,
        "atlas rendered"
    );
    Ok(PackOutput { layout, rgba })
}
