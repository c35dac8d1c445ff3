use serde::{Deserialize, Serialize};

/// Atlas and rendering configuration.
///
/// Missing fields fall back to the defaults below when deserialized, so a
/// config file only needs the keys it wants to change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackerConfig {
    /// Atlas width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Atlas height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
    /// Pixels reserved around each sprite, split evenly between its sides.
    #[serde(default)]
    pub padding: u32,
    /// Outline every partition node on the rendered atlas.
    #[serde(default)]
    pub debug_overlay: bool,
    /// RGBA fill for pixels not covered by a sprite.
    #[serde(default = "default_background")]
    pub background: [u8; 4],
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            padding: 0,
            debug_overlay: false,
            background: default_background(),
        }
    }
}

impl PackerConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - Dimensions are zero
    /// - Padding alone would not fit inside the atlas
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::SpritePackError;

        if self.width == 0 || self.height == 0 {
            return Err(SpritePackError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        if self.padding >= self.width || self.padding >= self.height {
            return Err(SpritePackError::InvalidConfig(format!(
                "padding ({}) leaves no usable space in a {}x{} atlas",
                self.padding, self.width, self.height
            )));
        }

        Ok(())
    }
}

fn default_width() -> u32 {
    1024
}
fn default_height() -> u32 {
    1024
}
fn default_background() -> [u8; 4] {
    [255, 255, 255, 255]
}

/// Builder for `PackerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackerConfigBuilder {
    cfg: PackerConfig,
}

impl PackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackerConfig::default(),
        }
    }
    pub fn with_dimensions(mut self, w: u32, h: u32) -> Self {
        self.cfg.width = w;
        self.cfg.height = h;
        self
    }
    pub fn padding(mut self, v: u32) -> Self {
        self.cfg.padding = v;
        self
    }
    pub fn debug_overlay(mut self, v: bool) -> Self {
        self.cfg.debug_overlay = v;
        self
    }
    pub fn background(mut self, rgba: [u8; 4]) -> Self {
        self.cfg.background = rgba;
        self
    }
    pub fn build(self) -> PackerConfig {
        self.cfg
    }
}

impl PackerConfig {
    /// Create a fluent builder for `PackerConfig`.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }
}
