use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (pixels) given by its corners.
///
/// `(x1, y1)` is the top-left corner and `(x2, y2)` the exclusive bottom-right
/// corner, so `width = x2 - x1` and `height = y2 - y1`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl Bounds {
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        debug_assert!(x1 <= x2 && y1 <= y2, "inverted bounds");
        Self { x1, y1, x2, y2 }
    }

    /// Rectangle of `w`x`h` anchored at `(x, y)`.
    pub fn from_size(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self::new(x, y, x + w, y + h)
    }

    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// True when the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.x1 == self.x2 || self.y1 == self.y2
    }

    /// Returns true if `other` lies fully inside `self`.
    pub fn contains(&self, other: &Bounds) -> bool {
        other.x1 >= self.x1 && other.y1 >= self.y1 && other.x2 <= self.x2 && other.y2 <= self.y2
    }

    /// Returns true if the two rectangles share at least one pixel.
    /// Empty rectangles never intersect anything.
    pub fn intersects(&self, other: &Bounds) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x1 < other.x2 && other.x1 < self.x2 && self.y1 < other.y2 && other.y1 < self.y2
    }
}

/// A placed sprite within the atlas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Placement<K = String> {
    /// User-specified key (e.g., filename).
    pub key: K,
    /// Placed origin, already inset by half the padding.
    pub x: u32,
    pub y: u32,
    /// Sprite size without padding.
    pub w: u32,
    pub h: u32,
    /// Depth of the partition node that holds the sprite.
    pub depth: u32,
}

/// Atlas-level metadata written alongside the layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Meta {
    pub app: String,
    pub version: String,
    pub width: u32,
    pub height: u32,
    pub padding: u32,
}

impl Meta {
    pub fn new(width: u32, height: u32, padding: u32) -> Self {
        Self {
            app: "spritepack".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            width,
            height,
            padding,
        }
    }
}

/// Logical record of a packed atlas: where every sprite went.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layout<K = String> {
    pub meta: Meta,
    pub placements: Vec<Placement<K>>,
}

/// Statistics about atlas packing efficiency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PackStats {
    /// Number of sprites placed.
    pub num_sprites: usize,
    /// Atlas width * height.
    pub atlas_area: u64,
    /// Sum of sprite areas, padding excluded.
    pub used_area: u64,
    /// Occupancy ratio: used_area / atlas_area (0.0 to 1.0).
    pub occupancy: f64,
}

impl<K> Layout<K> {
    /// Computes packing statistics for this layout.
    pub fn stats(&self) -> PackStats {
        let atlas_area = self.meta.width as u64 * self.meta.height as u64;
        let used_area: u64 = self
            .placements
            .iter()
            .map(|p| p.w as u64 * p.h as u64)
            .sum();
        let occupancy = if atlas_area > 0 {
            used_area as f64 / atlas_area as f64
        } else {
            0.0
        };
        PackStats {
            num_sprites: self.placements.len(),
            atlas_area,
            used_area,
            occupancy,
        }
    }
}

impl PackStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Sprites: {}, Occupancy: {:.2}%, Atlas Area: {} px², Used Area: {} px²",
            self.num_sprites,
            self.occupancy * 100.0,
            self.atlas_area,
            self.used_area,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.atlas_area.saturating_sub(self.used_area)
    }
}
