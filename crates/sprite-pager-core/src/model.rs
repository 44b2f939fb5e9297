use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn right(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
    /// Returns true if `r` is fully inside `self`.
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }
    /// Returns true if the interiors of `self` and `r` overlap.
    pub fn intersects(&self, r: &Rect) -> bool {
        !(r.x >= self.right() || r.right() <= self.x || r.y >= self.bottom() || r.bottom() <= self.y)
    }
}

/// Region metadata produced by the image preparation stage.
///
/// The packer never reads it; it is carried through to the descriptor writer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Region {
    /// Visible (trimmed, unpadded) size.
    pub width: u32,
    pub height: u32,
    /// Size of the source image before trimming.
    pub original_width: u32,
    pub original_height: u32,
    /// Top-left of the trimmed region inside the source image.
    pub offset_x: u32,
    pub offset_y: u32,
    /// Nine-patch split lines: left, right, top, bottom.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub splits: Option<[i32; 4]>,
    /// Nine-patch content pads: left, right, top, bottom.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pads: Option<[i32; 4]>,
}

impl Region {
    /// Untrimmed region of `w` x `h`.
    pub fn full(w: u32, h: u32) -> Self {
        Self {
            width: w,
            height: h,
            original_width: w,
            original_height: h,
            ..Default::default()
        }
    }
}

/// A duplicate of a sprite that shares its placement but keeps its own identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Alias {
    pub name: String,
    #[serde(default)]
    pub index: Option<i32>,
    pub region: Region,
}

/// One sprite rectangle as seen by the packer.
///
/// `width`/`height` include padding. Once placed, they hold the laid-out size:
/// swapped (with padding re-derived per axis) when `rotated` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sprite {
    pub name: String,
    /// Animation frame index, if any.
    pub index: Option<i32>,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub rotated: bool,
    pub can_rotate: bool,
    pub region: Region,
    pub aliases: Vec<Alias>,
}

impl Sprite {
    /// Unplaced sprite of `width` x `height` (already padded) with a full region.
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            index: None,
            x: 0,
            y: 0,
            width,
            height,
            rotated: false,
            can_rotate: true,
            region: Region::full(width, height),
            aliases: Vec::new(),
        }
    }

    pub fn with_rotation(mut self, can_rotate: bool) -> Self {
        self.can_rotate = can_rotate;
        self
    }

    pub fn with_index(mut self, index: i32) -> Self {
        self.index = Some(index);
        self
    }

    /// Placed rectangle on the page (padding included).
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// A single atlas page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: usize,
    /// Tight bounding box of the placed sprites, trailing padding included.
    pub width: u32,
    pub height: u32,
    /// Placed area over the searched page area (0.0 to 1.0).
    pub occupancy: f64,
    /// Placed sprites, sorted by name.
    pub sprites: Vec<Sprite>,
    /// Sprites that did not fit this page.
    #[serde(skip)]
    pub remaining: Vec<Sprite>,
}

/// Atlas-level metadata (settings that downstream writers need).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub app: String,
    pub version: String,
    pub format: String,
    pub power_of_two: bool,
    pub square: bool,
    pub max_dim: (u32, u32),
    pub min_dim: (u32, u32),
    pub padding: (u32, u32),
    pub edge_padding: bool,
    pub duplicate_padding: bool,
    pub allow_rotation: bool,
}

/// Atlas of pages and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Atlas {
    pub pages: Vec<Page>,
    pub meta: Meta,
}

/// Statistics about atlas packing efficiency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PackStats {
    /// Total number of pages in the atlas.
    pub num_pages: usize,
    /// Total number of placed sprites (aliases excluded).
    pub num_sprites: usize,
    /// Number of alias entries sharing a placed sprite.
    pub num_aliases: usize,
    /// Sum of page width * height.
    pub total_page_area: u64,
    /// Sum of placed sprite area, padding included.
    pub used_area: u64,
    /// used_area / total_page_area (0.0 to 1.0).
    pub occupancy: f64,
    pub avg_page_width: f64,
    pub avg_page_height: f64,
    pub max_page_width: u32,
    pub max_page_height: u32,
    pub num_rotated: usize,
}

impl Atlas {
    /// Computes packing statistics over the tight page sizes.
    pub fn stats(&self) -> PackStats {
        let num_pages = self.pages.len();
        let mut num_sprites = 0;
        let mut num_aliases = 0;
        let mut total_page_area = 0u64;
        let mut used_area = 0u64;
        let mut max_page_width = 0u32;
        let mut max_page_height = 0u32;
        let mut num_rotated = 0;

        for page in &self.pages {
            total_page_area += page.width as u64 * page.height as u64;
            max_page_width = max_page_width.max(page.width);
            max_page_height = max_page_height.max(page.height);

            for sprite in &page.sprites {
                num_sprites += 1;
                num_aliases += sprite.aliases.len();
                used_area += sprite.area();
                if sprite.rotated {
                    num_rotated += 1;
                }
            }
        }

        let occupancy = if total_page_area > 0 {
            used_area as f64 / total_page_area as f64
        } else {
            0.0
        };

        let (avg_page_width, avg_page_height) = if num_pages > 0 {
            let total_width: u64 = self.pages.iter().map(|p| p.width as u64).sum();
            let total_height: u64 = self.pages.iter().map(|p| p.height as u64).sum();
            (
                total_width as f64 / num_pages as f64,
                total_height as f64 / num_pages as f64,
            )
        } else {
            (0.0, 0.0)
        };

        PackStats {
            num_pages,
            num_sprites,
            num_aliases,
            total_page_area,
            used_area,
            occupancy,
            avg_page_width,
            avg_page_height,
            max_page_width,
            max_page_height,
            num_rotated,
        }
    }
}

impl PackStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Pages: {}, Sprites: {} (+{} aliases), Occupancy: {:.2}%, Total Area: {} px², Used Area: {} px², Rotated: {}",
            self.num_pages,
            self.num_sprites,
            self.num_aliases,
            self.occupancy * 100.0,
            self.total_page_area,
            self.used_area,
            self.num_rotated,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.total_page_area.saturating_sub(self.used_area)
    }

    /// Returns wasted space as a percentage (0.0 to 100.0).
    pub fn waste_percentage(&self) -> f64 {
        if self.total_page_area > 0 {
            (self.wasted_area() as f64 / self.total_page_area as f64) * 100.0
        } else {
            0.0
        }
    }
}
