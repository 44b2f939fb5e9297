use crate::config::MaxRectsHeuristic;
use crate::model::{Page, Sprite};

pub mod maxrects;
pub mod score;

/// A scored position for one sprite, as returned by the heuristic scorer.
///
/// Lower `(primary, secondary)` is better for every heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    /// Laid-out width (rotated size when `rotated`).
    pub width: u32,
    pub height: u32,
    pub rotated: bool,
    pub primary: i64,
    pub secondary: i64,
}

impl Placement {
    pub fn key(&self) -> (i64, i64) {
        (self.primary, self.secondary)
    }
}

/// Outcome of filling one bin with one heuristic.
///
/// Sprites are referenced by their index in the input slice so that trials
/// never clone sprite data; only the winning layout becomes a `Page`.
#[derive(Debug, Clone)]
pub struct Layout {
    pub heuristic: MaxRectsHeuristic,
    pub bin_width: u32,
    pub bin_height: u32,
    /// Placed sprites in placement order.
    pub placements: Vec<(usize, Placement)>,
    /// Indices of sprites that did not fit.
    pub remaining: Vec<usize>,
    pub occupancy: f64,
    /// Tight bounding box of the placements.
    pub width: u32,
    pub height: u32,
}

impl Layout {
    pub fn is_complete(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Moves the sprites into a page, applying placements. Page id is left at 0.
    pub fn into_page(self, sprites: Vec<Sprite>) -> Page {
        let mut slots: Vec<Option<Sprite>> = sprites.into_iter().map(Some).collect();
        let mut placed = Vec::with_capacity(self.placements.len());
        for (idx, p) in &self.placements {
            if let Some(mut s) = slots[*idx].take() {
                s.x = p.x;
                s.y = p.y;
                s.width = p.width;
                s.height = p.height;
                s.rotated = p.rotated;
                placed.push(s);
            }
        }
        let remaining = self
            .remaining
            .iter()
            .filter_map(|&idx| slots[idx].take())
            .collect();
        Page {
            id: 0,
            width: self.width,
            height: self.height,
            occupancy: self.occupancy,
            sprites: placed,
            remaining,
        }
    }
}

/// Keeps `a` unless `b` has strictly higher occupancy, so earlier results win ties.
pub fn better_layout(a: Option<Layout>, b: Option<Layout>) -> Option<Layout> {
    match (a, b) {
        (None, b) => b,
        (a, None) => a,
        (Some(a), Some(b)) => {
            if b.occupancy > a.occupancy {
                Some(b)
            } else {
                Some(a)
            }
        }
    }
}
