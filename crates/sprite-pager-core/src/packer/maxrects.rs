use super::score::{Candidate, FreeSpace};
use super::{Layout, Placement};
use crate::config::{MaxRectsHeuristic, PackerConfig};
use crate::model::{Rect, Sprite};

/// MaxRects bin: tracks maximal free rectangles of a single fixed-size page.
pub struct MaxRectsPacker {
    bin_width: u32,
    bin_height: u32,
    padding: (u32, u32),
    allow_rotation: bool,
    free: Vec<Rect>,
    used: Vec<Rect>,
    used_area: u64,
}

impl MaxRectsPacker {
    pub fn new(bin_width: u32, bin_height: u32, config: &PackerConfig) -> Self {
        Self {
            bin_width,
            bin_height,
            padding: (config.padding_x, config.padding_y),
            allow_rotation: config.allow_rotation,
            free: vec![Rect::new(0, 0, bin_width, bin_height)],
            used: Vec::new(),
            used_area: 0,
        }
    }

    fn candidate(&self, sprite: &Sprite) -> Candidate {
        Candidate::new(
            sprite.width,
            sprite.height,
            self.padding,
            sprite.can_rotate && self.allow_rotation,
        )
    }

    fn space(&self) -> FreeSpace<'_> {
        FreeSpace {
            free: &self.free,
            used: &self.used,
            bin_width: self.bin_width,
            bin_height: self.bin_height,
        }
    }

    /// Scores `sprite` against the current free list without placing it.
    pub fn score(&self, sprite: &Sprite, heuristic: MaxRectsHeuristic) -> Option<Placement> {
        self.space().find_position(&self.candidate(sprite), heuristic)
    }

    /// Places `sprite` at its best position under `heuristic`.
    /// Returns `None` if it does not fit anywhere on this page.
    pub fn insert(&mut self, sprite: &Sprite, heuristic: MaxRectsHeuristic) -> Option<Placement> {
        let placement = self.score(sprite, heuristic)?;
        self.place_rect(&placement);
        Some(placement)
    }

    /// Repeatedly places the globally best-scoring pending sprite until none fits.
    pub fn pack(&mut self, sprites: &[Sprite], heuristic: MaxRectsHeuristic) -> Layout {
        let mut pending: Vec<usize> = (0..sprites.len()).collect();
        let mut placements = Vec::with_capacity(sprites.len());
        loop {
            let mut best: Option<(usize, Placement)> = None;
            for (pos, &idx) in pending.iter().enumerate() {
                if let Some(p) = self.score(&sprites[idx], heuristic) {
                    if best.as_ref().is_none_or(|(_, b)| p.key() < b.key()) {
                        best = Some((pos, p));
                    }
                }
            }
            let Some((pos, placement)) = best else {
                break;
            };
            self.place_rect(&placement);
            placements.push((pending.remove(pos), placement));
        }
        self.layout(heuristic, placements, pending)
    }

    /// Inserts sprites in the given order; the first miss ends the page.
    pub fn pack_fast(&mut self, sprites: &[Sprite], heuristic: MaxRectsHeuristic) -> Layout {
        let mut placements = Vec::with_capacity(sprites.len());
        let mut remaining = Vec::new();
        for (idx, sprite) in sprites.iter().enumerate() {
            match self.insert(sprite, heuristic) {
                Some(p) => placements.push((idx, p)),
                None => {
                    remaining.extend(idx..sprites.len());
                    break;
                }
            }
        }
        self.layout(heuristic, placements, remaining)
    }

    fn layout(
        &self,
        heuristic: MaxRectsHeuristic,
        placements: Vec<(usize, Placement)>,
        remaining: Vec<usize>,
    ) -> Layout {
        let width = placements.iter().map(|(_, p)| p.x + p.width).max().unwrap_or(0);
        let height = placements.iter().map(|(_, p)| p.y + p.height).max().unwrap_or(0);
        Layout {
            heuristic,
            bin_width: self.bin_width,
            bin_height: self.bin_height,
            placements,
            remaining,
            occupancy: self.occupancy(),
            width,
            height,
        }
    }

    /// Placed area over bin area.
    pub fn occupancy(&self) -> f64 {
        let bin_area = self.bin_width as u64 * self.bin_height as u64;
        if bin_area == 0 {
            return 0.0;
        }
        self.used_area as f64 / bin_area as f64
    }

    fn place_rect(&mut self, p: &Placement) {
        let node = Rect::new(p.x, p.y, p.width, p.height);
        // split every free rect that overlaps node; untouched ones keep their order
        let mut split: Vec<Rect> = Vec::new();
        self.free.retain(|fr| {
            if fr.intersects(&node) {
                split_free_node(fr, &node, &mut split);
                false
            } else {
                true
            }
        });
        self.free.extend(split);
        self.prune_free_list();
        self.used.push(node);
        self.used_area += node.area();
    }

    fn prune_free_list(&mut self) {
        let mut i = 0;
        while i < self.free.len() {
            let mut j = i + 1;
            let mut remove_i = false;
            while j < self.free.len() {
                if self.free[j].contains(&self.free[i]) {
                    remove_i = true;
                    break;
                }
                if self.free[i].contains(&self.free[j]) {
                    self.free.remove(j);
                    continue;
                }
                j += 1;
            }
            if remove_i {
                self.free.remove(i);
            } else {
                i += 1;
            }
        }
    }

    pub fn free_rects(&self) -> &[Rect] {
        &self.free
    }

    pub fn used_rects(&self) -> &[Rect] {
        &self.used
    }

    pub fn free_list_len(&self) -> usize {
        self.free.len()
    }
}

/// Pushes the maximal strips of `fr` left uncovered by `node`.
fn split_free_node(fr: &Rect, node: &Rect, out: &mut Vec<Rect>) {
    // Top
    if node.y > fr.y && node.y < fr.bottom() {
        out.push(Rect::new(fr.x, fr.y, fr.w, node.y - fr.y));
    }
    // Bottom
    if node.bottom() < fr.bottom() {
        out.push(Rect::new(fr.x, node.bottom(), fr.w, fr.bottom() - node.bottom()));
    }
    // Left
    if node.x > fr.x && node.x < fr.right() {
        out.push(Rect::new(fr.x, fr.y, node.x - fr.x, fr.h));
    }
    // Right
    if node.right() < fr.right() {
        out.push(Rect::new(node.right(), fr.y, fr.right() - node.right(), fr.h));
    }
}
