use crate::config::{MaxRectsHeuristic, PackerConfig};
use crate::model::{Rect, Sprite};

use super::Placement;

/// Sizes a sprite may be laid out with.
///
/// The rotated size re-derives padding per axis so the visible region keeps
/// `padding_x` on its right and `padding_y` below it in either orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub width: u32,
    pub height: u32,
    pub rotated_width: u32,
    pub rotated_height: u32,
    /// Rotated orientation is allowed for this sprite under the current settings.
    pub rotate: bool,
}

impl Candidate {
    pub fn new(width: u32, height: u32, padding: (u32, u32), rotate: bool) -> Self {
        let (px, py) = padding;
        Self {
            width,
            height,
            // saturates so an oversize sprite never wraps into a small one
            rotated_width: height.saturating_sub(py).saturating_add(px),
            rotated_height: width.saturating_sub(px).saturating_add(py),
            rotate,
        }
    }

    pub fn for_sprite(sprite: &Sprite, cfg: &PackerConfig) -> Self {
        Self::new(
            sprite.width,
            sprite.height,
            (cfg.padding_x, cfg.padding_y),
            sprite.can_rotate && cfg.allow_rotation,
        )
    }

    /// True if either allowed orientation fits inside `w` x `h`.
    pub fn fits_within(&self, w: u32, h: u32) -> bool {
        (self.width <= w && self.height <= h)
            || (self.rotate && self.rotated_width <= w && self.rotated_height <= h)
    }
}

/// Read-only view of one page's packing state.
#[derive(Debug, Clone, Copy)]
pub struct FreeSpace<'a> {
    pub free: &'a [Rect],
    pub used: &'a [Rect],
    pub bin_width: u32,
    pub bin_height: u32,
}

impl FreeSpace<'_> {
    /// Best placement of `cand` under `heuristic`, or `None` if no free rectangle holds it.
    ///
    /// Free rectangles are visited in list order, unrotated before rotated; a
    /// candidate only replaces the current best when strictly better, so the
    /// first of equal candidates wins.
    pub fn find_position(&self, cand: &Candidate, heuristic: MaxRectsHeuristic) -> Option<Placement> {
        let mut best: Option<Placement> = None;
        for fr in self.free {
            if fr.w >= cand.width && fr.h >= cand.height {
                let (primary, secondary) = self.score(fr, cand.width, cand.height, heuristic);
                consider(
                    &mut best,
                    Placement {
                        x: fr.x,
                        y: fr.y,
                        width: cand.width,
                        height: cand.height,
                        rotated: false,
                        primary,
                        secondary,
                    },
                );
            }
            if cand.rotate && fr.w >= cand.rotated_width && fr.h >= cand.rotated_height {
                let (primary, secondary) =
                    self.score(fr, cand.rotated_width, cand.rotated_height, heuristic);
                consider(
                    &mut best,
                    Placement {
                        x: fr.x,
                        y: fr.y,
                        width: cand.rotated_width,
                        height: cand.rotated_height,
                        rotated: true,
                        primary,
                        secondary,
                    },
                );
            }
        }
        best.filter(|p| p.width > 0 && p.height > 0)
    }

    fn score(&self, fr: &Rect, w: u32, h: u32, heuristic: MaxRectsHeuristic) -> (i64, i64) {
        let leftover_h = (fr.w as i64 - w as i64).abs();
        let leftover_v = (fr.h as i64 - h as i64).abs();
        let short_fit = leftover_h.min(leftover_v);
        let long_fit = leftover_h.max(leftover_v);
        match heuristic {
            MaxRectsHeuristic::BestShortSideFit => (short_fit, long_fit),
            MaxRectsHeuristic::BestLongSideFit => (long_fit, short_fit),
            MaxRectsHeuristic::BestAreaFit => {
                let area_fit = fr.area() as i64 - (w as i64 * h as i64);
                (area_fit, short_fit)
            }
            MaxRectsHeuristic::BottomLeft => (fr.y as i64 + h as i64, fr.x as i64),
            // maximized: negate so lower is better like the others
            MaxRectsHeuristic::ContactPoint => {
                (-(self.contact_point_score(fr.x, fr.y, w, h) as i64), 0)
            }
        }
    }

    /// Edge length shared with the page border and with already placed rectangles.
    pub fn contact_point_score(&self, x: u32, y: u32, w: u32, h: u32) -> u64 {
        let mut score = 0u64;
        if x == 0 || x + w == self.bin_width {
            score += h as u64;
        }
        if y == 0 || y + h == self.bin_height {
            score += w as u64;
        }
        for u in self.used {
            if u.x == x + w || u.right() == x {
                score += common_interval(u.y, u.bottom(), y, y + h) as u64;
            }
            if u.y == y + h || u.bottom() == y {
                score += common_interval(u.x, u.right(), x, x + w) as u64;
            }
        }
        score
    }
}

fn consider(best: &mut Option<Placement>, cand: Placement) {
    if best.as_ref().is_none_or(|b| cand.key() < b.key()) {
        *best = Some(cand);
    }
}

fn common_interval(a1: u32, a2: u32, b1: u32, b2: u32) -> u32 {
    if a2 < b1 || b2 < a1 {
        return 0;
    }
    a2.min(b2) - a1.max(b1)
}
