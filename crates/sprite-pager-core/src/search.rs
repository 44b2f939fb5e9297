//! Page size search: binary search over page width and height for the
//! smallest page that takes every pending sprite.

use crate::config::{MaxRectsHeuristic, PackMode, PackerConfig};
use crate::error::{PagePackError, Result};
use crate::model::{Page, Sprite};
use crate::packer::maxrects::MaxRectsPacker;
use crate::packer::score::Candidate;
use crate::packer::{Layout, better_layout};
use tracing::{debug, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Binary search over one page dimension.
///
/// In power-of-two mode the search runs over exponents and yields `2^k`.
/// Otherwise it stops early once the window is narrower than `fuzziness`.
#[derive(Debug, Clone)]
pub struct BinarySearch {
    min: i64,
    max: i64,
    fuzziness: i64,
    pot: bool,
    low: i64,
    high: i64,
    current: i64,
}

impl BinarySearch {
    pub fn new(min: u32, max: u32, fuzziness: u32, pot: bool) -> Self {
        let (min, max) = if pot {
            (log2_pow2(min), log2_pow2(max))
        } else {
            (min as i64, max as i64)
        };
        Self {
            min,
            max,
            fuzziness: if pot { 0 } else { fuzziness as i64 },
            pot,
            low: min,
            high: max,
            current: (min + max) / 2,
        }
    }

    /// Restarts the search and returns the first size to try.
    pub fn reset(&mut self) -> u32 {
        self.low = self.min;
        self.high = self.max;
        self.current = (self.low + self.high) / 2;
        self.value()
    }

    /// Next size to try: larger if `grow` (the last trial failed), smaller otherwise.
    /// Returns `None` once the search is exhausted.
    pub fn next(&mut self, grow: bool) -> Option<u32> {
        if self.low >= self.high {
            return None;
        }
        if grow {
            self.low = self.current + 1;
        } else {
            self.high = self.current - 1;
        }
        if self.low > self.high {
            return None;
        }
        self.current = (self.low + self.high) / 2;
        if (self.low - self.high).abs() < self.fuzziness {
            return None;
        }
        Some(self.value())
    }

    fn value(&self) -> u32 {
        if self.pot {
            1u32 << self.current.clamp(0, 31)
        } else {
            self.current as u32
        }
    }
}

fn log2_pow2(v: u32) -> i64 {
    v.max(1).next_power_of_two().trailing_zeros() as i64
}

/// Fails with `Unpackable` if some sprite cannot fit the usable maximum page in any allowed orientation.
pub fn check_fits(sprites: &[Sprite], cfg: &PackerConfig) -> Result<()> {
    let (bw, bh) = cfg.usable_max();
    for s in sprites {
        if !Candidate::for_sprite(s, cfg).fits_within(bw, bh) {
            return Err(PagePackError::Unpackable {
                name: s.name.clone(),
                width: s.width,
                height: s.height,
                max_width: cfg.max_width,
                max_height: cfg.max_height,
                padding_x: cfg.padding_x,
                padding_y: cfg.padding_y,
            });
        }
    }
    Ok(())
}

/// Packs as many of `sprites` as possible onto one page of the smallest size found.
///
/// Sprites must already carry padding. The returned page holds the placed
/// sprites sorted by name; the rest are in `remaining`.
pub fn pack_page(sprites: Vec<Sprite>, cfg: &PackerConfig) -> Result<Page> {
    if sprites.is_empty() {
        return Ok(Page {
            id: 0,
            width: 0,
            height: 0,
            occupancy: 0.0,
            sprites: Vec::new(),
            remaining: Vec::new(),
        });
    }
    check_fits(&sprites, cfg)?;

    let (rx, ry) = cfg.edge_reserve();
    let min_w = sprites.iter().map(|s| s.width).min().unwrap_or(0);
    let min_h = sprites.iter().map(|s| s.height).min().unwrap_or(0);
    let min_w = min_w.max(cfg.min_width).min(cfg.max_width);
    let min_h = min_h.max(cfg.min_height).min(cfg.max_height);
    let fuzziness = cfg.search_fuzziness();
    let mut width_search = BinarySearch::new(min_w, cfg.max_width, fuzziness, cfg.power_of_two);
    let mut height_search = BinarySearch::new(min_h, cfg.max_height, fuzziness, cfg.power_of_two);

    let mut width = width_search.reset();
    let mut height = height_search.reset();
    let mut best: Option<Layout> = None;
    loop {
        let mut best_for_height: Option<Layout> = None;
        let mut trial_width = Some(width);
        while let Some(w) = trial_width {
            let result = pack_at_size(
                true,
                w.saturating_sub(rx),
                height.saturating_sub(ry),
                &sprites,
                cfg,
            );
            trace!(
                width = w,
                height,
                fits = result.is_some(),
                occupancy = result.as_ref().map(|r| r.occupancy),
                "trial size"
            );
            let failed = result.is_none();
            best_for_height = better_layout(best_for_height, result);
            trial_width = width_search.next(failed);
        }
        let failed = best_for_height.is_none();
        best = better_layout(best, best_for_height);
        match height_search.next(failed) {
            Some(h) => {
                height = h;
                width = width_search.reset();
            }
            None => break,
        }
    }

    let best = match best {
        Some(layout) => layout,
        None => {
            let (bw, bh) = cfg.usable_max();
            debug!(
                width = bw,
                height = bh,
                "no size fits every sprite; packing partially at max size"
            );
            match pack_at_size(false, bw, bh, &sprites, cfg) {
                Some(layout) => layout,
                None => return Err(unplaceable(&sprites, cfg)),
            }
        }
    };

    debug!(
        heuristic = best.heuristic.short_name(),
        bin_width = best.bin_width,
        bin_height = best.bin_height,
        placed = best.placements.len(),
        remaining = best.remaining.len(),
        occupancy = best.occupancy,
        "page chosen"
    );
    let mut page = best.into_page(sprites);
    page.sprites.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(page)
}

/// Best layout over all heuristics for a `width` x `height` bin.
///
/// With `fully`, layouts leaving sprites behind are rejected. Layouts that
/// place nothing are always rejected. Ties go to the earlier heuristic.
pub fn pack_at_size(
    fully: bool,
    width: u32,
    height: u32,
    sprites: &[Sprite],
    cfg: &PackerConfig,
) -> Option<Layout> {
    let run = |heuristic: MaxRectsHeuristic| {
        let mut packer = MaxRectsPacker::new(width, height, cfg);
        match cfg.mode {
            PackMode::Exhaustive => packer.pack(sprites, heuristic),
            PackMode::Fast => packer.pack_fast(sprites, heuristic),
        }
    };

    #[cfg(feature = "parallel")]
    let layouts: Vec<Layout> = if cfg.effective_parallel() {
        MaxRectsHeuristic::ALL.par_iter().map(|h| run(*h)).collect()
    } else {
        MaxRectsHeuristic::ALL.iter().map(|h| run(*h)).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let layouts: Vec<Layout> = MaxRectsHeuristic::ALL.iter().map(|h| run(*h)).collect();

    layouts
        .into_iter()
        .filter(|l| (!fully || l.is_complete()) && !l.placements.is_empty())
        .fold(None, |best, l| better_layout(best, Some(l)))
}

fn unplaceable(sprites: &[Sprite], cfg: &PackerConfig) -> PagePackError {
    let (name, width, height) = sprites
        .first()
        .map(|s| (s.name.clone(), s.width, s.height))
        .unwrap_or_default();
    PagePackError::Unpackable {
        name,
        width,
        height,
        max_width: cfg.max_width,
        max_height: cfg.max_height,
        padding_x: cfg.padding_x,
        padding_y: cfg.padding_y,
    }
}
