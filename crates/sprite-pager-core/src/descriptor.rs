//! Line-oriented atlas descriptor writer.
//!
//! One stanza per page: image file name, canvas size, format and filter lines,
//! then one entry per sprite and per alias. Packed rows count up from the page
//! bottom; the writer flips them into image rows.

use crate::error::Result;
use crate::model::{Atlas, Meta, Page, Region, Sprite};
use std::fmt::Write as _;
use std::io;

/// Final image size of a page and where the packed content starts inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub offset_x: u32,
    pub offset_y: u32,
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// Derives the canvas from the tight page size.
    ///
    /// The trailing padding of the last column/row is dropped, edge padding is
    /// added on both sides, then power-of-two, minimum size and square rules apply.
    pub fn for_page(page: &Page, meta: &Meta) -> Self {
        let (px, py) = meta.padding;
        let (edge_x, edge_y) = if meta.duplicate_padding {
            (px / 2, py / 2)
        } else {
            (px, py)
        };
        let mut width = page.width.saturating_sub(px);
        let mut height = page.height.saturating_sub(py);
        let (mut offset_x, mut offset_y) = (0, 0);
        if meta.edge_padding {
            offset_x = edge_x;
            offset_y = edge_y;
            width += edge_x * 2;
            height += edge_y * 2;
        }
        if meta.power_of_two {
            width = width.max(1).next_power_of_two();
            height = height.max(1).next_power_of_two();
        }
        width = width.max(meta.min_dim.0);
        height = height.max(meta.min_dim.1);
        if meta.square {
            let side = width.max(height);
            width = side;
            height = side;
        }
        Self {
            offset_x,
            offset_y,
            width,
            height,
        }
    }

    /// Top-left pixel of `sprite` inside the canvas image.
    pub fn sprite_origin(&self, page: &Page, sprite: &Sprite) -> (u32, u32) {
        (self.offset_x + sprite.x, self.offset_y + self.flipped_y(page, sprite))
    }

    fn flipped_y(&self, page: &Page, sprite: &Sprite) -> u32 {
        page.height.saturating_sub(sprite.height + sprite.y)
    }
}

/// Default image file name of page `id`.
pub fn page_file_name(stem: &str, id: usize, page_count: usize) -> String {
    if page_count <= 1 {
        format!("{stem}.png")
    } else {
        format!("{stem}.part{id}.png")
    }
}

/// Renders the descriptor text for every page of `atlas`.
///
/// `page_names[i]` is the image file name written for page `i`; missing
/// entries fall back to `page_<id>.png`.
pub fn to_descriptor(atlas: &Atlas, page_names: &[String]) -> String {
    let mut out = String::new();
    for (i, page) in atlas.pages.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let canvas = Canvas::for_page(page, &atlas.meta);
        let name = page_names
            .get(i)
            .cloned()
            .unwrap_or_else(|| format!("page_{}.png", page.id));
        // writing into a String cannot fail
        let _ = writeln!(out, "{name}");
        let _ = writeln!(out, "size: {},{}", canvas.width, canvas.height);
        let _ = writeln!(out, "format: {}", atlas.meta.format);
        out.push_str("filter: Nearest,Nearest\n");
        out.push_str("repeat: none\n");
        for sprite in &page.sprites {
            write_entry(&mut out, &canvas, page, sprite, &sprite.name, sprite.index, &sprite.region);
            for alias in &sprite.aliases {
                write_entry(&mut out, &canvas, page, sprite, &alias.name, alias.index, &alias.region);
            }
        }
    }
    out
}

/// Writes the descriptor text of `atlas` to `w`.
pub fn write_descriptor<W: io::Write>(atlas: &Atlas, page_names: &[String], mut w: W) -> Result<()> {
    w.write_all(to_descriptor(atlas, page_names).as_bytes())?;
    w.flush()?;
    Ok(())
}

fn write_entry(
    out: &mut String,
    canvas: &Canvas,
    page: &Page,
    sprite: &Sprite,
    name: &str,
    index: Option<i32>,
    region: &Region,
) {
    let (x, y) = canvas.sprite_origin(page, sprite);
    let _ = writeln!(out, "{name}");
    let _ = writeln!(out, "  rotate: {}", sprite.rotated);
    let _ = writeln!(out, "  xy: {x}, {y}");
    let _ = writeln!(out, "  size: {}, {}", region.width, region.height);
    if let Some([l, r, t, b]) = region.splits {
        let _ = writeln!(out, "  split: {l}, {r}, {t}, {b}");
    }
    if let Some([l, r, t, b]) = region.pads {
        if region.splits.is_none() {
            out.push_str("  split: 0, 0, 0, 0\n");
        }
        let _ = writeln!(out, "  pad: {l}, {r}, {t}, {b}");
    }
    let _ = writeln!(out, "  orig: {}, {}", region.original_width, region.original_height);
    let flipped = region.original_height as i64 - region.height as i64 - region.offset_y as i64;
    let _ = writeln!(out, "  offset: {}, {}", region.offset_x, flipped);
    let _ = writeln!(out, "  index: {}", index.unwrap_or(-1));
}
