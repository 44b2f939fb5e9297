use crate::config::{PackMode, PackerConfig};
use crate::error::{PagePackError, Result};
use crate::model::{Alias, Atlas, Meta, Page, Region, Sprite};
use crate::search::pack_page;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// One sprite record handed over by the image preparation stage.
///
/// `width`/`height` are the visible region size; padding is added by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteInput {
    pub name: String,
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_can_rotate")]
    pub can_rotate: bool,
    #[serde(default)]
    pub index: Option<i32>,
    /// Trim/nine-patch metadata; defaults to the full `width` x `height` region.
    #[serde(default)]
    pub region: Option<Region>,
    #[serde(default)]
    pub aliases: Vec<Alias>,
}

fn default_can_rotate() -> bool {
    true
}

impl SpriteInput {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            can_rotate: true,
            index: None,
            region: None,
            aliases: Vec::new(),
        }
    }
}

/// Packs `inputs` into pages using configuration `cfg`.
///
/// Notes:
/// - Padding is added to every sprite once, before any page is searched.
/// - In fast mode sprites are first sorted by their longest side (or width without rotation).
/// - An empty input yields an atlas with no pages.
#[instrument(skip_all)]
pub fn pack_sprites(inputs: Vec<SpriteInput>, cfg: PackerConfig) -> Result<Atlas> {
    cfg.validate()?;

    let mut sprites: Vec<Sprite> = inputs
        .into_iter()
        .map(|inp| pad_sprite(inp, &cfg))
        .collect::<Result<_>>()?;

    if matches!(cfg.mode, PackMode::Fast) {
        sort_for_fast_mode(&mut sprites, cfg.allow_rotation);
    }

    let pages = pack_pages(sprites, &cfg)?;
    Ok(Atlas {
        pages,
        meta: meta_for(&cfg),
    })
}

/// Adds padding to the right of and below the visible size.
/// Fails with `Unpackable` if the padded size does not fit in `u32`.
fn pad_sprite(inp: SpriteInput, cfg: &PackerConfig) -> Result<Sprite> {
    let padded = inp
        .width
        .checked_add(cfg.padding_x)
        .zip(inp.height.checked_add(cfg.padding_y));
    let Some((width, height)) = padded else {
        return Err(PagePackError::Unpackable {
            name: inp.name,
            width: inp.width,
            height: inp.height,
            max_width: cfg.max_width,
            max_height: cfg.max_height,
            padding_x: cfg.padding_x,
            padding_y: cfg.padding_y,
        });
    };
    let region = inp
        .region
        .unwrap_or_else(|| Region::full(inp.width, inp.height));
    Ok(Sprite {
        name: inp.name,
        index: inp.index,
        x: 0,
        y: 0,
        width,
        height,
        rotated: false,
        can_rotate: inp.can_rotate,
        region,
        aliases: inp.aliases,
    })
}

/// Fast mode insertion order: descending longest side with rotation, else descending width.
/// The sort is stable, so equal keys keep their input order.
pub fn sort_for_fast_mode(sprites: &mut [Sprite], allow_rotation: bool) {
    if allow_rotation {
        sprites.sort_by_key(|s| std::cmp::Reverse(s.width.max(s.height)));
    } else {
        sprites.sort_by_key(|s| std::cmp::Reverse(s.width));
    }
}

/// Packs sizes into pages. Inputs are (name, width, height), all rotatable.
pub fn pack_layout<K: Into<String>>(inputs: Vec<(K, u32, u32)>, cfg: PackerConfig) -> Result<Atlas> {
    let inputs = inputs
        .into_iter()
        .map(|(k, w, h)| SpriteInput::new(k, w, h))
        .collect();
    pack_sprites(inputs, cfg)
}

/// Multi-page driver: packs already padded sprites page after page until none remain.
#[instrument(skip_all, fields(sprites = sprites.len()))]
pub fn pack_pages(mut sprites: Vec<Sprite>, cfg: &PackerConfig) -> Result<Vec<Page>> {
    let mut pages: Vec<Page> = Vec::new();
    while !sprites.is_empty() {
        let pending = sprites.len();
        let mut page = pack_page(sprites, cfg)?;
        if page.sprites.is_empty() {
            // a round that places nothing would never terminate
            let first = page.remaining.first();
            return Err(PagePackError::Unpackable {
                name: first.map(|s| s.name.clone()).unwrap_or_default(),
                width: first.map_or(0, |s| s.width),
                height: first.map_or(0, |s| s.height),
                max_width: cfg.max_width,
                max_height: cfg.max_height,
                padding_x: cfg.padding_x,
                padding_y: cfg.padding_y,
            });
        }
        page.id = pages.len();
        sprites = std::mem::take(&mut page.remaining);
        debug!(
            page = page.id,
            width = page.width,
            height = page.height,
            placed = page.sprites.len(),
            pending,
            remaining = sprites.len(),
            "page packed"
        );
        pages.push(page);
    }
    Ok(pages)
}

fn meta_for(cfg: &PackerConfig) -> Meta {
    Meta {
        app: "sprite-pager".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        format: "RGBA8888".into(),
        power_of_two: cfg.power_of_two,
        square: cfg.square,
        max_dim: (cfg.max_width, cfg.max_height),
        min_dim: (cfg.min_width, cfg.min_height),
        padding: (cfg.padding_x, cfg.padding_y),
        edge_padding: cfg.edge_padding,
        duplicate_padding: cfg.duplicate_padding,
        allow_rotation: cfg.allow_rotation,
    }
}
