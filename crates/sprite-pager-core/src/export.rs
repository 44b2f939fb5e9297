use crate::descriptor::Canvas;
use crate::error::{PagePackError, Result};
use crate::model::{Atlas, Meta, Page, Region, Sprite};
use serde_json::{Value, json};

fn frame_json(sprite: &Sprite, page: &Page, meta: &Meta) -> Value {
    // visible rectangle on the canvas image, top-left origin, padding stripped
    let canvas = Canvas::for_page(page, meta);
    let x = canvas.offset_x + sprite.x;
    let y = canvas.offset_y + page.height.saturating_sub(sprite.y + sprite.height);
    json!({
        "x": x,
        "y": y,
        "w": sprite.width.saturating_sub(meta.padding.0),
        "h": sprite.height.saturating_sub(meta.padding.1),
    })
}

fn region_json(region: &Region) -> Value {
    let trimmed = region.width != region.original_width || region.height != region.original_height;
    json!({
        "trimmed": trimmed,
        "spriteSourceSize": {
            "x": region.offset_x,
            "y": region.offset_y,
            "w": region.width,
            "h": region.height,
        },
        "sourceSize": {"w": region.original_width, "h": region.original_height},
        "splits": region.splits,
        "pads": region.pads,
    })
}

fn entry_json(name: &str, index: Option<i32>, region: &Region, frame: &Value, rotated: bool) -> Value {
    let mut v = region_json(region);
    if let Value::Object(map) = &mut v {
        map.insert("name".into(), json!(name));
        map.insert("index".into(), json!(index));
        map.insert("frame".into(), frame.clone());
        map.insert("rotated".into(), json!(rotated));
    }
    v
}

/// Serialize the whole `Atlas` as `{ pages, meta }` (array-of-pages style).
/// Aliases appear as their own entries sharing the sprite's frame.
pub fn to_json_array(atlas: &Atlas) -> Value {
    let pages_val = atlas
        .pages
        .iter()
        .map(|p| {
            let canvas = Canvas::for_page(p, &atlas.meta);
            let mut sprites = Vec::new();
            for s in &p.sprites {
                let frame = frame_json(s, p, &atlas.meta);
                sprites.push(entry_json(&s.name, s.index, &s.region, &frame, s.rotated));
                for a in &s.aliases {
                    sprites.push(entry_json(&a.name, a.index, &a.region, &frame, s.rotated));
                }
            }
            json!({
                "id": p.id,
                "width": canvas.width,
                "height": canvas.height,
                "occupancy": p.occupancy,
                "sprites": sprites,
            })
        })
        .collect::<Vec<_>>();
    json!({"pages": pages_val, "meta": &atlas.meta})
}

/// Flatten sprites keyed by name, with page id and canvas size hints.
/// Shape: `{ frames: { name: { frame, rotated, trimmed, spriteSourceSize, sourceSize, page, pageSize } }, meta }`.
///
/// Names shared by several frames (animation indices) are keyed `name_index`.
pub fn to_json_hash(atlas: &Atlas) -> Value {
    let mut frames = serde_json::Map::new();
    for page in &atlas.pages {
        let canvas = Canvas::for_page(page, &atlas.meta);
        let page_size = json!({"w": canvas.width, "h": canvas.height});
        for s in &page.sprites {
            let frame = frame_json(s, page, &atlas.meta);
            let entries = std::iter::once((&s.name, s.index, &s.region))
                .chain(s.aliases.iter().map(|a| (&a.name, a.index, &a.region)));
            for (name, index, region) in entries {
                let mut v = entry_json(name, index, region, &frame, s.rotated);
                if let Value::Object(map) = &mut v {
                    map.insert("page".into(), json!(page.id));
                    map.insert("pageSize".into(), page_size.clone());
                }
                let key = match index {
                    Some(i) => format!("{name}_{i}"),
                    None => name.clone(),
                };
                frames.insert(key, v);
            }
        }
    }
    json!({ "frames": frames, "meta": &atlas.meta })
}

/// Encodes an exported value as JSON text.
pub fn to_json_string(value: &Value, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    text.map_err(|e| PagePackError::Encode(e.to_string()))
}
