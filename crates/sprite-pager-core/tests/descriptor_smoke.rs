use sprite_pager_core::descriptor::{Canvas, page_file_name, to_descriptor, write_descriptor};
use sprite_pager_core::prelude::*;

fn hero_atlas() -> Atlas {
    let cfg = PackerConfig::builder()
        .with_max_dimensions(64, 64)
        .padding(2, 2)
        .build();
    let hero = SpriteInput {
        index: Some(3),
        region: Some(Region {
            width: 30,
            height: 20,
            original_width: 40,
            original_height: 30,
            offset_x: 4,
            offset_y: 6,
            splits: None,
            pads: Some([1, 2, 3, 4]),
        }),
        aliases: vec![Alias {
            name: "hero_alt".into(),
            index: None,
            region: Region {
                splits: Some([5, 6, 7, 8]),
                ..Region::full(30, 20)
            },
        }],
        ..SpriteInput::new("hero", 30, 20)
    };
    pack_sprites(vec![hero], cfg).expect("pack")
}

#[test]
fn descriptor_single_page_layout() {
    let atlas = hero_atlas();
    assert_eq!(atlas.pages.len(), 1);
    let page = &atlas.pages[0];
    assert_eq!((page.width, page.height), (32, 22));

    let canvas = Canvas::for_page(page, &atlas.meta);
    assert_eq!(
        canvas,
        Canvas {
            offset_x: 2,
            offset_y: 2,
            width: 64,
            height: 32
        }
    );

    let text = to_descriptor(&atlas, &["atlas.png".to_string()]);
    let expected = "\
atlas.png
size: 64,32
format: RGBA8888
filter: Nearest,Nearest
repeat: none
hero
  rotate: false
  xy: 2, 2
  size: 30, 20
  split: 0, 0, 0, 0
  pad: 1, 2, 3, 4
  orig: 40, 30
  offset: 4, 4
  index: 3
hero_alt
  rotate: false
  xy: 2, 2
  size: 30, 20
  split: 5, 6, 7, 8
  orig: 30, 20
  offset: 0, 0
  index: -1
";
    assert_eq!(text, expected);

    let mut buf: Vec<u8> = Vec::new();
    write_descriptor(&atlas, &["atlas.png".to_string()], &mut buf).expect("write");
    assert_eq!(String::from_utf8(buf).expect("utf8"), expected);
}

#[test]
fn descriptor_separates_pages_with_blank_line() {
    let cfg = PackerConfig::builder()
        .with_max_dimensions(64, 64)
        .padding(0, 0)
        .build();
    let mut atlas = pack_sprites(Vec::new(), cfg).expect("pack");
    for id in 0..2 {
        atlas.pages.push(Page {
            id,
            width: 10,
            height: 10,
            occupancy: 1.0,
            sprites: vec![Sprite::new(format!("s{id}"), 10, 10)],
            remaining: Vec::new(),
        });
    }

    let text = to_descriptor(&atlas, &[]);
    assert!(text.starts_with("page_0.png\nsize: 16,16\n"));
    assert!(text.contains("  index: -1\n\npage_1.png\n"));
    assert!(text.ends_with("  index: -1\n"));
    assert!(!text.contains("\n\n\n"));
}

#[test]
fn canvas_rules() {
    let cfg = PackerConfig::builder()
        .with_max_dimensions(512, 512)
        .padding(4, 4)
        .square(true)
        .build();
    let meta = pack_sprites(Vec::new(), cfg).expect("pack").meta;
    let page = Page {
        id: 0,
        width: 200,
        height: 40,
        occupancy: 1.0,
        sprites: Vec::new(),
        remaining: Vec::new(),
    };
    // 196 + 8 -> 256, 36 + 8 -> 64, then squared
    let c = Canvas::for_page(&page, &meta);
    assert_eq!((c.offset_x, c.offset_y, c.width, c.height), (4, 4, 256, 256));

    let dup = Meta {
        duplicate_padding: true,
        power_of_two: false,
        square: false,
        ..meta.clone()
    };
    let c = Canvas::for_page(&page, &dup);
    assert_eq!((c.offset_x, c.offset_y, c.width, c.height), (2, 2, 200, 40));

    let bare = Meta {
        edge_padding: false,
        power_of_two: false,
        square: false,
        ..meta
    };
    let c = Canvas::for_page(&page, &bare);
    assert_eq!((c.offset_x, c.offset_y, c.width, c.height), (0, 0, 196, 36));
}

#[test]
fn page_file_names() {
    assert_eq!(page_file_name("atlas", 0, 1), "atlas.png");
    assert_eq!(page_file_name("atlas", 0, 3), "atlas.part0.png");
    assert_eq!(page_file_name("atlas", 2, 3), "atlas.part2.png");
}
