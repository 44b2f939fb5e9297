use sprite_pager_core::config::{MaxRectsHeuristic, PackerConfig};
use sprite_pager_core::descriptor::Canvas;
use sprite_pager_core::model::Sprite;
use sprite_pager_core::packer::maxrects::MaxRectsPacker;
use sprite_pager_core::search::{BinarySearch, pack_at_size};
use sprite_pager_core::{PagePackError, pack_layout};

#[test]
fn pow2_search_walks_exponents() {
    let mut s = BinarySearch::new(16, 1024, 15, true);
    assert_eq!(s.reset(), 128);
    assert_eq!(s.next(true), Some(512));
    assert_eq!(s.next(false), Some(256));
    assert_eq!(s.next(true), None);
}

#[test]
fn linear_search_stops_inside_fuzziness_window() {
    let mut s = BinarySearch::new(100, 120, 15, false);
    assert_eq!(s.reset(), 110);
    assert_eq!(s.next(true), None);

    let mut s = BinarySearch::new(16, 1024, 15, false);
    assert_eq!(s.reset(), 520);
    assert_eq!(s.next(true), Some(772));
}

#[test]
fn search_terminates_in_both_directions() {
    for grow in [true, false] {
        let mut s = BinarySearch::new(1, 4096, 0, false);
        let mut last = s.reset();
        let mut steps = 0;
        while let Some(v) = s.next(grow) {
            if grow {
                assert!(v > last);
            } else {
                assert!(v < last);
            }
            last = v;
            steps += 1;
            assert!(steps <= 13, "search did not converge");
        }
    }
}

#[test]
fn pow2_page_for_one_large_two_small() {
    let cfg = PackerConfig::builder()
        .with_max_dimensions(256, 256)
        .padding(0, 0)
        .pow2(true)
        .build();
    let atlas = pack_layout(vec![("big", 100, 100), ("s1", 50, 50), ("s2", 50, 50)], cfg)
        .expect("pack");
    assert_eq!(atlas.pages.len(), 1);
    let page = &atlas.pages[0];
    assert_eq!(page.sprites.len(), 3);
    assert!(page.width <= 256 && page.height <= 256);
    // 128x128 cannot hold 100 + 50 on either axis; 256x128 is the smallest that can
    assert!((page.occupancy - 15000.0 / (256.0 * 128.0)).abs() < 1e-9);

    let canvas = Canvas::for_page(page, &atlas.meta);
    assert!(canvas.width.is_power_of_two() && canvas.width <= 256);
    assert!(canvas.height.is_power_of_two() && canvas.height <= 256);
}

#[test]
fn oversize_sprite_is_unpackable() {
    let cfg = PackerConfig::builder()
        .with_max_dimensions(256, 256)
        .padding(0, 0)
        .build();
    let err = pack_layout(vec![("ok", 16, 16), ("huge", 300, 300)], cfg).unwrap_err();
    match err {
        PagePackError::Unpackable { name, width, height, .. } => {
            assert_eq!(name, "huge");
            assert_eq!((width, height), (300, 300));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn padding_overflow_is_unpackable() {
    let cfg = PackerConfig::builder()
        .with_max_dimensions(256, 256)
        .padding(2, 2)
        .build();
    for (w, h) in [(u32::MAX, 10), (10, u32::MAX - 1)] {
        let err = pack_layout(vec![("small", 8, 8), ("huge", w, h)], cfg.clone()).unwrap_err();
        match err {
            PagePackError::Unpackable { name, width, height, padding_x, .. } => {
                assert_eq!(name, "huge");
                assert_eq!((width, height), (w, h));
                assert_eq!(padding_x, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    // padded size lands exactly on u32::MAX: no wrap, still too big for the page
    let err = pack_layout(vec![("edge", u32::MAX - 2, 10)], cfg).unwrap_err();
    assert!(matches!(err, PagePackError::Unpackable { ref name, .. } if name == "edge"));
}

#[test]
fn edge_reserve_counts_against_max_size() {
    // 256 wide fits a 256 max page only when no edge padding is reserved
    let reserved = PackerConfig::builder()
        .with_max_dimensions(256, 256)
        .padding(2, 2)
        .build();
    assert!(pack_layout(vec![("wide", 254, 10)], reserved).is_err());

    let duplicated = PackerConfig::builder()
        .with_max_dimensions(256, 256)
        .padding(2, 2)
        .duplicate_padding(true)
        .build();
    assert!(pack_layout(vec![("wide", 254, 10)], duplicated).is_ok());
}

#[test]
fn best_of_all_heuristics_at_one_size() {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(3);
    let cfg = PackerConfig::builder()
        .padding(1, 1)
        .allow_rotation(true)
        .pow2(false)
        .build();
    let sprites: Vec<Sprite> = (0..60)
        .map(|i| Sprite::new(format!("s{i}"), rng.gen_range(8..=48), rng.gen_range(8..=48)))
        .collect();

    let best = pack_at_size(false, 200, 160, &sprites, &cfg).expect("something fits");
    let occupancies: Vec<f64> = MaxRectsHeuristic::ALL
        .iter()
        .map(|h| MaxRectsPacker::new(200, 160, &cfg).pack(&sprites, *h).occupancy)
        .collect();
    let max = occupancies.iter().cloned().fold(0.0, f64::max);
    assert_eq!(best.occupancy, max);
    // ties resolve to the first heuristic reaching the maximum
    let first = occupancies.iter().position(|o| *o == max).unwrap();
    assert_eq!(best.heuristic, MaxRectsHeuristic::ALL[first]);
}

#[test]
fn fully_rejects_partial_layouts() {
    let cfg = PackerConfig::builder().padding(0, 0).pow2(false).build();
    let sprites = vec![Sprite::new("a", 64, 64), Sprite::new("b", 64, 64)];
    assert!(pack_at_size(true, 100, 64, &sprites, &cfg).is_none());
    let partial = pack_at_size(false, 100, 64, &sprites, &cfg).expect("one fits");
    assert_eq!(partial.placements.len(), 1);
    assert_eq!(partial.remaining.len(), 1);
}
