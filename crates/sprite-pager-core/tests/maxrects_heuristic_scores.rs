use sprite_pager_core::config::MaxRectsHeuristic;
use sprite_pager_core::model::Rect;
use sprite_pager_core::packer::score::{Candidate, FreeSpace};

fn space<'a>(free: &'a [Rect], used: &'a [Rect]) -> FreeSpace<'a> {
    FreeSpace {
        free,
        used,
        bin_width: 100,
        bin_height: 100,
    }
}

fn square10() -> Candidate {
    Candidate::new(10, 10, (0, 0), false)
}

#[test]
fn short_side_tie_goes_to_long_side() {
    // both leave 2 on the short side; 20 vs 4 on the long side
    let free = [Rect::new(0, 0, 12, 30), Rect::new(20, 0, 12, 14)];
    let p = space(&free, &[])
        .find_position(&square10(), MaxRectsHeuristic::BestShortSideFit)
        .expect("fits");
    assert_eq!((p.x, p.y), (20, 0));
    assert_eq!((p.primary, p.secondary), (2, 4));
}

#[test]
fn long_side_tie_goes_to_short_side() {
    let free = [Rect::new(40, 0, 30, 25), Rect::new(0, 0, 30, 12)];
    let p = space(&free, &[])
        .find_position(&square10(), MaxRectsHeuristic::BestLongSideFit)
        .expect("fits");
    assert_eq!((p.x, p.y), (0, 0));
    assert_eq!((p.primary, p.secondary), (20, 2));
}

#[test]
fn area_tie_goes_to_short_side() {
    // 20x15 and 25x12 both waste 200
    let free = [Rect::new(0, 0, 20, 15), Rect::new(30, 0, 25, 12)];
    let p = space(&free, &[])
        .find_position(&square10(), MaxRectsHeuristic::BestAreaFit)
        .expect("fits");
    assert_eq!((p.x, p.y), (30, 0));
    assert_eq!((p.primary, p.secondary), (200, 2));
}

#[test]
fn bottom_left_tie_goes_to_smaller_x() {
    let free = [Rect::new(50, 0, 20, 20), Rect::new(10, 0, 20, 20)];
    let p = space(&free, &[])
        .find_position(&square10(), MaxRectsHeuristic::BottomLeft)
        .expect("fits");
    assert_eq!((p.x, p.y), (10, 0));
    assert_eq!((p.primary, p.secondary), (10, 10));
}

#[test]
fn first_of_equal_candidates_wins() {
    let free = [Rect::new(0, 0, 20, 20), Rect::new(30, 0, 20, 20)];
    for h in MaxRectsHeuristic::ALL {
        if h == MaxRectsHeuristic::ContactPoint {
            continue;
        }
        let p = space(&free, &[]).find_position(&square10(), h).expect("fits");
        assert_eq!((p.x, p.y), (0, 0), "{h:?}");
    }
}

#[test]
fn upright_beats_equal_rotated() {
    // 10x20 and its 20x10 rotation score (0, 10) in a 20x20 hole
    let cand = Candidate::new(10, 20, (0, 0), true);
    let free = [Rect::new(0, 0, 20, 20)];
    let p = space(&free, &[])
        .find_position(&cand, MaxRectsHeuristic::BestShortSideFit)
        .expect("fits");
    assert!(!p.rotated);
    assert_eq!((p.width, p.height), (10, 20));

    let narrow = [Rect::new(0, 0, 10, 30)];
    let wide = Candidate::new(20, 10, (0, 0), true);
    let p = space(&narrow, &[])
        .find_position(&wide, MaxRectsHeuristic::BestShortSideFit)
        .expect("rotated fits");
    assert!(p.rotated);
    assert_eq!((p.width, p.height), (10, 20));
}

#[test]
fn contact_point_counts_border_and_flush_edges() {
    let none: [Rect; 0] = [];
    let s = space(&[], &none);
    // left border plus top-of-page border
    assert_eq!(s.contact_point_score(0, 90, 10, 10), 20);
    // touching both vertical borders still counts the height once
    assert_eq!(s.contact_point_score(0, 0, 100, 5), 105);
    assert_eq!(s.contact_point_score(40, 40, 10, 10), 0);

    let used = [Rect::new(0, 0, 10, 10)];
    let s = space(&[], &used);
    // bottom border 10 plus the shared left edge 10
    assert_eq!(s.contact_point_score(10, 0, 10, 10), 20);
    // corner contact shares no edge length
    assert_eq!(s.contact_point_score(10, 10, 10, 10), 0);

    let tall = [Rect::new(0, 0, 10, 30)];
    let s = space(&[], &tall);
    // flush on x = 10, overlapping rows 20..30 only
    assert_eq!(s.contact_point_score(10, 20, 10, 20), 10);

    let below = [Rect::new(20, 0, 30, 10)];
    let s = space(&[], &below);
    // sits on top of `below`, overlapping columns 40..50
    assert_eq!(s.contact_point_score(40, 10, 20, 10), 10);
}

#[test]
fn contact_point_prefers_most_contact() {
    let free = [Rect::new(50, 50, 20, 20), Rect::new(0, 0, 20, 20)];
    let p = space(&free, &[])
        .find_position(&square10(), MaxRectsHeuristic::ContactPoint)
        .expect("fits");
    assert_eq!((p.x, p.y), (0, 0));
    assert_eq!((p.primary, p.secondary), (-20, 0));
}
