use sprite_pager_core::PagePackError;
use sprite_pager_core::prelude::*;

#[test]
fn pow2_requires_pow2_maxima() {
    let cfg = PackerConfig::builder()
        .with_max_dimensions(300, 256)
        .pow2(true)
        .build();
    match cfg.validate() {
        Err(PagePackError::NotPowerOfTwo { axis, value }) => {
            assert_eq!(axis, "width");
            assert_eq!(value, 300);
        }
        other => panic!("expected NotPowerOfTwo, got {other:?}"),
    }

    // pack fails before any page is produced
    let err = pack_layout(vec![("a", 8, 8)], cfg).unwrap_err();
    assert!(matches!(err, PagePackError::NotPowerOfTwo { .. }));
}

#[test]
fn non_pow2_maxima_are_fine_without_pow2() {
    let cfg = PackerConfig::builder()
        .with_max_dimensions(300, 200)
        .pow2(false)
        .build();
    assert!(cfg.validate().is_ok());
}

#[test]
fn zero_and_inverted_dimensions_are_rejected() {
    let zero = PackerConfig::builder().with_max_dimensions(0, 64).build();
    assert!(matches!(
        zero.validate(),
        Err(PagePackError::InvalidDimensions { width: 0, height: 64 })
    ));

    let inverted = PackerConfig::builder()
        .with_max_dimensions(64, 64)
        .with_min_dimensions(128, 16)
        .build();
    assert!(matches!(inverted.validate(), Err(PagePackError::InvalidConfig(_))));
}

#[test]
fn padding_must_leave_room() {
    let cfg = PackerConfig::builder()
        .with_max_dimensions(16, 16)
        .with_min_dimensions(1, 1)
        .padding(16, 0)
        .build();
    assert!(matches!(cfg.validate(), Err(PagePackError::InvalidConfig(_))));
    // no reserve when edge padding is off
    let cfg = PackerConfig { edge_padding: false, ..cfg };
    assert!(cfg.validate().is_ok());
}

#[test]
fn fuzziness_defaults_follow_mode() {
    let linear = PackerConfig::builder().pow2(false);
    assert_eq!(linear.clone().build().search_fuzziness(), 15);
    assert_eq!(linear.clone().mode(PackMode::Fast).build().search_fuzziness(), 25);
    assert_eq!(linear.fuzziness(Some(3)).build().search_fuzziness(), 3);
    assert_eq!(PackerConfig::default().search_fuzziness(), 0);
}

#[test]
fn heuristic_and_mode_names_parse() {
    assert_eq!("bssf".parse::<MaxRectsHeuristic>(), Ok(MaxRectsHeuristic::BestShortSideFit));
    assert_eq!("BottomLeft".parse::<MaxRectsHeuristic>(), Ok(MaxRectsHeuristic::BottomLeft));
    assert_eq!("cp".parse::<MaxRectsHeuristic>(), Ok(MaxRectsHeuristic::ContactPoint));
    assert!("skyline".parse::<MaxRectsHeuristic>().is_err());
    assert_eq!("quality".parse::<PackMode>(), Ok(PackMode::Exhaustive));
    assert_eq!("fast".parse::<PackMode>(), Ok(PackMode::Fast));
}

#[test]
fn config_deserializes_with_defaults() {
    let cfg: PackerConfig = serde_json::from_str(
        r#"{"max_width":512,"max_height":256,"padding_x":1,"padding_y":1,
            "allow_rotation":true,"power_of_two":true}"#,
    )
    .expect("parse");
    assert_eq!(cfg.min_width, 16);
    assert!(cfg.edge_padding);
    assert_eq!(cfg.mode, PackMode::Exhaustive);
    assert!(cfg.validate().is_ok());
}

#[test]
fn parallel_needs_the_feature() {
    let cfg = PackerConfig::builder().parallel(true).build();
    assert!(cfg.parallel);
    assert_eq!(cfg.effective_parallel(), cfg!(feature = "parallel"));
    assert!(!PackerConfig::default().effective_parallel());
}
