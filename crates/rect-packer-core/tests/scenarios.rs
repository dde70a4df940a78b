use rect_packer_core::prelude::*;

#[test]
fn maxrects_fits_then_rejects_too_wide() {
    let mut p = MaxRectsPacker::new(100, 100).unwrap();
    let heuristic = MaxRectsHeuristic::BestShortSideFit;
    assert_eq!(p.insert(20, 20, heuristic).unwrap().h, 20);
    assert_eq!(p.insert(200, 20, heuristic).unwrap().h, 0);
}

#[test]
fn maxrects_two_phase_init() {
    let mut p = MaxRectsPacker::default();
    assert!(!p.is_initialized());
    p.init(100, 200).unwrap();
    assert!(p.is_initialized());
    assert_eq!(p.bin_size(), Some((100, 200)));
    // 150 only fits along the 200 side
    let r = p
        .insert(150, 20, MaxRectsHeuristic::BestShortSideFit)
        .unwrap();
    assert_eq!((r.w, r.h), (20, 150));
}

#[test]
fn guillotine_fits() {
    let mut p = GuillotinePacker::new(100, 100).unwrap();
    let r = p
        .insert(
            20,
            20,
            true,
            GuillotineChoice::BestShortSideFit,
            GuillotineSplit::SplitMinimizeArea,
        )
        .unwrap();
    assert_eq!(r.h, 20);
}

#[test]
fn shelf_fits() {
    let mut p = ShelfPacker::new(100, 100, true).unwrap();
    assert_eq!(p.insert(20, 20, ShelfHeuristic::NextFit).unwrap().h, 20);
}

#[test]
fn skyline_fits() {
    let mut p = SkylinePacker::new(100, 100, true).unwrap();
    assert_eq!(p.insert(20, 20, SkylineHeuristic::BottomLeft).unwrap().h, 20);
}

#[test]
fn second_60x60_never_fits_in_100x100() {
    for heuristic in [
        MaxRectsHeuristic::BestShortSideFit,
        MaxRectsHeuristic::BestLongSideFit,
        MaxRectsHeuristic::BestAreaFit,
        MaxRectsHeuristic::BottomLeftRule,
        MaxRectsHeuristic::ContactPointRule,
    ] {
        let mut p = MaxRectsPacker::new(100, 100).unwrap();
        assert!(!p.insert(60, 60, heuristic).unwrap().is_empty());
        assert!(
            p.insert(60, 60, heuristic).unwrap().is_empty(),
            "{heuristic:?} placed a second 60x60"
        );
    }
}

#[test]
fn all_packers_start_at_origin() {
    let mut mr = MaxRectsPacker::new(64, 64).unwrap();
    let mut g = GuillotinePacker::new(64, 64).unwrap();
    let mut sh = ShelfPacker::new(64, 64, false).unwrap();
    let mut sk = SkylinePacker::new(64, 64, false).unwrap();

    let expected = Rect::new(0, 0, 16, 8);
    assert_eq!(mr.insert(16, 8, MaxRectsHeuristic::BestAreaFit).unwrap(), expected);
    assert_eq!(
        g.insert_with(16, 8, GuillotineHeuristic::default()).unwrap(),
        expected
    );
    assert_eq!(sh.insert(16, 8, ShelfHeuristic::FirstFit).unwrap(), expected);
    assert_eq!(sk.insert(16, 8, SkylineHeuristic::MinWasteFit).unwrap(), expected);
}
