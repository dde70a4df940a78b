use rect_packer_core::prelude::*;

const MAX: u32 = u32::MAX;

#[test]
fn maxrects_best_area_fit_on_full_range_bin() {
    let mut p = MaxRectsPacker::with_rotation(MAX, MAX, false).unwrap();
    let h = MaxRectsHeuristic::BestAreaFit;
    assert_eq!(p.insert(MAX - 100, 10, h).unwrap(), Rect::new(0, 0, MAX - 100, 10));
    // the 100 wide strip on the right leaves far less than the area below
    let r = p.insert(50, 10, h).unwrap();
    assert_eq!(r, Rect::new(MAX - 100, 0, 50, 10));
}

#[test]
fn guillotine_area_choices_on_full_range_bin() {
    let split = GuillotineSplit::SplitLongerLeftoverAxis;
    let setup = || {
        let mut p = GuillotinePacker::with_rotation(MAX, MAX, false).unwrap();
        p.insert(MAX - 100, 10, false, GuillotineChoice::BestAreaFit, split)
            .unwrap();
        // free: (0, 10, MAX - 100, MAX - 10) then (MAX - 100, 0, 100, MAX)
        p
    };

    let mut p = setup();
    let r = p
        .insert(50, 10, false, GuillotineChoice::BestAreaFit, split)
        .unwrap();
    assert_eq!(r, Rect::new(MAX - 100, 0, 50, 10));

    let mut p = setup();
    let r = p
        .insert(50, 10, false, GuillotineChoice::WorstAreaFit, split)
        .unwrap();
    assert_eq!(r, Rect::new(0, 10, 50, 10));
}

#[test]
fn shelf_area_heuristics_on_full_range_bin() {
    let setup = || {
        let mut p = ShelfPacker::new(MAX, MAX, false).unwrap();
        // a very tall, nearly empty shelf, then a short, nearly full one
        p.insert(10, 3_000_000_000, ShelfHeuristic::NextFit).unwrap();
        p.insert(MAX - 5, 10, ShelfHeuristic::NextFit).unwrap();
        assert_eq!(p.shelves().len(), 2);
        p
    };

    let mut p = setup();
    let r = p.insert(5, 10, ShelfHeuristic::BestAreaFit).unwrap();
    assert_eq!(r, Rect::new(MAX - 5, 3_000_000_000, 5, 10));

    let mut p = setup();
    let r = p.insert(5, 10, ShelfHeuristic::WorstAreaFit).unwrap();
    assert_eq!(r, Rect::new(10, 0, 5, 10));

    let mut p = ShelfPacker::new(MAX, MAX, false).unwrap();
    p.insert(10, 3_000_000_000, ShelfHeuristic::NextFit).unwrap();
    let r = p.insert(10, 10, ShelfHeuristic::BestAreaFit).unwrap();
    assert_eq!(r, Rect::new(10, 0, 10, 10));
}

#[test]
fn occupancy_on_full_range_bin() {
    let mut p = SkylinePacker::new(MAX, MAX, false).unwrap();
    p.insert(MAX, MAX / 2, SkylineHeuristic::MinWasteFit).unwrap();
    assert!((p.occupancy() - 0.5).abs() < 1e-6);
    let r = p.insert(MAX, MAX / 2 + 2, SkylineHeuristic::BottomLeft).unwrap();
    assert!(r.is_empty());
}
