use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rect_packer_core::prelude::*;

const HEURISTICS: [MaxRectsHeuristic; 5] = [
    MaxRectsHeuristic::BestShortSideFit,
    MaxRectsHeuristic::BestLongSideFit,
    MaxRectsHeuristic::BestAreaFit,
    MaxRectsHeuristic::BottomLeftRule,
    MaxRectsHeuristic::ContactPointRule,
];

fn disjoint(rects: &[Rect]) -> bool {
    for i in 0..rects.len() {
        for j in (i + 1)..rects.len() {
            if rects[i].intersects(&rects[j]) {
                return false;
            }
        }
    }
    true
}

fn random_run(seed: u64, heuristic: MaxRectsHeuristic, size: u32) -> MaxRectsPacker {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut p = MaxRectsPacker::new(size, size).unwrap();
    for _ in 0..80 {
        let w = rng.gen_range(1..=size / 3);
        let h = rng.gen_range(1..=size / 3);
        p.insert(w, h, heuristic).unwrap();
    }
    p
}

#[test]
fn maxrects_random_runs_keep_invariants() {
    for heuristic in HEURISTICS {
        for seed in 0..8 {
            let p = random_run(seed, heuristic, 64);
            let bin = Rect::new(0, 0, 64, 64);
            let used = p.used_rects();
            let free = p.free_rects();

            assert!(disjoint(used), "{heuristic:?}/{seed}: overlapping placements");
            assert!(used.iter().all(|r| bin.contains(r)));
            assert!(free.iter().all(|r| bin.contains(r) && !r.is_empty()));

            // no free rect inside another
            for (i, a) in free.iter().enumerate() {
                for (j, b) in free.iter().enumerate() {
                    assert!(i == j || !b.contains(a), "{heuristic:?}/{seed}: {a:?} in {b:?}");
                }
            }

            // every cell is either used exactly once or covered by some free rect, never both
            let mut used_hits = vec![0u32; 64 * 64];
            let mut free_hits = vec![false; 64 * 64];
            for r in used {
                for y in r.y..r.bottom() {
                    for x in r.x..r.right() {
                        used_hits[(y * 64 + x) as usize] += 1;
                    }
                }
            }
            for r in free {
                for y in r.y..r.bottom() {
                    for x in r.x..r.right() {
                        free_hits[(y * 64 + x) as usize] = true;
                    }
                }
            }
            for cell in 0..64 * 64 {
                match (used_hits[cell], free_hits[cell]) {
                    (1, false) | (0, true) => {}
                    other => panic!("{heuristic:?}/{seed}: cell {cell} is {other:?}"),
                }
            }

            let placed: u64 = used.iter().map(Rect::area).sum();
            assert!((p.occupancy() - placed as f32 / 4096.0).abs() < 1e-6);
        }
    }
}

#[test]
fn maxrects_is_deterministic() {
    for heuristic in HEURISTICS {
        let a = random_run(42, heuristic, 256);
        let b = random_run(42, heuristic, 256);
        assert_eq!(a.used_rects(), b.used_rects());
        assert_eq!(a.free_rects(), b.free_rects());
    }
}

#[test]
fn maxrects_first_placement_leaves_two_maximal_rects() {
    let mut p = MaxRectsPacker::new(100, 100).unwrap();
    let r = p.insert(20, 20, MaxRectsHeuristic::BestAreaFit).unwrap();
    assert_eq!(r, Rect::new(0, 0, 20, 20));
    assert_eq!(
        p.free_rects(),
        &[Rect::new(0, 20, 100, 80), Rect::new(20, 0, 80, 100)]
    );
}

#[test]
fn maxrects_bottom_left_prefers_lowest_top_edge() {
    let mut p = MaxRectsPacker::new(100, 100).unwrap();
    let h = MaxRectsHeuristic::BottomLeftRule;
    assert_eq!(p.insert(30, 10, h).unwrap(), Rect::new(0, 0, 30, 10));
    // beside the first one rather than under it
    assert_eq!(p.insert(10, 10, h).unwrap(), Rect::new(30, 0, 10, 10));
}

#[test]
fn maxrects_contact_point_hugs_placed_rects() {
    let mut p = MaxRectsPacker::with_rotation(100, 100, false).unwrap();
    let h = MaxRectsHeuristic::ContactPointRule;
    assert_eq!(p.insert(50, 100, h).unwrap(), Rect::new(0, 0, 50, 100));
    // the corner at (50, 0) touches the bin top, bin right and the first item
    let r = p.insert(50, 30, h).unwrap();
    assert_eq!(r, Rect::new(50, 0, 50, 30));
}

#[test]
fn maxrects_rotation_fit() {
    let mut p = MaxRectsPacker::new(16, 12).unwrap();
    let r = p.insert(8, 14, MaxRectsHeuristic::BestShortSideFit).unwrap();
    assert_eq!(r, Rect::new(0, 0, 14, 8));

    let mut p = MaxRectsPacker::with_rotation(16, 12, false).unwrap();
    let r = p.insert(8, 14, MaxRectsHeuristic::BestShortSideFit).unwrap();
    assert_eq!(r, Rect::EMPTY);
    assert!(p.used_rects().is_empty());
}

#[test]
fn maxrects_failed_insert_is_idempotent() {
    let mut p = MaxRectsPacker::new(64, 64).unwrap();
    for _ in 0..3 {
        p.insert(30, 30, MaxRectsHeuristic::BestAreaFit).unwrap();
    }
    let free = p.free_rects().to_vec();
    let used = p.used_rects().to_vec();
    for _ in 0..2 {
        assert!(p.insert(40, 40, MaxRectsHeuristic::BestAreaFit).unwrap().is_empty());
        assert_eq!(p.free_rects(), free.as_slice());
        assert_eq!(p.used_rects(), used.as_slice());
    }
}

#[test]
fn maxrects_fills_bin_exactly() {
    let mut p = MaxRectsPacker::new(64, 64).unwrap();
    for _ in 0..16 {
        assert!(!p.insert(16, 16, MaxRectsHeuristic::BestShortSideFit).unwrap().is_empty());
    }
    assert!(p.free_rects().is_empty());
    assert_eq!(p.occupancy(), 1.0);
    assert!(p.insert(1, 1, MaxRectsHeuristic::BestShortSideFit).unwrap().is_empty());
}
